/*!
Configuration System

Layered configuration loading for rtpfx components:

- Defaults come from the target type's `#[serde(default)]` values
- TOML files and inline TOML documents override defaults, in the order added
- Environment variables (`RTPFX__SECTION__KEY`) override everything else
*/

pub mod loader;

pub use loader::{ConfigLoader, ENV_PREFIX, ENV_SEPARATOR};
