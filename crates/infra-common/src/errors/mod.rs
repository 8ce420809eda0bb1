/*!
Error Handling

Standardized error types and utilities for the rtpfx stack:

- Common error types
- Error context utilities
*/

pub mod types;
mod context;

pub use types::{Error, Result};
pub use context::{ErrorContext, ErrorExt};
