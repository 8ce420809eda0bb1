/*!
Common infrastructure for the rtpfx stack.

This crate holds the ambient pieces every other rtpfx crate leans on:

- `errors`: the shared error type and error context helpers
- `logging`: `tracing` subscriber setup
- `config`: layered configuration loading (defaults, TOML, environment)
*/

pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{Error, ErrorContext, ErrorExt, Result};
