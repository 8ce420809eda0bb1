use crate::errors::types::{Error, Result};
use std::fmt;

/// Where an error happened: component, operation and optionally the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Component where the error occurred
    pub component: String,
    /// Operation that was being performed
    pub operation: String,
    /// SSRC of the stream involved, if any
    pub ssrc: Option<u32>,
    /// Additional context information
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new<S: Into<String>, T: Into<String>>(component: S, operation: T) -> Self {
        ErrorContext {
            component: component.into(),
            operation: operation.into(),
            ssrc: None,
            details: None,
        }
    }

    /// Attach the stream identifier
    pub fn with_ssrc(mut self, ssrc: u32) -> Self {
        self.ssrc = Some(ssrc);
        self
    }

    /// Add details to the context
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in component '{}' during operation '{}'", self.component, self.operation)?;
        if let Some(ssrc) = self.ssrc {
            write!(f, " for ssrc {}", ssrc)?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors and results
pub trait ErrorExt {
    /// The type produced once context is attached
    type Output;

    /// Add context to an error
    fn context(self, ctx: ErrorContext) -> Self::Output;

    /// Add simple context with component and operation
    fn with_context<S: Into<String>, T: Into<String>>(self, component: S, operation: T) -> Self::Output
    where
        Self: Sized,
    {
        self.context(ErrorContext::new(component, operation))
    }
}

impl ErrorExt for Error {
    type Output = Error;

    fn context(self, ctx: ErrorContext) -> Error {
        match self {
            Error::Config(msg) => Error::Config(format!("{} [{}]", msg, ctx)),
            Error::Initialization(msg) => Error::Initialization(format!("{} [{}]", msg, ctx)),
            Error::Validation(msg) => Error::Validation(format!("{} [{}]", msg, ctx)),
            Error::Internal(msg) => Error::Internal(format!("{} [{}]", msg, ctx)),
            other => Error::Custom(format!("{} [{}]", other, ctx)),
        }
    }
}

impl<T> ErrorExt for Result<T> {
    type Output = Result<T>;

    fn context(self, ctx: ErrorContext) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}
