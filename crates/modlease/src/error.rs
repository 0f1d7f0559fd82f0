use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Outcomes are memoized inside a shared future, so every variant is `Clone`
/// and carries rendered detail strings rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("module initialization failed: {details}")]
    Initialization { details: String },
    #[error("module initialization cancelled")]
    Cancelled,
    #[error("invoking `{method}` failed: {details}")]
    Invocation { method: String, details: String },
    #[error("module release failed: {details}")]
    Release { details: String },
    #[error("module handle already disposed")]
    Disposed,
}

impl Error {
    pub fn initialization(details: impl Into<String>) -> Self {
        Self::Initialization {
            details: details.into(),
        }
    }

    pub fn invocation(method: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Invocation {
            method: method.into(),
            details: details.into(),
        }
    }

    pub fn release(details: impl Into<String>) -> Self {
        Self::Release {
            details: details.into(),
        }
    }
}
