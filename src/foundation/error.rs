/// Convenience result type used across slidewright.
pub type SlidewrightResult<T> = Result<T, SlidewrightError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidewrightError {
    /// Invalid user-provided content or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while loading or validating engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A host call failed in a way the caller could not recover from locally.
    #[error("host error: {0}")]
    Host(#[from] crate::host::api::HostError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidewrightError {
    /// Build a [`SlidewrightError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidewrightError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SlidewrightError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
