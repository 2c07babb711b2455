use thiserror::Error;

/// Top-level error type for the opsdeck application.
///
/// Each variant wraps a subsystem-specific failure class. Subsystem crates
/// define their own error types and implement `From<SubsystemError> for
/// OpsdeckError` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsdeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for OpsdeckError {
    fn from(err: toml::de::Error) -> Self {
        OpsdeckError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for OpsdeckError {
    fn from(err: toml::ser::Error) -> Self {
        OpsdeckError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OpsdeckError {
    fn from(err: serde_json::Error) -> Self {
        OpsdeckError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpsdeckError>;
