use thiserror::Error;

/// Core error types for fwopt
///
/// Analysis itself never fails: malformed range specifications degrade to
/// conservative answers inside the range algebra and an empty policy simply
/// yields an empty result. The variants here cover the crate's boundaries:
/// caller-contract violations surfaced by the validators and JSON
/// serialization of report documents.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A rule violates the parser-boundary contract (unset table, chain or
    /// target) or carries an invalid field value
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
