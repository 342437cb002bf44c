use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid value for {kind}: {reason}")]
    InvalidValue { kind: String, reason: String },

    #[error("{category} has no {kind} attribute")]
    UnsupportedAttribute { category: String, kind: String },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("malformed attribute string: {0}")]
    MalformedAttributes(String),
}
