use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed journal line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("core error: {0}")]
    Core(#[from] mapedit_core::CoreError),
}
