use mapedit_core::CoreError;
use mapedit_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("no live entity matches identity {0:?}")]
    UnmatchedIdentity(String),

    #[error("journal line is a {found} but {identity:?} is a {expected}")]
    CategoryMismatch {
        identity: String,
        expected: String,
        found: String,
    },

    #[error("invalid config: {0}")]
    Config(String),
}
