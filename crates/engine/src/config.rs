use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EngineError;
use crate::history::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_JOURNAL_PATH: &str = "recovery.journal";

/// Editor settings, usually loaded from a TOML file. Missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shared by the undo and redo histories.
    pub history_capacity: usize,
    pub journal_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            journal_path: PathBuf::from(DEFAULT_JOURNAL_PATH),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.history_capacity == 0 {
            return Err(EngineError::Config("history_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
