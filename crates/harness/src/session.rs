use std::path::{Path, PathBuf};

use mapedit_engine::{DEFAULT_HISTORY_CAPACITY, Editor, EditorConfig, EngineError};
use mapedit_storage::{FileJournalStore, JournalStore, StorageError};
use tempfile::TempDir;

use crate::init_logging;

/// An editor journaling into a private temp directory. The directory
/// outlives [`TestSession::crash_and_reopen`], so a test can simulate a
/// crash and recover from the journal the previous editor left behind.
pub struct TestSession {
    dir: TempDir,
    config: EditorConfig,
    pub editor: Editor<FileJournalStore>,
}

impl TestSession {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, Box<dyn std::error::Error>> {
        init_logging();
        let dir = tempfile::tempdir()?;
        let config = EditorConfig {
            history_capacity: capacity,
            journal_path: dir.path().join("recovery.journal"),
        };
        let editor = Editor::open(&config)?;
        Ok(Self {
            dir,
            config,
            editor,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn journal_path(&self) -> PathBuf {
        self.config.journal_path.clone()
    }

    /// Current durable journal contents.
    pub fn journal_lines(&self) -> Result<Vec<String>, StorageError> {
        FileJournalStore::open(&self.config.journal_path).read_lines()
    }

    /// Drops the editor without saving and opens a fresh one on the same
    /// journal. The new world is empty; the test reloads the saved map.
    pub fn crash_and_reopen(&mut self) -> Result<(), EngineError> {
        log::debug!("simulating crash, journal at {}", self.config.journal_path.display());
        self.editor = Editor::open(&self.config)?;
        Ok(())
    }
}
