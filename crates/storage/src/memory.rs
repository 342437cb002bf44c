use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

use crate::error::StorageError;
use crate::traits::JournalStore;

/// In-memory journal. Clones share the same contents, so a test can keep a
/// handle after moving the store into an editor.
#[derive(Debug, Clone, Default)]
pub struct MemoryJournalStore {
    lines: Rc<RefCell<Vec<String>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(lines: Vec<String>) -> Self {
        let store = Self::default();
        *store.lines.borrow_mut() = lines;
        store
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes subsequent writes and clears fail with an I/O error, as a full
    /// or read-only disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl JournalStore for MemoryJournalStore {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(io::Error::other("simulated write failure").into());
        }
        *self.lines.borrow_mut() = lines.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lines())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(io::Error::other("simulated clear failure").into());
        }
        self.lines.borrow_mut().clear();
        Ok(())
    }
}
