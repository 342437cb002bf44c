//! Recovery journal: the set of entities touched since the last save.
//!
//! Every change rewrites the whole durable store with one line per
//! participating entry. Entries for entities that already exist in the saved
//! map carry the identity the entity had when first journaled, so recovery
//! can find the entity the line updates.

use mapedit_core::EntityRef;
use mapedit_storage::{JournalLine, JournalStore, StorageError};

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub entity: EntityRef,
    /// `None` for entities created this session.
    pub identity: Option<String>,
}

impl JournalEntry {
    fn line(&self) -> JournalLine {
        JournalLine::new(self.identity.clone(), self.entity.canonical_attributes())
    }
}

#[derive(Debug)]
pub struct RecoveryJournal<S: JournalStore> {
    pub(crate) entries: Vec<JournalEntry>,
    pub(crate) store: S,
}

impl<S: JournalStore> RecoveryJournal<S> {
    pub fn new(store: S) -> Self {
        Self {
            entries: Vec::new(),
            store,
        }
    }

    /// Journals the entity under its current identity.
    pub fn log_change(&mut self, entity: &EntityRef) -> Result<(), StorageError> {
        if !self.contains(entity) {
            let identity = entity.is_persisted().then(|| entity.identity());
            self.entries.push(JournalEntry {
                entity: entity.clone(),
                identity,
            });
        }
        self.flush()
    }

    /// Journals the entity under an identity captured before the edit that
    /// changed it. `precomputed` is always left empty.
    pub fn log_change_with_identity(
        &mut self,
        entity: &EntityRef,
        precomputed: &mut Option<String>,
    ) -> Result<(), StorageError> {
        let precomputed = precomputed.take();
        if self.contains(entity) {
            return self.flush();
        }
        let identity = if entity.is_persisted() {
            Some(precomputed.unwrap_or_else(|| entity.identity()))
        } else {
            None
        };
        self.entries.push(JournalEntry {
            entity: entity.clone(),
            identity,
        });
        self.flush()
    }

    /// Rewrites the store from the participating entries.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let lines: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.entity.is_participating())
            .map(|entry| entry.line().to_string())
            .collect();
        self.store.write_lines(&lines)
    }

    pub fn reset(&mut self) -> Result<(), StorageError> {
        log::info!("resetting recovery journal ({} entries)", self.entries.len());
        self.entries.clear();
        self.store.clear()
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.entries.iter().any(|entry| entry.entity == *entity)
    }

    pub fn entry(&self, entity: &EntityRef) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.entity == *entity)
    }

    /// The anchored identity, if the entity is journaled as a saved one.
    pub fn identity_of(&self, entity: &EntityRef) -> Option<&str> {
        self.entry(entity).and_then(|entry| entry.identity.as_deref())
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
