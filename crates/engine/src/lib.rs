pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod journal;
pub mod reconcile;
pub mod world;

pub use config::{DEFAULT_JOURNAL_PATH, EditorConfig};
pub use controller::{Direction, UndoRedo, UndoResult};
pub use error::EngineError;
pub use history::{ActionHistory, ActionRecord, DEFAULT_HISTORY_CAPACITY, LogOrigin, SharedHistory};
pub use journal::{JournalEntry, RecoveryJournal};
pub use reconcile::{RecoveryReport, SkippedLine};
pub use world::World;

use mapedit_core::{ActionKind, AttributeValue, CoreError, Editable, EntityRef};
use mapedit_storage::{FileJournalStore, JournalStore, StorageError};

/// Something the user should be told about that did not fail the edit
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    JournalWriteFailed(String),
    RecoveryLineSkipped { line: usize, reason: String },
}

/// Entry point for every edit. Drives each change through the history,
/// the world and the recovery journal in a fixed order: capture the prior
/// state, push the undo record (which invalidates redo), mutate, then
/// flush the journal.
#[derive(Debug)]
pub struct Editor<S: JournalStore> {
    world: World,
    history: UndoRedo,
    journal: RecoveryJournal<S>,
    notices: Vec<Notice>,
}

impl Editor<FileJournalStore> {
    /// Opens an editor journaling to `config.journal_path`. An existing
    /// journal is left untouched until [`Editor::recover`] is called.
    pub fn open(config: &EditorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "opening editor (history capacity {}, journal {})",
            config.history_capacity,
            config.journal_path.display()
        );
        Ok(Self::with_store(
            config.history_capacity,
            FileJournalStore::open(&config.journal_path),
        ))
    }
}

impl<S: JournalStore> Editor<S> {
    pub fn with_store(capacity: usize, store: S) -> Self {
        Self {
            world: World::new(),
            history: UndoRedo::new(capacity),
            journal: RecoveryJournal::new(store),
            notices: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn history(&self) -> &UndoRedo {
        &self.history
    }

    pub fn journal(&self) -> &RecoveryJournal<S> {
        &self.journal
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn select(&mut self, entity: &EntityRef) {
        self.world.select(entity.id());
    }

    fn require_live(&self, entity: &EntityRef) -> Result<(), EngineError> {
        if self.world.contains(entity.id()) {
            Ok(())
        } else {
            Err(EngineError::EntityNotFound(entity.id().to_string()))
        }
    }

    /// Records a journal failure without undoing the edit that caused it.
    fn report(&mut self, result: Result<(), StorageError>) {
        if let Err(e) = result {
            log::warn!("recovery journal write failed: {e}");
            self.notices.push(Notice::JournalWriteFailed(e.to_string()));
        }
    }

    // ========================================================================
    // Map loading
    // ========================================================================

    /// Places an entity read from the saved map. Not undoable, not journaled.
    pub fn load_entity(&mut self, object: impl Editable + 'static) -> EntityRef {
        let entity = EntityRef::new(object);
        {
            let mut inner = entity.borrow_mut();
            inner.set_persisted(true);
            inner.reconstruct_presentation();
            inner.set_participating(true);
        }
        self.world.insert(entity.clone());
        entity
    }

    // ========================================================================
    // Edits (all undoable)
    // ========================================================================

    pub fn create_entity(&mut self, object: impl Editable + 'static) -> EntityRef {
        let entity = EntityRef::new(object);
        self.history.log_action(entity.clone(), ActionKind::StructuralDelete, "");
        {
            let mut inner = entity.borrow_mut();
            inner.set_persisted(false);
            inner.reconstruct_presentation();
            inner.set_participating(true);
        }
        self.world.insert(entity.clone());
        let result = self.journal.log_change(&entity);
        self.report(result);
        self.world.select(entity.id());
        entity
    }

    /// Hides the entity. It stays reachable through the history so the
    /// deletion can be undone.
    pub fn delete_entity(&mut self, entity: &EntityRef) -> Result<(), EngineError> {
        self.require_live(entity)?;
        self.history.log_action(entity.clone(), ActionKind::StructuralAdd, "");
        self.world.remove(entity.id());
        entity.borrow_mut().set_participating(false);
        if self.journal.contains(entity) {
            let result = self.journal.flush();
            self.report(result);
        }
        Ok(())
    }

    /// Sets one attribute from its textual form. Invalid input leaves the
    /// entity, the history and the journal untouched.
    pub fn set_attribute(
        &mut self,
        entity: &EntityRef,
        kind: ActionKind,
        value: &str,
    ) -> Result<(), EngineError> {
        self.require_live(entity)?;
        let value = AttributeValue::parse(kind, value)?;
        let prior = entity.attribute(kind).ok_or_else(|| CoreError::UnsupportedAttribute {
            category: entity.borrow().category().to_string(),
            kind: kind.to_string(),
        })?;

        // The saved map knows this entity by its identity before the edit.
        let mut anchor = (kind.affects_identity() && !self.journal.contains(entity))
            .then(|| entity.identity());

        self.history
            .log_action(entity.clone(), kind, prior.to_string());
        entity.borrow_mut().apply_attribute(kind, value)?;
        let result = self.journal.log_change_with_identity(entity, &mut anchor);
        self.report(result);
        Ok(())
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    pub fn undo(&mut self) -> UndoResult {
        let result = self.history.perform_undo(&mut self.world);
        self.journal_reversal(&result);
        result
    }

    pub fn redo(&mut self) -> UndoResult {
        let result = self.history.perform_redo(&mut self.world);
        self.journal_reversal(&result);
        result
    }

    fn journal_reversal(&mut self, result: &UndoResult) {
        let UndoResult::Applied {
            target,
            kind,
            prior_identity,
        } = result
        else {
            return;
        };

        let outcome = if kind.is_structural() {
            if self.journal.contains(target) {
                self.journal.flush()
            } else if *kind == ActionKind::StructuralAdd && !target.is_persisted() {
                // Deleted before the last save and restored since.
                self.journal.log_change(target)
            } else {
                Ok(())
            }
        } else {
            let mut anchor = Some(prior_identity.clone());
            self.journal.log_change_with_identity(target, &mut anchor)
        };
        self.report(outcome);
    }

    // ========================================================================
    // Save / Recovery
    // ========================================================================

    /// Call after the map has been exported. Live entities are now in the
    /// saved map; entities only reachable through the histories are not.
    pub fn mark_saved(&mut self) -> Result<(), EngineError> {
        for entity in self.world.iter() {
            entity.borrow_mut().set_persisted(true);
        }
        for entity in self.history.targets() {
            if !self.world.contains(entity.id()) {
                entity.borrow_mut().set_persisted(false);
            }
        }
        self.journal.reset()?;
        Ok(())
    }

    /// Replays the journal left by a previous session against the loaded
    /// map. The journal then holds exactly the recovered changes, since they
    /// are still unsaved. A failure to write it back becomes a notice.
    pub fn recover(&mut self) -> Result<RecoveryReport, EngineError> {
        let report = self.journal.recover(&mut self.world)?;

        for skipped in &report.skipped {
            self.notices.push(Notice::RecoveryLineSkipped {
                line: skipped.line,
                reason: skipped.reason.clone(),
            });
        }
        if let Some(e) = &report.journal_error {
            self.notices.push(Notice::JournalWriteFailed(e.clone()));
        }
        Ok(report)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
