//! Replays a recovery journal against a freshly loaded world.

use mapedit_core::{Editable, EntityRef};
use mapedit_storage::{JournalLine, JournalStore};

use crate::error::EngineError;
use crate::journal::{JournalEntry, RecoveryJournal};
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// Saved entities updated in place, with the identity that matched them.
    pub updated: Vec<(EntityRef, String)>,
    pub created: Vec<EntityRef>,
    pub skipped: Vec<SkippedLine>,
    /// Set when the recovered state could not be written back to the store.
    /// The in-memory journal still holds it for the next flush.
    pub journal_error: Option<String>,
}

impl RecoveryReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.created.is_empty() && self.skipped.is_empty()
    }
}

enum Replayed {
    Updated(EntityRef, String),
    Created(EntityRef),
}

impl<S: JournalStore> RecoveryJournal<S> {
    /// Applies every journal line to `world`, then replaces the journal with
    /// the recovered entities, which are still unsaved.
    ///
    /// Lines that cannot be applied are skipped and listed in the report.
    /// Only an unreadable store is an error; the journal is left in place
    /// in that case. A failure to write the journal back is reported in
    /// [`RecoveryReport::journal_error`].
    pub fn recover(&mut self, world: &mut World) -> Result<RecoveryReport, EngineError> {
        let lines = self.store.read_lines()?;
        let mut report = RecoveryReport::default();
        let mut carried: Vec<JournalEntry> = Vec::new();

        for (index, raw) in lines.iter().enumerate() {
            let line_no = index + 1;
            if raw.trim().is_empty() {
                continue;
            }
            match replay_line(line_no, raw, world) {
                Ok(Replayed::Updated(entity, identity)) => {
                    if !carried.iter().any(|e| e.entity == entity) {
                        carried.push(JournalEntry {
                            entity: entity.clone(),
                            identity: Some(identity.clone()),
                        });
                    }
                    report.updated.push((entity, identity));
                }
                Ok(Replayed::Created(entity)) => {
                    carried.push(JournalEntry {
                        entity: entity.clone(),
                        identity: None,
                    });
                    report.created.push(entity);
                }
                Err(e) => {
                    log::warn!("skipping journal line {line_no}: {e}");
                    report.skipped.push(SkippedLine {
                        line: line_no,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "recovery: {} updated, {} created, {} skipped",
            report.updated.len(),
            report.created.len(),
            report.skipped.len()
        );

        // One atomic rewrite; the previous journal stays intact until it
        // succeeds.
        self.entries = carried;
        let written = if self.entries.is_empty() {
            self.store.clear()
        } else {
            self.flush()
        };
        if let Err(e) = written {
            log::warn!("could not rewrite recovery journal: {e}");
            report.journal_error = Some(e.to_string());
        }
        Ok(report)
    }
}

fn replay_line(line_no: usize, raw: &str, world: &mut World) -> Result<Replayed, EngineError> {
    let line = JournalLine::parse(line_no, raw)?;
    let recovered = line.entity()?;

    let Some(identity) = line.identity else {
        let entity = EntityRef::from_boxed(recovered);
        {
            let mut inner = entity.borrow_mut();
            inner.reconstruct_presentation();
            inner.set_participating(true);
        }
        world.insert(entity.clone());
        return Ok(Replayed::Created(entity));
    };

    let live = world
        .find_saved_by_identity(&identity)
        .cloned()
        .ok_or_else(|| EngineError::UnmatchedIdentity(identity.clone()))?;

    let category = live.borrow().category();
    if recovered.category() != category {
        return Err(EngineError::CategoryMismatch {
            identity,
            expected: category.to_string(),
            found: recovered.category().to_string(),
        });
    }

    let mut changed = false;
    for &kind in category.attribute_kinds() {
        let Some(value) = recovered.attribute(kind) else {
            continue;
        };
        if live.attribute(kind).as_ref() == Some(&value) {
            continue;
        }
        live.borrow_mut().apply_attribute(kind, value)?;
        changed = true;
    }
    if changed {
        live.borrow_mut().reconstruct_presentation();
    }
    Ok(Replayed::Updated(live, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapedit_core::{ActionKind, AttributeValue, Gate, MeshObject, Vec3};
    use mapedit_storage::MemoryJournalStore;

    fn saved_gate(world: &mut World, position: Vec3) -> EntityRef {
        let gate = EntityRef::new(Gate::new(position, 1));
        gate.borrow_mut().set_persisted(true);
        gate.borrow_mut().set_participating(true);
        world.insert(gate.clone());
        gate
    }

    fn journal(lines: &[&str]) -> (RecoveryJournal<MemoryJournalStore>, MemoryJournalStore) {
        let store = MemoryJournalStore::with_lines(lines.iter().map(|l| l.to_string()).collect());
        (RecoveryJournal::new(store.clone()), store)
    }

    #[test]
    fn prefixed_line_updates_matching_entity() {
        let mut world = World::new();
        let gate = saved_gate(&mut world, Vec3::ONE);
        let (mut journal, store) = journal(&["Gate|1,1,1|Gate;4;4;4;0;0;0;9"]);

        let report = journal.recover(&mut world).unwrap();

        assert_eq!(report.updated, vec![(gate.clone(), "Gate|1,1,1".to_string())]);
        assert!(report.created.is_empty());
        assert_eq!(world.len(), 1);
        assert_eq!(gate.canonical_attributes(), "Gate;4;4;4;0;0;0;9");
        assert_eq!(gate.borrow().presence().generation(), 1);
        assert_eq!(store.lines(), vec!["Gate|1,1,1|Gate;4;4;4;0;0;0;9".to_string()]);
        assert_eq!(journal.identity_of(&gate), Some("Gate|1,1,1"));
    }

    #[test]
    fn unchanged_entity_is_not_rebuilt() {
        let mut world = World::new();
        let gate = saved_gate(&mut world, Vec3::ONE);
        let (mut journal, _) = journal(&["Gate|1,1,1|Gate;1;1;1;0;0;0;1"]);

        let report = journal.recover(&mut world).unwrap();
        assert_eq!(report.updated.len(), 1);
        assert_eq!(gate.borrow().presence().generation(), 0);
    }

    #[test]
    fn unprefixed_line_creates_entity() {
        let mut world = World::new();
        let (mut journal, _) = journal(&["Object;1;2;3;rock.obj;0;0;0;1;1;1"]);

        let report = journal.recover(&mut world).unwrap();

        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert!(created.is_participating());
        assert!(!created.is_persisted());
        assert_eq!(created.identity(), "Object|rock.obj|1,2,3");
        assert!(world.contains(created.id()));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut world = World::new();
        saved_gate(&mut world, Vec3::ZERO);
        let (mut journal, _) = journal(&[
            "Teapot;0;0;0",
            "",
            "CollSphere;0;0;0;abc",
            "Gate|7,7,7|Gate;0;0;0;0;0;0;1",
            "CollSphere|0,0,0|CollSphere;0;0;0;1",
            "Gate;0;0;0;0;0;0;1;extra",
            "CollSphere;1;1;1;3",
        ]);

        let report = journal.recover(&mut world).unwrap();

        let skipped: Vec<usize> = report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(skipped, vec![1, 3, 4, 5, 6]);
        assert_eq!(report.created.len(), 1);
        assert!(report.updated.is_empty());
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn category_mismatch_is_reported() {
        let mut world = World::new();
        let object = EntityRef::new(MeshObject::new(Vec3::ZERO, "a.obj"));
        object.borrow_mut().set_persisted(true);
        world.insert(object.clone());
        // Object identity carrying Gate attributes.
        let (mut journal, _) = journal(&["Object|a.obj|0,0,0|Gate;0;0;0;0;0;0;1"]);

        let report = journal.recover(&mut world).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Object"));
        assert_eq!(
            object.attribute(ActionKind::Mesh),
            Some(AttributeValue::Text("a.obj".into()))
        );
    }

    #[test]
    fn missing_journal_is_empty_recovery() {
        let mut world = World::new();
        let (mut journal, _) = journal(&[]);
        let report = journal.recover(&mut world).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn created_entity_never_matches_saved_identity() {
        let mut world = World::new();
        let saved = saved_gate(&mut world, Vec3::ONE);
        // A new gate placed where the saved one stood, then the saved one moved.
        let (mut journal, _) = journal(&[
            "Gate;1;1;1;0;0;0;2",
            "Gate|1,1,1|Gate;5;5;5;0;0;0;1",
        ]);

        let report = journal.recover(&mut world).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(report.updated, vec![(saved.clone(), "Gate|1,1,1".to_string())]);
        assert_eq!(saved.canonical_attributes(), "Gate;5;5;5;0;0;0;1");
        assert_eq!(report.created[0].canonical_attributes(), "Gate;1;1;1;0;0;0;2");
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn failed_write_back_still_returns_report() {
        let mut world = World::new();
        let gate = saved_gate(&mut world, Vec3::ONE);
        let (mut journal, store) = journal(&["Gate|1,1,1|Gate;1;1;1;0;0;0;4", "Nonsense"]);
        store.set_fail_writes(true);

        let report = journal.recover(&mut world).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.journal_error.is_some());
        assert_eq!(gate.canonical_attributes(), "Gate;1;1;1;0;0;0;4");
        // The old journal survives and the entry waits for the next flush.
        assert_eq!(store.lines().len(), 2);
        assert!(journal.contains(&gate));

        store.set_fail_writes(false);
        journal.flush().unwrap();
        assert_eq!(store.lines(), vec!["Gate|1,1,1|Gate;1;1;1;0;0;0;4".to_string()]);
    }

    #[test]
    fn failed_clear_is_reported() {
        let mut world = World::new();
        let (mut journal, store) = journal(&["Teapot;0;0;0"]);
        store.set_fail_writes(true);

        let report = journal.recover(&mut world).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert!(report.journal_error.is_some());
        assert!(journal.is_empty());
    }
}
