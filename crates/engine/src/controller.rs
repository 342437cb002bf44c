//! Undo/redo controller.
//!
//! Owns the undo history and a shared redo history linked to it, so any
//! fresh edit pushed onto the undo side discards the redo future. Undo and
//! redo are the same transfer run in opposite directions.

use std::cell::RefCell;
use std::rc::Rc;

use mapedit_core::{ActionKind, AttributeValue, Editable, EntityRef};

use crate::history::{ActionHistory, ActionRecord, LogOrigin, SharedHistory};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

#[derive(Debug)]
pub enum UndoResult {
    /// `prior_identity` is the target's identity right before the record
    /// was applied.
    Applied {
        target: EntityRef,
        kind: ActionKind,
        prior_identity: String,
    },
    Empty,
}

impl UndoResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

pub struct UndoRedo {
    undo: ActionHistory,
    redo: SharedHistory,
}

impl UndoRedo {
    /// Both histories share `capacity`.
    pub fn new(capacity: usize) -> Self {
        let redo = Rc::new(RefCell::new(ActionHistory::new(capacity)));
        Self {
            undo: ActionHistory::with_linked(capacity, redo.clone()),
            redo,
        }
    }

    /// Normal edit path: records the reversal of a user edit and
    /// invalidates redo.
    pub fn log_action(&mut self, target: EntityRef, kind: ActionKind, payload: impl Into<String>) {
        self.undo.log_action(target, kind, payload, LogOrigin::Edit);
    }

    pub fn perform_undo(&mut self, world: &mut World) -> UndoResult {
        self.transfer(Direction::Undo, world)
    }

    pub fn perform_redo(&mut self, world: &mut World) -> UndoResult {
        self.transfer(Direction::Redo, world)
    }

    fn transfer(&mut self, direction: Direction, world: &mut World) -> UndoResult {
        let popped = match direction {
            Direction::Undo => self.undo.pop_last_action(),
            Direction::Redo => self.redo.borrow_mut().pop_last_action(),
        };
        let Some(record) = popped else {
            return UndoResult::Empty;
        };

        // The opposite record must restore the state as it is now, before
        // this record overwrites it.
        let payload = if record.kind.is_structural() {
            String::new()
        } else {
            record
                .target
                .attribute(record.kind)
                .map(|v| v.to_string())
                .unwrap_or_default()
        };
        let target = record.target.clone();
        let kind = record.kind.inverse();
        match direction {
            Direction::Undo => {
                self.redo
                    .borrow_mut()
                    .log_action(target, kind, payload, LogOrigin::Transfer);
            }
            Direction::Redo => {
                self.undo.log_action(target, kind, payload, LogOrigin::Transfer);
            }
        }

        log::debug!("{direction:?}: applying {} to {:?}", record.kind, record.target.id());
        let prior_identity = record.target.identity();
        apply(&record, world);

        UndoResult::Applied {
            target: record.target,
            kind: record.kind,
            prior_identity,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.borrow().is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.borrow().len()
    }

    pub fn undo_history(&self) -> &ActionHistory {
        &self.undo
    }

    pub fn redo_history(&self) -> SharedHistory {
        self.redo.clone()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.borrow_mut().clear();
    }

    /// Every entity referenced by either history, without duplicates.
    pub fn targets(&self) -> Vec<EntityRef> {
        let mut targets: Vec<EntityRef> = Vec::new();
        let redo = self.redo.borrow();
        for record in self.undo.iter().chain(redo.iter()) {
            if !targets.contains(&record.target) {
                targets.push(record.target.clone());
            }
        }
        targets
    }
}

impl std::fmt::Debug for UndoRedo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoRedo")
            .field("undo_count", &self.undo_count())
            .field("redo_count", &self.redo_count())
            .field("capacity", &self.undo.capacity())
            .finish()
    }
}

/// Applies a record to its target. A record whose payload no longer fits
/// the target is a logged no-op.
pub fn apply(record: &ActionRecord, world: &mut World) {
    let target = &record.target;
    match record.kind {
        ActionKind::StructuralAdd => {
            {
                let mut entity = target.borrow_mut();
                entity.reconstruct_presentation();
                entity.set_participating(true);
            }
            world.insert(target.clone());
            world.select(target.id());
        }
        ActionKind::StructuralDelete => {
            world.remove(target.id());
            target.borrow_mut().set_participating(false);
        }
        kind => {
            let result = AttributeValue::parse(kind, &record.payload)
                .and_then(|value| target.borrow_mut().apply_attribute(kind, value));
            if let Err(e) = result {
                log::warn!("stale {kind} record for {:?} ignored: {e}", target.id());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapedit_core::{Gate, MeshObject, Vec3};

    fn placed(world: &mut World, object: impl Editable + 'static) -> EntityRef {
        let entity = EntityRef::new(object);
        entity.borrow_mut().set_participating(true);
        world.insert(entity.clone());
        entity
    }

    fn position(entity: &EntityRef) -> String {
        entity.attribute(ActionKind::Position).unwrap().to_string()
    }

    fn move_to(history: &mut UndoRedo, entity: &EntityRef, to: Vec3) {
        history.log_action(entity.clone(), ActionKind::Position, position(entity));
        entity
            .borrow_mut()
            .apply_attribute(ActionKind::Position, AttributeValue::Vec3(to))
            .unwrap();
    }

    #[test]
    fn empty_histories_are_no_ops() {
        let mut world = World::new();
        let mut history = UndoRedo::new(3);
        assert!(!history.perform_undo(&mut world).is_applied());
        assert!(!history.perform_redo(&mut world).is_applied());
    }

    #[test]
    fn undo_pushes_current_value_to_redo() {
        let mut world = World::new();
        let mut history = UndoRedo::new(3);
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));

        // A..D: positions 1..4; the capacity keeps B, C, D.
        for x in 1..=4 {
            move_to(&mut history, &gate, Vec3::new(x as f32, 0.0, 0.0));
        }
        let payloads: Vec<&str> =
            history.undo_history().iter().map(|r| r.payload.as_str()).collect();
        assert_eq!(payloads, vec!["1,0,0", "2,0,0", "3,0,0"]);

        let result = history.perform_undo(&mut world);
        assert!(result.is_applied());
        assert_eq!(position(&gate), "3,0,0");
        assert_eq!(history.undo_count(), 2);

        let redo = history.redo_history();
        let redo = redo.borrow();
        let record = redo.peek_last().unwrap();
        assert_eq!(record.kind, ActionKind::Position);
        assert_eq!(record.payload, "4,0,0");
    }

    #[test]
    fn redo_restores_pre_undo_state() {
        let mut world = World::new();
        let mut history = UndoRedo::new(10);
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));
        move_to(&mut history, &gate, Vec3::new(5.0, 0.0, 0.0));

        history.perform_undo(&mut world);
        assert_eq!(position(&gate), "0,0,0");
        history.perform_redo(&mut world);
        assert_eq!(position(&gate), "5,0,0");
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn applied_result_carries_identity_before_reversal() {
        let mut world = World::new();
        let mut history = UndoRedo::new(10);
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));
        move_to(&mut history, &gate, Vec3::ONE);

        match history.perform_undo(&mut world) {
            UndoResult::Applied { prior_identity, kind, .. } => {
                assert_eq!(prior_identity, "Gate|1,1,1");
                assert_eq!(kind, ActionKind::Position);
            }
            UndoResult::Empty => panic!("expected an applied undo"),
        }
    }

    #[test]
    fn structural_records_swap_between_histories() {
        let mut world = World::new();
        let mut history = UndoRedo::new(10);
        let object = placed(&mut world, MeshObject::new(Vec3::ZERO, "crate.obj"));

        // Deleting logs the reversal: a structural add.
        history.log_action(object.clone(), ActionKind::StructuralAdd, "");
        apply(
            &ActionRecord {
                target: object.clone(),
                kind: ActionKind::StructuralDelete,
                payload: String::new(),
            },
            &mut world,
        );
        assert!(!object.is_participating());
        assert!(world.is_empty());

        history.perform_undo(&mut world);
        assert!(object.is_participating());
        assert_eq!(world.selected(), Some(&object));
        {
            let redo = history.redo_history();
            let redo = redo.borrow();
            assert_eq!(redo.peek_last().unwrap().kind, ActionKind::StructuralDelete);
            assert!(redo.peek_last().unwrap().payload.is_empty());
        }

        history.perform_redo(&mut world);
        assert!(!object.is_participating());
        assert!(!world.contains(object.id()));
        assert_eq!(
            history.undo_history().peek_last().unwrap().kind,
            ActionKind::StructuralAdd
        );
    }

    #[test]
    fn structural_add_rebuilds_presentation() {
        let mut world = World::new();
        let gate = EntityRef::new(Gate::new(Vec3::ZERO, 1));
        let record = ActionRecord {
            target: gate.clone(),
            kind: ActionKind::StructuralAdd,
            payload: String::new(),
        };
        apply(&record, &mut world);
        apply(&record, &mut world);
        assert_eq!(gate.borrow().presence().generation(), 2);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn stale_attribute_record_is_ignored() {
        let mut world = World::new();
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));
        let record = ActionRecord {
            target: gate.clone(),
            kind: ActionKind::Mesh,
            payload: "rock.obj".into(),
        };
        apply(&record, &mut world);
        assert_eq!(gate.canonical_attributes(), "Gate;0;0;0;0;0;0;1");
    }

    #[test]
    fn new_edit_invalidates_redo() {
        let mut world = World::new();
        let mut history = UndoRedo::new(10);
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));
        move_to(&mut history, &gate, Vec3::ONE);
        history.perform_undo(&mut world);
        assert!(history.can_redo());

        move_to(&mut history, &gate, Vec3::new(2.0, 2.0, 2.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn targets_are_deduplicated() {
        let mut world = World::new();
        let mut history = UndoRedo::new(10);
        let gate = placed(&mut world, Gate::new(Vec3::ZERO, 1));
        move_to(&mut history, &gate, Vec3::ONE);
        move_to(&mut history, &gate, Vec3::ZERO);
        history.perform_undo(&mut world);
        assert_eq!(history.targets(), vec![gate]);
    }
}
