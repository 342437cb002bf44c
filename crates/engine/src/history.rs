use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use mapedit_core::{ActionKind, EntityRef};

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Describes how to reverse one edit: applying the record restores the
/// state that existed before the edit that logged it.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub target: EntityRef,
    pub kind: ActionKind,
    /// Serialized prior value of the attribute; empty for structural kinds.
    pub payload: String,
}

/// Whether a record comes from a user edit or from moving a record between
/// the undo and redo histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrigin {
    Edit,
    Transfer,
}

pub type SharedHistory = Rc<RefCell<ActionHistory>>;

/// Bounded stack of action records. Overflow evicts the oldest record.
pub struct ActionHistory {
    records: VecDeque<ActionRecord>,
    capacity: usize,
    /// Cleared by every [`LogOrigin::Edit`] push.
    linked: Option<SharedHistory>,
}

impl ActionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
            linked: None,
        }
    }

    pub fn with_linked(capacity: usize, linked: SharedHistory) -> Self {
        Self {
            linked: Some(linked),
            ..Self::new(capacity)
        }
    }

    /// Pushes a record. No kind/payload validation happens here.
    /// Returns the record evicted to stay within capacity, if any.
    pub fn log_action(
        &mut self,
        target: EntityRef,
        kind: ActionKind,
        payload: impl Into<String>,
        origin: LogOrigin,
    ) -> Option<ActionRecord> {
        if origin == LogOrigin::Edit
            && let Some(linked) = &self.linked
        {
            linked.borrow_mut().clear();
        }

        self.records.push_back(ActionRecord {
            target,
            kind,
            payload: payload.into(),
        });

        if self.records.len() > self.capacity {
            let evicted = self.records.pop_front();
            if let Some(record) = &evicted {
                log::debug!(
                    "history full ({}), evicting oldest {} record for {:?}",
                    self.capacity,
                    record.kind,
                    record.target.id()
                );
            }
            return evicted;
        }
        None
    }

    /// Most recent record, or `None` when nothing is available.
    pub fn pop_last_action(&mut self) -> Option<ActionRecord> {
        self.records.pop_back()
    }

    pub fn peek_last(&self) -> Option<&ActionRecord> {
        self.records.back()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        self.records.iter()
    }

    /// Record kinds, most recent first, for history display.
    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.records.iter().rev().map(|r| r.kind)
    }
}

impl std::fmt::Debug for ActionHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHistory")
            .field("len", &self.records.len())
            .field("capacity", &self.capacity)
            .field("linked", &self.linked.is_some())
            .finish()
    }
}
