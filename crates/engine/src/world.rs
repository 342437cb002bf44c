use mapedit_core::{EntityId, EntityRef};

/// The placed-objects collection: every participating entity, in placement
/// order, plus the current selection.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<EntityRef>,
    selected: Option<EntityId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the entity is already present.
    pub fn insert(&mut self, entity: EntityRef) -> bool {
        if self.contains(entity.id()) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRef> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.entities.remove(index))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRef> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Identity collisions are not detected; the most recently placed
    /// match wins.
    pub fn find_by_identity(&self, identity: &str) -> Option<&EntityRef> {
        self.entities.iter().rev().find(|e| e.identity() == identity)
    }

    /// Like [`World::find_by_identity`], restricted to entities that exist in
    /// the saved map. Entities created this session never match.
    pub fn find_saved_by_identity(&self, identity: &str) -> Option<&EntityRef> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.is_persisted() && e.identity() == identity)
    }

    /// Ignored if the entity is not in the world.
    pub fn select(&mut self, id: EntityId) {
        if self.contains(id) {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&EntityRef> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
