use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::attribute::{AttributeValue, Vec3};
use crate::error::CoreError;
use crate::ids::EntityId;
use crate::kind::ActionKind;
use crate::objects::Category;

/// Lifecycle state shared by every object variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    participating: bool,
    persisted: bool,
    generation: u32,
}

impl Presence {
    /// Number of times the runtime presentation has been rebuilt.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Capability set every object the editor manipulates implements.
pub trait Editable: fmt::Debug {
    fn category(&self) -> Category;

    fn position(&self) -> Vec3;

    /// `;`-delimited attributes in a stable order, starting with the
    /// category tag. Used for the recovery journal and textual export.
    fn canonical_attributes(&self) -> String;

    /// Distinguishes this entity among siblings of the same category.
    fn identity(&self) -> String {
        format!("{}|{}", self.category(), self.position())
    }

    /// `None` if this variant has no such attribute.
    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue>;

    fn apply_attribute(&mut self, kind: ActionKind, value: AttributeValue) -> Result<(), CoreError>;

    fn presence(&self) -> &Presence;

    fn presence_mut(&mut self) -> &mut Presence;

    fn is_participating(&self) -> bool {
        self.presence().participating
    }

    fn set_participating(&mut self, participating: bool) {
        self.presence_mut().participating = participating;
    }

    /// Rebuilds the runtime presentation from the attributes currently held.
    fn reconstruct_presentation(&mut self) {
        let presence = self.presence_mut();
        presence.generation = presence.generation.wrapping_add(1);
    }

    /// Whether the entity exists in the permanent save target.
    fn is_persisted(&self) -> bool {
        self.presence().persisted
    }

    fn set_persisted(&mut self, persisted: bool) {
        self.presence_mut().persisted = persisted;
    }
}

pub(crate) fn unsupported(category: Category, kind: ActionKind) -> CoreError {
    CoreError::UnsupportedAttribute {
        category: category.to_string(),
        kind: kind.to_string(),
    }
}

/// Shared handle to an editable entity.
///
/// Clones refer to the same entity; equality compares [`EntityId`]s. The
/// entity is freed once the world, both histories and the recovery journal
/// have all dropped their handles.
#[derive(Clone)]
pub struct EntityRef {
    id: EntityId,
    inner: Rc<RefCell<Box<dyn Editable>>>,
}

impl EntityRef {
    pub fn new(object: impl Editable + 'static) -> Self {
        Self::from_boxed(Box::new(object))
    }

    pub fn from_boxed(object: Box<dyn Editable>) -> Self {
        Self {
            id: EntityId::new(),
            inner: Rc::new(RefCell::new(object)),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn borrow(&self) -> Ref<'_, Box<dyn Editable>> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Box<dyn Editable>> {
        self.inner.borrow_mut()
    }

    /// Number of live handles, including this one.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    pub fn identity(&self) -> String {
        self.borrow().identity()
    }

    pub fn canonical_attributes(&self) -> String {
        self.borrow().canonical_attributes()
    }

    pub fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        self.borrow().attribute(kind)
    }

    pub fn is_participating(&self) -> bool {
        self.borrow().is_participating()
    }

    pub fn is_persisted(&self) -> bool {
        self.borrow().is_persisted()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("EntityRef")
                .field("id", &self.id)
                .field("identity", &inner.identity())
                .finish(),
            Err(_) => f.debug_struct("EntityRef").field("id", &self.id).finish(),
        }
    }
}
