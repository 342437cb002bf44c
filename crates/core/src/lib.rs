pub mod attribute;
pub mod canonical;
pub mod entity;
pub mod error;
pub mod ids;
pub mod kind;
pub mod objects;

pub use attribute::{AttributeValue, Colour, Vec3};
pub use entity::{Editable, EntityRef, Presence};
pub use error::CoreError;
pub use ids::EntityId;
pub use kind::{ActionKind, ValueType};
pub use objects::*;
