//! Object variants placed in a map.
//!
//! Each variant implements [`Editable`]; [`Category`] maps the tag in field 0
//! of a canonical attribute string back to the variant that produced it.

use std::fmt;

use crate::attribute::{AttributeValue, Colour, Vec3, check_text};
use crate::canonical::{FieldReader, FieldWriter};
use crate::entity::{Editable, Presence, unsupported};
use crate::error::CoreError;
use crate::kind::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Object,
    WaterPlane,
    Portal,
    Gate,
    Particle,
    Light,
    Billboard,
    CollBox,
    CollSphere,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::Object,
        Self::WaterPlane,
        Self::Portal,
        Self::Gate,
        Self::Particle,
        Self::Light,
        Self::Billboard,
        Self::CollBox,
        Self::CollSphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::WaterPlane => "WaterPlane",
            Self::Portal => "Portal",
            Self::Gate => "Gate",
            Self::Particle => "Particle",
            Self::Light => "Light",
            Self::Billboard => "Billboard",
            Self::CollBox => "CollBox",
            Self::CollSphere => "CollSphere",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }

    /// Attribute kinds carried by this category, in canonical field order.
    pub fn attribute_kinds(&self) -> &'static [ActionKind] {
        use ActionKind::*;
        match self {
            Self::Object => &[Position, Mesh, Rotation, Scale],
            Self::WaterPlane => &[Position, Scale, WaterColour],
            Self::Portal => &[Position, Rotation, PortalTarget],
            Self::Gate => &[Position, Rotation, GateLink],
            Self::Particle => &[Position, ParticleName, ParticleLayer],
            Self::Light => &[Position, LightColour, LightRadius],
            Self::Billboard => &[Position, BillboardTexture, Scale],
            Self::CollBox => &[Position, Rotation, Scale],
            Self::CollSphere => &[Position, CollisionRadius],
        }
    }

    /// Builds a fresh, non-participating entity from a canonical attribute
    /// string.
    pub fn parse_attributes(s: &str) -> Result<Box<dyn Editable>, CoreError> {
        let mut reader = FieldReader::new(s);
        let category = Self::parse(reader.text()?)?;
        let position = reader.vec3()?;
        let object: Box<dyn Editable> = match category {
            Self::Object => Box::new(MeshObject {
                position,
                mesh: reader.text()?.to_string(),
                rotation: reader.vec3()?,
                scale: reader.vec3()?,
                presence: Presence::default(),
            }),
            Self::WaterPlane => Box::new(WaterPlane {
                position,
                scale: reader.vec3()?,
                colour: reader.colour()?,
                presence: Presence::default(),
            }),
            Self::Portal => Box::new(Portal {
                position,
                rotation: reader.vec3()?,
                target: reader.text()?.to_string(),
                presence: Presence::default(),
            }),
            Self::Gate => Box::new(Gate {
                position,
                rotation: reader.vec3()?,
                link: reader.int()?,
                presence: Presence::default(),
            }),
            Self::Particle => Box::new(ParticleEmitter {
                position,
                name: reader.text()?.to_string(),
                layer: reader.int()?,
                presence: Presence::default(),
            }),
            Self::Light => Box::new(Light {
                position,
                colour: reader.colour()?,
                radius: reader.float()?,
                presence: Presence::default(),
            }),
            Self::Billboard => Box::new(Billboard {
                position,
                texture: reader.text()?.to_string(),
                scale: reader.vec3()?,
                presence: Presence::default(),
            }),
            Self::CollBox => Box::new(CollisionBox {
                position,
                rotation: reader.vec3()?,
                scale: reader.vec3()?,
                presence: Presence::default(),
            }),
            Self::CollSphere => Box::new(CollisionSphere {
                position,
                radius: reader.float()?,
                presence: Presence::default(),
            }),
        };
        reader.finish()?;
        Ok(object)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mismatch(category: Category, kind: ActionKind, value: &AttributeValue) -> CoreError {
    if category.attribute_kinds().contains(&kind) {
        CoreError::InvalidValue {
            kind: kind.to_string(),
            reason: format!("expected {:?}, got {:?}", kind.value_type(), value.value_type()),
        }
    } else {
        unsupported(category, kind)
    }
}

fn text_value(kind: ActionKind, s: String) -> Result<String, CoreError> {
    check_text(&s).map_err(|reason| CoreError::InvalidValue {
        kind: kind.to_string(),
        reason,
    })?;
    Ok(s)
}

// ============================================================================
// Meshed objects
// ============================================================================

#[derive(Debug, Clone)]
pub struct MeshObject {
    pub position: Vec3,
    pub mesh: String,
    pub rotation: Vec3,
    pub scale: Vec3,
    presence: Presence,
}

impl MeshObject {
    pub fn new(position: Vec3, mesh: impl Into<String>) -> Self {
        Self {
            position,
            mesh: mesh.into(),
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            presence: Presence::default(),
        }
    }
}

impl Editable for MeshObject {
    fn category(&self) -> Category {
        Category::Object
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Object.as_str())
            .vec3(self.position)
            .text(&self.mesh)
            .vec3(self.rotation)
            .vec3(self.scale)
            .finish()
    }

    // Position alone is ambiguous: several meshes are often stacked at the
    // same spot.
    fn identity(&self) -> String {
        format!("{}|{}|{}", Category::Object, self.mesh, self.position)
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::Mesh => Some(AttributeValue::Text(self.mesh.clone())),
            ActionKind::Rotation => Some(AttributeValue::Vec3(self.rotation)),
            ActionKind::Scale => Some(AttributeValue::Vec3(self.scale)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::Mesh, AttributeValue::Text(s)) => self.mesh = text_value(kind, s)?,
            (ActionKind::Rotation, AttributeValue::Vec3(v)) => self.rotation = v,
            (ActionKind::Scale, AttributeValue::Vec3(v)) => self.scale = v,
            (kind, value) => return Err(mismatch(Category::Object, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

// ============================================================================
// Water planes
// ============================================================================

#[derive(Debug, Clone)]
pub struct WaterPlane {
    pub position: Vec3,
    pub scale: Vec3,
    pub colour: Colour,
    presence: Presence,
}

impl WaterPlane {
    pub fn new(position: Vec3, scale: Vec3, colour: Colour) -> Self {
        Self {
            position,
            scale,
            colour,
            presence: Presence::default(),
        }
    }
}

impl Editable for WaterPlane {
    fn category(&self) -> Category {
        Category::WaterPlane
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::WaterPlane.as_str())
            .vec3(self.position)
            .vec3(self.scale)
            .colour(self.colour)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::Scale => Some(AttributeValue::Vec3(self.scale)),
            ActionKind::WaterColour => Some(AttributeValue::Colour(self.colour)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::Scale, AttributeValue::Vec3(v)) => self.scale = v,
            (ActionKind::WaterColour, AttributeValue::Colour(c)) => self.colour = c,
            (kind, value) => return Err(mismatch(Category::WaterPlane, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

// ============================================================================
// Portals and gates
// ============================================================================

#[derive(Debug, Clone)]
pub struct Portal {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Map the portal leads to.
    pub target: String,
    presence: Presence,
}

impl Portal {
    pub fn new(position: Vec3, target: impl Into<String>) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            target: target.into(),
            presence: Presence::default(),
        }
    }
}

impl Editable for Portal {
    fn category(&self) -> Category {
        Category::Portal
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Portal.as_str())
            .vec3(self.position)
            .vec3(self.rotation)
            .text(&self.target)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::Rotation => Some(AttributeValue::Vec3(self.rotation)),
            ActionKind::PortalTarget => Some(AttributeValue::Text(self.target.clone())),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::Rotation, AttributeValue::Vec3(v)) => self.rotation = v,
            (ActionKind::PortalTarget, AttributeValue::Text(s)) => {
                self.target = text_value(kind, s)?
            }
            (kind, value) => return Err(mismatch(Category::Portal, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Id of the gate on the other side.
    pub link: u32,
    presence: Presence,
}

impl Gate {
    pub fn new(position: Vec3, link: u32) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            link,
            presence: Presence::default(),
        }
    }
}

impl Editable for Gate {
    fn category(&self) -> Category {
        Category::Gate
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Gate.as_str())
            .vec3(self.position)
            .vec3(self.rotation)
            .int(self.link)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::Rotation => Some(AttributeValue::Vec3(self.rotation)),
            ActionKind::GateLink => Some(AttributeValue::Int(self.link)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::Rotation, AttributeValue::Vec3(v)) => self.rotation = v,
            (ActionKind::GateLink, AttributeValue::Int(n)) => self.link = n,
            (kind, value) => return Err(mismatch(Category::Gate, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

// ============================================================================
// Particle effects
// ============================================================================

#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    pub position: Vec3,
    pub name: String,
    pub layer: u32,
    presence: Presence,
}

impl ParticleEmitter {
    pub fn new(position: Vec3, name: impl Into<String>, layer: u32) -> Self {
        Self {
            position,
            name: name.into(),
            layer,
            presence: Presence::default(),
        }
    }
}

impl Editable for ParticleEmitter {
    fn category(&self) -> Category {
        Category::Particle
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Particle.as_str())
            .vec3(self.position)
            .text(&self.name)
            .int(self.layer)
            .finish()
    }

    // Layered effects share a position and differ only by name.
    fn identity(&self) -> String {
        format!("{}|{}|{}", Category::Particle, self.name, self.position)
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::ParticleName => Some(AttributeValue::Text(self.name.clone())),
            ActionKind::ParticleLayer => Some(AttributeValue::Int(self.layer)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::ParticleName, AttributeValue::Text(s)) => {
                self.name = text_value(kind, s)?
            }
            (ActionKind::ParticleLayer, AttributeValue::Int(n)) => self.layer = n,
            (kind, value) => return Err(mismatch(Category::Particle, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

// ============================================================================
// Lights and billboards
// ============================================================================

#[derive(Debug, Clone)]
pub struct Light {
    pub position: Vec3,
    pub colour: Colour,
    pub radius: f32,
    presence: Presence,
}

impl Light {
    pub fn new(position: Vec3, colour: Colour, radius: f32) -> Self {
        Self {
            position,
            colour,
            radius,
            presence: Presence::default(),
        }
    }
}

impl Editable for Light {
    fn category(&self) -> Category {
        Category::Light
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Light.as_str())
            .vec3(self.position)
            .colour(self.colour)
            .float(self.radius)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::LightColour => Some(AttributeValue::Colour(self.colour)),
            ActionKind::LightRadius => Some(AttributeValue::Float(self.radius)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::LightColour, AttributeValue::Colour(c)) => self.colour = c,
            (ActionKind::LightRadius, AttributeValue::Float(r)) => self.radius = r,
            (kind, value) => return Err(mismatch(Category::Light, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

#[derive(Debug, Clone)]
pub struct Billboard {
    pub position: Vec3,
    pub texture: String,
    pub scale: Vec3,
    presence: Presence,
}

impl Billboard {
    pub fn new(position: Vec3, texture: impl Into<String>) -> Self {
        Self {
            position,
            texture: texture.into(),
            scale: Vec3::ONE,
            presence: Presence::default(),
        }
    }
}

impl Editable for Billboard {
    fn category(&self) -> Category {
        Category::Billboard
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::Billboard.as_str())
            .vec3(self.position)
            .text(&self.texture)
            .vec3(self.scale)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::BillboardTexture => Some(AttributeValue::Text(self.texture.clone())),
            ActionKind::Scale => Some(AttributeValue::Vec3(self.scale)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::BillboardTexture, AttributeValue::Text(s)) => {
                self.texture = text_value(kind, s)?
            }
            (ActionKind::Scale, AttributeValue::Vec3(v)) => self.scale = v,
            (kind, value) => return Err(mismatch(Category::Billboard, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

// ============================================================================
// Collision volumes
// ============================================================================

#[derive(Debug, Clone)]
pub struct CollisionBox {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    presence: Presence,
}

impl CollisionBox {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale,
            presence: Presence::default(),
        }
    }
}

impl Editable for CollisionBox {
    fn category(&self) -> Category {
        Category::CollBox
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::CollBox.as_str())
            .vec3(self.position)
            .vec3(self.rotation)
            .vec3(self.scale)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::Rotation => Some(AttributeValue::Vec3(self.rotation)),
            ActionKind::Scale => Some(AttributeValue::Vec3(self.scale)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::Rotation, AttributeValue::Vec3(v)) => self.rotation = v,
            (ActionKind::Scale, AttributeValue::Vec3(v)) => self.scale = v,
            (kind, value) => return Err(mismatch(Category::CollBox, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}

#[derive(Debug, Clone)]
pub struct CollisionSphere {
    pub position: Vec3,
    pub radius: f32,
    presence: Presence,
}

impl CollisionSphere {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            presence: Presence::default(),
        }
    }
}

impl Editable for CollisionSphere {
    fn category(&self) -> Category {
        Category::CollSphere
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn canonical_attributes(&self) -> String {
        FieldWriter::new(Category::CollSphere.as_str())
            .vec3(self.position)
            .float(self.radius)
            .finish()
    }

    fn attribute(&self, kind: ActionKind) -> Option<AttributeValue> {
        match kind {
            ActionKind::Position => Some(AttributeValue::Vec3(self.position)),
            ActionKind::CollisionRadius => Some(AttributeValue::Float(self.radius)),
            _ => None,
        }
    }

    fn apply_attribute(
        &mut self,
        kind: ActionKind,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match (kind, value) {
            (ActionKind::Position, AttributeValue::Vec3(v)) => self.position = v,
            (ActionKind::CollisionRadius, AttributeValue::Float(r)) => self.radius = r,
            (kind, value) => return Err(mismatch(Category::CollSphere, kind, &value)),
        }
        Ok(())
    }

    fn presence(&self) -> &Presence {
        &self.presence
    }

    fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }
}
