use std::fmt;

/// Category of a reversible edit.
///
/// Structural kinds carry no payload. Every other kind names one attribute
/// family and has a fixed [`ValueType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Position,
    StructuralAdd,
    StructuralDelete,
    Rotation,
    Scale,
    Mesh,
    WaterColour,
    PortalTarget,
    GateLink,
    ParticleName,
    ParticleLayer,
    LightColour,
    LightRadius,
    BillboardTexture,
    CollisionRadius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Vec3,
    Text,
    Float,
    Int,
    Colour,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::StructuralAdd => "add",
            Self::StructuralDelete => "delete",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Mesh => "mesh",
            Self::WaterColour => "water_colour",
            Self::PortalTarget => "portal_target",
            Self::GateLink => "gate_link",
            Self::ParticleName => "particle_name",
            Self::ParticleLayer => "particle_layer",
            Self::LightColour => "light_colour",
            Self::LightRadius => "light_radius",
            Self::BillboardTexture => "billboard_texture",
            Self::CollisionRadius => "collision_radius",
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralAdd | Self::StructuralDelete)
    }

    /// Kinds whose edits change the entity's identity string.
    pub fn affects_identity(&self) -> bool {
        matches!(self, Self::Position | Self::Mesh | Self::ParticleName)
    }

    /// `None` for structural kinds.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::StructuralAdd | Self::StructuralDelete => None,
            Self::Position | Self::Rotation | Self::Scale => Some(ValueType::Vec3),
            Self::Mesh | Self::PortalTarget | Self::ParticleName | Self::BillboardTexture => {
                Some(ValueType::Text)
            }
            Self::LightRadius | Self::CollisionRadius => Some(ValueType::Float),
            Self::GateLink | Self::ParticleLayer => Some(ValueType::Int),
            Self::WaterColour | Self::LightColour => Some(ValueType::Colour),
        }
    }

    /// Structural add and delete swap; attribute kinds map to themselves.
    pub fn inverse(&self) -> Self {
        match self {
            Self::StructuralAdd => Self::StructuralDelete,
            Self::StructuralDelete => Self::StructuralAdd,
            other => *other,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
