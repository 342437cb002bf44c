use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::kind::{ActionKind, ValueType};

/// Characters that would break the journal line format.
pub const RESERVED_CHARS: [char; 4] = [';', '|', '\n', '\r'];

#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        self.x.total_cmp(&other.x).is_eq()
            && self.y.total_cmp(&other.y).is_eq()
            && self.z.total_cmp(&other.z).is_eq()
    }
}

impl Eq for Vec3 {}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(format!("expected x,y,z, got {s:?}"));
        };
        Ok(Self::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Colour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|e| format!("{p:?}: {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        let [r, g, b, a] = parts.as_slice() else {
            return Err(format!("expected r,g,b,a, got {s:?}"));
        };
        Ok(Self::rgba(*r, *g, *b, *a))
    }
}

pub(crate) fn parse_float(s: &str) -> Result<f32, String> {
    let value: f32 = s.trim().parse().map_err(|e| format!("{s:?}: {e}"))?;
    if !value.is_finite() {
        return Err(format!("{s:?} is not finite"));
    }
    Ok(value)
}

pub(crate) fn check_text(s: &str) -> Result<(), String> {
    match s.chars().find(|c| RESERVED_CHARS.contains(c)) {
        Some(c) => Err(format!("{s:?} contains reserved character {c:?}")),
        None => Ok(()),
    }
}

/// A typed attribute value. Its `Display` form is the serialized payload
/// stored in action records and parses back to an equal value.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Vec3(Vec3),
    Text(String),
    Float(f32),
    Int(u32),
    Colour(Colour),
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Vec3(a), Self::Vec3(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Colour(a), Self::Colour(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl AttributeValue {
    /// Parses `s` as the value type of `kind`.
    pub fn parse(kind: ActionKind, s: &str) -> Result<Self, CoreError> {
        let invalid = |reason: String| CoreError::InvalidValue {
            kind: kind.to_string(),
            reason,
        };
        let value_type = kind
            .value_type()
            .ok_or_else(|| invalid("structural kinds carry no value".into()))?;
        match value_type {
            ValueType::Vec3 => s.parse().map(Self::Vec3).map_err(invalid),
            ValueType::Text => {
                check_text(s).map_err(invalid)?;
                Ok(Self::Text(s.to_string()))
            }
            ValueType::Float => parse_float(s).map(Self::Float).map_err(invalid),
            ValueType::Int => s
                .trim()
                .parse()
                .map(Self::Int)
                .map_err(|e| invalid(format!("{s:?}: {e}"))),
            ValueType::Colour => s.parse().map(Self::Colour).map_err(invalid),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Vec3(_) => ValueType::Vec3,
            Self::Text(_) => ValueType::Text,
            Self::Float(_) => ValueType::Float,
            Self::Int(_) => ValueType::Int,
            Self::Colour(_) => ValueType::Colour,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_colour(&self) -> Option<Colour> {
        match self {
            Self::Colour(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vec3(v) => v.fmt(f),
            Self::Text(s) => f.write_str(s),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Colour(c) => c.fmt(f),
        }
    }
}
