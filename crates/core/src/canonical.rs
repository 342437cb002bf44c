//! Semicolon-delimited canonical attribute strings.
//!
//! Field 0 is always the category tag, followed by the position as three
//! fields. Vectors and colours are spread over one field per component so
//! the string stays flat.

use crate::attribute::{Colour, Vec3, check_text, parse_float};
use crate::error::CoreError;

pub const FIELD_SEPARATOR: char = ';';

#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: Vec<String>,
}

impl FieldWriter {
    pub fn new(tag: &str) -> Self {
        Self {
            fields: vec![tag.to_string()],
        }
    }

    pub fn text(mut self, value: &str) -> Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn float(mut self, value: f32) -> Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn int(mut self, value: u32) -> Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn vec3(self, value: Vec3) -> Self {
        self.float(value.x).float(value.y).float(value.z)
    }

    pub fn colour(self, value: Colour) -> Self {
        self.int(value.r.into())
            .int(value.g.into())
            .int(value.b.into())
            .int(value.a.into())
    }

    pub fn finish(self) -> String {
        let mut buf = [0u8; 4];
        self.fields.join(FIELD_SEPARATOR.encode_utf8(&mut buf))
    }
}

/// Reads fields in order; every accessor fails with
/// [`CoreError::MalformedAttributes`] naming the offending field.
pub struct FieldReader<'a> {
    fields: std::str::Split<'a, char>,
    index: usize,
    source: &'a str,
}

impl<'a> FieldReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            fields: source.split(FIELD_SEPARATOR),
            index: 0,
            source,
        }
    }

    fn malformed(&self, reason: impl std::fmt::Display) -> CoreError {
        CoreError::MalformedAttributes(format!(
            "field {} of {:?}: {reason}",
            self.index, self.source
        ))
    }

    pub fn text(&mut self) -> Result<&'a str, CoreError> {
        let field = self
            .fields
            .next()
            .ok_or_else(|| self.malformed("missing"))?;
        self.index += 1;
        check_text(field).map_err(|e| self.malformed(e))?;
        Ok(field)
    }

    pub fn float(&mut self) -> Result<f32, CoreError> {
        let field = self.text()?;
        parse_float(field).map_err(|e| self.malformed(e))
    }

    pub fn int(&mut self) -> Result<u32, CoreError> {
        let field = self.text()?;
        field.trim().parse().map_err(|e| self.malformed(e))
    }

    pub fn byte(&mut self) -> Result<u8, CoreError> {
        let field = self.text()?;
        field.trim().parse().map_err(|e| self.malformed(e))
    }

    pub fn vec3(&mut self) -> Result<Vec3, CoreError> {
        Ok(Vec3::new(self.float()?, self.float()?, self.float()?))
    }

    pub fn colour(&mut self) -> Result<Colour, CoreError> {
        Ok(Colour::rgba(self.byte()?, self.byte()?, self.byte()?, self.byte()?))
    }

    /// Fails if any field is left over.
    pub fn finish(mut self) -> Result<(), CoreError> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(self.malformed(format!("unexpected trailing field {extra:?}"))),
        }
    }
}
