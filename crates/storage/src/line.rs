//! Journal line format: `[<identity>|]<field0>;<field1>;...;<fieldN>`.
//!
//! Identity strings contain `|` themselves, and attribute fields never do,
//! so the prefix ends at the last `|` of the line.

use std::fmt;

use mapedit_core::{Category, Editable};

use crate::error::StorageError;

pub const IDENTITY_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLine {
    /// Present only for entities that already exist in the saved map.
    pub identity: Option<String>,
    pub attributes: String,
}

impl JournalLine {
    pub fn new(identity: Option<String>, attributes: String) -> Self {
        Self {
            identity,
            attributes,
        }
    }

    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse(line_no: usize, line: &str) -> Result<Self, StorageError> {
        let malformed = |reason: &str| StorageError::MalformedLine {
            line: line_no,
            reason: reason.to_string(),
        };
        let line = line.trim_end_matches('\r');
        let (identity, attributes) = match line.rsplit_once(IDENTITY_SEPARATOR) {
            Some(("", _)) => return Err(malformed("empty identity prefix")),
            Some((identity, attributes)) => (Some(identity.to_string()), attributes),
            None => (None, line),
        };
        if attributes.is_empty() {
            return Err(malformed("no attributes"));
        }
        Ok(Self {
            identity,
            attributes: attributes.to_string(),
        })
    }

    /// Rebuilds the entity described by the attribute part.
    pub fn entity(&self) -> Result<Box<dyn Editable>, StorageError> {
        Ok(Category::parse_attributes(&self.attributes)?)
    }
}

impl fmt::Display for JournalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(identity) = &self.identity {
            write!(f, "{identity}{IDENTITY_SEPARATOR}")?;
        }
        f.write_str(&self.attributes)
    }
}
