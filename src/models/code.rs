use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::EntryError;

/// Fixed length of a unit code (T-code) after normalization.
pub const CODE_LEN: usize = 6;

/// A normalized unit code denoting one physical inventory unit.
///
/// Construction goes through [`CodeValue::parse`], which trims whitespace
/// and upper-cases before checking the format, so two scans of the same
/// physical label always compare equal regardless of how the scanner or
/// operator typed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeValue(String);

impl CodeValue {
    /// Normalizes and validates a raw operator input.
    ///
    /// Rejection here is purely local; no network call may be issued for
    /// input that fails this gate.
    pub fn parse(raw: &str) -> Result<Self, EntryError> {
        let normalized: String = raw.trim().to_uppercase();
        if normalized.chars().count() != CODE_LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(EntryError::Format(raw.trim().to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
