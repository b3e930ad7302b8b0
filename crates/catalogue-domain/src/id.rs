//! Identifier for stored catalogue entries

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate key of a stored catalogue entry
///
/// Assigned by the store at insert time from a UUIDv7, so the order of ids
/// is the order entries were written. Stored as a 16-byte blob, carried
/// over JSON as the hyphenated string. A `DuplicateKey` failure reports the
/// id of the entry that already holds the name.
///
/// ```
/// use catalogue_domain::ModelId;
///
/// let first = ModelId::new();
/// let text = first.to_string();
/// assert_eq!(ModelId::from_string(&text), Ok(first));
/// assert!(ModelId::from_value(first.value() + 1) > first);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ModelId(u128);

impl ModelId {
    /// Fresh id stamped with the current time
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Rebuild an id read back from a store row
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse the hyphenated form produced by `Display`
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid model id '{}': {}", s, e))
    }

    /// Integer form; the SQLite store writes its big-endian bytes
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Write time in Unix milliseconds
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ModelId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Ordering matches the underlying u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = ModelId::from_value(a);
            let id_b = ModelId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = ModelId::from_value(value);
            match ModelId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
