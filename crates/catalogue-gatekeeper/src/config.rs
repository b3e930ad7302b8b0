//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Business rules applied on top of the structural checks
///
/// The structural checks (a record exists, the name is present, dates parse)
/// always run. Everything here is policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject records without an organization
    pub require_organization: bool,

    /// Reject records without a description
    pub require_description: bool,

    /// Enforce `max_field_length` on short text fields
    pub validate_field_lengths: bool,

    /// Maximum length of name, display name, organization and license
    pub max_field_length: usize,
}

impl Default for ValidationConfig {
    /// Accept partial records; only the name is mandatory
    fn default() -> Self {
        Self {
            require_organization: false,
            require_description: false,
            validate_field_lengths: true,
            max_field_length: 255,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (structural checks only)
    pub fn permissive() -> Self {
        Self {
            require_organization: false,
            require_description: false,
            validate_field_lengths: false,
            max_field_length: 255,
        }
    }

    /// Create a strict configuration (organization and description required)
    pub fn strict() -> Self {
        Self {
            require_organization: true,
            require_description: true,
            validate_field_lengths: true,
            max_field_length: 255,
        }
    }
}
