// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Name Value Object with Naming Invariants

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Pattern every user-supplied resource name must match
pub const NAME_PATTERN: &str = "^[A-z]([a-z0-9-]*[a-z0-9])*$";

/// Resource name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is empty")]
    Empty,

    #[error("Name must follow the regex pattern: /^[A-z]([a-z0-9-]*[a-z0-9])*$/s")]
    Pattern(String),
}

fn name_regex() -> &'static Regex {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    NAME_REGEX.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern compiles"))
}

/// Check a candidate name against [`NAME_PATTERN`]
pub fn is_valid_name(candidate: &str) -> bool {
    name_regex().is_match(candidate)
}

/// Resource name value object
///
/// Invariants:
/// - Non-empty
/// - Starts with a letter
/// - Lowercase letters, digits and hyphens afterwards
/// - Does not end with a hyphen
///
/// # Examples
///
/// ```rust
/// use craig_store::domain::ResourceName;
///
/// assert!(ResourceName::new("management-vpc").is_ok());
/// assert!(ResourceName::new("bad-").is_err());
/// assert!(ResourceName::new("9lives").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    /// Create a new resource name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(NameError::Empty);
        }

        if !is_valid_name(&name) {
            return Err(NameError::Pattern(name));
        }

        Ok(Self(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the subnet a tier materializes in a zone
    pub fn zone_subnet(&self, zone: u8) -> String {
        format!("{}-zone-{}", self.0, zone)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ResourceName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.0
    }
}

/// Split a derived subnet name (`tier-zone-N`) into tier name and zone
pub fn split_zone_subnet(name: &str) -> Option<(&str, u8)> {
    let (tier, zone) = name.rsplit_once("-zone-")?;
    let zone = zone.parse::<u8>().ok()?;
    if tier.is_empty() || zone == 0 {
        return None;
    }
    Some((tier, zone))
}
