// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store configuration

use std::env;
use tracing::warn;

use crate::allocator::OctetCarry;
use crate::domain::Template;

/// Environment variable selecting the octet carry mode
pub const OCTET_CARRY_VAR: &str = "CRAIG_OCTET_CARRY";

/// Environment variable selecting the starting template
pub const TEMPLATE_VAR: &str = "CRAIG_TEMPLATE";

/// Configuration for a [`Store`](crate::store::Store)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How dynamic addressing carries an overflowing octet
    pub octet_carry: OctetCarry,
    /// Topology a new store starts from
    pub template: Template,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            octet_carry: OctetCarry::Legacy,
            template: Template::Default,
        }
    }
}

impl StoreConfig {
    /// Read overrides from the environment, keeping defaults for unset or
    /// unparseable values
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var(OCTET_CARRY_VAR) {
            match value.parse() {
                Ok(carry) => config.octet_carry = carry,
                Err(err) => warn!(var = OCTET_CARRY_VAR, %err, "Ignoring invalid setting"),
            }
        }

        if let Ok(value) = env::var(TEMPLATE_VAR) {
            match value.parse() {
                Ok(template) => config.template = template,
                Err(err) => warn!(var = TEMPLATE_VAR, %err, "Ignoring invalid setting"),
            }
        }

        config
    }

    pub fn with_octet_carry(mut self, octet_carry: OctetCarry) -> Self {
        self.octet_carry = octet_carry;
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_legacy_output() {
        let config = StoreConfig::default();
        assert_eq!(config.octet_carry, OctetCarry::Legacy);
        assert_eq!(config.template, Template::Default);
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::default()
            .with_octet_carry(OctetCarry::Exact)
            .with_template(Template::Empty);
        assert_eq!(config.octet_carry, OctetCarry::Exact);
        assert_eq!(config.template, Template::Empty);
    }
}
