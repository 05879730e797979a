// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Rules
//!
//! Building blocks shared by the forms. Every function is a pure check over
//! a value and, where uniqueness or scope matters, the validation context.

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

use super::ValidationContext;
use crate::domain::{is_valid_name, CidrBlock, ResourceKind, Subnet};

/// Message for a name that breaks the naming pattern
pub const NAME_PATTERN_TEXT: &str =
    "Name must follow the regex pattern: /^[A-z]([a-z0-9-]*[a-z0-9])*$/s";

/// Longest prefix accepted in `_options`
pub const MAX_PREFIX_LEN: usize = 16;

const TAG_PATTERN: &str =
    r"^([a-z]|[a-z][-a-z0-9]*[a-z0-9]|[0-9][-a-z0-9]*([a-z]|[-a-z][-a-z0-9]*[a-z0-9]))$";

const DOMAIN_PATTERN: &str = r"^([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}$";

const PUBLIC_KEY_PATTERN: &str = r"^ssh-rsa AAAA[0-9A-Za-z+/]+={0,3}( [^@\s]+@[^@\s]+)?$";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

/// Text for a duplicate name
pub fn duplicate_text(name: &str) -> String {
    format!("Name \"{name}\" already in use")
}

/// Check if `name` collides with a record of `kind` in the candidate's scope
pub fn is_duplicate(kind: ResourceKind, name: &str, ctx: &ValidationContext<'_>) -> bool {
    !ctx.is_original(name) && ctx.registry.siblings(kind, &ctx.parents).contains(&name)
}

pub fn invalid_name(kind: ResourceKind, name: &str, ctx: &ValidationContext<'_>) -> bool {
    !is_valid_name(name) || is_duplicate(kind, name, ctx)
}

/// Duplicate text takes precedence over the pattern text
pub fn invalid_name_text(kind: ResourceKind, name: &str, ctx: &ValidationContext<'_>) -> String {
    if is_duplicate(kind, name, ctx) {
        duplicate_text(name)
    } else {
        NAME_PATTERN_TEXT.to_string()
    }
}

/// Optional name field: unset is fine, anything set must match the pattern
pub fn invalid_optional_name(name: Option<&str>) -> bool {
    name.is_some_and(|n| !n.is_empty() && !is_valid_name(n))
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn invalid_prefix(prefix: &str) -> bool {
    !is_valid_name(prefix) || prefix.len() > MAX_PREFIX_LEN
}

pub fn invalid_tag(tag: &str) -> bool {
    static TAG: OnceLock<Regex> = OnceLock::new();
    tag.len() > 128 || !compiled(&TAG, TAG_PATTERN).is_match(tag)
}

pub fn invalid_domain(domain: &str) -> bool {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    !compiled(&DOMAIN, DOMAIN_PATTERN).is_match(domain)
}

pub fn invalid_public_key(key: Option<&str>) -> bool {
    static KEY: OnceLock<Regex> = OnceLock::new();
    !key.is_some_and(|k| compiled(&KEY, PUBLIC_KEY_PATTERN).is_match(k.trim()))
}

/// Parse an IPv4 CIDR block, `None` on malformed input
pub fn parse_cidr(value: Option<&str>) -> Option<CidrBlock> {
    value.and_then(|v| CidrBlock::new(v.trim()).ok())
}

pub fn invalid_cidr(value: Option<&str>) -> bool {
    parse_cidr(value).is_none()
}

/// Rule endpoint: a bare address or a CIDR block
pub fn invalid_ip_or_cidr(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_err() && CidrBlock::new(value).is_err()
}

/// Port range of a rule; both ends required once either is set
pub fn invalid_port_range(min: Option<u16>, max: Option<u16>) -> bool {
    match (min, max) {
        (None, None) => false,
        (Some(min), Some(max)) => min == 0 || max == 0 || min > max,
        _ => true,
    }
}

/// First sibling subnet whose range overlaps `cidr`
///
/// `own_name` is the subnet being edited, which never overlaps itself.
pub fn overlapping_subnet<'s>(
    siblings: &'s [Subnet],
    own_name: &str,
    cidr: &CidrBlock,
) -> Option<&'s Subnet> {
    siblings
        .iter()
        .filter(|s| s.name != own_name)
        .find(|s| s.cidr.is_some_and(|other| other.overlaps(cidr)))
}

/// Check that a reference to `kind` resolves, optionally inside `scope`
pub fn unresolved(
    kind: ResourceKind,
    scope: Option<&str>,
    name: Option<&str>,
    ctx: &ValidationContext<'_>,
) -> bool {
    !name.is_some_and(|n| ctx.registry.resolves(kind, scope, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigDocument, Locator, Template, DEFAULT_PUBLIC_KEY};
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("iac", false; "short prefix")]
    #[test_case("a-very-long-prefix", true; "longer than sixteen")]
    #[test_case("iac-", true; "trailing hyphen")]
    fn test_prefix(prefix: &str, invalid: bool) {
        assert_eq!(invalid_prefix(prefix), invalid);
    }

    #[test_case("hello", false)]
    #[test_case("1a", false)]
    #[test_case("Hello", true)]
    #[test_case("-x", true)]
    fn test_tags(tag: &str, invalid: bool) {
        assert_eq!(invalid_tag(tag), invalid);
    }

    #[test]
    fn test_name_text_prefers_duplicate() {
        let doc = ConfigDocument::from_template(Template::Default);
        let registry = Registry::from_document(&doc);
        let ctx = ValidationContext::new(&doc, &registry);

        assert_eq!(
            invalid_name_text(ResourceKind::Vpc, "management", &ctx),
            "Name \"management\" already in use"
        );
        assert_eq!(invalid_name_text(ResourceKind::Vpc, "Bad_", &ctx), NAME_PATTERN_TEXT);

        let edit = ctx.editing(&Locator::new("management"));
        assert!(!invalid_name(ResourceKind::Vpc, "management", &edit));
    }

    #[test]
    fn test_vpc_scoped_duplicates() {
        let doc = ConfigDocument::from_template(Template::Default);
        let registry = Registry::from_document(&doc);
        let workload = ValidationContext::new(&doc, &registry).within(["workload"]);
        assert!(!is_duplicate(ResourceKind::Subnet, "vpn-zone-1", &workload));
        assert!(is_duplicate(ResourceKind::Subnet, "vsi-zone-1", &workload));
    }

    #[test]
    fn test_public_keys() {
        assert!(!invalid_public_key(Some(DEFAULT_PUBLIC_KEY)));
        assert!(invalid_public_key(Some("ssh-rsa nope")));
        assert!(invalid_public_key(None));
    }

    #[test]
    fn test_ports_and_addresses() {
        assert!(!invalid_port_range(None, None));
        assert!(!invalid_port_range(Some(22), Some(22)));
        assert!(invalid_port_range(Some(443), Some(80)));
        assert!(invalid_port_range(Some(80), None));
        assert!(!invalid_ip_or_cidr("10.0.0.0/8"));
        assert!(!invalid_ip_or_cidr("161.26.0.1"));
        assert!(invalid_ip_or_cidr("any"));
    }

    #[test]
    fn test_domains() {
        assert!(!invalid_domain("example.com"));
        assert!(!invalid_domain("dev.example.com"));
        assert!(invalid_domain("example"));
    }
}
