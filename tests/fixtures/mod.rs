// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for craig-store
//!
//! Deterministic stores and documents shared by the integration suites.
//! Every fixture starts from a built-in template or a literal JSON document,
//! never from files on disk.

#![allow(dead_code)]

use craig_store::allocator::OctetCarry;
use craig_store::domain::{ConfigDocument, Template};
use craig_store::{Store, StoreConfig};
use serde_json::{json, Value};

/// Default two-VPC topology with dynamic addressing
pub fn default_store() -> Store {
    Store::new(StoreConfig::default()).expect("default template builds")
}

/// Default topology switched to static addressing
pub fn static_store() -> Store {
    let mut store = default_store();
    store
        .save_options(json!({"dynamic_subnets": false}))
        .expect("static addressing applies");
    store
}

/// Default topology packed with exact octet carry
pub fn exact_store() -> Store {
    Store::new(StoreConfig::default().with_octet_carry(OctetCarry::Exact))
        .expect("default template builds")
}

/// Store holding no records at all
pub fn empty_store() -> Store {
    Store::new(StoreConfig::default().with_template(Template::Empty))
        .expect("empty template builds")
}

/// CIDR of a subnet as text, empty when unset or missing
pub fn cidr(doc: &ConfigDocument, vpc: &str, subnet: &str) -> String {
    doc.vpc(vpc)
        .and_then(|v| v.subnet(subnet))
        .and_then(|s| s.cidr)
        .map(|c| c.to_string())
        .unwrap_or_default()
}

/// Subnet names of a VPC in document order
pub fn subnet_names(doc: &ConfigDocument, vpc: &str) -> Vec<String> {
    doc.vpc(vpc)
        .map(|v| v.subnets.iter().map(|s| s.name.clone()).collect())
        .unwrap_or_default()
}

/// Edge VPC document as exported by an older release: no tiers, no
/// back-pointers, one reference to a resource group that does not exist
pub fn legacy_edge_document() -> Value {
    json!({
        "_options": {
            "prefix": "edge",
            "region": "us-east",
            "zones": 3,
            "dynamic_subnets": true,
            "edge_vpc_name": "edge"
        },
        "resource_groups": [{"name": "edge-rg", "use_prefix": true}],
        "vpcs": [{
            "name": "edge",
            "resource_group": "edge-rg",
            "publicGateways": [1, 2],
            "acls": [{"name": "edge-acl", "resource_group": "edge-rg", "rules": []}],
            "subnets": [
                {"name": "f5-bastion-zone-1", "zone": 1, "network_acl": "edge-acl"},
                {"name": "f5-bastion-zone-2", "zone": 2, "network_acl": "edge-acl"},
                {"name": "f5-bastion-zone-3", "zone": 3, "network_acl": "edge-acl"},
                {"name": "vpn-1-zone-1", "zone": 1, "network_acl": "edge-acl"},
                {"name": "jump", "zone": 2, "network_acl": "edge-acl", "resource_group": "gone-rg"}
            ]
        }],
        "vpn_gateways": [{
            "name": "edge-gateway",
            "resource_group": "edge-rg",
            "vpc": "edge",
            "subnet": "vpn-1-zone-1"
        }]
    })
}
