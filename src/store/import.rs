// Copyright (c) 2025 - Cowboy AI, Inc.
//! JSON import and export
//!
//! Import trusts nothing derived: back-pointers, tier membership, public
//! gateway flags and dynamic CIDRs are all recomputed. Static CIDRs carried
//! by the document are authoritative.

use std::collections::BTreeMap;
use tracing::{info, warn};

use super::{Mutation, Store};
use crate::domain::{normalize_zones, split_zone_subnet, ConfigDocument, SubnetTier, Vpc};
use crate::errors::{StoreError, StoreResult};
use crate::references;
use crate::registry::Registry;

impl Store {
    /// Replace the document with one parsed from JSON
    pub fn import_json(&mut self, json: &str) -> StoreResult<()> {
        let imported: ConfigDocument =
            serde_json::from_str(json).map_err(|err| StoreError::Import(err.to_string()))?;

        self.transact(move |doc, _| {
            if let Some(duplicate) = Registry::from_document(&imported).duplicates().first() {
                return Err(StoreError::Import(format!(
                    "{} name \"{}\" is used more than once",
                    duplicate.kind, duplicate.name
                )));
            }

            *doc = imported;
            doc.sync_back_pointers();
            for vpc in &mut doc.vpcs {
                derive_missing_tiers(vpc);
            }

            let sanitized = references::sanitize(doc);
            for reference in &sanitized {
                warn!(
                    path = reference.path,
                    kind = %reference.target.kind,
                    name = %reference.target.name,
                    "Dropped unresolved reference on import"
                );
            }
            info!(
                vpcs = doc.vpcs.len(),
                sanitized = sanitized.len(),
                "Imported configuration document"
            );
            Ok(Mutation::Imported {
                sanitized: sanitized.len(),
            })
        })
    }

    /// Pretty JSON of the committed document
    pub fn export_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }
}

/// Put every subnet without a valid tier into one
///
/// A tier listing the subnet wins; otherwise `tier-zone-N` naming groups
/// subnets, and anything else gets a single-zone tier of its own name.
fn derive_missing_tiers(vpc: &mut Vpc) {
    let Vpc {
        name: vpc_name,
        subnets,
        subnet_tiers,
        ..
    } = vpc;

    let mut derived: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();

    for subnet in subnets.iter_mut() {
        let known = subnet
            .tier
            .as_deref()
            .is_some_and(|t| subnet_tiers.iter().any(|tier| tier.name == t));
        if known {
            continue;
        }

        let listed = subnet_tiers
            .iter()
            .find(|tier| tier.subnets.contains(&subnet.name))
            .map(|tier| tier.name.clone());
        let tier = listed.unwrap_or_else(|| match split_zone_subnet(&subnet.name) {
            Some((tier, zone)) if zone == subnet.zone => tier.to_string(),
            _ => subnet.name.clone(),
        });

        if !subnet_tiers.iter().any(|t| t.name == tier) {
            if !derived.contains_key(&tier) {
                order.push(tier.clone());
            }
            derived.entry(tier.clone()).or_default().push(subnet.zone);
        }
        subnet.tier = Some(tier);
    }

    for name in order {
        let zones = normalize_zones(derived.remove(&name).unwrap_or_default());
        let tier = if zones.iter().copied().eq(1..=zones.len() as u8) {
            SubnetTier::fixed(name, zones.len() as u8)
        } else {
            SubnetTier::advanced(name, zones)
        };
        warn!(vpc = %vpc_name, tier = %tier.name, "Derived missing subnet tier");
        subnet_tiers.push(tier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::domain::TierShape;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> Store {
        Store::new(StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_export_then_import_is_stable() {
        let mut store = store();
        let exported = store.export_json().unwrap();
        let before = store.document().clone();
        store.import_json(&exported).unwrap();
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn test_import_rejects_duplicate_names() {
        let mut store = store();
        let json = json!({
            "resource_groups": [{"name": "rg"}, {"name": "rg"}]
        });
        let result = store.import_json(&json.to_string());
        assert!(matches!(result, Err(StoreError::Import(_))));
        assert_eq!(store.document().vpcs.len(), 2);
    }

    #[test]
    fn test_import_derives_tiers_and_drops_dangling_refs() {
        let mut store = store();
        let json = json!({
            "_options": {"dynamic_subnets": true},
            "vpcs": [{
                "name": "edge",
                "resource_group": "missing-rg",
                "subnets": [
                    {"name": "app-zone-1", "zone": 1},
                    {"name": "app-zone-2", "zone": 2},
                    {"name": "bastion", "zone": 3}
                ]
            }]
        });
        store.import_json(&json.to_string()).unwrap();

        let vpc = &store.document().vpcs[0];
        assert!(vpc.resource_group.is_none());
        assert_eq!(vpc.tier("app").unwrap().shape, TierShape::Fixed { zones: 2 });
        assert_eq!(
            vpc.tier("bastion").unwrap().shape,
            TierShape::Advanced { select_zones: vec![3] }
        );
        assert_eq!(vpc.subnet("app-zone-2").unwrap().cidr.unwrap().to_string(), "10.20.0.0/29");
    }

    #[test]
    fn test_static_import_keeps_cidrs() {
        let mut store = store();
        let json = json!({
            "_options": {"dynamic_subnets": false},
            "vpcs": [{
                "name": "edge",
                "subnetTiers": [{"name": "app", "zones": 1, "subnets": ["app-zone-1"]}],
                "subnets": [{"name": "app-zone-1", "zone": 1, "cidr": "10.5.0.0/26", "tier": "app"}]
            }]
        });
        store.import_json(&json.to_string()).unwrap();
        let subnet = store.subnet("edge", "app-zone-1").unwrap();
        assert_eq!(subnet.cidr.unwrap().to_string(), "10.5.0.0/26");
        assert!(!subnet.has_prefix);
    }

    #[test]
    fn test_malformed_json_is_an_import_error() {
        let mut store = store();
        assert!(matches!(store.import_json("{"), Err(StoreError::Import(_))));
    }
}
