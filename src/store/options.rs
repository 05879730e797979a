// Copyright (c) 2025 - Cowboy AI, Inc.
//! `_options` and activity tracker updates

use serde_json::Value;
use tracing::{debug, info};

use super::subnets::drop_subnets;
use super::{merge_fields, Mutation, Store};
use crate::allocator;
use crate::config::StoreConfig;
use crate::domain::{Atracker, ConfigDocument, NetworkError, Options, ResourceKind, TierShape, MAX_ZONES};
use crate::errors::{StoreError, StoreResult};

impl Store {
    /// Merge `update` over the document options
    ///
    /// Reducing the zone count drops subnets in the removed zones from every
    /// tier; toggling `dynamic_subnets` re-derives every CIDR.
    pub fn save_options(&mut self, update: Value) -> StoreResult<()> {
        self.transact(|doc, config| {
            let readdressed = save_options(doc, config, update)?;
            Ok(Mutation::OptionsSaved { readdressed })
        })
    }

    /// Merge `update` over the activity tracker settings
    pub fn save_atracker(&mut self, update: Value) -> StoreResult<()> {
        self.transact(|doc, _| {
            let mut merged = serde_json::to_value(&doc.atracker)?;
            merge_fields(&mut merged, update)?;
            let mut atracker: Atracker = serde_json::from_value(merged)?;
            if !atracker.instance {
                atracker.plan = None;
                atracker.resource_group = None;
            }
            doc.atracker = atracker;
            Ok(Mutation::AtrackerSaved)
        })
    }
}

fn save_options(doc: &mut ConfigDocument, config: &StoreConfig, update: Value) -> StoreResult<bool> {
    let previous = doc.options.clone();
    let mut merged = serde_json::to_value(&previous)?;
    merge_fields(&mut merged, update)?;
    let options: Options = serde_json::from_value(merged)?;

    if options.zones == 0 || options.zones > MAX_ZONES {
        return Err(NetworkError::InvalidZone(options.zones).into());
    }
    if let Some(edge) = &options.edge_vpc_name {
        if doc.vpc(edge.as_str()).is_none() {
            return Err(StoreError::not_found(ResourceKind::Vpc, edge.as_str()));
        }
    }

    let zones = options.zones;
    let readdress = options.dynamic_subnets != previous.dynamic_subnets;
    doc.options = options;

    if zones < previous.zones {
        restrict_zones(doc, zones);
    }
    if readdress {
        info!(dynamic = doc.options.dynamic_subnets, "Addressing mode changed");
        allocator::rederive(doc, config.octet_carry)?;
    }
    Ok(readdress)
}

/// Drop every subnet, tier zone and public gateway beyond `zones`
fn restrict_zones(doc: &mut ConfigDocument, zones: u8) {
    for v in 0..doc.vpcs.len() {
        let vpc = &mut doc.vpcs[v];
        vpc.public_gateways.retain(|z| *z <= zones);

        for tier in &mut vpc.subnet_tiers {
            match &mut tier.shape {
                TierShape::Fixed { zones: count } => *count = (*count).min(zones),
                TierShape::Advanced { select_zones } => select_zones.retain(|z| *z <= zones),
            }
        }
        vpc.subnet_tiers
            .retain(|t| !(t.is_advanced() && t.zone_list().is_empty()));

        let removed: Vec<String> = vpc
            .subnets
            .iter()
            .filter(|s| s.zone > zones)
            .map(|s| s.name.clone())
            .collect();
        let name = vpc.name.clone();
        drop_subnets(doc, &name, &removed);
        debug!(vpc = %name, zones, removed = removed.len(), "Restricted zones");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> Store {
        Store::new(StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_reducing_zones_truncates_tiers() {
        let mut store = store();
        store.save_options(json!({"zones": 1})).unwrap();

        let doc = store.document();
        assert_eq!(doc.options.zones, 1);
        let vpc = doc.vpc("management").unwrap();
        assert_eq!(vpc.tier("vsi").unwrap().shape, TierShape::Fixed { zones: 1 });
        assert_eq!(vpc.subnets.len(), 3);
        assert_eq!(doc.clusters[0].subnets.len(), 1);
    }

    #[test]
    fn test_invalid_zone_count_is_rejected() {
        let mut store = store();
        let result = store.save_options(json!({"zones": 4}));
        assert!(matches!(result, Err(StoreError::Network(_))));
    }

    #[test]
    fn test_edge_vpc_must_exist() {
        let mut store = store();
        let result = store.save_options(json!({"edge_vpc_name": "edge"}));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        store.save_options(json!({"edge_vpc_name": "management"})).unwrap();
    }

    #[test]
    fn test_toggle_addressing_mode_rederives() {
        let mut store = store();
        store.save_options(json!({"dynamic_subnets": false})).unwrap();
        let subnet = store.subnet("management", "vsi-zone-2").unwrap();
        assert_eq!(subnet.cidr.unwrap().to_string(), "10.20.10.0/24");
        assert!(subnet.has_prefix);

        store.save_options(json!({"dynamic_subnets": true})).unwrap();
        let vpc = store.document().vpc("management").unwrap();
        assert!(vpc.address_prefixes.is_empty());
        assert_eq!(vpc.subnet("vsi-zone-2").unwrap().cidr.unwrap().to_string(), "10.20.0.0/29");
    }

    #[test]
    fn test_atracker_instance_fields() {
        let mut store = store();
        store
            .save_atracker(json!({"instance": true, "plan": "lite", "resource_group": "service-rg"}))
            .unwrap();
        assert_eq!(store.document().atracker.plan.as_deref(), Some("lite"));

        store.save_atracker(json!({"instance": false})).unwrap();
        assert!(store.document().atracker.plan.is_none());
        assert!(store.document().atracker.bucket.is_some());
    }
}
