// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subnet operations

use tracing::debug;

use super::{Mutation, Store};
use crate::domain::{CidrBlock, ConfigDocument, Locator, Ref, ResourceKind, Subnet, TierShape};
use crate::errors::{StoreError, StoreResult};
use crate::references::{self, Target};

/// Field-level update to a subnet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubnetUpdate {
    pub name: Option<String>,
    /// `Some(None)` detaches the subnet from its ACL
    pub network_acl: Option<Option<String>>,
    pub public_gateway: Option<bool>,
    /// CIDR override, static addressing only
    pub cidr: Option<CidrBlock>,
}

impl SubnetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn network_acl(mut self, acl: Option<&str>) -> Self {
        self.network_acl = Some(acl.map(str::to_string));
        self
    }

    pub fn public_gateway(mut self, enabled: bool) -> Self {
        self.public_gateway = Some(enabled);
        self
    }

    pub fn cidr(mut self, cidr: CidrBlock) -> Self {
        self.cidr = Some(cidr);
        self
    }
}

impl Store {
    /// Look up a subnet of a VPC
    pub fn subnet(&self, vpc: &str, name: &str) -> StoreResult<&Subnet> {
        self.document
            .vpc(vpc)
            .ok_or_else(|| StoreError::parent_not_found(ResourceKind::Subnet, vpc))?
            .subnet(name)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Subnet, name))
    }

    /// Update one subnet
    pub fn save_subnet(&mut self, vpc: &str, name: &str, update: SubnetUpdate) -> StoreResult<()> {
        self.transact(|doc, _| {
            let renamed_to = save_subnet(doc, vpc, name, update)?;
            Ok(Mutation::Saved {
                kind: ResourceKind::Subnet,
                locator: Locator::within([vpc], name),
                renamed_to,
            })
        })
    }

    /// Remove one subnet of an advanced tier
    ///
    /// The zone leaves the tier's selection; a tier left with no zones is
    /// removed as well.
    pub fn delete_subnet(&mut self, vpc: &str, name: &str) -> StoreResult<()> {
        self.transact(|doc, _| {
            delete_subnet(doc, vpc, name)?;
            Ok(Mutation::Deleted {
                kind: ResourceKind::Subnet,
                locator: Locator::within([vpc], name),
            })
        })
    }
}

fn save_subnet(
    doc: &mut ConfigDocument,
    vpc_name: &str,
    name: &str,
    update: SubnetUpdate,
) -> StoreResult<Option<String>> {
    let dynamic = doc.options.dynamic_subnets;
    let vpc = doc
        .vpc_mut(vpc_name)
        .ok_or_else(|| StoreError::parent_not_found(ResourceKind::Subnet, vpc_name))?;
    let index = vpc
        .subnets
        .iter()
        .position(|s| s.name == name)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Subnet, name))?;

    if let Some(cidr) = update.cidr {
        if dynamic {
            return Err(StoreError::InvalidOperation(format!(
                "subnet \"{name}\" is addressed dynamically"
            )));
        }
        let overlapping = vpc
            .subnets
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .filter_map(|(_, s)| s.cidr.filter(|other| other.overlaps(&cidr)).map(|_| &s.name))
            .next();
        if let Some(other) = overlapping {
            return Err(StoreError::InvalidOperation(format!(
                "{cidr} overlaps subnet \"{other}\""
            )));
        }
        let zone = vpc.subnets[index].zone;
        if let Some(prefix) = vpc
            .address_prefixes
            .iter_mut()
            .find(|p| p.name == name && p.zone == zone)
        {
            prefix.cidr = Some(cidr);
        }
        vpc.subnets[index].cidr = Some(cidr);
    }

    let subnet = &mut vpc.subnets[index];
    if let Some(acl) = update.network_acl {
        subnet.network_acl = acl.map(Ref::new);
    }
    if let Some(enabled) = update.public_gateway {
        subnet.public_gateway = enabled;
    }

    let renamed_to = update.name.filter(|new_name| new_name != name);
    if let Some(new_name) = &renamed_to {
        if new_name.is_empty() {
            return Err(StoreError::EmptyName(ResourceKind::Subnet));
        }
        if vpc.subnet(new_name).is_some() {
            return Err(StoreError::DuplicateName {
                kind: ResourceKind::Subnet,
                name: new_name.clone(),
            });
        }
        rename_subnet(doc, vpc_name, name, new_name);
    }
    Ok(renamed_to)
}

/// Rename a subnet, the prefix named after it and every reference to it
pub(super) fn rename_subnet(doc: &mut ConfigDocument, vpc_name: &str, old: &str, new: &str) {
    if let Some(vpc) = doc.vpc_mut(vpc_name) {
        if let Some(subnet) = vpc.subnets.iter_mut().find(|s| s.name == old) {
            subnet.name = new.to_string();
            let zone = subnet.zone;
            if let Some(prefix) = vpc
                .address_prefixes
                .iter_mut()
                .find(|p| p.name == old && p.zone == zone)
            {
                prefix.name = new.to_string();
            }
        }
    }
    references::rename_references(doc, &Target::within(ResourceKind::Subnet, vpc_name, old), new);
}

/// Remove subnets of a VPC along with their prefixes, nulling references
pub(super) fn drop_subnets(doc: &mut ConfigDocument, vpc_name: &str, names: &[String]) {
    for name in names {
        references::clear_references(doc, &Target::within(ResourceKind::Subnet, vpc_name, name));
    }
    if let Some(vpc) = doc.vpc_mut(vpc_name) {
        let zones: Vec<(String, u8)> = vpc
            .subnets
            .iter()
            .filter(|s| names.contains(&s.name))
            .map(|s| (s.name.clone(), s.zone))
            .collect();
        vpc.address_prefixes
            .retain(|p| !zones.iter().any(|(name, zone)| &p.name == name && p.zone == *zone));
        vpc.subnets.retain(|s| !names.contains(&s.name));
    }
    if !names.is_empty() {
        debug!(vpc = vpc_name, ?names, "Dropped subnets");
    }
}

fn delete_subnet(doc: &mut ConfigDocument, vpc_name: &str, name: &str) -> StoreResult<()> {
    let vpc = doc
        .vpc_mut(vpc_name)
        .ok_or_else(|| StoreError::parent_not_found(ResourceKind::Subnet, vpc_name))?;
    let subnet = vpc
        .subnet(name)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Subnet, name))?;
    let zone = subnet.zone;
    let tier_name = subnet.tier.clone();

    let mut emptied_tier = None;
    if let Some(tier) = tier_name.as_deref().and_then(|t| vpc.tier_mut(t)) {
        match &mut tier.shape {
            TierShape::Fixed { .. } => {
                return Err(StoreError::InvalidOperation(format!(
                    "subnet \"{name}\" belongs to fixed tier \"{}\"; resize the tier instead",
                    tier.name
                )));
            }
            TierShape::Advanced { select_zones } => {
                select_zones.retain(|z| *z != zone);
                if select_zones.is_empty() {
                    emptied_tier = Some(tier.name.clone());
                }
            }
        }
    }

    drop_subnets(doc, vpc_name, &[name.to_string()]);

    if let Some(tier) = emptied_tier {
        if let Some(vpc) = doc.vpc_mut(vpc_name) {
            vpc.subnet_tiers.retain(|t| t.name != tier);
        }
        debug!(vpc = vpc_name, %tier, "Removed empty advanced tier");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::store::TierUpdate;
    use pretty_assertions::assert_eq;

    fn store() -> Store {
        Store::new(StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_rename_subnet_updates_consumers_in_same_vpc() {
        let mut store = store();
        store
            .save_subnet("management", "vpn-zone-1", SubnetUpdate::new().rename("vpn-main"))
            .unwrap();
        let doc = store.document();
        assert_eq!(doc.vpn_gateways[0].subnet.as_ref().unwrap().as_str(), "vpn-main");
        assert_eq!(doc.vpcs[0].subnet_tiers[2].subnets, vec!["vpn-main".to_string()]);
        // the workload cluster uses its own vsi-zone-1
        store
            .save_subnet("management", "vsi-zone-1", SubnetUpdate::new().rename("vsi-a"))
            .unwrap();
        assert!(store.document().clusters[0].subnets[0].is("vsi-zone-1"));
    }

    #[test]
    fn test_cidr_override_requires_static_mode() {
        let mut store = store();
        let cidr = CidrBlock::new("10.10.0.64/26").unwrap();
        let result = store.save_subnet("management", "vsi-zone-1", SubnetUpdate::new().cidr(cidr));
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_cidr_override_rejects_overlap() {
        let mut store = store();
        store
            .save_options(serde_json::json!({"dynamic_subnets": false}))
            .unwrap();
        let taken = CidrBlock::new("10.10.20.0/25").unwrap();
        let result = store.save_subnet("management", "vsi-zone-1", SubnetUpdate::new().cidr(taken));
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));

        let free = CidrBlock::new("10.10.100.0/24").unwrap();
        store
            .save_subnet("management", "vsi-zone-1", SubnetUpdate::new().cidr(free))
            .unwrap();
        let vpc = &store.document().vpcs[0];
        assert_eq!(vpc.subnet("vsi-zone-1").unwrap().cidr, Some(free));
        assert_eq!(vpc.prefix_for(vpc.subnet("vsi-zone-1").unwrap()).unwrap().cidr, Some(free));
    }

    #[test]
    fn test_delete_subnet_of_fixed_tier_is_rejected() {
        let mut store = store();
        let result = store.delete_subnet("management", "vsi-zone-2");
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_delete_last_advanced_subnet_removes_tier() {
        let mut store = store();
        store
            .save_subnet_tier("management", "vpn", TierUpdate::new().advanced(true))
            .unwrap();
        store.delete_subnet("management", "vpn-zone-1").unwrap();

        let doc = store.document();
        assert!(doc.vpcs[0].tier("vpn").is_none());
        assert!(doc.vpcs[0].subnet("vpn-zone-1").is_none());
        assert!(doc.vpn_gateways[0].subnet.is_none());
    }
}
