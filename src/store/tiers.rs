// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subnet tier operations
//!
//! A tier materializes one subnet per zone, named `{tier}-zone-{zone}`.
//! Every operation here only touches subnets whose `tier` names the tier
//! being changed, so reserved tiers and tiers interleaved in array order
//! are never swept along.

use tracing::debug;

use super::subnets::{drop_subnets, rename_subnet};
use super::{Mutation, Store};
use crate::domain::{
    normalize_zones, validate_zone, ConfigDocument, Locator, Ref, ResourceKind, Subnet,
    SubnetTier, TierShape, Vpc,
};
use crate::errors::{StoreError, StoreResult};
use crate::references::{self, Target};

/// Field-level update to a subnet tier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierUpdate {
    pub name: Option<String>,
    /// Zone count of a fixed tier
    pub zones: Option<u8>,
    /// Convert a fixed tier to an advanced one
    pub advanced: Option<bool>,
    pub select_zones: Option<Vec<u8>>,
    /// `Some(None)` detaches the tier from its ACL
    pub network_acl: Option<Option<String>>,
    pub add_public_gateway: Option<bool>,
}

impl TierUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn zones(mut self, zones: u8) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = Some(advanced);
        self
    }

    pub fn select_zones(mut self, zones: impl IntoIterator<Item = u8>) -> Self {
        self.select_zones = Some(zones.into_iter().collect());
        self
    }

    pub fn network_acl(mut self, acl: Option<&str>) -> Self {
        self.network_acl = Some(acl.map(str::to_string));
        self
    }

    pub fn public_gateway(mut self, enabled: bool) -> Self {
        self.add_public_gateway = Some(enabled);
        self
    }
}

impl Store {
    /// Look up a subnet tier of a VPC
    pub fn subnet_tier(&self, vpc: &str, name: &str) -> StoreResult<&SubnetTier> {
        self.document
            .vpc(vpc)
            .ok_or_else(|| StoreError::parent_not_found(ResourceKind::SubnetTier, vpc))?
            .tier(name)
            .ok_or_else(|| StoreError::not_found(ResourceKind::SubnetTier, name))
    }

    /// Add a tier and materialize its subnets
    pub fn create_subnet_tier(&mut self, vpc: &str, draft: SubnetTier) -> StoreResult<()> {
        let locator = Locator::within([vpc], draft.name.as_str());
        self.transact(|doc, _| {
            create_tier(doc, vpc, draft)?;
            Ok(Mutation::Created {
                kind: ResourceKind::SubnetTier,
                locator,
            })
        })
    }

    /// Rename, reshape or relink a tier
    pub fn save_subnet_tier(&mut self, vpc: &str, tier: &str, update: TierUpdate) -> StoreResult<()> {
        self.transact(|doc, _| {
            let renamed_to = save_tier(doc, vpc, tier, update)?;
            Ok(Mutation::Saved {
                kind: ResourceKind::SubnetTier,
                locator: Locator::within([vpc], tier),
                renamed_to,
            })
        })
    }

    /// Remove a tier, its subnets and their prefixes
    pub fn delete_subnet_tier(&mut self, vpc: &str, tier: &str) -> StoreResult<()> {
        self.transact(|doc, _| {
            delete_tier(doc, vpc, tier)?;
            Ok(Mutation::Deleted {
                kind: ResourceKind::SubnetTier,
                locator: Locator::within([vpc], tier),
            })
        })
    }
}

fn find_vpc<'a>(doc: &'a mut ConfigDocument, vpc: &str) -> StoreResult<&'a mut Vpc> {
    doc.vpc_mut(vpc)
        .ok_or_else(|| StoreError::parent_not_found(ResourceKind::SubnetTier, vpc))
}

fn check_shape(shape: &TierShape, zones: u8, name: &str) -> StoreResult<()> {
    if let TierShape::Advanced { select_zones } = shape {
        if select_zones.is_empty() {
            return Err(StoreError::InvalidOperation(format!(
                "advanced tier \"{name}\" selects no zones"
            )));
        }
    }
    for zone in shape.zone_list() {
        validate_zone(zone, zones)?;
    }
    Ok(())
}

fn tier_subnet(vpc: &Vpc, tier: &SubnetTier, zone: u8) -> Subnet {
    Subnet {
        name: format!("{}-zone-{zone}", tier.name),
        vpc: vpc.name.clone(),
        zone,
        network_acl: tier.network_acl.clone(),
        resource_group: vpc.resource_group.clone(),
        tier: Some(tier.name.clone()),
        ..Default::default()
    }
}

/// Insert a tier subnet after the tier's subnets in lower zones
fn insert_tier_subnet(vpc: &mut Vpc, subnet: Subnet) -> StoreResult<()> {
    if vpc.subnet(&subnet.name).is_some() {
        return Err(StoreError::DuplicateName {
            kind: ResourceKind::Subnet,
            name: subnet.name,
        });
    }
    let position = vpc
        .subnets
        .iter()
        .rposition(|s| s.tier == subnet.tier && s.zone < subnet.zone)
        .map(|i| i + 1)
        .or_else(|| vpc.subnets.iter().position(|s| s.tier == subnet.tier))
        .unwrap_or(vpc.subnets.len());
    vpc.subnets.insert(position, subnet);
    Ok(())
}

fn create_tier(doc: &mut ConfigDocument, vpc_name: &str, mut draft: SubnetTier) -> StoreResult<()> {
    if draft.name.is_empty() {
        return Err(StoreError::EmptyName(ResourceKind::SubnetTier));
    }
    let zones = doc.options.zones;
    check_shape(&draft.shape, zones, &draft.name)?;

    let vpc = find_vpc(doc, vpc_name)?;
    if vpc.tier(&draft.name).is_some() {
        return Err(StoreError::DuplicateName {
            kind: ResourceKind::SubnetTier,
            name: draft.name,
        });
    }

    for zone in draft.zone_list() {
        let subnet = tier_subnet(vpc, &draft, zone);
        insert_tier_subnet(vpc, subnet)?;
    }
    draft.subnets.clear();
    debug!(vpc = vpc_name, tier = %draft.name, zones = ?draft.zone_list(), "Created subnet tier");
    vpc.subnet_tiers.push(draft);
    Ok(())
}

fn save_tier(
    doc: &mut ConfigDocument,
    vpc_name: &str,
    tier_name: &str,
    update: TierUpdate,
) -> StoreResult<Option<String>> {
    let zones = doc.options.zones;
    let vpc = find_vpc(doc, vpc_name)?;
    let tier = vpc
        .tier(tier_name)
        .ok_or_else(|| StoreError::not_found(ResourceKind::SubnetTier, tier_name))?
        .clone();

    let shape = match (&tier.shape, update.advanced) {
        (TierShape::Advanced { .. }, Some(false)) => {
            return Err(StoreError::InvalidOperation(format!(
                "advanced tier \"{tier_name}\" cannot be converted back to a fixed tier"
            )));
        }
        (TierShape::Fixed { zones }, Some(true)) => TierShape::Advanced {
            select_zones: normalize_zones(
                update.select_zones.clone().unwrap_or_else(|| (1..=*zones).collect()),
            ),
        },
        (TierShape::Advanced { select_zones }, _) => TierShape::Advanced {
            select_zones: normalize_zones(
                update.select_zones.clone().unwrap_or_else(|| select_zones.clone()),
            ),
        },
        (TierShape::Fixed { zones }, _) => TierShape::Fixed {
            zones: update.zones.unwrap_or(*zones),
        },
    };
    check_shape(&shape, zones, tier_name)?;

    let renamed_to = update.name.filter(|name| name != tier_name);
    if let Some(new_name) = &renamed_to {
        if new_name.is_empty() {
            return Err(StoreError::EmptyName(ResourceKind::SubnetTier));
        }
        if vpc.tier(new_name).is_some() {
            return Err(StoreError::DuplicateName {
                kind: ResourceKind::SubnetTier,
                name: new_name.clone(),
            });
        }
        rename_tier(doc, vpc_name, tier_name, new_name)?;
    }
    let current = renamed_to.as_deref().unwrap_or(tier_name);

    let vpc = find_vpc(doc, vpc_name)?;
    let index = vpc
        .subnet_tiers
        .iter()
        .position(|t| t.name == current)
        .ok_or_else(|| StoreError::not_found(ResourceKind::SubnetTier, current))?;
    let tier = &mut vpc.subnet_tiers[index];
    tier.shape = shape;
    if let Some(enabled) = update.add_public_gateway {
        tier.add_public_gateway = enabled;
    }
    if let Some(acl) = update.network_acl {
        tier.network_acl = acl.map(Ref::new);
        if !tier.is_advanced() {
            let acl = tier.network_acl.clone();
            for subnet in vpc.subnets.iter_mut().filter(|s| s.tier.as_deref() == Some(current)) {
                subnet.network_acl.clone_from(&acl);
            }
        }
    }

    reshape_tier(doc, vpc_name, current)?;
    Ok(renamed_to)
}

/// Rename a tier and every subnet derived from its name
fn rename_tier(doc: &mut ConfigDocument, vpc_name: &str, old: &str, new: &str) -> StoreResult<()> {
    let vpc = find_vpc(doc, vpc_name)?;
    let derived: Vec<(String, String)> = vpc
        .tier_subnets(old)
        .filter(|s| s.name == format!("{old}-zone-{}", s.zone))
        .map(|s| (s.name.clone(), format!("{new}-zone-{}", s.zone)))
        .collect();

    if let Some((_, taken)) = derived
        .iter()
        .find(|(_, renamed)| vpc.subnet(renamed).is_some_and(|s| s.tier.as_deref() != Some(old)))
    {
        return Err(StoreError::DuplicateName {
            kind: ResourceKind::Subnet,
            name: taken.clone(),
        });
    }

    for subnet in vpc.subnets.iter_mut().filter(|s| s.tier.as_deref() == Some(old)) {
        subnet.tier = Some(new.to_string());
    }
    if let Some(tier) = vpc.tier_mut(old) {
        tier.name = new.to_string();
    }

    for (from, to) in &derived {
        rename_subnet(doc, vpc_name, from, to);
    }
    references::rename_references(
        doc,
        &Target::within(ResourceKind::SubnetTier, vpc_name, old),
        new,
    );
    debug!(vpc = vpc_name, from = old, to = new, subnets = derived.len(), "Renamed subnet tier");
    Ok(())
}

/// Add and drop subnets so the tier covers exactly its zones
fn reshape_tier(doc: &mut ConfigDocument, vpc_name: &str, tier_name: &str) -> StoreResult<()> {
    let vpc = find_vpc(doc, vpc_name)?;
    let Some(tier) = vpc.tier(tier_name).cloned() else {
        return Ok(());
    };
    let wanted = tier.zone_list();

    let removed: Vec<String> = vpc
        .tier_subnets(tier_name)
        .filter(|s| !wanted.contains(&s.zone))
        .map(|s| s.name.clone())
        .collect();
    let present: Vec<u8> = vpc.tier_subnets(tier_name).map(|s| s.zone).collect();

    for zone in wanted.iter().filter(|z| !present.contains(*z)) {
        let subnet = tier_subnet(vpc, &tier, *zone);
        insert_tier_subnet(vpc, subnet)?;
    }

    drop_subnets(doc, vpc_name, &removed);
    Ok(())
}

fn delete_tier(doc: &mut ConfigDocument, vpc_name: &str, tier_name: &str) -> StoreResult<()> {
    let vpc = find_vpc(doc, vpc_name)?;
    if vpc.tier(tier_name).is_none() {
        return Err(StoreError::not_found(ResourceKind::SubnetTier, tier_name));
    }
    let members: Vec<String> = vpc.tier_subnets(tier_name).map(|s| s.name.clone()).collect();

    drop_subnets(doc, vpc_name, &members);
    find_vpc(doc, vpc_name)?
        .subnet_tiers
        .retain(|t| t.name != tier_name);
    references::clear_references(
        doc,
        &Target::within(ResourceKind::SubnetTier, vpc_name, tier_name),
    );
    Ok(())
}
