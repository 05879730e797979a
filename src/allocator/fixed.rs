// Copyright (c) 2025 - Cowboy AI, Inc.
//! Static addressing through tier-owned address prefixes

use std::net::Ipv4Addr;
use tracing::debug;

use super::{zone_base, OctetCarry};
use crate::domain::{AddressPrefix, CidrBlock, ConfigDocument, NetworkError, Vpc};

/// Prefix length of a tier-owned address prefix
pub const TIER_PREFIX_LEN: u8 = 24;

/// Third-octet step between tier prefixes
const THIRD_OCTET_STEP: u32 = 10;

/// Drop address prefixes that exist only to back a tier subnet
pub fn remove_tier_prefixes(vpc: &mut Vpc) {
    let Vpc {
        address_prefixes,
        subnets,
        ..
    } = vpc;
    address_prefixes.retain(|p| {
        !subnets
            .iter()
            .any(|s| s.tier.is_some() && s.name == p.name && s.zone == p.zone)
    });
}

/// Place a /24 for tier `tier_index` in a zone, clear of every taken block
fn place_prefix(
    vpc_index: usize,
    tier_index: usize,
    zone: u8,
    taken: &[CidrBlock],
) -> Result<CidrBlock, NetworkError> {
    let base = u32::from(zone_base(vpc_index, zone, OctetCarry::Exact)?);
    let mut third = THIRD_OCTET_STEP * (tier_index as u32 + 1);

    while third <= 255 {
        let candidate =
            CidrBlock::from_parts(Ipv4Addr::from(base + (third << 8)), TIER_PREFIX_LEN)?;
        if !taken.iter().any(|block| block.overlaps(&candidate)) {
            return Ok(candidate);
        }
        third += THIRD_OCTET_STEP;
    }

    Err(NetworkError::Exhausted(format!(
        "{} zone {zone}",
        Ipv4Addr::from(base)
    )))
}

/// Give tier subnets without a CIDR an address prefix, then copy prefix
/// CIDRs onto subnets
///
/// Advanced tiers only get prefixes when `include_advanced` is set, which
/// happens when the whole document switches to static addressing. A subnet
/// left without a prefix keeps a null CIDR.
pub fn reconcile(doc: &mut ConfigDocument, include_advanced: bool) -> Result<(), NetworkError> {
    for (v, vpc) in doc.vpcs.iter_mut().enumerate() {
        reconcile_vpc(vpc, v, include_advanced)?;
    }
    Ok(())
}

fn reconcile_vpc(vpc: &mut Vpc, v: usize, include_advanced: bool) -> Result<(), NetworkError> {
    let mut taken: Vec<CidrBlock> = vpc
        .address_prefixes
        .iter()
        .filter_map(|p| p.cidr)
        .chain(vpc.subnets.iter().filter_map(|s| s.cidr))
        .collect();

    let pending: Vec<(usize, String, u8)> = vpc
        .subnet_tiers
        .iter()
        .enumerate()
        .filter(|(_, tier)| include_advanced || !tier.is_advanced())
        .flat_map(|(t, tier)| {
            vpc.tier_subnets(&tier.name)
                .filter(|s| s.cidr.is_none() && vpc.prefix_for(s).is_none())
                .map(move |s| (t, s.name.clone(), s.zone))
        })
        .collect();

    for (tier_index, name, zone) in pending {
        let cidr = place_prefix(v, tier_index, zone, &taken)?;
        debug!(vpc = %vpc.name, prefix = %name, %cidr, "Allocated tier address prefix");
        taken.push(cidr);
        vpc.address_prefixes.push(AddressPrefix {
            name,
            vpc: vpc.name.clone(),
            zone,
            cidr: Some(cidr),
        });
    }

    let Vpc {
        address_prefixes,
        subnets,
        ..
    } = vpc;
    for subnet in subnets.iter_mut() {
        let prefix = address_prefixes
            .iter()
            .find(|p| p.name == subnet.name && p.zone == subnet.zone);
        match prefix {
            Some(prefix) => {
                if subnet.cidr.is_none() {
                    subnet.cidr = prefix.cidr;
                }
                subnet.has_prefix = true;
            }
            None => subnet.has_prefix = false,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::rederive;
    use crate::domain::Template;
    use pretty_assertions::assert_eq;

    fn static_default() -> ConfigDocument {
        let mut doc = ConfigDocument::from_template(Template::Default);
        doc.options.dynamic_subnets = false;
        rederive(&mut doc, OctetCarry::Legacy).unwrap();
        doc
    }

    fn cidr_of(doc: &ConfigDocument, vpc: &str, subnet: &str) -> Option<String> {
        doc.vpc(vpc)
            .and_then(|v| v.subnet(subnet))
            .and_then(|s| s.cidr)
            .map(|c| c.to_string())
    }

    #[test]
    fn test_tier_prefix_layout() {
        let doc = static_default();
        assert_eq!(cidr_of(&doc, "management", "vsi-zone-1").unwrap(), "10.10.10.0/24");
        assert_eq!(cidr_of(&doc, "management", "vsi-zone-2").unwrap(), "10.20.10.0/24");
        assert_eq!(cidr_of(&doc, "management", "vpe-zone-1").unwrap(), "10.10.20.0/24");
        assert_eq!(cidr_of(&doc, "management", "vpn-zone-1").unwrap(), "10.10.30.0/24");
        assert_eq!(cidr_of(&doc, "workload", "vpe-zone-3").unwrap(), "10.60.20.0/24");

        let management = doc.vpc("management").unwrap();
        assert_eq!(management.address_prefixes.len(), 7);
        assert!(management.subnets.iter().all(|s| s.has_prefix));
    }

    #[test]
    fn test_prefix_steps_past_taken_space() {
        let mut doc = static_default();
        let vpc = doc.vpc_mut("management").unwrap();
        vpc.address_prefixes.push(AddressPrefix {
            name: "manual".into(),
            vpc: "management".into(),
            zone: 1,
            cidr: Some(CidrBlock::new("10.10.40.0/24").unwrap()),
        });
        vpc.subnet_tiers.push(crate::domain::SubnetTier::fixed("db", 1));
        vpc.subnets.push(crate::domain::Subnet {
            name: "db-zone-1".into(),
            zone: 1,
            tier: Some("db".into()),
            ..Default::default()
        });

        reconcile(&mut doc, false).unwrap();
        // tier index 3 starts at .40, which is taken
        assert_eq!(cidr_of(&doc, "management", "db-zone-1").unwrap(), "10.10.50.0/24");
    }

    #[test]
    fn test_existing_cidr_is_authoritative() {
        let mut doc = static_default();
        let custom = CidrBlock::new("10.10.10.0/26").unwrap();
        doc.vpc_mut("management").unwrap().subnets[0].cidr = Some(custom);
        reconcile(&mut doc, false).unwrap();
        assert_eq!(doc.vpcs[0].subnets[0].cidr, Some(custom));
    }

    #[test]
    fn test_advanced_subnet_without_prefix_stays_null() {
        let mut doc = static_default();
        let vpc = doc.vpc_mut("management").unwrap();
        vpc.subnet_tiers.push(crate::domain::SubnetTier::advanced("edge", [2]));
        vpc.subnets.push(crate::domain::Subnet {
            name: "edge-zone-2".into(),
            zone: 2,
            tier: Some("edge".into()),
            ..Default::default()
        });

        reconcile(&mut doc, false).unwrap();
        let subnet = doc.vpcs[0].subnet("edge-zone-2").unwrap();
        assert_eq!(subnet.cidr, None);
        assert!(!subnet.has_prefix);
    }

    #[test]
    fn test_remove_tier_prefixes_keeps_manual_prefixes() {
        let mut doc = static_default();
        let vpc = doc.vpc_mut("management").unwrap();
        vpc.address_prefixes.push(AddressPrefix {
            name: "manual".into(),
            vpc: "management".into(),
            zone: 1,
            cidr: Some(CidrBlock::new("10.10.200.0/24").unwrap()),
        });
        remove_tier_prefixes(vpc);
        assert_eq!(vpc.address_prefixes.len(), 1);
        assert_eq!(vpc.address_prefixes[0].name, "manual");
    }
}
