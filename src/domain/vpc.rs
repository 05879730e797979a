// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC records: address prefixes, subnets, subnet tiers and network ACLs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::network::{CidrBlock, MAX_ZONES};
use super::reference::Ref;
use super::security::ResourceGroup;
use super::storage::{Bucket, ObjectStorage};

/// Virtual private cloud
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vpc {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub cos: Option<Ref<ObjectStorage>>,
    #[serde(default)]
    pub bucket: Option<Ref<Bucket>>,
    #[serde(default)]
    pub classic_access: bool,
    #[serde(default)]
    pub manual_address_prefix_management: bool,
    #[serde(default)]
    pub default_network_acl_name: Option<String>,
    #[serde(default)]
    pub default_routing_table_name: Option<String>,
    #[serde(default)]
    pub default_security_group_name: Option<String>,
    #[serde(default)]
    pub use_data: bool,
    /// Zones with a public gateway
    #[serde(default, rename = "publicGateways")]
    pub public_gateways: Vec<u8>,
    #[serde(default)]
    pub address_prefixes: Vec<AddressPrefix>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub acls: Vec<NetworkAcl>,
    #[serde(default, rename = "subnetTiers")]
    pub subnet_tiers: Vec<SubnetTier>,
}

impl Vpc {
    pub fn tier(&self, name: &str) -> Option<&SubnetTier> {
        self.subnet_tiers.iter().find(|t| t.name == name)
    }

    pub fn tier_mut(&mut self, name: &str) -> Option<&mut SubnetTier> {
        self.subnet_tiers.iter_mut().find(|t| t.name == name)
    }

    pub fn subnet(&self, name: &str) -> Option<&Subnet> {
        self.subnets.iter().find(|s| s.name == name)
    }

    pub fn subnet_mut(&mut self, name: &str) -> Option<&mut Subnet> {
        self.subnets.iter_mut().find(|s| s.name == name)
    }

    /// Subnets materialized by a tier, in array order
    pub fn tier_subnets<'a>(&'a self, tier: &'a str) -> impl Iterator<Item = &'a Subnet> + 'a {
        self.subnets
            .iter()
            .filter(move |s| s.tier.as_deref() == Some(tier))
    }

    /// Address prefix named after a subnet in the same zone
    pub fn prefix_for(&self, subnet: &Subnet) -> Option<&AddressPrefix> {
        self.address_prefixes
            .iter()
            .find(|p| p.name == subnet.name && p.zone == subnet.zone)
    }

    pub fn has_public_gateway(&self, zone: u8) -> bool {
        self.public_gateways.contains(&zone)
    }
}

/// VPC address prefix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPrefix {
    pub name: String,
    /// Owning VPC, maintained by the store
    #[serde(default)]
    pub vpc: String,
    pub zone: u8,
    #[serde(default)]
    pub cidr: Option<CidrBlock>,
}

/// Subnet materialized by a tier in one zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    /// Owning VPC, maintained by the store
    #[serde(default)]
    pub vpc: String,
    pub zone: u8,
    /// Owned by the allocator
    #[serde(default)]
    pub cidr: Option<CidrBlock>,
    #[serde(default)]
    pub network_acl: Option<Ref<NetworkAcl>>,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub public_gateway: bool,
    /// Backed by an explicit address prefix
    #[serde(default)]
    pub has_prefix: bool,
    /// Tier membership
    #[serde(default)]
    pub tier: Option<String>,
}

/// Zone layout of a subnet tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierShape {
    /// One subnet in each of zones `1..=zones`
    Fixed { zones: u8 },
    /// One subnet in each explicitly selected zone
    Advanced { select_zones: Vec<u8> },
}

impl TierShape {
    /// Zones the tier materializes subnets in
    pub fn zone_list(&self) -> Vec<u8> {
        match self {
            Self::Fixed { zones } => (1..=*zones).collect(),
            Self::Advanced { select_zones } => select_zones.clone(),
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// Subnet tier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TierError {
    #[error("Subnet tier \"{0}\" has no zone count")]
    MissingZones(String),

    #[error("Subnet tier \"{name}\" selects invalid zone {zone}")]
    InvalidZone { name: String, zone: u8 },
}

/// User-facing group of subnets spanning one or more zones
///
/// # Invariants
///
/// - `subnets` names exactly the VPC subnets whose `tier` is this tier
/// - Advanced zone selections are sorted and free of duplicates
/// - Reserved tiers are never changed by operations on other tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TierRecord", into = "TierRecord")]
pub struct SubnetTier {
    pub name: String,
    pub shape: TierShape,
    pub network_acl: Option<Ref<NetworkAcl>>,
    pub add_public_gateway: bool,
    pub reserved: bool,
    pub subnets: Vec<String>,
}

impl SubnetTier {
    /// Fixed tier spanning zones `1..=zones`
    pub fn fixed(name: impl Into<String>, zones: u8) -> Self {
        Self::with_shape(name, TierShape::Fixed { zones })
    }

    /// Advanced tier spanning the selected zones
    pub fn advanced(name: impl Into<String>, select_zones: impl IntoIterator<Item = u8>) -> Self {
        Self::with_shape(
            name,
            TierShape::Advanced {
                select_zones: normalize_zones(select_zones),
            },
        )
    }

    fn with_shape(name: impl Into<String>, shape: TierShape) -> Self {
        Self {
            name: name.into(),
            shape,
            network_acl: None,
            add_public_gateway: false,
            reserved: false,
            subnets: Vec::new(),
        }
    }

    pub fn with_network_acl(mut self, acl: impl Into<String>) -> Self {
        self.network_acl = Some(Ref::new(acl));
        self
    }

    pub fn with_public_gateway(mut self, enabled: bool) -> Self {
        self.add_public_gateway = enabled;
        self
    }

    pub fn reserved(mut self) -> Self {
        self.reserved = true;
        self
    }

    pub fn is_advanced(&self) -> bool {
        self.shape.is_advanced()
    }

    pub fn zone_list(&self) -> Vec<u8> {
        self.shape.zone_list()
    }
}

/// Sort and deduplicate a zone selection
pub fn normalize_zones(zones: impl IntoIterator<Item = u8>) -> Vec<u8> {
    zones
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Wire form of a subnet tier
#[derive(Serialize, Deserialize)]
struct TierRecord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zones: Option<u8>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    advanced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    select_zones: Option<Vec<u8>>,
    #[serde(default, rename = "networkAcl")]
    network_acl: Option<Ref<NetworkAcl>>,
    #[serde(default, rename = "addPublicGateway")]
    add_public_gateway: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    reserved: bool,
    #[serde(default)]
    subnets: Vec<String>,
}

impl TryFrom<TierRecord> for SubnetTier {
    type Error = TierError;

    fn try_from(record: TierRecord) -> Result<Self, Self::Error> {
        let shape = if record.advanced {
            let select_zones = normalize_zones(record.select_zones.unwrap_or_default());
            if let Some(&zone) = select_zones.iter().find(|&&z| z == 0 || z > MAX_ZONES) {
                return Err(TierError::InvalidZone {
                    name: record.name,
                    zone,
                });
            }
            TierShape::Advanced { select_zones }
        } else {
            let zones = record
                .zones
                .ok_or_else(|| TierError::MissingZones(record.name.clone()))?;
            if zones > MAX_ZONES {
                return Err(TierError::InvalidZone {
                    name: record.name,
                    zone: zones,
                });
            }
            TierShape::Fixed { zones }
        };

        Ok(Self {
            name: record.name,
            shape,
            network_acl: record.network_acl,
            add_public_gateway: record.add_public_gateway,
            reserved: record.reserved,
            subnets: record.subnets,
        })
    }
}

impl From<SubnetTier> for TierRecord {
    fn from(tier: SubnetTier) -> Self {
        let (zones, advanced, select_zones) = match tier.shape {
            TierShape::Fixed { zones } => (Some(zones), false, None),
            TierShape::Advanced { select_zones } => (None, true, Some(select_zones)),
        };
        Self {
            name: tier.name,
            zones,
            advanced,
            select_zones,
            network_acl: tier.network_acl,
            add_public_gateway: tier.add_public_gateway,
            reserved: tier.reserved,
            subnets: tier.subnets,
        }
    }
}

/// Rule action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    Deny,
}

/// Traffic direction of a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    #[default]
    Inbound,
    Outbound,
}

/// Protocol matched by a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleProtocol {
    #[default]
    All,
    Tcp,
    Udp,
    Icmp,
}

impl RuleProtocol {
    /// Whether port ranges apply
    pub fn has_ports(&self) -> bool {
        matches!(self, Self::Tcp | Self::Udp)
    }
}

/// Network access control list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAcl {
    pub name: String,
    /// Owning VPC, maintained by the store
    #[serde(default)]
    pub vpc: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub add_cluster_rules: bool,
    #[serde(default)]
    pub rules: Vec<AclRule>,
}

/// Network ACL rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclRule {
    pub name: String,
    /// Owning ACL, maintained by the store
    #[serde(default)]
    pub acl: String,
    /// VPC of the owning ACL, maintained by the store
    #[serde(default)]
    pub vpc: String,
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub direction: RuleDirection,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub protocol: RuleProtocol,
    #[serde(default)]
    pub port_min: Option<u16>,
    #[serde(default)]
    pub port_max: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_fixed_tier_wire_shape() {
        let tier = SubnetTier::fixed("vsi", 3).with_network_acl("management");
        let value = serde_json::to_value(&tier).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "vsi",
                "zones": 3,
                "networkAcl": "management",
                "addPublicGateway": false,
                "subnets": []
            })
        );
        let back: SubnetTier = serde_json::from_value(value).unwrap();
        assert_eq!(back, tier);
    }

    #[test]
    fn test_advanced_tier_wire_shape() {
        let tier: SubnetTier = serde_json::from_value(json!({
            "name": "vpn",
            "advanced": true,
            "select_zones": [3, 1, 1],
            "subnets": ["vpn-zone-1", "vpn-zone-3"]
        }))
        .unwrap();
        assert_eq!(
            tier.shape,
            TierShape::Advanced {
                select_zones: vec![1, 3]
            }
        );
        assert!(tier.network_acl.is_none());
    }

    #[test]
    fn test_tier_without_zone_count_is_rejected() {
        let result = serde_json::from_value::<SubnetTier>(json!({"name": "vsi"}));
        assert!(result.is_err());
        let result = serde_json::from_value::<SubnetTier>(json!({"name": "vsi", "zones": 4}));
        assert!(result.is_err());
    }

    #[test]
    fn test_tier_subnets_follow_membership() {
        let vpc = Vpc {
            name: "management".into(),
            subnets: vec![
                Subnet {
                    name: "vsi-zone-1".into(),
                    zone: 1,
                    tier: Some("vsi".into()),
                    ..Default::default()
                },
                Subnet {
                    name: "vpn-zone-1".into(),
                    zone: 1,
                    tier: Some("vpn".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let names: Vec<_> = vpc.tier_subnets("vpn").map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["vpn-zone-1"]);
    }
}
