// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectivity records: VPN, transit gateways, DNS and CIS

use serde::{Deserialize, Serialize};

use super::power::PowerWorkspace;
use super::reference::Ref;
use super::security::{ResourceGroup, SecurityGroup};
use super::vpc::{Subnet, Vpc};

fn default_dns_plan() -> String {
    "standard".to_string()
}

fn default_ttl() -> u32 {
    300
}

/// Site-to-site VPN gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpnGateway {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnet: Option<Ref<Subnet>>,
    #[serde(default)]
    pub connections: Vec<VpnConnection>,
}

/// Connection from a VPN gateway to a peer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpnConnection {
    pub name: String,
    #[serde(default)]
    pub peer_address: Option<String>,
    #[serde(default)]
    pub local_cidrs: Vec<String>,
    #[serde(default)]
    pub peer_cidrs: Vec<String>,
}

/// Client-to-site VPN server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpnServer {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnets: Vec<Ref<Subnet>>,
    #[serde(default)]
    pub security_groups: Vec<Ref<SecurityGroup>>,
    #[serde(default)]
    pub client_ip_pool: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// Transit gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitGateway {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub connections: Vec<TgwConnection>,
}

/// Transit gateway connection to either a VPC or a Power VS workspace
///
/// A connection left with neither target is removed by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TgwConnection {
    /// Owning transit gateway, maintained by the store
    #[serde(default)]
    pub tgw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Ref<PowerWorkspace>>,
}

impl TgwConnection {
    pub fn to_vpc(vpc: impl Into<String>) -> Self {
        Self {
            vpc: Some(Ref::new(vpc)),
            ..Default::default()
        }
    }

    pub fn to_power(workspace: impl Into<String>) -> Self {
        Self {
            power: Some(Ref::new(workspace)),
            ..Default::default()
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.vpc.is_none() && self.power.is_none()
    }
}

/// Private DNS service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dns {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default = "default_dns_plan")]
    pub plan: String,
    #[serde(default)]
    pub zones: Vec<DnsZone>,
    #[serde(default)]
    pub records: Vec<DnsRecord>,
    #[serde(default)]
    pub custom_resolvers: Vec<CustomResolver>,
}

impl Default for Dns {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_group: None,
            plan: default_dns_plan(),
            zones: Vec::new(),
            records: Vec::new(),
            custom_resolvers: Vec::new(),
        }
    }
}

/// DNS zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsZone {
    pub name: String,
    /// Owning DNS instance, maintained by the store
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permitted_networks: Vec<Ref<Vpc>>,
}

/// DNS resource record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub name: String,
    #[serde(default)]
    pub dns_zone: Option<Ref<DnsZone>>,
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub rdata: Option<String>,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl Default for DnsRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            dns_zone: None,
            record_type: None,
            rdata: None,
            ttl: default_ttl(),
        }
    }
}

/// DNS custom resolver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomResolver {
    pub name: String,
    /// Owning DNS instance, maintained by the store
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnets: Vec<Ref<Subnet>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Cloud Internet Services instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cis {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub domains: Vec<CisDomain>,
}

/// Domain served by a CIS instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CisDomain {
    pub name: String,
    /// Owning CIS instance, maintained by the store
    #[serde(default)]
    pub cis: String,
    #[serde(rename = "type", default)]
    pub domain_type: Option<String>,
}
