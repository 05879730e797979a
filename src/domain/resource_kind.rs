// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Kind Taxonomy
//!
//! Every record that can live in a configuration document has a kind. The
//! kind decides where the record is stored, in which scope its name must be
//! unique, and which reference edges point at it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope in which a record name must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    /// Unique within the collection that holds the record
    Collection,
    /// Unique within the owning VPC
    Vpc,
    /// Unique across every parent of the same kind
    Global,
}

/// Kinds of records held by a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Account
    ResourceGroup,
    SshKey,

    // Encryption and storage
    KeyManagement,
    KmsKey,
    ObjectStorage,
    Bucket,
    CosKey,
    SecretsManager,

    // Networking
    Vpc,
    AddressPrefix,
    Subnet,
    SubnetTier,
    NetworkAcl,
    AclRule,
    SecurityGroup,
    SecurityGroupRule,

    // Compute
    Cluster,
    WorkerPool,
    Vsi,
    VirtualPrivateEndpoint,

    // Connectivity
    VpnGateway,
    VpnServer,
    TransitGateway,
    Dns,
    DnsZone,
    DnsRecord,
    CustomResolver,
    Cis,
    CisDomain,

    // Power VS
    PowerWorkspace,
    PowerNetwork,
    PowerSshKey,

    // Classic infrastructure
    ClassicVlan,
    ClassicGateway,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "resource_group",
            Self::SshKey => "ssh_key",
            Self::KeyManagement => "key_management",
            Self::KmsKey => "kms_key",
            Self::ObjectStorage => "object_storage",
            Self::Bucket => "bucket",
            Self::CosKey => "cos_key",
            Self::SecretsManager => "secrets_manager",
            Self::Vpc => "vpc",
            Self::AddressPrefix => "address_prefix",
            Self::Subnet => "subnet",
            Self::SubnetTier => "subnet_tier",
            Self::NetworkAcl => "network_acl",
            Self::AclRule => "acl_rule",
            Self::SecurityGroup => "security_group",
            Self::SecurityGroupRule => "security_group_rule",
            Self::Cluster => "cluster",
            Self::WorkerPool => "worker_pool",
            Self::Vsi => "vsi",
            Self::VirtualPrivateEndpoint => "virtual_private_endpoint",
            Self::VpnGateway => "vpn_gateway",
            Self::VpnServer => "vpn_server",
            Self::TransitGateway => "transit_gateway",
            Self::Dns => "dns",
            Self::DnsZone => "dns_zone",
            Self::DnsRecord => "dns_record",
            Self::CustomResolver => "custom_resolver",
            Self::Cis => "cis",
            Self::CisDomain => "cis_domain",
            Self::PowerWorkspace => "power_workspace",
            Self::PowerNetwork => "power_network",
            Self::PowerSshKey => "power_ssh_key",
            Self::ClassicVlan => "classic_vlan",
            Self::ClassicGateway => "classic_gateway",
        }
    }

    /// Scope in which names of this kind must be unique
    pub fn name_scope(&self) -> NameScope {
        match self {
            Self::AddressPrefix | Self::Subnet | Self::SubnetTier | Self::NetworkAcl => {
                NameScope::Vpc
            }
            // referenced by bare name from records that do not know the parent
            Self::KmsKey | Self::Bucket | Self::CosKey => NameScope::Global,
            _ => NameScope::Collection,
        }
    }

    /// Check if references to this kind resolve within a single VPC
    pub fn is_vpc_scoped(&self) -> bool {
        self.name_scope() == NameScope::Vpc
    }

    /// Check if references to this kind only see records under one parent
    ///
    /// Subnets and ACLs resolve inside the consumer's VPC, DNS zones inside
    /// the consumer's DNS instance.
    pub fn resolves_within_parent(&self) -> bool {
        self.is_vpc_scoped() || matches!(self, Self::DnsZone)
    }

    /// Check if records of this kind live directly under the document root
    pub fn is_top_level(&self) -> bool {
        matches!(
            self,
            Self::ResourceGroup
                | Self::SshKey
                | Self::KeyManagement
                | Self::ObjectStorage
                | Self::SecretsManager
                | Self::Vpc
                | Self::SecurityGroup
                | Self::Cluster
                | Self::Vsi
                | Self::VirtualPrivateEndpoint
                | Self::VpnGateway
                | Self::VpnServer
                | Self::TransitGateway
                | Self::Dns
                | Self::Cis
                | Self::PowerWorkspace
                | Self::ClassicVlan
                | Self::ClassicGateway
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_scopes() {
        assert_eq!(ResourceKind::Subnet.name_scope(), NameScope::Vpc);
        assert_eq!(ResourceKind::Bucket.name_scope(), NameScope::Global);
        assert_eq!(ResourceKind::Vpc.name_scope(), NameScope::Collection);
        assert!(ResourceKind::NetworkAcl.is_vpc_scoped());
        assert!(!ResourceKind::KmsKey.is_vpc_scoped());
        assert!(ResourceKind::DnsZone.resolves_within_parent());
        assert!(!ResourceKind::Vpc.resolves_within_parent());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ResourceKind::VirtualPrivateEndpoint).unwrap();
        assert_eq!(json, "\"virtual_private_endpoint\"");
        assert_eq!(ResourceKind::Vsi.to_string(), "vsi");
    }

    #[test]
    fn test_top_level_kinds() {
        assert!(ResourceKind::Vpc.is_top_level());
        assert!(!ResourceKind::Subnet.is_top_level());
        assert!(!ResourceKind::WorkerPool.is_top_level());
    }
}
