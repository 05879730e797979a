// Copyright (c) 2025 - Cowboy AI, Inc.
//! Landing-Zone Domain Models
//!
//! Records, value objects and references that make up a configuration
//! document.
//!
//! # Value Objects with Invariants
//!
//! - [`ResourceName`] - lowercase, hyphenated resource names
//! - [`CidrBlock`] - IPv4 CIDR block kept exactly as written
//! - [`Ref`] - soft, name-based reference to another record
//!
//! # Records
//!
//! Every record is keyed by `name` within its collection. Nested records
//! (subnets, rules, keys, buckets, worker pools, ...) carry a back-pointer
//! to their owner which [`ConfigDocument::sync_back_pointers`] keeps honest.
//!
//! # Resource Taxonomy
//!
//! [`ResourceKind`] names each collection and its naming scope; the
//! [`Resource`] trait ties a record type to its collection inside a
//! document.

pub mod classic;
pub mod compute;
pub mod connectivity;
pub mod document;
pub mod name;
pub mod network;
pub mod options;
pub mod power;
pub mod reference;
pub mod resource;
pub mod resource_kind;
pub mod security;
pub mod storage;
pub mod vpc;

// Re-export value objects
pub use name::{is_valid_name, split_zone_subnet, NameError, ResourceName, NAME_PATTERN};
pub use network::{validate_zone, CidrBlock, NetworkError, MAX_ZONES};
pub use reference::{Ref, RefSlot};
pub use resource_kind::{NameScope, ResourceKind};

// Re-export records
pub use classic::{ClassicGateway, ClassicVlan, VlanType};
pub use compute::{Cluster, ClusterKind, VirtualPrivateEndpoint, VsiDeployment, WorkerPool};
pub use connectivity::{
    Cis, CisDomain, CustomResolver, Dns, DnsRecord, DnsZone, TgwConnection, TransitGateway,
    VpnConnection, VpnGateway, VpnServer,
};
pub use document::{ConfigDocument, Template, DEFAULT_PUBLIC_KEY};
pub use options::Options;
pub use power::{PowerNetwork, PowerSshKey, PowerWorkspace};
pub use resource::{Locator, Nameable, Resource};
pub use security::{
    Atracker, ResourceGroup, SecretsManager, SecurityGroup, SecurityGroupRule, SshKey,
};
pub use storage::{Bucket, CosKey, KeyManagement, KmsKey, ObjectStorage};
pub use vpc::{
    normalize_zones, AclRule, AddressPrefix, NetworkAcl, RuleAction, RuleDirection, RuleProtocol,
    Subnet, SubnetTier, TierError, TierShape, Vpc,
};
