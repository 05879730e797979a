// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generic record access
//!
//! `Resource` tells the store where a kind of record lives and which derived
//! fields it maintains, so a single `create`/`save`/`delete` implementation
//! serves every kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::classic::{ClassicGateway, ClassicVlan};
use super::compute::{Cluster, VirtualPrivateEndpoint, VsiDeployment, WorkerPool};
use super::connectivity::{
    Cis, CisDomain, CustomResolver, Dns, DnsRecord, DnsZone, TransitGateway, VpnGateway, VpnServer,
};
use super::document::ConfigDocument;
use super::power::{PowerNetwork, PowerSshKey, PowerWorkspace};
use super::reference::Ref;
use super::resource_kind::ResourceKind;
use super::security::{ResourceGroup, SecretsManager, SecurityGroup, SecurityGroupRule, SshKey};
use super::storage::{Bucket, CosKey, KeyManagement, KmsKey, ObjectStorage};
use super::vpc::{AclRule, AddressPrefix, NetworkAcl, Subnet, SubnetTier, Vpc};
use crate::errors::{StoreError, StoreResult};
use crate::references::Target;

/// Record identified by a name
pub trait Nameable {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

macro_rules! nameable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Nameable for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn set_name(&mut self, name: String) {
                    self.name = name;
                }
            }
        )*
    };
}

nameable!(
    ResourceGroup,
    SshKey,
    KeyManagement,
    KmsKey,
    ObjectStorage,
    Bucket,
    CosKey,
    SecretsManager,
    Vpc,
    AddressPrefix,
    Subnet,
    SubnetTier,
    NetworkAcl,
    AclRule,
    SecurityGroup,
    SecurityGroupRule,
    Cluster,
    WorkerPool,
    VsiDeployment,
    VirtualPrivateEndpoint,
    VpnGateway,
    VpnServer,
    TransitGateway,
    Dns,
    DnsZone,
    DnsRecord,
    CustomResolver,
    Cis,
    CisDomain,
    PowerWorkspace,
    PowerNetwork,
    PowerSshKey,
    ClassicVlan,
    ClassicGateway,
);

/// Record kind managed through the generic store operations
///
/// `parents` names the records enclosing the collection, outermost first:
/// empty for top-level kinds, `[vpc]` for ACLs, `[vpc, acl]` for ACL rules.
pub trait Resource: Nameable + Clone + fmt::Debug + Serialize + DeserializeOwned {
    const KIND: ResourceKind;

    /// Collection holding records of this kind
    fn collection<'a>(doc: &'a ConfigDocument, parents: &[String]) -> StoreResult<&'a Vec<Self>>;

    fn collection_mut<'a>(
        doc: &'a mut ConfigDocument,
        parents: &[String],
    ) -> StoreResult<&'a mut Vec<Self>>;

    /// Records removed together with this one that others may reference
    fn children(&self, _parents: &[String]) -> Vec<Target> {
        Vec::new()
    }

    /// Fill derived defaults before the record is inserted
    fn attach(&mut self, _doc: &ConfigDocument, _parents: &[String]) {}

    /// Apply resets implied by a field-level update
    fn on_update(&mut self, _previous: &Self) {}
}

/// Address of a record: enclosing parent names plus its own name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub parents: Vec<String>,
    pub name: String,
}

impl Locator {
    /// Top-level record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            name: name.into(),
        }
    }

    /// Nested record
    pub fn within<I, S>(parents: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parents: parents.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for parent in &self.parents {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}", self.name)
    }
}

fn expect_parents(kind: ResourceKind, parents: &[String], depth: usize) -> StoreResult<()> {
    if parents.len() != depth {
        return Err(StoreError::InvalidOperation(format!(
            "{kind} is addressed by {depth} parent name(s), got {}",
            parents.len()
        )));
    }
    Ok(())
}

macro_rules! top_level_resource {
    ($ty:ty, $kind:ident, $field:ident $(, { $($body:tt)* })?) => {
        impl Resource for $ty {
            const KIND: ResourceKind = ResourceKind::$kind;

            fn collection<'a>(
                doc: &'a ConfigDocument,
                parents: &[String],
            ) -> StoreResult<&'a Vec<Self>> {
                expect_parents(Self::KIND, parents, 0)?;
                Ok(&doc.$field)
            }

            fn collection_mut<'a>(
                doc: &'a mut ConfigDocument,
                parents: &[String],
            ) -> StoreResult<&'a mut Vec<Self>> {
                expect_parents(Self::KIND, parents, 0)?;
                Ok(&mut doc.$field)
            }

            $($($body)*)?
        }
    };
}

macro_rules! nested_resource {
    ($ty:ty, $kind:ident, $parent:ident . $field:ident $(, { $($body:tt)* })?) => {
        impl Resource for $ty {
            const KIND: ResourceKind = ResourceKind::$kind;

            fn collection<'a>(
                doc: &'a ConfigDocument,
                parents: &[String],
            ) -> StoreResult<&'a Vec<Self>> {
                expect_parents(Self::KIND, parents, 1)?;
                doc.$parent
                    .iter()
                    .find(|p| p.name == parents[0])
                    .map(|p| &p.$field)
                    .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[0]))
            }

            fn collection_mut<'a>(
                doc: &'a mut ConfigDocument,
                parents: &[String],
            ) -> StoreResult<&'a mut Vec<Self>> {
                expect_parents(Self::KIND, parents, 1)?;
                doc.$parent
                    .iter_mut()
                    .find(|p| p.name == parents[0])
                    .map(|p| &mut p.$field)
                    .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[0]))
            }

            $($($body)*)?
        }
    };
}

fn targets<'a, T: Nameable + 'a>(
    kind: ResourceKind,
    scope: Option<&str>,
    records: impl IntoIterator<Item = &'a T>,
) -> Vec<Target> {
    records
        .into_iter()
        .map(|r| Target {
            kind,
            scope: scope.map(str::to_string),
            name: r.name().to_string(),
        })
        .collect()
}

fn vpc_resource_group(
    doc: &ConfigDocument,
    parents: &[String],
) -> Option<Ref<ResourceGroup>> {
    parents
        .first()
        .and_then(|vpc| doc.vpc(vpc))
        .and_then(|vpc| vpc.resource_group.clone())
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

top_level_resource!(ResourceGroup, ResourceGroup, resource_groups, {
    fn on_update(&mut self, previous: &Self) {
        if self.use_data && !previous.use_data {
            self.use_prefix = false;
        }
    }
});

top_level_resource!(SshKey, SshKey, ssh_keys);

top_level_resource!(KeyManagement, KeyManagement, key_management, {
    fn children(&self, _parents: &[String]) -> Vec<Target> {
        targets(ResourceKind::KmsKey, None, &self.keys)
    }
});

nested_resource!(KmsKey, KmsKey, key_management.keys);

top_level_resource!(ObjectStorage, ObjectStorage, object_storage, {
    fn children(&self, _parents: &[String]) -> Vec<Target> {
        let mut children = targets(ResourceKind::Bucket, None, &self.buckets);
        children.extend(targets(ResourceKind::CosKey, None, &self.keys));
        children
    }

    fn attach(&mut self, _doc: &ConfigDocument, _parents: &[String]) {
        if self.use_random_suffix && self.random_suffix.is_none() {
            self.random_suffix = Some(random_suffix());
        }
    }

    fn on_update(&mut self, previous: &Self) {
        if self.use_data && !previous.use_data {
            self.use_random_suffix = false;
        }
        if self.use_random_suffix && self.random_suffix.is_none() {
            self.random_suffix = previous.random_suffix.clone().or_else(|| Some(random_suffix()));
        }
    }
});

nested_resource!(Bucket, Bucket, object_storage.buckets);
nested_resource!(CosKey, CosKey, object_storage.keys);

top_level_resource!(SecretsManager, SecretsManager, secrets_manager);

top_level_resource!(Vpc, Vpc, vpcs, {
    fn children(&self, _parents: &[String]) -> Vec<Target> {
        let scope = Some(self.name.as_str());
        let mut children = targets(ResourceKind::Subnet, scope, &self.subnets);
        children.extend(targets(ResourceKind::NetworkAcl, scope, &self.acls));
        children.extend(targets(ResourceKind::AddressPrefix, scope, &self.address_prefixes));
        children.extend(targets(ResourceKind::SubnetTier, scope, &self.subnet_tiers));
        children
    }

    fn on_update(&mut self, previous: &Self) {
        // imported VPCs cannot provision flow log storage
        if self.use_data && !previous.use_data {
            self.bucket = None;
        }
    }
});

nested_resource!(AddressPrefix, AddressPrefix, vpcs.address_prefixes);

nested_resource!(NetworkAcl, NetworkAcl, vpcs.acls, {
    fn attach(&mut self, doc: &ConfigDocument, parents: &[String]) {
        if self.resource_group.is_none() {
            self.resource_group = vpc_resource_group(doc, parents);
        }
    }
});

impl Resource for AclRule {
    const KIND: ResourceKind = ResourceKind::AclRule;

    fn collection<'a>(doc: &'a ConfigDocument, parents: &[String]) -> StoreResult<&'a Vec<Self>> {
        expect_parents(Self::KIND, parents, 2)?;
        let vpc = doc
            .vpc(&parents[0])
            .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[0]))?;
        vpc.acls
            .iter()
            .find(|acl| acl.name == parents[1])
            .map(|acl| &acl.rules)
            .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[1]))
    }

    fn collection_mut<'a>(
        doc: &'a mut ConfigDocument,
        parents: &[String],
    ) -> StoreResult<&'a mut Vec<Self>> {
        expect_parents(Self::KIND, parents, 2)?;
        let vpc = doc
            .vpc_mut(&parents[0])
            .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[0]))?;
        vpc.acls
            .iter_mut()
            .find(|acl| acl.name == parents[1])
            .map(|acl| &mut acl.rules)
            .ok_or_else(|| StoreError::parent_not_found(Self::KIND, &parents[1]))
    }
}

top_level_resource!(SecurityGroup, SecurityGroup, security_groups, {
    fn attach(&mut self, doc: &ConfigDocument, _parents: &[String]) {
        if self.resource_group.is_none() {
            if let Some(vpc) = self.vpc.as_ref().and_then(|v| doc.vpc(v.as_str())) {
                self.resource_group = vpc.resource_group.clone();
            }
        }
    }
});

nested_resource!(SecurityGroupRule, SecurityGroupRule, security_groups.rules);

top_level_resource!(Cluster, Cluster, clusters, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnets.clear();
            for pool in &mut self.worker_pools {
                pool.subnets.clear();
            }
        }
    }
});

nested_resource!(WorkerPool, WorkerPool, clusters.worker_pools, {
    fn attach(&mut self, doc: &ConfigDocument, parents: &[String]) {
        let cluster = parents
            .first()
            .and_then(|parent| doc.clusters.iter().find(|c| &c.name == parent));
        if let Some(cluster) = cluster {
            self.vpc.clone_from(&cluster.vpc);
            if self.subnets.is_empty() {
                self.subnets.clone_from(&cluster.subnets);
            }
            if self.flavor.is_none() {
                self.flavor.clone_from(&cluster.flavor);
            }
        }
    }
});

top_level_resource!(VsiDeployment, Vsi, vsi, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnets.clear();
            self.security_groups.clear();
        }
    }
});

top_level_resource!(VirtualPrivateEndpoint, VirtualPrivateEndpoint, virtual_private_endpoints, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnets.clear();
            self.security_groups.clear();
        }
    }
});

top_level_resource!(VpnGateway, VpnGateway, vpn_gateways, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnet = None;
        }
    }
});

top_level_resource!(VpnServer, VpnServer, vpn_servers, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnets.clear();
            self.security_groups.clear();
        }
    }
});

top_level_resource!(TransitGateway, TransitGateway, transit_gateways);

top_level_resource!(Dns, Dns, dns, {
    fn children(&self, _parents: &[String]) -> Vec<Target> {
        targets(ResourceKind::DnsZone, Some(self.name.as_str()), &self.zones)
    }
});

nested_resource!(DnsZone, DnsZone, dns.zones);
nested_resource!(DnsRecord, DnsRecord, dns.records);

nested_resource!(CustomResolver, CustomResolver, dns.custom_resolvers, {
    fn on_update(&mut self, previous: &Self) {
        if self.vpc != previous.vpc {
            self.subnets.clear();
        }
    }
});

top_level_resource!(Cis, Cis, cis);
nested_resource!(CisDomain, CisDomain, cis.domains);

top_level_resource!(PowerWorkspace, PowerWorkspace, power);
nested_resource!(PowerNetwork, PowerNetwork, power.network);
nested_resource!(PowerSshKey, PowerSshKey, power.ssh_keys);

top_level_resource!(ClassicVlan, ClassicVlan, classic_vlans);

top_level_resource!(ClassicGateway, ClassicGateway, classic_gateways, {
    fn on_update(&mut self, _previous: &Self) {
        if self.private_network_only {
            self.public_bandwidth = None;
            self.public_vlan = None;
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Template;

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::new("management").to_string(), "management");
        assert_eq!(
            Locator::within(["management", "management"], "allow-all-outbound").to_string(),
            "management/management/allow-all-outbound"
        );
    }

    #[test]
    fn test_nested_collection_lookup() {
        let doc = ConfigDocument::from_template(Template::Default);
        let keys = KmsKey::collection(&doc, &["kms".to_string()]).unwrap();
        assert_eq!(keys.len(), 3);

        let missing = Bucket::collection(&doc, &["nope".to_string()]);
        assert!(matches!(missing, Err(StoreError::ParentNotFound { .. })));

        let wrong_depth = Vpc::collection(&doc, &["extra".to_string()]);
        assert!(matches!(wrong_depth, Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_vpc_children_are_scoped() {
        let doc = ConfigDocument::from_template(Template::Default);
        let children = doc.vpcs[0].children(&[]);
        assert!(children.iter().all(|t| t.scope.as_deref() == Some("management")));
        assert!(children
            .iter()
            .any(|t| t.kind == ResourceKind::Subnet && t.name == "vpn-zone-1"));
    }

    #[test]
    fn test_random_suffix_is_generated_once() {
        let previous = ObjectStorage {
            name: "cos".into(),
            ..Default::default()
        };
        let mut enabled = previous.clone();
        enabled.use_random_suffix = true;
        enabled.on_update(&previous);
        let suffix = enabled.random_suffix.clone();
        assert!(suffix.is_some());

        let mut saved_again = enabled.clone();
        saved_again.on_update(&enabled);
        assert_eq!(saved_again.random_suffix, suffix);
    }
}
