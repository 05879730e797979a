// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reference Edge Table
//!
//! Every soft reference in a document is listed here exactly once, as an
//! edge from a field to the kind it names. Renames, deletes and integrity
//! checks walk this table instead of knowing about individual fields.

use tracing::debug;

use crate::domain::{ConfigDocument, RefSlot, ResourceKind};
use crate::registry::Registry;

/// Placeholder emitted downstream for a reference that does not resolve
pub const UNFOUND_REF: &str = "${ERROR: Unfound Ref}";

/// Callback handed every slot of an edge, with the consumer's parent scope
pub type SlotVisitor<'v> = dyn FnMut(Option<&str>, &mut dyn RefSlot) + 'v;

/// Walks every slot of one edge in a document
pub type Visit = fn(&mut ConfigDocument, &mut SlotVisitor<'_>);

/// Field holding references to records of one kind
#[derive(Clone, Copy)]
pub struct ReferenceEdge {
    /// Document path of the field, for diagnostics
    pub path: &'static str,
    pub target: ResourceKind,
    pub visit: Visit,
}

impl std::fmt::Debug for ReferenceEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceEdge")
            .field("path", &self.path)
            .field("target", &self.target)
            .finish()
    }
}

/// Record a cascade is acting on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub kind: ResourceKind,
    /// Parent the record lives under, for kinds that resolve within one
    pub scope: Option<String>,
    pub name: String,
}

impl Target {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            scope: None,
            name: name.into(),
        }
    }

    pub fn within(kind: ResourceKind, scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
            name: name.into(),
        }
    }

    fn matches_scope(&self, consumer: Option<&str>) -> bool {
        !self.kind.resolves_within_parent() || consumer == self.scope.as_deref()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} \"{}\"", self.kind, self.name)?;
        if let Some(scope) = &self.scope {
            write!(f, " in {scope}")?;
        }
        Ok(())
    }
}

/// Reference that does not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    pub path: &'static str,
    pub target: Target,
}

fn edge(path: &'static str, target: ResourceKind, visit: Visit) -> ReferenceEdge {
    ReferenceEdge {
        path,
        target,
        visit,
    }
}

/// The reference edge table
pub fn edges() -> Vec<ReferenceEdge> {
    use ResourceKind as K;

    vec![
        // resource groups
        edge("key_management[].resource_group", K::ResourceGroup, |doc, f| {
            for kms in &mut doc.key_management {
                f(None, &mut kms.resource_group);
            }
        }),
        edge("object_storage[].resource_group", K::ResourceGroup, |doc, f| {
            for cos in &mut doc.object_storage {
                f(None, &mut cos.resource_group);
            }
        }),
        edge("ssh_keys[].resource_group", K::ResourceGroup, |doc, f| {
            for key in &mut doc.ssh_keys {
                f(None, &mut key.resource_group);
            }
        }),
        edge("secrets_manager[].resource_group", K::ResourceGroup, |doc, f| {
            for secrets in &mut doc.secrets_manager {
                f(None, &mut secrets.resource_group);
            }
        }),
        edge("vpcs[].resource_group", K::ResourceGroup, |doc, f| {
            for vpc in &mut doc.vpcs {
                f(None, &mut vpc.resource_group);
            }
        }),
        edge("vpcs[].subnets[].resource_group", K::ResourceGroup, |doc, f| {
            for subnet in doc.vpcs.iter_mut().flat_map(|v| v.subnets.iter_mut()) {
                f(None, &mut subnet.resource_group);
            }
        }),
        edge("vpcs[].acls[].resource_group", K::ResourceGroup, |doc, f| {
            for acl in doc.vpcs.iter_mut().flat_map(|v| v.acls.iter_mut()) {
                f(None, &mut acl.resource_group);
            }
        }),
        edge("security_groups[].resource_group", K::ResourceGroup, |doc, f| {
            for sg in &mut doc.security_groups {
                f(None, &mut sg.resource_group);
            }
        }),
        edge("clusters[].resource_group", K::ResourceGroup, |doc, f| {
            for cluster in &mut doc.clusters {
                f(None, &mut cluster.resource_group);
            }
        }),
        edge("vsi[].resource_group", K::ResourceGroup, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.resource_group);
            }
        }),
        edge("virtual_private_endpoints[].resource_group", K::ResourceGroup, |doc, f| {
            for vpe in &mut doc.virtual_private_endpoints {
                f(None, &mut vpe.resource_group);
            }
        }),
        edge("vpn_gateways[].resource_group", K::ResourceGroup, |doc, f| {
            for gateway in &mut doc.vpn_gateways {
                f(None, &mut gateway.resource_group);
            }
        }),
        edge("vpn_servers[].resource_group", K::ResourceGroup, |doc, f| {
            for server in &mut doc.vpn_servers {
                f(None, &mut server.resource_group);
            }
        }),
        edge("transit_gateways[].resource_group", K::ResourceGroup, |doc, f| {
            for tgw in &mut doc.transit_gateways {
                f(None, &mut tgw.resource_group);
            }
        }),
        edge("dns[].resource_group", K::ResourceGroup, |doc, f| {
            for dns in &mut doc.dns {
                f(None, &mut dns.resource_group);
            }
        }),
        edge("cis[].resource_group", K::ResourceGroup, |doc, f| {
            for cis in &mut doc.cis {
                f(None, &mut cis.resource_group);
            }
        }),
        edge("power[].resource_group", K::ResourceGroup, |doc, f| {
            for workspace in &mut doc.power {
                f(None, &mut workspace.resource_group);
            }
        }),
        edge("atracker.resource_group", K::ResourceGroup, |doc, f| {
            f(None, &mut doc.atracker.resource_group);
        }),
        // key management
        edge("object_storage[].kms", K::KeyManagement, |doc, f| {
            for cos in &mut doc.object_storage {
                f(None, &mut cos.kms);
            }
        }),
        edge("clusters[].kms", K::KeyManagement, |doc, f| {
            for cluster in &mut doc.clusters {
                f(None, &mut cluster.kms);
            }
        }),
        edge("vsi[].kms", K::KeyManagement, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.kms);
            }
        }),
        edge("secrets_manager[].kms", K::KeyManagement, |doc, f| {
            for secrets in &mut doc.secrets_manager {
                f(None, &mut secrets.kms);
            }
        }),
        // encryption keys
        edge("object_storage[].buckets[].kms_key", K::KmsKey, |doc, f| {
            for bucket in doc.object_storage.iter_mut().flat_map(|c| c.buckets.iter_mut()) {
                f(None, &mut bucket.kms_key);
            }
        }),
        edge("clusters[].encryption_key", K::KmsKey, |doc, f| {
            for cluster in &mut doc.clusters {
                f(None, &mut cluster.encryption_key);
            }
        }),
        edge("vsi[].encryption_key", K::KmsKey, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.encryption_key);
            }
        }),
        edge("secrets_manager[].encryption_key", K::KmsKey, |doc, f| {
            for secrets in &mut doc.secrets_manager {
                f(None, &mut secrets.encryption_key);
            }
        }),
        // object storage
        edge("vpcs[].cos", K::ObjectStorage, |doc, f| {
            for vpc in &mut doc.vpcs {
                f(None, &mut vpc.cos);
            }
        }),
        edge("clusters[].cos", K::ObjectStorage, |doc, f| {
            for cluster in &mut doc.clusters {
                f(None, &mut cluster.cos);
            }
        }),
        edge("virtual_private_endpoints[].instance", K::ObjectStorage, |doc, f| {
            for vpe in &mut doc.virtual_private_endpoints {
                f(None, &mut vpe.instance);
            }
        }),
        edge("vpcs[].bucket", K::Bucket, |doc, f| {
            for vpc in &mut doc.vpcs {
                f(None, &mut vpc.bucket);
            }
        }),
        edge("atracker.bucket", K::Bucket, |doc, f| {
            f(None, &mut doc.atracker.bucket);
        }),
        edge("atracker.cos_key", K::CosKey, |doc, f| {
            f(None, &mut doc.atracker.cos_key);
        }),
        edge("vsi[].ssh_keys", K::SshKey, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.ssh_keys);
            }
        }),
        // vpcs
        edge("_options.edge_vpc_name", K::Vpc, |doc, f| {
            f(None, &mut doc.options.edge_vpc_name);
        }),
        edge("security_groups[].vpc", K::Vpc, |doc, f| {
            for sg in &mut doc.security_groups {
                f(None, &mut sg.vpc);
            }
        }),
        edge("clusters[].vpc", K::Vpc, |doc, f| {
            for cluster in &mut doc.clusters {
                f(None, &mut cluster.vpc);
            }
        }),
        edge("vsi[].vpc", K::Vpc, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.vpc);
            }
        }),
        edge("virtual_private_endpoints[].vpc", K::Vpc, |doc, f| {
            for vpe in &mut doc.virtual_private_endpoints {
                f(None, &mut vpe.vpc);
            }
        }),
        edge("vpn_gateways[].vpc", K::Vpc, |doc, f| {
            for gateway in &mut doc.vpn_gateways {
                f(None, &mut gateway.vpc);
            }
        }),
        edge("vpn_servers[].vpc", K::Vpc, |doc, f| {
            for server in &mut doc.vpn_servers {
                f(None, &mut server.vpc);
            }
        }),
        edge("transit_gateways[].connections[].vpc", K::Vpc, |doc, f| {
            for connection in doc
                .transit_gateways
                .iter_mut()
                .flat_map(|t| t.connections.iter_mut())
            {
                f(None, &mut connection.vpc);
            }
        }),
        edge("dns[].zones[].permitted_networks", K::Vpc, |doc, f| {
            for zone in doc.dns.iter_mut().flat_map(|d| d.zones.iter_mut()) {
                f(None, &mut zone.permitted_networks);
            }
        }),
        edge("dns[].custom_resolvers[].vpc", K::Vpc, |doc, f| {
            for resolver in doc.dns.iter_mut().flat_map(|d| d.custom_resolvers.iter_mut()) {
                f(None, &mut resolver.vpc);
            }
        }),
        // subnets, resolved inside the consumer's vpc
        edge("clusters[].subnets", K::Subnet, |doc, f| {
            for cluster in &mut doc.clusters {
                let vpc = cluster.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut cluster.subnets);
            }
        }),
        edge("clusters[].worker_pools[].subnets", K::Subnet, |doc, f| {
            for cluster in &mut doc.clusters {
                let vpc = cluster.vpc.as_ref().map(|v| v.as_str());
                for pool in &mut cluster.worker_pools {
                    f(vpc, &mut pool.subnets);
                }
            }
        }),
        edge("vsi[].subnets", K::Subnet, |doc, f| {
            for vsi in &mut doc.vsi {
                let vpc = vsi.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut vsi.subnets);
            }
        }),
        edge("virtual_private_endpoints[].subnets", K::Subnet, |doc, f| {
            for vpe in &mut doc.virtual_private_endpoints {
                let vpc = vpe.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut vpe.subnets);
            }
        }),
        edge("vpn_gateways[].subnet", K::Subnet, |doc, f| {
            for gateway in &mut doc.vpn_gateways {
                let vpc = gateway.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut gateway.subnet);
            }
        }),
        edge("vpn_servers[].subnets", K::Subnet, |doc, f| {
            for server in &mut doc.vpn_servers {
                let vpc = server.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut server.subnets);
            }
        }),
        edge("dns[].custom_resolvers[].subnets", K::Subnet, |doc, f| {
            for resolver in doc.dns.iter_mut().flat_map(|d| d.custom_resolvers.iter_mut()) {
                let vpc = resolver.vpc.as_ref().map(|v| v.as_str());
                f(vpc, &mut resolver.subnets);
            }
        }),
        // network acls, resolved inside the owning vpc
        edge("vpcs[].subnets[].network_acl", K::NetworkAcl, |doc, f| {
            for vpc in &mut doc.vpcs {
                for subnet in &mut vpc.subnets {
                    f(Some(vpc.name.as_str()), &mut subnet.network_acl);
                }
            }
        }),
        edge("vpcs[].subnetTiers[].networkAcl", K::NetworkAcl, |doc, f| {
            for vpc in &mut doc.vpcs {
                for tier in &mut vpc.subnet_tiers {
                    f(Some(vpc.name.as_str()), &mut tier.network_acl);
                }
            }
        }),
        // security groups
        edge("vsi[].security_groups", K::SecurityGroup, |doc, f| {
            for vsi in &mut doc.vsi {
                f(None, &mut vsi.security_groups);
            }
        }),
        edge("virtual_private_endpoints[].security_groups", K::SecurityGroup, |doc, f| {
            for vpe in &mut doc.virtual_private_endpoints {
                f(None, &mut vpe.security_groups);
            }
        }),
        edge("vpn_servers[].security_groups", K::SecurityGroup, |doc, f| {
            for server in &mut doc.vpn_servers {
                f(None, &mut server.security_groups);
            }
        }),
        // dns zones, resolved inside the owning dns instance
        edge("dns[].records[].dns_zone", K::DnsZone, |doc, f| {
            for dns in &mut doc.dns {
                for record in &mut dns.records {
                    f(Some(dns.name.as_str()), &mut record.dns_zone);
                }
            }
        }),
        edge("transit_gateways[].connections[].power", K::PowerWorkspace, |doc, f| {
            for connection in doc
                .transit_gateways
                .iter_mut()
                .flat_map(|t| t.connections.iter_mut())
            {
                f(None, &mut connection.power);
            }
        }),
        edge("classic_gateways[].private_vlan", K::ClassicVlan, |doc, f| {
            for gateway in &mut doc.classic_gateways {
                f(None, &mut gateway.private_vlan);
            }
        }),
        edge("classic_gateways[].public_vlan", K::ClassicVlan, |doc, f| {
            for gateway in &mut doc.classic_gateways {
                f(None, &mut gateway.public_vlan);
            }
        }),
    ]
}

/// Point every reference to `target` at `new_name`
pub fn rename_references(doc: &mut ConfigDocument, target: &Target, new_name: &str) -> usize {
    let mut renamed = 0;
    for edge in edges().iter().filter(|e| e.target == target.kind) {
        (edge.visit)(doc, &mut |scope, slot| {
            if target.matches_scope(scope) {
                renamed += slot.rename(&target.name, new_name);
            }
        });
    }
    debug!(
        kind = %target.kind,
        from = %target.name,
        to = new_name,
        renamed,
        "Renamed references"
    );
    renamed
}

/// Drop every reference to `target`
pub fn clear_references(doc: &mut ConfigDocument, target: &Target) -> usize {
    let mut cleared = 0;
    for edge in edges().iter().filter(|e| e.target == target.kind) {
        (edge.visit)(doc, &mut |scope, slot| {
            if target.matches_scope(scope) {
                cleared += slot.clear(&target.name);
            }
        });
    }
    if cleared > 0 {
        debug!(kind = %target.kind, name = %target.name, cleared, "Cleared references");
    }
    cleared
}

/// Every reference in the document that does not resolve
pub fn dangling_references(doc: &ConfigDocument) -> Vec<DanglingRef> {
    let registry = Registry::from_document(doc);
    // visitors need a mutable document; they only read here
    let mut scratch = doc.clone();
    let mut found = Vec::new();

    for edge in edges() {
        (edge.visit)(&mut scratch, &mut |scope, slot| {
            let scope = scope.filter(|_| edge.target.resolves_within_parent());
            for name in slot.names() {
                if !registry.resolves(edge.target, scope, name) {
                    found.push(DanglingRef {
                        path: edge.path,
                        target: Target {
                            kind: edge.target,
                            scope: scope.map(str::to_string),
                            name: name.to_string(),
                        },
                    });
                }
            }
        });
    }
    found
}

/// Clear every reference that does not resolve, returning what was cleared
pub fn sanitize(doc: &mut ConfigDocument) -> Vec<DanglingRef> {
    let dangling = dangling_references(doc);
    for reference in &dangling {
        clear_references(doc, &reference.target);
    }
    dangling
}

/// Resolve a reference for downstream consumers, or the unfound placeholder
pub fn resolve_or_unfound(
    registry: &Registry,
    kind: ResourceKind,
    scope: Option<&str>,
    name: Option<&str>,
) -> String {
    match name {
        Some(name) if registry.resolves(kind, scope, name) => name.to_string(),
        _ => UNFOUND_REF.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Template;
    use pretty_assertions::assert_eq;

    fn default_doc() -> ConfigDocument {
        ConfigDocument::from_template(Template::Default)
    }

    #[test]
    fn test_default_document_has_no_dangling_references() {
        let dangling = dangling_references(&default_doc());
        assert!(dangling.is_empty(), "{dangling:?}");
    }

    #[test]
    fn test_rename_key_management() {
        let mut doc = default_doc();
        let target = Target::new(ResourceKind::KeyManagement, "kms");
        let renamed = rename_references(&mut doc, &target, "vault");
        // two cos instances, the cluster and the vsi deployment
        assert_eq!(renamed, 4);
        assert!(doc
            .object_storage
            .iter()
            .all(|c| c.kms.as_ref().is_some_and(|k| k.is("vault"))));
    }

    #[test]
    fn test_subnet_rename_stays_in_scope() {
        let mut doc = default_doc();
        let target = Target::within(ResourceKind::Subnet, "management", "vsi-zone-1");
        rename_references(&mut doc, &target, "frog-zone-1");

        assert!(doc.vsi[0].subnets[0].is("frog-zone-1"));
        // the workload cluster has its own vsi-zone-1
        assert!(doc.clusters[0].subnets[0].is("vsi-zone-1"));
    }

    #[test]
    fn test_clear_drops_list_entries() {
        let mut doc = default_doc();
        let cleared = clear_references(&mut doc, &Target::new(ResourceKind::SshKey, "ssh-key"));
        assert_eq!(cleared, 1);
        assert!(doc.vsi[0].ssh_keys.is_empty());
    }

    #[test]
    fn test_sanitize_clears_dangling() {
        let mut doc = default_doc();
        doc.key_management.clear();
        let cleared = sanitize(&mut doc);
        assert!(cleared.iter().any(|d| d.path == "object_storage[].kms"));
        assert!(cleared.iter().any(|d| d.target.name == "vsi-volume-key"));
        assert!(dangling_references(&doc).is_empty());
        assert!(doc.object_storage[1].buckets[0].kms_key.is_none());
    }

    #[test]
    fn test_target_display() {
        let subnet = Target::within(ResourceKind::Subnet, "management", "vsi-zone-1");
        assert_eq!(subnet.to_string(), "subnet \"vsi-zone-1\" in management");
    }

    #[test]
    fn test_resolve_or_unfound() {
        let registry = Registry::from_document(&default_doc());
        assert_eq!(
            resolve_or_unfound(&registry, ResourceKind::Vpc, None, Some("management")),
            "management"
        );
        assert_eq!(
            resolve_or_unfound(&registry, ResourceKind::Vpc, None, Some("missing")),
            UNFOUND_REF
        );
        assert_eq!(resolve_or_unfound(&registry, ResourceKind::Vpc, None, None), UNFOUND_REF);
    }

    #[test]
    fn test_every_edge_targets_a_named_kind() {
        for edge in edges() {
            assert!(!edge.path.is_empty());
            assert_ne!(edge.target, ResourceKind::SubnetTier, "{}", edge.path);
        }
    }
}
