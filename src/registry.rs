// Copyright (c) 2025 - Cowboy AI, Inc.
//! Name/Reference Registry
//!
//! Lookup views derived from a document: names per kind, names per parent,
//! subnet tiers per VPC and security groups per VPC. A registry is a pure
//! function of the document it was built from and is rebuilt after every
//! committed mutation.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{ConfigDocument, NameScope, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    parent: Option<String>,
    name: String,
}

/// Name collision found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub kind: ResourceKind,
    /// Parent the names collide under, `None` for top-level and global kinds
    pub scope: Option<String>,
    pub name: String,
}

/// Derived lookup views over a configuration document
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<ResourceKind, Vec<Entry>>,
    subnet_tiers: BTreeMap<String, Vec<String>>,
    tier_subnets: HashMap<(String, String), Vec<String>>,
    security_groups: BTreeMap<String, Vec<String>>,
}

impl Registry {
    /// Build the registry for a document
    pub fn from_document(doc: &ConfigDocument) -> Self {
        let mut registry = Self::default();

        for rg in &doc.resource_groups {
            registry.add(ResourceKind::ResourceGroup, None, &rg.name);
        }
        for key in &doc.ssh_keys {
            registry.add(ResourceKind::SshKey, None, &key.name);
        }
        for kms in &doc.key_management {
            registry.add(ResourceKind::KeyManagement, None, &kms.name);
            for key in &kms.keys {
                registry.add(ResourceKind::KmsKey, Some(&kms.name), &key.name);
            }
        }
        for cos in &doc.object_storage {
            registry.add(ResourceKind::ObjectStorage, None, &cos.name);
            for bucket in &cos.buckets {
                registry.add(ResourceKind::Bucket, Some(&cos.name), &bucket.name);
            }
            for key in &cos.keys {
                registry.add(ResourceKind::CosKey, Some(&cos.name), &key.name);
            }
        }
        for secrets in &doc.secrets_manager {
            registry.add(ResourceKind::SecretsManager, None, &secrets.name);
        }

        for vpc in &doc.vpcs {
            let parent = Some(vpc.name.as_str());
            registry.add(ResourceKind::Vpc, None, &vpc.name);
            for prefix in &vpc.address_prefixes {
                registry.add(ResourceKind::AddressPrefix, parent, &prefix.name);
            }
            for subnet in &vpc.subnets {
                registry.add(ResourceKind::Subnet, parent, &subnet.name);
            }
            for acl in &vpc.acls {
                registry.add(ResourceKind::NetworkAcl, parent, &acl.name);
                let acl_parent = format!("{}/{}", vpc.name, acl.name);
                for rule in &acl.rules {
                    registry.add(ResourceKind::AclRule, Some(&acl_parent), &rule.name);
                }
            }
            let mut tiers = Vec::with_capacity(vpc.subnet_tiers.len());
            for tier in &vpc.subnet_tiers {
                registry.add(ResourceKind::SubnetTier, parent, &tier.name);
                tiers.push(tier.name.clone());
                registry.tier_subnets.insert(
                    (vpc.name.clone(), tier.name.clone()),
                    vpc.tier_subnets(&tier.name).map(|s| s.name.clone()).collect(),
                );
            }
            registry.subnet_tiers.insert(vpc.name.clone(), tiers);
        }

        for sg in &doc.security_groups {
            registry.add(ResourceKind::SecurityGroup, None, &sg.name);
            for rule in &sg.rules {
                registry.add(ResourceKind::SecurityGroupRule, Some(&sg.name), &rule.name);
            }
            if let Some(vpc) = &sg.vpc {
                registry
                    .security_groups
                    .entry(vpc.as_str().to_string())
                    .or_default()
                    .push(sg.name.clone());
            }
        }

        for cluster in &doc.clusters {
            registry.add(ResourceKind::Cluster, None, &cluster.name);
            for pool in &cluster.worker_pools {
                registry.add(ResourceKind::WorkerPool, Some(&cluster.name), &pool.name);
            }
        }
        for vsi in &doc.vsi {
            registry.add(ResourceKind::Vsi, None, &vsi.name);
        }
        for vpe in &doc.virtual_private_endpoints {
            registry.add(ResourceKind::VirtualPrivateEndpoint, None, &vpe.name);
        }
        for gateway in &doc.vpn_gateways {
            registry.add(ResourceKind::VpnGateway, None, &gateway.name);
        }
        for server in &doc.vpn_servers {
            registry.add(ResourceKind::VpnServer, None, &server.name);
        }
        for tgw in &doc.transit_gateways {
            registry.add(ResourceKind::TransitGateway, None, &tgw.name);
        }
        for dns in &doc.dns {
            let parent = Some(dns.name.as_str());
            registry.add(ResourceKind::Dns, None, &dns.name);
            for zone in &dns.zones {
                registry.add(ResourceKind::DnsZone, parent, &zone.name);
            }
            for record in &dns.records {
                registry.add(ResourceKind::DnsRecord, parent, &record.name);
            }
            for resolver in &dns.custom_resolvers {
                registry.add(ResourceKind::CustomResolver, parent, &resolver.name);
            }
        }
        for cis in &doc.cis {
            registry.add(ResourceKind::Cis, None, &cis.name);
            for domain in &cis.domains {
                registry.add(ResourceKind::CisDomain, Some(&cis.name), &domain.name);
            }
        }
        for workspace in &doc.power {
            let parent = Some(workspace.name.as_str());
            registry.add(ResourceKind::PowerWorkspace, None, &workspace.name);
            for network in &workspace.network {
                registry.add(ResourceKind::PowerNetwork, parent, &network.name);
            }
            for key in &workspace.ssh_keys {
                registry.add(ResourceKind::PowerSshKey, parent, &key.name);
            }
        }
        for vlan in &doc.classic_vlans {
            registry.add(ResourceKind::ClassicVlan, None, &vlan.name);
        }
        for gateway in &doc.classic_gateways {
            registry.add(ResourceKind::ClassicGateway, None, &gateway.name);
        }

        registry
    }

    fn add(&mut self, kind: ResourceKind, parent: Option<&str>, name: &str) {
        self.entries.entry(kind).or_default().push(Entry {
            parent: parent.map(str::to_string),
            name: name.to_string(),
        });
    }

    fn entries(&self, kind: ResourceKind) -> &[Entry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every name of a kind, in document order
    pub fn names(&self, kind: ResourceKind) -> Vec<&str> {
        self.entries(kind).iter().map(|e| e.name.as_str()).collect()
    }

    /// Names of a kind under one parent (`vpc` or `vpc/acl` for ACL rules)
    pub fn names_in(&self, kind: ResourceKind, parent: &str) -> Vec<&str> {
        self.entries(kind)
            .iter()
            .filter(|e| e.parent.as_deref() == Some(parent))
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Names a new record of `kind` under `parents` must not collide with
    pub fn siblings(&self, kind: ResourceKind, parents: &[String]) -> Vec<&str> {
        match kind.name_scope() {
            NameScope::Global => self.names(kind),
            _ if parents.is_empty() => self
                .entries(kind)
                .iter()
                .filter(|e| e.parent.is_none())
                .map(|e| e.name.as_str())
                .collect(),
            _ => self.names_in(kind, &parents.join("/")),
        }
    }

    /// Check whether a reference to `name` resolves
    ///
    /// Kinds that resolve within a parent only match records under `scope`.
    pub fn resolves(&self, kind: ResourceKind, scope: Option<&str>, name: &str) -> bool {
        let entries = self.entries(kind).iter();
        if kind.resolves_within_parent() {
            entries
                .filter(|e| e.parent.as_deref() == scope && scope.is_some())
                .any(|e| e.name == name)
        } else {
            entries.into_iter().any(|e| e.name == name)
        }
    }

    /// Check whether a record named `name` exists under `scope`
    ///
    /// Globally named kinds ignore the scope.
    pub fn contains(&self, kind: ResourceKind, scope: Option<&str>, name: &str) -> bool {
        let global = kind.name_scope() == NameScope::Global;
        self.entries(kind)
            .iter()
            .any(|e| e.name == name && (global || e.parent.as_deref() == scope))
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.entries(kind).len()
    }

    /// Names that appear more than once in their uniqueness scope
    pub fn duplicates(&self) -> Vec<Duplicate> {
        let mut found = Vec::new();
        for (&kind, entries) in &self.entries {
            let mut seen: HashMap<(Option<&str>, &str), usize> = HashMap::new();
            for entry in entries {
                let scope = match kind.name_scope() {
                    NameScope::Global => None,
                    _ => entry.parent.as_deref(),
                };
                let count = seen.entry((scope, entry.name.as_str())).or_default();
                *count += 1;
                if *count == 2 {
                    found.push(Duplicate {
                        kind,
                        scope: scope.map(str::to_string),
                        name: entry.name.clone(),
                    });
                }
            }
        }
        found
    }

    /// Subnet tier names of a VPC, in tier order
    pub fn subnet_tiers(&self, vpc: &str) -> &[String] {
        self.subnet_tiers
            .get(vpc)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// VPC name to subnet tier names
    pub fn subnet_tier_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.subnet_tiers
    }

    /// Subnets materialized by a tier
    pub fn tier_subnets(&self, vpc: &str, tier: &str) -> &[String] {
        self.tier_subnets
            .get(&(vpc.to_string(), tier.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Subnet names of a VPC
    pub fn subnets_for(&self, vpc: &str) -> Vec<&str> {
        self.names_in(ResourceKind::Subnet, vpc)
    }

    /// Security groups attached to a VPC
    pub fn security_groups_for(&self, vpc: &str) -> &[String] {
        self.security_groups
            .get(vpc)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
