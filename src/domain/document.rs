// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Document
//!
//! The root of a landing-zone topology. Every collection is an ordered list
//! of records keyed by `name`; array order is display order and is never
//! changed by a mutation that does not explicitly reorder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::classic::{ClassicGateway, ClassicVlan};
use super::compute::{Cluster, VirtualPrivateEndpoint, VsiDeployment, WorkerPool};
use super::connectivity::{Cis, Dns, TgwConnection, TransitGateway, VpnGateway, VpnServer};
use super::options::Options;
use super::power::PowerWorkspace;
use super::reference::Ref;
use super::security::{
    Atracker, ResourceGroup, SecretsManager, SecurityGroup, SecurityGroupRule, SshKey,
};
use super::storage::{Bucket, CosKey, KeyManagement, KmsKey, ObjectStorage};
use super::vpc::{AclRule, NetworkAcl, RuleDirection, RuleProtocol, Subnet, SubnetTier, Vpc};

/// Starting topology for a new document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Management and workload VPC pair with supporting services
    #[default]
    Default,
    /// Options only
    Empty,
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "empty" => Ok(Self::Empty),
            other => Err(format!("unknown template: {other}")),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Canonical configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "_options", default)]
    pub options: Options,
    #[serde(default)]
    pub resource_groups: Vec<ResourceGroup>,
    #[serde(default)]
    pub key_management: Vec<KeyManagement>,
    #[serde(default)]
    pub object_storage: Vec<ObjectStorage>,
    #[serde(default)]
    pub ssh_keys: Vec<SshKey>,
    #[serde(default)]
    pub vpcs: Vec<Vpc>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub vsi: Vec<VsiDeployment>,
    #[serde(default)]
    pub virtual_private_endpoints: Vec<VirtualPrivateEndpoint>,
    #[serde(default)]
    pub vpn_gateways: Vec<VpnGateway>,
    #[serde(default)]
    pub vpn_servers: Vec<VpnServer>,
    #[serde(default)]
    pub transit_gateways: Vec<TransitGateway>,
    #[serde(default)]
    pub dns: Vec<Dns>,
    #[serde(default)]
    pub cis: Vec<Cis>,
    #[serde(default)]
    pub power: Vec<PowerWorkspace>,
    #[serde(default)]
    pub secrets_manager: Vec<SecretsManager>,
    #[serde(default)]
    pub classic_vlans: Vec<ClassicVlan>,
    #[serde(default)]
    pub classic_gateways: Vec<ClassicGateway>,
    #[serde(default)]
    pub atracker: Atracker,
}

impl ConfigDocument {
    /// Build a document from a template
    pub fn from_template(template: Template) -> Self {
        match template {
            Template::Default => default_topology(),
            Template::Empty => Self::default(),
        }
    }

    pub fn vpc(&self, name: &str) -> Option<&Vpc> {
        self.vpcs.iter().find(|v| v.name == name)
    }

    pub fn vpc_mut(&mut self, name: &str) -> Option<&mut Vpc> {
        self.vpcs.iter_mut().find(|v| v.name == name)
    }

    pub fn vpc_index(&self, name: &str) -> Option<usize> {
        self.vpcs.iter().position(|v| v.name == name)
    }

    /// Rewrite every field that points back at an owning record
    pub fn sync_back_pointers(&mut self) {
        for vpc in &mut self.vpcs {
            for prefix in &mut vpc.address_prefixes {
                prefix.vpc.clone_from(&vpc.name);
            }
            for subnet in &mut vpc.subnets {
                subnet.vpc.clone_from(&vpc.name);
            }
            for acl in &mut vpc.acls {
                acl.vpc.clone_from(&vpc.name);
                for rule in &mut acl.rules {
                    rule.acl.clone_from(&acl.name);
                    rule.vpc.clone_from(&vpc.name);
                }
            }
        }

        for sg in &mut self.security_groups {
            for rule in &mut sg.rules {
                rule.sg.clone_from(&sg.name);
            }
        }

        for cluster in &mut self.clusters {
            for pool in &mut cluster.worker_pools {
                pool.cluster.clone_from(&cluster.name);
                pool.vpc.clone_from(&cluster.vpc);
            }
        }

        for tgw in &mut self.transit_gateways {
            for connection in &mut tgw.connections {
                connection.tgw.clone_from(&tgw.name);
            }
        }

        for dns in &mut self.dns {
            for zone in &mut dns.zones {
                zone.instance.clone_from(&dns.name);
            }
            for resolver in &mut dns.custom_resolvers {
                resolver.instance.clone_from(&dns.name);
            }
        }

        for cis in &mut self.cis {
            for domain in &mut cis.domains {
                domain.cis.clone_from(&cis.name);
            }
        }

        for workspace in &mut self.power {
            for network in &mut workspace.network {
                network.workspace.clone_from(&workspace.name);
            }
            for key in &mut workspace.ssh_keys {
                key.workspace.clone_from(&workspace.name);
            }
        }
    }

    /// Rebuild every tier's `subnets` list from subnet membership
    pub fn sync_tier_membership(&mut self) {
        for vpc in &mut self.vpcs {
            let Vpc {
                subnets,
                subnet_tiers,
                ..
            } = vpc;
            for tier in subnet_tiers.iter_mut() {
                tier.subnets = subnets
                    .iter()
                    .filter(|s| s.tier.as_deref() == Some(tier.name.as_str()))
                    .map(|s| s.name.clone())
                    .collect();
            }
        }
    }
}

fn rg(name: &str) -> Option<Ref<ResourceGroup>> {
    Some(Ref::new(name))
}

fn refs<T>(names: &[&str]) -> Vec<Ref<T>> {
    names.iter().map(|n| Ref::new(*n)).collect()
}

fn zone_subnets<T>(tier: &str, zones: u8) -> Vec<Ref<T>> {
    (1..=zones)
        .map(|z| Ref::new(format!("{tier}-zone-{z}")))
        .collect()
}

fn acl_rule(
    name: &str,
    direction: RuleDirection,
    source: &str,
    destination: &str,
) -> AclRule {
    AclRule {
        name: name.to_string(),
        direction,
        source: source.to_string(),
        destination: destination.to_string(),
        ..Default::default()
    }
}

fn sg_rule(
    name: &str,
    direction: RuleDirection,
    source: &str,
    protocol: RuleProtocol,
    port: Option<u16>,
) -> SecurityGroupRule {
    SecurityGroupRule {
        name: name.to_string(),
        direction,
        source: source.to_string(),
        protocol,
        port_min: port,
        port_max: port,
        ..Default::default()
    }
}

fn default_vpc(name: &str, tiers: &[(&str, u8)]) -> Vpc {
    let resource_group = rg(&format!("{name}-rg"));
    let acl = NetworkAcl {
        name: name.to_string(),
        resource_group: resource_group.clone(),
        add_cluster_rules: name == "workload",
        rules: vec![
            acl_rule(
                "allow-ibm-inbound",
                RuleDirection::Inbound,
                "161.26.0.0/16",
                "10.0.0.0/8",
            ),
            acl_rule(
                "allow-all-network-inbound",
                RuleDirection::Inbound,
                "10.0.0.0/8",
                "10.0.0.0/8",
            ),
            acl_rule(
                "allow-all-outbound",
                RuleDirection::Outbound,
                "0.0.0.0/0",
                "0.0.0.0/0",
            ),
        ],
        ..Default::default()
    };

    let mut subnets = Vec::new();
    let mut subnet_tiers = Vec::new();
    for (tier, zones) in tiers {
        for zone in 1..=*zones {
            subnets.push(Subnet {
                name: format!("{tier}-zone-{zone}"),
                zone,
                network_acl: Some(Ref::new(name)),
                resource_group: resource_group.clone(),
                tier: Some(tier.to_string()),
                ..Default::default()
            });
        }
        subnet_tiers.push(SubnetTier::fixed(*tier, *zones).with_network_acl(name));
    }

    Vpc {
        name: name.to_string(),
        resource_group,
        cos: Some(Ref::new("cos")),
        bucket: Some(Ref::new(format!("{name}-bucket"))),
        acls: vec![acl],
        subnets,
        subnet_tiers,
        ..Default::default()
    }
}

fn vpe_security_group(vpc: &str) -> SecurityGroup {
    SecurityGroup {
        name: format!("{vpc}-vpe"),
        vpc: Some(Ref::new(vpc)),
        resource_group: rg(&format!("{vpc}-rg")),
        rules: vec![
            sg_rule("allow-ibm-inbound", RuleDirection::Inbound, "161.26.0.0/16", RuleProtocol::All, None),
            sg_rule("allow-vpc-inbound", RuleDirection::Inbound, "10.0.0.0/8", RuleProtocol::All, None),
            sg_rule("allow-vpc-outbound", RuleDirection::Outbound, "10.0.0.0/8", RuleProtocol::All, None),
            sg_rule("allow-ibm-tcp-53-outbound", RuleDirection::Outbound, "161.26.0.0/16", RuleProtocol::Tcp, Some(53)),
            sg_rule("allow-ibm-tcp-80-outbound", RuleDirection::Outbound, "161.26.0.0/16", RuleProtocol::Tcp, Some(80)),
            sg_rule("allow-ibm-tcp-443-outbound", RuleDirection::Outbound, "161.26.0.0/16", RuleProtocol::Tcp, Some(443)),
        ],
    }
}

/// Public key shipped with the default template
pub const DEFAULT_PUBLIC_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQDDGe50Bxa5T5NDddrrtbx2Y4/VGbiCgXqnBsYToIUKoFSHTQl5IX3PasGnneKanhcLwWz5M5MoCRvhxTp66NKzIfAz7r+FX9rxgR+ZgcM253YAqOVeIpOU408simDZKriTlN8kYsXL7P34tsWuAJf4MgZtJAQxous/2byetpdCv8ddnT4X3ltOg9w+LqSCPYfNivqH00Eh7S1Ldz7I8aw5WOp5a+sQFP/RbwfpwHp+ny7DfeIOokcuI42tJkoBn7UsLTVpCSmXr2EDRlSWe/1M/iHNRBzaT3CK0+SwZWd2AEjePxSnWKNGIEUJDlUYp7hKhiQcgT5ZAnWU121oc5En test@fake.com";

fn default_topology() -> ConfigDocument {
    let mut doc = ConfigDocument {
        resource_groups: vec![
            ResourceGroup {
                name: "service-rg".into(),
                use_prefix: true,
                use_data: false,
            },
            ResourceGroup {
                name: "management-rg".into(),
                use_prefix: true,
                use_data: false,
            },
            ResourceGroup {
                name: "workload-rg".into(),
                use_prefix: true,
                use_data: false,
            },
        ],
        key_management: vec![KeyManagement {
            name: "kms".into(),
            resource_group: rg("service-rg"),
            authorize_vpc_reader_role: true,
            keys: vec![
                KmsKey::root("key"),
                KmsKey::root("atracker-key"),
                KmsKey::root("vsi-volume-key"),
            ],
            ..Default::default()
        }],
        object_storage: vec![
            ObjectStorage {
                name: "atracker-cos".into(),
                resource_group: rg("service-rg"),
                kms: Some(Ref::new("kms")),
                buckets: vec![Bucket::new("atracker-bucket").encrypted_with("atracker-key")],
                keys: vec![CosKey {
                    name: "cos-bind-key".into(),
                    enable_hmac: false,
                    role: Some("Writer".into()),
                }],
                ..Default::default()
            },
            ObjectStorage {
                name: "cos".into(),
                resource_group: rg("service-rg"),
                kms: Some(Ref::new("kms")),
                buckets: vec![
                    Bucket::new("management-bucket").encrypted_with("key"),
                    Bucket::new("workload-bucket").encrypted_with("key"),
                ],
                ..Default::default()
            },
        ],
        ssh_keys: vec![SshKey {
            name: "ssh-key".into(),
            resource_group: rg("management-rg"),
            public_key: Some(DEFAULT_PUBLIC_KEY.into()),
            use_data: false,
        }],
        vpcs: vec![
            default_vpc("management", &[("vsi", 3), ("vpe", 3), ("vpn", 1)]),
            default_vpc("workload", &[("vsi", 3), ("vpe", 3)]),
        ],
        security_groups: vec![
            vpe_security_group("management"),
            vpe_security_group("workload"),
            SecurityGroup {
                name: "management-vsi".into(),
                vpc: Some(Ref::new("management")),
                resource_group: rg("management-rg"),
                rules: vec![
                    sg_rule("allow-ibm-inbound", RuleDirection::Inbound, "161.26.0.0/16", RuleProtocol::All, None),
                    sg_rule("allow-vpc-inbound", RuleDirection::Inbound, "10.0.0.0/8", RuleProtocol::All, None),
                    sg_rule("allow-vpc-outbound", RuleDirection::Outbound, "10.0.0.0/8", RuleProtocol::All, None),
                ],
            },
        ],
        clusters: vec![Cluster {
            name: "workload-cluster".into(),
            resource_group: rg("workload-rg"),
            vpc: Some(Ref::new("workload")),
            subnets: zone_subnets("vsi", 3),
            cos: Some(Ref::new("cos")),
            kms: Some(Ref::new("kms")),
            encryption_key: Some(Ref::new("key")),
            workers_per_subnet: 2,
            flavor: Some("bx2.16x64".into()),
            kube_version: Some("default".into()),
            worker_pools: vec![WorkerPool {
                name: "logging-worker-pool".into(),
                subnets: zone_subnets("vsi", 3),
                workers_per_subnet: 2,
                flavor: Some("bx2.16x64".into()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        vsi: vec![VsiDeployment {
            name: "management-server".into(),
            resource_group: rg("management-rg"),
            vpc: Some(Ref::new("management")),
            subnets: zone_subnets("vsi", 3),
            security_groups: refs(&["management-vsi"]),
            ssh_keys: refs(&["ssh-key"]),
            kms: Some(Ref::new("kms")),
            encryption_key: Some(Ref::new("vsi-volume-key")),
            vsi_per_subnet: 2,
            image: Some("ibm-ubuntu-22-04-1-minimal-amd64-1".into()),
            profile: Some("cx2-4x8".into()),
        }],
        virtual_private_endpoints: ["management", "workload"]
            .iter()
            .map(|vpc| VirtualPrivateEndpoint {
                name: format!("{vpc}-cos"),
                service: Some("cos".into()),
                instance: Some(Ref::new("cos")),
                resource_group: rg(&format!("{vpc}-rg")),
                vpc: Some(Ref::new(*vpc)),
                subnets: zone_subnets("vpe", 3),
                security_groups: vec![Ref::new(format!("{vpc}-vpe"))],
            })
            .collect(),
        vpn_gateways: vec![VpnGateway {
            name: "management-gateway".into(),
            resource_group: rg("management-rg"),
            vpc: Some(Ref::new("management")),
            subnet: Some(Ref::new("vpn-zone-1")),
            connections: Vec::new(),
        }],
        transit_gateways: vec![TransitGateway {
            name: "transit-gateway".into(),
            resource_group: rg("service-rg"),
            global: false,
            connections: vec![
                TgwConnection::to_vpc("management"),
                TgwConnection::to_vpc("workload"),
            ],
        }],
        atracker: Atracker {
            enabled: true,
            target_name: Some("atracker-cos".into()),
            bucket: Some(Ref::new("atracker-bucket")),
            cos_key: Some(Ref::new("cos-bind-key")),
            add_route: true,
            ..Default::default()
        },
        ..Default::default()
    };
    doc.sync_back_pointers();
    doc.sync_tier_membership();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topology_shape() {
        let doc = ConfigDocument::from_template(Template::Default);
        let names: Vec<_> = doc.vpcs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["management", "workload"]);

        let management = doc.vpc("management").unwrap();
        assert_eq!(management.subnets.len(), 7);
        assert_eq!(
            management.tier("vpn").unwrap().subnets,
            vec!["vpn-zone-1".to_string()]
        );
        assert!(management.subnets.iter().all(|s| s.vpc == "management"));
        assert_eq!(doc.transit_gateways[0].connections[1].tgw, "transit-gateway");
    }

    #[test]
    fn test_empty_template() {
        let doc = ConfigDocument::from_template(Template::Empty);
        assert!(doc.vpcs.is_empty());
        assert_eq!(doc.options.prefix, "iac");
    }

    #[test]
    fn test_missing_collections_default_on_import() {
        let doc: ConfigDocument = serde_json::from_str(r#"{"vpcs": []}"#).unwrap();
        assert_eq!(doc.options.region, "us-south");
        assert!(doc.resource_groups.is_empty());
    }

    #[test]
    fn test_template_parsing() {
        assert_eq!("EMPTY".parse::<Template>().unwrap(), Template::Empty);
        assert!("other".parse::<Template>().is_err());
    }
}
