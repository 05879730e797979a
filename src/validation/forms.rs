// Copyright (c) 2025 - Cowboy AI, Inc.
//! Forms for every editable record

use super::rules;
use super::{Field, Form, ValidationContext};
use crate::domain::{
    AclRule, AddressPrefix, Atracker, Bucket, Cis, CisDomain, ClassicGateway, ClassicVlan, Cluster,
    ClusterKind, CosKey, CustomResolver, Dns, DnsRecord, DnsZone, KeyManagement, KmsKey,
    Nameable, NetworkAcl, ObjectStorage, Options, PowerNetwork, PowerSshKey, PowerWorkspace, Ref,
    Resource, ResourceGroup, ResourceKind, SecretsManager, SecurityGroup, SecurityGroupRule,
    SshKey, Subnet, SubnetTier, TierShape, TransitGateway, VirtualPrivateEndpoint, Vpc,
    VpnGateway, VpnServer, VsiDeployment, WorkerPool, MAX_ZONES,
};

const ENDPOINTS: [&str; 3] = ["private", "public", "public-and-private"];
const DNS_RECORD_TYPES: [&str; 7] = ["A", "AAAA", "CNAME", "MX", "PTR", "SRV", "TXT"];
const POWER_NETWORK_TYPES: [&str; 2] = ["vlan", "pub-vlan"];
const VPN_SERVER_PROTOCOLS: [&str; 2] = ["udp", "tcp"];
const MAX_VSI_PER_SUBNET: u32 = 10;
const MAX_WORKERS_PER_SUBNET: u32 = 100;
const WORKERS_RANGE_TEXT: &str = "Workers per subnet must be between 1 and 100";
const MAX_RESOLVER_SUBNETS: usize = 3;

fn name_of<T>(reference: &Option<Ref<T>>) -> Option<&str> {
    reference.as_ref().map(Ref::as_str)
}

/// Name field checked against the pattern and the kind's uniqueness scope
fn name_field<T: Nameable + 'static>(kind: ResourceKind) -> Field<T> {
    Field::new("name")
        .invalid(move |c: &T, ctx| rules::invalid_name(kind, c.name(), ctx))
        .invalid_text(move |c: &T, ctx| rules::invalid_name_text(kind, c.name(), ctx))
}

fn resource_name<T: Resource + 'static>() -> Field<T> {
    name_field(T::KIND)
}

/// Domain-style name (DNS zones, CIS domains)
fn domain_name_field<T: Nameable + 'static>(kind: ResourceKind) -> Field<T> {
    Field::new("name")
        .invalid(move |c: &T, ctx| {
            rules::invalid_domain(c.name()) || rules::is_duplicate(kind, c.name(), ctx)
        })
        .invalid_text(move |c: &T, ctx| {
            if rules::is_duplicate(kind, c.name(), ctx) {
                rules::duplicate_text(c.name())
            } else {
                "Enter a valid domain name".to_string()
            }
        })
}

/// Select that must name an existing record
fn select<T: 'static>(
    name: &'static str,
    kind: ResourceKind,
    get: impl Fn(&T) -> Option<&str> + 'static,
) -> Field<T> {
    Field::new(name).invalid(move |c: &T, ctx| rules::unresolved(kind, None, get(c), ctx))
}

fn resource_group<T: 'static>(get: impl Fn(&T) -> Option<&str> + 'static) -> Field<T> {
    select("resource_group", ResourceKind::ResourceGroup, get).text("Select a resource group")
}

fn vpc<T: 'static>(get: impl Fn(&T) -> Option<&str> + 'static) -> Field<T> {
    select("vpc", ResourceKind::Vpc, get).text("Select a VPC")
}

fn encryption_key<T: 'static>(get: impl Fn(&T) -> Option<&str> + 'static) -> Field<T> {
    select("encryption_key", ResourceKind::KmsKey, get).text("Select an encryption key")
}

/// Check that a subnet list is non-empty and every entry lives in `vpc`
fn unresolved_subnets(vpc: Option<&str>, subnets: &[Ref<Subnet>], ctx: &ValidationContext<'_>) -> bool {
    subnets.is_empty()
        || subnets
            .iter()
            .any(|s| !ctx.registry.resolves(ResourceKind::Subnet, vpc, s.as_str()))
}

fn unresolved_all<T>(kind: ResourceKind, refs: &[Ref<T>], ctx: &ValidationContext<'_>) -> bool {
    refs.is_empty()
        || refs
            .iter()
            .any(|r| !ctx.registry.resolves(kind, None, r.as_str()))
}

fn invalid_zone(zone: u8, ctx: &ValidationContext<'_>) -> bool {
    zone == 0 || zone > ctx.options().zones
}

impl Form for Options {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("prefix")
                .invalid(|o, _| rules::invalid_prefix(&o.prefix))
                .text("A unique prefix of 16 or fewer characters that begins with a letter and ends with a letter or number"),
            Field::<Self>::new("region")
                .invalid(|o, _| o.region.trim().is_empty())
                .text("Select a region"),
            Field::<Self>::new("tags")
                .invalid(|o, _| o.tags.iter().any(|t| rules::invalid_tag(t)))
                .invalid_text(|o, _| {
                    let bad: Vec<&str> = o
                        .tags
                        .iter()
                        .filter(|t| rules::invalid_tag(t))
                        .map(String::as_str)
                        .collect();
                    format!("Invalid tags: {}", bad.join(", "))
                }),
            Field::<Self>::new("zones")
                .invalid(|o, _| o.zones == 0 || o.zones > MAX_ZONES)
                .text("Select between 1 and 3 zones"),
            Field::<Self>::new("endpoints")
                .invalid(|o, _| !ENDPOINTS.contains(&o.endpoints.as_str()))
                .text("Select an endpoint type"),
            Field::<Self>::new("account_id")
                .invalid(|o, _| o.fs_cloud && rules::is_blank(o.account_id.as_deref()))
                .text("An account ID is required for FS Cloud")
                .hide_when(|o, _| !o.fs_cloud),
            Field::<Self>::new("power_vs_zones")
                .invalid(|o, _| o.enable_power_vs && o.power_vs_zones.is_empty())
                .text("Select at least one Power VS zone")
                .hide_when(|o, _| !o.enable_power_vs),
            Field::<Self>::new("edge_vpc_name")
                .invalid(|o, ctx| {
                    o.edge_vpc_name
                        .as_ref()
                        .is_some_and(|v| !ctx.registry.contains(ResourceKind::Vpc, None, v.as_str()))
                })
                .text("Select an existing VPC"),
        ]
    }
}

impl Form for ResourceGroup {
    fn fields() -> Vec<Field<Self>> {
        vec![resource_name()]
    }
}

fn duplicate_public_key(key: &SshKey, ctx: &ValidationContext<'_>) -> bool {
    let Some(public_key) = key.public_key.as_deref() else {
        return false;
    };
    ctx.document
        .ssh_keys
        .iter()
        .filter(|other| !ctx.is_original(&other.name))
        .any(|other| other.public_key.as_deref() == Some(public_key))
}

impl Form for SshKey {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|k: &Self| name_of(&k.resource_group)),
            Field::<Self>::new("public_key")
                .invalid(|k, ctx| {
                    !k.use_data
                        && (rules::invalid_public_key(k.public_key.as_deref())
                            || duplicate_public_key(k, ctx))
                })
                .invalid_text(|k, ctx| {
                    if duplicate_public_key(k, ctx) {
                        "SSH Public Key in use".to_string()
                    } else {
                        "Provide a valid SSH public key".to_string()
                    }
                })
                .hide_when(|k, _| k.use_data),
        ]
    }
}

impl Form for KeyManagement {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|k: &Self| name_of(&k.resource_group)),
        ]
    }
}

impl Form for KmsKey {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("key_ring")
                .invalid(|k, _| rules::invalid_optional_name(k.key_ring.as_deref()))
                .text(rules::NAME_PATTERN_TEXT),
            Field::<Self>::new("rotation")
                .invalid(|k, _| !(1..=12).contains(&k.rotation))
                .text("Rotation interval must be between 1 and 12 months"),
        ]
    }
}

impl Form for ObjectStorage {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|c: &Self| name_of(&c.resource_group)),
            select("kms", ResourceKind::KeyManagement, |c: &Self| name_of(&c.kms))
                .text("Select a key management instance"),
            Field::<Self>::new("plan")
                .invalid(|c, _| c.plan.trim().is_empty())
                .text("Select a plan")
                .hide_when(|c, _| c.use_data),
        ]
    }
}

impl Form for Bucket {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            encryption_key(|b: &Self| name_of(&b.kms_key)),
            Field::<Self>::new("storage_class")
                .invalid(|b, _| b.storage_class.trim().is_empty())
                .text("Select a storage class"),
        ]
    }
}

impl Form for CosKey {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("role")
                .invalid(|k, _| rules::is_blank(k.role.as_deref()))
                .text("Select a role"),
        ]
    }
}

impl Form for SecretsManager {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|s: &Self| name_of(&s.resource_group)),
            encryption_key(|s: &Self| name_of(&s.encryption_key)),
        ]
    }
}

fn default_name_field(
    name: &'static str,
    get: fn(&Vpc) -> Option<&str>,
) -> Field<Vpc> {
    Field::new(name)
        .invalid(move |v: &Vpc, _| rules::invalid_optional_name(get(v)))
        .text(rules::NAME_PATTERN_TEXT)
}

impl Form for Vpc {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|v: &Self| name_of(&v.resource_group)),
            Field::<Self>::new("bucket")
                .invalid(|v, ctx| {
                    !v.use_data && rules::unresolved(ResourceKind::Bucket, None, name_of(&v.bucket), ctx)
                })
                .text("Select a bucket")
                .hide_when(|v, _| v.use_data),
            default_name_field("default_network_acl_name", |v| v.default_network_acl_name.as_deref()),
            default_name_field("default_routing_table_name", |v| {
                v.default_routing_table_name.as_deref()
            }),
            default_name_field("default_security_group_name", |v| {
                v.default_security_group_name.as_deref()
            }),
        ]
    }
}

impl Form for AddressPrefix {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("zone")
                .invalid(|p, ctx| invalid_zone(p.zone, ctx))
                .text("Select a zone"),
            Field::<Self>::new("cidr")
                .invalid(|p, ctx| match p.cidr {
                    None => true,
                    Some(cidr) => ctx.parent_vpc().is_some_and(|vpc| {
                        vpc.address_prefixes.iter().any(|other| {
                            !ctx.is_original(&other.name)
                                && other.cidr.is_some_and(|c| c.overlaps(&cidr))
                        })
                    }),
                })
                .invalid_text(|p, _| match p.cidr {
                    None => "Enter a valid CIDR block".to_string(),
                    Some(cidr) => format!("{cidr} overlaps an existing address prefix"),
                }),
        ]
    }
}

impl Form for NetworkAcl {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|a: &Self| name_of(&a.resource_group)),
        ]
    }
}

macro_rules! rule_fields {
    ($ty:ty) => {
        vec![
            Field::<$ty>::new("source")
                .invalid(|r, _| rules::invalid_ip_or_cidr(&r.source))
                .text("Enter a valid IP address or CIDR block"),
            Field::<$ty>::new("port_min")
                .invalid(|r, _| rules::invalid_port_range(r.port_min, r.port_max))
                .text("Enter a port range between 1 and 65535")
                .hide_when(|r, _| !r.protocol.has_ports()),
            Field::<$ty>::new("port_max")
                .invalid(|r, _| rules::invalid_port_range(r.port_min, r.port_max))
                .text("Enter a port range between 1 and 65535")
                .hide_when(|r, _| !r.protocol.has_ports()),
        ]
    };
}

impl Form for AclRule {
    fn fields() -> Vec<Field<Self>> {
        let mut fields = vec![
            resource_name(),
            Field::<Self>::new("destination")
                .invalid(|r, _| rules::invalid_ip_or_cidr(&r.destination))
                .text("Enter a valid IP address or CIDR block"),
        ];
        fields.extend(rule_fields!(Self));
        fields
    }
}

impl Form for SecurityGroup {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            vpc(|s: &Self| name_of(&s.vpc)),
            resource_group(|s: &Self| name_of(&s.resource_group)),
        ]
    }
}

impl Form for SecurityGroupRule {
    fn fields() -> Vec<Field<Self>> {
        let mut fields = vec![resource_name()];
        fields.extend(rule_fields!(Self));
        fields
    }
}

impl Form for Cluster {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|c: &Self| name_of(&c.resource_group)),
            vpc(|c: &Self| name_of(&c.vpc)),
            Field::<Self>::new("subnets")
                .invalid(|c, ctx| unresolved_subnets(name_of(&c.vpc), &c.subnets, ctx))
                .text("Select at least one subnet")
                .disabled(|c, _| c.vpc.is_none()),
            select("cos", ResourceKind::ObjectStorage, |c: &Self| name_of(&c.cos))
                .text("Select an object storage instance")
                .hide_when(|c, _| c.kind != ClusterKind::Openshift),
            encryption_key(|c: &Self| name_of(&c.encryption_key)),
            Field::<Self>::new("workers_per_subnet")
                .invalid(|c, _| {
                    !(1..=MAX_WORKERS_PER_SUBNET).contains(&c.workers_per_subnet)
                        || (c.kind == ClusterKind::Openshift
                            && (c.workers_per_subnet as usize) * c.subnets.len() < 2)
                })
                .invalid_text(|c, _| {
                    if (1..=MAX_WORKERS_PER_SUBNET).contains(&c.workers_per_subnet) {
                        "OpenShift clusters require at least 2 worker nodes".to_string()
                    } else {
                        WORKERS_RANGE_TEXT.to_string()
                    }
                }),
            Field::<Self>::new("flavor")
                .invalid(|c, _| rules::is_blank(c.flavor.as_deref()))
                .text("Select a flavor"),
            Field::<Self>::new("kube_version")
                .invalid(|c, _| rules::is_blank(c.kube_version.as_deref()))
                .text("Select a version"),
        ]
    }
}

/// VPC of the cluster a worker pool is placed under
fn pool_vpc<'a>(pool: &'a WorkerPool, ctx: &ValidationContext<'a>) -> Option<&'a str> {
    name_of(&pool.vpc).or_else(|| {
        let cluster = ctx.parents.first()?;
        ctx.document
            .clusters
            .iter()
            .find(|c| &c.name == cluster)
            .and_then(|c| name_of(&c.vpc))
    })
}

impl Form for WorkerPool {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("subnets")
                .invalid(|p, ctx| unresolved_subnets(pool_vpc(p, ctx), &p.subnets, ctx))
                .text("Select at least one subnet"),
            Field::<Self>::new("workers_per_subnet")
                .invalid(|p, _| !(1..=MAX_WORKERS_PER_SUBNET).contains(&p.workers_per_subnet))
                .text(WORKERS_RANGE_TEXT),
            Field::<Self>::new("flavor")
                .invalid(|p, _| rules::is_blank(p.flavor.as_deref()))
                .text("Select a flavor"),
        ]
    }
}

impl Form for VsiDeployment {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|v: &Self| name_of(&v.resource_group)),
            vpc(|v: &Self| name_of(&v.vpc)),
            Field::<Self>::new("subnets")
                .invalid(|v, ctx| unresolved_subnets(name_of(&v.vpc), &v.subnets, ctx))
                .text("Select at least one subnet")
                .disabled(|v, _| v.vpc.is_none()),
            Field::<Self>::new("security_groups")
                .invalid(|v, ctx| unresolved_all(ResourceKind::SecurityGroup, &v.security_groups, ctx))
                .text("Select at least one security group")
                .disabled(|v, _| v.vpc.is_none()),
            Field::<Self>::new("ssh_keys")
                .invalid(|v, ctx| unresolved_all(ResourceKind::SshKey, &v.ssh_keys, ctx))
                .text("Select at least one SSH key"),
            encryption_key(|v: &Self| name_of(&v.encryption_key)),
            Field::<Self>::new("vsi_per_subnet")
                .invalid(|v, _| !(1..=MAX_VSI_PER_SUBNET).contains(&v.vsi_per_subnet))
                .text("Instances per subnet must be between 1 and 10"),
            Field::<Self>::new("image")
                .invalid(|v, _| rules::is_blank(v.image.as_deref()))
                .text("Select an image"),
            Field::<Self>::new("profile")
                .invalid(|v, _| rules::is_blank(v.profile.as_deref()))
                .text("Select a profile"),
        ]
    }
}

fn is_cos_endpoint(vpe: &VirtualPrivateEndpoint) -> bool {
    vpe.service.as_deref() == Some("cos")
}

impl Form for VirtualPrivateEndpoint {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("service")
                .invalid(|v, _| rules::is_blank(v.service.as_deref()))
                .text("Select a service"),
            select("instance", ResourceKind::ObjectStorage, |v: &Self| name_of(&v.instance))
                .text("Select an object storage instance")
                .hide_when(|v, _| !is_cos_endpoint(v)),
            vpc(|v: &Self| name_of(&v.vpc)),
            Field::<Self>::new("subnets")
                .invalid(|v, ctx| unresolved_subnets(name_of(&v.vpc), &v.subnets, ctx))
                .text("Select at least one subnet")
                .disabled(|v, _| v.vpc.is_none()),
            Field::<Self>::new("security_groups")
                .invalid(|v, ctx| unresolved_all(ResourceKind::SecurityGroup, &v.security_groups, ctx))
                .text("Select at least one security group")
                .disabled(|v, _| v.vpc.is_none()),
        ]
    }
}

impl Form for VpnGateway {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|g: &Self| name_of(&g.resource_group)),
            vpc(|g: &Self| name_of(&g.vpc)),
            Field::<Self>::new("subnet")
                .invalid(|g, ctx| {
                    rules::unresolved(ResourceKind::Subnet, name_of(&g.vpc), name_of(&g.subnet), ctx)
                })
                .text("Select a subnet")
                .disabled(|g, _| g.vpc.is_none()),
        ]
    }
}

impl Form for VpnServer {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|s: &Self| name_of(&s.resource_group)),
            vpc(|s: &Self| name_of(&s.vpc)),
            Field::<Self>::new("subnets")
                .invalid(|s, ctx| unresolved_subnets(name_of(&s.vpc), &s.subnets, ctx))
                .text("Select at least one subnet")
                .disabled(|s, _| s.vpc.is_none()),
            Field::<Self>::new("security_groups")
                .invalid(|s, ctx| unresolved_all(ResourceKind::SecurityGroup, &s.security_groups, ctx))
                .text("Select at least one security group")
                .disabled(|s, _| s.vpc.is_none()),
            Field::<Self>::new("client_ip_pool")
                .invalid(|s, _| rules::invalid_cidr(s.client_ip_pool.as_deref()))
                .text("Enter a valid CIDR block"),
            Field::<Self>::new("port")
                .invalid(|s, _| !matches!(s.port, Some(p) if p > 0))
                .text("Enter a port between 1 and 65535"),
            Field::<Self>::new("protocol")
                .invalid(|s, _| {
                    !s.protocol
                        .as_deref()
                        .is_some_and(|p| VPN_SERVER_PROTOCOLS.contains(&p))
                })
                .text("Select a protocol"),
        ]
    }
}

impl Form for TransitGateway {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|t: &Self| name_of(&t.resource_group)),
            Field::<Self>::new("connections")
                .invalid(|t, _| t.connections.is_empty())
                .text("Select at least one VPC or Power VS workspace"),
        ]
    }
}

impl Form for Dns {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|d: &Self| name_of(&d.resource_group)),
            Field::<Self>::new("plan")
                .invalid(|d, _| d.plan.trim().is_empty())
                .text("Select a plan"),
        ]
    }
}

impl Form for DnsZone {
    fn fields() -> Vec<Field<Self>> {
        vec![
            domain_name_field(ResourceKind::DnsZone),
            Field::<Self>::new("permitted_networks")
                .invalid(|z, ctx| unresolved_all(ResourceKind::Vpc, &z.permitted_networks, ctx))
                .text("Select at least one permitted network"),
        ]
    }
}

impl Form for DnsRecord {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("dns_zone")
                .invalid(|r, ctx| {
                    let instance = ctx.parents.first().map(String::as_str);
                    rules::unresolved(ResourceKind::DnsZone, instance, name_of(&r.dns_zone), ctx)
                })
                .text("Select a DNS zone"),
            Field::<Self>::new("type")
                .invalid(|r, _| {
                    !r.record_type
                        .as_deref()
                        .is_some_and(|t| DNS_RECORD_TYPES.contains(&t))
                })
                .text("Select a record type"),
            Field::<Self>::new("rdata")
                .invalid(|r, _| rules::is_blank(r.rdata.as_deref()))
                .text("Enter record data"),
            Field::<Self>::new("ttl")
                .invalid(|r, _| r.ttl == 0)
                .text("Time to live must be greater than zero"),
        ]
    }
}

impl Form for CustomResolver {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            vpc(|r: &Self| name_of(&r.vpc)),
            Field::<Self>::new("subnets")
                .invalid(|r, ctx| {
                    r.subnets.len() > MAX_RESOLVER_SUBNETS
                        || unresolved_subnets(name_of(&r.vpc), &r.subnets, ctx)
                })
                .text("Select between 1 and 3 subnets")
                .disabled(|r, _| r.vpc.is_none()),
        ]
    }
}

impl Form for Cis {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|c: &Self| name_of(&c.resource_group)),
            Field::<Self>::new("plan")
                .invalid(|c, _| rules::is_blank(c.plan.as_deref()))
                .text("Select a plan"),
        ]
    }
}

impl Form for CisDomain {
    fn fields() -> Vec<Field<Self>> {
        vec![
            domain_name_field(ResourceKind::CisDomain),
            Field::<Self>::new("type")
                .invalid(|d, _| rules::is_blank(d.domain_type.as_deref()))
                .text("Select a domain type"),
        ]
    }
}

impl Form for PowerWorkspace {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            resource_group(|w: &Self| name_of(&w.resource_group)),
            Field::<Self>::new("zone")
                .invalid(|w, ctx| match w.zone.as_deref() {
                    None | Some("") => true,
                    Some(zone) => {
                        let zones = &ctx.options().power_vs_zones;
                        !zones.is_empty() && !zones.iter().any(|z| z == zone)
                    }
                })
                .text("Select a Power VS zone"),
        ]
    }
}

impl Form for PowerNetwork {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("pi_network_type")
                .invalid(|n, _| {
                    !n.pi_network_type
                        .as_deref()
                        .is_some_and(|t| POWER_NETWORK_TYPES.contains(&t))
                })
                .text("Select a network type"),
            Field::<Self>::new("pi_cidr")
                .invalid(|n, _| rules::invalid_cidr(n.pi_cidr.as_deref()))
                .text("Enter a valid CIDR block"),
            Field::<Self>::new("pi_dns")
                .invalid(|n, _| {
                    n.pi_dns
                        .iter()
                        .any(|ip| ip.parse::<std::net::Ipv4Addr>().is_err())
                })
                .text("Enter valid DNS server addresses"),
        ]
    }
}

impl Form for PowerSshKey {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("public_key")
                .invalid(|k, _| rules::invalid_public_key(k.public_key.as_deref()))
                .text("Provide a valid SSH public key"),
        ]
    }
}

impl Form for ClassicVlan {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("datacenter")
                .invalid(|v, _| rules::is_blank(v.datacenter.as_deref()))
                .text("Select a datacenter"),
        ]
    }
}

impl Form for ClassicGateway {
    fn fields() -> Vec<Field<Self>> {
        vec![
            resource_name(),
            Field::<Self>::new("datacenter")
                .invalid(|g, _| rules::is_blank(g.datacenter.as_deref()))
                .text("Select a datacenter"),
            Field::<Self>::new("domain")
                .invalid(|g, _| !g.domain.as_deref().is_some_and(|d| !rules::invalid_domain(d)))
                .text("Enter a valid domain name"),
            Field::<Self>::new("public_bandwidth")
                .invalid(|g, _| !g.private_network_only && !matches!(g.public_bandwidth, Some(b) if b > 0))
                .text("Select a public bandwidth")
                .hide_when(|g, _| g.private_network_only),
            select("private_vlan", ResourceKind::ClassicVlan, |g: &Self| name_of(&g.private_vlan))
                .text("Select a private VLAN"),
            Field::<Self>::new("public_vlan")
                .invalid(|g, ctx| {
                    !g.private_network_only
                        && rules::unresolved(ResourceKind::ClassicVlan, None, name_of(&g.public_vlan), ctx)
                })
                .text("Select a public VLAN")
                .hide_when(|g, _| g.private_network_only),
        ]
    }
}

impl Form for SubnetTier {
    fn fields() -> Vec<Field<Self>> {
        vec![
            name_field(ResourceKind::SubnetTier),
            Field::<Self>::new("zones")
                .invalid(|t, ctx| match t.shape {
                    TierShape::Fixed { zones } => invalid_zone(zones, ctx),
                    TierShape::Advanced { .. } => false,
                })
                .invalid_text(|_, ctx| format!("Select between 1 and {} zones", ctx.options().zones))
                .hide_when(|t, _| t.is_advanced()),
            Field::<Self>::new("select_zones")
                .invalid(|t, ctx| match &t.shape {
                    TierShape::Advanced { select_zones } => {
                        select_zones.is_empty() || select_zones.iter().any(|z| invalid_zone(*z, ctx))
                    }
                    TierShape::Fixed { .. } => false,
                })
                .text("Select at least one available zone")
                .hide_when(|t, _| !t.is_advanced()),
            Field::<Self>::new("networkAcl")
                .invalid(|t, ctx| {
                    t.network_acl.as_ref().is_some_and(|acl| {
                        let vpc = ctx.parents.first().map(String::as_str);
                        !ctx.registry.resolves(ResourceKind::NetworkAcl, vpc, acl.as_str())
                    })
                })
                .text("Select a network ACL from this VPC"),
        ]
    }
}

impl Form for Subnet {
    fn fields() -> Vec<Field<Self>> {
        vec![
            name_field(ResourceKind::Subnet),
            Field::<Self>::new("cidr")
                .invalid(|s, ctx| {
                    if ctx.options().dynamic_subnets {
                        return false;
                    }
                    match (s.cidr, ctx.parent_vpc()) {
                        (None, _) => true,
                        (Some(cidr), Some(vpc)) => {
                            let own = ctx.original_name.as_deref().unwrap_or(&s.name);
                            rules::overlapping_subnet(&vpc.subnets, own, &cidr).is_some()
                        }
                        (Some(_), None) => false,
                    }
                })
                .invalid_text(|s, ctx| {
                    let overlap = s.cidr.zip(ctx.parent_vpc()).and_then(|(cidr, vpc)| {
                        let own = ctx.original_name.as_deref().unwrap_or(&s.name);
                        rules::overlapping_subnet(&vpc.subnets, own, &cidr)
                    });
                    match overlap {
                        Some(other) => format!("Warning: CIDR overlaps with {}", other.name),
                        None => "Enter a valid CIDR block".to_string(),
                    }
                })
                .disabled(|_, ctx| ctx.options().dynamic_subnets),
            Field::<Self>::new("network_acl")
                .invalid(|s, ctx| {
                    let vpc = ctx.parents.first().map(String::as_str);
                    rules::unresolved(ResourceKind::NetworkAcl, vpc, name_of(&s.network_acl), ctx)
                })
                .text("Select a network ACL"),
            Field::<Self>::new("public_gateway")
                .disabled(|s, ctx| !ctx.parent_vpc().is_some_and(|vpc| vpc.has_public_gateway(s.zone))),
        ]
    }
}

impl Form for Atracker {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::<Self>::new("name")
                .invalid(|a, _| !crate::domain::is_valid_name(&a.name))
                .text(rules::NAME_PATTERN_TEXT),
            Field::<Self>::new("bucket")
                .invalid(|a, ctx| {
                    a.enabled && rules::unresolved(ResourceKind::Bucket, None, name_of(&a.bucket), ctx)
                })
                .text("Select a bucket"),
            Field::<Self>::new("cos_key")
                .invalid(|a, ctx| {
                    a.enabled && rules::unresolved(ResourceKind::CosKey, None, name_of(&a.cos_key), ctx)
                })
                .text("Select an object storage key"),
            Field::<Self>::new("locations")
                .invalid(|a, _| a.enabled && a.locations.is_empty())
                .text("Select at least one location"),
            Field::<Self>::new("plan")
                .invalid(|a, _| a.instance && rules::is_blank(a.plan.as_deref()))
                .text("Select a plan")
                .hide_when(|a, _| !a.instance),
            Field::<Self>::new("resource_group")
                .invalid(|a, ctx| {
                    a.instance
                        && rules::unresolved(
                            ResourceKind::ResourceGroup,
                            None,
                            name_of(&a.resource_group),
                            ctx,
                        )
                })
                .text("Select a resource group")
                .hide_when(|a, _| !a.instance),
        ]
    }
}
