// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute records: clusters, worker pools, VSI deployments and endpoints

use serde::{Deserialize, Serialize};

use super::reference::Ref;
use super::security::{ResourceGroup, SecurityGroup, SshKey};
use super::storage::{KeyManagement, KmsKey, ObjectStorage};
use super::vpc::{Subnet, Vpc};

fn default_workers() -> u32 {
    2
}

fn default_vsi_per_subnet() -> u32 {
    1
}

/// Kubernetes flavour of a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKind {
    #[default]
    Openshift,
    Iks,
}

/// Kubernetes or OpenShift cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub kind: ClusterKind,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnets: Vec<Ref<Subnet>>,
    #[serde(default)]
    pub cos: Option<Ref<ObjectStorage>>,
    #[serde(default)]
    pub kms: Option<Ref<KeyManagement>>,
    #[serde(default)]
    pub encryption_key: Option<Ref<KmsKey>>,
    #[serde(default = "default_workers")]
    pub workers_per_subnet: u32,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub kube_version: Option<String>,
    #[serde(default)]
    pub worker_pools: Vec<WorkerPool>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ClusterKind::default(),
            resource_group: None,
            vpc: None,
            subnets: Vec::new(),
            cos: None,
            kms: None,
            encryption_key: None,
            workers_per_subnet: default_workers(),
            flavor: None,
            kube_version: None,
            worker_pools: Vec::new(),
        }
    }
}

/// Additional worker pool of a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerPool {
    pub name: String,
    /// Owning cluster, maintained by the store
    #[serde(default)]
    pub cluster: String,
    /// VPC of the owning cluster, maintained by the store
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnets: Vec<Ref<Subnet>>,
    #[serde(default = "default_workers")]
    pub workers_per_subnet: u32,
    #[serde(default)]
    pub flavor: Option<String>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            name: String::new(),
            cluster: String::new(),
            vpc: None,
            subnets: Vec::new(),
            workers_per_subnet: default_workers(),
            flavor: None,
        }
    }
}

/// Deployment of identical virtual server instances across subnets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsiDeployment {
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
    pub ssh_keys: Vec<Ref<SshKey>>,
    #[serde(default)]
    pub kms: Option<Ref<KeyManagement>>,
    #[serde(default)]
    pub encryption_key: Option<Ref<KmsKey>>,
    #[serde(default = "default_vsi_per_subnet")]
    pub vsi_per_subnet: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

impl Default for VsiDeployment {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_group: None,
            vpc: None,
            subnets: Vec::new(),
            security_groups: Vec::new(),
            ssh_keys: Vec::new(),
            kms: None,
            encryption_key: None,
            vsi_per_subnet: default_vsi_per_subnet(),
            image: None,
            profile: None,
        }
    }
}

/// Virtual private endpoint gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualPrivateEndpoint {
    pub name: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub instance: Option<Ref<ObjectStorage>>,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub subnets: Vec<Ref<Subnet>>,
    #[serde(default)]
    pub security_groups: Vec<Ref<SecurityGroup>>,
}
