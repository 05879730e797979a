// Copyright (c) 2025 - Cowboy AI, Inc.
//! Account-level and security records

use serde::{Deserialize, Serialize};

use super::reference::Ref;
use super::storage::{Bucket, CosKey, KeyManagement, KmsKey};
use super::vpc::{RuleDirection, RuleProtocol, Vpc};

/// Resource group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
    #[serde(default)]
    pub use_prefix: bool,
    /// Group already exists and is looked up instead of created
    #[serde(default)]
    pub use_data: bool,
}

/// Public SSH key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshKey {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub use_data: bool,
}

/// Security group attached to a VPC
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub name: String,
    #[serde(default)]
    pub vpc: Option<Ref<Vpc>>,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub rules: Vec<SecurityGroupRule>,
}

/// Security group rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub name: String,
    /// Owning security group, maintained by the store
    #[serde(default)]
    pub sg: String,
    #[serde(default)]
    pub direction: RuleDirection,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub protocol: RuleProtocol,
    #[serde(default)]
    pub port_min: Option<u16>,
    #[serde(default)]
    pub port_max: Option<u16>,
}

/// Secrets manager instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretsManager {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub kms: Option<Ref<KeyManagement>>,
    #[serde(default)]
    pub encryption_key: Option<Ref<KmsKey>>,
    #[serde(default)]
    pub plan: Option<String>,
}

fn default_atracker_name() -> String {
    "atracker".to_string()
}

fn default_atracker_type() -> String {
    "cos".to_string()
}

fn default_locations() -> Vec<String> {
    vec!["global".to_string(), "us-south".to_string()]
}

/// Activity tracker route (document singleton)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atracker {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default = "default_atracker_type")]
    pub target_type: String,
    #[serde(default = "default_atracker_name")]
    pub name: String,
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub bucket: Option<Ref<Bucket>>,
    #[serde(default)]
    pub cos_key: Option<Ref<CosKey>>,
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    #[serde(default)]
    pub add_route: bool,
    /// Provision an activity tracker instance as well as the route
    #[serde(default)]
    pub instance: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
}

impl Default for Atracker {
    fn default() -> Self {
        Self {
            enabled: false,
            target_type: default_atracker_type(),
            name: default_atracker_name(),
            target_name: None,
            bucket: None,
            cos_key: None,
            locations: default_locations(),
            add_route: false,
            instance: false,
            plan: None,
            resource_group: None,
        }
    }
}
