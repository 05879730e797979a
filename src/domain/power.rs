// Copyright (c) 2025 - Cowboy AI, Inc.
//! Power Virtual Server records

use serde::{Deserialize, Serialize};

use super::reference::Ref;
use super::security::ResourceGroup;

/// Power VS workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerWorkspace {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub ssh_keys: Vec<PowerSshKey>,
    #[serde(default)]
    pub network: Vec<PowerNetwork>,
}

/// Subnet of a Power VS workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerNetwork {
    pub name: String,
    /// Owning workspace, maintained by the store
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub pi_network_type: Option<String>,
    #[serde(default)]
    pub pi_cidr: Option<String>,
    #[serde(default)]
    pub pi_dns: Vec<String>,
}

/// SSH key registered with a Power VS workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerSshKey {
    pub name: String,
    /// Owning workspace, maintained by the store
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub public_key: Option<String>,
}
