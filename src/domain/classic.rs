// Copyright (c) 2025 - Cowboy AI, Inc.
//! Classic infrastructure records

use serde::{Deserialize, Serialize};

use super::reference::Ref;

/// Classic VLAN type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VlanType {
    #[default]
    Private,
    Public,
}

/// Classic infrastructure VLAN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicVlan {
    pub name: String,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(rename = "type", default)]
    pub vlan_type: VlanType,
}

/// Classic infrastructure gateway appliance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicGateway {
    pub name: String,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub private_network_only: bool,
    /// Required unless the gateway is private only
    #[serde(default)]
    pub public_bandwidth: Option<u32>,
    #[serde(default)]
    pub private_vlan: Option<Ref<ClassicVlan>>,
    #[serde(default)]
    pub public_vlan: Option<Ref<ClassicVlan>>,
}
