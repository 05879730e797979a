// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document-wide options (`_options`)

use serde::{Deserialize, Serialize};

use super::network::MAX_ZONES;
use super::reference::Ref;
use super::vpc::Vpc;

fn default_prefix() -> String {
    "iac".to_string()
}

fn default_region() -> String {
    "us-south".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["hello".to_string(), "world".to_string()]
}

fn default_zones() -> u8 {
    MAX_ZONES
}

fn default_endpoints() -> String {
    "private".to_string()
}

fn default_true() -> bool {
    true
}

/// Global options shared by every record in the document
///
/// `prefix`, `region` and `tags` fall back to their defaults when missing so
/// they are defined for every document that deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_zones")]
    pub zones: u8,
    #[serde(default = "default_endpoints")]
    pub endpoints: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub fs_cloud: bool,
    #[serde(default = "default_true")]
    pub dynamic_subnets: bool,
    #[serde(default)]
    pub enable_classic: bool,
    #[serde(default)]
    pub enable_power_vs: bool,
    #[serde(default)]
    pub power_vs_zones: Vec<String>,
    #[serde(default)]
    pub edge_vpc_name: Option<Ref<Vpc>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            region: default_region(),
            tags: default_tags(),
            zones: default_zones(),
            endpoints: default_endpoints(),
            account_id: None,
            fs_cloud: false,
            dynamic_subnets: true,
            enable_classic: false,
            enable_power_vs: false,
            power_vs_zones: Vec::new(),
            edge_vpc_name: None,
        }
    }
}
