// Copyright (c) 2025 - Cowboy AI, Inc.
//! Key management and object storage records

use serde::{Deserialize, Serialize};

use super::reference::Ref;
use super::security::ResourceGroup;

fn default_rotation() -> u8 {
    1
}

fn default_endpoint() -> String {
    "public".to_string()
}

fn default_plan() -> String {
    "standard".to_string()
}

fn default_storage_class() -> String {
    "standard".to_string()
}

/// Key management service instance (Key Protect or HPCS)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyManagement {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub use_hs_crypto: bool,
    #[serde(default)]
    pub use_data: bool,
    #[serde(default)]
    pub authorize_vpc_reader_role: bool,
    #[serde(default)]
    pub keys: Vec<KmsKey>,
}

/// Encryption key held by a key management instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmsKey {
    pub name: String,
    #[serde(default)]
    pub root_key: bool,
    #[serde(default)]
    pub key_ring: Option<String>,
    #[serde(default)]
    pub force_delete: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Rotation interval in months
    #[serde(default = "default_rotation")]
    pub rotation: u8,
    #[serde(default)]
    pub dual_auth_delete: bool,
}

impl KmsKey {
    /// Root key with default settings
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_key: true,
            key_ring: None,
            force_delete: true,
            endpoint: default_endpoint(),
            rotation: default_rotation(),
            dual_auth_delete: false,
        }
    }
}

/// Cloud object storage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStorage {
    pub name: String,
    #[serde(default)]
    pub resource_group: Option<Ref<ResourceGroup>>,
    #[serde(default)]
    pub kms: Option<Ref<KeyManagement>>,
    #[serde(default)]
    pub use_data: bool,
    #[serde(default)]
    pub use_random_suffix: bool,
    /// Generated once when the random suffix is first enabled
    #[serde(default)]
    pub random_suffix: Option<String>,
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
    #[serde(default)]
    pub keys: Vec<CosKey>,
}

impl Default for ObjectStorage {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_group: None,
            kms: None,
            use_data: false,
            use_random_suffix: false,
            random_suffix: None,
            plan: default_plan(),
            buckets: Vec::new(),
            keys: Vec::new(),
        }
    }
}

/// Object storage bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub kms_key: Option<Ref<KmsKey>>,
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub force_delete: bool,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kms_key: None,
            storage_class: default_storage_class(),
            endpoint: default_endpoint(),
            force_delete: true,
        }
    }

    pub fn encrypted_with(mut self, key: impl Into<String>) -> Self {
        self.kms_key = Some(Ref::new(key));
        self
    }
}

/// Object storage service credential
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosKey {
    pub name: String,
    #[serde(default)]
    pub enable_hmac: bool,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_defaults() {
        let bucket: Bucket = serde_json::from_str(r#"{"name": "logs"}"#).unwrap();
        assert_eq!(bucket.storage_class, "standard");
        assert!(bucket.kms_key.is_none());
    }

    #[test]
    fn test_cos_defaults_on_import() {
        let cos: ObjectStorage =
            serde_json::from_str(r#"{"name": "cos", "kms": "kms", "buckets": []}"#).unwrap();
        assert_eq!(cos.kms.as_ref().map(Ref::as_str), Some("kms"));
        assert_eq!(cos.plan, "standard");
        assert!(cos.random_suffix.is_none());
    }
}
