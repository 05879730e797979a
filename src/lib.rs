// Copyright (c) 2025 - Cowboy AI, Inc.
//! Landing-zone configuration store
//!
//! This crate owns a single JSON configuration document describing an IBM
//! Cloud landing zone and keeps it consistent while it is edited: names stay
//! unique, soft references follow renames and deletes, and subnet CIDR
//! blocks are recomputed whenever the topology changes.
//!
//! # Architecture
//!
//! - [`domain`]: record types, value objects and the default topology
//! - [`registry`]: derived name and membership lookups
//! - [`references`]: the table of reference edges walked by cascades
//! - [`allocator`]: dynamic and static subnet addressing
//! - [`store`]: transactional mutation engine
//! - [`validation`]: per-form field predicates
//!
//! # Example
//!
//! ```rust
//! use craig_store::config::StoreConfig;
//! use craig_store::domain::{Locator, Vpc};
//! use craig_store::store::Store;
//! use serde_json::json;
//!
//! let mut store = Store::new(StoreConfig::default()).unwrap();
//! store
//!     .save::<Vpc>(&Locator::new("management"), json!({"name": "todd"}))
//!     .unwrap();
//!
//! let gateway = &store.document().vpn_gateways[0];
//! assert_eq!(gateway.vpc.as_ref().unwrap().as_str(), "todd");
//! ```

pub mod allocator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod references;
pub mod registry;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{ConfigDocument, Locator, ResourceKind};
pub use errors::{StoreError, StoreResult};
pub use registry::Registry;
pub use store::{Mutation, Store, StoreChanged};
pub use validation::{Form, ValidationContext};
