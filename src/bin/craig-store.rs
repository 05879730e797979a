// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Normalizer
//!
//! Imports a landing-zone configuration document, re-derives every computed
//! field and prints the normalized document on stdout.
//!
//! Run with: cargo run --bin craig-store -- path/to/craig.json
//!
//! The document path may also come from `CRAIG_DOCUMENT`. Addressing is
//! controlled by `CRAIG_OCTET_CARRY` (`legacy` or `exact`).

use anyhow::{Context, Result};
use craig_store::domain::Locator;
use craig_store::{Form, ResourceKind, Store, StoreConfig};
use tracing::{info, warn};

const REPORTED_KINDS: [ResourceKind; 6] = [
    ResourceKind::Vpc,
    ResourceKind::Subnet,
    ResourceKind::SubnetTier,
    ResourceKind::SecurityGroup,
    ResourceKind::Cluster,
    ResourceKind::Vsi,
];

fn document_path() -> Result<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CRAIG_DOCUMENT").ok())
        .context("No document given. Pass a path or set CRAIG_DOCUMENT")
}

/// Warn about subnets the forms would refuse to save
fn report_invalid_subnets(store: &Store) {
    let ctx = store.validation_context();
    for vpc in &store.document().vpcs {
        for subnet in &vpc.subnets {
            let edit = ctx
                .clone()
                .editing(&Locator::within([vpc.name.clone()], subnet.name.clone()));
            for field in subnet.invalid_fields(&edit) {
                warn!(
                    vpc = %vpc.name,
                    subnet = %subnet.name,
                    field = field.name,
                    reason = field.invalid_text.as_deref().unwrap_or_default(),
                    "Invalid subnet field"
                );
            }
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean document
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = StoreConfig::from_env();
    let path = document_path()?;
    info!(%path, carry = ?config.octet_carry, "Normalizing configuration document");

    let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?;
    let mut store = Store::new(config).context("Failed to build the initial document")?;
    store
        .import_json(&json)
        .with_context(|| format!("Failed to import {path}"))?;

    for kind in REPORTED_KINDS {
        info!(%kind, count = store.registry().count(kind), "Registry");
    }
    report_invalid_subnets(&store);

    println!("{}", store.export_json()?);
    Ok(())
}
