// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mutation Engine
//!
//! [`Store`] exclusively owns the configuration document. Every external
//! call runs as a transaction:
//!
//! ```text
//! clone document → apply mutation → cascade through reference edges
//!                                        ↓
//!                  finalize derived state (tiers, gateways, CIDRs)
//!                                        ↓
//!                  swap in → rebuild registry → one StoreChanged
//! ```
//!
//! If any step fails the committed document is untouched and no
//! notification is sent.

pub mod events;
mod import;
mod options;
mod subnets;
mod tiers;

pub use events::{Mutation, StoreChanged};
pub use subnets::SubnetUpdate;
pub use tiers::TierUpdate;

use chrono::Utc;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

use crate::allocator;
use crate::config::StoreConfig;
use crate::domain::{ConfigDocument, Locator, Nameable, Resource, ResourceKind, Vpc};
use crate::errors::{StoreError, StoreResult};
use crate::references::{self, Target};
use crate::registry::Registry;
use crate::validation::ValidationContext;

type Listener = Box<dyn FnMut(&StoreChanged)>;

/// Owner of the canonical configuration document
pub struct Store {
    document: ConfigDocument,
    registry: Registry,
    config: StoreConfig,
    sequence: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("sequence", &self.sequence)
            .field("vpcs", &self.document.vpcs.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    /// Create a store holding the configured starting template
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let mut document = ConfigDocument::from_template(config.template);
        finalize(&mut document, &config)?;
        info!(template = %config.template, carry = %config.octet_carry, "Store initialized");
        Ok(Self {
            registry: Registry::from_document(&document),
            document,
            config,
            sequence: 0,
            listeners: Vec::new(),
        })
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of committed calls so far
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Register a listener for commit notifications
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreChanged) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Context handed to validation predicates
    pub fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.document, &self.registry)
    }

    /// Look up a record
    pub fn get<T: Resource>(&self, locator: &Locator) -> StoreResult<&T> {
        T::collection(&self.document, &locator.parents)?
            .iter()
            .find(|r| r.name() == locator.name)
            .ok_or_else(|| StoreError::not_found(T::KIND, &locator.name))
    }

    /// Append a record under `parents`
    pub fn create<T: Resource>(&mut self, parents: &[&str], draft: T) -> StoreResult<()> {
        let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        let locator = Locator::within(parents.clone(), draft.name());
        self.transact(move |doc, _| {
            create_record(doc, &parents, draft)?;
            Ok(Mutation::Created {
                kind: T::KIND,
                locator,
            })
        })
    }

    /// Merge `update` over a record, cascading a rename
    pub fn save<T: Resource>(&mut self, locator: &Locator, update: Value) -> StoreResult<()> {
        self.transact(|doc, _| {
            let renamed_to = save_record::<T>(doc, locator, update)?;
            Ok(Mutation::Saved {
                kind: T::KIND,
                locator: locator.clone(),
                renamed_to,
            })
        })
    }

    /// Remove a record and null every reference to it and its children
    pub fn delete<T: Resource>(&mut self, locator: &Locator) -> StoreResult<()> {
        self.transact(|doc, _| {
            delete_record::<T>(doc, locator)?;
            Ok(Mutation::Deleted {
                kind: T::KIND,
                locator: locator.clone(),
            })
        })
    }

    /// Run one mutation against a working copy and commit it
    fn transact<F>(&mut self, operation: F) -> StoreResult<()>
    where
        F: FnOnce(&mut ConfigDocument, &StoreConfig) -> StoreResult<Mutation>,
    {
        let mut working = self.document.clone();
        let mutation = operation(&mut working, &self.config)?;
        finalize(&mut working, &self.config)?;

        self.document = working;
        self.registry = Registry::from_document(&self.document);
        self.sequence += 1;
        info!(sequence = self.sequence, ?mutation, "Committed store mutation");

        let event = StoreChanged {
            sequence: self.sequence,
            mutation,
            at: Utc::now(),
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
        Ok(())
    }
}

/// Target of a cascade for a record addressed by `parents` and `name`
pub(crate) fn target_for(kind: ResourceKind, parents: &[String], name: &str) -> Target {
    match parents.first() {
        Some(parent) if kind.resolves_within_parent() => Target::within(kind, parent, name),
        _ => Target::new(kind, name),
    }
}

/// Fail with the first name collision in the document
pub(crate) fn ensure_unique(doc: &ConfigDocument) -> StoreResult<()> {
    match Registry::from_document(doc).duplicates().into_iter().next() {
        Some(duplicate) => Err(StoreError::DuplicateName {
            kind: duplicate.kind,
            name: duplicate.name,
        }),
        None => Ok(()),
    }
}

/// Overwrite the fields present in `update`, keeping every other field
pub(crate) fn merge_fields(record: &mut Value, update: Value) -> StoreResult<()> {
    let (Value::Object(target), Value::Object(fields)) = (record, update) else {
        return Err(StoreError::InvalidOperation(
            "updates must be JSON objects".to_string(),
        ));
    };
    for (key, value) in fields {
        target.insert(key, value);
    }
    Ok(())
}

fn create_record<T: Resource>(
    doc: &mut ConfigDocument,
    parents: &[String],
    mut draft: T,
) -> StoreResult<()> {
    if draft.name().is_empty() {
        return Err(StoreError::EmptyName(T::KIND));
    }
    T::collection(doc, parents)?;

    let registry = Registry::from_document(doc);
    if registry.siblings(T::KIND, parents).contains(&draft.name()) {
        return Err(StoreError::DuplicateName {
            kind: T::KIND,
            name: draft.name().to_string(),
        });
    }

    draft.attach(doc, parents);
    debug!(kind = %T::KIND, name = draft.name(), "Creating record");
    T::collection_mut(doc, parents)?.push(draft);
    Ok(())
}

fn save_record<T: Resource>(
    doc: &mut ConfigDocument,
    locator: &Locator,
    update: Value,
) -> StoreResult<Option<String>> {
    let records = T::collection_mut(doc, &locator.parents)?;
    let index = records
        .iter()
        .position(|r| r.name() == locator.name)
        .ok_or_else(|| StoreError::not_found(T::KIND, &locator.name))?;

    let previous = records[index].clone();
    let mut merged = serde_json::to_value(&previous)?;
    merge_fields(&mut merged, update)?;
    let mut record: T = serde_json::from_value(merged)?;
    if record.name().is_empty() {
        return Err(StoreError::EmptyName(T::KIND));
    }
    record.on_update(&previous);

    let renamed_to = (record.name() != previous.name()).then(|| record.name().to_string());
    records[index] = record;

    if let Some(new_name) = &renamed_to {
        let target = target_for(T::KIND, &locator.parents, &locator.name);
        references::rename_references(doc, &target, new_name);
    }
    ensure_unique(doc)?;
    Ok(renamed_to)
}

fn delete_record<T: Resource>(doc: &mut ConfigDocument, locator: &Locator) -> StoreResult<()> {
    let children = T::collection(doc, &locator.parents)?
        .iter()
        .find(|r| r.name() == locator.name)
        .map(|record| record.children(&locator.parents))
        .ok_or_else(|| StoreError::not_found(T::KIND, &locator.name))?;

    for child in &children {
        references::clear_references(doc, child);
    }
    T::collection_mut(doc, &locator.parents)?.retain(|r| r.name() != locator.name);
    references::clear_references(doc, &target_for(T::KIND, &locator.parents, &locator.name));
    debug!(kind = %T::KIND, %locator, children = children.len(), "Deleted record");
    Ok(())
}

/// Re-derive every piece of derived state after a mutation and refuse a
/// document holding a reference that no longer resolves
pub(crate) fn finalize(doc: &mut ConfigDocument, config: &StoreConfig) -> StoreResult<()> {
    doc.sync_back_pointers();
    doc.sync_tier_membership();

    if let Some(reference) = references::dangling_references(doc).into_iter().next() {
        warn!(path = reference.path, target = %reference.target, "Rejected dangling reference");
        return Err(StoreError::DanglingReference {
            path: reference.path,
            target: reference.target,
        });
    }

    link_public_gateways(doc);

    for tgw in &mut doc.transit_gateways {
        tgw.connections.retain(|c| !c.is_orphaned());
    }

    allocator::reconcile(doc, config.octet_carry)?;
    Ok(())
}

/// Derive each subnet's public gateway flag from its tier and VPC gateways
fn link_public_gateways(doc: &mut ConfigDocument) {
    for vpc in &mut doc.vpcs {
        let Vpc {
            public_gateways,
            subnets,
            subnet_tiers,
            ..
        } = vpc;
        for subnet in subnets.iter_mut() {
            let has_gateway = public_gateways.contains(&subnet.zone);
            let tier = subnet
                .tier
                .as_deref()
                .and_then(|name| subnet_tiers.iter().find(|t| t.name == name));
            subnet.public_gateway = match tier {
                Some(tier) if !tier.is_advanced() => tier.add_public_gateway && has_gateway,
                _ => subnet.public_gateway && has_gateway,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{KeyManagement, KmsKey, NetworkAcl, ObjectStorage, ResourceGroup};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> Store {
        Store::new(StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_new_store_is_allocated() {
        let store = store();
        let subnet = store.document().vpcs[0].subnet("vpn-zone-1").unwrap();
        assert_eq!(subnet.cidr.unwrap().to_string(), "10.10.0.16/28");
        assert_eq!(store.sequence(), 0);
    }

    #[test]
    fn test_create_fills_parent_defaults() {
        let mut store = store();
        store
            .create(
                &["management"],
                NetworkAcl {
                    name: "edge".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let acl: &NetworkAcl =
            store.get(&Locator::within(["management"], "edge")).unwrap();
        assert_eq!(acl.vpc, "management");
        assert_eq!(acl.resource_group.as_ref().unwrap().as_str(), "management-rg");
    }

    #[test]
    fn test_create_rejects_duplicates_and_missing_parents() {
        let mut store = store();
        let duplicate = store.create(
            &[],
            ResourceGroup {
                name: "service-rg".into(),
                ..Default::default()
            },
        );
        assert!(matches!(duplicate, Err(StoreError::DuplicateName { .. })));

        let orphan = store.create(&["nope"], KmsKey::root("key-2"));
        assert!(matches!(orphan, Err(StoreError::ParentNotFound { .. })));

        let empty = store.create(&[], ResourceGroup::default());
        assert!(matches!(empty, Err(StoreError::EmptyName(_))));
        assert_eq!(store.sequence(), 0);
    }

    #[test]
    fn test_save_is_idempotent() {
        let mut store = store();
        let before = store.document().clone();
        store
            .save::<ObjectStorage>(&Locator::new("cos"), json!({"plan": "standard"}))
            .unwrap();
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn test_failed_save_leaves_document_untouched() {
        let mut store = store();
        let before = store.document().clone();
        let result = store.save::<Vpc>(&Locator::new("management"), json!({"name": "workload"}));
        assert!(matches!(result, Err(StoreError::DuplicateName { .. })));
        assert_eq!(store.document(), &before);

        let missing = store.save::<Vpc>(&Locator::new("nope"), json!({}));
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_use_data_drops_vpc_bucket() {
        let mut store = store();
        store
            .save::<Vpc>(&Locator::new("workload"), json!({"use_data": true}))
            .unwrap();
        assert!(store.document().vpcs[1].bucket.is_none());
    }

    #[test]
    fn test_one_notification_per_call() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.delete::<KeyManagement>(&Locator::new("kms")).unwrap();
        let _ = store.delete::<KeyManagement>(&Locator::new("kms"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].sequence, 1);
        assert_eq!(seen[0].mutation.kind(), Some(ResourceKind::KeyManagement));
    }

    #[test]
    fn test_deleting_vpc_prunes_transit_connections() {
        let mut store = store();
        store.delete::<Vpc>(&Locator::new("workload")).unwrap();
        let connections = &store.document().transit_gateways[0].connections;
        assert_eq!(connections.len(), 1);
        assert!(store.document().clusters[0].vpc.is_none());
        assert!(store.document().clusters[0].subnets.is_empty());
    }

    #[test]
    fn test_public_gateway_follows_tier_and_vpc() {
        let mut store = store();
        store
            .save::<Vpc>(&Locator::new("management"), json!({"publicGateways": [1]}))
            .unwrap();
        store
            .save_subnet_tier("management", "vsi", TierUpdate::new().public_gateway(true))
            .unwrap();

        let vpc = &store.document().vpcs[0];
        assert!(vpc.subnet("vsi-zone-1").unwrap().public_gateway);
        assert!(!vpc.subnet("vsi-zone-2").unwrap().public_gateway);
        assert!(!vpc.subnet("vpe-zone-1").unwrap().public_gateway);
    }
}
