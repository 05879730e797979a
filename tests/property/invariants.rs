// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Store Invariants
//!
//! Random sequences of topology edits are applied to the default document.
//! Rejected edits are ignored; after every edit that commits, the document
//! must still satisfy the consistency rules the store promises.

use craig_store::allocator::{self, block_for, OctetCarry, MAX_DYNAMIC_PREFIX};
use craig_store::domain::{Cluster, KeyManagement, Locator, RefSlot, ResourceGroup, SubnetTier, Vpc};
use craig_store::references::{dangling_references, edges};
use craig_store::store::TierUpdate;
use craig_store::{ConfigDocument, ResourceKind, Store, StoreError, StoreResult};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::json;

use crate::fixtures::default_store;

const VPC_NAMES: [&str; 5] = ["management", "workload", "edge", "transit", "frog"];
const TIER_NAMES: [&str; 6] = ["vsi", "vpe", "vpn", "app", "data", "bastion"];
const MAX_VPCS: usize = 4;

// ============================================================================
// Edit Definition
// ============================================================================

/// Topology edit; indices pick an existing record modulo the collection size
#[derive(Debug, Clone)]
enum Edit {
    RenameVpc { vpc: usize, name: usize },
    CreateVpc { name: usize },
    DeleteVpc { vpc: usize },
    CreateTier { vpc: usize, name: usize, zones: u8 },
    ResizeTier { vpc: usize, tier: usize, zones: u8 },
    SelectZones { vpc: usize, tier: usize, zones: Vec<u8> },
    RenameTier { vpc: usize, tier: usize, name: usize },
    DeleteTier { vpc: usize, tier: usize },
    SetWorkers { workers: u32 },
    ToggleDynamic,
    SetZones { zones: u8 },
    DeleteKms,
}

fn pick<'a, T>(items: &'a [T], index: usize) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(index % items.len())
    }
}

fn vpc_name(store: &Store, index: usize) -> Option<String> {
    pick(&store.document().vpcs, index).map(|v| v.name.clone())
}

fn tier_name(store: &Store, vpc: &str, index: usize) -> Option<String> {
    let tiers = &store.document().vpc(vpc)?.subnet_tiers;
    pick(tiers, index).map(|t| t.name.clone())
}

/// Apply an edit, returning `None` when it names nothing that exists
fn apply(store: &mut Store, edit: &Edit) -> Option<StoreResult<()>> {
    let result = match edit {
        Edit::RenameVpc { vpc, name } => match vpc_name(store, *vpc) {
            Some(from) => store.save::<Vpc>(&Locator::new(from), json!({"name": VPC_NAMES[*name]})),
            None => return None,
        },
        Edit::CreateVpc { name } => {
            if store.document().vpcs.len() >= MAX_VPCS {
                return None;
            }
            store.create::<Vpc>(
                &[],
                Vpc {
                    name: VPC_NAMES[*name].into(),
                    ..Default::default()
                },
            )
        }
        Edit::DeleteVpc { vpc } => match vpc_name(store, *vpc) {
            Some(name) => store.delete::<Vpc>(&Locator::new(name)),
            None => return None,
        },
        Edit::CreateTier { vpc, name, zones } => match vpc_name(store, *vpc) {
            Some(vpc) => store.create_subnet_tier(&vpc, SubnetTier::fixed(TIER_NAMES[*name], *zones)),
            None => return None,
        },
        Edit::ResizeTier { vpc, tier, zones } => {
            let Some(vpc) = vpc_name(store, *vpc) else {
                return None;
            };
            let Some(tier) = tier_name(store, &vpc, *tier) else {
                return None;
            };
            store.save_subnet_tier(&vpc, &tier, TierUpdate::new().zones(*zones))
        }
        Edit::SelectZones { vpc, tier, zones } => {
            let Some(vpc) = vpc_name(store, *vpc) else {
                return None;
            };
            let Some(tier) = tier_name(store, &vpc, *tier) else {
                return None;
            };
            let update = TierUpdate::new().advanced(true).select_zones(zones.clone());
            store.save_subnet_tier(&vpc, &tier, update)
        }
        Edit::RenameTier { vpc, tier, name } => {
            let Some(vpc) = vpc_name(store, *vpc) else {
                return None;
            };
            let Some(tier) = tier_name(store, &vpc, *tier) else {
                return None;
            };
            store.save_subnet_tier(&vpc, &tier, TierUpdate::new().rename(TIER_NAMES[*name]))
        }
        Edit::DeleteTier { vpc, tier } => {
            let Some(vpc) = vpc_name(store, *vpc) else {
                return None;
            };
            let Some(tier) = tier_name(store, &vpc, *tier) else {
                return None;
            };
            store.delete_subnet_tier(&vpc, &tier)
        }
        Edit::SetWorkers { workers } => store.save::<Cluster>(
            &Locator::new("workload-cluster"),
            json!({"workers_per_subnet": workers}),
        ),
        Edit::ToggleDynamic => {
            let dynamic = store.document().options.dynamic_subnets;
            store.save_options(json!({"dynamic_subnets": !dynamic}))
        }
        Edit::SetZones { zones } => store.save_options(json!({"zones": zones})),
        Edit::DeleteKms => store.delete::<KeyManagement>(&Locator::new("kms")),
    };
    Some(result)
}

/// Count the reference slots of `kind` naming `name`
fn references_to(doc: &ConfigDocument, kind: ResourceKind, name: &str) -> usize {
    let mut scratch = doc.clone();
    let mut count = 0;
    for edge in edges().into_iter().filter(|e| e.target == kind) {
        (edge.visit)(&mut scratch, &mut |_, slot| {
            count += slot.names().into_iter().filter(|n| *n == name).count();
        });
    }
    count
}

/// Rename a record of `kind` picked by `index` to a fresh name
fn rename(store: &mut Store, kind: ResourceKind, index: usize, to: &str) -> Option<(String, StoreResult<()>)> {
    let doc = store.document();
    let from = match kind {
        ResourceKind::Vpc => pick(&doc.vpcs, index)?.name.clone(),
        ResourceKind::ResourceGroup => pick(&doc.resource_groups, index)?.name.clone(),
        _ => pick(&doc.key_management, index)?.name.clone(),
    };
    let locator = Locator::new(from.clone());
    let update = json!({ "name": to });
    let result = match kind {
        ResourceKind::Vpc => store.save::<Vpc>(&locator, update),
        ResourceKind::ResourceGroup => store.save::<ResourceGroup>(&locator, update),
        _ => store.save::<KeyManagement>(&locator, update),
    };
    Some((from, result))
}

// ============================================================================
// Invariant Checks
// ============================================================================

fn check_invariants(store: &Store) -> Result<(), TestCaseError> {
    let doc = store.document();

    prop_assert!(store.registry().duplicates().is_empty(), "duplicate names");
    let dangling = dangling_references(doc);
    prop_assert!(dangling.is_empty(), "dangling references: {:?}", dangling);

    for vpc in &doc.vpcs {
        let blocks: Vec<_> = vpc
            .subnets
            .iter()
            .filter_map(|s| s.cidr.map(|c| (s.name.as_str(), c)))
            .collect();
        for (i, (left, a)) in blocks.iter().enumerate() {
            for (right, b) in &blocks[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {} in {}", left, right, vpc.name);
            }
        }

        for subnet in &vpc.subnets {
            prop_assert_eq!(&subnet.vpc, &vpc.name);
            let tier = subnet.tier.as_deref().unwrap_or_default();
            prop_assert!(vpc.tier(tier).is_some(), "{} has no tier", subnet.name);
        }
        for tier in &vpc.subnet_tiers {
            let members: Vec<String> = vpc.tier_subnets(&tier.name).map(|s| s.name.clone()).collect();
            prop_assert_eq!(&tier.subnets, &members);
        }
    }

    let mut again = doc.clone();
    prop_assert!(allocator::reconcile(&mut again, store.config().octet_carry).is_ok());
    prop_assert!(&again == doc, "reconcile is not idempotent");
    Ok(())
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn zone_count() -> impl Strategy<Value = u8> {
    1u8..=3
}

fn edit() -> impl Strategy<Value = Edit> {
    let vpc = 0usize..8;
    let tier = 0usize..8;
    prop_oneof![
        (vpc.clone(), 0..VPC_NAMES.len()).prop_map(|(vpc, name)| Edit::RenameVpc { vpc, name }),
        (0..VPC_NAMES.len()).prop_map(|name| Edit::CreateVpc { name }),
        vpc.clone().prop_map(|vpc| Edit::DeleteVpc { vpc }),
        (vpc.clone(), 0..TIER_NAMES.len(), zone_count())
            .prop_map(|(vpc, name, zones)| Edit::CreateTier { vpc, name, zones }),
        (vpc.clone(), tier.clone(), zone_count())
            .prop_map(|(vpc, tier, zones)| Edit::ResizeTier { vpc, tier, zones }),
        (
            vpc.clone(),
            tier.clone(),
            prop::sample::subsequence(vec![1u8, 2, 3], 1..=3)
        )
            .prop_map(|(vpc, tier, zones)| Edit::SelectZones { vpc, tier, zones }),
        (vpc.clone(), tier.clone(), 0..TIER_NAMES.len())
            .prop_map(|(vpc, tier, name)| Edit::RenameTier { vpc, tier, name }),
        (vpc, tier).prop_map(|(vpc, tier)| Edit::DeleteTier { vpc, tier }),
        (1u32..8).prop_map(|workers| Edit::SetWorkers { workers }),
        Just(Edit::ToggleDynamic),
        zone_count().prop_map(|zones| Edit::SetZones { zones }),
        Just(Edit::DeleteKms),
    ]
}

fn edit_sequence() -> impl Strategy<Value = Vec<Edit>> {
    prop::collection::vec(edit(), 1..24)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Committed edits preserve document consistency
    ///
    /// Names stay unique, references resolve, tier membership matches the
    /// subnets, and no two subnets in a VPC share an address.
    #[test]
    fn prop_edits_preserve_invariants(edits in edit_sequence()) {
        let mut store = default_store();
        check_invariants(&store)?;

        for edit in &edits {
            match apply(&mut store, edit) {
                Some(Ok(())) => check_invariants(&store)?,
                Some(Err(e)) => {
                    prop_assert!(
                        !matches!(e, StoreError::DanglingReference { .. }),
                        "{:?} left a dangling reference: {}", edit, e
                    );
                }
                None => {}
            }
        }
    }

    /// Property: Rejected edits leave the document untouched
    #[test]
    fn prop_rejected_edit_is_a_no_op(edits in edit_sequence()) {
        let mut store = default_store();

        for edit in &edits {
            let before = store.document().clone();
            let sequence = store.sequence();
            if !matches!(apply(&mut store, edit), Some(Ok(()))) {
                prop_assert!(store.document() == &before, "rejected {:?} changed the document", edit);
                prop_assert_eq!(store.sequence(), sequence);
            }
        }
    }

    /// Property: Export then import reproduces the document
    #[test]
    fn prop_export_import_is_stable(edits in edit_sequence()) {
        let mut store = default_store();
        for edit in &edits {
            let _ = apply(&mut store, edit);
        }

        let exported = store.export_json().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut copy = default_store();
        copy.import_json(&exported).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(copy.document() == store.document(), "import changed the document");
    }

    /// Property: A rename moves every reference to the new name
    ///
    /// The number of slots naming the record is the same before and after,
    /// and none are left naming the old one.
    #[test]
    fn prop_rename_moves_every_reference(
        edits in edit_sequence(),
        kind in prop::sample::select(vec![
            ResourceKind::Vpc,
            ResourceKind::ResourceGroup,
            ResourceKind::KeyManagement,
        ]),
        index in 0usize..8,
    ) {
        let mut store = default_store();
        for edit in &edits {
            let _ = apply(&mut store, edit);
        }

        let to = "renamed-record";
        let before = store.document().clone();
        if let Some((from, result)) = rename(&mut store, kind, index, to) {
            prop_assert!(result.is_ok(), "renaming {} {} failed: {:?}", kind, from, result);
            let doc = store.document();
            prop_assert_eq!(references_to(doc, kind, to), references_to(&before, kind, &from));
            prop_assert_eq!(references_to(doc, kind, &from), 0);
            check_invariants(&store)?;
        }
    }

    /// Property: Dynamic blocks cover their demand within /29
    #[test]
    fn prop_block_covers_demand(demand in 0u32..100_000) {
        let (prefix, size) = block_for(demand);

        prop_assert!(prefix <= MAX_DYNAMIC_PREFIX);
        prop_assert_eq!(size, 1u64 << (32 - prefix));
        prop_assert!(size >= u64::from(demand));
        // the next longer prefix would not have been enough
        if prefix < MAX_DYNAMIC_PREFIX {
            prop_assert!(size / 2 < u64::from(demand));
        }
    }

    /// Property: Exact carry never yields an address below the base
    #[test]
    fn prop_exact_advance_is_monotonic(third in 0u8..=255, fourth in 0u8..=255, size in 1u64..1024) {
        let base = std::net::Ipv4Addr::new(10, 10, third, fourth);
        if let Ok(next) = allocator::advance(base, size, OctetCarry::Exact) {
            prop_assert_eq!(u64::from(u32::from(next)), u64::from(u32::from(base)) + size);
        }
    }
}
