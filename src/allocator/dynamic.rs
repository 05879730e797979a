// Copyright (c) 2025 - Cowboy AI, Inc.
//! Demand-sized subnet packing

use std::collections::HashMap;
use tracing::debug;

use super::{advance, block_for, zone_base, OctetCarry, RESERVED_ADDRESSES};
use crate::domain::{CidrBlock, ConfigDocument, NetworkError, Ref, Subnet, Vpc};

/// Addresses a VPN gateway takes in its subnet
pub const VPN_GATEWAY_ADDRESSES: u32 = 4;

fn placed_on(vpc: &Option<Ref<Vpc>>, subnets: &[Ref<Subnet>], vpc_name: &str, subnet: &str) -> bool {
    vpc.as_ref().is_some_and(|v| v.is(vpc_name)) && subnets.iter().any(|s| s.is(subnet))
}

/// Addresses a subnet needs: every consumer placed on it plus the reserved five
///
/// Cluster workers count twice so rolling restarts have headroom. The sum
/// saturates at `u32::MAX`, which sizes a block no zone can hold.
pub fn subnet_demand(doc: &ConfigDocument, vpc: &str, subnet: &str) -> u32 {
    let mut demand = RESERVED_ADDRESSES;

    for cluster in &doc.clusters {
        if placed_on(&cluster.vpc, &cluster.subnets, vpc, subnet) {
            demand = demand.saturating_add(cluster.workers_per_subnet.saturating_mul(2));
        }
        for pool in &cluster.worker_pools {
            if placed_on(&cluster.vpc, &pool.subnets, vpc, subnet) {
                demand = demand.saturating_add(pool.workers_per_subnet.saturating_mul(2));
            }
        }
    }

    for gateway in &doc.vpn_gateways {
        let on_subnet = gateway.subnet.as_ref().is_some_and(|s| s.is(subnet));
        if on_subnet && gateway.vpc.as_ref().is_some_and(|v| v.is(vpc)) {
            demand = demand.saturating_add(VPN_GATEWAY_ADDRESSES);
        }
    }

    let endpoints = doc
        .virtual_private_endpoints
        .iter()
        .filter(|vpe| placed_on(&vpe.vpc, &vpe.subnets, vpc, subnet))
        .count();
    demand = demand.saturating_add(u32::try_from(endpoints).unwrap_or(u32::MAX));

    demand = doc
        .vsi
        .iter()
        .filter(|vsi| placed_on(&vsi.vpc, &vsi.subnets, vpc, subnet))
        .fold(demand, |total, vsi| total.saturating_add(vsi.vsi_per_subnet));

    let servers = doc
        .vpn_servers
        .iter()
        .filter(|server| placed_on(&server.vpc, &server.subnets, vpc, subnet))
        .count();
    demand = demand.saturating_add(u32::try_from(servers).unwrap_or(u32::MAX));

    demand
}

/// Subnet indices in allocation order: tier order, then array order
fn allocation_order(vpc: &Vpc) -> Vec<usize> {
    let mut order = Vec::with_capacity(vpc.subnets.len());
    for tier in &vpc.subnet_tiers {
        order.extend(
            vpc.subnets
                .iter()
                .enumerate()
                .filter(|(_, s)| s.tier.as_deref() == Some(tier.name.as_str()))
                .map(|(i, _)| i),
        );
    }
    for i in 0..vpc.subnets.len() {
        if !order.contains(&i) {
            order.push(i);
        }
    }
    order
}

/// Pack every subnet of every VPC from its zone base
pub fn pack(doc: &mut ConfigDocument, mode: OctetCarry) -> Result<(), NetworkError> {
    for v in 0..doc.vpcs.len() {
        pack_vpc(doc, v, mode)?;
    }
    Ok(())
}

fn pack_vpc(doc: &mut ConfigDocument, v: usize, mode: OctetCarry) -> Result<(), NetworkError> {
    let vpc = &doc.vpcs[v];
    let plan: Vec<(usize, u32)> = allocation_order(vpc)
        .into_iter()
        .map(|i| (i, subnet_demand(doc, &vpc.name, &vpc.subnets[i].name)))
        .collect();

    let mut cursors: HashMap<u8, std::net::Ipv4Addr> = HashMap::new();
    let vpc = &mut doc.vpcs[v];
    for (index, demand) in plan {
        let subnet = &mut vpc.subnets[index];
        let base = match cursors.get(&subnet.zone) {
            Some(cursor) => *cursor,
            None => zone_base(v, subnet.zone, mode)?,
        };
        let (prefix, size) = block_for(demand);
        subnet.cidr = Some(CidrBlock::from_parts(base, prefix)?);
        subnet.has_prefix = false;
        cursors.insert(subnet.zone, advance(base, size, mode)?);
    }

    debug!(vpc = %vpc.name, subnets = vpc.subnets.len(), "Packed dynamic subnets");
    Ok(())
}
