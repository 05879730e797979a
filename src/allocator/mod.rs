// Copyright (c) 2025 - Cowboy AI, Inc.
//! CIDR/Address Allocator
//!
//! Assigns non-overlapping CIDR blocks to subnets and tier address prefixes.
//! The mode comes from `_options.dynamic_subnets`:
//!
//! - **dynamic**: blocks are sized from consumer demand and packed per zone
//! - **static**: each tier subnet owns a /24 address prefix named after it
//!
//! Every VPC zone starts from its own base, `10.(10 * (3v + z)).0.0` for the
//! VPC at index `v` and zone `z`.

pub mod dynamic;
pub mod fixed;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::debug;

use crate::domain::{ConfigDocument, NetworkError};

/// Addresses IBM Cloud reserves in every subnet
pub const RESERVED_ADDRESSES: u32 = 5;

/// Longest prefix the dynamic allocator hands out
pub const MAX_DYNAMIC_PREFIX: u8 = 29;

/// How an octet that overflows past 255 carries into the next one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OctetCarry {
    /// Subtract 255 per carry; reproduces addresses already in circulation
    #[default]
    Legacy,
    /// Subtract 256 per carry
    Exact,
}

impl OctetCarry {
    fn modulus(self) -> u64 {
        match self {
            Self::Legacy => 255,
            Self::Exact => 256,
        }
    }
}

impl FromStr for OctetCarry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown octet carry mode: {other}")),
        }
    }
}

impl fmt::Display for OctetCarry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// Prefix length and size of the block serving `demand` addresses
///
/// The trial size doubles from 1 until it covers the demand; the number of
/// doublings `d` gives a `/(32 - d)` block, never longer than /29.
pub fn block_for(demand: u32) -> (u8, u64) {
    let mut size: u64 = 1;
    let mut doublings: u8 = 0;
    while size < u64::from(demand) {
        size *= 2;
        doublings += 1;
    }
    let prefix = (32 - doublings.min(32)).min(MAX_DYNAMIC_PREFIX);
    (prefix, 1u64 << (32 - prefix))
}

fn carry(mut octets: [u64; 4], mode: OctetCarry) -> Result<Ipv4Addr, NetworkError> {
    let modulus = mode.modulus();
    for i in (1..4).rev() {
        if octets[i] > 255 {
            // smallest number of wraps that brings the octet back under 256
            let wraps = (octets[i] - 256) / modulus + 1;
            octets[i] -= wraps * modulus;
            octets[i - 1] += wraps;
        }
    }
    if octets[0] > 255 {
        return Err(NetworkError::Exhausted(format!(
            "{}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        )));
    }
    Ok(Ipv4Addr::new(
        octets[0] as u8,
        octets[1] as u8,
        octets[2] as u8,
        octets[3] as u8,
    ))
}

/// Address following a block of `size` addresses starting at `base`
pub fn advance(base: Ipv4Addr, size: u64, mode: OctetCarry) -> Result<Ipv4Addr, NetworkError> {
    let mut octets = base.octets().map(u64::from);
    octets[3] += size;
    carry(octets, mode)
}

/// First address of a VPC zone
pub fn zone_base(vpc_index: usize, zone: u8, mode: OctetCarry) -> Result<Ipv4Addr, NetworkError> {
    let second = 10 * (3 * vpc_index as u64 + u64::from(zone));
    carry([10, second, 0, 0], mode)
}

/// Bring every subnet CIDR in line with the current addressing mode
///
/// Dynamic mode repacks everything; static mode only fills subnets that
/// have no CIDR yet. Running it twice yields the same document.
pub fn reconcile(doc: &mut ConfigDocument, mode: OctetCarry) -> Result<(), NetworkError> {
    if doc.options.dynamic_subnets {
        dynamic::pack(doc, mode)
    } else {
        fixed::reconcile(doc, false)
    }
}

/// Derive every CIDR from scratch after the addressing mode changed
pub fn rederive(doc: &mut ConfigDocument, mode: OctetCarry) -> Result<(), NetworkError> {
    debug!(
        dynamic = doc.options.dynamic_subnets,
        vpcs = doc.vpcs.len(),
        "Re-deriving subnet addressing"
    );
    for vpc in &mut doc.vpcs {
        fixed::remove_tier_prefixes(vpc);
        for subnet in &mut vpc.subnets {
            subnet.cidr = None;
            subnet.has_prefix = false;
        }
    }

    if doc.options.dynamic_subnets {
        dynamic::pack(doc, mode)
    } else {
        fixed::reconcile(doc, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1 => (29, 8); "floor is a /29")]
    #[test_case(6 => (29, 8); "vpe subnet")]
    #[test_case(9 => (28, 16); "vpn gateway subnet")]
    #[test_case(12 => (28, 16); "four doublings")]
    #[test_case(16 => (28, 16); "exact power of two")]
    #[test_case(17 => (27, 32); "one past a power of two")]
    #[test_case(205 => (24, 256); "large cluster")]
    fn test_block_for(demand: u32) -> (u8, u64) {
        block_for(demand)
    }

    #[test]
    fn test_advance_without_carry() {
        let next = advance(Ipv4Addr::new(10, 10, 0, 0), 8, OctetCarry::Legacy).unwrap();
        assert_eq!(next, Ipv4Addr::new(10, 10, 0, 8));
    }

    #[test]
    fn test_legacy_carry_subtracts_255() {
        let next = advance(Ipv4Addr::new(10, 10, 0, 248), 8, OctetCarry::Legacy).unwrap();
        assert_eq!(next, Ipv4Addr::new(10, 10, 1, 1));
    }

    #[test]
    fn test_exact_carry_subtracts_256() {
        let next = advance(Ipv4Addr::new(10, 10, 0, 248), 8, OctetCarry::Exact).unwrap();
        assert_eq!(next, Ipv4Addr::new(10, 10, 1, 0));
        let next = advance(Ipv4Addr::new(10, 10, 0, 0), 512, OctetCarry::Exact).unwrap();
        assert_eq!(next, Ipv4Addr::new(10, 10, 2, 0));
    }

    #[test]
    fn test_zone_bases() {
        assert_eq!(zone_base(0, 1, OctetCarry::Legacy).unwrap(), Ipv4Addr::new(10, 10, 0, 0));
        assert_eq!(zone_base(0, 3, OctetCarry::Legacy).unwrap(), Ipv4Addr::new(10, 30, 0, 0));
        assert_eq!(zone_base(1, 1, OctetCarry::Legacy).unwrap(), Ipv4Addr::new(10, 40, 0, 0));
        // the ninth VPC spills into the first octet
        assert_eq!(zone_base(8, 2, OctetCarry::Legacy).unwrap(), Ipv4Addr::new(11, 5, 0, 0));
        assert_eq!(zone_base(8, 2, OctetCarry::Exact).unwrap(), Ipv4Addr::new(11, 4, 0, 0));
    }

    #[test]
    fn test_exhaustion() {
        let result = advance(Ipv4Addr::new(255, 255, 255, 0), 512, OctetCarry::Exact);
        assert!(matches!(result, Err(NetworkError::Exhausted(_))));
    }

    #[test]
    fn test_carry_across_many_wraps() {
        let base = Ipv4Addr::new(10, 10, 0, 0);
        assert_eq!(advance(base, 65_536, OctetCarry::Exact).unwrap(), Ipv4Addr::new(10, 11, 0, 0));
        assert_eq!(advance(base, 65_536, OctetCarry::Legacy).unwrap(), Ipv4Addr::new(10, 11, 2, 1));
        let result = advance(base, 1u64 << 32, OctetCarry::Legacy);
        assert!(matches!(result, Err(NetworkError::Exhausted(_))));
    }

    #[test]
    fn test_carry_mode_parsing() {
        assert_eq!("Exact".parse::<OctetCarry>().unwrap(), OctetCarry::Exact);
        assert_eq!(OctetCarry::default().to_string(), "legacy");
        assert!("sideways".parse::<OctetCarry>().is_err());
    }
}
