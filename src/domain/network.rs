// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Highest zone number a region offers
pub const MAX_ZONES: u8 = 3;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Invalid zone: {0} (must be 1-{max})", max = MAX_ZONES)]
    InvalidZone(u8),

    #[error("Address space exhausted after {0}")]
    Exhausted(String),
}

/// IPv4 CIDR block value object
///
/// The address is kept exactly as written: `10.10.0.8/28` stays
/// `10.10.0.8/28` rather than collapsing to its network address. The block
/// covers `[address, address + size)`, which is what overlap checks use.
///
/// Invariants:
/// - Valid dotted-quad address
/// - Prefix length 0-32
///
/// # Examples
///
/// ```rust
/// use craig_store::domain::CidrBlock;
///
/// let block = CidrBlock::new("10.10.0.16/28").unwrap();
/// assert_eq!(block.size(), 16);
/// assert_eq!(block.to_string(), "10.10.0.16/28");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock(Ipv4Net);

impl CidrBlock {
    /// Parse a CIDR block
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();
        let (addr, prefix) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address =
            Ipv4Addr::from_str(addr).map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;
        let prefix_len = prefix
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_len)
    }

    /// Create from separate address and prefix length
    pub fn from_parts(address: Ipv4Addr, prefix_len: u8) -> Result<Self, NetworkError> {
        Ipv4Net::new(address, prefix_len)
            .map(Self)
            .map_err(|_| NetworkError::InvalidPrefixLength(prefix_len))
    }

    /// Address as written
    pub fn address(&self) -> Ipv4Addr {
        self.0.addr()
    }

    /// Prefix length
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of addresses covered by the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    /// First address covered, as an integer
    pub fn start(&self) -> u64 {
        u64::from(u32::from(self.address()))
    }

    /// One past the last address covered, as an integer
    pub fn end(&self) -> u64 {
        self.start() + self.size()
    }

    /// Check if two blocks share any address
    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    /// Check if the address sits on a block boundary
    pub fn is_aligned(&self) -> bool {
        self.0.addr() == self.0.network()
    }

    /// Get as CIDR notation string
    pub fn as_cidr(&self) -> String {
        format!("{}/{}", self.address(), self.prefix_len())
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for CidrBlock {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CidrBlock> for String {
    fn from(value: CidrBlock) -> Self {
        value.as_cidr()
    }
}

/// Validate a zone number against the configured zone count
pub fn validate_zone(zone: u8, zones: u8) -> Result<(), NetworkError> {
    if zone == 0 || zone > zones.min(MAX_ZONES) {
        return Err(NetworkError::InvalidZone(zone));
    }
    Ok(())
}
