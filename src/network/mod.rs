//! Link and network layer wire formats
//!
//! This module contains the codecs the resolver speaks:
//! - Ethernet: frame header and padding
//! - ARP: request/reply messages for Ethernet/IPv4

pub mod arp;
pub mod ethernet;

use std::fmt;

// Re-export commonly used items
pub use arp::{ArpOperation, ArpPacket};
pub use ethernet::{EthernetHeader, ETHERTYPE_ARP, ETHERTYPE_IPV4};

/// A 48-bit hardware (link) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// The all-ones broadcast address
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);
    /// The all-zero address
    pub const UNSPECIFIED: MacAddr = MacAddr([0; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }

    /// Read an address from the first six bytes of `data`
    ///
    /// Returns None if the slice is too short
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(MacAddr(bytes))
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}
