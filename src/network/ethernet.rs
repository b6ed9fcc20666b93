//! Ethernet II framing
//!
//! Only what a TAP device needs: the 14-byte header and minimum-length padding.

use super::MacAddr;
use byteorder::{BigEndian, ByteOrder};

pub const ETHERNET_HEADER_LEN: usize = 14;
/// Minimum frame length without the frame check sequence
pub const ETHERNET_MIN_FRAME_LEN: usize = 60;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl EthernetHeader {
    /// Parse an Ethernet header from the start of a frame
    ///
    /// Returns None if the frame is shorter than the header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        Some(EthernetHeader {
            dst: MacAddr::from_slice(&data[0..6])?,
            src: MacAddr::from_slice(&data[6..12])?,
            ethertype: BigEndian::read_u16(&data[12..14]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ETHERNET_HEADER_LEN] {
        let mut bytes = [0u8; ETHERNET_HEADER_LEN];
        bytes[0..6].copy_from_slice(&self.dst.octets());
        bytes[6..12].copy_from_slice(&self.src.octets());
        BigEndian::write_u16(&mut bytes[12..14], self.ethertype);
        bytes
    }

    /// Whether a frame with this header should be accepted by `local`
    pub fn is_for(&self, local: MacAddr) -> bool {
        self.dst == local || self.dst.is_broadcast()
    }
}

/// Build a complete frame, zero-padded to the Ethernet minimum
pub fn build_frame(dst: MacAddr, src: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let header = EthernetHeader { dst, src, ethertype };
    let len = (ETHERNET_HEADER_LEN + payload.len()).max(ETHERNET_MIN_FRAME_LEN);

    let mut frame = Vec::with_capacity(len);
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);
    frame.resize(len, 0);
    frame
}
