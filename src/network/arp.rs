//! ARP (Address Resolution Protocol) message format
//!
//! This module provides parsing and serialization of ARP messages for the
//! Ethernet/IPv4 combination (RFC 826). Only requests and replies are
//! understood; everything else is rejected at decode time.

use super::MacAddr;
use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

/// Length of an Ethernet/IPv4 ARP message
pub const ARP_PACKET_LEN: usize = 28;
/// Length of the common header (hardware type .. protocol length)
pub const ARP_COMMON_HEADER_LEN: usize = 6;

const HARDWARE_TYPE_ETHERNET: u16 = 1;
const PROTOCOL_TYPE_IPV4: u16 = 0x0800;
const HARDWARE_LEN: u8 = 6;
const PROTOCOL_LEN: u8 = 4;

/// Common header shared by requests and replies for Ethernet/IPv4
pub const ARP_COMMON_HEADER: [u8; ARP_COMMON_HEADER_LEN] = [0x00, 0x01, 0x08, 0x00, 0x06, 0x04];

pub const ARP_OPCODE_REQUEST: u16 = 1;
pub const ARP_OPCODE_REPLY: u16 = 2;

/// ARP operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
}

impl ArpOperation {
    pub fn from_opcode(opcode: u16) -> Option<Self> {
        match opcode {
            ARP_OPCODE_REQUEST => Some(ArpOperation::Request),
            ARP_OPCODE_REPLY => Some(ArpOperation::Reply),
            _ => None,
        }
    }

    pub fn opcode(&self) -> u16 {
        match self {
            ArpOperation::Request => ARP_OPCODE_REQUEST,
            ArpOperation::Reply => ARP_OPCODE_REPLY,
        }
    }
}

/// A decoded ARP message
///
/// The fixed header fields (hardware/protocol type and lengths) are implied;
/// a packet that does not carry the Ethernet/IPv4 values never decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub operation: ArpOperation,
    pub sender_link: MacAddr,
    pub sender_address: Ipv4Addr,
    pub target_link: MacAddr,
    pub target_address: Ipv4Addr,
}

impl ArpPacket {
    /// "Who has `target_address`? Tell `local_address`"
    ///
    /// The target link address is the broadcast address.
    pub fn request(local_link: MacAddr, local_address: Ipv4Addr, target_address: Ipv4Addr) -> Self {
        ArpPacket {
            operation: ArpOperation::Request,
            sender_link: local_link,
            sender_address: local_address,
            target_link: MacAddr::BROADCAST,
            target_address,
        }
    }

    /// "`local_address` is at `local_link`", addressed to the peer that asked
    pub fn reply(
        local_link: MacAddr,
        local_address: Ipv4Addr,
        peer_link: MacAddr,
        peer_address: Ipv4Addr,
    ) -> Self {
        ArpPacket {
            operation: ArpOperation::Reply,
            sender_link: local_link,
            sender_address: local_address,
            target_link: peer_link,
            target_address: peer_address,
        }
    }

    /// Parse an ARP message
    ///
    /// Returns None if the data is too short, the common header is not
    /// Ethernet/IPv4, or the opcode is neither request nor reply.
    /// Bytes past the message (link-layer padding) are ignored.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ARP_PACKET_LEN {
            return None;
        }

        if data[..ARP_COMMON_HEADER_LEN] != ARP_COMMON_HEADER {
            return None;
        }

        let operation = ArpOperation::from_opcode(BigEndian::read_u16(&data[6..8]))?;

        Some(ArpPacket {
            operation,
            sender_link: MacAddr::from_slice(&data[8..14])?,
            sender_address: read_ipv4(&data[14..18]),
            target_link: MacAddr::from_slice(&data[18..24])?,
            target_address: read_ipv4(&data[24..28]),
        })
    }

    /// Serialize to the 28-byte wire layout
    pub fn to_bytes(&self) -> [u8; ARP_PACKET_LEN] {
        let mut bytes = [0u8; ARP_PACKET_LEN];
        BigEndian::write_u16(&mut bytes[0..2], HARDWARE_TYPE_ETHERNET);
        BigEndian::write_u16(&mut bytes[2..4], PROTOCOL_TYPE_IPV4);
        bytes[4] = HARDWARE_LEN;
        bytes[5] = PROTOCOL_LEN;
        BigEndian::write_u16(&mut bytes[6..8], self.operation.opcode());
        bytes[8..14].copy_from_slice(&self.sender_link.octets());
        BigEndian::write_u32(&mut bytes[14..18], u32::from(self.sender_address));
        bytes[18..24].copy_from_slice(&self.target_link.octets());
        BigEndian::write_u32(&mut bytes[24..28], u32::from(self.target_address));
        bytes
    }

    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    pub fn is_reply(&self) -> bool {
        self.operation == ArpOperation::Reply
    }
}

fn read_ipv4(data: &[u8]) -> Ipv4Addr {
    Ipv4Addr::from(BigEndian::read_u32(data))
}

/// Encode a broadcast request for `target_address`
pub fn encode_request(
    local_link: MacAddr,
    local_address: Ipv4Addr,
    target_address: Ipv4Addr,
) -> [u8; ARP_PACKET_LEN] {
    ArpPacket::request(local_link, local_address, target_address).to_bytes()
}

/// Encode a reply to `peer_link`/`peer_address`
pub fn encode_reply(
    local_link: MacAddr,
    local_address: Ipv4Addr,
    peer_link: MacAddr,
    peer_address: Ipv4Addr,
) -> [u8; ARP_PACKET_LEN] {
    ArpPacket::reply(local_link, local_address, peer_link, peer_address).to_bytes()
}

pub fn decode(data: &[u8]) -> Option<ArpPacket> {
    ArpPacket::from_bytes(data)
}
