use crate::network::MacAddr;
use std::io;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors surfaced by resolver setup
///
/// Per-frame problems never show up here; they are dropped where they happen.
#[derive(Error, Debug)]
pub enum ArpError {
    #[error("Address {address} is already in use by {owner}")]
    AddressInUse { address: Ipv4Addr, owner: MacAddr },

    #[error("Link layer error: {0}")]
    Link(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ArpError>;
