//! Address resolution for a simple user-space network stack
//!
//! This library maps IPv4 addresses to Ethernet addresses with ARP:
//! - ARP and Ethernet wire formats
//! - A time-bounded resolution cache
//! - Request retransmission and reply matching
//! - Duplicate address detection at startup
//! - A link-layer abstraction with a TAP device implementation

pub mod config;
pub mod error;
pub mod iface;
pub mod network;
pub mod resolver;

// Re-export commonly used types
pub use config::ArpConfig;
pub use error::ArpError;
pub use iface::{FrameHandler, LinkLayer, TapLink};
pub use network::{ArpOperation, ArpPacket, MacAddr};
pub use resolver::{Arp, ArpCache, CacheTable};
