//! The link-layer seam
//!
//! The resolver never touches a device directly. It sends payloads and
//! receives callbacks through [`LinkLayer`], which a TAP device, a test
//! double, or anything else able to move Ethernet payloads can implement.

use crate::network::ethernet::EthernetHeader;
use crate::network::MacAddr;
use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Receives payloads of one ethertype
pub trait FrameHandler: Send + Sync {
    /// Called once per inbound frame, with the payload after the Ethernet
    /// header and the source address from that header.
    fn on_frame(&self, payload: &[u8], source: MacAddr);
}

pub trait LinkLayer: Send + Sync {
    /// Transmit `payload` in a frame of type `ethertype` to `destination`
    fn send_frame(&self, payload: &[u8], ethertype: u16, destination: MacAddr) -> io::Result<()>;

    /// Route inbound frames of `ethertype` to `handler`, replacing any
    /// previous handler for that type
    fn register_handler(&self, ethertype: u16, handler: Arc<dyn FrameHandler>);

    /// Network address configured on this link
    fn local_address(&self) -> io::Result<Ipv4Addr>;

    /// Hardware address of this link
    fn local_link(&self) -> io::Result<MacAddr>;
}

/// Ethertype to handler dispatch table
#[derive(Default, Clone)]
pub struct HandlerTable {
    handlers: Arc<RwLock<HashMap<u16, Arc<dyn FrameHandler>>>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, ethertype: u16, handler: Arc<dyn FrameHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ethertype, handler);
    }

    pub fn get(&self, ethertype: u16) -> Option<Arc<dyn FrameHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ethertype)
            .cloned()
    }

    /// Hand a raw Ethernet frame to its handler
    ///
    /// Frames not addressed to `local` (or broadcast) and frames with no
    /// registered handler are dropped. Returns whether a handler ran.
    pub fn dispatch(&self, frame: &[u8], local: MacAddr) -> bool {
        let header = match EthernetHeader::from_bytes(frame) {
            Some(header) => header,
            None => {
                trace!(len = frame.len(), "Dropping runt frame");
                return false;
            }
        };

        if !header.is_for(local) {
            return false;
        }

        // The lock is released before the handler runs, so a handler may
        // register or send without deadlocking.
        let handler = match self.get(header.ethertype) {
            Some(handler) => handler,
            None => {
                trace!(ethertype = header.ethertype, "No handler for ethertype");
                return false;
            }
        };

        handler.on_frame(&frame[crate::network::ethernet::ETHERNET_HEADER_LEN..], header.src);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ethernet::{build_frame, ETHERTYPE_ARP, ETHERTYPE_IPV4};
    use std::sync::Mutex;

    const LOCAL: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
    const PEER: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(Vec<u8>, MacAddr)>>,
    }

    impl FrameHandler for Recorder {
        fn on_frame(&self, payload: &[u8], source: MacAddr) {
            self.seen.lock().unwrap().push((payload.to_vec(), source));
        }
    }

    #[test]
    fn test_dispatch_by_ethertype() {
        let table = HandlerTable::new();
        let recorder = Arc::new(Recorder::default());
        table.register(ETHERTYPE_ARP, recorder.clone());

        let frame = build_frame(LOCAL, PEER, ETHERTYPE_ARP, &[1, 2, 3]);
        assert!(table.dispatch(&frame, LOCAL));

        let frame = build_frame(LOCAL, PEER, ETHERTYPE_IPV4, &[4, 5, 6]);
        assert!(!table.dispatch(&frame, LOCAL));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(&seen[0].0[..3], &[1, 2, 3]);
        assert_eq!(seen[0].1, PEER);
    }

    #[test]
    fn test_dispatch_filters_destination() {
        let table = HandlerTable::new();
        let recorder = Arc::new(Recorder::default());
        table.register(ETHERTYPE_ARP, recorder.clone());

        let other = MacAddr([0x02, 0, 0, 0, 0, 0x09]);
        assert!(!table.dispatch(&build_frame(other, PEER, ETHERTYPE_ARP, &[]), LOCAL));
        assert!(table.dispatch(&build_frame(MacAddr::BROADCAST, PEER, ETHERTYPE_ARP, &[]), LOCAL));
        assert!(!table.dispatch(&[0u8; 10], LOCAL));

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }
}
