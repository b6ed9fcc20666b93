//! Test double for the link layer

use crate::config::ArpConfig;
use crate::iface::{FrameHandler, HandlerTable, LinkLayer};
use crate::network::arp::ArpPacket;
use crate::network::ethernet::ETHERTYPE_ARP;
use crate::network::MacAddr;
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const LOCAL_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
pub const PEER_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x20]);

pub const TEST_INTERVAL: Duration = Duration::from_millis(30);

pub fn test_config() -> ArpConfig {
    ArpConfig::default().with_retry_interval(TEST_INTERVAL)
}

#[derive(Debug, Clone)]
pub struct SentFrame {
    pub payload: Vec<u8>,
    pub ethertype: u16,
    pub destination: MacAddr,
    pub at: Instant,
}

/// Given a sent packet and how many frames were sent so far (itself
/// included), produce frames to feed back as `(payload, source)`.
type Responder = Box<dyn Fn(&ArpPacket, usize) -> Vec<(Vec<u8>, MacAddr)> + Send>;

pub struct MockLink {
    address: Ipv4Addr,
    link: MacAddr,
    handlers: HandlerTable,
    sent: Mutex<Vec<SentFrame>>,
    responder: Mutex<Option<Responder>>,
}

impl MockLink {
    pub fn new(address: Ipv4Addr, link: MacAddr) -> Self {
        MockLink {
            address,
            link,
            handlers: HandlerTable::new(),
            sent: Mutex::new(Vec::new()),
            responder: Mutex::new(None),
        }
    }

    pub fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&ArpPacket, usize) -> Vec<(Vec<u8>, MacAddr)> + Send + 'static,
    {
        *self.responder.lock().unwrap() = Some(Box::new(responder));
    }

    /// Deliver an ARP payload as if it arrived from `source`
    pub fn inject(&self, payload: &[u8], source: MacAddr) {
        if let Some(handler) = self.handlers.get(ETHERTYPE_ARP) {
            handler.on_frame(payload, source);
        }
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_packets(&self) -> Vec<ArpPacket> {
        self.sent()
            .iter()
            .filter_map(|frame| ArpPacket::from_bytes(&frame.payload))
            .collect()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl LinkLayer for MockLink {
    fn send_frame(&self, payload: &[u8], ethertype: u16, destination: MacAddr) -> io::Result<()> {
        let count = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentFrame {
                payload: payload.to_vec(),
                ethertype,
                destination,
                at: Instant::now(),
            });
            sent.len()
        };

        let responses = match (ArpPacket::from_bytes(payload), &*self.responder.lock().unwrap()) {
            (Some(packet), Some(responder)) => responder(&packet, count),
            _ => Vec::new(),
        };

        for (frame, source) in responses {
            self.inject(&frame, source);
        }
        Ok(())
    }

    fn register_handler(&self, ethertype: u16, handler: Arc<dyn FrameHandler>) {
        self.handlers.register(ethertype, handler);
    }

    fn local_address(&self) -> io::Result<Ipv4Addr> {
        Ok(self.address)
    }

    fn local_link(&self) -> io::Result<MacAddr> {
        Ok(self.link)
    }
}
