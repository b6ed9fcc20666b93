//! TAP device link
//!
//! Carries Ethernet frames between the kernel and this stack. The stack's own
//! network and link addresses are configured here, not discovered from the
//! host: the kernel side of the TAP device is a different host on the segment.

use super::link::{FrameHandler, HandlerTable, LinkLayer};
use crate::network::ethernet::build_frame;
use crate::network::MacAddr;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};
use tun_tap::{Iface, Mode};

/// Room for a full 1500-byte MTU frame plus header
const FRAME_BUF_LEN: usize = 1518;

pub struct TapLink {
    iface: Arc<Iface>,
    address: Ipv4Addr,
    link: MacAddr,
    handlers: HandlerTable,
    receiver: JoinHandle<io::Result<()>>,
}

impl TapLink {
    /// Create (or attach to) TAP device `name` and start receiving on it
    pub fn open(name: &str, address: Ipv4Addr, link: MacAddr) -> io::Result<Self> {
        let iface = Arc::new(Iface::without_packet_info(name, Mode::Tap)?);
        debug!(device = iface.name(), %address, %link, "TAP device opened");

        let handlers = HandlerTable::new();
        let receiver = {
            let iface = Arc::clone(&iface);
            let handlers = handlers.clone();
            thread::Builder::new()
                .name(format!("{}-rx", iface.name()))
                .spawn(move || receive_loop(&iface, &handlers, link))?
        };

        Ok(TapLink {
            iface,
            address,
            link,
            handlers,
            receiver,
        })
    }

    /// Kernel name of the device (may differ from the requested one)
    pub fn name(&self) -> &str {
        self.iface.name()
    }

    /// Whether the receive thread has stopped
    pub fn receiver_finished(&self) -> bool {
        self.receiver.is_finished()
    }
}

impl LinkLayer for TapLink {
    fn send_frame(&self, payload: &[u8], ethertype: u16, destination: MacAddr) -> io::Result<()> {
        let frame = build_frame(destination, self.link, ethertype, payload);
        let sent = self.iface.send(&frame)?;
        trace!(%destination, ethertype, bytes = sent, "Frame sent");
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

fn receive_loop(iface: &Iface, handlers: &HandlerTable, link: MacAddr) -> io::Result<()> {
    let mut buf = [0u8; FRAME_BUF_LEN];

    loop {
        let nbytes = match iface.recv(&mut buf) {
            Ok(nbytes) => nbytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(device = iface.name(), error = %e, "TAP receive failed, stopping");
                return Err(e);
            }
        };

        handlers.dispatch(&buf[..nbytes], link);
    }
}
