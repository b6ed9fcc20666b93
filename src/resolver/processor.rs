//! Inbound ARP processing
//!
//! Every failure here is absorbed: a frame that is malformed, spoofed or not
//! addressed to us is dropped without touching any state.

use super::ArpContext;
use crate::iface::FrameHandler;
use crate::network::arp::{encode_reply, ArpOperation, ArpPacket};
use crate::network::MacAddr;
use std::sync::Weak;
use tracing::{debug, trace};

impl ArpContext {
    /// Handle one ARP payload received from `source`
    pub fn process_frame(&self, payload: &[u8], source: MacAddr) {
        let packet = match ArpPacket::from_bytes(payload) {
            Some(packet) => packet,
            None => {
                trace!(%source, len = payload.len(), "Dropping undecodable ARP frame");
                return;
            }
        };

        // The payload must agree with the frame it arrived in
        if packet.sender_link != source {
            debug!(
                claimed = %packet.sender_link,
                actual = %source,
                "Dropping ARP frame with mismatched sender link address"
            );
            return;
        }

        if packet.target_address != self.local_address {
            trace!(to = %packet.target_address, "ARP frame not for us");
            return;
        }

        match packet.operation {
            ArpOperation::Request => self.process_request(&packet),
            ArpOperation::Reply => self.process_reply(&packet),
        }
    }

    fn process_request(&self, packet: &ArpPacket) {
        debug!(
            from = %packet.sender_address,
            link = %packet.sender_link,
            "Answering ARP request"
        );

        let reply = encode_reply(
            self.local_link,
            self.local_address,
            packet.sender_link,
            packet.sender_address,
        );
        self.send(&reply, packet.sender_link);
    }

    fn process_reply(&self, packet: &ArpPacket) {
        if !self
            .pending
            .complete_if_matches(packet.sender_address, packet.sender_link)
        {
            trace!(from = %packet.sender_address, "Ignoring unsolicited ARP reply");
            return;
        }

        self.cache.insert(packet.sender_address, packet.sender_link);
        debug!(
            address = %packet.sender_address,
            link = %packet.sender_link,
            "ARP reply matched pending resolution"
        );
    }
}

/// Handler registered with the link
///
/// Holds the context weakly so the link and the context do not keep each
/// other alive.
pub(crate) struct ArpHandler(pub(crate) Weak<ArpContext>);

impl FrameHandler for ArpHandler {
    fn on_frame(&self, payload: &[u8], source: MacAddr) {
        if let Some(context) = self.0.upgrade() {
            context.process_frame(payload, source);
        }
    }
}
