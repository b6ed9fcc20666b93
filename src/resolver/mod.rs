//! Address resolution
//!
//! [`Arp`] maps IPv4 addresses to link addresses for one link. Two kinds of
//! threads meet in [`ArpContext`]:
//! - callers of [`Arp::resolve`], which block while a request is outstanding
//! - the link's receive path, which answers requests and completes replies
//!
//! They share the cache and the pending slot, each behind its own lock. The
//! two locks are never held together. Slow-path resolutions are serialized
//! by a third lock taken before either of them, so at most one resolution is
//! in flight and a caller can only ever be handed its own answer.

pub mod cache;
pub mod pending;
mod processor;

#[cfg(test)]
mod testing;

use crate::config::ArpConfig;
use crate::error::{ArpError, Result};
use crate::iface::LinkLayer;
use crate::network::arp::encode_request;
use crate::network::ethernet::ETHERTYPE_ARP;
use crate::network::MacAddr;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, trace, warn};

pub use cache::{ArpCache, CacheTable};
pub use pending::{PendingResolution, Ticket};

use processor::ArpHandler;

/// State shared by the resolving and receiving sides
pub struct ArpContext {
    link: Arc<dyn LinkLayer>,
    local_address: Ipv4Addr,
    local_link: MacAddr,
    config: ArpConfig,
    cache: ArpCache,
    pending: PendingResolution,
    resolve_lock: Mutex<()>,
}

impl ArpContext {
    pub(crate) fn new(
        link: Arc<dyn LinkLayer>,
        local_address: Ipv4Addr,
        local_link: MacAddr,
        config: ArpConfig,
    ) -> Self {
        ArpContext {
            link,
            local_address,
            local_link,
            config,
            cache: ArpCache::new(config.cache_ttl, config.cache_capacity),
            pending: PendingResolution::new(),
            resolve_lock: Mutex::new(()),
        }
    }

    /// Link address for `address`, or None if nobody answered
    ///
    /// A cached mapping is returned without sending anything. Otherwise a
    /// request is broadcast up to `max_attempts` times, waiting up to
    /// `retry_interval` after each one. A reply wakes the caller right away.
    pub fn resolve(&self, address: Ipv4Addr) -> Option<MacAddr> {
        if let Some(link) = self.cache.lookup(address) {
            trace!(%address, %link, "ARP cache hit");
            return Some(link);
        }

        let _in_flight = self.resolve_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Learned while we queued behind another resolution
        if let Some(link) = self.cache.lookup(address) {
            return Some(link);
        }

        let request = encode_request(self.local_link, self.local_address, address);
        let ticket = self.pending.begin(address);

        for attempt in 1..=self.config.max_attempts {
            debug!(%address, attempt, "Broadcasting ARP request");
            self.send(&request, MacAddr::BROADCAST);

            if let Some(link) = self.pending.wait(ticket, self.config.retry_interval) {
                // The receive path caches too, but may not have got there yet
                self.cache.insert(address, link);
                debug!(%address, %link, attempt, "Address resolved");
                return Some(link);
            }
        }

        // The slot stays open; a late reply still lands in the cache
        debug!(%address, attempts = self.config.max_attempts, "ARP resolution timed out");
        None
    }

    fn send(&self, payload: &[u8], destination: MacAddr) {
        if let Err(e) = self.link.send_frame(payload, ETHERTYPE_ARP, destination) {
            warn!(%destination, error = %e, "Failed to send ARP frame");
        }
    }
}

/// An initialized resolver bound to one link
///
/// Only [`Arp::init`] produces one, and only after the duplicate address
/// check passed.
#[derive(Clone)]
pub struct Arp {
    context: Arc<ArpContext>,
}

impl Arp {
    /// Bind to `link`, then make sure nobody else answers for our address
    ///
    /// Blocks for a full resolution budget while the self-check runs.
    pub fn init(link: Arc<dyn LinkLayer>, config: ArpConfig) -> Result<Self> {
        let local_address = link.local_address()?;
        let local_link = link.local_link()?;

        let context = Arc::new(ArpContext::new(
            Arc::clone(&link),
            local_address,
            local_link,
            config,
        ));
        link.register_handler(ETHERTYPE_ARP, Arc::new(ArpHandler(Arc::downgrade(&context))));

        if let Some(owner) = context.resolve(local_address) {
            warn!(address = %local_address, %owner, "Duplicate address detected");
            return Err(ArpError::AddressInUse {
                address: local_address,
                owner,
            });
        }

        info!(address = %local_address, link = %local_link, "ARP ready");
        Ok(Arp { context })
    }

    pub fn resolve(&self, address: Ipv4Addr) -> Option<MacAddr> {
        self.context.resolve(address)
    }

    pub fn local_address(&self) -> Ipv4Addr {
        self.context.local_address
    }

    pub fn local_link(&self) -> MacAddr {
        self.context.local_link
    }

    pub fn config(&self) -> &ArpConfig {
        &self.context.config
    }

    pub fn cache(&self) -> &ArpCache {
        &self.context.cache
    }

    pub fn pending(&self) -> &PendingResolution {
        &self.context.pending
    }

    /// Printable dump of the cache
    pub fn cache_table(&self) -> CacheTable {
        self.context.cache.table()
    }
}
