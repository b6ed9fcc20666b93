//! Time-bounded IPv4 to link address cache

use crate::network::MacAddr;
use lru::LruCache;
use std::fmt;
use std::net::Ipv4Addr;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    link: MacAddr,
    inserted_at: Instant,
}

/// Mapping cache with a fixed time-to-live and capacity
///
/// Lookups do not refresh an entry's position, so when the cache is full the
/// least recently inserted mapping is evicted. Overwriting a mapping counts as
/// inserting it again.
pub struct ArpCache {
    entries: Mutex<LruCache<Ipv4Addr, CacheEntry>>,
    ttl: Duration,
}

impl ArpCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ArpCache {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Cached link address for `address`, if present and not expired
    pub fn lookup(&self, address: Ipv4Addr) -> Option<MacAddr> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = *entries.peek(&address)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            trace!(%address, "Cache entry expired");
            entries.pop(&address);
            return None;
        }

        Some(entry.link)
    }

    pub fn insert(&self, address: Ipv4Addr, link: MacAddr) {
        let entry = CacheEntry {
            link,
            inserted_at: Instant::now(),
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((evicted, _)) = entries.push(address, entry) {
            if evicted != address {
                trace!(%evicted, "Cache full, evicted oldest entry");
            }
        }
    }

    /// Live mappings, oldest first
    pub fn snapshot(&self) -> Vec<(Ipv4Addr, MacAddr)> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .rev()
            .filter(|(_, entry)| entry.inserted_at.elapsed() < self.ttl)
            .map(|(address, entry)| (*address, entry.link))
            .collect()
    }

    /// Number of stored entries, expired ones included until observed
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> CacheTable {
        CacheTable(self.snapshot())
    }
}

/// Human-readable dump of the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTable(pub Vec<(Ipv4Addr, MacAddr)>);

impl fmt::Display for CacheTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>15}\t\t{:>17}", "IP", "MAC")?;
        for (address, link) in &self.0 {
            writeln!(f, "{:>15}\t\t{:>17}", address.to_string(), link.to_string())?;
        }
        Ok(())
    }
}
