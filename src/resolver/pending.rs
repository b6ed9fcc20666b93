//! The in-flight resolution slot
//!
//! There is exactly one slot. The receive path completes it, the resolving
//! thread waits on it. Every field is read and written under one mutex; the
//! condition variable only shortens the resolver's wait.

use crate::network::MacAddr;
use std::net::Ipv4Addr;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Identifies one call to [`PendingResolution::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct PendingState {
    requested: Option<Ipv4Addr>,
    awaiting: bool,
    resolved: Option<MacAddr>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct PendingResolution {
    state: Mutex<PendingState>,
    completed: Condvar,
}

impl PendingResolution {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start waiting for `address`
    ///
    /// Replaces whatever was pending before. Callers must make sure no other
    /// resolution is in flight; `ArpContext` does so with its resolve lock.
    pub fn begin(&self, address: Ipv4Addr) -> Ticket {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.requested = Some(address);
        state.awaiting = true;
        state.resolved = None;
        Ticket(state.generation)
    }

    /// Complete the pending resolution if it is waiting for `address`
    ///
    /// Returns false, leaving the slot untouched, when nothing is pending or a
    /// different address is.
    pub fn complete_if_matches(&self, address: Ipv4Addr, link: MacAddr) -> bool {
        let mut state = self.lock();
        if !state.awaiting || state.requested != Some(address) {
            return false;
        }

        state.resolved = Some(link);
        state.awaiting = false;
        state.requested = None;
        drop(state);

        self.completed.notify_all();
        true
    }

    pub fn is_awaiting(&self) -> bool {
        self.lock().awaiting
    }

    /// Address currently being resolved
    pub fn requested(&self) -> Option<Ipv4Addr> {
        self.lock().requested
    }

    /// Take the resolved link address, if the last resolution completed
    pub fn take_result(&self) -> Option<MacAddr> {
        let mut state = self.lock();
        if state.awaiting {
            return None;
        }
        state.resolved.take()
    }

    /// Block until the resolution behind `ticket` completes or `timeout` passes
    ///
    /// Returns the resolved link address only if it belongs to `ticket`; a
    /// slot taken over by a later `begin` yields None.
    pub fn wait(&self, ticket: Ticket, timeout: Duration) -> Option<MacAddr> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();

        loop {
            if state.generation != ticket.0 {
                return None;
            }
            if !state.awaiting {
                return state.resolved.take();
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            state = self
                .completed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
    const MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x0a]);

    #[test]
    fn test_idle_slot() {
        let pending = PendingResolution::new();
        assert!(!pending.is_awaiting());
        assert!(!pending.complete_if_matches(A, MAC));
        assert!(pending.take_result().is_none());
    }

    #[test]
    fn test_matching_completion() {
        let pending = PendingResolution::new();
        pending.begin(A);
        assert!(pending.is_awaiting());
        assert_eq!(pending.requested(), Some(A));

        assert!(pending.complete_if_matches(A, MAC));
        assert!(!pending.is_awaiting());
        assert_eq!(pending.requested(), None);
        assert_eq!(pending.take_result(), Some(MAC));
        assert_eq!(pending.take_result(), None);

        // already completed
        assert!(!pending.complete_if_matches(A, MAC));
    }

    #[test]
    fn test_mismatch_leaves_slot_untouched() {
        let pending = PendingResolution::new();
        pending.begin(A);

        assert!(!pending.complete_if_matches(B, MAC));
        assert!(pending.is_awaiting());
        assert_eq!(pending.requested(), Some(A));
        assert!(pending.take_result().is_none());
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let pending = PendingResolution::new();
        pending.begin(A);
        pending.complete_if_matches(A, MAC);

        pending.begin(B);
        assert!(pending.take_result().is_none());
        assert_eq!(pending.requested(), Some(B));
    }

    #[test]
    fn test_wait_times_out() {
        let pending = PendingResolution::new();
        let ticket = pending.begin(A);

        let started = Instant::now();
        assert!(pending.wait(ticket, Duration::from_millis(40)).is_none());
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(pending.is_awaiting());
    }

    #[test]
    fn test_wait_wakes_on_completion() {
        let pending = Arc::new(PendingResolution::new());
        let ticket = pending.begin(A);

        let completer = {
            let pending = Arc::clone(&pending);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                pending.complete_if_matches(A, MAC)
            })
        };

        let started = Instant::now();
        assert_eq!(pending.wait(ticket, Duration::from_secs(5)), Some(MAC));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(completer.join().unwrap());
    }

    #[test]
    fn test_wait_returns_immediately_when_already_complete() {
        let pending = PendingResolution::new();
        let ticket = pending.begin(A);
        pending.complete_if_matches(A, MAC);

        assert_eq!(pending.wait(ticket, Duration::from_secs(5)), Some(MAC));
    }

    #[test]
    fn test_superseded_ticket_gets_nothing() {
        let pending = PendingResolution::new();
        let first = pending.begin(A);
        let second = pending.begin(B);
        pending.complete_if_matches(B, MAC);

        assert!(pending.wait(first, Duration::from_millis(10)).is_none());
        assert_eq!(pending.wait(second, Duration::from_millis(10)), Some(MAC));
    }
}
