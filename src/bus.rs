//! Shared snooping bus.
//!
//! The bus is atomic: a request is broadcast to every other cache and fully
//! resolved before the next trace event is processed.

use crate::{address, cache::Cache, protocol::BusRequest, protocol::Protocol};
use stats::cache::Counter;
use stats::mem::AccessKind;

/// Aggregated responses of all snooping caches to one request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// At least one peer reported holding the line.
    pub any_line_present: bool,
    /// At least one peer answered with a flush.
    pub any_flush: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Bus {
    protocol: Protocol,
}

impl Bus {
    #[must_use]
    pub fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }

    /// Broadcast `request` issued by cache `owner` to every other cache.
    ///
    /// Peers are snooped in ascending id order, even if there is no request,
    /// so that snoop filters see every transaction.
    pub fn broadcast(
        &self,
        caches: &mut [Cache],
        owner: usize,
        addr: address,
        request: Option<BusRequest>,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        for cache in caches.iter_mut().filter(|cache| cache.id() != owner) {
            let response = cache.snoop(addr, request);
            outcome.any_line_present |= response.is_line_present;
            outcome.any_flush |= response.response == Some(BusRequest::FLUSH);
        }
        log::debug!(
            "bus::broadcast(owner={}, addr={:#x}, request={:?}) => {:?}",
            owner,
            addr,
            request,
            outcome
        );
        outcome
    }

    /// Apply the global policy to the requesting cache.
    ///
    /// Only protocols with an exclusive state take part:
    /// a read that finds no other copy is granted exclusive ownership,
    /// a flushed block counts as a cache-to-cache transfer and any other
    /// data fetch goes to memory.
    pub fn resolve(
        &self,
        owner: &mut Cache,
        addr: address,
        kind: AccessKind,
        request: Option<BusRequest>,
        outcome: Outcome,
    ) {
        if !self.protocol.has_exclusive_state() {
            return;
        }

        if !outcome.any_line_present
            && kind == AccessKind::READ
            && request == Some(BusRequest::READ)
        {
            owner.promote_exclusive(addr);
        }

        if outcome.any_flush {
            owner.record(Counter::CACHE_TO_CACHE_TRANSFERS);
        } else if request.is_some_and(BusRequest::fetches_data) {
            owner.record(Counter::MEMORY_TRANSACTIONS);
        }
    }

    /// Run one complete bus transaction for an access of cache `owner`.
    pub fn transaction(
        &self,
        caches: &mut [Cache],
        owner: usize,
        addr: address,
        kind: AccessKind,
        request: Option<BusRequest>,
    ) -> Outcome {
        let outcome = self.broadcast(caches, owner, addr, request);
        if let Some(owner) = caches.get_mut(owner) {
            self.resolve(owner, addr, kind, request, outcome);
        }
        outcome
    }
}
