pub mod block;
pub mod config;

pub use block::{Line, State};
pub use config::Config;

use crate::{
    address,
    protocol::{BusRequest, Protocol},
    snoop_filter::SnoopFilter,
    tag_array::TagArray,
};
use stats::cache::Counter;
use stats::mem::AccessKind;

/// Response of a cache to a snooped bus request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnoopResponse {
    pub response: Option<BusRequest>,
    pub is_line_present: bool,
}

/// A private coherent cache.
///
/// Each cache owns its tag array and runs one protocol for its whole
/// lifetime.
#[derive(Debug, Clone)]
pub struct Cache {
    id: usize,
    protocol: Protocol,
    tag_array: TagArray,
    stats: stats::Cache,
    snoop_filter: Option<SnoopFilter>,
}

impl Cache {
    /// Create a cache.
    ///
    /// The snoop filter geometry is only used by protocols with a snoop filter.
    #[must_use]
    pub fn new(id: usize, protocol: Protocol, config: Config, snoop_filter: &Config) -> Self {
        let snoop_filter = protocol
            .has_snoop_filter()
            .then(|| SnoopFilter::new(snoop_filter.clone()));
        Self {
            id,
            protocol,
            tag_array: TagArray::new(config),
            stats: stats::Cache::default(),
            snoop_filter,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub fn tag_array(&self) -> &TagArray {
        &self.tag_array
    }

    /// Counters of this cache, including snoop filter counters if any.
    #[must_use]
    pub fn stats(&self) -> stats::Cache {
        let mut stats = self.stats.clone();
        stats.snoop_filter = self.snoop_filter_stats().copied();
        stats
    }

    /// Snoop filter counters, `None` if the protocol runs without a filter.
    #[must_use]
    pub fn snoop_filter_stats(&self) -> Option<&stats::SnoopFilter> {
        self.snoop_filter.as_ref().map(SnoopFilter::stats)
    }

    #[must_use]
    pub fn snoop_filter(&self) -> Option<&SnoopFilter> {
        self.snoop_filter.as_ref()
    }

    #[inline]
    pub fn record(&mut self, counter: Counter) {
        self.stats.inc(counter, 1);
    }

    #[must_use]
    pub fn state_of(&self, addr: address) -> State {
        self.tag_array.state_of(addr)
    }

    /// Access issued by the local processor.
    ///
    /// # Returns
    /// The bus request to broadcast to all other caches, if any.
    pub fn access(&mut self, addr: address, kind: AccessKind) -> Option<BusRequest> {
        self.tag_array.advance_cycle();
        self.record(if kind.is_write() {
            Counter::WRITES
        } else {
            Counter::READS
        });

        if !self.protocol.is_implemented() {
            log::trace!("cache {}: {} has no access handling", self.id, self.protocol);
            return None;
        }

        let index = match self.tag_array.find(addr) {
            Some(index) => {
                self.tag_array.touch(index);
                index
            }
            None => {
                self.record(if kind.is_write() {
                    Counter::WRITE_MISSES
                } else {
                    Counter::READ_MISSES
                });
                let status = self.tag_array.fill(addr);
                if let Some(evicted) = status.evicted {
                    log::trace!(
                        "cache {}: writeback of dirty block {:#x}",
                        self.id,
                        evicted.block_addr
                    );
                    self.record(Counter::WRITEBACKS);
                    self.record(Counter::MEMORY_TRANSACTIONS);
                }
                status.index
            }
        };

        let state = self.tag_array.get(index).state;
        if state == State::INVALID {
            // allocating the block again makes a filter entry stale
            if let Some(filter) = self.snoop_filter.as_mut() {
                filter.invalidate(addr);
            }
        }

        let transition = self.protocol.on_access(state, kind);
        self.tag_array.get_mut(index).state = transition.next;
        for &counter in transition.counters {
            self.record(counter);
        }
        log::trace!(
            "cache {}: {} {:#x}: {} -> {} request={:?}",
            self.id,
            kind,
            addr,
            state,
            transition.next,
            transition.request
        );
        transition.request
    }

    /// Snoop a request broadcast by another cache.
    ///
    /// Never allocates: a block that is not present yields an empty response.
    pub fn snoop(&mut self, addr: address, request: Option<BusRequest>) -> SnoopResponse {
        let index = self.tag_array.find(addr);
        if let Some(filter) = self.snoop_filter.as_mut() {
            filter.classify(addr, index.is_some());
        }

        let (Some(index), Some(request)) = (index, request) else {
            return SnoopResponse::default();
        };

        let state = self.tag_array.get(index).state;
        let transition = self.protocol.on_snoop(state, request);
        self.tag_array.get_mut(index).state = transition.next;
        for &counter in transition.counters {
            self.record(counter);
        }
        if transition.lost_ownership {
            if let Some(filter) = self.snoop_filter.as_mut() {
                filter.record(addr);
            }
        }
        log::trace!(
            "cache {}: snooped {} {:#x}: {} -> {} response={:?}",
            self.id,
            request,
            addr,
            state,
            transition.next,
            transition.response
        );
        SnoopResponse {
            response: transition.response,
            is_line_present: transition.is_line_present,
        }
    }

    /// Grant exclusive ownership of a present block.
    pub fn promote_exclusive(&mut self, addr: address) -> bool {
        match self.tag_array.find(addr) {
            Some(index) => {
                self.tag_array.get_mut(index).state = State::EXCLUSIVE;
                true
            }
            None => false,
        }
    }
}
