//! Snoop filter.
//!
//! A direct mapped presence predictor kept next to each cache. An entry
//! records a block this cache is known not to hold (it was snooped absent or
//! lost the line to a peer). The filter is consulted before each snoop and
//! classifies it, the real snoop always runs afterwards.

use crate::{address, cache, tag_array::TagArray};
use cache::block::State;
use stats::snoop_filter::Lookup;

pub const DEFAULT_NUM_SETS: usize = 1024;
pub const DEFAULT_LINE_SIZE: u32 = 64;

/// Default filter geometry: 1024 sets, 1 way, 64 byte lines.
pub fn default_config() -> Result<cache::Config, cache::config::Error> {
    cache::Config::direct_mapped(DEFAULT_NUM_SETS, DEFAULT_LINE_SIZE)
}

#[derive(Debug, Clone)]
pub struct SnoopFilter {
    tag_array: TagArray,
    stats: stats::SnoopFilter,
}

impl SnoopFilter {
    #[must_use]
    pub fn new(config: cache::Config) -> Self {
        Self {
            tag_array: TagArray::new(config),
            stats: stats::SnoopFilter::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &stats::SnoopFilter {
        &self.stats
    }

    #[must_use]
    pub fn contains(&self, addr: address) -> bool {
        self.tag_array.find(addr).is_some()
    }

    /// Classify a snoop for `addr`.
    ///
    /// `cached` tells whether the real cache holds the line. A wasted lookup
    /// records the block so the next snoop for it is filtered.
    pub fn classify(&mut self, addr: address, cached: bool) -> Lookup {
        let lookup = if self.contains(addr) {
            Lookup::FILTERED
        } else if cached {
            Lookup::USEFUL
        } else {
            self.record(addr);
            Lookup::WASTED
        };
        log::debug!(
            "snoop_filter::classify({:#x}, cached={}) => {}",
            addr,
            cached,
            lookup
        );
        self.stats.inc(lookup);
        lookup
    }

    /// Insert (or refresh) an entry for `addr`.
    pub fn record(&mut self, addr: address) {
        let status = self.tag_array.fill(addr);
        self.tag_array.get_mut(status.index).state = State::MODIFIED;
    }

    /// Drop a stale entry for `addr`, if any.
    ///
    /// Called when the owning cache allocates the block again.
    pub fn invalidate(&mut self, addr: address) {
        if let Some(index) = self.tag_array.find(addr) {
            self.tag_array.get_mut(index).invalidate();
        }
    }
}
