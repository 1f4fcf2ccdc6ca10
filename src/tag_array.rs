use super::{address, cache};
use cache::block::{Line, State};

pub trait CacheAddressTranslation: std::fmt::Debug + Sync + Send + 'static {
    /// Compute cache line tag for an address.
    #[must_use]
    fn tag(&self, addr: address) -> address;

    /// Compute set index for an address.
    #[must_use]
    fn set_index(&self, addr: address) -> usize;

    /// Compute the block address a tag was derived from.
    #[must_use]
    fn block_addr(&self, tag: address) -> address;
}

/// Linear set indexing on the shifted block address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Linear {
    line_size_log2: u32,
    set_index_mask: u64,
}

impl Linear {
    #[must_use]
    pub fn new(config: &cache::Config) -> Self {
        Self {
            line_size_log2: config.line_size_log2,
            set_index_mask: config.set_index_mask(),
        }
    }
}

impl CacheAddressTranslation for Linear {
    #[inline]
    fn tag(&self, addr: address) -> address {
        // The tag keeps the set index bits.
        // Lookups compare the full block address, so this is consistent.
        addr >> self.line_size_log2
    }

    #[inline]
    fn set_index(&self, addr: address) -> usize {
        (self.tag(addr) & self.set_index_mask) as usize
    }

    #[inline]
    fn block_addr(&self, tag: address) -> address {
        tag << self.line_size_log2
    }
}

#[derive(Debug, Clone, Default, Hash, PartialEq, Eq)]
pub struct EvictedBlockInfo {
    pub tag: address,
    pub block_addr: address,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessStatus {
    pub index: usize,
    pub writeback: bool,
    pub evicted: Option<EvictedBlockInfo>,
}

/// Set-associative tag array.
///
/// All `num_sets x associativity` lines live in one flat buffer, way `w` of
/// set `s` is stored at `s * associativity + w`.
#[derive(Debug, Clone)]
pub struct TagArray<T = Linear> {
    lines: Vec<Line>,
    /// Per-array recency clock, advanced once per local access.
    cycle: u64,
    config: cache::Config,
    addr_translation: T,
}

impl TagArray<Linear> {
    #[must_use]
    pub fn new(config: cache::Config) -> Self {
        let addr_translation = Linear::new(&config);
        Self::with_translation(config, addr_translation)
    }
}

impl<T> TagArray<T>
where
    T: CacheAddressTranslation,
{
    #[must_use]
    pub fn with_translation(config: cache::Config, addr_translation: T) -> Self {
        let lines = (0..config.total_lines).map(|_| Line::default()).collect();
        Self {
            lines,
            cycle: 0,
            config,
            addr_translation,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &cache::Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advance the recency clock.
    #[inline]
    pub fn advance_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.cycle
    }

    /// Split an address into `(tag, set_index)`.
    #[inline]
    #[must_use]
    pub fn decompose(&self, addr: address) -> (address, usize) {
        (
            self.addr_translation.tag(addr),
            self.addr_translation.set_index(addr),
        )
    }

    #[inline]
    fn set_range(&self, set_index: usize) -> std::ops::Range<usize> {
        let start = set_index * self.config.associativity;
        start..start + self.config.associativity
    }

    /// The ways of a single set.
    #[must_use]
    pub fn set(&self, set_index: usize) -> &[Line] {
        &self.lines[self.set_range(set_index)]
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &Line {
        &self.lines[index]
    }

    #[inline]
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut Line {
        &mut self.lines[index]
    }

    /// Look up the valid line holding `addr`.
    ///
    /// # Returns
    /// The flat line index of the lowest matching way.
    #[must_use]
    pub fn find(&self, addr: address) -> Option<usize> {
        let (tag, set_index) = self.decompose(addr);
        let found = self
            .set_range(set_index)
            .find(|&idx| self.lines[idx].is_valid() && self.lines[idx].tag == tag);
        log::trace!(
            "tag_array::find({:#x}) set={} tag={:#x} => {:?}",
            addr,
            set_index,
            tag,
            found
        );
        found
    }

    /// Coherence state of `addr`, `INVALID` if not present.
    #[must_use]
    pub fn state_of(&self, addr: address) -> State {
        self.find(addr)
            .map_or(State::INVALID, |idx| self.lines[idx].state)
    }

    /// Mark a line as most recently used.
    #[inline]
    pub fn touch(&mut self, index: usize) {
        let cycle = self.cycle;
        self.lines[index].set_last_access_time(cycle);
    }

    /// Choose the replacement candidate for `addr` and make it most recently used.
    ///
    /// The lowest invalid way wins. Otherwise the way with the oldest access
    /// time is chosen, the highest way among equally old ones.
    pub fn select_victim(&mut self, addr: address) -> usize {
        let (_, set_index) = self.decompose(addr);
        let range = self.set_range(set_index);

        let invalid_line = range.clone().find(|&idx| !self.lines[idx].is_valid());
        let victim = invalid_line.unwrap_or_else(|| {
            let mut valid_line = range.start;
            let mut valid_time = u64::MAX;
            for idx in range {
                let time = self.lines[idx].last_access_time;
                if time <= valid_time {
                    valid_time = time;
                    valid_line = idx;
                }
            }
            valid_line
        });

        log::trace!(
            "tag_array::select_victim({:#x}) set={} invalid={:?} => line[{}]={}",
            addr,
            set_index,
            invalid_line,
            victim,
            self.lines[victim]
        );
        self.touch(victim);
        victim
    }

    /// Allocate a line for `addr`, evicting the victim.
    ///
    /// The returned line is `INVALID` and tagged for `addr`.
    pub fn fill(&mut self, addr: address) -> AccessStatus {
        let index = self.select_victim(addr);
        let tag = self.addr_translation.tag(addr);
        let line = &mut self.lines[index];

        let writeback = line.is_modified();
        let evicted = writeback.then(|| EvictedBlockInfo {
            tag: line.tag,
            block_addr: self.addr_translation.block_addr(line.tag),
        });

        log::trace!(
            "tag_array::fill(cache={}, tag={:#x}, writeback={})",
            index,
            tag,
            writeback,
        );
        line.allocate(tag);

        AccessStatus {
            index,
            writeback,
            evicted,
        }
    }
}
