use super::snoop_filter::SnoopFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Coherence counters kept per private cache.
#[derive(
    Debug,
    strum::EnumIter,
    strum::Display,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Counter {
    READS = 0,
    READ_MISSES,
    WRITES,
    WRITE_MISSES,
    /// dirty lines written back to memory (eviction or downgrade)
    WRITEBACKS,
    /// misses served by a peer flush instead of memory
    CACHE_TO_CACHE_TRANSFERS,
    MEMORY_TRANSACTIONS,
    INTERVENTIONS,
    INVALIDATIONS,
    FLUSHES,
    BUS_READ_EXCLUSIVE,
    BUS_UPGRADE,
}

/// A single flattened counter value, as written to csv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    pub cache_id: usize,
    pub counter: Counter,
    pub value: u64,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    pub counters: HashMap<Counter, u64>,
    /// Only present for caches that run a snoop filter.
    pub snoop_filter: Option<SnoopFilter>,
}

impl Default for Cache {
    fn default() -> Self {
        let counters = Counter::iter().map(|counter| (counter, 0)).collect();
        Self {
            counters,
            snoop_filter: None,
        }
    }
}

impl std::ops::AddAssign for Cache {
    fn add_assign(&mut self, other: Self) {
        for (k, v) in other.counters {
            *self.counters.entry(k).or_insert(0) += v;
        }
        if let Some(other) = other.snoop_filter {
            *self.snoop_filter.get_or_insert_with(SnoopFilter::default) += other;
        }
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut counters: Vec<_> = self
            .counters
            .iter()
            .filter(|(_, &count)| count > 0)
            .collect();
        counters.sort_by_key(|(counter, _)| **counter);

        let mut out = f.debug_struct("CacheStats");
        for (counter, count) in counters {
            out.field(&counter.to_string(), count);
        }
        if let Some(ref filter) = self.snoop_filter {
            out.field("snoop_filter", filter);
        }
        out.finish_non_exhaustive()
    }
}

impl Cache {
    #[inline]
    pub fn inc(&mut self, counter: Counter, count: u64) {
        *self.counters.entry(counter).or_insert(0) += count;
    }

    #[inline]
    #[must_use]
    pub fn get(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_accesses(&self) -> u64 {
        self.get(Counter::READS) + self.get(Counter::WRITES)
    }

    #[must_use]
    pub fn total_misses(&self) -> u64 {
        self.get(Counter::READ_MISSES) + self.get(Counter::WRITE_MISSES)
    }

    /// Miss rate in percent, recomputed from the raw counters.
    ///
    /// A cache that saw no accesses has a miss rate of zero.
    #[must_use]
    pub fn miss_rate(&self) -> f64 {
        let accesses = self.total_accesses();
        if accesses == 0 {
            return 0.0;
        }
        self.total_misses() as f64 / accesses as f64 * 100.0
    }

    #[must_use]
    pub fn flatten(&self, cache_id: usize) -> Vec<CsvRow> {
        Counter::iter()
            .map(|counter| CsvRow {
                cache_id,
                counter,
                value: self.get(counter),
            })
            .collect()
    }
}

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerCache(pub HashMap<usize, Cache>);

impl PerCache {
    pub fn into_inner(self) -> HashMap<usize, Cache> {
        self.0
    }

    #[must_use]
    pub fn flatten(&self) -> Vec<CsvRow> {
        let mut ids: Vec<_> = self.0.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .flat_map(|id| self.0[&id].flatten(id))
            .collect()
    }

    #[must_use]
    pub fn total_accesses(&self) -> u64 {
        self.reduce().total_accesses()
    }

    #[must_use]
    pub fn reduce(&self) -> Cache {
        let mut out = Cache::default();
        for stats in self.0.values() {
            out += stats.clone();
        }
        out
    }
}

impl std::ops::Deref for PerCache {
    type Target = HashMap<usize, Cache>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for PerCache {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Cache, Counter, PerCache};

    #[test]
    fn test_miss_rate_from_raw_counters() {
        let mut stats = Cache::default();
        assert_eq!(stats.miss_rate(), 0.0);

        stats.inc(Counter::READS, 6);
        stats.inc(Counter::WRITES, 2);
        stats.inc(Counter::READ_MISSES, 1);
        stats.inc(Counter::WRITE_MISSES, 1);
        assert_eq!(stats.total_accesses(), 8);
        assert_eq!(stats.miss_rate(), 25.0);
    }

    #[test]
    fn test_reduce_per_cache() {
        let mut a = Cache::default();
        a.inc(Counter::INVALIDATIONS, 2);
        let mut b = Cache::default();
        b.inc(Counter::INVALIDATIONS, 3);
        b.inc(Counter::FLUSHES, 1);

        let per_cache = PerCache([(0, a), (1, b)].into_iter().collect());
        let total = per_cache.reduce();
        assert_eq!(total.get(Counter::INVALIDATIONS), 5);
        assert_eq!(total.get(Counter::FLUSHES), 1);
        assert_eq!(total.get(Counter::READS), 0);
    }

    #[test]
    fn test_flatten_is_ordered_by_cache_then_counter() {
        let mut a = Cache::default();
        a.inc(Counter::READS, 4);
        let per_cache = PerCache([(1, Cache::default()), (0, a)].into_iter().collect());
        let rows = per_cache.flatten();
        assert_eq!(rows.len(), 2 * 12);
        assert_eq!(rows[0].cache_id, 0);
        assert_eq!(rows[0].counter, Counter::READS);
        assert_eq!(rows[0].value, 4);
        assert_eq!(rows[12].cache_id, 1);
    }

    #[test]
    fn test_serialize_json() {
        let mut stats = Cache::default();
        stats.inc(Counter::BUS_UPGRADE, 7);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["counters"]["BUS_UPGRADE"], 7);
        assert!(json["snoop_filter"].is_null());
    }
}
