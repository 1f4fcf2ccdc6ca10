#![allow(non_camel_case_types, clippy::upper_case_acronyms)]

pub mod cache;
pub mod mem;
pub mod sim;
pub mod snoop_filter;

pub use cache::{Cache, PerCache};
pub use sim::Sim;
pub use snoop_filter::SnoopFilter;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub sim: Sim,
    pub caches: PerCache,
}

impl Stats {
    #[must_use]
    pub fn new(num_caches: usize) -> Self {
        let caches = (0..num_caches).map(|id| (id, Cache::default())).collect();
        Self {
            sim: Sim::default(),
            caches: PerCache(caches),
        }
    }

    /// Per-cache stats ordered by cache id.
    #[must_use]
    pub fn ordered(&self) -> Vec<(usize, &Cache)> {
        let mut caches: Vec<_> = self.caches.iter().map(|(id, cache)| (*id, cache)).collect();
        caches.sort_by_key(|(id, _)| *id);
        caches
    }
}

impl std::ops::AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.sim += other.sim;
        for (id, cache) in other.caches.into_inner() {
            *self.caches.entry(id).or_default() += cache;
        }
    }
}
