use serde::{Deserialize, Serialize};

/// Classification of a single snoop filter lookup.
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
pub enum Lookup {
    /// filter missed but the cache held the line: the snoop was needed
    USEFUL = 0,
    /// neither filter nor cache held the line
    WASTED,
    /// filter hit
    FILTERED,
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnoopFilter {
    pub useful: u64,
    pub wasted: u64,
    pub filtered: u64,
}

impl SnoopFilter {
    #[inline]
    pub fn inc(&mut self, lookup: Lookup) {
        match lookup {
            Lookup::USEFUL => self.useful += 1,
            Lookup::WASTED => self.wasted += 1,
            Lookup::FILTERED => self.filtered += 1,
        }
    }

    #[must_use]
    pub fn get(&self, lookup: Lookup) -> u64 {
        match lookup {
            Lookup::USEFUL => self.useful,
            Lookup::WASTED => self.wasted,
            Lookup::FILTERED => self.filtered,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.useful + self.wasted + self.filtered
    }
}

impl std::ops::AddAssign for SnoopFilter {
    fn add_assign(&mut self, other: Self) {
        self.useful += other.useful;
        self.wasted += other.wasted;
        self.filtered += other.filtered;
    }
}
