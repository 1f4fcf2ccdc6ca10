use crate::address;

/// Coherence state of a cache line.
///
/// `INVALID` doubles as the "slot unused" marker, there is no separate
/// valid bit.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum State {
    #[default]
    INVALID = 0,
    SHARED,
    EXCLUSIVE,
    MODIFIED,
    /// Declared for MOESI, never entered.
    OWNED,
}

impl State {
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != State::INVALID
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(self) -> bool {
        self == State::MODIFIED
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    /// Block address (`addr >> line_size_log2`), set index bits included.
    pub tag: address,
    pub state: State,
    pub last_access_time: u64,
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("tag", &format_args!("{:#x}", self.tag))
            .field("state", &self.state)
            .field("last_access", &self.last_access_time)
            .finish()
    }
}

impl Line {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.state.is_dirty()
    }

    #[inline]
    pub fn set_last_access_time(&mut self, time: u64) {
        self.last_access_time = time;
    }

    /// Reassign this slot to a new block.
    ///
    /// The line is left `INVALID`; the caller assigns the real state.
    #[inline]
    pub fn allocate(&mut self, tag: address) {
        self.tag = tag;
        self.state = State::INVALID;
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.state = State::INVALID;
    }
}
