//! Coherence protocols.
//!
//! Every protocol is a pair of pure transition functions: one for accesses
//! issued by the local processor and one for requests snooped from the bus.
//! Both map the current line state and the event to the next state, the bus
//! message to emit and the counters to bump. The cache that owns the line
//! applies the result.

pub mod mesi;
pub mod msi;

use crate::cache::block::State;
use stats::cache::Counter;
use stats::mem::AccessKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown coherence protocol {0} (expected 0=MSI, 1=MSI BusUpgr, 2=MESI, 3=MESI Filter)")]
    Unknown(u32),
    #[error("invalid protocol selector {0:?}")]
    InvalidSelector(String),
}

#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Protocol {
    MSI = 0,
    MSI_BUS_UPGRADE,
    MESI,
    MESI_SNOOP_FILTER,
    /// Declared but not implemented.
    MOESI,
}

impl Protocol {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MSI => "MSI",
            Self::MSI_BUS_UPGRADE => "MSI BusUpgr",
            Self::MESI => "MESI",
            Self::MESI_SNOOP_FILTER => "MESI Filter",
            Self::MOESI => "MOESI",
        }
    }

    /// Whether the protocol can grant exclusive ownership on a read.
    ///
    /// Only these protocols take part in the global bus policy
    /// (exclusive promotion and transfer accounting).
    #[must_use]
    pub fn has_exclusive_state(self) -> bool {
        matches!(self, Self::MESI | Self::MESI_SNOOP_FILTER)
    }

    #[must_use]
    pub fn has_snoop_filter(self) -> bool {
        self == Self::MESI_SNOOP_FILTER
    }

    #[must_use]
    pub fn is_implemented(self) -> bool {
        self != Self::MOESI
    }

    /// Transition for an access issued by the local processor.
    ///
    /// `state` is the state found after lookup, `INVALID` on a miss.
    #[must_use]
    pub fn on_access(self, state: State, kind: AccessKind) -> Transition {
        match self {
            Self::MSI => msi::on_access(state, kind, msi::Variant::ReadExclusive),
            Self::MSI_BUS_UPGRADE => msi::on_access(state, kind, msi::Variant::BusUpgrade),
            Self::MESI | Self::MESI_SNOOP_FILTER => mesi::on_access(state, kind),
            Self::MOESI => Transition::stay(state),
        }
    }

    /// Transition for a request snooped from another cache.
    ///
    /// Only called for lines found valid in this cache.
    #[must_use]
    pub fn on_snoop(self, state: State, request: BusRequest) -> SnoopTransition {
        match self {
            Self::MSI => msi::on_snoop(state, request, msi::Variant::ReadExclusive),
            Self::MSI_BUS_UPGRADE => msi::on_snoop(state, request, msi::Variant::BusUpgrade),
            Self::MESI | Self::MESI_SNOOP_FILTER => mesi::on_snoop(state, request),
            Self::MOESI => SnoopTransition::ignore(state),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Selector used on the command line.
///
/// MOESI has no selector.
impl TryFrom<u32> for Protocol {
    type Error = Error;

    fn try_from(selector: u32) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Self::MSI),
            1 => Ok(Self::MSI_BUS_UPGRADE),
            2 => Ok(Self::MESI),
            3 => Ok(Self::MESI_SNOOP_FILTER),
            other => Err(Error::Unknown(other)),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = s
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidSelector(s.to_string()))?;
        Self::try_from(selector)
    }
}

/// Message broadcast on the shared bus.
#[derive(
    Debug,
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
pub enum BusRequest {
    UPGRADE = 0,
    READ,
    READ_EXCLUSIVE,
    FLUSH,
}

impl BusRequest {
    /// Whether the request fetches data from a peer or memory.
    #[must_use]
    pub fn fetches_data(self) -> bool {
        matches!(self, Self::READ | Self::READ_EXCLUSIVE)
    }
}

/// Result of a local access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: State,
    /// `None` if no bus transaction is needed.
    pub request: Option<BusRequest>,
    pub counters: &'static [Counter],
}

impl Transition {
    #[must_use]
    pub const fn stay(state: State) -> Self {
        Self {
            next: state,
            request: None,
            counters: &[],
        }
    }

    #[must_use]
    pub const fn to(next: State, request: Option<BusRequest>, counters: &'static [Counter]) -> Self {
        Self {
            next,
            request,
            counters,
        }
    }
}

/// Result of snooping a bus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnoopTransition {
    pub next: State,
    pub response: Option<BusRequest>,
    /// The line was held in a coherence relevant state.
    pub is_line_present: bool,
    /// The line lost ownership to another cache; snoop filters record it.
    pub lost_ownership: bool,
    pub counters: &'static [Counter],
}

impl SnoopTransition {
    #[must_use]
    pub const fn ignore(state: State) -> Self {
        Self {
            next: state,
            response: None,
            is_line_present: false,
            lost_ownership: false,
            counters: &[],
        }
    }
}
