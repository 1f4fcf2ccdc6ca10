use serde::{Deserialize, Serialize};

/// Kind of a processor memory access.
#[derive(
    Debug,
    strum::EnumIter,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum AccessKind {
    READ,
    WRITE,
}

impl AccessKind {
    #[must_use]
    pub fn is_write(self) -> bool {
        match self {
            AccessKind::READ => false,
            AccessKind::WRITE => true,
        }
    }

    /// Parse the single character trace opcode (`r` or `w`).
    #[must_use]
    pub fn from_op(op: char) -> Option<Self> {
        match op {
            'r' => Some(AccessKind::READ),
            'w' => Some(AccessKind::WRITE),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AccessKind::READ => write!(f, "r"),
            AccessKind::WRITE => write!(f, "w"),
        }
    }
}
