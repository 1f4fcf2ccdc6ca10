use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sim {
    /// trace events applied to the caches
    pub events: u64,
    /// trace events dropped because they named an unknown processor
    pub skipped_events: u64,
}

impl std::ops::AddAssign for Sim {
    fn add_assign(&mut self, other: Self) {
        self.events += other.events;
        self.skipped_events += other.skipped_events;
    }
}
