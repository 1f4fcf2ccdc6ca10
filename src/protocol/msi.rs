//! MSI, with or without the bus upgrade optimization.
//!
//! MSI caches do not take part in the global bus policy, so they account
//! for their own memory transactions.

use super::{BusRequest, SnoopTransition, Transition};
use crate::cache::block::State;
use stats::cache::Counter::*;
use stats::mem::AccessKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// A write to a shared line refetches the block with `READ_EXCLUSIVE`.
    ReadExclusive,
    /// A write to a shared line only invalidates peers with `UPGRADE`.
    BusUpgrade,
}

#[must_use]
pub fn on_access(state: State, kind: AccessKind, variant: Variant) -> Transition {
    use BusRequest::{READ, READ_EXCLUSIVE, UPGRADE};
    match (state, kind) {
        (State::INVALID, AccessKind::READ) => {
            Transition::to(State::SHARED, Some(READ), &[MEMORY_TRANSACTIONS])
        }
        (State::INVALID, AccessKind::WRITE) => Transition::to(
            State::MODIFIED,
            Some(READ_EXCLUSIVE),
            &[BUS_READ_EXCLUSIVE, MEMORY_TRANSACTIONS],
        ),
        (State::SHARED, AccessKind::WRITE) => match variant {
            Variant::ReadExclusive => Transition::to(
                State::MODIFIED,
                Some(READ_EXCLUSIVE),
                &[BUS_READ_EXCLUSIVE, MEMORY_TRANSACTIONS],
            ),
            Variant::BusUpgrade => Transition::to(State::MODIFIED, Some(UPGRADE), &[BUS_UPGRADE]),
        },
        // read hits and anything modified stay put
        (state, _) => Transition::stay(state),
    }
}

#[must_use]
pub fn on_snoop(state: State, request: BusRequest, variant: Variant) -> SnoopTransition {
    let invalidated_by_upgrade = variant == Variant::BusUpgrade && request == BusRequest::UPGRADE;
    match (state, request) {
        (State::SHARED, BusRequest::READ_EXCLUSIVE) => invalidate(state),
        (State::SHARED, BusRequest::UPGRADE) if invalidated_by_upgrade => invalidate(state),
        (State::MODIFIED, BusRequest::READ) => SnoopTransition {
            next: State::SHARED,
            response: Some(BusRequest::FLUSH),
            counters: &[INTERVENTIONS, FLUSHES, MEMORY_TRANSACTIONS, WRITEBACKS],
            ..SnoopTransition::ignore(state)
        },
        (State::MODIFIED, BusRequest::READ_EXCLUSIVE) => SnoopTransition {
            next: State::INVALID,
            response: Some(BusRequest::FLUSH),
            counters: &[INVALIDATIONS, FLUSHES, MEMORY_TRANSACTIONS, WRITEBACKS],
            ..SnoopTransition::ignore(state)
        },
        (state, _) => SnoopTransition::ignore(state),
    }
}

fn invalidate(state: State) -> SnoopTransition {
    SnoopTransition {
        next: State::INVALID,
        counters: &[INVALIDATIONS],
        ..SnoopTransition::ignore(state)
    }
}

#[cfg(test)]
mod tests {
    use super::{on_access, on_snoop, Variant};
    use crate::cache::block::State;
    use crate::protocol::BusRequest;
    use stats::cache::Counter;
    use stats::mem::AccessKind;

    #[test]
    fn test_read_miss_fetches_shared() {
        for variant in [Variant::ReadExclusive, Variant::BusUpgrade] {
            let transition = on_access(State::INVALID, AccessKind::READ, variant);
            assert_eq!(transition.next, State::SHARED);
            assert_eq!(transition.request, Some(BusRequest::READ));
            assert_eq!(transition.counters, &[Counter::MEMORY_TRANSACTIONS]);
        }
    }

    #[test]
    fn test_shared_write() {
        let transition = on_access(State::SHARED, AccessKind::WRITE, Variant::ReadExclusive);
        assert_eq!(transition.next, State::MODIFIED);
        assert_eq!(transition.request, Some(BusRequest::READ_EXCLUSIVE));
        assert_eq!(
            transition.counters,
            &[Counter::BUS_READ_EXCLUSIVE, Counter::MEMORY_TRANSACTIONS]
        );

        let transition = on_access(State::SHARED, AccessKind::WRITE, Variant::BusUpgrade);
        assert_eq!(transition.next, State::MODIFIED);
        assert_eq!(transition.request, Some(BusRequest::UPGRADE));
        assert_eq!(transition.counters, &[Counter::BUS_UPGRADE]);
    }

    #[test]
    fn test_shared_read_hit_is_silent() {
        let transition = on_access(State::SHARED, AccessKind::READ, Variant::ReadExclusive);
        assert_eq!(transition.next, State::SHARED);
        assert_eq!(transition.request, None);
    }

    #[test]
    fn test_modified_snooped_read_flushes() {
        let snoop = on_snoop(State::MODIFIED, BusRequest::READ, Variant::ReadExclusive);
        assert_eq!(snoop.next, State::SHARED);
        assert_eq!(snoop.response, Some(BusRequest::FLUSH));
        assert!(!snoop.is_line_present);
        assert!(snoop.counters.contains(&Counter::INTERVENTIONS));
        assert!(snoop.counters.contains(&Counter::WRITEBACKS));
    }

    #[test]
    fn test_upgrade_only_invalidates_with_bus_upgrade() {
        let snoop = on_snoop(State::SHARED, BusRequest::UPGRADE, Variant::BusUpgrade);
        assert_eq!(snoop.next, State::INVALID);
        assert_eq!(snoop.counters, &[Counter::INVALIDATIONS]);
        assert_eq!(snoop.response, None);

        let snoop = on_snoop(State::SHARED, BusRequest::UPGRADE, Variant::ReadExclusive);
        assert_eq!(snoop.next, State::SHARED);
        assert!(snoop.counters.is_empty());
    }

    #[test]
    fn test_shared_snooped_read_is_ignored() {
        let snoop = on_snoop(State::SHARED, BusRequest::READ, Variant::BusUpgrade);
        assert_eq!(snoop, super::SnoopTransition::ignore(State::SHARED));
    }
}
