//! MESI with bus upgrades.
//!
//! Memory transactions and cache-to-cache transfers of a requester are
//! decided by the bus once all peers responded, see [`crate::bus`].
//! A line read without any peer holding it is promoted to `EXCLUSIVE` there.

use super::{BusRequest, SnoopTransition, Transition};
use crate::cache::block::State;
use stats::cache::Counter::*;
use stats::mem::AccessKind;

#[must_use]
pub fn on_access(state: State, kind: AccessKind) -> Transition {
    use BusRequest::{READ, READ_EXCLUSIVE, UPGRADE};
    match (state, kind) {
        (State::INVALID, AccessKind::READ) => Transition::to(State::SHARED, Some(READ), &[]),
        (State::INVALID, AccessKind::WRITE) => {
            Transition::to(State::MODIFIED, Some(READ_EXCLUSIVE), &[BUS_READ_EXCLUSIVE])
        }
        (State::SHARED, AccessKind::WRITE) => {
            Transition::to(State::MODIFIED, Some(UPGRADE), &[BUS_UPGRADE])
        }
        (State::EXCLUSIVE, AccessKind::WRITE) => Transition::to(State::MODIFIED, None, &[]),
        (state, _) => Transition::stay(state),
    }
}

#[must_use]
pub fn on_snoop(state: State, request: BusRequest) -> SnoopTransition {
    use BusRequest::{FLUSH, READ, READ_EXCLUSIVE, UPGRADE};
    let present = SnoopTransition {
        is_line_present: true,
        ..SnoopTransition::ignore(state)
    };
    match (state, request) {
        // a shared copy answers reads but is never dirty
        (State::SHARED, READ) => SnoopTransition {
            response: Some(FLUSH),
            ..present
        },
        (State::SHARED, READ_EXCLUSIVE) => SnoopTransition {
            next: State::INVALID,
            response: Some(FLUSH),
            lost_ownership: true,
            counters: &[INVALIDATIONS],
            ..present
        },
        (State::SHARED, UPGRADE) => SnoopTransition {
            next: State::INVALID,
            lost_ownership: true,
            counters: &[INVALIDATIONS],
            ..present
        },
        (State::EXCLUSIVE, READ) => SnoopTransition {
            next: State::SHARED,
            response: Some(FLUSH),
            counters: &[INTERVENTIONS],
            ..present
        },
        (State::EXCLUSIVE, READ_EXCLUSIVE) => SnoopTransition {
            next: State::INVALID,
            response: Some(FLUSH),
            lost_ownership: true,
            counters: &[INVALIDATIONS],
            ..present
        },
        (State::MODIFIED, READ) => SnoopTransition {
            next: State::SHARED,
            response: Some(FLUSH),
            counters: &[INTERVENTIONS, FLUSHES, MEMORY_TRANSACTIONS, WRITEBACKS],
            ..present
        },
        (State::MODIFIED, READ_EXCLUSIVE) => SnoopTransition {
            next: State::INVALID,
            response: Some(FLUSH),
            lost_ownership: true,
            counters: &[INVALIDATIONS, FLUSHES, MEMORY_TRANSACTIONS, WRITEBACKS],
            ..present
        },
        (State::SHARED | State::EXCLUSIVE | State::MODIFIED, _) => present,
        (state, _) => SnoopTransition::ignore(state),
    }
}
