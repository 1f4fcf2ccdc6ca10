#![allow(
    clippy::upper_case_acronyms,
    non_camel_case_types,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

//! Trace driven simulator of snooping cache coherence protocols on a
//! shared-bus multiprocessor.

pub mod bus;
pub mod cache;
pub mod config;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod protocol;
pub mod report;
pub mod sim;
pub mod snoop_filter;
pub mod tag_array;
pub mod trace;

#[cfg(test)]
pub mod testing;

pub use config::Config;
pub use protocol::Protocol;
pub use sim::Simulator;

pub type address = u64;
