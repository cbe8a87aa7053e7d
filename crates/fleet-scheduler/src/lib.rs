//! Bounded-parallelism scheduler, the three output disciplines, and the
//! JOIN-mode equivalence-class aggregator (spec §4.4, §4.6, §4.7).

pub mod join;
pub mod scheduler;
pub mod sink;

pub use join::{JoinClass, classify, format_report};
pub use scheduler::{RunOutcome, run};
pub use sink::Sink;
