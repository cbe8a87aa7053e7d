//! Config construction/validation and host-list loading (spec §6).

mod config;
mod hostlist;

pub use config::{Color, Config, DEFAULT_MAX_JOBS, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_OUTPUT_LENGTH};
pub use hostlist::load_hosts;
