//! ANSI colorization (spec §1: an external collaborator, out of the core's
//! scope) and terminal detection (spec §6).

use fleet_core::StreamKind;
use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";
const HOST_COLOR: &str = "\x1b[1;36m";
const OUT_COLOR: &str = "\x1b[32m";
const ERR_COLOR: &str = "\x1b[31m";

/// Whether standard output is a terminal, queried once at startup (spec §6).
pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Wraps host headers and stream bytes in ANSI codes when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn host_tag(&self, host: &str) -> String {
        if self.enabled {
            format!("{HOST_COLOR}[{host}]{RESET}")
        } else {
            format!("[{host}]")
        }
    }

    pub fn stream_prefix(&self, stream: StreamKind) -> &'static str {
        if !self.enabled {
            return "";
        }
        match stream {
            StreamKind::Err => ERR_COLOR,
            StreamKind::Out | StreamKind::Merged => OUT_COLOR,
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled { RESET } else { "" }
    }
}
