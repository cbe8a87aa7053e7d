//! Error taxonomy (spec §7). `ChildFailure` and `OversizeInput` are handled
//! inline by the components that hit them and are not part of this enum.

#[derive(thiserror::Error, Debug)]
pub enum FleetError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn child for host '{host}': {source}")]
    Spawn {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on host '{host}': {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

impl FleetError {
    /// Process exit code per spec §6: 2 for config/usage errors, 3 for
    /// everything else fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Spawn { .. } | Self::Io { .. } => 3,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host list must not be empty")]
    EmptyHostList,

    #[error("max_jobs must be at least 1, got {0}")]
    InvalidMaxJobs(u32),

    #[error("max_line_length must be at least 1, got {0}")]
    InvalidMaxLineLength(usize),

    #[error("max_output_length must be at least 1, got {0}")]
    InvalidMaxOutputLength(usize),

    #[error("JOIN mode is incompatible with {0}")]
    JoinIncompatibleWith(&'static str),
}
