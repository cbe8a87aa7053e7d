//! `Config` (spec §6): the options the core orchestrator consumes.

use clap::ValueEnum;
use fleet_core::{ConfigError, Mode};

/// ANSI colorization policy (an external collaborator per spec §1; the
/// actual color codes live in `fleet-ssh::color`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Color {
    #[default]
    Auto,
    On,
    Off,
}

pub const DEFAULT_MAX_JOBS: u32 = 16;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub anonymous: bool,
    pub exit_codes: bool,
    pub silent: bool,
    pub trim: bool,
    pub debug: bool,
    pub color: Color,
    pub max_jobs: u32,
    pub max_line_length: usize,
    pub max_output_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            anonymous: false,
            exit_codes: false,
            silent: false,
            trim: false,
            debug: false,
            color: Color::default(),
            max_jobs: DEFAULT_MAX_JOBS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
        }
    }
}

impl Config {
    /// Validate option values and cross-option compatibility (spec §6: JOIN
    /// is mutually exclusive with silent and with anonymous).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_jobs == 0 {
            return Err(ConfigError::InvalidMaxJobs(self.max_jobs));
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::InvalidMaxLineLength(self.max_line_length));
        }
        if self.max_output_length == 0 {
            return Err(ConfigError::InvalidMaxOutputLength(self.max_output_length));
        }
        if self.mode == Mode::Join {
            if self.silent {
                return Err(ConfigError::JoinIncompatibleWith("silent"));
            }
            if self.anonymous {
                return Err(ConfigError::JoinIncompatibleWith("anonymous"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_max_jobs_is_rejected() {
        let config = Config {
            max_jobs: 0,
            ..Config::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidMaxJobs(0)
        );
    }

    #[test]
    fn join_and_silent_are_incompatible() {
        let config = Config {
            mode: Mode::Join,
            silent: true,
            ..Config::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::JoinIncompatibleWith("silent")
        );
    }

    #[test]
    fn join_and_anonymous_are_incompatible() {
        let config = Config {
            mode: Mode::Join,
            anonymous: true,
            ..Config::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::JoinIncompatibleWith("anonymous")
        );
    }

    #[test]
    fn join_alone_is_fine() {
        let config = Config {
            mode: Mode::Join,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
