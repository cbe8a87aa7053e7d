//! Argument parsing (spec §6): an external collaborator the core never
//! sees directly — `main` turns this into a `Config` plus a host list.

use clap::Parser;
use fleet_config::Color;
use fleet_core::Mode;

/// Build version string combining Cargo.toml version and git describe.
fn build_version() -> &'static str {
    static VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION.get_or_init(|| {
        let cargo_ver = env!("CARGO_PKG_VERSION");
        let git_desc = env!("FLEET_GIT_DESCRIBE");
        if git_desc.is_empty() {
            cargo_ver.to_string()
        } else {
            format!("{cargo_ver} ({git_desc})")
        }
    })
}

/// Run one command against a fleet of hosts in parallel.
#[derive(Parser)]
#[command(name = "fleet", version = build_version())]
#[command(about = "Run a command across many hosts in parallel, streaming their output")]
pub struct Cli {
    /// File listing one host per line; reads standard input if omitted
    #[arg(short = 'h', long = "hosts-file", value_name = "PATH")]
    pub hosts_file: Option<std::path::PathBuf>,

    /// Output discipline
    #[arg(long, value_enum, default_value = "line")]
    pub mode: Mode,

    /// Suppress the host-name header on each line/chunk
    #[arg(long)]
    pub anonymous: bool,

    /// Print a `[<host>] exited: <code> (<ms> ms)` line per host on completion
    #[arg(long)]
    pub exit_codes: bool,

    /// Discard all child output
    #[arg(long)]
    pub silent: bool,

    /// Truncate host names at the first `.` for display
    #[arg(long)]
    pub trim: bool,

    /// Verbose prelude and per-host exit lines
    #[arg(long)]
    pub debug: bool,

    /// ANSI colorization policy
    #[arg(long, value_enum, default_value = "auto")]
    pub color: Color,

    /// Maximum number of children running at once
    #[arg(long, default_value_t = fleet_config::DEFAULT_MAX_JOBS)]
    pub max_jobs: u32,

    /// Maximum buffered line length in LINE mode before a forced line break
    #[arg(long, default_value_t = fleet_config::DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,

    /// Maximum captured output size per host in JOIN mode
    #[arg(long, default_value_t = fleet_config::DEFAULT_MAX_OUTPUT_LENGTH)]
    pub max_output_length: usize,

    /// Remote command and its arguments
    #[arg(required = true, last = false, num_args = 1..)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_line_mode_with_no_color_flags() {
        let cli = Cli::parse_from(["fleet", "uptime"]);
        assert_eq!(cli.mode, Mode::Line);
        assert_eq!(cli.color, Color::Auto);
        assert_eq!(cli.max_jobs, fleet_config::DEFAULT_MAX_JOBS);
        assert_eq!(cli.command, vec!["uptime"]);
    }

    #[test]
    fn parses_join_mode_and_a_multi_word_command() {
        let cli = Cli::parse_from(["fleet", "--mode", "join", "ls", "-la", "/tmp"]);
        assert_eq!(cli.mode, Mode::Join);
        assert_eq!(cli.command, vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn short_flag_sets_the_hosts_file() {
        let cli = Cli::parse_from(["fleet", "-h", "hosts.txt", "uptime"]);
        assert_eq!(cli.hosts_file, Some(std::path::PathBuf::from("hosts.txt")));
    }
}
