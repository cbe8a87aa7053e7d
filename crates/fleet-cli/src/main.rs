mod cli;

use clap::Parser;
use cli::Cli;
use fleet_config::{Color, Config, load_hosts};
use fleet_core::{ConfigError, MonotonicClock};
use fleet_scheduler::Sink;
use fleet_ssh::{Painter, build_argv, stdout_is_terminal};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let config = Config {
        mode: cli.mode,
        anonymous: cli.anonymous,
        exit_codes: cli.exit_codes,
        silent: cli.silent,
        trim: cli.trim,
        debug: cli.debug,
        color: cli.color,
        max_jobs: cli.max_jobs,
        max_line_length: cli.max_line_length,
        max_output_length: cli.max_output_length,
    };

    if let Err(err) = config.validate() {
        eprintln!("fleet: {err}");
        return 2;
    }

    let hosts = match load_hosts(cli.hosts_file.as_deref()) {
        Ok(hosts) => hosts,
        Err(err) => {
            if let Some(config_err) = err.downcast_ref::<ConfigError>() {
                eprintln!("fleet: {config_err}");
                return 2;
            }
            eprintln!("fleet: {err:#}");
            return 3;
        }
    };

    let is_terminal = stdout_is_terminal();
    let color_enabled = match config.color {
        Color::Auto => is_terminal,
        Color::On => true,
        Color::Off => false,
    };
    let show_progress = config.mode == fleet_core::Mode::Join && is_terminal && !config.silent;

    let sink = Arc::new(Mutex::new(Sink::new(
        std::io::stdout(),
        Painter::new(color_enabled),
        config.anonymous,
    )));
    let clock = Arc::new(MonotonicClock);

    if config.debug {
        tracing::debug!(?config, hosts = hosts.len(), "starting run");
    }

    let outcome = fleet_scheduler::run(
        config,
        hosts,
        cli.command,
        build_argv,
        clock,
        sink,
        show_progress,
    )
    .await;

    match outcome {
        Ok(outcome) => {
            tracing::debug!(done = outcome.done, total = outcome.total, "run finished");
            0
        }
        Err(err) => {
            eprintln!("fleet: {err}");
            err.exit_code()
        }
    }
}
