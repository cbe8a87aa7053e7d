//! Scheduler (spec §4.6): the bounded-parallelism main loop tying
//! `ChildSpawner`, `StreamReader`, and `Reaper` (all in `fleet-process`)
//! together with `OutputSink` and, for `JOIN`, `JoinAggregator`.
//!
//! The single-threaded readiness loop spec.md describes is realized here as
//! one task per host, bounded by a `tokio::task::JoinSet` capped at
//! `max_jobs` concurrently outstanding (spec §9 DESIGN NOTES sanctions this
//! as an alternative to a literal epoll loop, provided writes to standard
//! output are serialized — which the `Sink` mutex guarantees).

use crate::join;
use crate::sink::Sink;
use fleet_config::Config;
use fleet_core::{Child, Clock, FleetError, Host, HostList, Mode, StreamKind};
use fleet_process::{ChildReaders, SpawnedChild, drain_chunks, drain_join, drain_lines, reap, spawn};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Name of the orchestrating program, used in JOIN's progress line.
const PROG_NAME: &str = "fleet";

/// What the scheduler produced: how many of the hosts completed, and (JOIN
/// only) the rendered equivalence-class report.
pub struct RunOutcome {
    pub done: usize,
    pub total: usize,
    pub join_report: Option<String>,
}

fn to_io_error(err: anyhow::Error) -> std::io::Error {
    match err.downcast::<std::io::Error>() {
        Ok(io_err) => io_err,
        Err(err) => std::io::Error::other(err.to_string()),
    }
}

/// Drains one spawned child to completion and reaps it: the per-host
/// realization of StreamReader + Reaper (spec §4.3, §4.5).
#[tracing::instrument(skip_all, fields(host = %display_name))]
async fn run_host<W: Write + Send + 'static>(
    index: usize,
    display_name: String,
    argv: Vec<String>,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    sink: Arc<Mutex<Sink<W>>>,
) -> Result<(usize, Child), FleetError> {
    let mode = config.mode;
    let SpawnedChild {
        mut core,
        process,
        readers,
    } = spawn(&argv, mode, clock.as_ref())
        .await
        .map_err(|err| FleetError::Spawn {
            host: display_name.clone(),
            source: to_io_error(err),
        })?;

    match readers {
        ChildReaders::Split {
            mut stdout,
            mut stderr,
        } => {
            let max_line_length = config.max_line_length;
            let silent = config.silent;
            let line_mode = mode == Mode::Line;

            let out_sink = Arc::clone(&sink);
            let out_name = display_name.clone();
            let out_fut = async move {
                if line_mode {
                    drain_lines(&mut stdout, max_line_length, silent, |line| {
                        out_sink.lock().unwrap().emit_line(&out_name, StreamKind::Out, &line);
                    })
                    .await
                } else {
                    drain_chunks(&mut stdout, silent, |chunk| {
                        out_sink.lock().unwrap().emit_chunk(&out_name, StreamKind::Out, &chunk);
                    })
                    .await
                }
            };

            let err_sink = Arc::clone(&sink);
            let err_name = display_name.clone();
            let err_fut = async move {
                if line_mode {
                    drain_lines(&mut stderr, max_line_length, silent, |line| {
                        err_sink.lock().unwrap().emit_line(&err_name, StreamKind::Err, &line);
                    })
                    .await
                } else {
                    drain_chunks(&mut stderr, silent, |chunk| {
                        err_sink.lock().unwrap().emit_chunk(&err_name, StreamKind::Err, &chunk);
                    })
                    .await
                }
            };

            let (out_res, err_res) = tokio::join!(out_fut, err_fut);
            out_res.map_err(|source| FleetError::Io {
                host: display_name.clone(),
                source,
            })?;
            err_res.map_err(|source| FleetError::Io {
                host: display_name.clone(),
                source,
            })?;
            core.stdio_mut().close(StreamKind::Out);
            core.stdio_mut().close(StreamKind::Err);
        }
        ChildReaders::Merged { mut stdio } => {
            let output = drain_join(&mut stdio, config.max_output_length)
                .await
                .map_err(|source| FleetError::Io {
                    host: display_name.clone(),
                    source,
                })?;
            core.set_output(output);
            core.stdio_mut().close(StreamKind::Merged);
        }
    }

    let reaped = reap(process, clock.as_ref()).await.map_err(|source| FleetError::Io {
        host: display_name.clone(),
        source,
    })?;
    core.mark_reaped(reaped.exit_code, reaped.finished_ms);

    if reaped.exit_code != 0 {
        debug!(exit_code = reaped.exit_code, "host finished with a nonzero exit code");
    }

    if config.exit_codes || config.debug {
        let delta_ms = reaped.finished_ms.saturating_sub(core.started_ms());
        sink.lock()
            .unwrap()
            .emit_exit_line(&display_name, reaped.exit_code, delta_ms);
    }

    Ok((index, core))
}

/// Run the fleet: fan out `command` against every host in `hosts`, present
/// their output per `config.mode`, and return the completion summary.
///
/// `build_argv` receives each host's *untrimmed* name (spec §4.6 Fill: the
/// child is spawned before the display-only trim is applied).
pub async fn run<W: Write + Send + 'static>(
    config: Config,
    mut hosts: HostList,
    command: Vec<String>,
    build_argv: impl Fn(&str, &[String]) -> Vec<String>,
    clock: Arc<dyn Clock>,
    sink: Arc<Mutex<Sink<W>>>,
    show_progress: bool,
) -> Result<RunOutcome, FleetError> {
    let config = Arc::new(config);
    let total = hosts.len();
    let max_jobs = config.max_jobs as usize;
    let is_join = config.mode == Mode::Join;

    debug!(total, max_jobs, mode = ?config.mode, "starting fill/dispatch loop");

    let mut set: JoinSet<Result<(usize, Child), FleetError>> = JoinSet::new();
    let mut cursor = 0usize;
    let mut outstanding = 0usize;
    let mut done = 0usize;

    loop {
        while cursor < total && outstanding < max_jobs {
            let argv = {
                let host: &Host = hosts.get(cursor).expect("cursor stays in range");
                build_argv(host.name(), &command)
            };
            if config.trim {
                hosts.get_mut(cursor).expect("cursor stays in range").trim_name();
            }
            let display_name = hosts.get(cursor).expect("cursor stays in range").name().to_string();

            let index = cursor;
            let config = Arc::clone(&config);
            let clock = Arc::clone(&clock);
            let sink = Arc::clone(&sink);
            set.spawn(run_host(index, display_name, argv, config, clock, sink));

            cursor += 1;
            outstanding += 1;
        }

        let Some(joined) = set.join_next().await else {
            break;
        };
        let outcome = joined.expect("a host task panicked rather than returning");

        match outcome {
            Ok((index, child)) => {
                hosts
                    .get_mut(index)
                    .expect("index stays in range")
                    .attach_child(child);
                outstanding -= 1;
                done += 1;
                if show_progress {
                    sink.lock().unwrap().emit_progress(PROG_NAME, done, total);
                }
            }
            Err(err) => {
                warn!(error = %err, "fatal host error, aborting remaining tasks");
                set.abort_all();
                return Err(err);
            }
        }
    }

    debug!(done, total, "fill/dispatch loop finished");

    if show_progress {
        sink.lock().unwrap().finish_progress();
    }

    let join_report = if is_join {
        let classes = join::classify(&mut hosts);
        let report = join::format_report(&classes, total);
        sink.lock().unwrap().emit_report(&report);
        Some(report)
    } else {
        None
    };

    Ok(RunOutcome {
        done,
        total,
        join_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::MonotonicClock;
    use fleet_ssh::Painter;

    fn test_config(mode: Mode, max_jobs: u32) -> Config {
        Config {
            mode,
            max_jobs,
            ..Config::default()
        }
    }

    fn shell_argv(_host: &str, command: &[String]) -> Vec<String> {
        command.to_vec()
    }

    #[tokio::test]
    async fn bounded_parallelism_runs_every_host_exactly_once() {
        let hosts = HostList::new(vec!["a".into(), "b".into(), "c".into()]);
        let config = test_config(Mode::Line, 1);
        let sink = Arc::new(Mutex::new(Sink::new(Vec::new(), Painter::new(false), false)));
        let command = vec!["true".to_string()];
        let outcome = run(
            config,
            hosts,
            command,
            shell_argv,
            Arc::new(MonotonicClock),
            sink,
            false,
        )
        .await
        .unwrap();
        assert_eq!(outcome.done, 3);
        assert_eq!(outcome.total, 3);
    }

    #[tokio::test]
    async fn line_mode_interleaves_at_line_boundaries() {
        let hosts = HostList::new(vec!["a".into(), "b".into()]);
        let config = test_config(Mode::Line, 4);
        let sink = Arc::new(Mutex::new(Sink::new(Vec::new(), Painter::new(false), false)));
        let command = vec!["sh".to_string(), "-c".to_string(), "printf 'hello\\nworld\\n'".to_string()];
        run(
            config,
            hosts,
            command,
            shell_argv,
            Arc::new(MonotonicClock),
            Arc::clone(&sink),
            false,
        )
        .await
        .unwrap();
        let out = {
            let guard = sink.lock().unwrap();
            String::from_utf8(guard.get_ref().clone()).unwrap()
        };
        for expected in ["[a] hello", "[a] world", "[b] hello", "[b] world"] {
            assert!(out.contains(expected), "missing {expected:?} in {out:?}");
        }
        assert!(out.find("[a] hello").unwrap() < out.find("[a] world").unwrap());
        assert!(out.find("[b] hello").unwrap() < out.find("[b] world").unwrap());
    }

    #[tokio::test]
    async fn join_mode_reports_two_classes() {
        let hosts = HostList::new(vec!["a".into(), "b".into(), "c".into()]);
        let config = test_config(Mode::Join, 4);
        let sink = Arc::new(Mutex::new(Sink::new(Vec::new(), Painter::new(false), false)));
        let build_argv = |host: &str, _: &[String]| -> Vec<String> {
            let text = if host == "b" { "diff" } else { "same" };
            vec!["echo".to_string(), text.to_string()]
        };
        let outcome = run(
            config,
            hosts,
            vec![],
            build_argv,
            Arc::new(MonotonicClock),
            Arc::clone(&sink),
            false,
        )
        .await
        .unwrap();
        let report = outcome.join_report.unwrap();
        assert!(report.starts_with("finished with 2 unique result(s)\n"));
        assert!(report.contains("hosts (2/3): a c"));
        assert!(report.contains("hosts (1/3): b"));
    }

    #[tokio::test]
    async fn exit_codes_are_reported_without_affecting_the_run() {
        let hosts = HostList::new(vec!["a".into()]);
        let mut config = test_config(Mode::Line, 4);
        config.exit_codes = true;
        let sink = Arc::new(Mutex::new(Sink::new(Vec::new(), Painter::new(false), false)));
        let command = vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()];
        let outcome = run(
            config,
            hosts,
            command,
            shell_argv,
            Arc::new(MonotonicClock),
            Arc::clone(&sink),
            false,
        )
        .await
        .unwrap();
        assert_eq!(outcome.done, 1);
        let out = {
            let guard = sink.lock().unwrap();
            String::from_utf8(guard.get_ref().clone()).unwrap()
        };
        assert!(out.contains("[a] exited: 7"));
    }
}
