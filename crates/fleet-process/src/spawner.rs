//! ChildSpawner (spec §4.2): wires a child's output pipes per `Mode` and
//! execs the host's argv.

use crate::pipe::create_pipe;
use anyhow::{Context, Result, bail};
use fleet_core::{Child as CoreChild, Clock, Mode, Stdio as CoreStdio};
use std::process::Stdio as StdStdio;
use tokio::net::unix::pipe::Receiver;
use tokio::process::{Child as TokioChild, Command};
use tracing::debug;

/// The child's output descriptor(s), already async-registered.
pub enum ChildReaders {
    /// `LINE`/`GROUP`: separate stdout and stderr pipes.
    Split { stdout: Receiver, stderr: Receiver },
    /// `JOIN`: one pipe fed by both stdout and stderr.
    Merged { stdio: Receiver },
}

pub struct SpawnedChild {
    pub core: CoreChild,
    pub process: TokioChild,
    pub readers: ChildReaders,
}

fn build_command(argv: &[String]) -> Command {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.stdin(StdStdio::null());
    cmd.kill_on_drop(true);
    cmd
}

/// Spawn a child executing `argv` for one host, wiring its output pipes
/// according to `mode`.
///
/// `JOIN` gets both stdout and stderr dup'd onto the *same* pipe by handing
/// `Command` two cloned copies of one pipe's write end — the two descriptors
/// the child inherits as fd 1 and fd 2 both point at the one pipe, so writes
/// interleave in true kernel order rather than by read-loop scheduling.
#[tracing::instrument(skip_all, fields(program = %argv.first().map(String::as_str).unwrap_or("")))]
pub async fn spawn(argv: &[String], mode: Mode, clock: &dyn Clock) -> Result<SpawnedChild> {
    if argv.is_empty() {
        bail!("argv must contain at least a program name");
    }

    let mut cmd = build_command(argv);

    let (readers, core_stdio) = match mode {
        Mode::Join => {
            let merged = create_pipe().context("creating merged stdio pipe")?;
            let dup = merged
                .writer
                .try_clone()
                .context("duplicating merged pipe write end")?;
            cmd.stdout(StdStdio::from(std::fs::File::from(merged.writer)));
            cmd.stderr(StdStdio::from(std::fs::File::from(dup)));
            (ChildReaders::Merged { stdio: merged.reader }, CoreStdio::merged())
        }
        Mode::Line | Mode::Group => {
            let stdout_pipe = create_pipe().context("creating stdout pipe")?;
            let stderr_pipe = create_pipe().context("creating stderr pipe")?;
            cmd.stdout(StdStdio::from(std::fs::File::from(stdout_pipe.writer)));
            cmd.stderr(StdStdio::from(std::fs::File::from(stderr_pipe.writer)));
            (
                ChildReaders::Split {
                    stdout: stdout_pipe.reader,
                    stderr: stderr_pipe.reader,
                },
                CoreStdio::split(),
            )
        }
    };

    let started_ms = clock.now_ms();
    let process = cmd
        .spawn()
        .with_context(|| format!("failed to spawn '{}'", argv[0]))?;
    let pid = process.id().unwrap_or(0);

    debug!(pid, ?mode, "spawned child");

    Ok(SpawnedChild {
        core: CoreChild::new(pid, started_ms, core_stdio),
        process,
        readers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::MonotonicClock;

    #[tokio::test]
    async fn spawn_line_mode_gives_split_pipes_and_a_pid() {
        let argv = vec!["true".to_string()];
        let spawned = spawn(&argv, Mode::Line, &MonotonicClock).await.unwrap();
        assert!(spawned.core.pid() > 0);
        assert!(matches!(spawned.readers, ChildReaders::Split { .. }));
    }

    #[tokio::test]
    async fn spawn_join_mode_gives_one_merged_pipe() {
        let argv = vec!["true".to_string()];
        let spawned = spawn(&argv, Mode::Join, &MonotonicClock).await.unwrap();
        assert!(matches!(spawned.readers, ChildReaders::Merged { .. }));
    }

    #[tokio::test]
    async fn empty_argv_is_rejected() {
        let argv: Vec<String> = vec![];
        let err = spawn(&argv, Mode::Line, &MonotonicClock).await.unwrap_err();
        assert!(err.to_string().contains("argv"));
    }
}
