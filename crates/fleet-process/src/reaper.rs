//! Reaper (spec §4.5): waits on a completed child and records its exit.

use fleet_core::Clock;
use tokio::process::Child as TokioChild;
use tracing::{debug, warn};

pub struct ReapResult {
    pub exit_code: i32,
    pub finished_ms: u64,
}

/// Wait for `process` to exit and record the outcome. Must only be called
/// after `child_stdio_done` holds (spec §4.5) — by that point the child has
/// closed all its output descriptors and is typically already exiting, so
/// the blocking wait is bounded in practice (§5 Suspension points).
#[tracing::instrument(skip_all, fields(pid = process.id()))]
pub async fn reap(mut process: TokioChild, clock: &dyn Clock) -> std::io::Result<ReapResult> {
    let status = process.wait().await?;
    let finished_ms = clock.now_ms();

    let exit_code = status.code().unwrap_or_else(|| {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            match status.signal() {
                Some(sig) => {
                    warn!(signal = sig, "child terminated by signal, reporting 128 + signal");
                    128 + sig
                }
                None => {
                    warn!("child exit carried neither a code nor a signal, reporting 1");
                    1
                }
            }
        }
        #[cfg(not(unix))]
        {
            1
        }
    });

    debug!(exit_code, finished_ms, "reaped child");

    Ok(ReapResult {
        exit_code,
        finished_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::MonotonicClock;
    use tokio::process::Command;

    #[tokio::test]
    async fn reap_records_a_nonzero_exit_code() {
        let child = Command::new("sh")
            .args(["-c", "exit 7"])
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let result = reap(child, &MonotonicClock).await.unwrap();
        assert_eq!(result.exit_code, 7);
    }

    #[tokio::test]
    async fn reap_records_success() {
        let child = Command::new("true").kill_on_drop(true).spawn().unwrap();
        let result = reap(child, &MonotonicClock).await.unwrap();
        assert_eq!(result.exit_code, 0);
    }
}
