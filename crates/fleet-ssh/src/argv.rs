//! `build_argv` (spec §6): the argument vector the core execs for a host.
//! The core never interprets its contents.

/// Build `ssh <host> <command...>` for one host.
///
/// This is the default remote-shell invocation; it is intentionally the
/// only one implemented (spec.md's Non-goals exclude argument-vector
/// construction beyond a default template).
pub fn build_argv(host: &str, command: &[String]) -> Vec<String> {
    let mut argv = Vec::with_capacity(command.len() + 2);
    argv.push("ssh".to_string());
    argv.push(host.to_string());
    argv.extend(command.iter().cloned());
    argv
}
