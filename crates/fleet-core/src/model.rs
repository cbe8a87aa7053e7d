//! Host, Child, and Mode — the data model the scheduler walks (spec §3).

use clap::ValueEnum;

/// Selects how child output is presented. Constant for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Interleave complete lines, prefixed with a host header.
    Line,
    /// Group raw output by host, headered on transition.
    Group,
    /// Suppress live output; report byte-identical result classes at the end.
    Join,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Line
    }
}

/// Which of a child's output descriptors a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Out,
    Err,
    /// `JOIN` mode merges stdout and stderr into one descriptor.
    Merged,
}

impl StreamKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::Err => "err",
            Self::Merged => "merged",
        }
    }
}

/// Per-spawn record (spec §3 `Child`).
///
/// `stdio` tracks which of the child's output descriptors are still open.
/// Descriptors are always open immediately after spawn (pipes are created
/// and handed to the child before `spawn()` returns), so the `not-opened`
/// state spec.md lists never has an observable window here and is not
/// modeled separately.
#[derive(Debug)]
pub struct Child {
    pid: u32,
    started_ms: u64,
    finished_ms: Option<u64>,
    exit_code: Option<i32>,
    stdio: Stdio,
    /// Fully accumulated bytes captured from the merged descriptor. `JOIN`
    /// only; `None` for `LINE`/`GROUP` and before end-of-stream in `JOIN`.
    output: Option<Vec<u8>>,
    /// Equivalence-class id assigned by `JoinAggregator`. `JOIN` only.
    output_class: Option<usize>,
}

/// Open/closed bookkeeping for a child's output descriptor(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdio {
    /// `LINE`/`GROUP`: separate stdout and stderr pipes.
    Split { stdout_closed: bool, stderr_closed: bool },
    /// `JOIN`: one merged pipe.
    Merged { closed: bool },
}

impl Stdio {
    pub fn split() -> Self {
        Self::Split {
            stdout_closed: false,
            stderr_closed: false,
        }
    }

    pub fn merged() -> Self {
        Self::Merged { closed: false }
    }

    /// `child_stdio_done` (spec §4.5): true once every descriptor has
    /// reported end-of-file.
    pub fn is_done(self) -> bool {
        match self {
            Self::Split {
                stdout_closed,
                stderr_closed,
            } => stdout_closed && stderr_closed,
            Self::Merged { closed } => closed,
        }
    }

    pub fn close(&mut self, stream: StreamKind) {
        match (self, stream) {
            (Self::Split { stdout_closed, .. }, StreamKind::Out) => *stdout_closed = true,
            (Self::Split { stderr_closed, .. }, StreamKind::Err) => *stderr_closed = true,
            (Self::Merged { closed }, StreamKind::Merged) => *closed = true,
            _ => unreachable!("stream kind does not match stdio wiring for this mode"),
        }
    }
}

impl Child {
    pub fn new(pid: u32, started_ms: u64, stdio: Stdio) -> Self {
        Self {
            pid,
            started_ms,
            finished_ms: None,
            exit_code: None,
            stdio,
            output: None,
            output_class: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    pub fn finished_ms(&self) -> Option<u64> {
        self.finished_ms
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn is_reaped(&self) -> bool {
        self.exit_code.is_some()
    }

    pub fn stdio(&self) -> Stdio {
        self.stdio
    }

    pub fn stdio_mut(&mut self) -> &mut Stdio {
        &mut self.stdio
    }

    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn output_class(&self) -> Option<usize> {
        self.output_class
    }

    pub fn set_output_class(&mut self, class: usize) {
        self.output_class = Some(class);
    }

    /// Record the reap result. Invariant: called exactly once, only after
    /// `stdio.is_done()`.
    pub fn mark_reaped(&mut self, exit_code: i32, finished_ms: u64) {
        debug_assert!(
            self.stdio.is_done(),
            "reap must only run after all pipe reads hit EOF"
        );
        debug_assert!(!self.is_reaped(), "a child must be reaped exactly once");
        debug_assert!(
            finished_ms >= self.started_ms,
            "finished_ms must not precede started_ms"
        );
        self.exit_code = Some(exit_code);
        self.finished_ms = Some(finished_ms);
    }

    /// Transfer ownership of the captured `JOIN` buffer (§4.3 end-of-stream
    /// finalization: "transfer ownership of buffer to child.output").
    pub fn set_output(&mut self, output: Vec<u8>) {
        self.output = Some(output);
    }
}

/// Record per input host (spec §3 `Host`).
#[derive(Debug)]
pub struct Host {
    name: String,
    child: Option<Child>,
}

impl Host {
    pub fn new(name: String) -> Self {
        Self { name, child: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `trim` support (spec §4.6 Fill step): truncate at the first `.`.
    pub fn trim_name(&mut self) {
        if let Some(dot) = self.name.find('.') {
            self.name.truncate(dot);
        }
    }

    pub fn child(&self) -> Option<&Child> {
        self.child.as_ref()
    }

    pub fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }

    /// A Host's Child exists iff it has been spawned (spec §3 invariant).
    pub fn attach_child(&mut self, child: Child) {
        debug_assert!(self.child.is_none(), "a host is spawned at most once");
        self.child = Some(child);
    }
}

/// Ordered, finite, traversed-once collection of hosts (spec §3 `HostList`).
#[derive(Debug)]
pub struct HostList {
    hosts: Vec<Host>,
}

impl HostList {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            hosts: names.into_iter().map(Host::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Host> {
        self.hosts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Host> {
        self.hosts.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Host> {
        self.hosts.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_name_truncates_at_first_dot() {
        let mut host = Host::new("web-01.internal.example.com".to_string());
        host.trim_name();
        assert_eq!(host.name(), "web-01");
    }

    #[test]
    fn trim_name_is_noop_without_a_dot() {
        let mut host = Host::new("web-01".to_string());
        host.trim_name();
        assert_eq!(host.name(), "web-01");
    }

    #[test]
    fn split_stdio_is_done_only_once_both_closed() {
        let mut stdio = Stdio::split();
        assert!(!stdio.is_done());
        stdio.close(StreamKind::Out);
        assert!(!stdio.is_done());
        stdio.close(StreamKind::Err);
        assert!(stdio.is_done());
    }

    #[test]
    fn merged_stdio_is_done_after_single_close() {
        let mut stdio = Stdio::merged();
        assert!(!stdio.is_done());
        stdio.close(StreamKind::Merged);
        assert!(stdio.is_done());
    }

    #[test]
    fn host_list_preserves_insertion_order() {
        let list = HostList::new(vec!["a".into(), "b".into(), "c".into()]);
        let names: Vec<_> = list.iter().map(Host::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
