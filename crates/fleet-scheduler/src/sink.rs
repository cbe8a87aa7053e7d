//! OutputSink (spec §4.4): the three presentation disciplines, plus the
//! exit-line and JOIN progress-line printers that share its serialized
//! access to standard output.

use fleet_core::StreamKind;
use fleet_ssh::Painter;
use std::io::Write;

/// Presents streamed child output under one of `LINE`/`GROUP`/`JOIN`.
///
/// All state here (`newline_printed`, `last_host`) is scheduler-scoped per
/// spec §3, not per host — callers serialize access (the scheduler holds one
/// `Sink` behind a mutex shared by every host task).
pub struct Sink<W: Write> {
    writer: W,
    painter: Painter,
    anonymous: bool,
    newline_printed: bool,
    last_host: Option<String>,
}

impl<W: Write> Sink<W> {
    pub fn new(writer: W, painter: Painter, anonymous: bool) -> Self {
        Self {
            writer,
            painter,
            anonymous,
            newline_printed: true,
            last_host: None,
        }
    }

    /// LINE: one complete line, tagged with its host and stream.
    pub fn emit_line(&mut self, host: &str, stream: StreamKind, line: &[u8]) {
        if !self.anonymous {
            let _ = write!(self.writer, "{} ", self.painter.host_tag(host));
        }
        let _ = write!(self.writer, "{}", self.painter.stream_prefix(stream));
        let _ = self.writer.write_all(line);
        let _ = write!(self.writer, "{}", self.painter.reset());
    }

    /// GROUP: a host header on transition, then the chunk verbatim.
    pub fn emit_chunk(&mut self, host: &str, stream: StreamKind, chunk: &[u8]) {
        if self.last_host.as_deref() != Some(host) {
            if !self.newline_printed {
                let _ = writeln!(self.writer);
            }
            if !self.anonymous {
                let _ = writeln!(self.writer, "{}", self.painter.host_tag(host));
            }
            self.last_host = Some(host.to_string());
        }
        let _ = write!(self.writer, "{}", self.painter.stream_prefix(stream));
        let _ = self.writer.write_all(chunk);
        let _ = write!(self.writer, "{}", self.painter.reset());
        if let Some(&last) = chunk.last() {
            self.newline_printed = last == b'\n';
        }
    }

    /// Reaper's exit line (spec §4.5), emitted when `exit_codes` or `debug`.
    pub fn emit_exit_line(&mut self, host: &str, exit_code: i32, delta_ms: u64) {
        if !self.newline_printed {
            let _ = writeln!(self.writer);
        }
        let _ = writeln!(self.writer, "[{host}] exited: {exit_code} ({delta_ms} ms)");
        self.newline_printed = true;
    }

    /// JOIN's progress line, updated as hosts complete (spec §4.4), rewritten
    /// in place with `\r` — only called when standard output is a terminal.
    pub fn emit_progress(&mut self, prog: &str, done: usize, total: usize) {
        let _ = write!(self.writer, "[{prog}] finished {done}/{total}\r");
        let _ = self.writer.flush();
        self.newline_printed = false;
    }

    /// Final newline once `done == total` (spec §4.6 Dispatch step).
    pub fn finish_progress(&mut self) {
        let _ = writeln!(self.writer);
        self.newline_printed = true;
    }

    /// The JOIN report, written verbatim once JoinAggregator has run.
    pub fn emit_report(&mut self, report: &str) {
        let _ = write!(self.writer, "{report}");
        self.newline_printed = report.ends_with('\n');
    }

    /// The underlying writer, for callers (tests, the CLI at shutdown) that
    /// need to flush or inspect it directly.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}
