//! StreamReader (spec §4.3): drains a non-blocking descriptor into
//! mode-specific buffers and emits formatted output or accumulates it.

use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe::Receiver;

const READ_CHUNK: usize = 4096;

/// LINE mode's per-(host, stream) line reassembly buffer. Unlike spec.md's
/// fixed `max_line_length + 2` byte array, this grows as needed — the only
/// externally observable property, the oversize boundary (§8), is preserved
/// regardless of the backing storage.
#[derive(Debug)]
pub struct LineAccumulator {
    buf: Vec<u8>,
    max_line_length: usize,
}

impl LineAccumulator {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line_length,
        }
    }

    /// Feed a chunk, returning zero or more completed lines (each including
    /// its trailing `\n`, real or synthetic).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        for &b in chunk {
            if self.buf.len() == self.max_line_length {
                // Oversize boundary: force emission with an injected newline
                // before considering `b` itself.
                self.buf.push(b'\n');
                lines.push(std::mem::take(&mut self.buf));
            }
            self.buf.push(b);
            if b == b'\n' {
                lines.push(std::mem::take(&mut self.buf));
            }
        }
        lines
    }

    /// End-of-stream finalization: ensure a trailing newline, emit the rest.
    pub fn finalize(&mut self) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            return None;
        }
        if *self.buf.last().expect("checked non-empty") != b'\n' {
            self.buf.push(b'\n');
        }
        Some(std::mem::take(&mut self.buf))
    }
}

/// JOIN mode's accumulation buffer: bytes beyond `max_output_length` are
/// silently dropped (spec §7 `OversizeInput`, not an error).
#[derive(Debug)]
pub struct JoinAccumulator {
    buf: Vec<u8>,
    max_output_length: usize,
}

impl JoinAccumulator {
    pub fn new(max_output_length: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_output_length,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        let remaining = self.max_output_length.saturating_sub(self.buf.len());
        let take = remaining.min(chunk.len());
        self.buf.extend_from_slice(&chunk[..take]);
    }

    pub fn finalize(self) -> Vec<u8> {
        self.buf
    }
}

/// Read `reader` to EOF, line-reassembling into `on_line` as lines complete.
/// Used by LINE mode for one (host, stream) descriptor.
pub async fn drain_lines<F>(
    reader: &mut Receiver,
    max_line_length: usize,
    silent: bool,
    mut on_line: F,
) -> std::io::Result<()>
where
    F: FnMut(Vec<u8>),
{
    let mut acc = LineAccumulator::new(max_line_length);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if let Some(line) = acc.finalize() {
                on_line(line);
            }
            return Ok(());
        }
        if silent {
            continue;
        }
        for line in acc.feed(&chunk[..n]) {
            on_line(line);
        }
    }
}

/// Read `reader` to EOF, forwarding raw chunks verbatim. Used by GROUP mode.
pub async fn drain_chunks<F>(
    reader: &mut Receiver,
    silent: bool,
    mut on_chunk: F,
) -> std::io::Result<()>
where
    F: FnMut(Vec<u8>),
{
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        if !silent {
            on_chunk(chunk[..n].to_vec());
        }
    }
}

/// Read `reader` to EOF, accumulating into a bounded buffer. Used by JOIN
/// mode (mutually exclusive with `silent` per §6, so no discard path here).
pub async fn drain_join(reader: &mut Receiver, max_output_length: usize) -> std::io::Result<Vec<u8>> {
    let mut acc = JoinAccumulator::new(max_output_length);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(acc.finalize());
        }
        acc.feed(&chunk[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_lines_are_emitted_as_fed() {
        let mut acc = LineAccumulator::new(80);
        let lines = acc.feed(b"hello\nworld\n");
        assert_eq!(lines, vec![b"hello\n".to_vec(), b"world\n".to_vec()]);
    }

    #[test]
    fn oversize_line_splits_with_synthetic_newline() {
        // Scenario 2 (spec §8): max_line_length = 4, input "abcdefg\n".
        let mut acc = LineAccumulator::new(4);
        let lines = acc.feed(b"abcdefg\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], b"abcd\n");
        assert_eq!(lines[0].len(), 5); // max_line_length + 1
        assert_eq!(lines[1], b"efg\n");
    }

    #[test]
    fn finalize_appends_missing_trailing_newline() {
        let mut acc = LineAccumulator::new(80);
        let lines = acc.feed(b"partial");
        assert!(lines.is_empty());
        assert_eq!(acc.finalize(), Some(b"partial\n".to_vec()));
    }

    #[test]
    fn finalize_is_none_when_buffer_already_empty() {
        let mut acc = LineAccumulator::new(80);
        assert!(acc.feed(b"line\n").len() == 1);
        assert_eq!(acc.finalize(), None);
    }

    #[test]
    fn join_accumulator_drops_bytes_past_the_bound() {
        let mut acc = JoinAccumulator::new(5);
        acc.feed(b"hello world");
        assert_eq!(acc.finalize(), b"hello".to_vec());
    }

    #[test]
    fn join_accumulator_keeps_everything_under_the_bound() {
        let mut acc = JoinAccumulator::new(100);
        acc.feed(b"short");
        assert_eq!(acc.finalize(), b"short".to_vec());
    }
}
