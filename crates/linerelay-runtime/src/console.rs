//! Serialized console output
//!
//! Every stage and the dispatch loop print through one process-wide lock, so
//! lines written concurrently never interleave character by character.

use std::io::{self, Write};
use std::sync::Arc;

use linerelay_core::Line;
use parking_lot::Mutex;

/// Cloneable handle to the shared output sink
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    /// Console writing to an arbitrary sink
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Console writing to the process stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Console writing into memory, plus a handle to read back what was written
    pub fn capture() -> (Self, CapturedOutput) {
        let buffer = CapturedOutput::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }

    /// Print a stage trace line: `[stage N] "<text>"`
    pub fn trace(&self, stage: usize, text: &Line) -> io::Result<()> {
        let mut sink = self.sink.lock();
        write!(sink, "[stage {}] \"", stage)?;
        sink.write_all(text.as_bytes())?;
        sink.write_all(b"\"\n")?;
        sink.flush()
    }

    /// Print one operator-facing message followed by a newline
    pub fn say(&self, message: &str) -> io::Result<()> {
        let mut sink = self.sink.lock();
        writeln!(sink, "{}", message)?;
        sink.flush()
    }

    /// Print several lines as one atomic block
    pub fn say_all<I, S>(&self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sink = self.sink.lock();
        for line in lines {
            writeln!(sink, "{}", line.as_ref())?;
        }
        sink.flush()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Captured Output
// ----------------------------------------------------------------------------

/// In-memory sink shared between a `Console` and its reader
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    /// Everything written so far, decoded lossily
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Everything written so far, split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn raw(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_trace_format() {
        let (console, output) = Console::capture();
        console.trace(1, &Line::from("Hello")).unwrap();
        console.trace(2, &Line::from("")).unwrap();
        assert_eq!(output.lines(), vec!["[stage 1] \"Hello\"", "[stage 2] \"\""]);
    }

    #[test]
    fn test_trace_writes_raw_bytes() {
        let (console, output) = Console::capture();
        console.trace(1, &Line::new(vec![0xC1])).unwrap();
        assert_eq!(output.raw(), b"[stage 1] \"\xC1\"\n".to_vec());
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let (console, output) = Console::capture();
        let writers: Vec<_> = (1..=4)
            .map(|stage| {
                let console = console.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        console.trace(stage, &Line::from("abcdefghij")).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let lines = output.lines();
        assert_eq!(lines.len(), 200);
        assert!(lines
            .iter()
            .all(|line| line.starts_with("[stage ") && line.ends_with(" \"abcdefghij\"")));
    }
}
