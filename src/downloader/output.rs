//! Console multiplexing for child process output
//!
//! Every download forwards its child's stdout and stderr to ours, one line
//! at a time, tagged with the target name. Each stream sits behind its own
//! lock and a line is written with a single call while holding it, so lines
//! from concurrent downloads never interleave mid-line.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Which of our two output streams a line goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Shared, line-atomic writer pair
#[derive(Clone)]
pub struct OutputSink {
    stdout: SharedWriter,
    stderr: SharedWriter,
}

impl OutputSink {
    pub fn new(stdout: impl Write + Send + 'static, stderr: impl Write + Send + 'static) -> Self {
        Self {
            stdout: Arc::new(Mutex::new(Box::new(stdout))),
            stderr: Arc::new(Mutex::new(Box::new(stderr))),
        }
    }

    /// The process's own stdout/stderr
    pub fn console() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// In-memory sink, for inspecting what a run printed
    pub fn capture() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        let sink = Self::new(
            BufferWriter(Arc::clone(&captured.stdout)),
            BufferWriter(Arc::clone(&captured.stderr)),
        );
        (sink, captured)
    }

    /// Write `line` plus a newline as one unit
    pub fn write_line(&self, stream: StreamKind, line: &str) {
        let writer = match stream {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        };

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut guard = lock(writer);
        // Nowhere to report a broken console, drop the line.
        let _ = guard.write_all(buf.as_bytes());
        let _ = guard.flush();
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Buffers behind an [`OutputSink::capture`] sink
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    stdout: Arc<Mutex<Vec<u8>>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&lock(&self.stdout)).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&lock(&self.stderr)).into_owned()
    }
}

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Tag a line with `[name] `. Blank lines pass through untouched.
pub fn prefix_line(name: &str, line: &str) -> String {
    if line.trim().is_empty() {
        line.to_string()
    } else {
        format!("[{}] {}", name, line)
    }
}

/// Forward every line of `reader` to `stream` of `sink`, prefixed with `name`.
///
/// Reads until EOF. Invalid UTF-8 is replaced rather than treated as an
/// error. Returns the number of lines forwarded.
pub async fn pump_lines<R>(
    reader: R,
    name: &str,
    stream: StreamKind,
    sink: &OutputSink,
) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        let line = String::from_utf8_lossy(&buf);
        sink.write_line(stream, &prefix_line(name, &line));
        count += 1;
    }

    Ok(count)
}
