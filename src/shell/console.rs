//! Line-based console used by the shell.

use std::io::{self, BufRead, Write};

/// A prompt/response console over any reader and writer.
///
/// The binary wires this to stdin/stdout; tests use in-memory buffers.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console on the process' standard streams
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console from a reader and a writer
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line.
    ///
    /// Returns `None` at end of input. The trailing newline is removed.
    pub fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Write one line of output
    pub fn println(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Write an empty line
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.output)
    }

    /// Consume the console, returning the writer
    pub fn into_output(self) -> W {
        self.output
    }
}
