//! The read-eval-print loop and the sources it reads lines from.

use crate::command::{ExitCode, Outcome};
use crate::dispatcher::Dispatcher;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Exit code used when input ends or cannot be read.
pub const EXIT_ON_EOF: ExitCode = 1;

/// Where the loop gets its lines from.
pub trait LineSource {
    /// Show `prompt` and read one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor for interactive terminals, with history.
pub struct EditorSource {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl EditorSource {
    /// Create the editor, loading history from `history_file` when it exists.
    pub fn new(history_file: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
        if let Some(path) = &history_file {
            // A missing history file is normal on first use.
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), error = %e, "history not loaded");
            }
        }
        Ok(Self {
            editor,
            history_file,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the current line and shows a fresh prompt.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read line"),
        }
    }
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to save history");
            }
        }
    }
}

/// Plain buffered reader, used when input is not a terminal.
pub struct PlainSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PlainSource<R, W> {
    /// Read lines from `input`, writing prompts to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> LineSource for PlainSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        Ok((read > 0).then_some(line))
    }
}

/// Runs the loop until `exit` or the end of input.
///
/// Returns the code the shell should exit with: the argument of `exit`, or
/// [`EXIT_ON_EOF`] when input ends or fails.
pub fn run(dispatcher: &mut Dispatcher, source: &mut dyn LineSource, prompt: &str) -> ExitCode {
    loop {
        match source.read_line(prompt) {
            Ok(Some(line)) => {
                if let Outcome::Exit(code) = dispatcher.run_line(&line) {
                    tracing::debug!(code, "exit requested");
                    return code;
                }
            }
            Ok(None) => {
                tracing::debug!("end of input");
                return EXIT_ON_EOF;
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "cannot read input");
                return EXIT_ON_EOF;
            }
        }
    }
}
