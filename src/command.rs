use crate::env::Environment;
use std::io;
use std::path::Path;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What the read loop should do after a command was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep prompting. Carries the status of the command that just ran.
    Continue(ExitCode),
    /// Terminate the shell with this exit code.
    Exit(ExitCode),
}

impl Outcome {
    /// The status carried by either variant.
    pub fn code(self) -> ExitCode {
        match self {
            Outcome::Continue(code) | Outcome::Exit(code) => code,
        }
    }
}

/// Runs a resolved external program to completion.
///
/// The dispatcher only decides *what* to run; implementors decide *how*.
/// [`crate::SystemLauncher`] spawns a real child process with inherited
/// standard streams, tests substitute a recording implementation.
pub trait Launcher {
    /// Executes `program` with `args`, returning the child's exit code.
    ///
    /// `name` is the command name as the user typed it and is used as the
    /// child's `argv[0]` where the platform allows it. An `Err` means the
    /// child could not be started or waited for.
    fn launch(
        &self,
        program: &Path,
        name: &str,
        args: &[String],
        env: &Environment,
    ) -> io::Result<ExitCode>;
}
