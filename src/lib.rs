//! A small interactive shell with POSIX-like quoting.
//!
//! A line of input is split into arguments by the [`tokenize`] state machine
//! (single quotes, double quotes and backslash escapes), then the
//! [`Dispatcher`] either runs one of the built-ins (`exit`, `echo`, `type`,
//! `pwd`, `cd`) or resolves the command on PATH and runs it as a child process.
//!
//! The shell state lives in an explicit [`Environment`] owned by the
//! dispatcher, so the whole core can be driven from tests without touching the
//! process-wide working directory. The [`repl`] module wires the dispatcher to
//! a prompt loop.

mod builtin;
pub mod command;
mod config;
mod dispatcher;
pub mod env;
mod error;
mod external;
mod io_adapters;
mod lexer;
pub mod repl;

pub use builtin::{Builtin, NameMatching};
pub use command::{ExitCode, Launcher, Outcome};
pub use config::{Args, Config, DEFAULT_LOG_FILTER, DEFAULT_PROMPT, LOG_ENV_VAR};
pub use dispatcher::{Dispatcher, STATUS_CANNOT_EXECUTE, STATUS_NOT_FOUND};
pub use env::Environment;
pub use error::{BuiltinError, LaunchError};
pub use external::{SystemLauncher, resolve};
pub use io_adapters::MemWriter;
pub use lexer::tokenize;
pub use repl::{EditorSource, LineSource, PlainSource};
