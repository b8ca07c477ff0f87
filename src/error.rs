//! Error types for built-ins and external command launching.
//!
//! The `Display` output of every variant is the exact line shown to the user.

use std::io;
use thiserror::Error;

/// Recoverable failures of a built-in command.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{command}: missing argument")]
    MissingArgument { command: &'static str },

    #[error("{command}: too many arguments")]
    TooManyArguments { command: &'static str },

    #[error("cd: {path}: No such file or directory")]
    NoSuchDirectory { path: String },

    #[error("cd: {path}: {source}")]
    CannotEnter {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("pwd: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("write error: {0}")]
    Io(#[from] io::Error),
}

/// Failures to run an external command.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No executable matched the name. Carries the text echoed back to the user.
    #[error("{0}: command not found")]
    NotFound(String),

    /// The executable was found but could not be started.
    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}
