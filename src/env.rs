use std::collections::HashMap;
use std::env as stdenv;
use std::io;
use std::path::PathBuf;

use crate::command::ExitCode;

/// Mutable view of the process environment owned by the dispatcher.
///
/// The environment contains:
/// - `vars`: variables set for this shell, layered on top of the process environment.
/// - `current_dir`: the shell's working directory. Built-ins and child processes use
///   this field; the process-wide working directory is never changed.
/// - `last_status`: status of the most recently dispatched command.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Overrides for environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Status of the last command, 0 before anything ran.
    pub last_status: ExitCode,
}

impl Environment {
    /// Capture the current working directory of the process.
    ///
    /// Variables are not copied; lookups fall through to the live process
    /// environment, so changes to it are observed on the next lookup.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_current_dir(stdenv::current_dir()?))
    }

    /// Create an environment rooted at `current_dir` with no overrides.
    pub fn with_current_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            last_status: 0,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The search path, or `None` when it is unset or empty.
    pub fn search_path(&self) -> Option<String> {
        self.get_var("PATH").filter(|path| !path.is_empty())
    }

    /// The home directory used for `~` expansion.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }
}
