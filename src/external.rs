use crate::command::{ExitCode, Launcher};
use crate::env::Environment;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Launches external programs as child processes of the shell.
///
/// The child inherits the shell's standard streams, runs in the shell's
/// working directory and sees the shell's variable overrides. The call blocks
/// until the child terminates.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(
        &self,
        program: &Path,
        name: &str,
        args: &[String],
        env: &Environment,
    ) -> io::Result<ExitCode> {
        let mut cmd = std::process::Command::new(program);
        cmd.args(args)
            .envs(env.vars.iter())
            .current_dir(&env.current_dir);
        set_arg0(&mut cmd, name);

        let exit_status = cmd.status()?;
        tracing::debug!(program = %program.display(), status = %exit_status, "child exited");
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut std::process::Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut std::process::Command, _name: &str) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to an executable the way a typical shell would.
///
/// Behavior:
/// - Name without path separators: search each directory of PATH in order and
///   return the first executable match. Nothing is found when PATH is unset or empty.
/// - Name with a separator (`/bin/sh`, `./foo`, `bin/sh`): checked directly,
///   relative names against the shell's working directory.
/// - Empty name: `None`.
///
/// Only regular files with an executable bit count as matches. Nothing is cached,
/// so changes to PATH or the filesystem are visible on the next call.
pub fn resolve(name: &str, env: &Environment) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.chars().any(std::path::is_separator) {
        let candidate = env.current_dir.join(name);
        return is_executable(&candidate).then_some(candidate);
    }

    let search_paths = env.search_path()?;
    find_in_path(OsStr::new(&search_paths), OsStr::new(name), &env.current_dir)
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr, current_dir: &Path) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        // Relative entries (including the empty one) name the working directory.
        let path = current_dir.join(dir).join(cmd);
        if is_executable(&path) {
            return Some(path);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
