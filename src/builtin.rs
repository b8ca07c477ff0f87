use crate::command::{ExitCode, Outcome};
use crate::env::Environment;
use crate::error::BuiltinError;
use crate::external;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// How command names are compared against the built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatching {
    /// `echo` matches only `echo`.
    #[default]
    CaseSensitive,
    /// `ECHO`, `Echo` and `echo` all match `echo`.
    CaseInsensitive,
}

impl NameMatching {
    fn matches(self, builtin: &str, name: &str) -> bool {
        match self {
            NameMatching::CaseSensitive => builtin == name,
            NameMatching::CaseInsensitive => builtin.eq_ignore_ascii_case(name),
        }
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Built-ins run in-process and operate on the dispatcher's [`Environment`]
/// instead of the process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Echo,
    Type,
    Pwd,
    Cd,
}

impl Builtin {
    /// Every built-in, in lookup order.
    pub const ALL: [Builtin; 5] = [
        Builtin::Exit,
        Builtin::Echo,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
    ];

    /// Canonical name of the command, e.g. "echo" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Echo => "echo",
            Builtin::Type => "type",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
        }
    }

    /// Finds the built-in called `name`, if any.
    pub fn lookup(name: &str, matching: NameMatching) -> Option<Builtin> {
        Self::ALL
            .into_iter()
            .find(|builtin| matching.matches(builtin.name(), name))
    }

    /// Executes the command with `args` (the tokens after the command name).
    ///
    /// Regular output goes to `stdout`. Errors are returned to the caller, which
    /// reports them; none of them is fatal to the shell.
    pub(crate) fn execute(
        self,
        args: &[String],
        stdout: &mut dyn Write,
        env: &mut Environment,
        matching: NameMatching,
    ) -> Result<Outcome, BuiltinError> {
        match self {
            Builtin::Exit => Ok(Outcome::Exit(exit_code(args))),
            Builtin::Echo => echo(args, stdout).map(Outcome::Continue),
            Builtin::Type => type_of(args, stdout, env, matching).map(Outcome::Continue),
            Builtin::Pwd => pwd(stdout, env).map(Outcome::Continue),
            Builtin::Cd => cd(args, env).map(Outcome::Continue),
        }
    }
}

/// `exit [n]`: the requested code reduced into 0..=255, or 1 when absent or not a number.
fn exit_code(args: &[String]) -> ExitCode {
    args.first()
        .and_then(|arg| arg.parse::<i64>().ok())
        .map_or(1, |code| code.rem_euclid(256) as ExitCode)
}

fn echo(args: &[String], stdout: &mut dyn Write) -> Result<ExitCode, BuiltinError> {
    if args.is_empty() {
        return Err(BuiltinError::MissingArgument { command: "echo" });
    }
    writeln!(stdout, "{}", args.join(" "))?;
    Ok(0)
}

fn type_of(
    args: &[String],
    stdout: &mut dyn Write,
    env: &Environment,
    matching: NameMatching,
) -> Result<ExitCode, BuiltinError> {
    if args.is_empty() {
        return Err(BuiltinError::MissingArgument { command: "type" });
    }

    let mut status = 0;
    for name in args {
        if Builtin::lookup(name, matching).is_some() {
            writeln!(stdout, "{name} is a shell builtin")?;
        } else if let Some(path) = external::resolve(name, env) {
            writeln!(stdout, "{name} is {}", path.display())?;
        } else {
            writeln!(stdout, "{name}: not found")?;
            status = 1;
        }
    }
    Ok(status)
}

fn pwd(stdout: &mut dyn Write, env: &Environment) -> Result<ExitCode, BuiltinError> {
    fs::metadata(&env.current_dir).map_err(BuiltinError::CurrentDir)?;
    writeln!(stdout, "{}", env.current_dir.display())?;
    Ok(0)
}

fn cd(args: &[String], env: &mut Environment) -> Result<ExitCode, BuiltinError> {
    let target = match args {
        [] => return Err(BuiltinError::MissingArgument { command: "cd" }),
        [target] => target,
        _ => return Err(BuiltinError::TooManyArguments { command: "cd" }),
    };

    let new_dir = normalize(&env.current_dir.join(expand_tilde(target, env)?));
    if !new_dir.is_dir() {
        return Err(BuiltinError::NoSuchDirectory {
            path: target.clone(),
        });
    }
    // `is_dir` succeeds on directories the shell has no permission to enter.
    fs::read_dir(&new_dir).map_err(|source| BuiltinError::CannotEnter {
        path: target.clone(),
        source,
    })?;

    tracing::debug!(from = %env.current_dir.display(), to = %new_dir.display(), "cd");
    env.current_dir = new_dir;
    Ok(0)
}

/// Expands a leading `~` or `~/` to the home directory.
fn expand_tilde(target: &str, env: &Environment) -> Result<PathBuf, BuiltinError> {
    if target == "~" {
        return env.home_dir().ok_or(BuiltinError::HomeNotSet);
    }
    match target.strip_prefix("~/") {
        Some(rest) => Ok(env.home_dir().ok_or(BuiltinError::HomeNotSet)?.join(rest)),
        None => Ok(PathBuf::from(target)),
    }
}

/// Lexically removes `.` and `..` components, so `cd ..` walks the path the user sees.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
