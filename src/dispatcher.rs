use crate::builtin::{Builtin, NameMatching};
use crate::command::{ExitCode, Launcher, Outcome};
use crate::env::Environment;
use crate::error::LaunchError;
use crate::external::{self, SystemLauncher};
use crate::lexer::tokenize;
use std::error::Error;
use std::io::{self, Write};

/// Status reported when no executable matched the command name.
pub const STATUS_NOT_FOUND: ExitCode = 127;
/// Status reported when an executable was found but could not be started.
pub const STATUS_CANNOT_EXECUTE: ExitCode = 126;

/// Routes a tokenized command line to a built-in or an external program.
///
/// The dispatcher owns the shell state ([`Environment`]) and the streams that
/// built-ins write to. External programs are started through a [`Launcher`].
///
/// Example
/// ```
/// use myshell::{Dispatcher, Environment, MemWriter, Outcome, SystemLauncher};
///
/// let (out, handle) = MemWriter::with_handle();
/// let mut sh = Dispatcher::new(Environment::with_current_dir("/"), Box::new(SystemLauncher))
///     .with_output(Box::new(out), Box::new(std::io::sink()));
/// assert_eq!(sh.run_line("echo 'hello   world'"), Outcome::Continue(0));
/// assert_eq!(handle.contents(), "hello   world\n");
/// ```
pub struct Dispatcher {
    env: Environment,
    matching: NameMatching,
    launcher: Box<dyn Launcher>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Dispatcher {
    /// Create a dispatcher writing to the process's stdout and stderr.
    pub fn new(env: Environment, launcher: Box<dyn Launcher>) -> Self {
        Self {
            env,
            matching: NameMatching::default(),
            launcher,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Dispatcher for the running process: its working directory and real child processes.
    pub fn system() -> io::Result<Self> {
        Ok(Self::new(Environment::new()?, Box::new(SystemLauncher)))
    }

    /// Redirect built-in output and error messages.
    pub fn with_output(mut self, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Choose how command names are matched against the built-ins.
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Tokenize and dispatch one line of user input.
    ///
    /// Surrounding whitespace (including the line terminator) is ignored. The
    /// trimmed line is what a "command not found" message echoes back.
    pub fn run_line(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        let tokens = tokenize(line);
        tracing::debug!(?tokens, "tokenized");
        self.dispatch_from(&tokens, line)
    }

    /// Dispatch an already tokenized command. An empty sequence does nothing.
    pub fn dispatch(&mut self, tokens: &[String]) -> Outcome {
        let source = tokens.join(" ");
        self.dispatch_from(tokens, &source)
    }

    fn dispatch_from(&mut self, tokens: &[String], source: &str) -> Outcome {
        let Some((name, args)) = tokens.split_first() else {
            return Outcome::Continue(self.env.last_status);
        };

        let outcome = match Builtin::lookup(name, self.matching) {
            Some(builtin) => self.run_builtin(builtin, args),
            None => self.run_external(name, args, source),
        };
        self.env.last_status = outcome.code();
        outcome
    }

    fn run_builtin(&mut self, builtin: Builtin, args: &[String]) -> Outcome {
        tracing::debug!(builtin = builtin.name(), "running builtin");
        match builtin.execute(args, &mut *self.stdout, &mut self.env, self.matching) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report(&e);
                Outcome::Continue(1)
            }
        }
    }

    fn run_external(&mut self, name: &str, args: &[String], source: &str) -> Outcome {
        match self.launch(name, args, source) {
            Ok(code) => Outcome::Continue(code),
            Err(e) => {
                self.report(&e);
                Outcome::Continue(match e {
                    LaunchError::NotFound(_) => STATUS_NOT_FOUND,
                    LaunchError::Spawn { .. } => STATUS_CANNOT_EXECUTE,
                })
            }
        }
    }

    fn launch(
        &mut self,
        name: &str,
        args: &[String],
        source: &str,
    ) -> Result<ExitCode, LaunchError> {
        let program = external::resolve(name, &self.env)
            .ok_or_else(|| LaunchError::NotFound(source.to_string()))?;
        tracing::debug!(command = name, program = %program.display(), "resolved external command");

        // The child writes straight to the terminal; anything still buffered must go first.
        if let Err(e) = self.stdout.flush() {
            tracing::warn!(error = %e, "failed to flush stdout");
        }

        self.launcher
            .launch(&program, name, args, &self.env)
            .map_err(|err| LaunchError::Spawn {
                name: name.to_string(),
                source: err,
            })
    }

    fn report(&mut self, err: &dyn Error) {
        if let Err(e) = writeln!(self.stderr, "{err}") {
            tracing::warn!(error = %e, reported = %err, "failed to report error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemWriter;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        program: PathBuf,
        name: String,
        args: Vec<String>,
        cwd: PathBuf,
    }

    #[derive(Clone, Default)]
    struct RecordingLauncher {
        calls: Rc<RefCell<Vec<Call>>>,
        code: ExitCode,
        fail: bool,
    }

    impl Launcher for RecordingLauncher {
        fn launch(
            &self,
            program: &Path,
            name: &str,
            args: &[String],
            env: &Environment,
        ) -> io::Result<ExitCode> {
            self.calls.borrow_mut().push(Call {
                program: program.to_path_buf(),
                name: name.to_string(),
                args: args.to_vec(),
                cwd: env.current_dir.clone(),
            });
            if self.fail {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "boom"))
            } else {
                Ok(self.code)
            }
        }
    }

    struct Harness {
        sh: Dispatcher,
        out: MemWriter,
        err: MemWriter,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    fn harness_with(env: Environment, launcher: RecordingLauncher) -> Harness {
        let (out, out_handle) = MemWriter::with_handle();
        let (err, err_handle) = MemWriter::with_handle();
        let calls = launcher.calls.clone();
        let sh = Dispatcher::new(env, Box::new(launcher)).with_output(Box::new(out), Box::new(err));
        Harness {
            sh,
            out: out_handle,
            err: err_handle,
            calls,
        }
    }

    fn harness(path: &str) -> Harness {
        let mut env = Environment::with_current_dir("/");
        env.set_var("PATH", path);
        harness_with(env, RecordingLauncher::default())
    }

    #[cfg(unix)]
    fn install_tool(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(h.sh.dispatch(&[]), Outcome::Continue(0));
        assert_eq!(h.sh.run_line("   \n"), Outcome::Continue(0));
        assert!(h.out.contents().is_empty());
        assert!(h.err.contents().is_empty());
    }

    #[test]
    fn test_exit_codes() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(h.sh.dispatch(&tokens(&["exit", "0"])), Outcome::Exit(0));
        assert_eq!(h.sh.dispatch(&tokens(&["exit", "abc"])), Outcome::Exit(1));
        assert_eq!(h.sh.dispatch(&tokens(&["exit"])), Outcome::Exit(1));
        assert_eq!(h.sh.run_line("exit 7\n"), Outcome::Exit(7));
    }

    #[test]
    fn test_echo_uses_tokenizer() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(h.sh.run_line(r#"echo 'a   b' "c\"d" e\ f"#), Outcome::Continue(0));
        assert_eq!(h.out.contents(), "a   b c\"d e f\n");
    }

    #[test]
    fn test_builtin_error_is_reported_and_shell_continues() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(h.sh.run_line("echo"), Outcome::Continue(1));
        assert_eq!(h.err.contents(), "echo: missing argument\n");
        assert_eq!(h.sh.env().last_status, 1);

        assert_eq!(h.sh.run_line("echo ok"), Outcome::Continue(0));
        assert_eq!(h.out.contents(), "ok\n");
        assert_eq!(h.sh.env().last_status, 0);
    }

    #[test]
    fn test_cd_home_then_pwd() {
        let home = TempDir::new().unwrap();
        let mut h = harness("/nonexistent-dir");
        h.sh.env_mut().set_var("HOME", home.path().to_string_lossy().to_string());

        assert_eq!(h.sh.dispatch(&tokens(&["cd", "~"])), Outcome::Continue(0));
        assert_eq!(h.sh.dispatch(&tokens(&["pwd"])), Outcome::Continue(0));
        assert_eq!(h.out.contents(), format!("{}\n", home.path().display()));
    }

    #[test]
    fn test_cd_failure_keeps_directory() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(h.sh.run_line("cd /nonexistent-dir-xyz"), Outcome::Continue(1));
        assert_eq!(
            h.err.contents(),
            "cd: /nonexistent-dir-xyz: No such file or directory\n"
        );
        assert_eq!(h.sh.env().current_dir, PathBuf::from("/"));
    }

    #[test]
    fn test_type_builtin_and_missing() {
        let mut h = harness("/nonexistent-dir");
        h.sh.dispatch(&tokens(&["type", "echo"]));
        h.sh.dispatch(&tokens(&["type", "nonexistent-xyz"]));
        assert_eq!(
            h.out.contents(),
            "echo is a shell builtin\nnonexistent-xyz: not found\n"
        );
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let mut h = harness("/nonexistent-dir");
        assert_eq!(
            h.sh.dispatch(&tokens(&["unknownprog"])),
            Outcome::Continue(STATUS_NOT_FOUND)
        );
        assert_eq!(h.err.contents(), "unknownprog: command not found\n");
        assert!(h.calls.borrow().is_empty());
    }

    #[test]
    fn test_not_found_message_echoes_the_line() {
        let mut h = harness("/nonexistent-dir");
        h.sh.run_line("  unknownprog 'a  b'  \n");
        assert_eq!(h.err.contents(), "unknownprog 'a  b': command not found\n");
    }

    #[test]
    fn test_builtin_names_are_case_sensitive_by_default() {
        let mut h = harness("/nonexistent-dir");
        h.sh.run_line("ECHO hi");
        assert_eq!(h.err.contents(), "ECHO hi: command not found\n");

        let mut h = harness("/nonexistent-dir");
        h.sh = h.sh.with_name_matching(NameMatching::CaseInsensitive);
        assert_eq!(h.sh.run_line("ECHO hi"), Outcome::Continue(0));
        assert_eq!(h.out.contents(), "hi\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_is_launched() {
        let bin = TempDir::new().unwrap();
        let tool = install_tool(bin.path(), "tool");
        let work = TempDir::new().unwrap();

        let mut env = Environment::with_current_dir("/");
        env.set_var("PATH", bin.path().to_string_lossy().to_string());
        let launcher = RecordingLauncher {
            code: 3,
            ..Default::default()
        };
        let mut h = harness_with(env, launcher);

        let cd = format!("cd '{}'", work.path().display());
        assert_eq!(h.sh.run_line(&cd), Outcome::Continue(0));
        assert_eq!(h.sh.run_line("tool 'x y' z"), Outcome::Continue(3));
        assert_eq!(h.sh.env().last_status, 3);
        assert!(h.err.contents().is_empty());

        assert_eq!(
            *h.calls.borrow(),
            vec![Call {
                program: tool,
                name: "tool".to_string(),
                args: tokens(&["x y", "z"]),
                cwd: work.path().to_path_buf(),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_failure_is_distinguished_from_not_found() {
        let bin = TempDir::new().unwrap();
        install_tool(bin.path(), "tool");

        let mut env = Environment::with_current_dir("/");
        env.set_var("PATH", bin.path().to_string_lossy().to_string());
        let launcher = RecordingLauncher {
            fail: true,
            ..Default::default()
        };
        let mut h = harness_with(env, launcher);

        assert_eq!(h.sh.run_line("tool"), Outcome::Continue(STATUS_CANNOT_EXECUTE));
        assert_eq!(h.err.contents(), "tool: boom\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_is_searched_on_every_command() {
        let bin = TempDir::new().unwrap();
        let mut h = harness(&bin.path().to_string_lossy());

        h.sh.run_line("late");
        assert_eq!(h.err.contents(), "late: command not found\n");

        install_tool(bin.path(), "late");
        assert_eq!(h.sh.run_line("late"), Outcome::Continue(0));
        assert_eq!(h.calls.borrow().len(), 1);
    }
}
