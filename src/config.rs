use crate::builtin::NameMatching;
use argh::FromArgs;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "$ ";
pub const DEFAULT_LOG_FILTER: &str = "warn";
/// Environment variable holding the log filter; it wins over `--log`.
pub const LOG_ENV_VAR: &str = "MYSHELL_LOG";

#[derive(FromArgs, Debug)]
/// A small interactive shell with POSIX-like quoting.
pub struct Args {
    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    pub command: Option<String>,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt printed before each line is read.
    pub prompt: String,

    #[argh(switch)]
    /// match built-in command names case-insensitively.
    pub ignore_case_builtins: bool,

    #[argh(option)]
    /// file to load interactive line history from and save it to.
    pub history: Option<PathBuf>,

    #[argh(option, default = "DEFAULT_LOG_FILTER.to_string()")]
    /// log filter used when MYSHELL_LOG is not set, e.g. "debug".
    pub log: String,
}

/// Settings shared by the dispatcher and the read loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub name_matching: NameMatching,
    pub history_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            name_matching: NameMatching::default(),
            history_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Args {
    pub fn config(&self) -> Config {
        Config {
            prompt: self.prompt.clone(),
            name_matching: if self.ignore_case_builtins {
                NameMatching::CaseInsensitive
            } else {
                NameMatching::CaseSensitive
            },
            history_file: self.history.clone(),
            log_filter: self.log.clone(),
        }
    }
}
