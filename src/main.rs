use anyhow::{Context, Result};
use myshell::{Args, Config, Dispatcher, EditorSource, ExitCode, LOG_ENV_VAR, PlainSource, repl};
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let args: Args = argh::from_env();
    let config = args.config();
    init_logging(&config);

    let code = match run(args.command.as_deref(), &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("myshell: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(command: Option<&str>, config: &Config) -> Result<ExitCode> {
    let mut dispatcher = Dispatcher::system()
        .context("cannot determine the working directory")?
        .with_name_matching(config.name_matching);

    if let Some(line) = command {
        return Ok(dispatcher.run_line(line).code());
    }

    let stdin = io::stdin();
    let code = if stdin.is_terminal() {
        let mut source = EditorSource::new(config.history_file.clone())?;
        repl::run(&mut dispatcher, &mut source, &config.prompt)
    } else {
        let mut source = PlainSource::new(stdin.lock(), io::stdout());
        repl::run(&mut dispatcher, &mut source, &config.prompt)
    };
    Ok(code)
}
