//! Command-line interface for reflow
//! Reads text, substitutes characters, collapses whitespace and word-wraps it, in that order,
//! each step only when asked for.
//!
//! Usage:
//!   reflow [-i `<path>`] [-o `<path>` [--overwrite]] [--collapsespace]
//!          [-w `<columns>` [--keepnewline]] [--charmap `<path>`] [--config `<path>`] [-v...]
//!
//! Exit status is 2 for invalid flag combinations or settings, 1 for I/O and map loading failures.

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use reflow::{Loader, ReflowConfig, ReflowError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

fn command() -> Command {
    Command::new("reflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Collapse whitespace, substitute characters and word-wrap text")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Input file (default stdin)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Output file (default stdout)"),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Allow the output file to be overwritten"),
        )
        .arg(
            Arg::new("collapsespace")
                .long("collapsespace")
                .action(ArgAction::SetTrue)
                .help("Collapse whitespace sequences into a single space and blank-line runs into one"),
        )
        .arg(
            Arg::new("wordwrap")
                .long("wordwrap")
                .short('w')
                .value_name("COLUMNS")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .help("Word-wrap lines at the given column (0 = no word-wrap)"),
        )
        .arg(
            Arg::new("keepnewline")
                .long("keepnewline")
                .action(ArgAction::SetTrue)
                .help("Keep the original line breaks while word-wrapping"),
        )
        .arg(
            Arg::new("charmap")
                .long("charmap")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Character replacing map file (JSON)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Settings file (TOML) layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Log more to stderr (repeat for debug output)"),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cmd = command();
    let matches = cmd.get_matches_mut();
    init_logging(matches.get_count("verbose"));

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(err @ ReflowError::Config(_)) => cmd.error(ErrorKind::ArgumentConflict, err).exit(),
        Err(err) => cmd.error(ErrorKind::InvalidValue, err).exit(),
    };
    tracing::debug!(?config, "configuration loaded");

    match reflow::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Layer settings file and flags over the defaults, then validate.
fn load_config(matches: &ArgMatches) -> Result<ReflowConfig, ReflowError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }

    for (arg, key) in [("input", "input"), ("output", "output"), ("charmap", "char_map")] {
        if let Some(path) = matches.get_one::<PathBuf>(arg) {
            loader = loader.set_override(key, path.to_string_lossy().into_owned())?;
        }
    }

    for (flag, key) in [
        ("overwrite", "overwrite"),
        ("collapsespace", "collapse_space"),
        ("keepnewline", "keep_newline"),
    ] {
        if matches.get_flag(flag) {
            loader = loader.set_override(key, true)?;
        }
    }

    if let Some(columns) = matches.get_one::<i64>("wordwrap") {
        loader = loader.set_override("word_wrap", *columns)?;
    }

    loader.load()
}

/// Logs go to stderr; stdout may be carrying the output text.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
