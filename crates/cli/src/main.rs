// rosterlink CLI - link external employee rosters to registry identities

mod exit_codes;
mod match_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use rosterlink_io::IoError;
use rosterlink_linkage::LinkageError;

use exit_codes::{io_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rlink")]
#[command(about = "Approximate record linkage of employee rosters (CLI mode, headless)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log per-batch detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every external record against the registry and write a report
    #[command(after_help = "\
Examples:
  rlink match registry.csv union.csv -o matches.csv
  rlink match registry.csv union.csv -o matches.xlsx --min-company-ratio 70
  rlink match registry.csv union.csv -o matches.csv --config match.toml --resume
  rlink match registry.csv union.csv -o matches.csv --company-word constr --json")]
    Match(match_cmd::MatchArgs),

    /// Validate a match config without running
    #[command(after_help = "\
Examples:
  rlink validate match.toml")]
    Validate {
        /// Path to the match .toml config file
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(err: LinkageError) -> Self {
        Self::new(EXIT_INVALID_CONFIG, err.to_string())
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            IoError::Oversize { .. } => Some("pass --ignore-warnings to process it anyway"),
            IoError::UnknownEncoding(_) => Some("use a WHATWG label such as utf-8, windows-1252 or latin1"),
            IoError::Header { .. } | IoError::ShortRow { .. } => {
                Some("check --delimiter and that the first row is a header")
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint: hint.map(str::to_string) }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:     rosterlink-linkage ", env!("CARGO_PKG_VERSION"),
        "\ntarget:     ", env!("TARGET"),
        "\ncheckpoint: v2",
    )
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    // RUST_LOG, when set, takes precedence over the flags.
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Match(args) => match_cmd::cmd_match(args),
        Commands::Validate { config } => match_cmd::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
