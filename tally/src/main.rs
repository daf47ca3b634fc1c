//! Tally CLI

use clap::{ArgAction, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tally::error::report_syntax_error;
use tally::interp::{evaluate, Context};
use tally::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally", version, about = "Tally - a small scripting language")]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Tally source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Start the interactive REPL (default)
    Repl,
    /// Evaluate a single line of source
    Eval {
        /// Source text
        source: String,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Run { file } => run_file(&file),
        Command::Repl => run_repl(),
        Command::Eval { source } => run_source(&source, "<eval>"),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "tally=warn",
        1 => "tally=debug",
        _ => "tally=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(io::stderr)
        .init();
}

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

fn run_file(path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    run_source(&source, &path.display().to_string())
}

/// Evaluate in a fresh context and print a non-null result
fn run_source(source: &str, name: &str) -> CliResult {
    let mut context = Context::new(name);
    match evaluate(source, name, &mut context) {
        Ok(value) => {
            if !value.is_null() {
                println!("{value}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Syntax(err)) => {
            report_syntax_error(name, source, &err, io::stderr())?;
            Ok(ExitCode::FAILURE)
        }
        Err(Error::Runtime(err)) => {
            eprintln!("{}", err.traceback());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_repl() -> CliResult {
    let mut repl = tally::repl::Repl::new()?;
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}

fn parse_file(path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match tally::parser::parse(&source) {
        Ok(program) => {
            println!("{}", serde_json::to_string_pretty(&program)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_syntax_error(&filename, &source, &err, io::stderr())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn tokenize_file(path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match tally::lexer::tokenize(&source) {
        Ok(tokens) => {
            for token in &tokens {
                println!("{:?} @ {}", token.kind, token.span);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_syntax_error(&filename, &source, &err, io::stderr())?;
            Ok(ExitCode::FAILURE)
        }
    }
}
