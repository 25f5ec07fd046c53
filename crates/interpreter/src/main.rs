//! Brewin CLI
//!
//! Command-line interface for running and checking Brewin programs.

use brewin::InterpreterConfig;
use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "brewin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Brewin interpreter - run line-oriented Brewin programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Brewin program
    Run {
        /// Input source file
        input: PathBuf,

        /// Trace each dispatched line to stderr
        #[arg(long)]
        trace: bool,
    },

    /// Parse and validate a program without executing it
    Check {
        /// Input source file
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input, trace } => {
            init_tracing(trace);
            run_program(&input);
        }
        Commands::Check { input } => {
            init_tracing(false);
            run_check(&input);
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "brewin", &mut io::stdout());
        }
    }
}

/// Set up logging on stderr. `--trace` forces per-line dispatch traces;
/// otherwise the level comes from the environment (RUST_LOG).
fn init_tracing(trace: bool) {
    let filter = if trace {
        tracing_subscriber::EnvFilter::new("brewin=trace")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_program(input: &Path) {
    match brewin::run_file(input, InterpreterConfig::new()) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run_check(input: &Path) {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", input.display(), e);
            process::exit(1);
        }
    };
    match brewin::check_source(&source) {
        Ok(program) => {
            println!(
                "{}: {} lines, {} functions",
                input.display(),
                program.len(),
                program.functions.len()
            );
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
