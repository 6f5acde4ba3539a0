//! Alsvid command-line interface.
//!
//! The main entry point for the `alsvid` tool: parse, check, execute and
//! normalize `OpenQASM` 2.0 sources.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, emit, run};

/// Alsvid - an OpenQASM 2.0 front end and interpreter
#[derive(Parser)]
#[command(name = "alsvid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and report what was declared
    Check {
        /// Input file (QASM 2.0)
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a program and print it back as normalized source
    Emit {
        /// Input file (QASM 2.0)
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Parse a program and execute it
    Run {
        /// Input file (QASM 2.0)
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Check { input, json } => check::execute(&input, json),
        Commands::Emit { input, output } => emit::execute(&input, output.as_deref()),
        Commands::Run { input } => run::execute(&input),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
