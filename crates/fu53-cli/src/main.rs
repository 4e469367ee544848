//! # fu53 CLI
//!
//! Runs a program under the fu53 interposer and reports how the current
//! environment classifies each policy group.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fu53_policy::logging::{init_logging, LogLevel};

mod launch;
mod report;

/// fu53 - make fuzz targets harmless to the host filesystem
#[derive(Parser)]
#[command(name = "fu53")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command with the interposer preloaded
    Run(launch::RunArgs),

    /// Show the classification of every policy group for this environment
    Policy {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Cli::parse();
    init_logging(LogLevel::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Run(args) => launch::run(args),
        Commands::Policy { json } => report::print(json),
    }
}
