#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]

mod commands;
mod logging;

use clap::Parser;
use commands::dev::{self, DevAction};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "moher")]
#[command(author, version, about = "An on-demand, no-bundling ES module dev server", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the dev server (default)
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value_t = 4000)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "localhost")]
        host: String,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = match cli.cwd {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    match cli.command {
        // Bare invocation serves the working directory with defaults.
        None => {
            dev::run(DevAction {
                cwd,
                port: 4000,
                host: "localhost".to_string(),
            })
            .await
        }
        Some(Commands::Dev { port, host }) => dev::run(DevAction { cwd, port, host }).await,
        Some(Commands::Version) => {
            println!("moher {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
