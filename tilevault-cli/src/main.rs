//! TileVault CLI - save slippy-map tiles for offline use
//!
//! ```text
//! tilevault save --north 53.56 --west 9.98 --south 53.55 --east 10.0 --zoom 15
//! tilevault resolve --x 17302 --y 10598 --z 15
//! tilevault resolve --lat 53.55 --lng 9.99 --z 15
//! tilevault stats
//! tilevault clear
//! ```

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilevault::logging::{init_logging, LoggingConfig};
use tracing::Level;

use commands::config::ConfigCommands;
use commands::resolve::ResolveArgs;
use commands::save::SaveArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tilevault", version, about = "Offline tile cache for slippy maps")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file (rotated daily)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log filter directives, overriding --verbose (e.g. "tilevault::fetch=trace")
    #[arg(long, global = true, value_name = "DIRECTIVES")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save the tiles covering a view, from its zoom to the maximum zoom
    Save(SaveArgs),

    /// Remove every saved tile
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the number of saved tiles and the store location
    Stats,

    /// Show whether a tile would be served from the store or the network
    Resolve(ResolveArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let mut logging = LoggingConfig::default()
        .with_level(level)
        .with_target(cli.verbose);
    if let Some(filter) = cli.log_filter {
        logging = logging.with_filter(filter);
    }
    if let Some(path) = cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = init_logging(logging)?;

    match cli.command {
        Commands::Save(args) => commands::save::run(args).await,
        Commands::Clear { yes } => commands::cache::run_clear(yes).await,
        Commands::Stats => commands::cache::run_stats().await,
        Commands::Resolve(args) => commands::resolve::run(args).await,
        Commands::Config { command } => commands::config::run(command),
    }
}
