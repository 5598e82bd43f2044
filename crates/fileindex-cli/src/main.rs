//! fileindex CLI - command-line interface for fileindex
//!
//! Builds a JSON index of every file under a directory and, in watch
//! mode, keeps it current as files come and go.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use fileindex_watcher::{ScanOptions, WatchConfig, DEFAULT_IGNORE_FILE, DEFAULT_INDEX_FILE};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fileindex")]
#[command(author = "fileindex Contributors")]
#[command(version)]
#[command(about = "A case-insensitive basename index for a directory tree", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ignore file in the directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        locations: Locations,
    },

    /// Recreate the index once and exit
    Index {
        /// Directory to index (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        locations: Locations,
    },

    /// Keep the index up to date until interrupted
    Watch {
        /// Directory to watch (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        locations: Locations,
    },

    /// Find a file by basename, ignoring case
    Lookup {
        /// Basename to look up, with or without extension
        name: String,

        /// Indexed directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        locations: Locations,
    },

    /// Show index status and statistics
    Status {
        /// Indexed directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        locations: Locations,
    },
}

#[derive(Args)]
struct Locations {
    /// Ignore file, relative to the directory
    #[arg(long, default_value = DEFAULT_IGNORE_FILE)]
    ignore_file: PathBuf,

    /// Index file, relative to the directory
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index_file: PathBuf,

    /// Include dot-files and dot-directories
    #[arg(long)]
    hidden: bool,

    /// Skip files excluded by .gitignore
    #[arg(long)]
    gitignore: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,
}

impl Locations {
    fn into_config(self, root: PathBuf) -> WatchConfig {
        WatchConfig::new(root)
            .with_ignore_file(self.ignore_file)
            .with_index_file(self.index_file)
            .with_scan(ScanOptions {
                include_hidden: self.hidden,
                respect_gitignore: self.gitignore,
                follow_symlinks: self.follow_symlinks,
            })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path, locations } => commands::init(&locations.into_config(path)),
        Commands::Index { path, locations } => commands::index(locations.into_config(path)),
        Commands::Watch { path, locations } => commands::watch(locations.into_config(path)).await,
        Commands::Lookup {
            name,
            path,
            locations,
        } => commands::lookup(&name, &locations.into_config(path)),
        Commands::Status {
            path,
            json,
            locations,
        } => commands::status(&locations.into_config(path), json),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
