use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments accepted by the `themer` binary.
#[derive(Parser, Debug)]
#[command(
    name = "themer",
    version,
    about = "Validate, apply and capture Discord guild themes"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "THEMER_CONFIG",
        help = "Configuration file (default: ./themer.toml, then the user config directory)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        help = "Theme directory (default: from configuration)"
    )]
    pub themes_dir: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "THEMER_SNAPSHOT",
        help = "Guild snapshot (JSON) the commands run against"
    )]
    pub snapshot: PathBuf,
    #[arg(short, long, help = "Log at debug level")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List registered themes
    List,
    /// Print one theme as JSON
    Show { name: String },
    /// Validate a theme file and print its diagnostics
    Validate { file: PathBuf },
    /// Apply a registered theme to the guild
    Apply {
        name: String,
        #[arg(long, help = "Collect the changes without sending them")]
        dry_run: bool,
        #[arg(long, help = "Write the changed guild back to the snapshot file")]
        save: bool,
    },
    /// Export the guild as a new theme file
    Capture {
        name: String,
        #[arg(long, help = "Validate and register the new theme")]
        register: bool,
    },
}
