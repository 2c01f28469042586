use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dragboard", about = concat!("dragboard v", env!("CARGO_PKG_VERSION"), " - drag-and-drop transitions for task boards"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Engine config file (TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off); overrides the config
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a scripted drag session against an in-memory backend
    Replay(ReplayArgs),
    /// Reconcile a stored sidebar order against a folder set
    Sidebar(SidebarArgs),
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ReplayArgs {
    /// Scenario file (JSON)
    pub scenario: PathBuf,
}

#[derive(Args)]
pub struct SidebarArgs {
    /// Stored sidebar order (JSON array of strings); missing means empty
    pub state_file: PathBuf,
    /// Existing folder ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub folders: Vec<String>,
    /// Write the reconciled order back to the state file
    #[arg(long)]
    pub write: bool,
}
