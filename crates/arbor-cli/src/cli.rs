use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Inspect and edit Arbor item databases",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store configuration (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON snapshot to load, and to write back after changes
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List database names
    Databases,
    /// Look up one item by id or path
    Get(GetArgs),
    /// List every item matching a path pattern
    Find(FindArgs),
    /// List the children of an item
    Children(ChildrenArgs),
    /// Save an item from a JSON file
    Save(SaveArgs),
    /// Move an item and its descendants to the recycle bin
    Remove(RemoveArgs),
    /// Discard cached template metadata in every database
    ResetTemplates,
    /// Run the consistency check on a database
    Check(CheckArgs),
    /// Move or rename an item
    Move(MoveArgs),
}

#[derive(Args)]
pub struct GetArgs {
    #[arg(long)]
    pub db: String,
    #[arg(long, required_unless_present = "path")]
    pub id: Option<String>,
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Args)]
pub struct FindArgs {
    #[arg(long)]
    pub db: String,
    /// Path or pattern; `*` matches any single segment
    #[arg(long)]
    pub path: String,
}

#[derive(Args)]
pub struct ChildrenArgs {
    #[arg(long)]
    pub db: String,
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct SaveArgs {
    /// Item payload in JSON
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RemoveArgs {
    #[arg(long)]
    pub db: String,
    #[arg(long)]
    pub id: String,
    /// Remove with store events disabled, as bulk operations do
    #[arg(long)]
    pub bulk: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub db: String,
    #[arg(long)]
    pub fix: bool,
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(long)]
    pub db: String,
    #[arg(long)]
    pub id: String,
    /// New path of the item
    #[arg(long)]
    pub to: String,
}
