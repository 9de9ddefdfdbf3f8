use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tasktree", about = concat!("tasktree v", env!("CARGO_PKG_VERSION"), " - a keyboard-driven task tree"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Document file to use instead of the default data file
    #[arg(short = 'f', long, global = true)]
    pub file: Option<PathBuf>,

    /// Config file to use instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Start the UI with a new tree instead of offering to restore
    #[arg(long)]
    pub new: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree as an outline
    Show,
    /// List leaf tasks (open ones unless --all)
    Leaves(LeavesArgs),
    /// Add a task (top level unless --parent)
    Add(AddArgs),
    /// Toggle completion of a leaf task
    Toggle(IdArgs),
    /// Remove a task and everything below it
    Rm(IdArgs),
    /// Move a task before, after or under another task
    Mv(MvArgs),
    /// Write the document to a file
    Export(ExportArgs),
    /// Replace the document with the contents of a file
    Import(ImportArgs),
    /// List links found in task text and what they would preview
    Urls,
    /// Attach an image file to a task
    Attach(AttachArgs),
}

#[derive(Args)]
pub struct LeavesArgs {
    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Add under this task ID
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
#[command(group(ArgGroup::new("position").required(true).args(["before", "after", "child"])))]
pub struct MvArgs {
    /// Task ID to move
    pub id: String,
    /// Task ID to move relative to
    pub target: String,
    /// Place right before the target
    #[arg(long)]
    pub before: bool,
    /// Place right after the target
    #[arg(long)]
    pub after: bool,
    /// Append to the target's children
    #[arg(long)]
    pub child: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Destination (default: task-tree-YYYY-MM-DD.json in the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Document to import
    pub path: PathBuf,
}

#[derive(Args)]
pub struct AttachArgs {
    /// Task ID
    pub id: String,
    /// Image file
    pub file: PathBuf,
}
