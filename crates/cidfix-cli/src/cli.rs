use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cidfix",
    about = "Relabel legacy-raw blocks and repair the nodes and pins that reference them",
    version
)]
pub struct Cli {
    /// Repository to migrate [default: $CIDFIX_PATH, then ~/.cidfix]
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Abort on the first linked node that cannot be loaded
    #[arg(long)]
    pub strict: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
