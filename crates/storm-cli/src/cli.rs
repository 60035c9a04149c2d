//! CLI argument and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "storm", version, about = "Storm platform tools over the Model Context Protocol")]
pub struct Cli {
    /// Enable verbose logging (stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.storm/config.json.
    #[arg(long, global = true, env = "STORM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the platform tools over stdio (default).
    Serve {
        /// Also publish the file tools and resources rooted here.
        #[arg(long)]
        files_root: Option<PathBuf>,
    },

    /// Serve only the file tools and resources over stdio.
    Files {
        /// Directory the file tools are confined to.
        #[arg(long)]
        root: PathBuf,
    },

    /// List the published tools, or show one tool's input schema.
    Tools {
        /// Tool to describe.
        name: Option<String>,

        /// Include the file tools rooted here.
        #[arg(long)]
        files_root: Option<PathBuf>,
    },
}
