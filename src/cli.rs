use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "jdoc")]
#[command(about = "Documentation models from Java sources")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default jdoc.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Generate documentation for every configured pass
    Generate {
        /// Source directory to analyze, replacing the configured source roots
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory for documentation
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rewrite every output file, changed or not
        #[arg(long)]
        force: bool,
    },

    /// Update only outputs whose content changed
    Sync {
        /// Dry run - show what would be updated
        #[arg(long)]
        dry_run: bool,

        /// Fail if changes would be made (useful for CI)
        #[arg(long)]
        fail_on_changes: bool,
    },

    /// Print the documentation model of one source file as JSON
    Dump {
        /// Java source file
        file: PathBuf,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => {
                engine.init(path).await
            }
            Commands::Generate { source, output, force } => {
                engine.generate(source, output, force).await
            }
            Commands::Sync { dry_run, fail_on_changes } => {
                engine.sync(dry_run, fail_on_changes).await
            }
            Commands::Dump { file } => {
                engine.dump(file).await
            }
        }
    }
}
