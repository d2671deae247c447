//! # zodiac CLI
//!
//! Scaffolding for new zodiac services:
//!
//! ```text
//! zodiac new <project_name> --tpl standard-3tier -o <output_dir> [--force]
//! ```

pub mod commands;
pub mod scaffold;

use clap::{Parser, Subcommand};

pub use scaffold::{Scaffold, ScaffoldError, TemplateContext, ZodiacSource};

#[derive(Parser, Debug)]
#[command(
    name = "zodiac",
    author,
    version,
    about = "Scaffolding for actix-web services built on zodiac"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new project from a template
    New(commands::new::NewArgs),
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::New(args) => commands::new::run(&args).map(|_| ()),
    }
}
