//! mdtree CLI - Markdown to editor document tree converter.
//!
//! Provides commands for:
//! - `convert`: Convert markdown (or mdast JSON) into a document tree
//! - `markdown`: Write a document tree back as markdown

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, MarkdownArgs};
use output::Output;

/// mdtree - Markdown to editor document tree converter.
#[derive(Parser)]
#[command(name = "mdtree", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown into document tree JSON.
    Convert(ConvertArgs),
    /// Write document tree JSON back as markdown.
    Markdown(MarkdownArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Convert(args) => args.verbose,
        Commands::Markdown(args) => args.verbose,
    };

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
    // Logs go to stderr so stdout stays clean for document output.
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Markdown(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
