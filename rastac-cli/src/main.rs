//! rastac CLI - command-line interface
//!
//! This binary provides a command-line interface to the rastac library:
//! inspecting the preset catalog, resolving generic band names against an
//! item, and printing synthesized tile URLs.

mod commands;

use clap::{Parser, Subcommand};
use std::process;

#[derive(Parser)]
#[command(name = "rastac")]
#[command(about = "Tile-URL synthesis and preset inspection for STAC items", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List visualization presets applicable to a collection
    Presets(commands::PresetsArgs),

    /// Resolve a preset's generic band names against an item
    Resolve(commands::ResolveArgs),

    /// Synthesize the tile URL for an item and preset
    TileUrl(commands::TileUrlArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Presets(args) => commands::presets(args),
        Command::Resolve(args) => commands::resolve(args),
        Command::TileUrl(args) => commands::tile_url(args).await,
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}
