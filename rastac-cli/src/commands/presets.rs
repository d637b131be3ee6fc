//! `presets` subcommand: list the preset table for a collection.

use clap::Args;
use rastac::preset::{CollectionHints, PresetCatalog, Rendering};

#[derive(Args)]
pub struct PresetsArgs {
    /// Collection identifier (e.g. sentinel-2-l2a)
    #[arg(long)]
    pub collection: String,

    /// Collection title, if known (improves family detection)
    #[arg(long)]
    pub title: Option<String>,

    /// Collection description, if known
    #[arg(long)]
    pub description: Option<String>,
}

pub fn presets(args: PresetsArgs) -> Result<(), String> {
    let catalog = PresetCatalog::new();
    let hints = CollectionHints {
        id: &args.collection,
        title: args.title.as_deref(),
        description: args.description.as_deref(),
        keywords: &[],
    };

    let family = catalog.family_for(&hints);
    println!("collection: {}", args.collection);
    println!("family:     {}", family);
    println!();

    for preset in catalog.presets(family) {
        let recipe = match &preset.rendering {
            Rendering::Bands { bands, .. } => format!("bands [{}]", bands.join(", ")),
            Rendering::Expression { expression } => format!("expr {}", expression),
        };
        println!(
            "{:<16} {:<10} {:<28} rescale {}",
            preset.key,
            preset.category.name(),
            recipe,
            preset.rescale
        );
    }
    Ok(())
}
