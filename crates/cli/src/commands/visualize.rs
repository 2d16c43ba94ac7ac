//! `smithers visualize`: render a saved snapshot without starting a session.

use smithers_core::{ContextStore, EntryRange, Snapshot};
use smithers_visualizer::{visualize, GraphvizRenderer, RenderOutcome};
use std::path::Path;

use super::load_config;

pub async fn run(
    config_path: Option<&Path>,
    snapshot: &Path,
    output: Option<&Path>,
    range: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let range: EntryRange = match range {
        Some(text) => text.parse()?,
        None => EntryRange::full(),
    };

    let store = ContextStore::from_snapshot(Snapshot::read(snapshot)?);
    let renderer = GraphvizRenderer::new(&config.visualizer.graphviz_binary)
        .with_opener(config.visualizer.opener.clone());

    match visualize(&store, &range, output, &renderer).await? {
        RenderOutcome::Written(path) => println!("Visualization saved to {}", path.display()),
        RenderOutcome::Displayed(path) => println!("Visualization displayed ({})", path.display()),
    }
    Ok(())
}
