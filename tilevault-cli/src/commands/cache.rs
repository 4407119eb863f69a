//! Offline store maintenance: `clear` and `stats`.

use std::sync::Arc;

use tilevault::controller::{OfflineController, RemovalOutcome};
use tilevault::store::TileStore;

use super::common::{format_size, guarded, http_client, load_config, open_store, PromptGate};
use crate::error::CliError;

/// Remove every saved tile.
pub async fn run_clear(yes: bool) -> Result<(), CliError> {
    let file = load_config()?;
    let config = file.to_offline_config()?;
    let directory = file.cache.directory_or_default();
    let store = open_store(&file).await?;
    let client = http_client(&config)?;

    let mut controller = OfflineController::new(config, guarded(store), client)?;
    if !yes {
        controller = controller.with_gate(Arc::new(PromptGate));
    }

    println!("Offline store: {}", directory.display());
    match controller.remove_all().await? {
        RemovalOutcome::Declined => println!("Removal cancelled"),
        RemovalOutcome::Removed { count: Some(count) } => println!("Removed {} tiles", count),
        RemovalOutcome::Removed { count: None } => println!("Removed all tiles"),
    }
    Ok(())
}

/// Show how many tiles are saved and where.
pub async fn run_stats() -> Result<(), CliError> {
    let file = load_config()?;
    let store = open_store(&file).await?;
    let tiles = store.size().await?;
    let bytes = store.disk_usage().await?;

    println!("Offline store: {}", store.directory().display());
    println!("  Tiles: {}", tiles);
    println!("  Size:  {}", format_size(bytes));
    Ok(())
}
