//! Common types and utilities shared across CLI commands.

use std::sync::Arc;

use dialoguer::Confirm;
use tilevault::config::{ConfigFile, OfflineConfig};
use tilevault::controller::ConfirmationGate;
use tilevault::fetch::ReqwestClient;
use tilevault::store::{BoxFuture, DiskTileStore, GuardedStore};
use tracing::{debug, warn};

use crate::error::CliError;

/// Loads the configuration file, failing on invalid values.
pub fn load_config() -> Result<ConfigFile, CliError> {
    let config = ConfigFile::load()?;
    debug!(cache = %config.cache.directory_or_default().display(), "Configuration loaded");
    Ok(config)
}

/// Opens the disk store configured in `[cache]`.
pub async fn open_store(config: &ConfigFile) -> Result<Arc<DiskTileStore>, CliError> {
    let store = DiskTileStore::open(config.cache.directory_or_default()).await?;
    Ok(Arc::new(store))
}

/// Wraps an opened store for use by the controller.
pub fn guarded(store: Arc<DiskTileStore>) -> Arc<GuardedStore> {
    Arc::new(GuardedStore::new(store))
}

/// Creates the HTTP client for `config`.
pub fn http_client(config: &OfflineConfig) -> Result<Arc<ReqwestClient>, CliError> {
    let client = ReqwestClient::with_settings(config.request_timeout, &config.user_agent)?;
    Ok(Arc::new(client))
}

/// Asks on the terminal before saving or clearing.
pub struct PromptGate;

impl PromptGate {
    fn ask(prompt: String, default: bool) -> BoxFuture<'static, bool> {
        Box::pin(async move {
            let answer = tokio::task::spawn_blocking(move || {
                Confirm::new()
                    .with_prompt(prompt)
                    .default(default)
                    .interact()
            })
            .await;
            match answer {
                Ok(Ok(confirmed)) => confirmed,
                Ok(Err(e)) => {
                    warn!(error = %e, "Confirmation prompt failed, treating as declined");
                    false
                }
                Err(e) => {
                    warn!(error = %e, "Confirmation prompt task failed");
                    false
                }
            }
        })
    }
}

impl ConfirmationGate for PromptGate {
    fn confirm_save(&self, count: usize) -> BoxFuture<'_, bool> {
        Self::ask(format!("Save {} tiles for offline use?", count), true)
    }

    fn confirm_removal(&self, count: Option<usize>) -> BoxFuture<'_, bool> {
        let prompt = match count {
            Some(count) => format!("Remove all {} offline tiles?", count),
            None => "Remove all offline tiles?".to_string(),
        };
        Self::ask(prompt, false)
    }
}

/// Formats a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
