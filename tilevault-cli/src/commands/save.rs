//! `tilevault save` - save a map view for offline use.

use std::sync::Arc;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tilevault::controller::{event_channel, MapView, OfflineController, OfflineEvent, SaveOutcome};
use tilevault::coord::LatLngBounds;
use tokio::sync::mpsc::UnboundedReceiver;

use super::common::{guarded, http_client, load_config, open_store, PromptGate};
use crate::error::CliError;

/// Arguments for `save`.
#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Northern edge of the view, in degrees latitude
    #[arg(long, allow_hyphen_values = true)]
    pub north: f64,

    /// Western edge of the view, in degrees longitude
    #[arg(long, allow_hyphen_values = true)]
    pub west: f64,

    /// Southern edge of the view, in degrees latitude
    #[arg(long, allow_hyphen_values = true)]
    pub south: f64,

    /// Eastern edge of the view, in degrees longitude
    #[arg(long, allow_hyphen_values = true)]
    pub east: f64,

    /// Current zoom level of the view
    #[arg(long)]
    pub zoom: u8,

    /// Override the minimum zoom from config.ini
    #[arg(long)]
    pub min_zoom: Option<u8>,

    /// Override the maximum zoom from config.ini
    #[arg(long)]
    pub max_zoom: Option<u8>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the save command.
pub async fn run(args: SaveArgs) -> Result<(), CliError> {
    let file = load_config()?;
    let mut config = file.to_offline_config()?;
    if let Some(min_zoom) = args.min_zoom {
        config.min_zoom = min_zoom;
    }
    if let Some(max_zoom) = args.max_zoom {
        config.max_zoom = max_zoom;
    }

    let bounds = LatLngBounds::from_edges(args.north, args.west, args.south, args.east)?;
    let view = MapView::new(bounds, args.zoom);

    let store = open_store(&file).await?;
    let client = http_client(&config)?;
    let (events, rx) = event_channel();

    let mut controller =
        OfflineController::new(config, guarded(store), client)?.with_events(events);
    if !args.yes {
        controller = controller.with_gate(Arc::new(PromptGate));
    }

    let progress = tokio::spawn(show_progress(rx));
    let result = controller.save_view(&view).await;
    drop(controller);
    // The task ends once the controller's sender is gone.
    let _ = progress.await;

    match result? {
        SaveOutcome::Declined => {
            println!("Save cancelled");
            Ok(())
        }
        SaveOutcome::Completed(report) if report.is_success() => {
            println!(
                "{} Saved {} tiles",
                style("✓").green(),
                style(report.saved).bold()
            );
            Ok(())
        }
        SaveOutcome::Completed(report) => {
            for failure in report.failures.iter().take(5) {
                eprintln!(
                    "  {} {}: {}",
                    style("✗").red(),
                    failure.request.coord(),
                    failure.error
                );
            }
            if report.failure_count() > 5 {
                eprintln!("  ... and {} more", report.failure_count() - 5);
            }
            Err(CliError::PartialSave {
                failed: report.failure_count(),
                total: report.total,
            })
        }
    }
}

/// Drives a progress bar from controller events.
async fn show_progress(mut rx: UnboundedReceiver<OfflineEvent>) {
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = rx.recv().await {
        match event {
            OfflineEvent::SaveStart { count } => {
                let pb = ProgressBar::new(count as u64);
                if let Ok(template) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta})")
                {
                    pb.set_style(template.progress_chars("=> "));
                }
                bar = Some(pb);
            }
            OfflineEvent::TileSaved { .. } | OfflineEvent::SaveTileError { .. } => {
                if let Some(pb) = &bar {
                    pb.inc(1);
                }
            }
            event if event.is_terminal() => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}
