//! The offline cache controller.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use super::confirm::ConfirmationGate;
use super::error::{ControllerError, ControllerResult};
use super::events::{EventEmitter, OfflineEvent};
use super::plan::{MapView, RemovalOutcome, RemovalPlan, SaveOutcome, SavePlan};
use super::state::{ControllerState, StateCell};
use crate::config::{OfflineConfig, ProgressMode};
use crate::coord::{MapGeometry, WebMercator};
use crate::fetch::{AsyncHttpClient, SaveReport, SaveSession, TileFetcher, TileOutcome};
use crate::resolver::OfflineTileResolver;
use crate::store::{GuardedStore, TileStore};
use crate::tile::{count_range, enumerate_range, TileUrlTemplate};

/// Orchestrates saving the visible map area and clearing the store.
///
/// The controller decides what to fetch and when, and reports progress as
/// [`OfflineEvent`]s. Network and storage access go through the injected
/// client and store.
///
/// # Example
///
/// ```ignore
/// let (events, mut rx) = event_channel();
/// let controller = OfflineController::new(config, store, client)?.with_events(events);
///
/// let plan = controller.plan_save(&view)?;
/// println!("{} tiles", plan.count());
/// let report = controller.commit_save(plan).await?;
/// ```
pub struct OfflineController {
    config: OfflineConfig,
    template: TileUrlTemplate,
    geometry: Arc<dyn MapGeometry>,
    store: Arc<GuardedStore>,
    fetcher: TileFetcher,
    events: EventEmitter,
    gate: Option<Arc<dyn ConfirmationGate>>,
    state: StateCell,
}

impl OfflineController {
    /// Creates a controller using Web Mercator geometry, no event listener
    /// and no confirmation gate.
    pub fn new(
        config: OfflineConfig,
        store: Arc<GuardedStore>,
        client: Arc<dyn AsyncHttpClient>,
    ) -> ControllerResult<Self> {
        config.validate()?;
        let template = config.template()?;
        let geometry = Arc::new(WebMercator::new(config.tile_size));

        Ok(Self {
            config,
            template,
            geometry,
            store,
            fetcher: TileFetcher::new(client),
            events: EventEmitter::disabled(),
            gate: None,
            state: StateCell::default(),
        })
    }

    /// Replaces the map projection.
    pub fn with_geometry(mut self, geometry: Arc<dyn MapGeometry>) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sends lifecycle events to `events`.
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    /// Consults `gate` in [`save_view`](Self::save_view) and
    /// [`remove_all`](Self::remove_all).
    pub fn with_gate(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub fn template(&self) -> &TileUrlTemplate {
        &self.template
    }

    pub fn store(&self) -> &Arc<GuardedStore> {
        &self.store
    }

    pub fn state(&self) -> ControllerState {
        self.state.get()
    }

    /// A resolver reading from this controller's store.
    pub fn resolver(&self) -> OfflineTileResolver {
        let store: Arc<dyn TileStore> = self.store.clone();
        OfflineTileResolver::new(self.template.clone(), store)
    }

    /// Enumerates the tiles for `view` from its zoom up to `max_zoom`.
    ///
    /// Below `min_zoom` nothing is enumerated, `BelowMinZoom` is emitted and
    /// an error returned. Above `max_zoom` the plan is empty. The tiles are
    /// counted before any is built; more than `max_tiles` emits
    /// `TooManyTiles` and returns an error.
    pub fn plan_save(&self, view: &MapView) -> ControllerResult<SavePlan> {
        let min_zoom = self.config.min_zoom;
        if view.zoom < min_zoom {
            info!(zoom = view.zoom, min_zoom, "Save rejected below minimum zoom");
            self.events.emit(OfflineEvent::BelowMinZoom {
                zoom: view.zoom,
                min_zoom,
            });
            return Err(ControllerError::BelowMinZoom {
                zoom: view.zoom,
                min_zoom,
            });
        }

        let zooms = view.zoom..=self.config.max_zoom;
        let max_tiles = self.config.max_tiles;
        let count = count_range(
            &view.bounds,
            zooms.clone(),
            self.config.tile_size,
            self.geometry.as_ref(),
        );
        if count.map_or(true, |count| count > max_tiles) {
            info!(?count, max_tiles, "Save rejected above tile limit");
            self.events
                .emit(OfflineEvent::TooManyTiles { count, max_tiles });
            return Err(ControllerError::TooManyTiles { count, max_tiles });
        }

        self.state.set(ControllerState::Enumerating);
        let requests = enumerate_range(
            &view.bounds,
            zooms,
            self.config.tile_size,
            self.geometry.as_ref(),
            &self.template,
        );
        info!(
            zoom = view.zoom,
            max_zoom = self.config.max_zoom,
            tiles = requests.len(),
            "Save planned"
        );

        let guard = self
            .state
            .await_confirmation(ControllerState::AwaitingConfirmation);
        Ok(SavePlan {
            view: *view,
            requests,
            guard,
        })
    }

    /// Fetches and stores every tile of `plan`.
    ///
    /// Emits `SaveStart`, then per-tile events in [`ProgressMode::PerTile`],
    /// then `SaveEnd` when every tile was saved or `SaveError` otherwise.
    /// Individual tile failures never stop the save.
    pub async fn commit_save(&self, mut plan: SavePlan) -> ControllerResult<SaveReport> {
        if !plan.guard.belongs_to(&self.state) {
            return Err(ControllerError::ForeignPlan);
        }
        plan.guard.disarm();
        let _active = self.state.enter(ControllerState::Fetching);

        let requests = std::mem::take(&mut plan.requests);
        let count = requests.len();
        info!(tiles = count, "Saving tiles");
        self.events.emit(OfflineEvent::SaveStart { count });

        let per_tile = self.config.progress_mode == ProgressMode::PerTile;
        let mut session = SaveSession::new(requests.clone());
        let mut outcomes = self.fetcher.fetch_and_store(requests, &self.store);

        while let Some(outcome) = outcomes.next().await {
            if per_tile {
                self.events.emit(tile_event(&outcome));
            }
            session.record(&outcome);
        }
        drop(outcomes);
        debug_assert!(session.is_complete());

        let report = session.into_report();
        if report.is_success() {
            info!(saved = report.saved, "Save complete");
            self.events.emit(OfflineEvent::SaveEnd {
                saved: report.saved,
            });
        } else {
            warn!(
                saved = report.saved,
                failed = report.failure_count(),
                "Save finished with failures"
            );
            self.events.emit(OfflineEvent::SaveError {
                saved: report.saved,
                failed: report.failure_count(),
                error: describe_failures(&report),
            });
        }

        Ok(report)
    }

    /// Plans, asks the confirmation gate, then commits.
    pub async fn save_view(&self, view: &MapView) -> ControllerResult<SaveOutcome> {
        let plan = self.plan_save(view)?;

        if let Some(gate) = &self.gate {
            if !gate.confirm_save(plan.count()).await {
                debug!(tiles = plan.count(), "Save declined");
                return Ok(SaveOutcome::Declined);
            }
        }

        Ok(SaveOutcome::Completed(self.commit_save(plan).await?))
    }

    /// Prepares a store clear.
    ///
    /// When `report_size_before_removal` is set the store size is queried
    /// first; a failure emits `SizeError` and the removal does not proceed.
    pub async fn plan_removal(&self) -> ControllerResult<RemovalPlan> {
        let count = if self.config.report_size_before_removal {
            match self.store.size().await {
                Ok(size) => Some(size),
                Err(error) => {
                    warn!(error = %error, "Store size query failed");
                    self.events.emit(OfflineEvent::SizeError {
                        error: error.clone(),
                    });
                    return Err(ControllerError::Size(error));
                }
            }
        } else {
            None
        };

        debug!(?count, "Removal planned");
        let guard = self
            .state
            .await_confirmation(ControllerState::AwaitingRemovalConfirmation);
        Ok(RemovalPlan { count, guard })
    }

    /// Clears the store.
    ///
    /// Emits `RemoveStart`, then `RemoveEnd` or `RemoveTilesError`. A failed
    /// clear is not rolled back.
    pub async fn commit_removal(&self, mut plan: RemovalPlan) -> ControllerResult<()> {
        if !plan.guard.belongs_to(&self.state) {
            return Err(ControllerError::ForeignPlan);
        }
        plan.guard.disarm();
        let active = self.state.enter(ControllerState::Removing);
        self.events.emit(OfflineEvent::RemoveStart { count: plan.count });

        let result = self.store.clear_all().await;
        drop(active);

        match result {
            Ok(()) => {
                info!(count = ?plan.count, "Offline tiles removed");
                self.events.emit(OfflineEvent::RemoveEnd);
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "Clearing offline tiles failed");
                self.events.emit(OfflineEvent::RemoveTilesError {
                    error: error.clone(),
                });
                Err(ControllerError::Clear(error))
            }
        }
    }

    /// Plans, asks the confirmation gate, then clears the store.
    pub async fn remove_all(&self) -> ControllerResult<RemovalOutcome> {
        let plan = self.plan_removal().await?;

        if let Some(gate) = &self.gate {
            if !gate.confirm_removal(plan.count()).await {
                debug!("Removal declined");
                return Ok(RemovalOutcome::Declined);
            }
        }

        let count = plan.count();
        self.commit_removal(plan).await?;
        Ok(RemovalOutcome::Removed { count })
    }
}

fn tile_event(outcome: &TileOutcome) -> OfflineEvent {
    match outcome {
        TileOutcome::Saved(request) => OfflineEvent::TileSaved {
            key: request.key().to_string(),
            url: request.url().to_string(),
        },
        TileOutcome::Failed { request, error } => OfflineEvent::SaveTileError {
            key: request.key().to_string(),
            url: request.url().to_string(),
            error: error.clone(),
        },
    }
}

fn describe_failures(report: &SaveReport) -> String {
    match report.failures.first() {
        Some(first) if report.failure_count() == 1 => {
            format!("1 of {} tiles failed: {}", report.total, first.error)
        }
        Some(first) => format!(
            "{} of {} tiles failed, first: {}",
            report.failure_count(),
            report.total,
            first.error
        ),
        None => format!("{} of {} tiles saved", report.saved, report.total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::event_channel;
    use crate::coord::{LatLng, LatLngBounds, PixelBounds, PixelPoint, TileCoord};
    use std::time::Duration;

    use crate::fetch::{FetchError, MockHttpClient};
    use crate::store::{BoxFuture, MemoryTileStore, StoreError, TileBlob};
    use tokio::sync::mpsc::UnboundedReceiver;

    const TEMPLATE: &str = "https://{s}.tile.example.com/{z}/{x}/{y}.png";

    /// Projects every view onto the same 2x2 block of tiles.
    struct FixedGeometry;

    impl MapGeometry for FixedGeometry {
        fn project(&self, _position: &LatLng, _zoom: u8) -> PixelPoint {
            PixelPoint::new(0.0, 0.0)
        }

        fn project_bounds(&self, _bounds: &LatLngBounds, _zoom: u8) -> PixelBounds {
            PixelBounds::new(PixelPoint::new(0.0, 0.0), PixelPoint::new(511.0, 511.0))
        }
    }

    struct FixedGate(bool);

    impl ConfirmationGate for FixedGate {
        fn confirm_save(&self, _count: usize) -> BoxFuture<'_, bool> {
            let answer = self.0;
            Box::pin(async move { answer })
        }

        fn confirm_removal(&self, _count: Option<usize>) -> BoxFuture<'_, bool> {
            let answer = self.0;
            Box::pin(async move { answer })
        }
    }

    /// A tile server that never answers.
    struct StallingClient;

    impl AsyncHttpClient for StallingClient {
        fn get<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<TileBlob, FetchError>> {
            Box::pin(futures::future::pending())
        }
    }

    /// A store whose size query and clear can be made to fail.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryTileStore,
        fail_size: bool,
        fail_clear: bool,
    }

    impl TileStore for FaultyStore {
        fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileBlob>, StoreError>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, blob: TileBlob) -> BoxFuture<'_, Result<(), StoreError>> {
            self.inner.set(key, blob)
        }
        fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
            self.inner.remove(key)
        }
        fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
            if self.fail_clear {
                return Box::pin(async { Err(StoreError::Backend("clear refused".to_string())) });
            }
            self.inner.clear()
        }
        fn size(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
            if self.fail_size {
                return Box::pin(async { Err(StoreError::Backend("size refused".to_string())) });
            }
            self.inner.size()
        }
    }

    fn config() -> OfflineConfig {
        OfflineConfig::new(TEMPLATE).with_zoom_range(13, 19)
    }

    fn view(zoom: u8) -> MapView {
        MapView::new(LatLngBounds::from_edges(1.0, 0.0, 0.0, 1.0).unwrap(), zoom)
    }

    fn build(
        config: OfflineConfig,
        store: Arc<dyn TileStore>,
        client: Arc<MockHttpClient>,
    ) -> (OfflineController, UnboundedReceiver<OfflineEvent>) {
        let (events, rx) = event_channel();
        let controller = OfflineController::new(config, Arc::new(GuardedStore::new(store)), client)
            .unwrap()
            .with_geometry(Arc::new(FixedGeometry))
            .with_events(events);
        (controller, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<OfflineEvent>) -> Vec<OfflineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn names(events: &[OfflineEvent]) -> Vec<&'static str> {
        events.iter().map(OfflineEvent::name).collect()
    }

    #[tokio::test]
    async fn test_below_min_zoom_is_rejected_without_fetching() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());

        let result = controller.plan_save(&view(12));

        assert!(matches!(
            result,
            Err(ControllerError::BelowMinZoom {
                zoom: 12,
                min_zoom: 13
            })
        ));
        assert_eq!(names(&drain(&mut rx)), vec!["below_min_zoom"]);
        assert_eq!(client.call_count(), 0);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_tile_limit_rejects_before_enumerating() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let config = config().with_max_tiles(27);
        let (controller, mut rx) = build(config, Arc::new(MemoryTileStore::new()), client.clone());

        let result = controller.plan_save(&view(13));

        assert!(matches!(
            result,
            Err(ControllerError::TooManyTiles {
                count: Some(28),
                max_tiles: 27
            })
        ));
        assert_eq!(names(&drain(&mut rx)), vec!["too_many_tiles"]);
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whole_world_from_zoom_zero_is_rejected() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let store = Arc::new(GuardedStore::new(Arc::new(MemoryTileStore::new())));
        let controller = OfflineController::new(OfflineConfig::default(), store, client).unwrap();
        let world = MapView::new(
            LatLngBounds::from_edges(85.0, -180.0, -85.0, 180.0).unwrap(),
            0,
        );

        let err = controller.plan_save(&world).unwrap_err();

        match err {
            ControllerError::TooManyTiles { count, max_tiles } => {
                assert!(count.unwrap() > max_tiles);
                assert_eq!(max_tiles, crate::config::DEFAULT_MAX_TILES);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_commit_returns_to_idle() {
        let store = Arc::new(GuardedStore::new(Arc::new(MemoryTileStore::new())));
        let controller = OfflineController::new(config(), store, Arc::new(StallingClient))
            .unwrap()
            .with_geometry(Arc::new(FixedGeometry));

        let plan = controller.plan_save(&view(19)).unwrap();
        let commit = controller.commit_save(plan);
        let timed_out = tokio::time::timeout(Duration::from_millis(20), commit).await;

        assert!(timed_out.is_err());
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_save_covers_every_zoom_to_max() {
        let client = Arc::new(MockHttpClient::ok(&[1, 2, 3]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());

        let plan = controller.plan_save(&view(13)).unwrap();
        assert_eq!(plan.count(), 28);
        assert_eq!(controller.state(), ControllerState::AwaitingConfirmation);

        let report = controller.commit_save(plan).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.saved, 28);
        assert_eq!(client.call_count(), 28);
        assert_eq!(controller.store().size().await.unwrap(), 28);
        assert_eq!(controller.state(), ControllerState::Idle);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 30);
        assert!(matches!(events[0], OfflineEvent::SaveStart { count: 28 }));
        assert!(events[1..29]
            .iter()
            .all(|e| matches!(e, OfflineEvent::TileSaved { .. })));
        assert!(matches!(events[29], OfflineEvent::SaveEnd { saved: 28 }));
    }

    #[tokio::test]
    async fn test_partial_failure_reports_each_tile_and_ends_with_error() {
        let template = config().template().unwrap();
        let failing: Vec<String> = (13..=19)
            .map(|z| template.resolve(&TileCoord::new(0, 0, z)))
            .collect();
        let client = Arc::new(MockHttpClient::ok(&[1]).failing_on(failing));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client);

        let plan = controller.plan_save(&view(13)).unwrap();
        let report = controller.commit_save(plan).await.unwrap();

        assert_eq!(report.saved, 21);
        assert_eq!(report.failure_count(), 7);
        assert_eq!(controller.store().size().await.unwrap(), 21);

        let events = drain(&mut rx);
        let tile_errors = events
            .iter()
            .filter(|e| matches!(e, OfflineEvent::SaveTileError { .. }))
            .count();
        assert_eq!(tile_errors, 7);
        assert!(matches!(
            events.last(),
            Some(OfflineEvent::SaveError {
                saved: 21,
                failed: 7,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_aggregate_mode_emits_only_session_events() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let config = config().with_progress_mode(ProgressMode::Aggregate);
        let (controller, mut rx) = build(config, Arc::new(MemoryTileStore::new()), client);

        let plan = controller.plan_save(&view(18)).unwrap();
        controller.commit_save(plan).await.unwrap();

        assert_eq!(names(&drain(&mut rx)), vec!["save_start", "save_end"]);
    }

    #[tokio::test]
    async fn test_dropped_plan_abandons_save() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());

        let plan = controller.plan_save(&view(15)).unwrap();
        drop(plan);

        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(client.call_count(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_zoom_above_max_plans_nothing() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());

        let plan = controller.plan_save(&view(20)).unwrap();
        assert!(plan.is_empty());
        let report = controller.commit_save(plan).await.unwrap();

        assert_eq!(report.total, 0);
        assert_eq!(client.call_count(), 0);
        assert_eq!(names(&drain(&mut rx)), vec!["save_start", "save_end"]);
    }

    #[tokio::test]
    async fn test_foreign_plan_is_rejected() {
        let (first, _rx1) = build(
            config(),
            Arc::new(MemoryTileStore::new()),
            Arc::new(MockHttpClient::ok(&[1])),
        );
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (second, _rx2) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());

        let plan = first.plan_save(&view(19)).unwrap();
        let result = second.commit_save(plan).await;

        assert!(matches!(result, Err(ControllerError::ForeignPlan)));
        assert_eq!(client.call_count(), 0);
        assert_eq!(first.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_save_view_declined_by_gate() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client.clone());
        let controller = controller.with_gate(Arc::new(FixedGate(false)));

        let outcome = controller.save_view(&view(13)).await.unwrap();

        assert!(matches!(outcome, SaveOutcome::Declined));
        assert_eq!(client.call_count(), 0);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_save_view_without_gate_proceeds() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, _rx) = build(config(), Arc::new(MemoryTileStore::new()), client);

        let outcome = controller.save_view(&view(19)).await.unwrap();
        assert_eq!(outcome.report().map(|r| r.saved), Some(4));
    }

    #[tokio::test]
    async fn test_removal_reports_size_and_clears() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client);
        controller.save_view(&view(19)).await.unwrap();
        drain(&mut rx);

        let plan = controller.plan_removal().await.unwrap();
        assert_eq!(plan.count(), Some(4));
        assert_eq!(
            controller.state(),
            ControllerState::AwaitingRemovalConfirmation
        );

        controller.commit_removal(plan).await.unwrap();

        assert_eq!(controller.store().size().await.unwrap(), 0);
        assert_eq!(controller.state(), ControllerState::Idle);
        let events = drain(&mut rx);
        assert!(matches!(
            events[0],
            OfflineEvent::RemoveStart { count: Some(4) }
        ));
        assert!(matches!(events[1], OfflineEvent::RemoveEnd));
    }

    #[tokio::test]
    async fn test_removal_without_size_query() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let config = config().with_report_size_before_removal(false);
        let store = Arc::new(FaultyStore {
            fail_size: true,
            ..Default::default()
        });
        let (controller, mut rx) = build(config, store, client);

        let outcome = controller.remove_all().await.unwrap();

        assert_eq!(outcome, RemovalOutcome::Removed { count: None });
        assert_eq!(names(&drain(&mut rx)), vec!["remove_start", "remove_end"]);
    }

    #[tokio::test]
    async fn test_size_failure_stops_removal() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let store = Arc::new(FaultyStore {
            fail_size: true,
            ..Default::default()
        });
        let (controller, mut rx) = build(config(), store, client);

        let result = controller.plan_removal().await;

        assert!(matches!(result, Err(ControllerError::Size(_))));
        assert_eq!(names(&drain(&mut rx)), vec!["size_error"]);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_clear_failure_is_reported() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let store = Arc::new(FaultyStore {
            fail_clear: true,
            ..Default::default()
        });
        let (controller, mut rx) = build(config(), store, client);

        let result = controller.remove_all().await;

        assert!(matches!(result, Err(ControllerError::Clear(_))));
        assert_eq!(
            names(&drain(&mut rx)),
            vec!["remove_start", "remove_tiles_error"]
        );
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_remove_all_declined_by_gate() {
        let client = Arc::new(MockHttpClient::ok(&[1]));
        let (controller, mut rx) = build(config(), Arc::new(MemoryTileStore::new()), client);
        controller.save_view(&view(19)).await.unwrap();
        drain(&mut rx);
        let controller = controller.with_gate(Arc::new(FixedGate(false)));

        let outcome = controller.remove_all().await.unwrap();

        assert_eq!(outcome, RemovalOutcome::Declined);
        assert_eq!(controller.store().size().await.unwrap(), 4);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_resolver_sees_saved_tiles() {
        let client = Arc::new(MockHttpClient::ok(b"png"));
        let (controller, _rx) = build(config(), Arc::new(MemoryTileStore::new()), client);
        controller.save_view(&view(19)).await.unwrap();

        let resolver = controller.resolver();
        let hit = resolver
            .resolve_tile_source(TileCoord::new(1, 1, 19))
            .await
            .unwrap();
        let miss = resolver
            .resolve_tile_source(TileCoord::new(5, 5, 19))
            .await
            .unwrap();

        assert!(hit.is_cached());
        assert!(!miss.is_cached());
    }
}
