//! Concurrent tile fetch-and-store.
//!
//! Every request is fetched at once, with no cap on in-flight requests, and
//! outcomes are reconciled as they land. A successful fetch is persisted via
//! [`GuardedStore::replace`] (remove, then set). A failure of one tile never
//! stops the others.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::http::{AsyncHttpClient, FetchError};
use super::session::{SaveReport, SaveSession};
use crate::store::{GuardedStore, StoreError};
use crate::tile::TileRequest;

/// Why a single tile was not saved.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("save failed: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of one tile in a save.
#[derive(Debug, Clone)]
pub enum TileOutcome {
    /// Fetched and persisted.
    Saved(TileRequest),
    /// Fetch or save failed.
    Failed {
        request: TileRequest,
        error: TileError,
    },
}

impl TileOutcome {
    pub fn request(&self) -> &TileRequest {
        match self {
            TileOutcome::Saved(request) => request,
            TileOutcome::Failed { request, .. } => request,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, TileOutcome::Saved(_))
    }
}

/// Fetches tiles over HTTP and persists them.
#[derive(Clone)]
pub struct TileFetcher {
    client: Arc<dyn AsyncHttpClient>,
}

impl TileFetcher {
    pub fn new(client: Arc<dyn AsyncHttpClient>) -> Self {
        Self { client }
    }

    /// Fetches and stores every request, yielding outcomes as they complete.
    ///
    /// All fetches start on the first poll. Completion order is unspecified.
    /// The stream ends after exactly `requests.len()` outcomes.
    pub fn fetch_and_store<'a>(
        &'a self,
        requests: Vec<TileRequest>,
        store: &'a GuardedStore,
    ) -> impl Stream<Item = TileOutcome> + Send + 'a {
        requests
            .into_iter()
            .map(|request| self.fetch_one(request, store))
            .collect::<FuturesUnordered<_>>()
    }

    /// Fetches and stores every request, then reports the aggregate result.
    pub async fn fetch_all(&self, requests: Vec<TileRequest>, store: &GuardedStore) -> SaveReport {
        let mut session = SaveSession::new(requests.clone());
        let mut outcomes = self.fetch_and_store(requests, store);
        while let Some(outcome) = outcomes.next().await {
            session.record(&outcome);
        }
        debug_assert!(session.is_complete());

        let report = session.into_report();
        info!(
            total = report.total,
            saved = report.saved,
            failed = report.failure_count(),
            "Tile save finished"
        );
        report
    }

    async fn fetch_one(&self, request: TileRequest, store: &GuardedStore) -> TileOutcome {
        let blob = match self.client.get(request.url()).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(url = %request.url(), error = %e, "Tile fetch failed");
                return TileOutcome::Failed {
                    request,
                    error: e.into(),
                };
            }
        };

        let bytes = blob.len();
        match store.replace(request.key(), blob).await {
            Ok(()) => {
                debug!(key = %request.key(), bytes, "Tile saved");
                TileOutcome::Saved(request)
            }
            Err(e) => {
                warn!(key = %request.key(), error = %e, "Tile save failed");
                TileOutcome::Failed {
                    request,
                    error: e.into(),
                }
            }
        }
    }
}
