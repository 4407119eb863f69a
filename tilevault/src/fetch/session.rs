//! Save session state.
//!
//! Tracks one "save current view" operation: the requested tiles, how many
//! have been attempted, how many were saved and which failed.

use super::orchestrator::{TileError, TileOutcome};
use crate::tile::TileRequest;

/// A tile that could not be saved, and why.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub request: TileRequest,
    pub error: TileError,
}

/// Progress of one save operation.
#[derive(Debug, Clone)]
pub struct SaveSession {
    requests: Vec<TileRequest>,
    attempted: usize,
    succeeded: usize,
    failures: Vec<TileFailure>,
}

impl SaveSession {
    pub fn new(requests: Vec<TileRequest>) -> Self {
        Self {
            requests,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    /// Every requested tile has an outcome.
    pub fn is_complete(&self) -> bool {
        self.attempted >= self.requests.len()
    }

    /// Records the outcome of one tile.
    pub fn record(&mut self, outcome: &TileOutcome) {
        self.attempted += 1;
        match outcome {
            TileOutcome::Saved(_) => self.succeeded += 1,
            TileOutcome::Failed { request, error } => self.failures.push(TileFailure {
                request: request.clone(),
                error: error.clone(),
            }),
        }
    }

    /// Closes the session into its report.
    pub fn into_report(self) -> SaveReport {
        SaveReport {
            total: self.requests.len(),
            saved: self.succeeded,
            failures: self.failures,
        }
    }
}

/// Final tally of a save operation.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub total: usize,
    pub saved: usize,
    pub failures: Vec<TileFailure>,
}

impl SaveReport {
    /// Every tile was saved.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.saved == self.total
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::fetch::FetchError;

    fn request(x: i64) -> TileRequest {
        TileRequest::new(TileCoord::new(x, 0, 1), format!("k{}", x), format!("u{}", x))
    }

    #[test]
    fn test_session_new() {
        let session = SaveSession::new(vec![request(0), request(1)]);
        assert!(!session.is_complete());

        let report = session.into_report();
        assert_eq!(report.total, 2);
        assert_eq!(report.saved, 0);
    }

    #[test]
    fn test_empty_session_is_complete() {
        let session = SaveSession::new(Vec::new());
        assert!(session.is_complete());
        assert!(session.into_report().is_success());
    }

    #[test]
    fn test_session_records_mixed_outcomes() {
        let mut session = SaveSession::new(vec![request(0), request(1)]);
        session.record(&TileOutcome::Saved(request(0)));
        assert!(!session.is_complete());

        session.record(&TileOutcome::Failed {
            request: request(1),
            error: TileError::Fetch(FetchError::Status {
                url: "u1".to_string(),
                status: 500,
            }),
        });

        assert!(session.is_complete());

        let report = session.into_report();
        assert_eq!(report.saved, 1);
        assert!(!report.is_success());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].request.key(), "k1");
    }
}
