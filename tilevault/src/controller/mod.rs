//! Save and removal orchestration.
//!
//! The controller turns "save what I am looking at" and "remove everything"
//! into enumerations, fetches and store operations, and reports each step as
//! an [`OfflineEvent`].
//!
//! # Architecture
//!
//! ```text
//! plan_save(view) ──► SavePlan ──► commit_save(plan) ──► SaveReport
//!      │                  │              │
//!      │            (drop = abandon)     ├── TileFetcher ──► GuardedStore
//!      │                                 │
//!      └──────────── OfflineEvent ◄──────┘
//!                         │
//!                  mpsc::UnboundedSender
//! ```
//!
//! Confirmation is two-phase: a plan is a single-use token the caller either
//! commits or drops. [`save_view`](OfflineController::save_view) and
//! [`remove_all`](OfflineController::remove_all) run both phases, asking a
//! [`ConfirmationGate`] in between when one is configured.

mod confirm;
mod error;
mod events;
mod offline;
mod plan;
mod state;

pub use confirm::ConfirmationGate;
pub use error::{ControllerError, ControllerResult};
pub use events::{event_channel, EventEmitter, OfflineEvent};
pub use offline::OfflineController;
pub use plan::{MapView, RemovalOutcome, RemovalPlan, SaveOutcome, SavePlan};
pub use state::ControllerState;
