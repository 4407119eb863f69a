//! User confirmation before a save or removal.

use crate::store::BoxFuture;

/// Asks the user whether a planned operation should go ahead.
///
/// A controller without a gate proceeds unconditionally.
pub trait ConfirmationGate: Send + Sync {
    /// Confirm saving `count` tiles.
    fn confirm_save(&self, count: usize) -> BoxFuture<'_, bool>;

    /// Confirm clearing the store. `count` is the current size when it was
    /// queried.
    fn confirm_removal(&self, count: Option<usize>) -> BoxFuture<'_, bool>;
}
