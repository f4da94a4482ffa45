//! Reconciliation strategies: decide whether a fresh fetch differs meaningfully
//! from the state already held. "No change" means no state replacement, no cache
//! write and no downstream recomputation.

use std::collections::HashMap;

use tracing::warn;

use crate::models::Application;

pub trait Reconcile<T>: Send + Sync {
    /// `true` when `next` should replace `prev`.
    fn has_changed(&self, prev: &[T], next: &[T]) -> bool;
}

impl<T, F> Reconcile<T> for F
where
    F: Fn(&[T], &[T]) -> bool + Send + Sync,
{
    fn has_changed(&self, prev: &[T], next: &[T]) -> bool {
        self(prev, next)
    }
}

/// Any field difference counts. Used for jobs and notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullEquality;

impl<T: PartialEq> Reconcile<T> for FullEquality {
    fn has_changed(&self, prev: &[T], next: &[T]) -> bool {
        prev != next
    }
}

/// Applications: same length and the same `(id, status)` pairs in the same order
/// means nothing changed. Other fields are display-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByIdAndStatus;

impl Reconcile<Application> for ByIdAndStatus {
    fn has_changed(&self, prev: &[Application], next: &[Application]) -> bool {
        let same = prev.len() == next.len()
            && prev
                .iter()
                .zip(next)
                .all(|(p, n)| p.id == n.id && p.status == n.status);
        if !same {
            warn_on_status_regressions(prev, next);
        }
        !same
    }
}

/// The server stays authoritative; a non-monotonic status change is only logged.
fn warn_on_status_regressions(prev: &[Application], next: &[Application]) {
    let previous: HashMap<&str, _> = prev.iter().map(|a| (a.id.as_str(), a.status)).collect();
    for app in next {
        if let Some(old) = previous.get(app.id.as_str()) {
            if !old.can_transition_to(app.status) {
                warn!(
                    application_id = %app.id,
                    from = ?old,
                    to = ?app.status,
                    "Server reported a status change out of a terminal state"
                );
            }
        }
    }
}
