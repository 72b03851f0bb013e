//! Single-writer transaction guard for one shared connection.
//!
//! `Idle --begin--> Active --commit|rollback--> Idle`. The lock is a one-permit semaphore:
//! `begin` waits for the permit, and the permit lives inside the active transaction state,
//! so every path that drops that state (commit, rollback, a failed BEGIN, a failed COMMIT)
//! also releases the lock. A cancelled `begin` keeps the state, and with it the lock, until
//! the caller commits or rolls back.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::error::DataAccessError;
use crate::outcome::Outcome;

struct ActiveTransaction {
    _permit: OwnedSemaphorePermit,
}

/// Serializes BEGIN/COMMIT/ROLLBACK so at most one transaction is open at a time.
///
/// Not reentrant: a second `begin` waits until the first transaction finishes, even when
/// both come from the same task.
pub struct TransactionCoordinator {
    lock: Arc<Semaphore>,
    active: Mutex<Option<ActiveTransaction>>,
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("locked", &self.is_locked())
            .field("active", &self.is_active())
            .finish()
    }
}

impl TransactionCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lock: Arc::new(Semaphore::new(1)),
            active: Mutex::new(None),
        }
    }

    /// Wait for the lock, then open a transaction on `backend`.
    ///
    /// The transaction state is recorded before BEGIN is sent, so a `begin` future dropped
    /// mid-BEGIN leaves the lock held and the transaction finishable with `commit` or
    /// `rollback`. A failed BEGIN releases the lock before returning.
    pub async fn begin(&self, backend: &dyn Backend) -> Outcome {
        trace!("waiting for transaction lock");
        let permit = match Arc::clone(&self.lock).acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                return Outcome::Failed(DataAccessError::TransactionError(format!(
                    "transaction lock unavailable: {err}"
                )));
            }
        };
        trace!("transaction lock acquired");
        tokio::task::yield_now().await;

        let mut active = self.active.lock().await;
        *active = Some(ActiveTransaction { _permit: permit });
        match backend.begin().await {
            Ok(()) => {
                debug!("transaction started");
                Outcome::Succeeded
            }
            Err(err) => {
                active.take();
                warn!(error = %err, "begin transaction failed; lock released");
                Outcome::Failed(err)
            }
        }
    }

    /// Commit the open transaction. With nothing open this is a `NoOp`.
    ///
    /// If COMMIT fails the transaction is rolled back on a best-effort basis and the lock
    /// is released anyway.
    pub async fn commit(&self, backend: &dyn Backend) -> Outcome {
        let mut active = self.active.lock().await;
        let Some(tx) = active.take() else {
            return Outcome::NoOp;
        };
        let result = backend.commit().await;
        if let Err(err) = &result {
            warn!(error = %err, "commit failed; rolling back and releasing lock");
            if let Err(rollback_err) = backend.rollback().await {
                debug!(error = %rollback_err, "rollback after failed commit also failed");
            }
        } else {
            debug!("transaction committed");
        }
        drop(tx);
        Outcome::from_result(result)
    }

    /// Roll back the open transaction. With nothing open this is a `NoOp`.
    pub async fn rollback(&self, backend: &dyn Backend) -> Outcome {
        let mut active = self.active.lock().await;
        let Some(tx) = active.take() else {
            return Outcome::NoOp;
        };
        let result = backend.rollback().await;
        match &result {
            Ok(()) => debug!("transaction rolled back"),
            Err(err) => warn!(error = %err, "rollback failed; lock released"),
        }
        drop(tx);
        Outcome::from_result(result)
    }

    /// Whether the transaction lock is held (a transaction is open or being opened).
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.available_permits() == 0
    }

    /// Whether a transaction has been started and not yet finished.
    ///
    /// A BEGIN, commit or rollback in flight counts as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.try_lock().map_or(true, |active| active.is_some())
    }
}
