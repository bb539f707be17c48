/*!
 * Exec Completion
 *
 * Single-writer/single-reader promise carrying the outcome of an
 * exec-replace request back to its submitter.
 *
 * The cell is reference counted between the submitter's `ExecCompletion`
 * and the `CompletionSlot` travelling with the request, so it stays valid
 * for whichever side lets go last. Success and failure both leave the
 * result readable; nothing is freed out from under a waiting submitter.
 */

use crate::core::errors::{ExecError, ExecResult};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Observable state of an exec-replace request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    /// Queued or running
    Pending,
    Succeeded,
    Failed(ExecError),
}

impl ExecStatus {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, ExecStatus::Pending)
    }

    /// Convert a settled status into a result
    fn to_result(&self) -> Option<ExecResult<()>> {
        match self {
            ExecStatus::Pending => None,
            ExecStatus::Succeeded => Some(Ok(())),
            ExecStatus::Failed(e) => Some(Err(e.clone())),
        }
    }
}

struct CompletionCell {
    status: Mutex<ExecStatus>,
    settled: Condvar,
}

impl CompletionCell {
    /// Write the outcome; later writes are ignored
    fn settle(&self, status: ExecStatus) {
        let mut current = self.status.lock();
        if current.is_pending() {
            *current = status;
            self.settled.notify_all();
        }
    }
}

/// Create a connected writer/reader pair
pub(crate) fn completion_pair() -> (CompletionSlot, ExecCompletion) {
    let cell = Arc::new(CompletionCell {
        status: Mutex::new(ExecStatus::Pending),
        settled: Condvar::new(),
    });
    (
        CompletionSlot {
            cell: Some(Arc::clone(&cell)),
        },
        ExecCompletion { cell },
    )
}

/// Writer half, owned by the queued request
///
/// Dropping it unsettled marks the request abandoned so waiters wake up.
pub(crate) struct CompletionSlot {
    cell: Option<Arc<CompletionCell>>,
}

impl CompletionSlot {
    /// Report the outcome exactly once, releasing the writer's reference
    pub(crate) fn complete(mut self, result: ExecResult<()>) {
        if let Some(cell) = self.cell.take() {
            cell.settle(match result {
                Ok(()) => ExecStatus::Succeeded,
                Err(e) => ExecStatus::Failed(e),
            });
        }
    }
}

impl Drop for CompletionSlot {
    fn drop(&mut self) {
        if let Some(cell) = self.cell.take() {
            cell.settle(ExecStatus::Failed(ExecError::Abandoned));
        }
    }
}

impl std::fmt::Debug for CompletionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSlot")
            .field("settled", &self.cell.is_none())
            .finish()
    }
}

/// Submitter's handle to an exec-replace outcome
pub struct ExecCompletion {
    cell: Arc<CompletionCell>,
}

impl ExecCompletion {
    /// Poll the current status without blocking
    pub fn status(&self) -> ExecStatus {
        self.cell.status.lock().clone()
    }

    pub fn is_complete(&self) -> bool {
        !self.cell.status.lock().is_pending()
    }

    /// Block until the request has been serviced
    pub fn wait(&self) -> ExecResult<()> {
        let mut status = self.cell.status.lock();
        loop {
            if let Some(result) = status.to_result() {
                return result;
            }
            self.cell.settled.wait(&mut status);
        }
    }

    /// Block for at most `timeout`; `None` if still pending
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ExecResult<()>> {
        let mut status = self.cell.status.lock();
        if status.is_pending() {
            self.cell.settled.wait_while_for(&mut status, |s| s.is_pending(), timeout);
        }
        status.to_result()
    }

    /// True once the writer half has been released
    ///
    /// From then on this handle is the sole owner of the result.
    pub fn is_detached(&self) -> bool {
        Arc::strong_count(&self.cell) == 1
    }
}

impl std::fmt::Debug for ExecCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCompletion")
            .field("status", &self.status())
            .finish()
    }
}
