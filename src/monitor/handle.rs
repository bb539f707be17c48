/*!
 * Producer API
 * Submission interface usable from any kernel context
 */

use super::completion::ExecCompletion;
use super::queue::RequestQueue;
use super::request::{ExecRequest, ExitRequest, Request};
use super::stats::{AtomicMonitorStats, MonitorState, MonitorStats};
use crate::core::errors::MonitorResult;
use crate::core::types::{Pid, RequestSeq};
use std::sync::Arc;
use tracing::debug;

/// Cloneable handle for submitting requests to the monitor
///
/// Submissions never block beyond the queue's critical section.
#[derive(Clone)]
pub struct MonitorHandle {
    queue: Arc<RequestQueue>,
    stats: Arc<AtomicMonitorStats>,
}

impl MonitorHandle {
    pub(super) fn new(queue: Arc<RequestQueue>, stats: Arc<AtomicMonitorStats>) -> Self {
        Self { queue, stats }
    }

    /// Enqueue a request, returning its sequence number
    pub fn submit(&self, request: impl Into<Request>) -> MonitorResult<RequestSeq> {
        let request = request.into();
        let (pid, kind) = (request.pid(), request.kind());

        let (seq, depth) = self.queue.push(request)?;
        debug!(pid, seq, ?kind, depth, "urm: request queued");
        Ok(seq)
    }

    /// Request that `pid` be replaced by the program at `path`
    ///
    /// `path`, `argv` and `envp` are copied before this returns. Poll or wait
    /// on the returned handle for the outcome.
    pub fn submit_exec<A, E>(
        &self,
        pid: Pid,
        path: &str,
        argv: &[A],
        envp: &[E],
    ) -> MonitorResult<ExecCompletion>
    where
        A: AsRef<str>,
        E: AsRef<str>,
    {
        let (request, completion) = ExecRequest::new(pid, path, argv, envp);
        self.submit(request)?;
        Ok(completion)
    }

    /// Request that `pid` be torn down; the parent learns of it via a child event
    pub fn submit_exit(&self, pid: Pid, exit_code: i32, signalled: bool) -> MonitorResult<()> {
        self.submit(ExitRequest::new(pid, exit_code, signalled))
            .map(|_| ())
    }

    /// Requests queued but not yet picked up by the monitor
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> MonitorState {
        self.stats.state()
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}
