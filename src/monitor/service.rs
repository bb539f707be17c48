/*!
 * Request Monitor
 *
 * The single dedicated thread that drains the request queue in FIFO order
 * and runs each handler to completion. Handlers never run concurrently with
 * one another, which is what serializes process-state mutation.
 */

use super::context::{MonitorBuilder, MonitorContext};
use super::handle::MonitorHandle;
use super::queue::RequestQueue;
use super::request::{QueuedRequest, Request};
use super::stats::{AtomicMonitorStats, MonitorState, MonitorStats};
use crate::core::errors::{MonitorError, MonitorResult};
use crate::memory::AddressSpaces;
use crate::process::ProcessTable;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, info_span, warn};

/// Running request monitor
///
/// Dropping it closes the queue without waiting; the thread drains what is
/// left and exits on its own.
pub struct RequestMonitor {
    handle: MonitorHandle,
    queue: Arc<RequestQueue>,
    stats: Arc<AtomicMonitorStats>,
    thread: Option<JoinHandle<()>>,
}

impl RequestMonitor {
    pub fn builder(processes: ProcessTable, spaces: AddressSpaces) -> MonitorBuilder {
        MonitorBuilder::new(processes, spaces)
    }

    /// Producer handle for this monitor
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> MonitorState {
        self.stats.state()
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.snapshot()
    }

    /// Stop accepting requests, drain the queue, and join the thread
    pub fn shutdown(mut self) -> MonitorResult<()> {
        self.queue.close();
        self.join_thread()
    }

    /// Wait for the thread to exit without closing the queue
    ///
    /// Only returns on its own once the monitor has died.
    pub fn join(mut self) -> MonitorResult<()> {
        self.join_thread()
    }

    fn join_thread(&mut self) -> MonitorResult<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread.join().map_err(|payload| {
            let reason = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "unknown panic".to_string());
            MonitorError::MonitorPanicked(reason)
        })
    }
}

impl MonitorBuilder {
    /// Start the monitor thread
    pub fn spawn(self) -> MonitorResult<RequestMonitor> {
        let (context, config) = self.split();
        let stats = Arc::new(AtomicMonitorStats::new());
        let queue = Arc::new(RequestQueue::with_stats(&config, Arc::clone(&stats)));

        let thread = {
            let queue = Arc::clone(&queue);
            let stats = Arc::clone(&stats);
            std::thread::Builder::new()
                .name(config.thread_name.clone())
                .spawn(move || run_monitor_loop(&queue, &context, &stats))
                .map_err(|e| MonitorError::SpawnFailed(e.to_string()))?
        };

        Ok(RequestMonitor {
            handle: MonitorHandle::new(Arc::clone(&queue), Arc::clone(&stats)),
            queue,
            stats,
            thread: Some(thread),
        })
    }
}

impl Drop for RequestMonitor {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.queue.close();
        }
    }
}

/// Monitor main loop: Idle until woken, Draining while requests remain
fn run_monitor_loop(queue: &RequestQueue, context: &MonitorContext, stats: &AtomicMonitorStats) {
    info!("urm: Userspace request monitor launched");
    let _stop = StopGuard { queue, stats };

    loop {
        let next = match queue.try_pop() {
            Some(queued) => queued,
            None => {
                stats.set_state(MonitorState::Idle);
                match queue.pop() {
                    Some(queued) => queued,
                    None => break,
                }
            }
        };
        stats.set_state(MonitorState::Draining);
        dispatch(context, stats, next);
    }
}

/// Closes the queue and marks the monitor stopped on every exit path
///
/// A halt unwinds the monitor thread mid-request. Whatever is still queued
/// then has no consumer, so it is dropped here and each pending exec
/// completion settles as abandoned.
struct StopGuard<'a> {
    queue: &'a RequestQueue,
    stats: &'a AtomicMonitorStats,
}

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        self.queue.close();

        let mut abandoned = 0usize;
        while let Some(queued) = self.queue.try_pop() {
            drop(queued);
            abandoned += 1;
        }
        self.stats.set_state(MonitorState::Stopped);

        if std::thread::panicking() {
            error!(abandoned, "urm: monitor halted, pending requests abandoned");
        } else {
            info!("urm: request queue closed, monitor stopped");
        }
    }
}

/// Run the handler matching the request kind
fn dispatch(context: &MonitorContext, stats: &AtomicMonitorStats, queued: QueuedRequest) {
    let QueuedRequest { seq, request } = queued;
    let span = info_span!("urm_request", seq, pid = request.pid(), kind = ?request.kind());
    let _entered = span.enter();

    stats.inc_dispatched();
    match request {
        Request::Exec(request) => {
            info!("urm: execve request received");
            let result = context.handle_exec(request);
            stats.record_exec(result.is_ok());
        }
        Request::Exit(request) => {
            info!("urm: exit request received");
            match context.handle_exit(request) {
                Some(_) => stats.inc_exits_completed(),
                None => {
                    warn!("urm: exit request dropped");
                    stats.inc_exits_dropped();
                }
            }
        }
    }
}
