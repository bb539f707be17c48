/*!
 * Request Queue
 *
 * Unbounded FIFO of pending requests guarded by a single mutex, with a
 * condition variable as the monitor's wake signal.
 *
 * The lock covers only append, pop and resize; handlers never run under it.
 * Sequence numbers are assigned under the lock, so they record the order in
 * which producers won it.
 */

use super::config::MonitorConfig;
use super::request::{QueuedRequest, Request};
use super::stats::AtomicMonitorStats;
use crate::core::errors::{MonitorError, MonitorResult};
use crate::core::types::RequestSeq;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

struct QueueInner {
    pending: VecDeque<QueuedRequest>,
    next_seq: RequestSeq,
    closed: bool,
    backlog_warned: bool,
}

/// Multi-producer, single-consumer request queue
pub struct RequestQueue {
    inner: Mutex<QueueInner>,
    wake: Condvar,
    warn_depth: usize,
    shrink_threshold: usize,
    initial_capacity: usize,
    stats: Option<Arc<AtomicMonitorStats>>,
}

impl RequestQueue {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                pending: VecDeque::with_capacity(config.initial_capacity),
                next_seq: 0,
                closed: false,
                backlog_warned: false,
            }),
            wake: Condvar::new(),
            warn_depth: config.queue_warn_depth,
            shrink_threshold: config.shrink_threshold,
            initial_capacity: config.initial_capacity,
            stats: None,
        }
    }

    /// Queue that counts each submission while still holding the lock
    ///
    /// A submission is therefore counted before the consumer can pop it.
    pub fn with_stats(config: &MonitorConfig, stats: Arc<AtomicMonitorStats>) -> Self {
        Self {
            stats: Some(stats),
            ..Self::new(config)
        }
    }

    /// Append a request and wake the consumer
    ///
    /// Returns the request's sequence number and the queue depth after the
    /// append. Fails only once the queue has been closed.
    pub fn push(&self, request: Request) -> MonitorResult<(RequestSeq, usize)> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(MonitorError::QueueClosed);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pending.push_back(QueuedRequest { seq, request });
        let depth = inner.pending.len();
        if let Some(stats) = &self.stats {
            stats.record_submit(depth);
        }

        if depth >= self.warn_depth && !inner.backlog_warned {
            inner.backlog_warned = true;
            warn!(depth, "urm: request backlog growing");
        }

        self.wake.notify_one();
        Ok((seq, depth))
    }

    /// Remove the head request, blocking while the queue is empty
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<QueuedRequest> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(head) = self.take_head(&mut inner) {
                return Some(head);
            }
            if inner.closed {
                return None;
            }
            // Spurious wakeups just re-check the queue
            self.wake.wait(&mut inner);
        }
    }

    /// Remove the head request without blocking
    pub fn try_pop(&self) -> Option<QueuedRequest> {
        let mut inner = self.inner.lock();
        self.take_head(&mut inner)
    }

    fn take_head(&self, inner: &mut QueueInner) -> Option<QueuedRequest> {
        let head = inner.pending.pop_front()?;

        if inner.pending.len() < self.warn_depth {
            inner.backlog_warned = false;
        }
        if inner.pending.is_empty() && inner.pending.capacity() > self.shrink_threshold {
            debug!(
                capacity = inner.pending.capacity(),
                "urm: shrinking drained request queue"
            );
            inner.pending.shrink_to(self.initial_capacity);
        }
        Some(head)
    }

    /// Refuse further submissions and wake the consumer to drain
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.wake.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Current backing capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().pending.capacity()
    }
}
