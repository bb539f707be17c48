/*!
 * Monitor Configuration
 *
 * Runtime configuration for the request monitor thread and queue tuning
 */

use crate::core::limits::{
    MONITOR_THREAD_NAME, QUEUE_INITIAL_CAPACITY, QUEUE_SHRINK_THRESHOLD, QUEUE_WARN_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Request monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Name given to the dedicated monitor thread
    pub thread_name: String,
    /// Queue depth at which a backlog warning is logged
    pub queue_warn_depth: usize,
    /// Capacity above which an emptied queue shrinks its storage
    pub shrink_threshold: usize,
    /// Backing capacity reserved up front and kept after shrinking
    pub initial_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thread_name: MONITOR_THREAD_NAME.to_string(),
            queue_warn_depth: QUEUE_WARN_DEPTH,
            shrink_threshold: QUEUE_SHRINK_THRESHOLD,
            initial_capacity: QUEUE_INITIAL_CAPACITY,
        }
    }
}

impl MonitorConfig {
    /// Configuration for short-lived monitors (tests, tools)
    ///
    /// Small queue, aggressive shrinking, early backlog warnings.
    pub fn compact() -> Self {
        Self {
            thread_name: MONITOR_THREAD_NAME.to_string(),
            queue_warn_depth: 64,
            shrink_threshold: 16,
            initial_capacity: 4,
        }
    }

    /// Load overrides from the environment
    ///
    /// Environment variables:
    /// - URM_THREAD_NAME: monitor thread name
    /// - URM_QUEUE_WARN_DEPTH: backlog warning depth
    /// - URM_SHRINK_THRESHOLD: queue shrink threshold
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("URM_THREAD_NAME") {
            if !name.is_empty() {
                config.thread_name = name;
            }
        }
        config.queue_warn_depth = env_or("URM_QUEUE_WARN_DEPTH", config.queue_warn_depth);
        config.shrink_threshold = env_or("URM_SHRINK_THRESHOLD", config.shrink_threshold);
        config
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    #[must_use]
    pub fn with_queue_warn_depth(mut self, depth: usize) -> Self {
        self.queue_warn_depth = depth;
        self
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
