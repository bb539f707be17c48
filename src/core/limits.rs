/*!
 * System Limits and Constants
 *
 * Centralized location for per-process slot counts, wait-status encoding,
 * and request queue tuning defaults.
 */

// =============================================================================
// PROCESS SLOTS
// =============================================================================

/// Thread slots per process
/// Teardown walks every slot, occupied or not
pub const MAX_THREADS: usize = 1024;

/// File handle slots per process
pub const MAX_FILE_HANDLES: usize = 256;

// =============================================================================
// WAIT STATUS ENCODING
// =============================================================================

/// Child terminated normally
/// [LINUX-COMPAT] Matches the mlibc `WEXITED` bit
pub const WEXITED: u32 = 0x200;

/// Child terminated by a signal
/// [LINUX-COMPAT] Matches the mlibc `WSIGNALLED` bit
pub const WSIGNALLED: u32 = 0x400;

/// Mask for the exit code carried in the low byte of a wait status
pub const EXIT_CODE_MASK: u32 = 0xff;

// =============================================================================
// REQUEST QUEUE
// =============================================================================

/// Initial backing capacity of the request queue
pub const QUEUE_INITIAL_CAPACITY: usize = 16;

/// Capacity above which an emptied queue releases its backing storage
/// [PERF] Small bursts keep their allocation
pub const QUEUE_SHRINK_THRESHOLD: usize = 256;

/// Queue depth that triggers a backlog warning
/// The queue is unbounded; this only makes runaway growth visible
pub const QUEUE_WARN_DEPTH: usize = 4096;

/// Name of the dedicated monitor thread
pub const MONITOR_THREAD_NAME: &str = "urm";
