/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
///
/// PID 0 is never a live process; a parent id of 0 marks the root supervisor.
pub type Pid = u32;

/// File descriptor type
pub type Fd = u32;

/// Index into a process's thread slot array
pub type ThreadSlot = usize;

/// Sequence number assigned to each queued request
pub type RequestSeq = u64;

/// Parent id carried by the root supervisor (init)
pub const ROOT_PARENT: Pid = 0;
