/*!
 * Monitor Collaborator Traits
 * Primitives the request handlers call into
 */

use crate::core::errors::ExecResult;
use crate::core::types::{Fd, Pid, ThreadSlot};
use crate::memory::{AddressSpace, Perfmon};
use crate::process::ChildEvent;
use std::sync::Arc;

/// Program replacement primitive
pub trait ProgramLoader: Send + Sync {
    /// Replace the image of `pid` with the program at `path`
    fn exec(&self, pid: Pid, path: &str, argv: &[String], envp: &[String]) -> ExecResult<()>;
}

/// Thread termination primitive
pub trait ThreadControl: Send + Sync {
    /// Kill the thread in `slot` of `pid`
    ///
    /// Returns false without side effects when the slot is empty.
    fn kill_thread(&self, pid: Pid, slot: ThreadSlot) -> bool;
}

/// File handle close primitive
pub trait FileCloser: Send + Sync {
    /// Drop one reference to `fd`, returning false if it was not open
    fn close(&self, fd: Fd) -> bool;
}

/// Address space destructor
pub trait AddressSpaceRelease: Send + Sync {
    /// Unmap all mappings and free frames and paging structures
    ///
    /// Returns the number of frames released.
    fn free_address_space(&self, space: AddressSpace) -> usize;
}

/// Performance monitor reference release
pub trait PerfmonRelease: Send + Sync {
    /// Drop one reference, returning true if it was the last
    fn perfmon_unref(&self, perfmon: Arc<Perfmon>) -> bool;
}

/// Child event delivery
pub trait ChildNotifier: Send + Sync {
    fn send_child_event(&self, ppid: Pid, event: ChildEvent);
}

/// Unrecoverable invariant violation
pub trait Halt: Send + Sync {
    fn halt(&self, reason: &str) -> !;
}

/// Halts by panicking the calling context
///
/// In a kernel build panic is configured to stop the machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicHalt;

impl Halt for PanicHalt {
    fn halt(&self, reason: &str) -> ! {
        tracing::error!(reason, "urm: fatal invariant violation, halting");
        panic!("kernel halt: {}", reason);
    }
}
