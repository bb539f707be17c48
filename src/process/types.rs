/*!
 * Process Types
 * Process record, lifecycle state, and child-event wait status
 */

use super::fd_table::FileHandleTable;
use crate::core::limits::{EXIT_CODE_MASK, WEXITED, WSIGNALLED};
use crate::core::types::{Pid, ROOT_PARENT};
use crate::memory::{AddressSpace, Perfmon};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process is live and may be exec'd or torn down
    Running,
    /// Process has been torn down and awaits reaping by its parent
    Zombie,
}

/// Process record as stored in the process table
///
/// Resource fields are `Option` so teardown can take ownership of each one
/// and hand it to the subsystem that releases it.
#[derive(Debug)]
pub struct Process {
    pub pid: Pid,
    pub ppid: Pid,
    pub state: ProcessState,
    /// Path of the current program image, if one was exec'd
    pub image: Option<String>,
    pub argv: Vec<String>,
    pub envp: Vec<String>,
    pub file_handles: Option<FileHandleTable>,
    pub child_events: Option<VecDeque<ChildEvent>>,
    pub address_space: Option<AddressSpace>,
    pub perfmon: Option<Arc<Perfmon>>,
}

impl Process {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, ppid: Pid, address_space: AddressSpace) -> Self {
        Self {
            pid,
            ppid,
            state: ProcessState::Running,
            image: None,
            argv: Vec::new(),
            envp: Vec::new(),
            file_handles: Some(FileHandleTable::new()),
            child_events: None,
            address_space: Some(address_space),
            perfmon: None,
        }
    }

    /// Attach a performance monitor reference
    #[inline]
    #[must_use]
    pub fn with_perfmon(mut self, perfmon: Arc<Perfmon>) -> Self {
        self.perfmon = Some(perfmon);
        self
    }

    /// Check if this is the root supervisor
    #[inline(always)]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.ppid == ROOT_PARENT
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_zombie(&self) -> bool {
        matches!(self.state, ProcessState::Zombie)
    }
}

/// Child termination notice delivered to a parent process
///
/// The status word packs the exit code into the low byte alongside the
/// `WEXITED` and `WSIGNALLED` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEvent {
    pub pid: Pid,
    pub status: u32,
}

impl ChildEvent {
    /// Build the event for a child that exited with `exit_code`
    #[must_use]
    pub fn exited(pid: Pid, exit_code: i32, signalled: bool) -> Self {
        let mut status = (exit_code as u32) & EXIT_CODE_MASK;
        status |= WEXITED;
        if signalled {
            status |= WSIGNALLED;
        }
        Self { pid, status }
    }

    #[inline]
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        (self.status & EXIT_CODE_MASK) as u8
    }

    #[inline]
    #[must_use]
    pub const fn is_exited(&self) -> bool {
        self.status & WEXITED != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_signalled(&self) -> bool {
        self.status & WSIGNALLED != 0
    }
}
