/*!
 * URM Kernel Library
 * Userspace request monitor and the process-control subsystems it drives
 */

pub mod core;
pub mod fd;
pub mod loader;
pub mod memory;
pub mod monitor;
pub mod monitoring;
pub mod process;

// Re-exports
pub use crate::core::errors::{ExecError, MonitorError};
pub use fd::OpenFiles;
pub use loader::{ImageLoader, ProgramImage};
pub use memory::{AddressSpaces, PerfmonRegistry};
pub use monitor::{
    ExecCompletion, ExecStatus, MonitorConfig, MonitorHandle, MonitorState, RequestMonitor,
};
pub use monitoring::init_tracing;
pub use process::{ChildEvent, ProcessTable, TaskTable};
