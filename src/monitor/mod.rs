/*!
 * Userspace Request Monitor
 *
 * Serialized dispatcher for privileged process operations. Any kernel
 * context may submit exec-replace or exit requests; one dedicated thread
 * services them in submission order.
 */

pub mod completion;
pub mod config;
pub mod context;
mod exec;
pub mod exit;
pub mod handle;
pub mod queue;
pub mod request;
pub mod service;
pub mod stats;
pub mod traits;

// Re-export for convenience
pub use completion::{ExecCompletion, ExecStatus};
pub use config::MonitorConfig;
pub use context::{MonitorBuilder, MonitorContext};
pub use exit::TeardownReport;
pub use handle::MonitorHandle;
pub use queue::RequestQueue;
pub use request::{ExecRequest, ExitRequest, QueuedRequest, Request, RequestKind};
pub use service::RequestMonitor;
pub use stats::{AtomicMonitorStats, MonitorState, MonitorStats};
pub use traits::{
    AddressSpaceRelease, ChildNotifier, FileCloser, Halt, PanicHalt, PerfmonRelease,
    ProgramLoader, ThreadControl,
};
