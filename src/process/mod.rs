/*!
 * Process Module
 * Process table, per-process handle and thread slots, child events
 */

pub mod fd_table;
pub mod table;
pub mod tasks;
pub mod types;

// Re-export for convenience
pub use fd_table::FileHandleTable;
pub use table::ProcessTable;
pub use tasks::{TaskTable, ThreadInfo};
pub use types::{ChildEvent, Process, ProcessState};
