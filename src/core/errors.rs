/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Program replacement errors
///
/// Reported to the submitter through its completion handle, never escalated.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ExecError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(exec::no_such_process),
        help("The target process may have exited before the request was serviced.")
    )]
    NoSuchProcess(Pid),

    #[error("Program image not found: {0}")]
    #[diagnostic(
        code(exec::not_found),
        help("Register the image with the loader before exec'ing it.")
    )]
    NotFound(String),

    #[error("Argument vector is empty")]
    #[diagnostic(
        code(exec::empty_argv),
        help("argv[0] must name the program being executed.")
    )]
    EmptyArgv,

    #[error("Process {0} is exiting")]
    #[diagnostic(
        code(exec::process_exiting),
        help("An exit request for this process was already serviced.")
    )]
    ProcessExiting(Pid),

    #[error("Image load failed: {0}")]
    #[diagnostic(code(exec::load_failed), help("Check the program image and loader logs."))]
    LoadFailed(String),

    #[error("Request abandoned before it was serviced")]
    #[diagnostic(
        code(exec::abandoned),
        help("The request monitor stopped or discarded the request.")
    )]
    Abandoned,
}

/// Request monitor errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MonitorError {
    #[error("Request queue is closed")]
    #[diagnostic(
        code(monitor::queue_closed),
        help("The request monitor has been shut down; no new requests are accepted.")
    )]
    QueueClosed,

    #[error("Failed to spawn monitor thread: {0}")]
    #[diagnostic(code(monitor::spawn_failed), help("Check thread limits of the host."))]
    SpawnFailed(String),

    #[error("Monitor thread panicked: {0}")]
    #[diagnostic(
        code(monitor::panicked),
        help("A fatal invariant violation halted the monitor. See the error log.")
    )]
    MonitorPanicked(String),
}

/// Request monitor result
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Program replacement result
pub type ExecResult<T> = Result<T, ExecError>;
