/*!
 * Request Types
 * Closed set of privileged operations serviced by the monitor
 */

use super::completion::{completion_pair, CompletionSlot, ExecCompletion};
use crate::core::types::{Pid, RequestSeq};
use serde::Serialize;

/// Replace the program image of a process
///
/// Path, argv and envp are owned copies taken at submission time; the
/// submitter's buffers are free to change or go away afterwards.
#[derive(Debug)]
pub struct ExecRequest {
    pub pid: Pid,
    pub path: String,
    pub argv: Vec<String>,
    pub envp: Vec<String>,
    pub(crate) completion: CompletionSlot,
}

impl ExecRequest {
    /// Deep-copy the arguments and pair the request with a completion handle
    pub fn new<A, E>(pid: Pid, path: &str, argv: &[A], envp: &[E]) -> (Self, ExecCompletion)
    where
        A: AsRef<str>,
        E: AsRef<str>,
    {
        let (completion, handle) = completion_pair();
        let request = Self {
            pid,
            path: path.to_owned(),
            argv: argv.iter().map(|a| a.as_ref().to_owned()).collect(),
            envp: envp.iter().map(|e| e.as_ref().to_owned()).collect(),
            completion,
        };
        (request, handle)
    }
}

/// Tear down a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitRequest {
    pub pid: Pid,
    pub exit_code: i32,
    pub signalled: bool,
}

impl ExitRequest {
    #[inline]
    pub const fn new(pid: Pid, exit_code: i32, signalled: bool) -> Self {
        Self {
            pid,
            exit_code,
            signalled,
        }
    }
}

/// Request kind, for logging and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Exec,
    Exit,
}

/// A queued instruction to the monitor
#[derive(Debug)]
pub enum Request {
    Exec(ExecRequest),
    Exit(ExitRequest),
}

impl Request {
    #[inline]
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Exec(_) => RequestKind::Exec,
            Request::Exit(_) => RequestKind::Exit,
        }
    }

    /// Target process
    #[inline]
    pub fn pid(&self) -> Pid {
        match self {
            Request::Exec(r) => r.pid,
            Request::Exit(r) => r.pid,
        }
    }
}

impl From<ExecRequest> for Request {
    fn from(request: ExecRequest) -> Self {
        Request::Exec(request)
    }
}

impl From<ExitRequest> for Request {
    fn from(request: ExitRequest) -> Self {
        Request::Exit(request)
    }
}

/// Request plus the sequence number it was queued under
#[derive(Debug)]
pub struct QueuedRequest {
    pub seq: RequestSeq,
    pub request: Request,
}
