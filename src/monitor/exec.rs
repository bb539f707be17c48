/*!
 * Exec-Replace Handler
 */

use super::context::MonitorContext;
use super::request::ExecRequest;
use crate::core::errors::ExecResult;
use tracing::{info, warn};

impl MonitorContext {
    /// Replace the target's program image and publish the outcome
    ///
    /// The owned path and argument copies are released before the result is
    /// written. Failures are reported once through the completion handle and
    /// never retried.
    pub fn handle_exec(&self, request: ExecRequest) -> ExecResult<()> {
        let ExecRequest {
            pid,
            path,
            argv,
            envp,
            completion,
        } = request;

        let result = self.loader.exec(pid, &path, &argv, &envp);
        match &result {
            Ok(()) => info!(pid, path = %path, argc = argv.len(), "urm: exec succeeded"),
            Err(e) => warn!(pid, path = %path, error = %e, "urm: exec failed"),
        }
        drop((path, argv, envp));

        completion.complete(result.clone());
        result
    }
}
