/*!
 * Program Loader
 * In-memory image registry backing the program replacement primitive
 *
 * Images are descriptors (entry point, page count); nothing is read from
 * disk or mapped for real.
 */

use crate::core::errors::{ExecError, ExecResult};
use crate::core::types::Pid;
use crate::memory::AddressSpaces;
use crate::monitor::traits::ProgramLoader;
use crate::process::ProcessTable;
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Registered program image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramImage {
    pub entry: u64,
    pub pages: usize,
}

/// Loader that replaces process images from a registry of named programs
#[derive(Clone)]
pub struct ImageLoader {
    images: Arc<DashMap<String, ProgramImage, RandomState>>,
    processes: ProcessTable,
    spaces: AddressSpaces,
}

impl ImageLoader {
    pub fn new(processes: ProcessTable, spaces: AddressSpaces) -> Self {
        Self {
            images: Arc::new(DashMap::with_hasher(RandomState::new())),
            processes,
            spaces,
        }
    }

    /// Make `path` executable
    pub fn register(&self, path: impl Into<String>, image: ProgramImage) {
        self.images.insert(path.into(), image);
    }

    pub fn unregister(&self, path: &str) -> Option<ProgramImage> {
        self.images.remove(path).map(|(_, image)| image)
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.images.contains_key(path)
    }
}

impl ProgramLoader for ImageLoader {
    fn exec(&self, pid: Pid, path: &str, argv: &[String], envp: &[String]) -> ExecResult<()> {
        if argv.is_empty() {
            return Err(ExecError::EmptyArgv);
        }
        let image = self
            .images
            .get(path)
            .map(|entry| *entry.value())
            .ok_or_else(|| ExecError::NotFound(path.to_string()))?;

        // Build the new image first; a failed exec leaves the old one intact
        let mut fresh = Some(self.spaces.create(image.pages));

        let outcome = self
            .processes
            .with_process_mut(pid, |process| {
                if process.is_zombie() {
                    return Err(ExecError::ProcessExiting(pid));
                }
                let old = std::mem::replace(&mut process.address_space, fresh.take());
                process.image = Some(path.to_string());
                process.argv = argv.to_vec();
                process.envp = envp.to_vec();
                Ok(old)
            })
            .unwrap_or(Err(ExecError::NoSuchProcess(pid)));

        if let Some(unused) = fresh {
            self.spaces.free(unused);
        }
        if let Some(old) = outcome? {
            self.spaces.free(old);
        }

        debug!(pid, path, entry = image.entry, "Image replaced");
        Ok(())
    }
}
