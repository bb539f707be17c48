/*!
 * Open File Table
 * System-wide open file descriptions and the handle close primitive
 */

use crate::core::types::Fd;
use crate::monitor::traits::FileCloser;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Open file description shared by every handle that refers to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub path: String,
    pub refs: usize,
}

/// System-wide open file table
#[derive(Clone)]
pub struct OpenFiles {
    files: Arc<DashMap<Fd, OpenFile, RandomState>>,
    next_fd: Arc<AtomicU32>,
}

impl OpenFiles {
    pub fn new() -> Self {
        Self {
            files: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_fd: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn open(&self, path: impl Into<String>) -> Fd {
        let fd = self.next_fd.fetch_add(1, Ordering::Relaxed);
        self.files.insert(
            fd,
            OpenFile {
                path: path.into(),
                refs: 1,
            },
        );
        fd
    }

    /// Take another reference to an open description
    pub fn dup(&self, fd: Fd) -> Option<Fd> {
        let mut file = self.files.get_mut(&fd)?;
        file.refs += 1;
        Some(fd)
    }

    pub fn refs(&self, fd: Fd) -> usize {
        self.files.get(&fd).map_or(0, |f| f.refs)
    }

    pub fn is_open(&self, fd: Fd) -> bool {
        self.files.contains_key(&fd)
    }

    pub fn open_count(&self) -> usize {
        self.files.len()
    }
}

impl Default for OpenFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCloser for OpenFiles {
    fn close(&self, fd: Fd) -> bool {
        let Some(mut file) = self.files.get_mut(&fd) else {
            return false;
        };
        file.refs -= 1;
        let last = file.refs == 0;
        drop(file);

        if last {
            self.files.remove_if(&fd, |_, f| f.refs == 0);
            trace!(fd, "Open file released");
        }
        true
    }
}
