/*!
 * Address Spaces
 * Page-map handles and the frame accounting behind them
 */

use crate::monitor::traits::AddressSpaceRelease;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle to a process address space
///
/// Deliberately not `Clone`: exactly one owner may release it.
#[derive(Debug, PartialEq, Eq)]
pub struct AddressSpace {
    id: u64,
    pages: usize,
}

impl AddressSpace {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of mapped pages backed by frames
    #[inline]
    pub fn pages(&self) -> usize {
        self.pages
    }
}

/// Frame-accounting address space allocator
///
/// Clones share state.
#[derive(Clone)]
pub struct AddressSpaces {
    live: Arc<DashMap<u64, usize, RandomState>>,
    next_id: Arc<AtomicU64>,
    frames_in_use: Arc<AtomicUsize>,
}

impl AddressSpaces {
    pub fn new() -> Self {
        Self {
            live: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            frames_in_use: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build an address space with `pages` mapped pages
    pub fn create(&self, pages: usize) -> AddressSpace {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.insert(id, pages);
        self.frames_in_use.fetch_add(pages, Ordering::Relaxed);
        AddressSpace { id, pages }
    }

    /// Unmap everything and return the number of frames released
    pub fn free(&self, space: AddressSpace) -> usize {
        match self.live.remove(&space.id) {
            Some((_, pages)) => {
                self.frames_in_use.fetch_sub(pages, Ordering::Relaxed);
                debug!(space = space.id, pages, "Address space freed");
                pages
            }
            None => {
                warn!(space = space.id, "Freeing unknown address space");
                0
            }
        }
    }

    pub fn frames_in_use(&self) -> usize {
        self.frames_in_use.load(Ordering::Relaxed)
    }

    pub fn live_spaces(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.live.contains_key(&id)
    }
}

impl Default for AddressSpaces {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressSpaceRelease for AddressSpaces {
    fn free_address_space(&self, space: AddressSpace) -> usize {
        self.free(space)
    }
}
