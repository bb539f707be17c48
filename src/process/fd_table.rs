/*!
 * Per-Process File Handle Table
 * Fixed slot array mapping process-local handles to open file descriptors
 */

use crate::core::limits::MAX_FILE_HANDLES;
use crate::core::types::Fd;

/// Slot array of open file descriptors
///
/// Unused slots are `None`; teardown skips them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandleTable {
    slots: Box<[Option<Fd>]>,
}

impl FileHandleTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_FILE_HANDLES].into_boxed_slice(),
        }
    }

    /// Install `fd` in the lowest free slot, returning the slot index
    pub fn install(&mut self, fd: Fd) -> Option<usize> {
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(fd);
        Some(slot)
    }

    pub fn get(&self, slot: usize) -> Option<Fd> {
        self.slots.get(slot).copied().flatten()
    }

    /// Clear a slot, returning the descriptor it held
    pub fn remove(&mut self, slot: usize) -> Option<Fd> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Iterate over the descriptors held by occupied slots
    pub fn open_handles(&self) -> impl Iterator<Item = Fd> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn len(&self) -> usize {
        self.open_handles().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for FileHandleTable {
    fn default() -> Self {
        Self::new()
    }
}
