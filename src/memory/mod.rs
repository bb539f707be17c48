/*!
 * Memory Module
 * Address spaces, frame accounting, and performance monitor objects
 */

pub mod address_space;
pub mod perfmon;

// Re-export for convenience
pub use address_space::{AddressSpace, AddressSpaces};
pub use perfmon::{Perfmon, PerfmonRegistry};
