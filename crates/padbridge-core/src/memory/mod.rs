//! Remote address-space access: region enumeration and remapping.

mod marker;
mod region;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(test)]
pub mod mock;

pub use marker::{ExchangeLayout, exchange_offset, find_marker};
pub use region::{RegionDescriptor, RegionIter, RegionQuery, is_target_data_segment};

#[cfg(target_os = "macos")]
pub use macos::{Mapping, SystemTasks, TaskHandle};

use crate::error::Result;

/// A remote range mapped into our own address space, alive until drop.
///
/// Reads and writes go straight to the pages the remote process sees;
/// there is no buffering. Unmapping happens exactly once, when the sole
/// owner is dropped.
pub trait MappedRegion {
    fn bytes(&self) -> &[u8];
    fn bytes_mut(&mut self) -> &mut [u8];
}

/// Handle on one process's address space: enumerate its regions, remap
/// ranges of it into ours.
pub trait AddressSpace: RegionQuery {
    type Mapping: MappedRegion;

    /// Map `size` bytes starting at `start` in the remote space into
    /// our own, read/write, at a kernel-chosen address. The mapping is
    /// backed by the same physical pages, not a copy.
    fn remap(&self, start: u64, size: u64) -> Result<Self::Mapping>;
}

/// Opens address spaces by pid. The system implementation asks the
/// kernel for a task handle; tests hand out synthetic spaces.
pub trait AddressSpaceSource {
    type Space: AddressSpace;

    fn open(&self, pid: i32) -> Result<Self::Space>;
}
