//! Address-space region enumeration, independent of any one kernel API.

use std::path::{Path, PathBuf};

/// One region of a process's virtual address space.
///
/// Transient: produced during a scan, filtered, and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub start: u64,
    pub size: u64,
    pub read: bool,
    pub write: bool,
    pub exec: bool,
    /// Backing file, when the kernel can name one.
    pub path: Option<PathBuf>,
}

impl RegionDescriptor {
    pub fn end(&self) -> u64 {
        self.start + self.size
    }
}

/// "The region containing or following address A" — the one query a
/// kernel gives us for walking an address space without knowing its
/// layout up front.
pub trait RegionQuery {
    fn region_at_or_after(&self, address: u64) -> Option<RegionDescriptor>;
}

/// Walks a whole address space by repeated [`RegionQuery`] calls,
/// advancing to `start + size` after each hit and stopping when the
/// query runs past the last region.
pub struct RegionIter<'a, Q: RegionQuery + ?Sized> {
    query: &'a Q,
    address: u64,
}

impl<'a, Q: RegionQuery + ?Sized> RegionIter<'a, Q> {
    pub fn new(query: &'a Q) -> Self {
        // mach_vm_region scans upward, so starting at 1 still yields
        // the first region.
        Self { query, address: 1 }
    }
}

impl<Q: RegionQuery + ?Sized> Iterator for RegionIter<'_, Q> {
    type Item = RegionDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let region = self.query.region_at_or_after(self.address)?;
        self.address = region.end();
        Some(region)
    }
}

/// Candidate filter for the slice of memory the remote runtime keeps
/// its cartridge RAM in: writable data backed by the target executable
/// itself, not code, read-only mappings, or shared libraries.
pub fn is_target_data_segment(region: &RegionDescriptor, target_name: &str) -> bool {
    let named_after_target = region
        .path
        .as_deref()
        .is_some_and(|path| path.ends_with(Path::new(target_name)));
    named_after_target && region.read && region.write && !region.exec
}
