//! Synthetic address spaces for tests.
//!
//! Models a process as a sorted list of regions with byte content, and
//! counts outstanding mappings so tests can assert that every mapping
//! taken during a failed scan was released again.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::memory::{AddressSpace, AddressSpaceSource, MappedRegion, RegionDescriptor, RegionQuery};

#[derive(Default)]
pub struct MockAddressSpace {
    regions: Vec<RegionDescriptor>,
    contents: Vec<Vec<u8>>,
    live_mappings: Rc<Cell<usize>>,
}

impl MockAddressSpace {
    /// Space whose regions have no interesting content (zero-filled).
    pub fn new(mut regions: Vec<RegionDescriptor>) -> Self {
        regions.sort_by_key(|r| r.start);
        let contents = regions.iter().map(|r| vec![0u8; r.size as usize]).collect();
        Self {
            regions,
            contents,
            live_mappings: Rc::default(),
        }
    }

    /// Replace the content of the region starting at `start`.
    pub fn fill_region(&mut self, start: u64, bytes: Vec<u8>) {
        let index = self
            .regions
            .iter()
            .position(|r| r.start == start)
            .expect("no region at that start address");
        assert_eq!(bytes.len(), self.regions[index].size as usize);
        self.contents[index] = bytes;
    }

    /// Mappings handed out and not yet dropped.
    pub fn live_mappings(&self) -> usize {
        self.live_mappings.get()
    }
}

impl RegionQuery for MockAddressSpace {
    fn region_at_or_after(&self, address: u64) -> Option<RegionDescriptor> {
        self.regions
            .iter()
            .find(|r| r.end() > address)
            .cloned()
    }
}

pub struct MockMapping {
    bytes: Vec<u8>,
    live_mappings: Rc<Cell<usize>>,
}

impl MappedRegion for MockMapping {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for MockMapping {
    fn drop(&mut self) {
        self.live_mappings.set(self.live_mappings.get() - 1);
    }
}

impl AddressSpace for MockAddressSpace {
    type Mapping = MockMapping;

    fn remap(&self, start: u64, size: u64) -> Result<Self::Mapping> {
        let index = self
            .regions
            .iter()
            .position(|r| r.start == start && r.size == size)
            .ok_or(Error::MapFailed(-1))?;
        self.live_mappings.set(self.live_mappings.get() + 1);
        Ok(MockMapping {
            bytes: self.contents[index].clone(),
            live_mappings: Rc::clone(&self.live_mappings),
        })
    }
}

/// Hands out clones of prebuilt spaces, keyed by pid.
#[derive(Default)]
pub struct MockTasks {
    spaces: Vec<(i32, MockAddressSpace)>,
    pub deny: bool,
}

impl MockTasks {
    pub fn with_space(pid: i32, space: MockAddressSpace) -> Self {
        Self {
            spaces: vec![(pid, space)],
            deny: false,
        }
    }
}

impl AddressSpaceSource for MockTasks {
    type Space = MockAddressSpace;

    fn open(&self, pid: i32) -> Result<Self::Space> {
        if self.deny {
            return Err(Error::PermissionDenied { pid, code: 5 });
        }
        self.spaces
            .iter()
            .find(|(p, _)| *p == pid)
            .map(|(_, space)| MockAddressSpace {
                regions: space.regions.clone(),
                contents: space.contents.clone(),
                live_mappings: Rc::clone(&space.live_mappings),
            })
            .ok_or(Error::PermissionDenied { pid, code: 5 })
    }
}
