//! A live connection to the remote runtime's cartridge RAM.
//!
//! Establishing one runs the whole pipeline: find the process, open its
//! address space, walk its regions for the writable data segment, remap
//! the candidate into our own space, and locate the marker inside it.
//! A `Connection` either exists fully mapped or not at all; dropping it
//! releases the mapping exactly once.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::{
    AddressSpace, AddressSpaceSource, MappedRegion, RegionIter, exchange_offset, find_marker,
    is_target_data_segment,
};
use crate::process::{ProcessProvider, find_target};
use crate::protocol::layout::{EXTENDED_MEMORY_SIZE, GPIO_SIZE};

/// Owns the mapped region for its lifetime and exposes the two views
/// the protocol needs: the 64 KiB cartridge RAM and the 128-byte GPIO
/// window inside it.
pub struct Connection<M: MappedRegion> {
    pid: i32,
    mapping: M,
    ram_offset: usize,
    gpio_offset: usize,
}

impl<M: MappedRegion> Connection<M> {
    /// Locate the target process and map its exchange window.
    pub fn establish<P, S>(provider: &P, source: &S, target_name: &str) -> Result<Self>
    where
        P: ProcessProvider,
        S: AddressSpaceSource,
        S::Space: AddressSpace<Mapping = M>,
    {
        let pid = find_target(provider, target_name)?;
        let space = source.open(pid)?;
        let (mapping, layout) = locate_exchange(&space, pid, target_name)?;
        info!("connected to `{target_name}` (pid {pid})");
        Ok(Connection {
            pid,
            mapping,
            ram_offset: layout.ram_offset,
            gpio_offset: layout.gpio_offset,
        })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Whether the remote process is still around. The mapping stays
    /// valid either way; this is what decides when to tear it down.
    pub fn is_alive<P: ProcessProvider>(&self, provider: &P) -> bool {
        crate::process::is_alive(provider, self.pid)
    }

    /// The full cartridge-addressable memory: a base 32 KiB working set
    /// plus the extended upper 32 KiB.
    pub fn cartridge_ram(&mut self) -> &mut [u8] {
        &mut self.mapping.bytes_mut()[self.ram_offset..self.ram_offset + EXTENDED_MEMORY_SIZE]
    }

    /// The 128-byte exchange window. Writes land directly in the remote
    /// process's pages.
    pub fn gpio(&mut self) -> &mut [u8; GPIO_SIZE] {
        (&mut self.mapping.bytes_mut()[self.gpio_offset..self.gpio_offset + GPIO_SIZE])
            .try_into()
            .expect("window size is fixed")
    }

    /// Tear the connection down, releasing the mapping. Dropping the
    /// connection does the same; either way it happens once.
    pub fn close(self) {}
}

type Located<S> = (<S as AddressSpace>::Mapping, crate::memory::ExchangeLayout);

/// Walk the space's regions for the writable data segment carrying the
/// marker. Candidates that map but turn out not to hold the marker are
/// released again before the next one is tried — a mapped-but-unused
/// region must not outlive the scan.
fn locate_exchange<S: AddressSpace>(space: &S, pid: i32, target_name: &str) -> Result<Located<S>> {
    let mut saw_candidate = false;
    for region in RegionIter::new(space).filter(|r| is_target_data_segment(r, target_name)) {
        saw_candidate = true;
        debug!(
            "candidate region at {:#x} ({} bytes)",
            region.start, region.size
        );
        let mapping = space.remap(region.start, region.size)?;
        if let Some(layout) =
            find_marker(mapping.bytes()).and_then(|at| exchange_offset(at, mapping.bytes().len()))
        {
            debug!("marker found, exchange window at {:#x}", layout.gpio_offset);
            return Ok((mapping, layout));
        }
        // No marker: drop releases the candidate mapping.
    }
    if saw_candidate {
        Err(Error::MarkerNotFound { pid })
    } else {
        Err(Error::RegionNotFound { pid })
    }
}
