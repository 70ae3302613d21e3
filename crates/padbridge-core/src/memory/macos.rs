//! Mach-backed address-space access.
//!
//! `task_for_pid` needs the caller to be root or carry the debugging
//! entitlement; an unsigned binary will get `PermissionDenied` here no
//! matter what the target is.

use std::ffi::OsStr;
use std::mem;
use std::os::unix::prelude::OsStrExt;
use std::path::PathBuf;
use std::slice;

use mach2::kern_return::KERN_SUCCESS;
use mach2::libproc::{self, PROC_PIDPATHINFO_MAXSIZE};
use mach2::message::mach_msg_type_number_t;
use mach2::port::{MACH_PORT_NULL, mach_port_name_t, mach_port_t};
use mach2::traps::{mach_task_self, task_for_pid};
use mach2::vm::{mach_vm_deallocate, mach_vm_region, mach_vm_remap};
use mach2::vm_inherit::VM_INHERIT_DEFAULT;
use mach2::vm_prot::{VM_PROT_EXECUTE, VM_PROT_READ, VM_PROT_WRITE};
use mach2::vm_region::{
    VM_REGION_EXTENDED_INFO, vm_region_extended_info_data_t, vm_region_info_t,
};
use mach2::vm_statistics::VM_FLAGS_ANYWHERE;
use mach2::vm_types::{mach_vm_address_t, mach_vm_size_t};
use tracing::warn;

use super::{AddressSpace, AddressSpaceSource, MappedRegion, RegionDescriptor, RegionQuery};
use crate::error::{Error, Result};

const MAX_PATH: usize = (PROC_PIDPATHINFO_MAXSIZE - 1) as usize;

/// Mach task port for a remote process.
pub struct TaskHandle {
    pid: i32,
    task: mach_port_t,
}

impl TaskHandle {
    pub fn open(pid: i32) -> Result<Self> {
        let mut task: mach_port_name_t = MACH_PORT_NULL;
        let kr = unsafe { task_for_pid(mach_task_self(), pid, &mut task) };
        if kr != KERN_SUCCESS {
            return Err(Error::PermissionDenied { pid, code: kr });
        }
        Ok(Self { pid, task })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl RegionQuery for TaskHandle {
    fn region_at_or_after(&self, address: u64) -> Option<RegionDescriptor> {
        let mut start: mach_vm_address_t = address;
        let mut size: mach_vm_size_t = 0;
        let mut info = unsafe { mem::zeroed::<vm_region_extended_info_data_t>() };
        let mut count =
            mem::size_of::<vm_region_extended_info_data_t>() as mach_msg_type_number_t;
        let mut object_name: mach_port_t = 0;

        let kr = unsafe {
            mach_vm_region(
                self.task,
                &mut start,
                &mut size,
                VM_REGION_EXTENDED_INFO,
                &mut info as *mut _ as vm_region_info_t,
                &mut count,
                &mut object_name,
            )
        };
        // Any failure here means we ran past the last region (or the
        // task died); either way the scan is over.
        if kr != KERN_SUCCESS {
            return None;
        }

        Some(RegionDescriptor {
            start,
            size,
            read: info.protection & VM_PROT_READ != 0,
            write: info.protection & VM_PROT_WRITE != 0,
            exec: info.protection & VM_PROT_EXECUTE != 0,
            path: region_filename(self.pid, start),
        })
    }
}

impl AddressSpace for TaskHandle {
    type Mapping = Mapping;

    fn remap(&self, start: u64, size: u64) -> Result<Mapping> {
        let mut local: mach_vm_address_t = 0;
        let mut cur_protection = VM_PROT_READ | VM_PROT_WRITE;
        let mut max_protection = VM_PROT_READ | VM_PROT_WRITE;
        let kr = unsafe {
            mach_vm_remap(
                mach_task_self(),
                &mut local,
                size,
                0,
                VM_FLAGS_ANYWHERE,
                self.task,
                start,
                0, // share the source pages, don't copy them
                &mut cur_protection,
                &mut max_protection,
                VM_INHERIT_DEFAULT,
            )
        };
        if kr != KERN_SUCCESS {
            return Err(Error::MapFailed(kr));
        }
        Ok(Mapping {
            base: local,
            size,
        })
    }
}

/// A remote range remapped into our own address space.
///
/// Sole owner of the local mapping; dropping it is the one and only
/// deallocation.
pub struct Mapping {
    base: mach_vm_address_t,
    size: mach_vm_size_t,
}

impl MappedRegion for Mapping {
    fn bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.base as *const u8, self.size as usize) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.base as *mut u8, self.size as usize) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        let kr = unsafe { mach_vm_deallocate(mach_task_self(), self.base, self.size) };
        if kr != KERN_SUCCESS {
            warn!("mach_vm_deallocate failed (kern_return {kr})");
        }
    }
}

/// Opens task handles for live pids.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTasks;

impl AddressSpaceSource for SystemTasks {
    type Space = TaskHandle;

    fn open(&self, pid: i32) -> Result<TaskHandle> {
        TaskHandle::open(pid)
    }
}

fn region_filename(pid: i32, address: u64) -> Option<PathBuf> {
    let mut buf = [0u8; MAX_PATH];
    let len =
        unsafe { libproc::proc_regionfilename(pid, address, buf.as_mut_ptr().cast(), buf.len() as u32) };
    if len <= 0 {
        return None;
    }
    Some(PathBuf::from(OsStr::from_bytes(&buf[..len as usize])))
}
