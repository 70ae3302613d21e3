//! libproc-backed process enumeration.

use std::ffi::OsStr;
use std::os::unix::prelude::OsStrExt;
use std::path::PathBuf;
use std::ptr;

use mach2::libproc::{self, PROC_ALL_PIDS, PROC_PIDPATHINFO_MAXSIZE};

use super::{ProcessEntry, ProcessProvider};

const MAX_PATH: usize = (PROC_PIDPATHINFO_MAXSIZE - 1) as usize;

/// Live view of the system process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessProvider for SystemProcesses {
    fn list(&self) -> Vec<ProcessEntry> {
        list_all_pids()
            .into_iter()
            .map(|pid| ProcessEntry {
                pid,
                path: pid_path(pid),
            })
            .collect()
    }

    fn path_of(&self, pid: i32) -> Option<PathBuf> {
        pid_path(pid)
    }
}

fn list_all_pids() -> Vec<i32> {
    // First call sizes the buffer, second fills it. The table can grow
    // between the two calls; the kernel just truncates, which is fine
    // for a scan that reruns every second.
    let size = unsafe { libproc::proc_listpids(PROC_ALL_PIDS, 0, ptr::null_mut(), 0) };
    if size <= 0 {
        return Vec::new();
    }
    let mut pids = vec![0i32; size as usize / size_of::<i32>()];
    let written =
        unsafe { libproc::proc_listpids(PROC_ALL_PIDS, 0, pids.as_mut_ptr().cast(), size) };
    if written <= 0 {
        return Vec::new();
    }
    pids.truncate(written as usize / size_of::<i32>());
    pids
}

fn pid_path(pid: i32) -> Option<PathBuf> {
    let mut buf = [0u8; MAX_PATH];
    let len = unsafe { libproc::proc_pidpath(pid, buf.as_mut_ptr().cast(), buf.len() as u32) };
    if len <= 0 {
        return None;
    }
    Some(PathBuf::from(OsStr::from_bytes(&buf[..len as usize])))
}
