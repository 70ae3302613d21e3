//! Process discovery: pid enumeration, executable paths, liveness.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::SystemProcesses;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// One visible process. Path resolution commonly fails for privileged
/// processes; absence is represented, never propagated as an error.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub pid: i32,
    pub path: Option<PathBuf>,
}

/// Source of visible processes. The system implementation talks to the
/// OS; tests substitute fixed lists.
pub trait ProcessProvider {
    /// Every visible pid, each with its executable path if resolvable.
    fn list(&self) -> Vec<ProcessEntry>;

    /// Executable path of a single pid, if it can still be resolved.
    fn path_of(&self, pid: i32) -> Option<PathBuf>;
}

/// First process whose executable path ends with `name` (matched as a
/// whole path component, so `pico8` matches `.../MacOS/pico8` but not
/// `.../notpico8`).
pub fn find_target<P: ProcessProvider>(provider: &P, name: &str) -> Result<i32> {
    let entries = provider.list();
    debug!("scanning {} visible processes for `{name}`", entries.len());
    entries
        .iter()
        .find(|entry| {
            entry
                .path
                .as_deref()
                .is_some_and(|path| path.ends_with(Path::new(name)))
        })
        .map(|entry| entry.pid)
        .ok_or_else(|| Error::ProcessNotFound(name.to_string()))
}

/// Liveness is re-attempted path resolution: once a pid's path can no
/// longer be resolved we treat the process as exited. A pid reused
/// within one scan interval would fool this; accepted, not corrected.
pub fn is_alive<P: ProcessProvider>(provider: &P, pid: i32) -> bool {
    provider.path_of(pid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProcesses {
        entries: Vec<ProcessEntry>,
    }

    impl ProcessProvider for StubProcesses {
        fn list(&self) -> Vec<ProcessEntry> {
            self.entries.clone()
        }

        fn path_of(&self, pid: i32) -> Option<PathBuf> {
            self.entries
                .iter()
                .find(|e| e.pid == pid)
                .and_then(|e| e.path.clone())
        }
    }

    fn entry(pid: i32, path: Option<&str>) -> ProcessEntry {
        ProcessEntry {
            pid,
            path: path.map(PathBuf::from),
        }
    }

    #[test]
    fn test_unresolvable_paths_are_represented_not_errors() {
        let stub = StubProcesses {
            entries: vec![
                entry(1, None),
                entry(2, None),
                entry(3, Some("/Applications/PICO-8.app/Contents/MacOS/pico8")),
            ],
        };
        // Enumeration with unresolvable entries still finds the target.
        assert_eq!(find_target(&stub, "pico8").unwrap(), 3);
    }

    #[test]
    fn test_find_target_matches_whole_component() {
        let stub = StubProcesses {
            entries: vec![
                entry(7, Some("/usr/bin/notpico8")),
                entry(8, Some("/opt/games/pico8")),
            ],
        };
        assert_eq!(find_target(&stub, "pico8").unwrap(), 8);
    }

    #[test]
    fn test_find_target_picks_first_match() {
        let stub = StubProcesses {
            entries: vec![entry(5, Some("/a/pico8")), entry(6, Some("/b/pico8"))],
        };
        assert_eq!(find_target(&stub, "pico8").unwrap(), 5);
    }

    #[test]
    fn test_find_target_absent() {
        let stub = StubProcesses {
            entries: vec![entry(1, Some("/usr/bin/zsh")), entry(2, None)],
        };
        assert!(matches!(
            find_target(&stub, "pico8"),
            Err(Error::ProcessNotFound(name)) if name == "pico8"
        ));
    }

    #[test]
    fn test_liveness_follows_path_resolution() {
        let stub = StubProcesses {
            entries: vec![entry(1, Some("/opt/games/pico8")), entry(2, None)],
        };
        assert!(is_alive(&stub, 1));
        // Path no longer resolvable: treated as exited.
        assert!(!is_alive(&stub, 2));
        assert!(!is_alive(&stub, 999));
    }
}
