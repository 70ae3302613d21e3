use thiserror::Error;

/// Connection-layer failures.
///
/// Every variant here is recoverable: the bridge drops back to the
/// disconnected state and retries on the next scan tick. Kernel return
/// codes are carried as raw `i32` so the error type stays portable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no process with executable name ending in `{0}` found")]
    ProcessNotFound(String),

    #[error("not allowed to inspect the address space of pid {pid} (kern_return {code})")]
    PermissionDenied { pid: i32, code: i32 },

    #[error("no writable, non-executable region backed by the target executable in pid {pid}")]
    RegionNotFound { pid: i32 },

    #[error("marker bytes not found in any candidate region of pid {pid}")]
    MarkerNotFound { pid: i32 },

    #[error("kernel refused to remap remote memory (kern_return {0})")]
    MapFailed(i32),

    #[error("remote process (pid {0}) exited")]
    RemoteProcessExited(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this failure means the target simply wasn't ready yet,
    /// as opposed to something being wrong on our side.
    pub fn is_target_absent(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::MarkerNotFound { .. } | Error::RemoteProcessExited(_)
        )
    }
}
