//! Connection lifecycle on top of the frame exchange.
//!
//! The bridge runs on two cadences. The slow tick ([`Bridge::poll`])
//! establishes a connection when there is none and checks liveness when
//! there is one. The fast tick ([`Bridge::frame`]) pushes gamepad state
//! through the exchange window and pulls rumble commands back.

use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::Error;
use crate::memory::{AddressSpace, AddressSpaceSource};
use crate::process::ProcessProvider;
use crate::protocol::{DeviceState, FrameOutcome, RumbleCommand, sync_frame};
use crate::protocol::layout::MAX_GAMEPADS;

/// What a slow tick observed.
#[derive(Debug)]
pub enum PollEvent {
    /// A new connection came up.
    Connected(i32),
    /// The existing connection is still healthy.
    Alive,
    /// The remote process went away; the mapping was released.
    Lost(i32),
    /// No connection, and this attempt did not produce one.
    Unavailable(Error),
}

type SpaceMapping<S> = <<S as AddressSpaceSource>::Space as AddressSpace>::Mapping;

pub struct Bridge<P, S>
where
    P: ProcessProvider,
    S: AddressSpaceSource,
{
    provider: P,
    source: S,
    target_name: String,
    connection: Option<Connection<SpaceMapping<S>>>,
}

impl<P, S> Bridge<P, S>
where
    P: ProcessProvider,
    S: AddressSpaceSource,
{
    pub fn new(provider: P, source: S, target_name: impl Into<String>) -> Self {
        Self {
            provider,
            source,
            target_name: target_name.into(),
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn pid(&self) -> Option<i32> {
        self.connection.as_ref().map(|c| c.pid())
    }

    /// Slow tick: connect if disconnected, verify liveness otherwise.
    pub fn poll(&mut self) -> PollEvent {
        match &self.connection {
            None => match Connection::establish(&self.provider, &self.source, &self.target_name) {
                Ok(connection) => {
                    let pid = connection.pid();
                    self.connection = Some(connection);
                    PollEvent::Connected(pid)
                }
                Err(err) => PollEvent::Unavailable(err),
            },
            Some(connection) => {
                let pid = connection.pid();
                if connection.is_alive(&self.provider) {
                    PollEvent::Alive
                } else {
                    // Dropping the connection releases the mapping; the
                    // kernel keeps the pages valid until then even though
                    // the remote process is gone.
                    self.connection = None;
                    PollEvent::Lost(pid)
                }
            }
        }
    }

    /// Fast tick: exchange one frame. Returns `None` while disconnected.
    pub fn frame(
        &mut self,
        states: &[Option<DeviceState>; MAX_GAMEPADS],
    ) -> Option<(FrameOutcome, [Option<RumbleCommand>; MAX_GAMEPADS])> {
        let connection = self.connection.as_mut()?;
        Some(sync_frame(connection.gpio(), states))
    }

    /// Drop the connection if one exists.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }
}

/// Log one poll outcome at the severity it deserves. Absence of the
/// target is routine while waiting for it to launch, so it logs at
/// debug only; real failures get a warning.
pub fn log_poll_event(event: &PollEvent) {
    match event {
        PollEvent::Connected(pid) => info!("bridge up (pid {pid})"),
        PollEvent::Alive => {}
        PollEvent::Lost(pid) => info!("tearing down: {}", Error::RemoteProcessExited(*pid)),
        PollEvent::Unavailable(err) if err.is_target_absent() => debug!("not connected: {err}"),
        PollEvent::Unavailable(err) => warn!("connection attempt failed: {err}"),
    }
}

#[cfg(target_os = "macos")]
pub type SystemBridge = Bridge<crate::process::SystemProcesses, crate::memory::SystemTasks>;

#[cfg(target_os = "macos")]
impl SystemBridge {
    /// Bridge over the live system, targeting processes whose
    /// executable name matches `target_name`.
    pub fn system(target_name: impl Into<String>) -> Self {
        Bridge::new(
            crate::process::SystemProcesses,
            crate::memory::SystemTasks,
            target_name,
        )
    }
}
