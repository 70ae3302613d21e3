//! # padbridge-core
//!
//! Core library for the padbridge gamepad bridge.
//!
//! This crate provides:
//! - The slot-based gamepad exchange protocol (wire layout, encoding,
//!   marker handshake)
//! - Process discovery and liveness checks
//! - Remote address-space access: region enumeration, memory remapping,
//!   marker scanning
//! - The connection pipeline and the two-cadence bridge driving it
//!
//! Platform backends are gated by target; the protocol and the bridge
//! itself are platform-neutral and fully testable against synthetic
//! address spaces.

pub mod bridge;
pub mod connection;
pub mod error;
pub mod memory;
pub mod process;
pub mod protocol;

pub use bridge::{Bridge, PollEvent, log_poll_event};
pub use connection::Connection;
pub use error::{Error, Result};
pub use memory::{
    AddressSpace, AddressSpaceSource, ExchangeLayout, MappedRegion, RegionDescriptor, RegionIter,
    RegionQuery,
};
pub use process::{ProcessEntry, ProcessProvider, find_target, is_alive};
pub use protocol::{
    DeviceState, FrameOutcome, GamepadButtons, GamepadFlags, RumbleCommand, Slots, sync_frame,
};

#[cfg(target_os = "macos")]
pub use bridge::SystemBridge;
#[cfg(target_os = "macos")]
pub use memory::SystemTasks;
#[cfg(target_os = "macos")]
pub use process::SystemProcesses;
