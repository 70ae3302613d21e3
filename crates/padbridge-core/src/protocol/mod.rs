//! Wire protocol for the shared gamepad exchange window.

pub mod layout;

mod exchange;
mod gamepad;
mod slots;

pub use exchange::{FrameOutcome, sync_frame};
pub use gamepad::{DeviceState, GamepadButtons, GamepadFlags, RumbleCommand, decode, decode_rumble, encode};
pub use slots::Slots;
