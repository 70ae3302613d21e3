//! The per-frame exchange pass over the 128-byte GPIO window.
//!
//! Each tick: honor the reinitialization handshake if the remote client
//! has (re)written its marker, push every occupied slot's current state,
//! force unoccupied slots to zero, and collect the rumble commands the
//! remote side left for us.

use tracing::debug;

use super::gamepad::{self, DeviceState, RumbleCommand};
use super::layout::{GPIO_SIZE, MARKER, MAX_GAMEPADS, SLOT_SIZE};

/// Outcome of one frame pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Normal frame: states encoded, rumble decoded.
    Synced,
    /// The marker was present: the window was zeroed and re-seeded.
    Reinitialized,
}

/// Run one exchange pass.
///
/// `states[i]` is the current snapshot of the device occupying slot `i`,
/// or `None` for an empty slot. Returns the decoded rumble command for
/// each occupied slot, plus whether the remote asked to reinitialize.
///
/// Invariants kept per tick:
/// - stale bytes never survive: empty slots are zeroed unconditionally,
///   and a marker write zeroes the whole window before re-seeding;
/// - bytes 14-15 of occupied slots are never written by this side.
pub fn sync_frame(
    gpio: &mut [u8; GPIO_SIZE],
    states: &[Option<DeviceState>; MAX_GAMEPADS],
) -> (FrameOutcome, [Option<RumbleCommand>; MAX_GAMEPADS]) {
    let outcome = if gpio[..MARKER.len()] == MARKER {
        // Freshly (re)started client: wipe everything, including any
        // rumble bytes left over from the previous run, then re-seed.
        debug!("marker present, reinitializing exchange window");
        gpio.fill(0);
        FrameOutcome::Reinitialized
    } else {
        FrameOutcome::Synced
    };

    let mut rumble = [None; MAX_GAMEPADS];
    for (index, state) in states.iter().enumerate() {
        let slot = &mut gpio[index * SLOT_SIZE..(index + 1) * SLOT_SIZE];
        match state {
            Some(state) => {
                gamepad::encode(state, slot);
                rumble[index] = Some(gamepad::decode_rumble(slot));
            }
            None => slot.fill(0),
        }
    }

    (outcome, rumble)
}
