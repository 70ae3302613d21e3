//! Per-slot gamepad state and its 16-byte wire encoding.
//!
//! The slot layout follows the XInput gamepad/vibration structures,
//! prefixed with a flags byte and a battery meter and with single-byte
//! rumble fields, so that one device fits in exactly 16 bytes. All
//! fields are written by us except the two rumble bytes, which are
//! commands from the remote side.

use bitflags::bitflags;

use super::layout::slot;
use super::layout::SLOT_SIZE;

bitflags! {
    /// Informational flags for one device slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GamepadFlags: u8 {
        /// A device occupies this slot.
        const CONNECTED = 1 << 0;
        /// The `battery` byte and `CHARGING` flag are meaningful.
        const HAS_BATTERY = 1 << 1;
        const CHARGING = 1 << 2;
        /// Not every controller exposes a usable guide button.
        const HAS_GUIDE_BUTTON = 1 << 3;
        /// Misc/touchpad-click button present.
        const HAS_MISC_BUTTON = 1 << 4;
        const HAS_RUMBLE = 1 << 5;
        /// This slot is a rumble-only device with no real inputs.
        const HAPTIC_DEVICE = 1 << 6;
    }
}

bitflags! {
    /// Button bits, XInput order, with guide and misc in the two bits
    /// XInput leaves unused.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GamepadButtons: u16 {
        const DPAD_UP = 1 << 0;
        const DPAD_DOWN = 1 << 1;
        const DPAD_LEFT = 1 << 2;
        const DPAD_RIGHT = 1 << 3;

        const START = 1 << 4;
        const BACK = 1 << 5;

        const LEFT_STICK = 1 << 6;
        const RIGHT_STICK = 1 << 7;

        const LEFT_BUMPER = 1 << 8;
        const RIGHT_BUMPER = 1 << 9;

        const GUIDE = 1 << 10;
        const MISC = 1 << 11;

        const A = 1 << 12;
        const B = 1 << 13;
        const X = 1 << 14;
        const Y = 1 << 15;
    }
}

/// Snapshot of one local device, in input-API units.
///
/// Triggers are 0.0..=1.0. Sticks are -1.0..=1.0 in raw HID convention,
/// where positive Y means down; the encoder flips Y so that "up" is
/// positive on the wire. Battery is 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceState {
    pub flags: GamepadFlags,
    pub buttons: GamepadButtons,
    pub battery: f32,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub left_stick_x: f32,
    pub left_stick_y: f32,
    pub right_stick_x: f32,
    pub right_stick_y: f32,
}

/// Rumble intensities commanded by the remote side, 0.0..=1.0 each.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RumbleCommand {
    pub lo_freq: f32,
    pub hi_freq: f32,
}

impl RumbleCommand {
    pub fn is_idle(&self) -> bool {
        self.lo_freq == 0.0 && self.hi_freq == 0.0
    }

    /// Intensity for devices with a single combined motor.
    pub fn combined(&self) -> f32 {
        self.lo_freq.max(self.hi_freq)
    }
}

fn quantize_trigger(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * f32::from(u8::MAX)) as u8
}

fn quantize_axis(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// Encode a device snapshot into one 16-byte slot.
///
/// Bytes 14-15 belong to the remote side and are left untouched, so a
/// rumble command can never be lost to a concurrent frame write.
pub fn encode(state: &DeviceState, bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), SLOT_SIZE);

    bytes[slot::FLAGS] = state.flags.bits();
    bytes[slot::BATTERY] = quantize_trigger(state.battery);
    bytes[slot::BUTTONS..slot::BUTTONS + 2].copy_from_slice(&state.buttons.bits().to_le_bytes());

    bytes[slot::LEFT_TRIGGER] = quantize_trigger(state.left_trigger);
    bytes[slot::RIGHT_TRIGGER] = quantize_trigger(state.right_trigger);

    // The wire wants up-positive Y, raw HID reports down-positive.
    let pairs = [
        (slot::LEFT_STICK_X, quantize_axis(state.left_stick_x)),
        (slot::LEFT_STICK_Y, quantize_axis(-state.left_stick_y)),
        (slot::RIGHT_STICK_X, quantize_axis(state.right_stick_x)),
        (slot::RIGHT_STICK_Y, quantize_axis(-state.right_stick_y)),
    ];
    for (offset, value) in pairs {
        bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }
}

/// Read the remote-owned rumble bytes out of one slot.
pub fn decode_rumble(bytes: &[u8]) -> RumbleCommand {
    debug_assert_eq!(bytes.len(), SLOT_SIZE);
    RumbleCommand {
        lo_freq: f32::from(bytes[slot::LO_FREQ_RUMBLE]) / f32::from(u8::MAX),
        hi_freq: f32::from(bytes[slot::HI_FREQ_RUMBLE]) / f32::from(u8::MAX),
    }
}

/// Decode the locally-written fields back into a snapshot.
///
/// Quantization makes this lossy below 1/255 (triggers, battery) and
/// 1/32767 (axes); flags and buttons round-trip exactly.
pub fn decode(bytes: &[u8]) -> DeviceState {
    debug_assert_eq!(bytes.len(), SLOT_SIZE);

    let axis = |offset: usize| {
        let raw = i16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        f32::from(raw) / f32::from(i16::MAX)
    };

    DeviceState {
        flags: GamepadFlags::from_bits_truncate(bytes[slot::FLAGS]),
        buttons: GamepadButtons::from_bits_truncate(u16::from_le_bytes([
            bytes[slot::BUTTONS],
            bytes[slot::BUTTONS + 1],
        ])),
        battery: f32::from(bytes[slot::BATTERY]) / f32::from(u8::MAX),
        left_trigger: f32::from(bytes[slot::LEFT_TRIGGER]) / f32::from(u8::MAX),
        right_trigger: f32::from(bytes[slot::RIGHT_TRIGGER]) / f32::from(u8::MAX),
        left_stick_x: axis(slot::LEFT_STICK_X),
        left_stick_y: -axis(slot::LEFT_STICK_Y),
        right_stick_x: axis(slot::RIGHT_STICK_X),
        right_stick_y: -axis(slot::RIGHT_STICK_Y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> DeviceState {
        DeviceState {
            flags: GamepadFlags::CONNECTED | GamepadFlags::HAS_RUMBLE | GamepadFlags::HAS_BATTERY,
            buttons: GamepadButtons::A | GamepadButtons::DPAD_LEFT | GamepadButtons::GUIDE,
            battery: 0.5,
            left_trigger: 0.25,
            right_trigger: 1.0,
            left_stick_x: 0.5,
            left_stick_y: -0.5,
            right_stick_x: -1.0,
            right_stick_y: 1.0,
        }
    }

    #[test]
    fn test_round_trip_flags_and_buttons_exact() {
        let state = sample_state();
        let mut bytes = [0u8; SLOT_SIZE];
        encode(&state, &mut bytes);
        let back = decode(&bytes);
        assert_eq!(back.flags, state.flags);
        assert_eq!(back.buttons, state.buttons);
    }

    #[test]
    fn test_round_trip_analog_within_quantization() {
        let state = sample_state();
        let mut bytes = [0u8; SLOT_SIZE];
        encode(&state, &mut bytes);
        let back = decode(&bytes);

        assert!((back.battery - state.battery).abs() <= 1.0 / 255.0);
        assert!((back.left_trigger - state.left_trigger).abs() <= 1.0 / 255.0);
        assert!((back.right_trigger - state.right_trigger).abs() <= 1.0 / 255.0);
        for (a, b) in [
            (back.left_stick_x, state.left_stick_x),
            (back.left_stick_y, state.left_stick_y),
            (back.right_stick_x, state.right_stick_x),
            (back.right_stick_y, state.right_stick_y),
        ] {
            assert!((a - b).abs() <= 2.0 / 32767.0, "{a} vs {b}");
        }
    }

    #[test]
    fn test_stick_up_encodes_positive_y() {
        // Raw HID "stick up" is negative; the wire must see positive.
        let state = DeviceState {
            left_stick_y: -1.0,
            right_stick_y: -0.5,
            ..DeviceState::default()
        };
        let mut bytes = [0u8; SLOT_SIZE];
        encode(&state, &mut bytes);

        let left = i16::from_le_bytes([bytes[slot::LEFT_STICK_Y], bytes[slot::LEFT_STICK_Y + 1]]);
        let right =
            i16::from_le_bytes([bytes[slot::RIGHT_STICK_Y], bytes[slot::RIGHT_STICK_Y + 1]]);
        assert!(left > 0);
        assert!(right > 0);
    }

    #[test]
    fn test_encode_leaves_rumble_bytes_alone() {
        let mut bytes = [0u8; SLOT_SIZE];
        bytes[slot::LO_FREQ_RUMBLE] = 0x7f;
        bytes[slot::HI_FREQ_RUMBLE] = 0xff;
        encode(&sample_state(), &mut bytes);
        assert_eq!(bytes[slot::LO_FREQ_RUMBLE], 0x7f);
        assert_eq!(bytes[slot::HI_FREQ_RUMBLE], 0xff);

        let rumble = decode_rumble(&bytes);
        assert!((rumble.lo_freq - 127.0 / 255.0).abs() < 1e-6);
        assert_eq!(rumble.hi_freq, 1.0);
        assert_eq!(rumble.combined(), 1.0);
    }

    #[test]
    fn test_rumble_idle_and_combined() {
        assert!(RumbleCommand::default().is_idle());
        let cmd = RumbleCommand {
            lo_freq: 0.3,
            hi_freq: 0.1,
        };
        assert!(!cmd.is_idle());
        assert!((cmd.combined() - 0.3).abs() < 1e-6);
    }
}
