//! Shared-memory layout constants for the gamepad exchange protocol.
//!
//! The remote runtime reserves a 128-byte GPIO window at a fixed offset
//! inside its cartridge RAM and writes a 16-byte marker there when its
//! client is ready. Everything the two sides exchange lives in that
//! window; these constants pin down the exact byte positions.

/// Marker the remote client writes at the start of the GPIO window to
/// signal "ready, please (re)initialize". Equivalent to the UUID
/// `0220c746-77ab-446e-bedc-7fd6d277984d`.
pub const MARKER: [u8; 16] = [
    0x02, 0x20, 0xc7, 0x46, 0x77, 0xab, 0x44, 0x6e, 0xbe, 0xdc, 0x7f, 0xd6, 0xd2, 0x77, 0x98, 0x4d,
];

/// Offset of the GPIO window from the base of cartridge RAM.
pub const GPIO_OFFSET: usize = 0x5f80;

/// Size of the GPIO window.
pub const GPIO_SIZE: usize = 0x80;

/// Cartridge RAM size in regular memory mode.
pub const BASE_MEMORY_SIZE: usize = 0x8000;

/// Cartridge RAM size with the extended upper half enabled.
pub const EXTENDED_MEMORY_SIZE: usize = 0x10000;

/// One gamepad record per slot.
pub const SLOT_SIZE: usize = 16;

/// The GPIO window holds exactly this many slots.
pub const MAX_GAMEPADS: usize = GPIO_SIZE / SLOT_SIZE;

/// Byte offsets within a 16-byte slot.
pub mod slot {
    pub const FLAGS: usize = 0;
    pub const BATTERY: usize = 1;
    /// Button bits, little-endian u16 at 2..4.
    pub const BUTTONS: usize = 2;
    pub const LEFT_TRIGGER: usize = 4;
    pub const RIGHT_TRIGGER: usize = 5;
    /// Stick axes, little-endian i16 pairs.
    pub const LEFT_STICK_X: usize = 6;
    pub const LEFT_STICK_Y: usize = 8;
    pub const RIGHT_STICK_X: usize = 10;
    pub const RIGHT_STICK_Y: usize = 12;
    /// Written by the remote side, read-only for us.
    pub const LO_FREQ_RUMBLE: usize = 14;
    /// Written by the remote side, read-only for us.
    pub const HI_FREQ_RUMBLE: usize = 15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_fill_gpio_exactly() {
        assert_eq!(MAX_GAMEPADS * SLOT_SIZE, GPIO_SIZE);
        assert_eq!(MAX_GAMEPADS, 8);
    }

    #[test]
    fn test_gpio_sits_inside_base_memory() {
        // GPIO ends at 0x6000, where screen data starts; base RAM runs
        // on to 0x8000.
        assert_eq!(GPIO_OFFSET + GPIO_SIZE, 0x6000);
        assert!(GPIO_OFFSET + GPIO_SIZE <= BASE_MEMORY_SIZE);
    }
}
