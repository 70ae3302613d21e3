//! Persistent slot assignment for up to eight devices.
//!
//! A device keeps its slot for as long as it stays connected, even when
//! a lower-numbered device drops out, so player numbers never shuffle
//! mid-session.

use tracing::warn;

use super::layout::MAX_GAMEPADS;

/// Registry mapping opaque device ids to slot indexes.
#[derive(Debug, Clone)]
pub struct Slots<K: Copy + PartialEq + std::fmt::Debug> {
    slots: [Option<K>; MAX_GAMEPADS],
}

impl<K: Copy + PartialEq + std::fmt::Debug> Default for Slots<K> {
    fn default() -> Self {
        Self {
            slots: [None; MAX_GAMEPADS],
        }
    }
}

impl<K: Copy + PartialEq + std::fmt::Debug> Slots<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot currently assigned to this device, if any.
    pub fn index_of(&self, id: K) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(id))
    }

    /// Assign a slot, keeping an existing assignment stable.
    /// Returns `None` when all slots are taken; the device is ignored.
    pub fn assign(&mut self, id: K) -> Option<usize> {
        if let Some(index) = self.index_of(id) {
            return Some(index);
        }
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(id);
                Some(index)
            }
            None => {
                warn!("all {MAX_GAMEPADS} slots taken, ignoring device {id:?}");
                None
            }
        }
    }

    /// Free a device's slot. Returns the freed index so the caller can
    /// zero its bytes.
    pub fn release(&mut self, id: K) -> Option<usize> {
        let index = self.index_of(id)?;
        self.slots[index] = None;
        Some(index)
    }

    /// Forget every assignment (connection teardown).
    pub fn clear(&mut self) {
        self.slots = [None; MAX_GAMEPADS];
    }

    pub fn get(&self, index: usize) -> Option<K> {
        self.slots.get(index).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, K)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|id| (i, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_is_persistent() {
        let mut slots: Slots<u32> = Slots::new();
        assert_eq!(slots.assign(10), Some(0));
        assert_eq!(slots.assign(11), Some(1));
        assert_eq!(slots.assign(12), Some(2));

        // Device 11 leaves; 10 and 12 keep their slots.
        assert_eq!(slots.release(11), Some(1));
        assert_eq!(slots.index_of(10), Some(0));
        assert_eq!(slots.index_of(12), Some(2));

        // A newcomer takes the freed slot, not a shifted one.
        assert_eq!(slots.assign(13), Some(1));

        // Re-assigning an existing device is a no-op.
        assert_eq!(slots.assign(12), Some(2));
    }

    #[test]
    fn test_ninth_device_is_ignored() {
        let mut slots: Slots<u32> = Slots::new();
        for id in 0..MAX_GAMEPADS as u32 {
            assert!(slots.assign(id).is_some());
        }
        assert_eq!(slots.assign(99), None);
        // Nothing was overwritten.
        for id in 0..MAX_GAMEPADS as u32 {
            assert_eq!(slots.index_of(id), Some(id as usize));
        }
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut slots: Slots<u32> = Slots::new();
        slots.assign(1);
        slots.assign(2);
        slots.clear();
        assert_eq!(slots.index_of(1), None);
        assert_eq!(slots.iter().count(), 0);
        assert_eq!(slots.assign(3), Some(0));
    }
}
