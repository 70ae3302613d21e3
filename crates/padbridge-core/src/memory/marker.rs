//! Marker scan: locating the exchange window inside a mapped region.

use memchr::memmem;

use crate::protocol::layout::{EXTENDED_MEMORY_SIZE, GPIO_OFFSET, GPIO_SIZE, MARKER};

/// Byte offset of the first marker occurrence, if any.
pub fn find_marker(haystack: &[u8]) -> Option<usize> {
    memmem::find(haystack, &MARKER)
}

/// Given where the marker sits inside a mapped region, compute the
/// offsets of the cartridge RAM base and the GPIO window.
///
/// The remote client writes the marker at GPIO offset 0, which lives at
/// a fixed distance from the cartridge RAM base, so the whole layout
/// hangs off the marker position. Returns `None` when the implied
/// 64 KiB cartridge RAM would not fit inside the mapping — a stray
/// marker copy, not the real window.
pub fn exchange_offset(marker_offset: usize, mapping_len: usize) -> Option<ExchangeLayout> {
    let ram_offset = marker_offset.checked_sub(GPIO_OFFSET)?;
    if ram_offset + EXTENDED_MEMORY_SIZE > mapping_len {
        return None;
    }
    debug_assert!(marker_offset + GPIO_SIZE <= mapping_len);
    Some(ExchangeLayout {
        ram_offset,
        gpio_offset: marker_offset,
    })
}

/// Offsets of the two views a connection exposes, relative to the
/// mapped region's base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeLayout {
    /// Start of the 64 KiB cartridge RAM view.
    pub ram_offset: usize,
    /// Start of the 128-byte GPIO view.
    pub gpio_offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_marker_at_exact_offset() {
        let mut buf = vec![0u8; 0x40000];
        let offset = 0x2000 + GPIO_OFFSET;
        buf[offset..offset + MARKER.len()].copy_from_slice(&MARKER);
        assert_eq!(find_marker(&buf), Some(offset));
    }

    #[test]
    fn test_find_marker_absent() {
        let buf = vec![0u8; 0x10000];
        assert_eq!(find_marker(&buf), None);
    }

    #[test]
    fn test_exchange_offset_from_marker() {
        let layout = exchange_offset(0x2000 + GPIO_OFFSET, 0x40000).unwrap();
        assert_eq!(layout.ram_offset, 0x2000);
        assert_eq!(layout.gpio_offset, 0x2000 + GPIO_OFFSET);
    }

    #[test]
    fn test_exchange_offset_rejects_marker_too_close_to_start() {
        // A marker in the first 0x5f80 bytes cannot be the GPIO window.
        assert_eq!(exchange_offset(0x100, 0x40000), None);
    }

    #[test]
    fn test_exchange_offset_rejects_truncated_ram() {
        // Cartridge RAM would run off the end of the mapping.
        assert_eq!(exchange_offset(GPIO_OFFSET, EXTENDED_MEMORY_SIZE - 1), None);
        assert!(exchange_offset(GPIO_OFFSET, EXTENDED_MEMORY_SIZE).is_some());
    }
}
