//! Utility functions for bit manipulation and frame formatting.
//!
//! This module provides helpers for the bit-unit data layout of batch
//! commands, for extracting fields from status registers, and for
//! rendering frames in log output.
//!
//! # Example
//!
//! ```
//! use melsec_mc::utils::{extract_bits, get_bit, pack_bits, unpack_bits};
//!
//! // Binary bit units: two points per byte, first point in the high nibble
//! let packed = pack_bits(&[true, false, true]);
//! assert_eq!(packed, vec![0x10, 0x10]);
//! assert_eq!(unpack_bits(&packed, 3), vec![true, false, true]);
//!
//! let status: u16 = 0b0010_0010;
//! assert!(get_bit(status, 1));
//! assert_eq!(extract_bits(status, 4, 7), 0b0010);
//! ```

/// Tests bit `bit` (0 = LSB) of a register word.
///
/// ```
/// use melsec_mc::utils::get_bit;
///
/// // SD203 with bit 15 set: status not available
/// assert!(get_bit(0x8002, 15));
/// assert!(!get_bit(0x8002, 0));
/// ```
#[inline]
pub fn get_bit(value: u16, bit: u8) -> bool {
    (value >> bit) & 1 == 1
}

/// Returns bits `first..=last` of a register word, shifted down to bit 0.
///
/// Used for the nibble-wide fields of the CPU status register.
///
/// # Example
///
/// ```
/// use melsec_mc::utils::extract_bits;
///
/// // SD203 = 0x0012: state STOP (2), stopped by a remote contact (1)
/// assert_eq!(extract_bits(0x0012, 0, 3), 2);
/// assert_eq!(extract_bits(0x0012, 4, 7), 1);
/// ```
#[inline]
pub fn extract_bits(value: u16, first: u8, last: u8) -> u16 {
    let width = u32::from(last - first) + 1;
    let field = u32::from(value) >> first;
    (field & ((1u32 << width) - 1)) as u16
}

/// Packs bit points for a binary bit-unit batch write.
///
/// Each byte carries two points, the first in the high nibble. An odd
/// trailing point leaves the low nibble zero.
///
/// # Example
///
/// ```
/// use melsec_mc::utils::pack_bits;
///
/// assert_eq!(pack_bits(&[false, true, false, true, false]), vec![0x01, 0x01, 0x00]);
/// ```
pub fn pack_bits(points: &[bool]) -> Vec<u8> {
    points
        .chunks(2)
        .map(|pair| {
            let high = u8::from(pair[0]) << 4;
            let low = pair.get(1).map_or(0, |&b| u8::from(b));
            high | low
        })
        .collect()
}

/// Unpacks `count` bit points from binary bit-unit data.
///
/// Missing bytes read as OFF; callers check the length beforehand.
///
/// # Example
///
/// ```
/// use melsec_mc::utils::unpack_bits;
///
/// assert_eq!(unpack_bits(&[0x01, 0x10], 3), vec![false, true, true]);
/// ```
pub fn unpack_bits(data: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| {
            let byte = data.get(i / 2).copied().unwrap_or(0);
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            nibble != 0
        })
        .collect()
}

/// Formats a frame for log output.
///
/// Binary frames are rendered as uppercase hex; frames made only of
/// printable ASCII (ASCII mode) are shown as text.
///
/// # Example
///
/// ```
/// use melsec_mc::utils::format_frame;
///
/// assert_eq!(format_frame(&[0x50, 0x00, 0xFF]), "5000FF");
/// assert_eq!(format_frame(b"500000FF"), "\"500000FF\"");
/// ```
pub fn format_frame(frame: &[u8]) -> String {
    if !frame.is_empty() && frame.iter().all(|b| b.is_ascii_graphic()) {
        return format!("\"{}\"", String::from_utf8_lossy(frame));
    }
    hex::encode_upper(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bit() {
        assert!(get_bit(0x0001, 0));
        assert!(!get_bit(0x0001, 1));
        assert!(get_bit(0x8000, 15));
        assert!(!get_bit(0x7FFF, 15));
    }

    #[test]
    fn test_extract_bits() {
        assert_eq!(extract_bits(0x0043, 0, 3), 3);
        assert_eq!(extract_bits(0x0043, 4, 7), 4);
        assert_eq!(extract_bits(0xC000, 14, 15), 0b11);
        assert_eq!(extract_bits(0xBEEF, 0, 15), 0xBEEF);
    }

    #[test]
    fn test_pack_bits() {
        assert_eq!(pack_bits(&[]), Vec::<u8>::new());
        assert_eq!(pack_bits(&[true]), vec![0x10]);
        assert_eq!(pack_bits(&[true, true]), vec![0x11]);
        assert_eq!(pack_bits(&[false, true, false, true, false]), vec![0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_unpack_bits() {
        assert_eq!(
            unpack_bits(&[0x01, 0x01, 0x00], 5),
            vec![false, true, false, true, false]
        );
        assert_eq!(unpack_bits(&[0x10], 2), vec![true, false]);
    }

    #[test]
    fn test_pack_unpack() {
        let points = [true, false, false, true, true, true, false];
        assert_eq!(unpack_bits(&pack_bits(&points), points.len()), points.to_vec());
    }

    #[test]
    fn test_format_frame() {
        assert_eq!(format_frame(&[0xD0, 0x00, 0x0A]), "D0000A");
        assert_eq!(format_frame(b"D000"), "\"D000\"");
        assert_eq!(format_frame(&[]), "");
    }
}
