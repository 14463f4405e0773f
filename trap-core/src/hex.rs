//! Fixed-width hexadecimal field rendering.
//!
//! Downlink payloads are strings of lowercase hex digits; every field
//! has a fixed register width on the device, so values are left-padded
//! with zeros and never truncated.

/// Render `value` as lowercase hex, zero-padded to at least `digits`
/// characters. A value wider than `digits` keeps its natural length.
pub fn hex(value: u64, digits: usize) -> String {
    format!("{value:0digits$x}")
}

/// Like [`hex`], but with the byte order reversed: the natural hex
/// representation is padded to an even length, split into 2-digit byte
/// groups, and the groups are emitted last-to-first before the final
/// zero-padding. This is the little-endian rendering of a big-endian
/// hex value.
pub fn hex_rev(value: u64, digits: usize) -> String {
    let mut natural = format!("{value:x}");
    if natural.len() % 2 != 0 {
        natural.insert(0, '0');
    }
    let chars: Vec<char> = natural.chars().collect();
    let mut reversed = String::with_capacity(chars.len().max(digits));
    for byte in chars.chunks(2).rev() {
        reversed.extend(byte);
    }
    if reversed.len() < digits {
        let mut padded = "0".repeat(digits - reversed.len());
        padded.push_str(&reversed);
        return padded;
    }
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_width() {
        assert_eq!(hex(255, 2), "ff");
        assert_eq!(hex(15, 4), "000f");
        assert_eq!(hex(0, 2), "00");
    }

    #[test]
    fn never_truncates() {
        assert_eq!(hex(0x1234, 2), "1234");
        assert_eq!(hex(0x0100_0e10, 8), "01000e10");
    }

    #[test]
    fn byte_reverse() {
        assert_eq!(hex_rev(0xabcd, 4), "cdab");
        // odd natural length picks up a leading zero before reversal
        assert_eq!(hex_rev(0xabc, 4), "bc0a");
        assert_eq!(hex_rev(0x12, 6), "000012");
    }
}
