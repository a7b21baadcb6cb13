//! Integer log2 and bit-counting helpers.
//!
//! Several register encodings are one-hot or thermometer coded, and the
//! volume inverse needs the octave of a coefficient. These helpers replace
//! shift-until-zero loops so each rule is a single tested function.

/// Index of the most significant set bit (`floor(log2(x))`), or `None` for 0.
pub const fn highest_set_bit(x: u32) -> Option<u32> {
    if x == 0 {
        None
    } else {
        Some(x.ilog2())
    }
}

/// Number of bits needed to represent `x` (0 for 0).
///
/// `bit_length(0b00111) == 3`.
pub const fn bit_length(x: u32) -> u32 {
    u32::BITS.wrapping_sub(x.leading_zeros())
}

/// Mask with the `n` low bits set, saturating at 8 bits.
pub const fn low_mask(n: u8) -> u8 {
    if n >= 8 {
        0xff
    } else {
        1u8.wrapping_shl(n as u32).wrapping_sub(1)
    }
}

/// Single bit `n` of a byte, or 0 if `n` is out of range.
pub const fn bit(n: u8) -> u8 {
    if n >= 8 {
        0
    } else {
        1u8.wrapping_shl(n as u32)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn highest_set_bit_of_zero_is_none() {
        assert_eq!(highest_set_bit(0), None);
    }

    #[test]
    fn highest_set_bit_matches_powers_of_two() {
        for n in 0..32 {
            assert_eq!(highest_set_bit(1 << n), Some(n));
        }
        assert_eq!(highest_set_bit(0x7fff_ffff), Some(30));
        assert_eq!(highest_set_bit(0x3fff_ffff), Some(29));
        assert_eq!(highest_set_bit(0b1010), Some(3));
    }

    #[test]
    fn bit_length_counts_significant_bits() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(0b1), 1);
        assert_eq!(bit_length(0b0_0011), 2);
        assert_eq!(bit_length(0b1_1111), 5);
        assert_eq!(bit_length(u32::MAX), 32);
    }

    #[test]
    fn low_mask_is_thermometer() {
        assert_eq!(low_mask(0), 0b0000_0000);
        assert_eq!(low_mask(1), 0b0000_0001);
        assert_eq!(low_mask(5), 0b0001_1111);
        assert_eq!(low_mask(8), 0xff);
        assert_eq!(low_mask(12), 0xff);
    }

    #[test]
    fn bit_is_one_hot() {
        assert_eq!(bit(0), 0x01);
        assert_eq!(bit(7), 0x80);
        assert_eq!(bit(8), 0);
    }

    #[test]
    fn bit_length_inverts_low_mask() {
        for n in 0..=8u8 {
            assert_eq!(bit_length(u32::from(low_mask(n))), u32::from(n));
        }
    }
}
