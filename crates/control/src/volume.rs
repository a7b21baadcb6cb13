//! Master volume curve for the Sabre32.
//!
//! The DAC takes a 31-bit linear coefficient in registers 20..=23
//! (0x7fffffff = full scale). The user-facing control is an
//! [`AttenuationIndex`] in steps of about 0.375 dB, 0..=199.
//!
//! # Encoding
//!
//! ```text
//! forward(i) = TABLE[i % 16] >> (i / 16)      for i < 199
//! forward(199) = 0
//! ```
//!
//! `TABLE` holds one octave (6 dB) in 16 steps of about 0.375 dB, plus the
//! next octave's first entry as a sentinel. Each further octave is one
//! right shift.
//!
//! The inverse normalises the coefficient back into the top octave (the
//! number of shifts needed is `30 - log2(m)`), then walks the table.
//!
//! ```
//! use dac_control::volume;
//! use dac_platform::AttenuationIndex;
//!
//! let m = volume::forward(AttenuationIndex::new(20));
//! assert_eq!(volume::inverse(m).get(), 20);
//! ```
//!
//! All 200 indices round-trip exactly: every table entry sits above
//! 0x40000000, so shifting right by at most 12 and back only clears low
//! bits that are far below the gap between neighbouring entries.

use dac_platform::AttenuationIndex;

use crate::bits;

/// Number of attenuation steps per octave.
pub const HALF_STEPS: u8 = 16;

/// Index that encodes a zero coefficient.
pub const MAX_ATTEN: u8 = AttenuationIndex::MAX;

/// Largest coefficient the DAC accepts (register 23 bit 7 is reserved).
pub const COEFFICIENT_MASK: u32 = 0x7fff_ffff;

/// One octave of the curve, 0 dB down to -6 dB in 16 equal steps.
const VOLUME_TABLE: [u32; 17] = [
    0x7fff_ffff,
    0x7a92_be89,
    0x7560_6373,
    0x7066_6f75,
    0x6ba2_7e64,
    0x6712_4609,
    0x62b3_9507,
    0x5e84_51ce,
    0x5a82_7999,
    0x56ac_1f74,
    0x52ff_6b54,
    0x4f7a_992f,
    0x4c1b_f828,
    0x48e1_e9b9,
    0x45ca_e0f1,
    0x42d5_61b3,
    0x3fff_ffff,
];

/// Most significant bit of a top-octave coefficient.
const TOP_OCTAVE_MSB: u32 = 30;

/// Coefficient for an attenuation index.
pub fn forward(index: AttenuationIndex) -> u32 {
    let i = index.get();
    if i >= MAX_ATTEN {
        return 0;
    }
    let step = usize::from(i % HALF_STEPS);
    let octave = u32::from(i / HALF_STEPS);
    VOLUME_TABLE
        .get(step)
        .copied()
        .and_then(|base| base.checked_shr(octave))
        .unwrap_or(0)
}

/// Attenuation index for a coefficient read back from the DAC.
///
/// Bit 31 is ignored. Anything quieter than index 198 maps to 199.
pub fn inverse(coefficient: u32) -> AttenuationIndex {
    let m = coefficient & COEFFICIENT_MASK;
    let Some(msb) = bits::highest_set_bit(m) else {
        return AttenuationIndex::SILENT;
    };

    // msb <= 30 because of the mask.
    let octave = TOP_OCTAVE_MSB.saturating_sub(msb);
    let normalised = m.checked_shl(octave).unwrap_or(0);

    let mut index = octave.saturating_mul(u32::from(HALF_STEPS));
    for &entry in VOLUME_TABLE.iter().take(usize::from(HALF_STEPS)).skip(1) {
        if normalised > entry {
            break;
        }
        index = index.saturating_add(1);
    }

    let clamped = index.min(u32::from(MAX_ATTEN));
    AttenuationIndex::new(u8::try_from(clamped).unwrap_or(MAX_ATTEN))
}

/// Split a coefficient into register bytes, least significant first.
pub fn coefficient_bytes(coefficient: u32) -> [u8; 4] {
    (coefficient & COEFFICIENT_MASK).to_le_bytes()
}

/// Reassemble a coefficient from register bytes, least significant first.
pub fn coefficient_from_bytes(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes) & COEFFICIENT_MASK
}
