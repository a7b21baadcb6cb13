//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions keep unchecked integers away from the
//! register encoders:
//! - `AttenuationIndex`: 0–199 steps of about 0.375 dB, 199 = silence
//! - `SampleRateHz`: validates 8000–768000 Hz range
//! - `SampleFormat`: PCM and DSD sample layouts the serial port accepts
//! - `DaiFormat` / `WordWidth`: serial-port framing as programmed into reg 10

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "value {} out of range {}..={}",
            self.value, self.min, self.max
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRangeError {}

// ── AttenuationIndex ─────────────────────────────────────────────────────────

/// Master attenuation in steps of about 0.375 dB (16 per 6 dB octave).
///
/// Wraps a `u8` with the invariant `0 <= value <= 199`. Index 0 is full scale,
/// index 199 is the muted floor. Construct with [`AttenuationIndex::new`]
/// (clamping) or [`AttenuationIndex::try_new`] (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct AttenuationIndex(u8);

impl AttenuationIndex {
    /// Largest index; encodes a zero volume coefficient.
    pub const MAX: u8 = 199;

    /// Full scale (no attenuation).
    pub const FULL_SCALE: Self = Self(0);

    /// Silence.
    pub const SILENT: Self = Self(Self::MAX);

    /// Create an `AttenuationIndex`, clamping values above 199 to 199.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Create an `AttenuationIndex`, returning an error if `value > 199`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value > 199`.
    pub fn try_new(value: u32) -> Result<Self, OutOfRangeError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(OutOfRangeError {
                value,
                min: 0,
                max: u32::from(Self::MAX),
            }),
        }
    }

    /// Return the inner index (0–199).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// `true` for the silent floor.
    #[must_use]
    pub fn is_silent(self) -> bool {
        self.0 == Self::MAX
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range the serial port supports.
///
/// Valid range: 8000–768000 Hz. DSD streams are described by their frame
/// rate (e.g. 88200 for DSD64 in U32 containers), which falls in the same
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz.
    pub const MAX_HZ: u32 = 768_000;

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

// ── SampleFormat ─────────────────────────────────────────────────────────────

/// Sample layout on the serial data lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_camel_case_types)]
pub enum SampleFormat {
    /// Signed 16-bit, little endian.
    S16Le,
    /// Signed 16-bit, big endian.
    S16Be,
    /// Signed 24-bit packed in 3 bytes, little endian.
    S24_3Le,
    /// Signed 24-bit packed in 3 bytes, big endian.
    S24_3Be,
    /// Signed 24-bit in a 32-bit container, little endian.
    S24Le,
    /// Signed 24-bit in a 32-bit container, big endian.
    S24Be,
    /// Signed 32-bit, little endian.
    S32Le,
    /// Signed 32-bit, big endian.
    S32Be,
    /// DSD, 8 one-bit samples per byte.
    DsdU8,
    /// DSD, 16 one-bit samples per word, little endian.
    DsdU16Le,
    /// DSD, 16 one-bit samples per word, big endian.
    DsdU16Be,
    /// DSD, 32 one-bit samples per word, little endian.
    DsdU32Le,
    /// DSD, 32 one-bit samples per word, big endian.
    DsdU32Be,
}

impl SampleFormat {
    /// `true` for the DSD variants.
    #[must_use]
    pub fn is_dsd(self) -> bool {
        self.dsd_bits().is_some()
    }

    /// Bits per DSD container, or `None` for PCM.
    #[must_use]
    pub fn dsd_bits(self) -> Option<u32> {
        match self {
            Self::DsdU8 => Some(8),
            Self::DsdU16Le | Self::DsdU16Be => Some(16),
            Self::DsdU32Le | Self::DsdU32Be => Some(32),
            _ => None,
        }
    }

    /// Bits of audio information per sample (container width for DSD).
    #[must_use]
    pub fn significant_bits(self) -> u32 {
        match self {
            Self::S16Le | Self::S16Be => 16,
            Self::S24_3Le | Self::S24_3Be | Self::S24Le | Self::S24Be => 24,
            Self::S32Le | Self::S32Be => 32,
            Self::DsdU8 => 8,
            Self::DsdU16Le | Self::DsdU16Be => 16,
            Self::DsdU32Le | Self::DsdU32Be => 32,
        }
    }

    /// Input word width the DAC must be told about.
    ///
    /// All DSD layouts run the port at 32 bits.
    #[must_use]
    pub fn word_width(self) -> WordWidth {
        match self {
            Self::S16Le | Self::S16Be => WordWidth::Bits16,
            Self::S24_3Le | Self::S24_3Be | Self::S24Le | Self::S24Be => WordWidth::Bits24,
            _ => WordWidth::Bits32,
        }
    }
}

// ── WordWidth ────────────────────────────────────────────────────────────────

/// Serial input word width, as encoded in reg 10 bits 6–7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WordWidth {
    /// 24-bit words.
    Bits24 = 0b00,
    /// 16-bit words.
    Bits16 = 0b10,
    /// 32-bit words (also used for DSD).
    Bits32 = 0b11,
}

impl WordWidth {
    /// Field value for reg 10 bits 6–7.
    #[must_use]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

// ── DaiFormat ────────────────────────────────────────────────────────────────

/// Serial-port framing negotiated with the host controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DaiFormat {
    /// Philips I2S.
    #[default]
    I2s,
    /// Left justified.
    LeftJustified,
    /// Right justified.
    RightJustified,
    /// SPDIF transmitted by the host (digital interface transmitter).
    Dit,
}

impl DaiFormat {
    /// Field value for reg 10 bits 4–5.
    ///
    /// DIT shares the I2S encoding; the SPDIF path is selected separately.
    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Self::I2s | Self::Dit => 0b00,
            Self::LeftJustified => 0b01,
            Self::RightJustified => 0b10,
        }
    }

    /// `true` when the DAC should take its input from SPDIF.
    #[must_use]
    pub fn is_spdif(self) -> bool {
        matches!(self, Self::Dit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_new_clamps() {
        assert_eq!(AttenuationIndex::new(250).get(), 199);
        assert!(AttenuationIndex::new(250).is_silent());
    }

    #[test]
    fn attenuation_try_new_rejects_200() {
        let err = AttenuationIndex::try_new(200).unwrap_err();
        assert_eq!(err.value, 200);
        assert_eq!(err.max, 199);
    }

    #[test]
    fn attenuation_try_new_rejects_values_above_u8() {
        assert!(AttenuationIndex::try_new(256 + 5).is_err());
    }

    #[test]
    fn dsd_formats_report_container_bits() {
        assert_eq!(SampleFormat::DsdU8.dsd_bits(), Some(8));
        assert_eq!(SampleFormat::DsdU16Be.dsd_bits(), Some(16));
        assert_eq!(SampleFormat::DsdU32Le.dsd_bits(), Some(32));
        assert_eq!(SampleFormat::S32Le.dsd_bits(), None);
    }

    #[test]
    fn word_width_follows_format() {
        assert_eq!(SampleFormat::S16Le.word_width(), WordWidth::Bits16);
        assert_eq!(SampleFormat::S24_3Le.word_width(), WordWidth::Bits24);
        assert_eq!(SampleFormat::S24Le.word_width(), WordWidth::Bits24);
        assert_eq!(SampleFormat::S32Be.word_width(), WordWidth::Bits32);
        assert_eq!(SampleFormat::DsdU8.word_width(), WordWidth::Bits32);
    }

    #[test]
    fn word_width_encodings() {
        assert_eq!(WordWidth::Bits24.bits(), 0b00);
        assert_eq!(WordWidth::Bits16.bits(), 0b10);
        assert_eq!(WordWidth::Bits32.bits(), 0b11);
    }

    #[test]
    fn dai_format_encodings() {
        assert_eq!(DaiFormat::I2s.bits(), 0b00);
        assert_eq!(DaiFormat::Dit.bits(), 0b00);
        assert_eq!(DaiFormat::LeftJustified.bits(), 0b01);
        assert_eq!(DaiFormat::RightJustified.bits(), 0b10);
        assert!(DaiFormat::Dit.is_spdif());
        assert!(!DaiFormat::I2s.is_spdif());
    }

    #[test]
    fn out_of_range_display() {
        let err = SampleRateHz::new(1).unwrap_err();
        assert_eq!(err.to_string(), "value 1 out of range 8000..=768000");
    }
}
