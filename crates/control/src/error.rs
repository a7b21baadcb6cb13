//! Control-plane errors.
//!
//! Four classes, in order of severity as seen by a caller:
//!
//! - [`Error::UnsupportedOperation`]: meaningless in the current mode. The
//!   only class a caller may treat as a no-op ([`Error::is_absorbable`]).
//! - [`Error::Configuration`]: the request or the card configuration is
//!   invalid. Nothing was written.
//! - [`Error::Transport`]: a register transaction failed before anything of
//!   the current request reached the device.
//! - [`Error::PartialApply`]: a multi-register sequence was cut short. The
//!   registers already written are *not* rolled back.

use dac_platform::{OutOfRangeError, TransportError};

/// Invalid configuration or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serializer descriptor contains a character outside `IDMSR-`.
    InvalidSerializerRole(char),
    /// Serializer descriptor has more pins than the port supports.
    TooManySerializers(usize),
    /// An SPDIF pin shares the port with an I2S or DSD transmit pin.
    SpdifMixed,
    /// DSD format requested but no pin can carry DSD.
    NoDsdPins,
    /// Control value or parameter outside its range.
    OutOfRange {
        /// Rejected value.
        value: u32,
        /// Inclusive minimum.
        min: u32,
        /// Inclusive maximum.
        max: u32,
    },
    /// Neither enabled master clock is an integer multiple of the rate.
    UnsupportedRate(u32),
    /// Bit clock computed as zero.
    DivideByZero,
    /// Master clock slower than half the bit clock.
    ZeroDivisor {
        /// Master clock in Hz.
        sysclk_hz: u32,
        /// Bit clock in Hz.
        bclk_hz: u32,
    },
    /// Master mode configured with both reference clocks disabled.
    NoMasterClock,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSerializerRole(c) => write!(f, "invalid serializer role '{c}'"),
            Self::TooManySerializers(n) => write!(f, "{n} serializers exceed the port limit"),
            Self::SpdifMixed => write!(f, "SPDIF can't be mixed with other serializer roles"),
            Self::NoDsdPins => write!(f, "no pins for DSD playback"),
            Self::OutOfRange { value, min, max } => {
                write!(f, "value {value} out of range {min}..={max}")
            }
            Self::UnsupportedRate(rate) => write!(f, "unsupported sample rate {rate} Hz"),
            Self::DivideByZero => write!(f, "bit clock is zero"),
            Self::ZeroDivisor { sysclk_hz, bclk_hz } => {
                write!(f, "sysclk {sysclk_hz} Hz too slow for bclk {bclk_hz} Hz")
            }
            Self::NoMasterClock => write!(f, "master mode needs at least one reference clock"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl From<OutOfRangeError> for ConfigError {
    fn from(e: OutOfRangeError) -> Self {
        Self::OutOfRange {
            value: e.value,
            min: e.min,
            max: e.max,
        }
    }
}

/// Any control-plane failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid request or configuration. Nothing was written.
    Configuration(ConfigError),
    /// Register transaction failed.
    Transport(TransportError),
    /// Operation has no meaning in the current mode.
    UnsupportedOperation(&'static str),
    /// A multi-register write stopped part way.
    PartialApply {
        /// Registers written before the failure.
        applied: u8,
        /// Registers in the full sequence.
        total: u8,
        /// The failure that stopped the sequence.
        error: TransportError,
    },
}

impl Error {
    /// `true` for the errors a caller may ignore.
    pub fn is_absorbable(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::UnsupportedOperation(what) => write!(f, "unsupported operation: {what}"),
            Self::PartialApply {
                applied,
                total,
                error,
            } => write!(f, "partially applied ({applied}/{total} registers): {error}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Transport(e) | Self::PartialApply { error: e, .. } => Some(e),
            Self::UnsupportedOperation(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<OutOfRangeError> for Error {
    fn from(e: OutOfRangeError) -> Self {
        Self::Configuration(e.into())
    }
}
