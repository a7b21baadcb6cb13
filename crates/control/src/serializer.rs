//! Serializer pin planning.
//!
//! The host's serial audio port has a handful of data pins, each configured
//! with a one-character role:
//!
//! | Char | Role |
//! |---|---|
//! | `I` | transmit, PCM (I2S family) only |
//! | `D` | transmit, DSD only |
//! | `M` | transmit, PCM or DSD |
//! | `S` | transmit, SPDIF |
//! | `R` | receive |
//! | `-` | unused |
//!
//! ```
//! use dac_control::{ProtocolFormat, SerializerDescriptor};
//! use dac_platform::SampleFormat;
//!
//! let desc: SerializerDescriptor = "MI-R".parse().unwrap();
//! let plan = desc.plan(SampleFormat::DsdU8).unwrap();
//! assert_eq!(plan.tx_slots.as_slice(), &[0]);
//! assert_eq!(plan.rx_slots.as_slice(), &[3]);
//! assert_eq!(plan.protocol, ProtocolFormat::StandardMultiFormat);
//! ```

use core::str::FromStr;

use dac_platform::{DaiFormat, SampleFormat};
use tracing::debug;

use crate::error::ConfigError;

/// Most data pins a serial port can have.
pub const MAX_SERIALIZERS: usize = 16;

/// Pin indices, in descriptor order.
pub type Slots = heapless::Vec<u8, MAX_SERIALIZERS>;

/// Role of one serializer pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    /// PCM transmit.
    I2s,
    /// DSD transmit.
    Dsd,
    /// PCM or DSD transmit.
    Multi,
    /// SPDIF transmit.
    Spdif,
    /// Receive.
    Receive,
    /// Unused.
    Off,
}

impl PinRole {
    /// Parse one descriptor character.
    pub fn from_char(c: char) -> Result<Self, ConfigError> {
        match c {
            'I' => Ok(Self::I2s),
            'D' => Ok(Self::Dsd),
            'M' => Ok(Self::Multi),
            'S' => Ok(Self::Spdif),
            'R' => Ok(Self::Receive),
            '-' => Ok(Self::Off),
            other => Err(ConfigError::InvalidSerializerRole(other)),
        }
    }

    /// Descriptor character.
    pub fn as_char(self) -> char {
        match self {
            Self::I2s => 'I',
            Self::Dsd => 'D',
            Self::Multi => 'M',
            Self::Spdif => 'S',
            Self::Receive => 'R',
            Self::Off => '-',
        }
    }

    /// `true` if the pin transmits for a stream of `format`.
    pub fn transmits(self, format: SampleFormat) -> bool {
        match self {
            Self::I2s => !format.is_dsd(),
            Self::Dsd => format.is_dsd(),
            Self::Multi | Self::Spdif => true,
            Self::Receive | Self::Off => false,
        }
    }

    fn carries_i2s_or_dsd(self) -> bool {
        matches!(self, Self::I2s | Self::Dsd | Self::Multi)
    }
}

/// Wire protocol of the transmit pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolFormat {
    /// I2S, left/right justified or DSD.
    StandardMultiFormat,
    /// SPDIF (DIT).
    DedicatedSpdifTransmit,
}

/// Parsed serializer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializerDescriptor {
    pins: heapless::Vec<PinRole, MAX_SERIALIZERS>,
}

impl SerializerDescriptor {
    /// Parse a descriptor such as `"MMMM"` or `"IID-"`.
    pub fn parse(descriptor: &str) -> Result<Self, ConfigError> {
        let mut pins = heapless::Vec::new();
        for c in descriptor.chars() {
            let role = PinRole::from_char(c)?;
            pins.push(role)
                .map_err(|_| ConfigError::TooManySerializers(descriptor.chars().count()))?;
        }
        Ok(Self { pins })
    }

    /// Pin roles in descriptor order.
    pub fn pins(&self) -> &[PinRole] {
        &self.pins
    }

    /// `true` if any pin transmits SPDIF.
    pub fn has_spdif(&self) -> bool {
        self.pins.contains(&PinRole::Spdif)
    }

    /// Reject descriptors that mix SPDIF with I2S/DSD pins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.has_spdif() && self.pins.iter().any(|p| p.carries_i2s_or_dsd()) {
            return Err(ConfigError::SpdifMixed);
        }
        Ok(())
    }

    /// Transmit and receive slots for a stream of `format`.
    pub fn plan(&self, format: SampleFormat) -> Result<SerializerPlan, ConfigError> {
        self.validate()?;

        let mut plan = SerializerPlan {
            tx_slots: Slots::new(),
            rx_slots: Slots::new(),
            protocol: if self.has_spdif() {
                ProtocolFormat::DedicatedSpdifTransmit
            } else {
                ProtocolFormat::StandardMultiFormat
            },
        };
        let mut dsd_pins = 0usize;

        // At most MAX_SERIALIZERS pins, so every index fits both a u8 and the
        // slot vectors.
        for (index, &role) in (0u8..).zip(self.pins.iter()) {
            if role == PinRole::Receive {
                let _ = plan.rx_slots.push(index);
            } else if role.transmits(format) {
                if format.is_dsd() && role != PinRole::Spdif {
                    dsd_pins = dsd_pins.saturating_add(1);
                }
                let _ = plan.tx_slots.push(index);
            }
        }

        if format.is_dsd() && dsd_pins == 0 {
            return Err(ConfigError::NoDsdPins);
        }

        debug!(
            tx = plan.tx_slots.len(),
            rx = plan.rx_slots.len(),
            protocol = ?plan.protocol,
            "serializers planned"
        );
        Ok(plan)
    }
}

impl FromStr for SerializerDescriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for SerializerDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for pin in &self.pins {
            write!(f, "{}", pin.as_char())?;
        }
        Ok(())
    }
}

/// Channel map for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerPlan {
    /// Transmit pins, in descriptor order.
    pub tx_slots: Slots,
    /// Receive pins, in descriptor order.
    pub rx_slots: Slots,
    /// Wire protocol.
    pub protocol: ProtocolFormat,
}

impl SerializerPlan {
    /// DAI format to program: SPDIF serializers force DIT, otherwise the
    /// configured format stands.
    pub fn dai_format(&self, configured: DaiFormat) -> DaiFormat {
        match self.protocol {
            ProtocolFormat::DedicatedSpdifTransmit => DaiFormat::Dit,
            ProtocolFormat::StandardMultiFormat => configured,
        }
    }
}
