//! Card configuration.
//!
//! Everything a board integrator chooses once, at attach time: reference
//! clock frequencies, which oscillators are fitted, serializer pin roles and
//! the DAI format. With the `serde` feature the whole struct can be loaded
//! from a file; missing fields take their defaults.
//!
//! ```
//! use dac_control::{CardConfig, ClockMode};
//!
//! let config = CardConfig::default()
//!     .with_serializers("IID-")
//!     .unwrap()
//!     .with_clock_mode(ClockMode::Slave);
//! config.validate().unwrap();
//! ```

use dac_platform::DaiFormat;

use crate::clock::{ClockMode, ClockNegotiator};
use crate::error::ConfigError;
use crate::serializer::{SerializerDescriptor, MAX_SERIALIZERS};

/// Default 44.1 kHz family reference (512 x 44.1 kHz).
pub const DEFAULT_CLK_44K1_HZ: u32 = 22_579_200;

/// Default 48 kHz family reference (512 x 48 kHz).
pub const DEFAULT_CLK_48K_HZ: u32 = 24_576_000;

/// Default BCLK/LRCLK ratio.
pub const DEFAULT_BCLK_RATIO: u32 = 64;

/// Default serializer descriptor: four multi-format transmit pins.
pub const DEFAULT_SERIALIZERS: &str = "MMMM";

/// Serializer descriptor storage.
pub type DescriptorString = heapless::String<MAX_SERIALIZERS>;

// ── Board wiring ─────────────────────────────────────────────────────────────

/// External master clock oscillators fitted on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ExternalClocks {
    /// 44.1 kHz family oscillator fitted.
    pub k44_1: bool,
    /// 48 kHz family oscillator fitted.
    pub k48: bool,
    /// Oscillator switch is active low.
    pub switch_inverted: bool,
    /// Only one oscillator is fitted and there is no on-board fallback.
    pub single: bool,
}

impl Default for ExternalClocks {
    fn default() -> Self {
        Self {
            k44_1: true,
            k48: true,
            switch_inverted: false,
            single: false,
        }
    }
}

/// Effective reference clocks after accounting for the fitted oscillators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedClocks {
    /// 44.1 kHz family reference, 0 if unavailable.
    pub clk_44k1_hz: u32,
    /// 48 kHz family reference, 0 if unavailable.
    pub clk_48k_hz: u32,
    /// The 48 kHz family runs from the on-board oscillator.
    pub internal_48k: bool,
}

impl ExternalClocks {
    /// Resolve the configured frequencies against the fitted oscillators.
    ///
    /// | fitted | 44.1k reference | 48k reference |
    /// |---|---|---|
    /// | both | external | external |
    /// | 44.1k, `single` | external | none |
    /// | 44.1k | external | on-board |
    /// | 48k | none | external |
    /// | neither | none | on-board |
    pub fn resolve(&self, clk_44k1_hz: u32, clk_48k_hz: u32) -> ResolvedClocks {
        match (self.k44_1, self.k48) {
            (true, true) => ResolvedClocks {
                clk_44k1_hz,
                clk_48k_hz,
                internal_48k: false,
            },
            (true, false) if self.single => ResolvedClocks {
                clk_44k1_hz,
                clk_48k_hz: 0,
                internal_48k: false,
            },
            (true, false) => ResolvedClocks {
                clk_44k1_hz,
                clk_48k_hz,
                internal_48k: true,
            },
            (false, true) => ResolvedClocks {
                clk_44k1_hz: 0,
                clk_48k_hz,
                internal_48k: false,
            },
            (false, false) => ResolvedClocks {
                clk_44k1_hz: 0,
                clk_48k_hz,
                internal_48k: true,
            },
        }
    }

    fn any_fitted(&self) -> bool {
        self.k44_1 || self.k48
    }
}

/// DSD/PCM data path switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct DsdSwitch {
    /// The switch is fitted and should be driven.
    pub enabled: bool,
    /// DSD is selected by driving the line low.
    pub inverted: bool,
}

impl Default for DsdSwitch {
    fn default() -> Self {
        Self {
            enabled: true,
            inverted: false,
        }
    }
}

// ── CardConfig ───────────────────────────────────────────────────────────────

/// Static configuration of one Botic card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct CardConfig {
    /// 44.1 kHz family reference frequency, 0 to disable.
    pub clk_44k1_hz: u32,
    /// 48 kHz family reference frequency, 0 to disable.
    pub clk_48k_hz: u32,
    /// Fixed BCLK/LRCLK ratio for PCM, 0 to derive it from the format.
    pub bclk_ratio: u32,
    /// Serializer pin roles, one character per pin.
    pub serializers: DescriptorString,
    /// Fitted external oscillators.
    pub external_clocks: ExternalClocks,
    /// DSD data path switch.
    pub dsd_switch: DsdSwitch,
    /// DAI format used when no SPDIF serializer is configured.
    pub dai_format: DaiFormat,
    /// Link clocking.
    pub clock_mode: ClockMode,
    /// On stream stop, point the DAC at its SPDIF input.
    pub spdif_fallback_on_idle: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        let mut serializers = DescriptorString::new();
        let _ = serializers.push_str(DEFAULT_SERIALIZERS);
        Self {
            clk_44k1_hz: DEFAULT_CLK_44K1_HZ,
            clk_48k_hz: DEFAULT_CLK_48K_HZ,
            bclk_ratio: DEFAULT_BCLK_RATIO,
            serializers,
            external_clocks: ExternalClocks::default(),
            dsd_switch: DsdSwitch::default(),
            dai_format: DaiFormat::default(),
            clock_mode: ClockMode::default(),
            spdif_fallback_on_idle: true,
        }
    }
}

impl CardConfig {
    /// Replace the serializer descriptor.
    pub fn with_serializers(mut self, descriptor: &str) -> Result<Self, ConfigError> {
        let mut serializers = DescriptorString::new();
        serializers
            .push_str(descriptor)
            .map_err(|_| ConfigError::TooManySerializers(descriptor.chars().count()))?;
        self.serializers = serializers;
        Ok(self)
    }

    /// Replace both reference frequencies.
    #[must_use]
    pub fn with_reference_clocks(mut self, clk_44k1_hz: u32, clk_48k_hz: u32) -> Self {
        self.clk_44k1_hz = clk_44k1_hz;
        self.clk_48k_hz = clk_48k_hz;
        self
    }

    /// Replace the BCLK/LRCLK ratio.
    #[must_use]
    pub fn with_bclk_ratio(mut self, ratio: u32) -> Self {
        self.bclk_ratio = ratio;
        self
    }

    /// Replace the fitted oscillator description.
    #[must_use]
    pub fn with_external_clocks(mut self, external_clocks: ExternalClocks) -> Self {
        self.external_clocks = external_clocks;
        self
    }

    /// Replace the DSD switch description.
    #[must_use]
    pub fn with_dsd_switch(mut self, dsd_switch: DsdSwitch) -> Self {
        self.dsd_switch = dsd_switch;
        self
    }

    /// Replace the DAI format.
    #[must_use]
    pub fn with_dai_format(mut self, dai_format: DaiFormat) -> Self {
        self.dai_format = dai_format;
        self
    }

    /// Replace the clock mode.
    #[must_use]
    pub fn with_clock_mode(mut self, clock_mode: ClockMode) -> Self {
        self.clock_mode = clock_mode;
        self
    }

    /// Enable or disable the idle SPDIF fallback.
    #[must_use]
    pub fn with_spdif_fallback_on_idle(mut self, enabled: bool) -> Self {
        self.spdif_fallback_on_idle = enabled;
        self
    }

    /// Parsed serializer descriptor.
    pub fn descriptor(&self) -> Result<SerializerDescriptor, ConfigError> {
        SerializerDescriptor::parse(&self.serializers)
    }

    /// Check the configuration without touching any hardware.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.descriptor()?.validate()?;
        if self.clock_mode == ClockMode::Master {
            let clocks = self.resolved_clocks();
            if clocks.clk_44k1_hz == 0 && clocks.clk_48k_hz == 0 {
                return Err(ConfigError::NoMasterClock);
            }
        }
        Ok(())
    }

    /// Reference clocks after oscillator resolution.
    pub fn resolved_clocks(&self) -> ResolvedClocks {
        self.external_clocks.resolve(self.clk_44k1_hz, self.clk_48k_hz)
    }

    /// Clock negotiator for this card.
    pub fn negotiator(&self) -> ClockNegotiator {
        let clocks = self.resolved_clocks();
        ClockNegotiator {
            clk_44k1_hz: clocks.clk_44k1_hz,
            clk_48k_hz: clocks.clk_48k_hz,
            internal_48k: clocks.internal_48k,
            mode: self.clock_mode,
            bclk_ratio: self.bclk_ratio,
            external: self.external_clocks,
            dsd_switch: self.dsd_switch,
        }
    }

    /// `true` if the board has an oscillator switch to drive.
    pub fn has_oscillator_switch(&self) -> bool {
        self.external_clocks.any_fitted()
    }
}
