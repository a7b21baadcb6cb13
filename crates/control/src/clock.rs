//! Master clock selection and bit clock arithmetic.
//!
//! Negotiation is pure: [`ClockNegotiator::negotiate`] turns stream
//! parameters into a [`ClockPlan`] without touching any hardware. The plan
//! carries the clock-line levels the board needs ([`ClockPlan::lines`]); the
//! caller decides when to drive them.

use dac_platform::{ClockLineLevels, SampleFormat, SampleRateHz};
use tracing::debug;

use crate::config::{DsdSwitch, ExternalClocks};
use crate::error::ConfigError;

/// 48 kHz family reference used to classify rates in slave mode.
const SLAVE_CLASS_REFERENCE_HZ: u32 = 24_576_000;

// ── Types ────────────────────────────────────────────────────────────────────

/// Who drives the bit and frame clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockMode {
    /// The host generates BCLK/LRCLK from a master clock.
    #[default]
    Master,
    /// An external device clocks the link.
    Slave,
}

/// Where the master clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// External 22.5792 MHz oscillator.
    External44k1,
    /// External 24.576 MHz oscillator.
    External48k,
    /// On-board oscillator standing in for the 48 kHz family.
    Internal,
    /// Slave mode; the master clock is not ours to choose.
    SlaveUndefined,
}

/// Sample rate family. A change of family requires a DPLL relock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockClass {
    /// 44.1, 88.2, 176.4 kHz ...
    Family44k1,
    /// 32, 48, 96, 192 kHz ...
    Family48k,
}

/// Stream parameters requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    /// Frame rate.
    pub rate: SampleRateHz,
    /// Sample format.
    pub format: SampleFormat,
    /// Channel count.
    pub channels: u8,
}

impl HwParams {
    /// Stereo stream.
    pub fn new(rate: SampleRateHz, format: SampleFormat) -> Self {
        Self {
            rate,
            format,
            channels: 2,
        }
    }

    /// Override the channel count.
    #[must_use]
    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }
}

/// Outcome of a clock negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Frame rate.
    pub sample_rate_hz: u32,
    /// Master clock, 0 in slave mode.
    pub sysclk_hz: u32,
    /// Master clock source.
    pub source: ClockSource,
    /// Bit clock.
    pub bclk_hz: u32,
    /// `sysclk / bclk`, rounded to nearest. 0 in slave mode.
    pub divisor: u32,
    /// Rate family, for the DPLL relock decision.
    pub class: ClockClass,
    /// Board clock-line levels for this stream.
    pub lines: ClockLineLevels,
}

// ── Arithmetic ───────────────────────────────────────────────────────────────

/// Bit clock for `params`.
///
/// DSD streams clock one word of the container width per frame; PCM uses the
/// fixed BCLK/LRCLK `ratio` when it is nonzero, otherwise the sample width
/// times the channel count.
pub fn bclk_hz(params: &HwParams, ratio: u32) -> Result<u32, ConfigError> {
    let rate = params.rate.get();
    let per_frame = match params.format.dsd_bits() {
        Some(bits) => bits,
        None if ratio != 0 => ratio,
        None => params
            .format
            .significant_bits()
            .saturating_mul(u32::from(params.channels)),
    };
    per_frame
        .checked_mul(rate)
        .ok_or(ConfigError::UnsupportedRate(rate))
}

/// Clock divisor `round(sysclk / bclk)`.
///
/// ```
/// use dac_control::clock::divisor;
///
/// assert_eq!(divisor(22_579_200, 2_822_400), Ok(8));
/// ```
pub fn divisor(sysclk_hz: u32, bclk_hz: u32) -> Result<u32, ConfigError> {
    let bclk = u64::from(bclk_hz);
    let rounded = u64::from(sysclk_hz).saturating_add(bclk / 2);
    let div = rounded.checked_div(bclk).ok_or(ConfigError::DivideByZero)?;
    if div == 0 && sysclk_hz != 0 {
        return Err(ConfigError::ZeroDivisor { sysclk_hz, bclk_hz });
    }
    Ok(u32::try_from(div).unwrap_or(u32::MAX))
}

/// Rate family of a slave-mode stream, judged by whether the rate divides
/// the 48 kHz reference.
pub fn slave_class(rate_hz: u32) -> ClockClass {
    match SLAVE_CLASS_REFERENCE_HZ.checked_rem(rate_hz) {
        Some(0) => ClockClass::Family48k,
        _ => ClockClass::Family44k1,
    }
}

fn divides(clock_hz: u32, rate_hz: u32) -> bool {
    clock_hz != 0 && clock_hz.checked_rem(rate_hz) == Some(0)
}

// ── Negotiator ───────────────────────────────────────────────────────────────

/// Resolved clock configuration of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockNegotiator {
    /// 44.1 kHz family reference, 0 if unavailable.
    pub clk_44k1_hz: u32,
    /// 48 kHz family reference, 0 if unavailable.
    pub clk_48k_hz: u32,
    /// The 48 kHz family runs from the on-board oscillator.
    pub internal_48k: bool,
    /// Link clocking.
    pub mode: ClockMode,
    /// Fixed BCLK/LRCLK ratio for PCM, 0 for "derive from the format".
    pub bclk_ratio: u32,
    /// Board oscillator wiring.
    pub external: ExternalClocks,
    /// DSD/PCM output switch wiring.
    pub dsd_switch: DsdSwitch,
}

impl ClockNegotiator {
    /// Choose a master clock and compute the bit clock for `params`.
    pub fn negotiate(&self, params: &HwParams) -> Result<ClockPlan, ConfigError> {
        let rate = params.rate.get();
        // The bit clock only feeds the divisor in master mode, so slave
        // negotiation reports an overflowing one as 0 instead of failing.
        let bclk = match self.mode {
            ClockMode::Master => bclk_hz(params, self.bclk_ratio)?,
            ClockMode::Slave => bclk_hz(params, self.bclk_ratio).unwrap_or(0),
        };

        let (source, sysclk, class) = match self.mode {
            ClockMode::Slave => (ClockSource::SlaveUndefined, 0, slave_class(rate)),
            ClockMode::Master => {
                if divides(self.clk_44k1_hz, rate) {
                    (ClockSource::External44k1, self.clk_44k1_hz, ClockClass::Family44k1)
                } else if divides(self.clk_48k_hz, rate) {
                    let source = if self.internal_48k {
                        ClockSource::Internal
                    } else {
                        ClockSource::External48k
                    };
                    (source, self.clk_48k_hz, ClockClass::Family48k)
                } else {
                    debug!(rate, "no master clock divides the rate");
                    return Err(ConfigError::UnsupportedRate(rate));
                }
            }
        };

        let div = match self.mode {
            ClockMode::Slave => 0,
            ClockMode::Master => divisor(sysclk, bclk)?,
        };

        let plan = ClockPlan {
            sample_rate_hz: rate,
            sysclk_hz: sysclk,
            source,
            bclk_hz: bclk,
            divisor: div,
            class,
            lines: self.clock_line_levels(source, params.format),
        };
        debug!(source = ?plan.source, sysclk, bclk, divisor = div, "clock negotiated");
        Ok(plan)
    }

    /// Clock-line levels for a stream clocked from `source` in `format`.
    ///
    /// The 44.1k family drives the oscillator switch low and the on-board
    /// oscillator off; the 48k family drives the switch high and, when no
    /// external 48k oscillator is fitted, enables the on-board one. Both
    /// switch levels flip when the switch is wired inverted. Slave mode
    /// leaves the oscillator lines alone.
    pub fn clock_line_levels(&self, source: ClockSource, format: SampleFormat) -> ClockLineLevels {
        let mut levels = ClockLineLevels::UNCHANGED;
        let switch_fitted = self.external.k44_1 || self.external.k48;
        let inverted = self.external.switch_inverted;

        match source {
            ClockSource::External44k1 => {
                levels.internal_masterclk_enable = Some(false);
                if switch_fitted {
                    levels.external_masterclk_switch = Some(inverted);
                }
            }
            ClockSource::External48k | ClockSource::Internal => {
                if switch_fitted {
                    levels.external_masterclk_switch = Some(!inverted);
                }
                if !self.external.k48 {
                    levels.internal_masterclk_enable = Some(true);
                }
            }
            ClockSource::SlaveUndefined => {}
        }

        if self.dsd_switch.enabled {
            levels.dsd_format_switch = Some(format.is_dsd() != self.dsd_switch.inverted);
        }
        levels
    }
}
