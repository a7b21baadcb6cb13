//! Clock-line collaborator.
//!
//! The Botic card routes three board signals around the DAC's master clock:
//!
//! | Line | Meaning when high |
//! |---|---|
//! | internal masterclk enable | on-board oscillator drives MCLK |
//! | external masterclk switch | 48k-family oscillator selected (unless inverted) |
//! | DSD format switch | DSD data path selected (unless inverted) |
//!
//! The control plane only *computes* the levels ([`ClockLineLevels`]); the
//! caller decides when to drive them, usually right after format negotiation
//! and after any board-specific settle delay.

use embedded_hal::digital::OutputPin;

/// One of the card's clock-routing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockLine {
    /// Enables the on-board oscillator.
    InternalMasterclkEnable,
    /// Selects between the external 44.1k and 48k oscillators.
    ExternalMasterclkSwitch,
    /// Selects the DSD data path.
    DsdFormatSwitch,
}

/// Something that can drive the card's clock lines.
pub trait ClockLines {
    /// Error type
    type Error;

    /// Drive `line` to the given level.
    fn set_level(&mut self, line: ClockLine, high: bool) -> Result<(), Self::Error>;
}

impl<L: ClockLines + ?Sized> ClockLines for &mut L {
    type Error = L::Error;

    fn set_level(&mut self, line: ClockLine, high: bool) -> Result<(), Self::Error> {
        (**self).set_level(line, high)
    }
}

/// Requested level for every clock line. `None` leaves a line untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockLineLevels {
    /// Internal oscillator enable.
    pub internal_masterclk_enable: Option<bool>,
    /// External oscillator family switch.
    pub external_masterclk_switch: Option<bool>,
    /// DSD data path switch.
    pub dsd_format_switch: Option<bool>,
}

impl ClockLineLevels {
    /// Leave every line as it is.
    pub const UNCHANGED: Self = Self {
        internal_masterclk_enable: None,
        external_masterclk_switch: None,
        dsd_format_switch: None,
    };

    /// Requested level for `line`.
    pub fn level(&self, line: ClockLine) -> Option<bool> {
        match line {
            ClockLine::InternalMasterclkEnable => self.internal_masterclk_enable,
            ClockLine::ExternalMasterclkSwitch => self.external_masterclk_switch,
            ClockLine::DsdFormatSwitch => self.dsd_format_switch,
        }
    }

    /// Lines with a requested level, in the order they should be driven.
    ///
    /// The data path switch goes first so the DAC never sees DSD bits on a
    /// PCM-clocked port for longer than the oscillator swap takes.
    pub fn iter(&self) -> impl Iterator<Item = (ClockLine, bool)> + '_ {
        [
            ClockLine::DsdFormatSwitch,
            ClockLine::InternalMasterclkEnable,
            ClockLine::ExternalMasterclkSwitch,
        ]
        .into_iter()
        .filter_map(move |line| self.level(line).map(|high| (line, high)))
    }

    /// Drive every requested line through `lines`. Stops at the first error.
    pub fn apply<L: ClockLines + ?Sized>(&self, lines: &mut L) -> Result<(), L::Error> {
        for (line, high) in self.iter() {
            tracing::debug!(?line, high, "clock line");
            lines.set_level(line, high)?;
        }
        Ok(())
    }
}

/// [`ClockLines`] over embedded-hal output pins.
///
/// Boards that lack a line simply leave the pin out; requests for it are
/// ignored.
pub struct GpioClockLines<P> {
    internal_enable: Option<P>,
    external_switch: Option<P>,
    dsd_switch: Option<P>,
}

impl<P: OutputPin> GpioClockLines<P> {
    /// No lines wired.
    pub fn new() -> Self {
        Self {
            internal_enable: None,
            external_switch: None,
            dsd_switch: None,
        }
    }

    /// Attach the internal oscillator enable pin.
    #[must_use]
    pub fn with_internal_enable(mut self, pin: P) -> Self {
        self.internal_enable = Some(pin);
        self
    }

    /// Attach the external oscillator switch pin.
    #[must_use]
    pub fn with_external_switch(mut self, pin: P) -> Self {
        self.external_switch = Some(pin);
        self
    }

    /// Attach the DSD format switch pin.
    #[must_use]
    pub fn with_dsd_switch(mut self, pin: P) -> Self {
        self.dsd_switch = Some(pin);
        self
    }

    /// Give the pins back.
    pub fn release(self) -> (Option<P>, Option<P>, Option<P>) {
        (self.internal_enable, self.external_switch, self.dsd_switch)
    }
}

impl<P: OutputPin> Default for GpioClockLines<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> ClockLines for GpioClockLines<P> {
    type Error = P::Error;

    fn set_level(&mut self, line: ClockLine, high: bool) -> Result<(), Self::Error> {
        let pin = match line {
            ClockLine::InternalMasterclkEnable => self.internal_enable.as_mut(),
            ClockLine::ExternalMasterclkSwitch => self.external_switch.as_mut(),
            ClockLine::DsdFormatSwitch => self.dsd_switch.as_mut(),
        };
        match pin {
            Some(pin) if high => pin.set_high(),
            Some(pin) => pin.set_low(),
            None => Ok(()),
        }
    }
}
