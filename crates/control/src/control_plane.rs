//! The facade a card driver talks to.
//!
//! [`ControlPlane`] owns the register port, the card configuration and the
//! mute sequencer for one DAC. Every mutating call takes `&mut self`, so
//! calls into one device are serialized by the borrow checker.

use dac_platform::sabre32::MUTE;
use dac_platform::{ClockLineLevels, ClockLines, DaiFormat, RegisterPort, WordWidth};
use tracing::{info, warn};

use crate::clock::{ClockMode, ClockNegotiator, ClockPlan, HwParams};
use crate::config::CardConfig;
use crate::error::Error;
use crate::registry::{self, ControlId};
use crate::sequencer::{DeviceState, MuteMode, MuteSequencer, SequencerEvent};
use crate::serializer::{SerializerDescriptor, SerializerPlan};

/// Everything decided for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedFormat {
    /// Master and bit clock.
    pub clock: ClockPlan,
    /// Serializer channel map.
    pub serializer: SerializerPlan,
    /// DAI format programmed into the DAC.
    pub dai_format: DaiFormat,
    /// Word width programmed into the DAC.
    pub word_width: WordWidth,
}

impl NegotiatedFormat {
    /// Clock-line levels the board needs for this stream.
    pub fn clock_lines(&self) -> ClockLineLevels {
        self.clock.lines
    }

    /// Drive the board's clock lines for this stream.
    pub fn apply_clock_lines<L: ClockLines + ?Sized>(&self, lines: &mut L) -> Result<(), L::Error> {
        self.clock.lines.apply(lines)
    }
}

/// Control plane of one attached DAC.
pub struct ControlPlane<P> {
    port: P,
    config: CardConfig,
    descriptor: SerializerDescriptor,
    negotiator: ClockNegotiator,
    sequencer: MuteSequencer,
    dai_format: DaiFormat,
    sysclk_hz: u32,
}

impl<P: RegisterPort> ControlPlane<P> {
    /// Validate `config` and take over the DAC behind `port`.
    ///
    /// The DAC is muted before anything else; a transport fault at that
    /// point fails the attach.
    pub fn attach(mut port: P, config: CardConfig) -> Result<Self, Error> {
        config.validate()?;
        let descriptor = config.descriptor()?;

        MUTE.set(&mut port, true)?;

        let clocks = config.resolved_clocks();
        info!(
            clk_44k1 = clocks.clk_44k1_hz,
            clk_48k = clocks.clk_48k_hz,
            internal_48k = clocks.internal_48k,
            serializers = config.serializers.as_str(),
            mode = ?config.clock_mode,
            "DAC attached"
        );

        Ok(Self {
            port,
            descriptor,
            negotiator: config.negotiator(),
            sequencer: MuteSequencer::new(config.spdif_fallback_on_idle),
            dai_format: config.dai_format,
            sysclk_hz: 0,
            config,
        })
    }

    /// Detach and hand the port back. Device state is discarded.
    pub fn release(self) -> P {
        info!("DAC detached");
        self.port
    }

    /// Current device state.
    pub fn state(&self) -> &DeviceState {
        self.sequencer.state()
    }

    /// Configuration the plane was attached with.
    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// The register port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The register port, mutably. Writes made through it bypass the
    /// sequencer's bookkeeping.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Master clock last set with [`Self::set_sysclk`].
    pub fn sysclk_hz(&self) -> u32 {
        self.sysclk_hz
    }

    /// DAI format used when no SPDIF serializer is configured.
    pub fn dai_format(&self) -> DaiFormat {
        self.dai_format
    }

    // ── Controls ─────────────────────────────────────────────────────────────

    /// Current value of a control.
    ///
    /// Never fails: a transport fault reads as 0 and is logged.
    pub fn read_control(&mut self, id: ControlId) -> u32 {
        match id {
            ControlId::MasterMute => u32::from(self.state().force_mute),
            ControlId::MuteMode => self.state().mute_mode.value(),
            _ => match registry::read(&mut self.port, id) {
                Ok(value) => value,
                Err(e) => {
                    warn!(?id, error = ?e, "control read failed, reporting 0");
                    0
                }
            },
        }
    }

    /// Set a control.
    pub fn write_control(&mut self, id: ControlId, value: u32) -> Result<(), Error> {
        id.control().check(value)?;
        match id {
            ControlId::MasterMute => self.set_user_mute(value != 0),
            ControlId::MuteMode => match MuteMode::from_value(value) {
                Some(mode) => self.set_mute_mode(mode),
                None => Ok(()),
            },
            _ => registry::write(&mut self.port, id, value),
        }
    }

    // ── Stream lifecycle ─────────────────────────────────────────────────────

    /// Plan and program a new stream format.
    ///
    /// Clock and serializer planning run first and touch nothing; only once
    /// both succeed is the DAC reconfigured. Board clock lines are returned
    /// in the result for the caller to drive.
    pub fn negotiate(&mut self, params: HwParams) -> Result<NegotiatedFormat, Error> {
        let clock = self.negotiator.negotiate(&params)?;
        let serializer = self.descriptor.plan(params.format)?;
        let dai_format = serializer.dai_format(self.dai_format);
        let word_width = params.format.word_width();

        self.sequencer
            .reconfigure(&mut self.port, clock.class, dai_format, word_width)?;

        match self.set_sysclk(clock.sysclk_hz) {
            Err(e) if e.is_absorbable() => warn!(error = ?e, "sysclk not applied"),
            other => other?,
        }

        Ok(NegotiatedFormat {
            clock,
            serializer,
            dai_format,
            word_width,
        })
    }

    /// Playback started.
    pub fn stream_start(&mut self) -> Result<(), Error> {
        self.sequencer.handle(&mut self.port, SequencerEvent::StreamStart)
    }

    /// Playback stopped.
    pub fn stream_stop(&mut self) -> Result<(), Error> {
        self.sequencer.handle(&mut self.port, SequencerEvent::StreamStop)
    }

    /// Set or clear the user mute.
    pub fn set_user_mute(&mut self, mute: bool) -> Result<(), Error> {
        let event = if mute {
            SequencerEvent::UserMuteSet
        } else {
            SequencerEvent::UserMuteClear
        };
        self.sequencer.handle(&mut self.port, event)
    }

    /// Change the idle mute policy.
    pub fn set_mute_mode(&mut self, mode: MuteMode) -> Result<(), Error> {
        self.sequencer
            .handle(&mut self.port, SequencerEvent::MuteModeChanged(mode))
    }

    /// Change the DAI format. DIT also routes the DAC to its SPDIF input.
    pub fn set_dai_format(&mut self, dai_format: DaiFormat) -> Result<(), Error> {
        self.dai_format = dai_format;
        self.sequencer.set_dai_format(&mut self.port, dai_format)
    }

    /// Record the master clock frequency.
    ///
    /// In slave mode the master clock is not ours, and this reports
    /// [`Error::UnsupportedOperation`].
    pub fn set_sysclk(&mut self, sysclk_hz: u32) -> Result<(), Error> {
        if self.config.clock_mode == ClockMode::Slave {
            return Err(Error::UnsupportedOperation("set_sysclk in slave mode"));
        }
        self.sysclk_hz = sysclk_hz;
        Ok(())
    }
}
