//! Mute bookkeeping and format sequencing.
//!
//! The DAC must never play while it is being reconfigured, and must never
//! be audible while the user or the idle policy wants it silent. The
//! sequencer owns [`DeviceState`] and turns each [`SequencerEvent`] into an
//! ordered list of register writes that respects both rules:
//!
//! - every plan that changes routing or format starts by muting;
//! - every plan ends by writing the hardware mute bit to
//!   [`DeviceState::effective_mute`].
//!
//! A failed write aborts the rest of the plan. Since the mute goes first,
//! a half-applied plan leaves the DAC muted.

use dac_platform::sabre32::{
    DAI_FORMAT, DPLL_RESET, MUTE, SPDIF_AUTODETECT, SPDIF_FORCE, WORD_WIDTH,
};
use dac_platform::{DaiFormat, RegisterPort, WordWidth};
use tracing::debug;

use crate::clock::ClockClass;
use crate::error::Error;

/// Whether an idle DAC is muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MuteMode {
    /// Stay unmuted when no stream plays.
    Never = 0,
    /// Mute when no stream plays.
    #[default]
    OnIdle = 1,
}

impl MuteMode {
    /// Control value (0 = Never, 1 = On Idle).
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Never),
            1 => Some(Self::OnIdle),
            _ => None,
        }
    }

    /// Control value.
    pub fn value(self) -> u32 {
        u32::from(self as u8)
    }
}

/// Mutable per-device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// User mute (Master Playback Switch off).
    pub force_mute: bool,
    /// No stream is playing.
    pub stream_muted: bool,
    /// Idle policy.
    pub mute_mode: MuteMode,
    /// Rate family of the last negotiated stream.
    pub last_clock_class: Option<ClockClass>,
}

impl DeviceState {
    /// State right after attach: idle, unmuted by the user, muted by policy.
    pub const fn attached() -> Self {
        Self {
            force_mute: false,
            stream_muted: true,
            mute_mode: MuteMode::OnIdle,
            last_clock_class: None,
        }
    }

    /// Whether the DAC should be silent right now.
    pub fn effective_mute(&self) -> bool {
        self.force_mute || (self.mute_mode == MuteMode::OnIdle && self.stream_muted)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::attached()
    }
}

/// Something that changes what the DAC should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerEvent {
    /// Playback started.
    StreamStart,
    /// Playback stopped.
    StreamStop,
    /// User muted.
    UserMuteSet,
    /// User unmuted.
    UserMuteClear,
    /// Idle policy changed.
    MuteModeChanged(MuteMode),
    /// Route the DAC to its SPDIF input.
    FormatSwitchToSpdif,
    /// A stream of this rate family is about to start.
    ClockClassChange(ClockClass),
}

/// Owner of [`DeviceState`] and the only writer of the mute bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuteSequencer {
    state: DeviceState,
    spdif_fallback_on_idle: bool,
}

impl MuteSequencer {
    /// Fresh sequencer in the attach state.
    pub fn new(spdif_fallback_on_idle: bool) -> Self {
        Self {
            state: DeviceState::attached(),
            spdif_fallback_on_idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Update the state for `event` and issue its write plan.
    pub fn handle<P: RegisterPort + ?Sized>(
        &mut self,
        port: &mut P,
        event: SequencerEvent,
    ) -> Result<(), Error> {
        debug!(?event, "sequencer event");
        match event {
            SequencerEvent::StreamStart => {
                self.state.stream_muted = false;
                self.apply_mute(port)
            }
            SequencerEvent::StreamStop => {
                self.state.stream_muted = true;
                if self.spdif_fallback_on_idle {
                    self.switch_to_spdif(port)
                } else {
                    self.apply_mute(port)
                }
            }
            SequencerEvent::UserMuteSet => {
                self.state.force_mute = true;
                self.apply_mute(port)
            }
            SequencerEvent::UserMuteClear => {
                self.state.force_mute = false;
                self.apply_mute(port)
            }
            SequencerEvent::MuteModeChanged(mode) => {
                self.state.mute_mode = mode;
                self.apply_mute(port)
            }
            SequencerEvent::FormatSwitchToSpdif => self.switch_to_spdif(port),
            SequencerEvent::ClockClassChange(class) => self.relock(port, class),
        }
    }

    /// Program a new stream format.
    ///
    /// Order: mute, DPLL relock if the rate family changed, input routing,
    /// DAI format, word width, then the effective mute.
    pub fn reconfigure<P: RegisterPort + ?Sized>(
        &mut self,
        port: &mut P,
        class: ClockClass,
        dai: DaiFormat,
        width: WordWidth,
    ) -> Result<(), Error> {
        MUTE.set(port, true)?;
        self.relock(port, class)?;
        Self::program_dai_format(port, dai)?;
        WORD_WIDTH.write(port, width.bits())?;
        debug!(?class, ?dai, ?width, "format programmed");
        self.apply_mute(port)
    }

    /// Change only the DAI format (and with it the input routing).
    pub fn set_dai_format<P: RegisterPort + ?Sized>(
        &mut self,
        port: &mut P,
        dai: DaiFormat,
    ) -> Result<(), Error> {
        MUTE.set(port, true)?;
        Self::program_dai_format(port, dai)?;
        self.apply_mute(port)
    }

    fn program_dai_format<P: RegisterPort + ?Sized>(port: &mut P, dai: DaiFormat) -> Result<(), Error> {
        let spdif = dai.is_spdif();
        SPDIF_FORCE.set(port, spdif)?;
        SPDIF_AUTODETECT.set(port, spdif)?;
        DAI_FORMAT.write(port, dai.bits())?;
        Ok(())
    }

    fn switch_to_spdif<P: RegisterPort + ?Sized>(&mut self, port: &mut P) -> Result<(), Error> {
        MUTE.set(port, true)?;
        SPDIF_FORCE.set(port, true)?;
        SPDIF_AUTODETECT.set(port, true)?;
        self.apply_mute(port)
    }

    /// Pulse the DPLL reset if `class` differs from the last stream's.
    fn relock<P: RegisterPort + ?Sized>(&mut self, port: &mut P, class: ClockClass) -> Result<(), Error> {
        if self.state.last_clock_class == Some(class) {
            return Ok(());
        }
        debug!(from = ?self.state.last_clock_class, to = ?class, "DPLL relock");
        DPLL_RESET.set(port, true)?;
        DPLL_RESET.set(port, false)?;
        self.state.last_clock_class = Some(class);
        Ok(())
    }

    fn apply_mute<P: RegisterPort + ?Sized>(&self, port: &mut P) -> Result<(), Error> {
        let mute = self.state.effective_mute();
        debug!(mute, "mute");
        MUTE.set(port, mute)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use dac_platform::mock::MockRegisterPort;
    use dac_platform::sabre32::{REG_AUTOMUTE, REG_MODE_CONTROL_1, REG_MODE_CONTROL_4};
    use dac_platform::TransportError;

    fn muted(port: &MockRegisterPort) -> bool {
        port.register(REG_MODE_CONTROL_1) & 0x01 != 0
    }

    #[test]
    fn attach_state_is_muted_by_policy() {
        let s = DeviceState::attached();
        assert!(s.stream_muted);
        assert!(!s.force_mute);
        assert_eq!(s.mute_mode, MuteMode::OnIdle);
        assert_eq!(s.last_clock_class, None);
        assert!(s.effective_mute());
    }

    #[test]
    fn effective_mute_truth_table() {
        for force_mute in [false, true] {
            for stream_muted in [false, true] {
                for mute_mode in [MuteMode::Never, MuteMode::OnIdle] {
                    let s = DeviceState {
                        force_mute,
                        stream_muted,
                        mute_mode,
                        last_clock_class: None,
                    };
                    let expected = force_mute || (mute_mode == MuteMode::OnIdle && stream_muted);
                    assert_eq!(s.effective_mute(), expected);
                }
            }
        }
    }

    #[test]
    fn stream_start_unmutes() {
        let mut port = MockRegisterPort::new();
        port.set_register(REG_MODE_CONTROL_1, 0x01);
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        assert!(!muted(&port));
    }

    #[test]
    fn stream_stop_falls_back_to_spdif_muted() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        port.clear_log();

        seq.handle(&mut port, SequencerEvent::StreamStop).unwrap();
        assert_eq!(
            port.writes(),
            &[(REG_MODE_CONTROL_1, 0x01), (REG_AUTOMUTE, 0x80), (REG_MODE_CONTROL_4, 0x08)]
        );
        assert!(muted(&port));
    }

    #[test]
    fn stream_stop_with_never_mode_plays_spdif() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::MuteModeChanged(MuteMode::Never)).unwrap();
        seq.handle(&mut port, SequencerEvent::StreamStop).unwrap();
        assert!(!muted(&port));
        assert_eq!(port.register(REG_AUTOMUTE), 0x80);
    }

    #[test]
    fn stream_stop_without_fallback_leaves_routing() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(false);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        seq.handle(&mut port, SequencerEvent::StreamStop).unwrap();
        assert!(muted(&port));
        assert_eq!(port.register(REG_AUTOMUTE), 0);
    }

    #[test]
    fn relock_pulses_reset_once_per_class_change() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::ClockClassChange(ClockClass::Family44k1)).unwrap();
        assert_eq!(port.writes(), &[(REG_MODE_CONTROL_4, 0x20), (REG_MODE_CONTROL_4, 0x00)]);

        port.clear_log();
        seq.handle(&mut port, SequencerEvent::ClockClassChange(ClockClass::Family44k1)).unwrap();
        assert!(port.writes().is_empty());

        seq.handle(&mut port, SequencerEvent::ClockClassChange(ClockClass::Family48k)).unwrap();
        assert_eq!(port.writes().len(), 2);
        assert_eq!(seq.state().last_clock_class, Some(ClockClass::Family48k));
    }

    #[test]
    fn failed_relock_keeps_previous_class() {
        let mut port = MockRegisterPort::new();
        port.fail_writes_after(1);
        let mut seq = MuteSequencer::new(true);
        let err = seq
            .handle(&mut port, SequencerEvent::ClockClassChange(ClockClass::Family48k))
            .unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::write(REG_MODE_CONTROL_4)));
        assert_eq!(seq.state().last_clock_class, None);
    }

    #[test]
    fn reconfigure_mutes_before_relock_and_format() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        port.clear_log();

        seq.reconfigure(&mut port, ClockClass::Family48k, DaiFormat::LeftJustified, WordWidth::Bits16)
            .unwrap();
        assert_eq!(
            port.writes(),
            &[
                (REG_MODE_CONTROL_1, 0x01),
                (REG_MODE_CONTROL_4, 0x20),
                (REG_MODE_CONTROL_4, 0x00),
                (REG_MODE_CONTROL_1, 0x11),
                (REG_MODE_CONTROL_1, 0x91),
                (REG_MODE_CONTROL_1, 0x90),
            ]
        );
    }

    #[test]
    fn dit_format_forces_spdif_input() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.set_dai_format(&mut port, DaiFormat::Dit).unwrap();
        assert_eq!(port.register(REG_AUTOMUTE), 0x80);
        assert_eq!(port.register(REG_MODE_CONTROL_4) & 0x08, 0x08);

        seq.set_dai_format(&mut port, DaiFormat::I2s).unwrap();
        assert_eq!(port.register(REG_AUTOMUTE), 0);
        assert_eq!(port.register(REG_MODE_CONTROL_4) & 0x08, 0);
    }

    #[test]
    fn failure_mid_plan_leaves_dac_muted() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        port.fail_writes_to(REG_MODE_CONTROL_4);

        let err = seq
            .reconfigure(&mut port, ClockClass::Family44k1, DaiFormat::I2s, WordWidth::Bits32)
            .unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::write(REG_MODE_CONTROL_4)));
        assert!(muted(&port));
    }

    #[test]
    fn format_switch_to_spdif_during_playback() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        port.clear_log();

        seq.handle(&mut port, SequencerEvent::FormatSwitchToSpdif).unwrap();
        assert_eq!(
            port.writes(),
            &[
                (REG_MODE_CONTROL_1, 0x01),
                (REG_AUTOMUTE, 0x80),
                (REG_MODE_CONTROL_4, 0x08),
                (REG_MODE_CONTROL_1, 0x00),
            ]
        );
        assert!(!muted(&port));
    }

    #[test]
    fn format_switch_to_spdif_stays_muted_on_failure() {
        let mut port = MockRegisterPort::new();
        let mut seq = MuteSequencer::new(true);
        seq.handle(&mut port, SequencerEvent::StreamStart).unwrap();
        port.fail_writes_to(REG_AUTOMUTE);

        let err = seq
            .handle(&mut port, SequencerEvent::FormatSwitchToSpdif)
            .unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::write(REG_AUTOMUTE)));
        assert!(muted(&port));
        assert_eq!(port.register(REG_MODE_CONTROL_4) & 0x08, 0);
    }

    #[test]
    fn mute_mode_values() {
        assert_eq!(MuteMode::from_value(0), Some(MuteMode::Never));
        assert_eq!(MuteMode::from_value(1), Some(MuteMode::OnIdle));
        assert_eq!(MuteMode::from_value(2), None);
        assert_eq!(MuteMode::OnIdle.value(), 1);
    }
}
