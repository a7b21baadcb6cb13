//! Logical control table.
//!
//! Fifteen controls, each a static [`LogicalControl`] describing its range,
//! item labels and the register fields it owns. Register-backed controls are
//! encoded into a [`WritePlan`] (an ordered list of single-register
//! operations) and decoded by reading the same fields back.
//!
//! Two controls (`Master Playback Switch` and `Mute Mode`) live in the
//! device state rather than in registers; [`crate::ControlPlane`] answers
//! those through the mute sequencer.
//!
//! # Multi-register writes
//!
//! Volume, de-emphasis, DPLL and output remap touch more than one register.
//! The operations are applied in order and the first failure stops the
//! sequence. Nothing is rolled back: a failure after the first operation is
//! reported as [`Error::PartialApply`] so the caller knows the device may
//! hold a mix of old and new values.

use dac_platform::sabre32::{
    DEEMPHASIS_DISABLE, DEEMPHASIS_RATE, DIFFERENTIAL_MODE, DPLL_AUTO, DPLL_COARSE, DPLL_PHASE,
    FIR_ROLLOFF, IIR_BANDWIDTH, INPUT_REMAP, JITTER_REDUCTION, MCLK_NOTCH, OUTPUT_REMAP,
    OVERSAMPLING_BYPASS, REG_MODE_CONTROL_4, SPDIF_CHANNEL, TRUE_MONO_ENABLE, TRUE_MONO_RIGHT,
    VOLUME_0, VOLUME_1, VOLUME_2, VOLUME_3, VOLUME_BYTES,
};
use dac_platform::{AttenuationIndex, RegisterBitfield, RegisterPort, TransportError};
use tracing::debug;

use crate::bits;
use crate::error::{ConfigError, Error};
use crate::volume;

// ── Control identity ─────────────────────────────────────────────────────────

/// Stable identifier of a logical control. The discriminant is the control's
/// position in [`CONTROLS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ControlId {
    /// Master attenuation, 0 (full scale) ..= 199 (silent).
    MasterVolume = 0,
    /// User mute (1 = muted).
    MasterMute = 1,
    /// SPDIF input pin.
    SpdifSource = 2,
    /// Jitter reduction bypass/use.
    JitterReduction = 3,
    /// De-emphasis filter.
    DeemphasisFilter = 4,
    /// DPLL bandwidth.
    Dpll = 5,
    /// IIR filter bandwidth.
    IirBandwidth = 6,
    /// FIR roll-off.
    FirRolloff = 7,
    /// True mono channel.
    TrueMono = 8,
    /// DPLL phase.
    DpllPhase = 9,
    /// Oversampling filter use/bypass.
    OversamplingFilter = 10,
    /// Mute when no stream is playing.
    MuteMode = 11,
    /// Input channel remap.
    RemapInputs = 12,
    /// MCLK notch filter.
    MclkNotch = 13,
    /// Output quantizer and differential mode.
    RemapOutput = 14,
}

impl ControlId {
    /// Every control, in table order.
    pub const ALL: [Self; 15] = [
        Self::MasterVolume,
        Self::MasterMute,
        Self::SpdifSource,
        Self::JitterReduction,
        Self::DeemphasisFilter,
        Self::Dpll,
        Self::IirBandwidth,
        Self::FirRolloff,
        Self::TrueMono,
        Self::DpllPhase,
        Self::OversamplingFilter,
        Self::MuteMode,
        Self::RemapInputs,
        Self::MclkNotch,
        Self::RemapOutput,
    ];

    /// Look a control up by its table index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Table index.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Static description.
    pub fn control(self) -> &'static LogicalControl {
        match self {
            Self::MasterVolume => &MASTER_VOLUME,
            Self::MasterMute => &MASTER_MUTE,
            Self::SpdifSource => &SPDIF_SOURCE,
            Self::JitterReduction => &JITTER_REDUCTION_CTL,
            Self::DeemphasisFilter => &DEEMPHASIS_FILTER,
            Self::Dpll => &DPLL,
            Self::IirBandwidth => &IIR_BANDWIDTH_CTL,
            Self::FirRolloff => &FIR_ROLLOFF_CTL,
            Self::TrueMono => &TRUE_MONO,
            Self::DpllPhase => &DPLL_PHASE_CTL,
            Self::OversamplingFilter => &OVERSAMPLING_FILTER,
            Self::MuteMode => &MUTE_MODE,
            Self::RemapInputs => &REMAP_INPUTS,
            Self::MclkNotch => &MCLK_NOTCH_CTL,
            Self::RemapOutput => &REMAP_OUTPUT,
        }
    }
}

/// How a control presents its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    /// Integer attenuation range.
    ContinuousAttenuation,
    /// On/off mute switch.
    BooleanMute,
    /// One of a list of labelled items.
    Enumerated,
}

/// Static description of one logical control.
#[derive(Debug, PartialEq, Eq)]
pub struct LogicalControl {
    /// Identifier.
    pub id: ControlId,
    /// User-facing name.
    pub name: &'static str,
    /// Presentation.
    pub kind: ControlKind,
    /// Largest accepted value; the range is `0..=max`.
    pub max: u32,
    /// Register fields the control reads and writes. Empty for controls
    /// held in device state.
    pub fields: &'static [RegisterBitfield],
    /// Item labels for enumerated controls.
    pub items: &'static [&'static str],
    /// A user-facing surface should present `max - value` (volume shown as
    /// loudness, mute shown as an "on" switch).
    pub inverted: bool,
}

impl LogicalControl {
    /// `true` for controls held in device state instead of registers.
    pub fn is_state_backed(&self) -> bool {
        self.fields.is_empty()
    }

    /// Label of item `value`, if the control is enumerated.
    pub fn item(&self, value: u32) -> Option<&'static str> {
        usize::try_from(value)
            .ok()
            .and_then(|i| self.items.get(i))
            .copied()
    }

    /// Reject values above `max`.
    pub fn check(&self, value: u32) -> Result<u8, ConfigError> {
        let out_of_range = ConfigError::OutOfRange {
            value,
            min: 0,
            max: self.max,
        };
        if value > self.max {
            return Err(out_of_range);
        }
        u8::try_from(value).map_err(|_| out_of_range)
    }
}

// ── Labels ───────────────────────────────────────────────────────────────────

const SPDIF_INPUT_LABELS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8"];
const BYPASS_OR_USE_LABELS: &[&str] = &["Bypass", "Use"];
const DEEMPHASIS_LABELS: &[&str] = &["Bypass", "32kHz", "44.1kHz", "48kHz"];
const DPLL_LABELS: &[&str] = &[
    "1x Auto", "128x Auto", "No", "1x", "2x", "4x", "8x", "16x", "32x", "64x", "128x", "256x",
    "512x", "1024x", "2048x", "4096x", "8192x",
];
const IIR_BW_LABELS: &[&str] = &["Normal", "50k", "60k", "70k"];
const FIR_ROLLOFF_LABELS: &[&str] = &["Slow", "Fast"];
const TRUE_MONO_LABELS: &[&str] = &["Left", "Off", "Right"];
const DPLL_PHASE_LABELS: &[&str] = &["Normal", "Flip"];
const OS_FILTER_LABELS: &[&str] = &["Use", "Bypass"];
const MUTE_MODE_LABELS: &[&str] = &["Never", "On Idle"];
const REMAP_INPUTS_LABELS: &[&str] = &[
    "12345678", "12345676", "12345658", "12345656", "12325678", "12325676", "12325658",
    "12325656", "12145678", "12145676", "12145658", "12145656", "12125678", "12125676",
    "12125658", "12125656",
];
const MCLK_NOTCH_LABELS: &[&str] = &["No Notch", "MCLK/4", "MCLK/8", "MCLK/16", "MCLK/32", "MCLK/64"];
const REMAP_OUTPUT_LABELS: &[&str] = &["q6true", "q7pseudo", "q7true", "q8pseudo", "q8true", "q9pseudo"];

// ── Table ────────────────────────────────────────────────────────────────────

// Length of a label table as a control maximum.
#[allow(clippy::cast_possible_truncation)]
const fn max_of(items: &[&str]) -> u32 {
    (items.len() as u32).saturating_sub(1)
}

const fn enumerated(
    id: ControlId,
    name: &'static str,
    fields: &'static [RegisterBitfield],
    items: &'static [&'static str],
) -> LogicalControl {
    LogicalControl {
        id,
        name,
        kind: ControlKind::Enumerated,
        max: max_of(items),
        fields,
        items,
        inverted: false,
    }
}

static MASTER_VOLUME: LogicalControl = LogicalControl {
    id: ControlId::MasterVolume,
    name: "Master Playback Volume",
    kind: ControlKind::ContinuousAttenuation,
    max: AttenuationIndex::MAX as u32, // u8 -> u32, lossless
    fields: &[VOLUME_0, VOLUME_1, VOLUME_2, VOLUME_3],
    items: &[],
    inverted: true,
};

static MASTER_MUTE: LogicalControl = LogicalControl {
    id: ControlId::MasterMute,
    name: "Master Playback Switch",
    kind: ControlKind::BooleanMute,
    max: 1,
    fields: &[],
    items: &[],
    inverted: true,
};

static SPDIF_SOURCE: LogicalControl =
    enumerated(ControlId::SpdifSource, "SPDIF Source", &[SPDIF_CHANNEL], SPDIF_INPUT_LABELS);
static JITTER_REDUCTION_CTL: LogicalControl = enumerated(
    ControlId::JitterReduction,
    "Jitter Reduction",
    &[JITTER_REDUCTION],
    BYPASS_OR_USE_LABELS,
);
static DEEMPHASIS_FILTER: LogicalControl = enumerated(
    ControlId::DeemphasisFilter,
    "De-emphasis Filter",
    &[DEEMPHASIS_RATE, DEEMPHASIS_DISABLE],
    DEEMPHASIS_LABELS,
);
static DPLL: LogicalControl = enumerated(ControlId::Dpll, "DPLL", &[DPLL_COARSE, DPLL_AUTO], DPLL_LABELS);
static IIR_BANDWIDTH_CTL: LogicalControl =
    enumerated(ControlId::IirBandwidth, "IIR Bandwidth", &[IIR_BANDWIDTH], IIR_BW_LABELS);
static FIR_ROLLOFF_CTL: LogicalControl =
    enumerated(ControlId::FirRolloff, "FIR Rolloff", &[FIR_ROLLOFF], FIR_ROLLOFF_LABELS);
static TRUE_MONO: LogicalControl = enumerated(
    ControlId::TrueMono,
    "True Mono",
    &[TRUE_MONO_ENABLE, TRUE_MONO_RIGHT],
    TRUE_MONO_LABELS,
);
static DPLL_PHASE_CTL: LogicalControl =
    enumerated(ControlId::DpllPhase, "DPLL Phase", &[DPLL_PHASE], DPLL_PHASE_LABELS);
static OVERSAMPLING_FILTER: LogicalControl = enumerated(
    ControlId::OversamplingFilter,
    "Oversampling Filter",
    &[OVERSAMPLING_BYPASS],
    OS_FILTER_LABELS,
);
static MUTE_MODE: LogicalControl = enumerated(ControlId::MuteMode, "Mute Mode", &[], MUTE_MODE_LABELS);
static REMAP_INPUTS: LogicalControl =
    enumerated(ControlId::RemapInputs, "Remap Inputs", &[INPUT_REMAP], REMAP_INPUTS_LABELS);
static MCLK_NOTCH_CTL: LogicalControl =
    enumerated(ControlId::MclkNotch, "MCLK Notch", &[MCLK_NOTCH], MCLK_NOTCH_LABELS);
static REMAP_OUTPUT: LogicalControl = enumerated(
    ControlId::RemapOutput,
    "Remap Output",
    &[DIFFERENTIAL_MODE, OUTPUT_REMAP],
    REMAP_OUTPUT_LABELS,
);

/// Every logical control, indexed by [`ControlId::index`].
pub static CONTROLS: [&LogicalControl; 15] = [
    &MASTER_VOLUME,
    &MASTER_MUTE,
    &SPDIF_SOURCE,
    &JITTER_REDUCTION_CTL,
    &DEEMPHASIS_FILTER,
    &DPLL,
    &IIR_BANDWIDTH_CTL,
    &FIR_ROLLOFF_CTL,
    &TRUE_MONO,
    &DPLL_PHASE_CTL,
    &OVERSAMPLING_FILTER,
    &MUTE_MODE,
    &REMAP_INPUTS,
    &MCLK_NOTCH_CTL,
    &REMAP_OUTPUT,
];

// ── Write plans ──────────────────────────────────────────────────────────────

/// Most operations any control needs.
pub const MAX_PLAN_OPS: usize = 4;

/// One single-register step of a control write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterOp {
    /// Read-modify-write of the bits in `mask`.
    Update {
        /// Register address.
        register: u8,
        /// Bits to replace.
        mask: u8,
        /// New bits, already shifted into place.
        bits: u8,
    },
    /// Plain write of a whole register.
    Write {
        /// Register address.
        register: u8,
        /// New content.
        value: u8,
    },
}

impl RegisterOp {
    /// Update `field` to hold `value`.
    pub const fn field(field: RegisterBitfield, value: u8) -> Self {
        Self::Update {
            register: field.register,
            mask: field.mask,
            bits: field.encode(value),
        }
    }

    /// Register this operation touches.
    pub fn register(&self) -> u8 {
        match *self {
            Self::Update { register, .. } | Self::Write { register, .. } => register,
        }
    }

    fn apply<P: RegisterPort + ?Sized>(&self, port: &mut P) -> Result<(), TransportError> {
        match *self {
            Self::Update {
                register,
                mask,
                bits,
            } => port.update_bits(register, mask, bits).map(|_| ()),
            Self::Write { register, value } => port.write(register, value),
        }
    }
}

/// Ordered register operations for one control write.
pub type WritePlan = heapless::Vec<RegisterOp, MAX_PLAN_OPS>;

fn plan_of(ops: &[RegisterOp]) -> WritePlan {
    ops.iter().copied().take(MAX_PLAN_OPS).collect()
}

/// Encode `value` for a register-backed control.
///
/// Returns [`Error::UnsupportedOperation`] for state-backed controls and
/// [`ConfigError::OutOfRange`] for values above the control's maximum.
pub fn write_plan(id: ControlId, value: u32) -> Result<WritePlan, Error> {
    let control = id.control();
    let v = control.check(value)?;

    let plan = match id {
        ControlId::MasterMute | ControlId::MuteMode => {
            return Err(Error::UnsupportedOperation("state-backed control"));
        }
        ControlId::MasterVolume => {
            let coefficient = volume::forward(AttenuationIndex::new(v));
            let bytes = volume::coefficient_bytes(coefficient);
            let mut plan = WritePlan::new();
            for (field, byte) in VOLUME_BYTES.iter().zip(bytes) {
                let op = RegisterOp::Write {
                    register: field.register,
                    value: field.encode(byte),
                };
                if plan.push(op).is_err() {
                    break;
                }
            }
            plan
        }
        ControlId::SpdifSource => plan_of(&[RegisterOp::field(SPDIF_CHANNEL, bits::bit(v))]),
        ControlId::JitterReduction => plan_of(&[RegisterOp::field(JITTER_REDUCTION, v)]),
        ControlId::DeemphasisFilter => match v.checked_sub(1) {
            Some(rate) => plan_of(&[
                RegisterOp::field(DEEMPHASIS_RATE, rate),
                RegisterOp::field(DEEMPHASIS_DISABLE, 0),
            ]),
            None => plan_of(&[RegisterOp::field(DEEMPHASIS_DISABLE, 1)]),
        },
        ControlId::Dpll => {
            let (coarse, auto) = dpll_fields(v);
            plan_of(&[
                RegisterOp::field(DPLL_COARSE, coarse),
                RegisterOp::field(DPLL_AUTO, auto),
            ])
        }
        ControlId::IirBandwidth => plan_of(&[RegisterOp::field(IIR_BANDWIDTH, v)]),
        ControlId::FirRolloff => plan_of(&[RegisterOp::field(FIR_ROLLOFF, v)]),
        ControlId::TrueMono => {
            let bits = match v {
                1 => 0,
                0 => TRUE_MONO_ENABLE.encode(1),
                _ => TRUE_MONO_ENABLE.encode(1) | TRUE_MONO_RIGHT.encode(1),
            };
            plan_of(&[RegisterOp::Update {
                register: REG_MODE_CONTROL_4,
                mask: TRUE_MONO_ENABLE.mask | TRUE_MONO_RIGHT.mask,
                bits,
            }])
        }
        ControlId::DpllPhase => plan_of(&[RegisterOp::field(DPLL_PHASE, v)]),
        ControlId::OversamplingFilter => plan_of(&[RegisterOp::field(OVERSAMPLING_BYPASS, v)]),
        ControlId::RemapInputs => plan_of(&[RegisterOp::field(INPUT_REMAP, v)]),
        ControlId::MclkNotch => plan_of(&[RegisterOp::field(MCLK_NOTCH, bits::low_mask(v))]),
        ControlId::RemapOutput => {
            let true_differential = u8::from(v % 2 == 0);
            let pairs = v.saturating_add(1) / 2;
            plan_of(&[
                RegisterOp::field(DIFFERENTIAL_MODE, true_differential),
                RegisterOp::field(OUTPUT_REMAP, pairs.saturating_mul(0x55)),
            ])
        }
    };
    Ok(plan)
}

/// DPLL item -> (coarse bandwidth, reg 25 mode bits).
///
/// Items 0 and 1 are the two automatic modes. Items 2..=9 select coarse
/// bandwidth 0..=7 at 1x; items 10..=16 select coarse 1..=7 with the 128x
/// range bit.
fn dpll_fields(item: u8) -> (u8, u8) {
    match item.checked_sub(2) {
        None => (0, item.saturating_add(2)),
        Some(coarse @ 0..=7) => (coarse, 0),
        Some(extended) => (extended.saturating_sub(7), 1),
    }
}

/// Apply `plan` in order. No rollback on failure.
pub fn apply_plan<P: RegisterPort + ?Sized>(port: &mut P, plan: &WritePlan) -> Result<(), Error> {
    // A plan never exceeds MAX_PLAN_OPS, so the counts fit in a u8.
    #[allow(clippy::cast_possible_truncation)]
    let total = plan.len() as u8;
    let mut applied = 0u8;
    for op in plan {
        if let Err(error) = op.apply(port) {
            return Err(if applied == 0 {
                Error::Transport(error)
            } else {
                Error::PartialApply {
                    applied,
                    total,
                    error,
                }
            });
        }
        applied = applied.saturating_add(1);
    }
    Ok(())
}

/// Encode and apply a register-backed control.
pub fn write<P: RegisterPort + ?Sized>(port: &mut P, id: ControlId, value: u32) -> Result<(), Error> {
    let plan = write_plan(id, value)?;
    debug!(?id, value, ops = plan.len(), "control write");
    apply_plan(port, &plan)
}

// ── Reads ────────────────────────────────────────────────────────────────────

/// Decode the current value of a register-backed control.
///
/// Returns [`Error::UnsupportedOperation`] for state-backed controls.
pub fn read<P: RegisterPort + ?Sized>(port: &mut P, id: ControlId) -> Result<u32, Error> {
    let value = match id {
        ControlId::MasterMute | ControlId::MuteMode => {
            return Err(Error::UnsupportedOperation("state-backed control"));
        }
        ControlId::MasterVolume => {
            // Most significant byte first.
            let b3 = VOLUME_3.read(port)?;
            let b2 = VOLUME_2.read(port)?;
            let b1 = VOLUME_1.read(port)?;
            let b0 = VOLUME_0.read(port)?;
            let coefficient = volume::coefficient_from_bytes([b0, b1, b2, b3]);
            u32::from(volume::inverse(coefficient).get())
        }
        ControlId::SpdifSource => {
            bits::highest_set_bit(u32::from(SPDIF_CHANNEL.read(port)?)).unwrap_or(0)
        }
        ControlId::JitterReduction => u32::from(JITTER_REDUCTION.read(port)?),
        ControlId::DeemphasisFilter => {
            if DEEMPHASIS_DISABLE.read(port)? == 1 {
                0
            } else {
                // Rate 3 is reserved and reads back as bypass.
                match DEEMPHASIS_RATE.read(port)? {
                    rate @ 0..=2 => u32::from(rate).saturating_add(1),
                    _ => 0,
                }
            }
        }
        ControlId::Dpll => {
            let mode = DPLL_AUTO.read(port)?;
            if mode & 0b10 != 0 {
                u32::from(mode & 0b01)
            } else {
                let coarse = u32::from(DPLL_COARSE.read(port)?);
                let extended = if coarse > 0 && mode & 0b01 != 0 { 7 } else { 0 };
                coarse.saturating_add(extended).saturating_add(2)
            }
        }
        ControlId::IirBandwidth => u32::from(IIR_BANDWIDTH.read(port)?),
        ControlId::FirRolloff => u32::from(FIR_ROLLOFF.read(port)?),
        ControlId::TrueMono => {
            let raw = port.read(REG_MODE_CONTROL_4)?;
            if TRUE_MONO_ENABLE.decode(raw) == 1 {
                u32::from(TRUE_MONO_RIGHT.decode(raw)).saturating_mul(2)
            } else {
                1
            }
        }
        ControlId::DpllPhase => u32::from(DPLL_PHASE.read(port)?),
        ControlId::OversamplingFilter => u32::from(OVERSAMPLING_BYPASS.read(port)?),
        ControlId::RemapInputs => u32::from(INPUT_REMAP.read(port)?),
        ControlId::MclkNotch => bits::bit_length(u32::from(MCLK_NOTCH.read(port)?)),
        ControlId::RemapOutput => {
            let pairs = u32::from(OUTPUT_REMAP.read(port)? & 0b11);
            let doubled = pairs.saturating_mul(2);
            let item = if DIFFERENTIAL_MODE.read(port)? == 0 {
                doubled.checked_sub(1)
            } else {
                Some(doubled)
            };
            // Invalid quantizer/differential combinations read as item 0.
            item.filter(|&v| v <= REMAP_OUTPUT.max).unwrap_or(0)
        }
    };
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use dac_platform::mock::MockRegisterPort;

    #[test]
    fn table_is_indexed_by_id() {
        for (i, control) in CONTROLS.iter().enumerate() {
            assert_eq!(usize::from(control.id.index()), i);
            assert!(core::ptr::eq(*control, control.id.control()));
            assert_eq!(ControlId::from_index(control.id.index()), Some(control.id));
        }
        assert_eq!(ControlId::from_index(15), None);
    }

    #[test]
    fn enumerated_maxima_match_labels() {
        assert_eq!(ControlId::SpdifSource.control().max, 7);
        assert_eq!(ControlId::DeemphasisFilter.control().max, 3);
        assert_eq!(ControlId::Dpll.control().max, 16);
        assert_eq!(ControlId::TrueMono.control().max, 2);
        assert_eq!(ControlId::RemapInputs.control().max, 15);
        assert_eq!(ControlId::MclkNotch.control().max, 5);
        assert_eq!(ControlId::RemapOutput.control().max, 5);
        assert_eq!(ControlId::MasterVolume.control().max, 199);
    }

    #[test]
    fn only_mute_controls_are_state_backed() {
        for id in ControlId::ALL {
            let expected = matches!(id, ControlId::MasterMute | ControlId::MuteMode);
            assert_eq!(id.control().is_state_backed(), expected, "{id:?}");
        }
    }

    #[test]
    fn out_of_range_value_is_configuration_error() {
        let err = write_plan(ControlId::TrueMono, 3).unwrap_err();
        assert_eq!(
            err,
            Error::Configuration(ConfigError::OutOfRange {
                value: 3,
                min: 0,
                max: 2
            })
        );
    }

    #[test]
    fn volume_plan_writes_lsb_first() {
        let plan = write_plan(ControlId::MasterVolume, 0).unwrap();
        assert_eq!(
            plan.as_slice(),
            &[
                RegisterOp::Write { register: 20, value: 0xff },
                RegisterOp::Write { register: 21, value: 0xff },
                RegisterOp::Write { register: 22, value: 0xff },
                RegisterOp::Write { register: 23, value: 0x7f },
            ]
        );
    }

    #[test]
    fn deemphasis_bypass_touches_only_disable_bit() {
        let plan = write_plan(ControlId::DeemphasisFilter, 0).unwrap();
        assert_eq!(plan.as_slice(), &[RegisterOp::Update { register: 10, mask: 0x02, bits: 0x02 }]);
    }

    #[test]
    fn dpll_item_mapping() {
        assert_eq!(dpll_fields(0), (0, 2));
        assert_eq!(dpll_fields(1), (0, 3));
        assert_eq!(dpll_fields(2), (0, 0));
        assert_eq!(dpll_fields(9), (7, 0));
        assert_eq!(dpll_fields(10), (1, 1));
        assert_eq!(dpll_fields(16), (7, 1));
    }

    #[test]
    fn every_register_control_reads_back_what_was_written() {
        for id in ControlId::ALL {
            let control = id.control();
            if control.is_state_backed() {
                continue;
            }
            for value in 0..=control.max {
                let mut port = MockRegisterPort::new();
                write(&mut port, id, value).unwrap();
                assert_eq!(read(&mut port, id).unwrap(), value, "{} = {value}", control.name);
            }
        }
    }

    #[test]
    fn partial_apply_reports_progress() {
        let mut port = MockRegisterPort::new();
        port.fail_writes_to(22);
        let err = write(&mut port, ControlId::MasterVolume, 10).unwrap_err();
        assert_eq!(
            err,
            Error::PartialApply {
                applied: 2,
                total: 4,
                error: TransportError::write(22)
            }
        );
        // No rollback: the first two bytes stay written.
        assert!(port.written_registers().eq([20u8, 21]));
    }

    #[test]
    fn first_op_failure_is_plain_transport_error() {
        let mut port = MockRegisterPort::new();
        port.fail_writes_to(20);
        let err = write(&mut port, ControlId::MasterVolume, 10).unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::write(20)));
    }

    #[test]
    fn state_backed_controls_are_not_encoded_here() {
        let mut port = MockRegisterPort::new();
        assert!(read(&mut port, ControlId::MuteMode).unwrap_err().is_absorbable());
        assert!(write_plan(ControlId::MasterMute, 1).unwrap_err().is_absorbable());
    }
}
