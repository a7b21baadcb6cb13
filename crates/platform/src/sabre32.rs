//! ESS Sabre32 (ES9018 family) register map as used by the Botic DAC.
//!
//! Only the registers the control plane touches are named here. Every field is
//! a [`RegisterBitfield`], so callers write `MUTE.set(&mut port, true)` rather
//! than hand-masking bytes.
//!
//! The part answers on 0x48 (ADDR low) or 0x49 (ADDR high). Register space
//! runs from 0 to [`MAX_REGISTER`].

use crate::register_port::RegisterBitfield;

/// 7-bit I2C address when ADDR is pulled low.
pub const I2C_ADDR_PRIMARY: u8 = 0x48;
/// 7-bit I2C address when ADDR is pulled high (second DAC of a dual-mono pair).
pub const I2C_ADDR_SECONDARY: u8 = 0x49;

/// Highest valid register address.
pub const MAX_REGISTER: u8 = 72;

// ── Register addresses ───────────────────────────────────────────────────────

/// Register 8: automute / SPDIF force.
pub const REG_AUTOMUTE: u8 = 8;
/// Register 10: mode control 1 (mute, deemphasis, jitter reduction, DAI format, word width).
pub const REG_MODE_CONTROL_1: u8 = 10;
/// Register 11: mode control 2 (deemphasis rate, DPLL bandwidth).
pub const REG_MODE_CONTROL_2: u8 = 11;
/// Register 12: mode control 3 (MCLK notch delay).
pub const REG_MODE_CONTROL_3: u8 = 12;
/// Register 14: DAC source / filters / differential mode / input remap.
pub const REG_DAC_SOURCE: u8 = 14;
/// Register 15: output channel mapping.
pub const REG_OUTPUT_MAP: u8 = 15;
/// Register 17: mode control 4 (true mono, DPLL phase, SPDIF autodetect, DPLL reset, OSF bypass).
pub const REG_MODE_CONTROL_4: u8 = 17;
/// Register 18: SPDIF input channel select (one-hot).
pub const REG_SPDIF_SOURCE: u8 = 18;
/// Registers 20..=23: 32-bit master volume coefficient, least significant byte first.
pub const REG_VOLUME_BASE: u8 = 20;
/// Register 25: DPLL mode control (auto-bandwidth selection).
pub const REG_DPLL_MODE: u8 = 25;

// ── Register 8 ───────────────────────────────────────────────────────────────

/// Force the SPDIF input path.
pub const SPDIF_FORCE: RegisterBitfield = RegisterBitfield::new(REG_AUTOMUTE, 0x80);

// ── Register 10 ──────────────────────────────────────────────────────────────

/// Soft mute (1 = muted).
pub const MUTE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_1, 0x01);
/// Deemphasis disable (1 = bypass the deemphasis filter).
pub const DEEMPHASIS_DISABLE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_1, 0x02);
/// Jitter reduction enable.
pub const JITTER_REDUCTION: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_1, 0x04);
/// Serial data format (0 = I2S, 1 = left justified, 2 = right justified).
pub const DAI_FORMAT: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_1, 0x30);
/// Input word width (0b00 = 24 bit, 0b10 = 16 bit, 0b11 = 32 bit).
pub const WORD_WIDTH: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_1, 0xc0);

// ── Register 11 ──────────────────────────────────────────────────────────────

/// Deemphasis sample rate (0 = 32 kHz, 1 = 44.1 kHz, 2 = 48 kHz).
pub const DEEMPHASIS_RATE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_2, 0x03);
/// Coarse DPLL bandwidth (0 = lowest).
pub const DPLL_COARSE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_2, 0x1c);

// ── Register 12 ──────────────────────────────────────────────────────────────

/// MCLK notch delay, thermometer coded (0b00000, 0b00001, 0b00011, ...).
pub const MCLK_NOTCH: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_3, 0x1f);

// ── Register 14 ──────────────────────────────────────────────────────────────

/// FIR roll-off (0 = slow, 1 = fast).
pub const FIR_ROLLOFF: RegisterBitfield = RegisterBitfield::new(REG_DAC_SOURCE, 0x01);
/// IIR bandwidth (0 = normal, 1 = 50 kHz, 2 = 60 kHz, 3 = 70 kHz).
pub const IIR_BANDWIDTH: RegisterBitfield = RegisterBitfield::new(REG_DAC_SOURCE, 0x06);
/// Differential output mode (1 = true differential).
pub const DIFFERENTIAL_MODE: RegisterBitfield = RegisterBitfield::new(REG_DAC_SOURCE, 0x08);
/// Input remap, one bit per DAC pair.
pub const INPUT_REMAP: RegisterBitfield = RegisterBitfield::new(REG_DAC_SOURCE, 0xf0);

// ── Register 15 ──────────────────────────────────────────────────────────────

/// Output quad mapping, two bits per output pair.
pub const OUTPUT_REMAP: RegisterBitfield = RegisterBitfield::new(REG_OUTPUT_MAP, 0xff);

// ── Register 17 ──────────────────────────────────────────────────────────────

/// True mono enable.
pub const TRUE_MONO_ENABLE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x01);
/// DPLL phase flip (0 = normal, 1 = flipped).
pub const DPLL_PHASE: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x02);
/// SPDIF autodetect.
pub const SPDIF_AUTODETECT: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x08);
/// DPLL reset. Pulse set then clear to force the DPLL to relock.
pub const DPLL_RESET: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x20);
/// Oversampling filter bypass.
pub const OVERSAMPLING_BYPASS: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x40);
/// True mono channel select (1 = right).
pub const TRUE_MONO_RIGHT: RegisterBitfield = RegisterBitfield::new(REG_MODE_CONTROL_4, 0x80);

// ── Register 18 ──────────────────────────────────────────────────────────────

/// SPDIF input select, one-hot over eight data pins.
pub const SPDIF_CHANNEL: RegisterBitfield = RegisterBitfield::new(REG_SPDIF_SOURCE, 0xff);

// ── Registers 20..=23 ────────────────────────────────────────────────────────

/// Master volume coefficient bits 7..0.
pub const VOLUME_0: RegisterBitfield = RegisterBitfield::new(REG_VOLUME_BASE, 0xff);
/// Master volume coefficient bits 15..8.
pub const VOLUME_1: RegisterBitfield = RegisterBitfield::new(21, 0xff);
/// Master volume coefficient bits 23..16.
pub const VOLUME_2: RegisterBitfield = RegisterBitfield::new(22, 0xff);
/// Master volume coefficient bits 30..24. Bit 7 is reserved.
pub const VOLUME_3: RegisterBitfield = RegisterBitfield::new(23, 0x7f);

/// Volume coefficient fields in write order (least significant byte first).
pub const VOLUME_BYTES: [RegisterBitfield; 4] = [VOLUME_0, VOLUME_1, VOLUME_2, VOLUME_3];

// ── Register 25 ──────────────────────────────────────────────────────────────

/// DPLL mode: bit 1 selects automatic bandwidth, bit 0 the auto mode
/// (or, with bit 1 clear, the x128 coarse range).
pub const DPLL_AUTO: RegisterBitfield = RegisterBitfield::new(REG_DPLL_MODE, 0x03);
