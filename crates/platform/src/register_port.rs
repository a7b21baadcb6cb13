//! Register access port.
//!
//! The control plane never talks to a bus directly. Every hardware effect goes
//! through [`RegisterPort`], a two-method capability (`read` / `write` one
//! 8-bit register). Read-modify-write is layered on top as
//! [`RegisterPort::update_bits`], with the same "skip the write when nothing
//! changes" behaviour as a Linux regmap.
//!
//! [`RegisterBitfield`] names one field of one register; the Sabre32 map in
//! [`crate::sabre32`] is expressed entirely in terms of it.
//!
//! [`I2cRegisterPort`] adapts any blocking `embedded_hal::i2c::I2c` bus.
//!
//! ## Single-byte reads only
//! Sabre32 parts do not support sequential multi-byte reads. Every read is a
//! separate `write_read` transaction that sends exactly one address byte and
//! reads back exactly one data byte.

use embedded_hal::i2c::{Error as _, I2c};

// ── Error type ───────────────────────────────────────────────────────────────

/// Direction of a failed register transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Register read.
    Read,
    /// Register write.
    Write,
}

/// A register transaction failed at the bus level.
///
/// Timeouts and retries belong to the port implementation; by the time this
/// error is returned the transaction is considered lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportError {
    /// Register address of the failed transaction.
    pub register: u8,
    /// Whether the transaction was a read or a write.
    pub access: Access,
}

impl TransportError {
    /// A failed read of `register`.
    pub const fn read(register: u8) -> Self {
        Self {
            register,
            access: Access::Read,
        }
    }

    /// A failed write of `register`.
    pub const fn write(register: u8) -> Self {
        Self {
            register,
            access: Access::Write,
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.access {
            Access::Read => write!(f, "failed to read register {}", self.register),
            Access::Write => write!(f, "failed to write register {}", self.register),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

// ── RegisterPort ─────────────────────────────────────────────────────────────

/// Byte-wide register access to one DAC.
pub trait RegisterPort {
    /// Read one register.
    fn read(&mut self, register: u8) -> Result<u8, TransportError>;

    /// Write one register.
    fn write(&mut self, register: u8, value: u8) -> Result<(), TransportError>;

    /// Replace the bits selected by `mask` with the corresponding bits of
    /// `value`.
    ///
    /// Returns `true` if a write was issued, `false` if the register already
    /// held the requested bits.
    fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<bool, TransportError> {
        let current = self.read(register)?;
        let next = (current & !mask) | (value & mask);
        if next == current {
            return Ok(false);
        }
        self.write(register, next)?;
        Ok(true)
    }
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    fn read(&mut self, register: u8) -> Result<u8, TransportError> {
        (**self).read(register)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        (**self).write(register, value)
    }

    fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<bool, TransportError> {
        (**self).update_bits(register, mask, value)
    }
}

// ── RegisterBitfield ─────────────────────────────────────────────────────────

/// One contiguous field inside an 8-bit register.
///
/// `shift` is derived from the mask, so a field is fully described by
/// `(register, mask)`:
///
/// ```
/// use dac_platform::RegisterBitfield;
///
/// const DAI_FORMAT: RegisterBitfield = RegisterBitfield::new(10, 0x30);
/// assert_eq!(DAI_FORMAT.shift, 4);
/// assert_eq!(DAI_FORMAT.encode(0b10), 0x20);
/// assert_eq!(DAI_FORMAT.decode(0xe5), 0b10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterBitfield {
    /// Register address on the port.
    pub register: u8,
    /// Bits of the register owned by this field.
    pub mask: u8,
    /// Position of the field's least significant bit.
    pub shift: u8,
}

impl RegisterBitfield {
    /// Describe the field selected by `mask` in `register`.
    ///
    /// `mask` must be non-zero and contiguous.
    // trailing_zeros() of a u8 is at most 8, so the cast is lossless.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(register: u8, mask: u8) -> Self {
        Self {
            register,
            mask,
            shift: mask.trailing_zeros() as u8,
        }
    }

    /// Largest value the field can hold.
    pub const fn max_value(self) -> u8 {
        self.mask.wrapping_shr(self.shift as u32)
    }

    /// Position `value` inside the register byte. Bits outside the field are
    /// dropped.
    pub const fn encode(self, value: u8) -> u8 {
        value.wrapping_shl(self.shift as u32) & self.mask
    }

    /// Extract the field from a raw register byte.
    pub const fn decode(self, raw: u8) -> u8 {
        (raw & self.mask).wrapping_shr(self.shift as u32)
    }

    /// Read the field through `port`.
    pub fn read<P: RegisterPort + ?Sized>(self, port: &mut P) -> Result<u8, TransportError> {
        Ok(self.decode(port.read(self.register)?))
    }

    /// Write the field through `port`, leaving the other bits of the register
    /// untouched.
    pub fn write<P: RegisterPort + ?Sized>(
        self,
        port: &mut P,
        value: u8,
    ) -> Result<bool, TransportError> {
        port.update_bits(self.register, self.mask, self.encode(value))
    }

    /// Set (`true`) or clear (`false`) every bit of the field.
    pub fn set<P: RegisterPort + ?Sized>(self, port: &mut P, on: bool) -> Result<bool, TransportError> {
        port.update_bits(self.register, self.mask, if on { self.mask } else { 0 })
    }
}

// ── I2C adapter ──────────────────────────────────────────────────────────────

/// [`RegisterPort`] over a blocking embedded-hal I2C bus.
pub struct I2cRegisterPort<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cRegisterPort<I> {
    /// Create a port talking to the DAC at the 7-bit `address`.
    ///
    /// See [`crate::sabre32::I2C_ADDR_PRIMARY`].
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7-bit I2C address of the DAC.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterPort for I2cRegisterPort<I> {
    fn read(&mut self, register: u8) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| {
                tracing::warn!(address = self.address, register, kind = ?e.kind(), "i2c register read failed");
                TransportError::read(register)
            })?;
        let [value] = buf;
        Ok(value)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| {
                tracing::warn!(address = self.address, register, value, kind = ?e.kind(), "i2c register write failed");
                TransportError::write(register)
            })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockRegisterPort;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x48;

    #[test]
    fn bitfield_shift_is_derived_from_mask() {
        assert_eq!(RegisterBitfield::new(10, 0x01).shift, 0);
        assert_eq!(RegisterBitfield::new(10, 0xc0).shift, 6);
        assert_eq!(RegisterBitfield::new(11, 0x1c).shift, 2);
    }

    #[test]
    fn bitfield_max_value_matches_width() {
        assert_eq!(RegisterBitfield::new(11, 0x1c).max_value(), 7);
        assert_eq!(RegisterBitfield::new(14, 0xf0).max_value(), 15);
        assert_eq!(RegisterBitfield::new(15, 0xff).max_value(), 255);
    }

    #[test]
    fn bitfield_encode_drops_out_of_field_bits() {
        let field = RegisterBitfield::new(14, 0x06);
        assert_eq!(field.encode(0b11), 0x06);
        assert_eq!(field.encode(0b111), 0x06);
    }

    #[test]
    fn update_bits_preserves_other_bits() {
        let mut port = MockRegisterPort::new();
        port.set_register(10, 0b1010_0101);
        let wrote = port.update_bits(10, 0x30, 0x10).unwrap();
        assert!(wrote);
        assert_eq!(port.register(10), 0b1001_0101);
    }

    #[test]
    fn update_bits_skips_unchanged_write() {
        let mut port = MockRegisterPort::new();
        port.set_register(10, 0x01);
        let wrote = port.update_bits(10, 0x01, 0x01).unwrap();
        assert!(!wrote);
        assert!(port.writes().is_empty());
    }

    #[test]
    fn update_bits_surfaces_read_failure_without_writing() {
        let mut port = MockRegisterPort::new();
        port.fail_reads_of(17);
        let err = port.update_bits(17, 0x20, 0x20).unwrap_err();
        assert_eq!(err, TransportError::read(17));
        assert!(port.writes().is_empty());
    }

    #[test]
    fn i2c_read_is_single_byte_write_read() {
        let expectations = [I2cTransaction::write_read(ADDR, vec![18], vec![0x04])];
        let mut i2c = I2cMock::new(&expectations);
        let mut port = I2cRegisterPort::new(i2c.clone(), ADDR);
        assert_eq!(port.read(18).unwrap(), 0x04);
        i2c.done();
    }

    #[test]
    fn i2c_write_sends_register_then_value() {
        let expectations = [I2cTransaction::write(ADDR, vec![20, 0xff])];
        let mut i2c = I2cMock::new(&expectations);
        let mut port = I2cRegisterPort::new(i2c.clone(), ADDR);
        port.write(20, 0xff).unwrap();
        i2c.done();
    }

    #[test]
    fn i2c_update_bits_reads_then_writes() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![10], vec![0x00]),
            I2cTransaction::write(ADDR, vec![10, 0x01]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut port = I2cRegisterPort::new(i2c.clone(), ADDR);
        assert!(port.update_bits(10, 0x01, 0x01).unwrap());
        i2c.done();
    }

    #[test]
    fn i2c_nack_maps_to_transport_error() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![23, 0x7f]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let mut port = I2cRegisterPort::new(i2c.clone(), ADDR);
        assert_eq!(port.write(23, 0x7f), Err(TransportError::write(23)));
        i2c.done();
    }

    #[test]
    fn transport_error_display_names_register() {
        assert_eq!(
            TransportError::write(23).to_string(),
            "failed to write register 23"
        );
    }
}
