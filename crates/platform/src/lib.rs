//! Hardware Abstraction Layer (HAL) for the Botic Sabre32 DAC control plane
//!
//! This crate provides the hardware-facing half of the control plane: the
//! register access capability, the Sabre32 register map, the clock-line
//! collaborator and the audio domain newtypes. Everything above it (volume
//! curve, control registry, sequencing, clock negotiation) lives in
//! `dac-control` and talks to hardware only through the traits defined here.
//!
//! # Architecture Layers
//!
//! ```text
//! Caller (audio stream framework / control surface)
//!         ↓
//! Control plane (dac-control)
//!         ↓
//! Platform HAL (this crate - RegisterPort, ClockLines, register map)
//!         ↓
//! Bus layer (embedded-hal I2C + GPIO)
//! ```
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls for the error types
//! - `serde`: serde derives on configuration-facing enums
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```
//! use dac_platform::mock::MockRegisterPort;
//! use dac_platform::sabre32::MUTE;
//!
//! let mut port = MockRegisterPort::new();
//! MUTE.write(&mut port, 1).unwrap();
//! assert_eq!(port.register(10) & 0x01, 0x01);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio_types;
pub mod clock_lines;
pub mod mock;
pub mod register_port;
pub mod sabre32;

pub use audio_types::{
    AttenuationIndex, DaiFormat, OutOfRangeError, SampleFormat, SampleRateHz, WordWidth,
};
pub use clock_lines::{ClockLine, ClockLineLevels, ClockLines, GpioClockLines};
pub use register_port::{Access, I2cRegisterPort, RegisterBitfield, RegisterPort, TransportError};
