//! Control plane for the Botic Sabre32 DAC
//!
//! Turns logical controls (volume, mute, SPDIF source, DPLL, filters) and
//! stream lifecycle events into ordered register writes on a
//! [`dac_platform::RegisterPort`].
//!
//! # Layout
//!
//! - [`volume`]: attenuation index <-> 31-bit volume coefficient
//! - [`registry`]: the static table of logical controls and their encodings
//! - [`clock`]: master clock selection, bit clock and divisor arithmetic
//! - [`serializer`]: per-pin role descriptor -> transmit/receive slot plan
//! - [`sequencer`]: mute bookkeeping and the ordered write plans that go with it
//! - [`control_plane`]: the facade a card driver talks to
//!
//! Clock and serializer planning are pure. Only the sequencer and the
//! registry touch the port.
//!
//! # Example
//!
//! ```
//! use dac_control::{CardConfig, ControlId, ControlPlane, HwParams};
//! use dac_platform::mock::MockRegisterPort;
//! use dac_platform::{SampleFormat, SampleRateHz};
//!
//! let mut dac = ControlPlane::attach(MockRegisterPort::new(), CardConfig::default()).unwrap();
//! dac.write_control(ControlId::MasterVolume, 40).unwrap();
//!
//! let params = HwParams::new(SampleRateHz::new(44_100).unwrap(), SampleFormat::S32Le);
//! let negotiated = dac.negotiate(params).unwrap();
//! assert_eq!(negotiated.clock.sysclk_hz, 22_579_200);
//!
//! dac.stream_start().unwrap();
//! assert!(!dac.state().effective_mute());
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
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names and hex in doc comments
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod bits;
pub mod clock;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod registry;
pub mod sequencer;
pub mod serializer;
pub mod volume;

pub use clock::{ClockClass, ClockMode, ClockNegotiator, ClockPlan, ClockSource, HwParams};
pub use config::{CardConfig, DsdSwitch, ExternalClocks, ResolvedClocks};
pub use control_plane::{ControlPlane, NegotiatedFormat};
pub use error::{ConfigError, Error};
pub use registry::{ControlId, ControlKind, LogicalControl, RegisterOp, WritePlan};
pub use sequencer::{DeviceState, MuteMode, MuteSequencer, SequencerEvent};
pub use serializer::{PinRole, ProtocolFormat, SerializerDescriptor, SerializerPlan};
