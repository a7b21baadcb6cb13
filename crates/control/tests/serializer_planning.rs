//! Serializer descriptor planning against every sample format.
// Integration test file: unwrap/expect are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use dac_control::{ConfigError, PinRole, ProtocolFormat, SerializerDescriptor};
use dac_platform::SampleFormat;
use proptest::prelude::*;

const FORMATS: [SampleFormat; 13] = [
    SampleFormat::S16Le,
    SampleFormat::S16Be,
    SampleFormat::S24_3Le,
    SampleFormat::S24_3Be,
    SampleFormat::S24Le,
    SampleFormat::S24Be,
    SampleFormat::S32Le,
    SampleFormat::S32Be,
    SampleFormat::DsdU8,
    SampleFormat::DsdU16Le,
    SampleFormat::DsdU16Be,
    SampleFormat::DsdU32Le,
    SampleFormat::DsdU32Be,
];

fn role() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['I', 'D', 'M', 'S', 'R', '-'])
}

fn format() -> impl Strategy<Value = SampleFormat> {
    prop::sample::select(FORMATS.to_vec())
}

proptest! {
    /// SPDIF next to any I2S/DSD-capable pin is always rejected.
    #[test]
    fn spdif_never_mixes(roles in prop::collection::vec(role(), 1..=8), fmt in format()) {
        let descriptor: String = roles.iter().collect();
        let desc = SerializerDescriptor::parse(&descriptor).unwrap();
        let has_spdif = roles.contains(&'S');
        let has_data = roles.iter().any(|c| matches!(c, 'I' | 'D' | 'M'));
        let result = desc.plan(fmt);
        if has_spdif && has_data {
            prop_assert_eq!(result, Err(ConfigError::SpdifMixed));
        } else if let Ok(plan) = result {
            let expected = if has_spdif {
                ProtocolFormat::DedicatedSpdifTransmit
            } else {
                ProtocolFormat::StandardMultiFormat
            };
            prop_assert_eq!(plan.protocol, expected);
        }
    }

    /// Slots appear in descriptor order and each pin lands in at most one list.
    #[test]
    fn slots_follow_descriptor_order(roles in prop::collection::vec(role(), 1..=16), fmt in format()) {
        let descriptor: String = roles.iter().collect();
        let desc = SerializerDescriptor::parse(&descriptor).unwrap();
        if let Ok(plan) = desc.plan(fmt) {
            prop_assert!(plan.tx_slots.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(plan.rx_slots.windows(2).all(|w| w[0] < w[1]));
            for slot in &plan.tx_slots {
                prop_assert!(!plan.rx_slots.contains(slot));
                let role = desc.pins()[usize::from(*slot)];
                prop_assert!(role.transmits(fmt));
            }
            for slot in &plan.rx_slots {
                prop_assert_eq!(desc.pins()[usize::from(*slot)], PinRole::Receive);
            }
        }
    }
}

#[test]
fn all_i2s_descriptor_rejects_dsd_only() {
    let desc: SerializerDescriptor = "IIII".parse().unwrap();
    for fmt in FORMATS {
        let result = desc.plan(fmt);
        if fmt.is_dsd() {
            assert_eq!(result, Err(ConfigError::NoDsdPins), "{fmt:?}");
        } else {
            assert_eq!(result.unwrap().tx_slots.as_slice(), &[0, 1, 2, 3]);
        }
    }
}

#[test]
fn no_dsd_error_message() {
    let desc: SerializerDescriptor = "I-RI".parse().unwrap();
    let err = desc.plan(SampleFormat::DsdU32Le).unwrap_err();
    assert_eq!(err.to_string(), "no pins for DSD playback");
}

#[test]
fn default_descriptor_carries_everything() {
    let desc: SerializerDescriptor = "MMMM".parse().unwrap();
    for fmt in FORMATS {
        let plan = desc.plan(fmt).unwrap();
        assert_eq!(plan.tx_slots.len(), 4);
        assert!(plan.rx_slots.is_empty());
    }
}
