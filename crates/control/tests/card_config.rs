//! Card configuration: builder, validation and (with the `serde` feature)
//! loading from JSON.
// Integration test file: unwrap/expect are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use dac_control::{CardConfig, ClockMode, ConfigError, ExternalClocks};
use dac_platform::DaiFormat;

#[test]
fn builder_round_trip() {
    let config = CardConfig::default()
        .with_serializers("IDR-")
        .unwrap()
        .with_bclk_ratio(0)
        .with_dai_format(DaiFormat::LeftJustified)
        .with_spdif_fallback_on_idle(false);
    assert_eq!(config.serializers.as_str(), "IDR-");
    assert_eq!(config.bclk_ratio, 0);
    assert_eq!(config.dai_format, DaiFormat::LeftJustified);
    assert!(!config.spdif_fallback_on_idle);
    assert!(config.validate().is_ok());
}

#[test]
fn single_44k1_oscillator_in_master_mode_is_valid() {
    let config = CardConfig::default().with_external_clocks(ExternalClocks {
        k48: false,
        single: true,
        ..ExternalClocks::default()
    });
    assert!(config.validate().is_ok());
    assert_eq!(config.resolved_clocks().clk_48k_hz, 0);
}

#[test]
fn master_needs_a_reference() {
    let config = CardConfig::default()
        .with_reference_clocks(0, 0)
        .with_clock_mode(ClockMode::Master);
    assert_eq!(config.validate(), Err(ConfigError::NoMasterClock));
}

#[cfg(feature = "serde")]
mod serde_loading {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: CardConfig = serde_json::from_str(r#"{ "serializers": "IIRR" }"#).unwrap();
        assert_eq!(config.serializers.as_str(), "IIRR");
        assert_eq!(config.clk_44k1_hz, 22_579_200);
        assert_eq!(config.clock_mode, ClockMode::Master);
        assert!(config.external_clocks.k48);
    }

    #[test]
    fn full_document() {
        let json = r#"{
            "clk_44k1_hz": 45158400,
            "clk_48k_hz": 49152000,
            "bclk_ratio": 0,
            "serializers": "S--R",
            "external_clocks": { "k44_1": true, "k48": false, "switch_inverted": true, "single": true },
            "dsd_switch": { "enabled": false, "inverted": false },
            "dai_format": "RightJustified",
            "clock_mode": "Slave",
            "spdif_fallback_on_idle": false
        }"#;
        let config: CardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.clk_44k1_hz, 45_158_400);
        assert_eq!(config.dai_format, DaiFormat::RightJustified);
        assert_eq!(config.clock_mode, ClockMode::Slave);
        assert!(config.external_clocks.single);
        assert!(!config.dsd_switch.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serialize_then_load_is_identity() {
        let config = CardConfig::default().with_serializers("MD-R").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: CardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn oversized_descriptor_fails_to_load() {
        let json = r#"{ "serializers": "MMMMMMMMMMMMMMMMMMMM" }"#;
        assert!(serde_json::from_str::<CardConfig>(json).is_err());
    }
}
