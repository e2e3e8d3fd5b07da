#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_config_is_valid() {
    assert!(MeasureConfig::default().validate().is_ok());
}

#[test]
fn default_uses_crate_constants() {
    let config = MeasureConfig::default();
    assert_eq!(config.poll_interval_ms, consts::POLL_INTERVAL_MS);
    assert_eq!(config.cone_length, consts::CONE_LENGTH);
    assert_eq!(config.decimals, consts::DISPLAY_DECIMALS);
}

#[test]
fn from_json_keeps_defaults_for_missing_fields() {
    let config = MeasureConfig::from_json(r#"{ "response_timeout_ms": 5000 }"#).expect("config");
    assert_eq!(config.response_timeout_ms, 5000.0);
    assert_eq!(config.poll_interval_ms, consts::POLL_INTERVAL_MS);
}

#[test]
fn from_json_reads_tuple_fields() {
    let config = MeasureConfig::from_json(r#"{ "panel_offset": [10, 20], "panel_size": [300, 120] }"#).expect("config");
    assert_eq!(config.panel_offset, (10.0, 20.0));
    assert_eq!(config.panel_size, (300.0, 120.0));
}

#[test]
fn from_json_empty_object_is_default() {
    let config = MeasureConfig::from_json("{}").expect("config");
    assert_eq!(config, MeasureConfig::default());
}

#[test]
fn from_json_rejects_malformed_input() {
    let err = MeasureConfig::from_json("{ cone_length: }").expect_err("should fail");
    assert!(matches!(err, MeasureError::ConfigParse(_)));
}

#[test]
fn validate_rejects_non_positive_cone_length() {
    let err = MeasureConfig::from_json(r#"{ "cone_length": 0 }"#).expect_err("should fail");
    assert!(matches!(err, MeasureError::InvalidConfig { field: "cone_length", .. }));
}

#[test]
fn validate_rejects_timeout_shorter_than_poll() {
    let config = MeasureConfig { poll_interval_ms: 500.0, response_timeout_ms: 100.0, ..MeasureConfig::default() };
    let err = config.validate().expect_err("should fail");
    assert!(matches!(err, MeasureError::InvalidConfig { field: "response_timeout_ms", .. }));
}

#[test]
fn validate_rejects_nan() {
    let config = MeasureConfig { leash_thickness: f64::NAN, ..MeasureConfig::default() };
    assert!(config.validate().is_err());
}
