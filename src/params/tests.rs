// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indoc::indoc;

use super::*;

#[test]
fn test_defaults() {
    let config = SynthesisConfig::default();
    assert_eq!(config.strategy, Strategy::GridInterp);
    assert_eq!(config.interpolation, Interpolation::Bilinear);
    assert_eq!(config.padding.get(), DEFAULT_PADDING);
    assert_eq!(config.taper, Taper::None);
    assert_eq!(config.noise, NoiseModel::Disabled);
    assert_eq!(config.chunk_size.get(), DEFAULT_CHUNK_SIZE);
    assert!(config.default_sensitivity.is_none());

    // An empty file is the default config.
    let parsed: SynthesisConfig = toml::from_str("").unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_parse_toml() {
    let config: SynthesisConfig = toml::from_str(indoc! {r#"
        strategy = "direct"
        interpolation = "cubic"
        padding = 4
        taper = "hanning"
        noise = { seeded = 42 }
        chunk-size = 100

        [default-sensitivity]
        sefd1 = 5000.0
        sefd2 = 7000.0
        bandwidth = 2e9
        integration-time = 10
    "#})
    .unwrap();
    assert_eq!(config.strategy, Strategy::Direct);
    assert_eq!(config.interpolation, Interpolation::Cubic);
    assert_eq!(config.padding.get(), 4);
    assert_eq!(config.taper, Taper::Hanning);
    assert_eq!(config.noise, NoiseModel::Seeded(42));
    assert_eq!(config.chunk_size.get(), 100);
    assert_eq!(
        config.default_sensitivity,
        Some(BaselineSensitivity::new(5000.0, 7000.0, 2e9, 10.0).unwrap())
    );
    assert_eq!(config.kernel_options().padding.get(), 4);
}

#[test]
fn test_parse_json() {
    let config: SynthesisConfig =
        serde_json::from_str(r#"{"taper": "welch", "chunk-size": 1}"#).unwrap();
    assert_eq!(config.taper, Taper::Welch);
    assert_eq!(config.chunk_size.get(), 1);
    assert_eq!(config.strategy, Strategy::GridInterp);
}

#[test]
fn test_invalid_configs_are_rejected() {
    for bad in [
        "chunk-size = 0",
        "padding = 0",
        "strategy = \"nufft\"",
        "taper = \"gaussian\"",
        "chunksize = 10",
        "noise = \"seeded\"",
    ] {
        let result: Result<SynthesisConfig, _> = toml::from_str(bad);
        assert!(result.is_err(), "{bad} was accepted");
    }
}

#[test]
fn test_round_trip_through_toml() {
    let config = SynthesisConfig {
        noise: NoiseModel::Seeded(7),
        default_sensitivity: Some(BaselineSensitivity::new(1.0, 2.0, 3.0, 4.0).unwrap()),
        ..Default::default()
    };
    let s = toml::to_string(&config).unwrap();
    let back: SynthesisConfig = toml::from_str(&s).unwrap();
    assert_eq!(back, config);
}
