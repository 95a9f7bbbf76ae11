// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

fn sensitivity() -> BaselineSensitivity {
    BaselineSensitivity::with_efficiency(1000.0, 1000.0, 2e9, 10.0, 1.0).unwrap()
}

#[test]
fn test_radiometer_sigma() {
    // sqrt(1e6 / (2 * 2e9 * 10)) = 0.005
    assert_abs_diff_eq!(sensitivity().sigma(), 0.005, epsilon = 1e-15);

    let s = BaselineSensitivity::new(1000.0, 1000.0, 2e9, 10.0).unwrap();
    assert_abs_diff_eq!(s.efficiency(), DEFAULT_EFFICIENCY);
    assert_abs_diff_eq!(s.sigma(), 0.005 / 0.88, epsilon = 1e-15);

    let s = BaselineSensitivity::with_efficiency(4000.0, 100.0, 1e6, 2.0, 0.5).unwrap();
    assert_abs_diff_eq!(
        s.sigma(),
        (4000.0_f64 * 100.0 / (2.0 * 1e6 * 2.0)).sqrt() / 0.5,
        epsilon = 1e-15
    );
    assert_eq!(s.sefds(), [4000.0, 100.0]);
    assert_abs_diff_eq!(s.bandwidth(), 1e6);
    assert_abs_diff_eq!(s.integration_time(), 2.0);
}

#[test]
fn test_bad_sensitivities() {
    assert!(matches!(
        BaselineSensitivity::new(-1.0, 10.0, 1e6, 1.0),
        Err(NoiseError::BadSefd { .. })
    ));
    assert!(matches!(
        BaselineSensitivity::new(10.0, f64::NAN, 1e6, 1.0),
        Err(NoiseError::BadSefd { .. })
    ));
    assert!(matches!(
        BaselineSensitivity::new(10.0, 10.0, 0.0, 1.0),
        Err(NoiseError::BadBandwidth { .. })
    ));
    assert!(matches!(
        BaselineSensitivity::new(10.0, 10.0, 1e6, -1.0),
        Err(NoiseError::BadIntegrationTime { .. })
    ));
    for efficiency in [0.0, 1.5, f64::NAN] {
        assert!(matches!(
            BaselineSensitivity::with_efficiency(10.0, 10.0, 1e6, 1.0, efficiency),
            Err(NoiseError::BadEfficiency { .. })
        ));
    }
    assert!(matches!(
        BaselineSensitivity::new(1e300, 1e300, 1e-300, 1e-300),
        Err(NoiseError::NonFiniteSigma { .. })
    ));
}

#[test]
fn test_tiny_sigma_is_rejected() {
    // σ ≈ 1.1e-160 Jy, so 1/σ² would be infinite.
    let result = BaselineSensitivity::new(1e-160, 1e-160, 0.5, 1.0);
    assert!(
        matches!(result, Err(NoiseError::TinySigma { .. })),
        "{result:?}"
    );

    // The smallest noise levels that are allowed give finite weights.
    let s = BaselineSensitivity::new(1e-150, 1e-150, 0.5, 1.0).unwrap();
    assert!(s.sigma() > 0.0);
    let vis = NoiseModel::Seeded(7).apply(c64::new(1.0, 0.0), Some(&s), 0, 0);
    let weight = vis.weight.unwrap();
    assert!(weight.is_finite() && weight > 0.0, "{weight}");

    // Zero noise is still fine.
    let zero = BaselineSensitivity::new(0.0, 1e-160, 0.5, 1.0).unwrap();
    assert_eq!(zero.sigma(), 0.0);
}

#[test]
fn test_noiseless_modes_are_exact() {
    let vis = c64::new(1.25, -0.5);
    let zero = BaselineSensitivity::new(0.0, 1000.0, 1e9, 1.0).unwrap();

    for (model, s) in [
        (NoiseModel::Disabled, Some(sensitivity())),
        (NoiseModel::Disabled, None),
        (NoiseModel::Seeded(1), None),
        (NoiseModel::Seeded(1), Some(zero)),
    ] {
        let result = model.apply(vis, s.as_ref(), 0, 3);
        assert_eq!(result.vis, vis);
        assert_eq!(result.sigma, 0.0);
        assert_eq!(result.weight, None);
    }
}

#[test]
fn test_seeded_noise_is_deterministic() {
    let vis = c64::new(2.0, 0.0);
    let s = sensitivity();
    let model = NoiseModel::Seeded(42);

    let a = model.apply(vis, Some(&s), 0, 17);
    let b = model.apply(vis, Some(&s), 0, 17);
    assert_eq!(a, b);
    assert_ne!(a.vis, vis);
    assert_abs_diff_eq!(a.sigma, 0.005);
    assert_abs_diff_eq!(a.weight.unwrap(), 1.0 / 0.005 / 0.005, epsilon = 1e-6);

    // Different requests, frames and seeds get different noise.
    assert_ne!(a.vis, model.apply(vis, Some(&s), 0, 18).vis);
    assert_ne!(a.vis, model.apply(vis, Some(&s), 1, 17).vis);
    assert_ne!(a.vis, NoiseModel::Seeded(43).apply(vis, Some(&s), 0, 17).vis);
}

#[test]
fn test_noise_statistics() {
    let s = BaselineSensitivity::with_efficiency(1.0, 1.0, 0.5, 1.0, 1.0).unwrap();
    // sqrt(1 / (2 * 0.5 * 1)) = 1
    assert_abs_diff_eq!(s.sigma(), 1.0);

    let model = NoiseModel::Seeded(1234);
    let n = 20000;
    let draws: Vec<c64> = (0..n)
        .map(|i| model.apply(c64::default(), Some(&s), 0, i).vis)
        .collect();
    let n = n as f64;

    let mean_re = draws.iter().map(|d| d.re).sum::<f64>() / n;
    let mean_im = draws.iter().map(|d| d.im).sum::<f64>() / n;
    assert_abs_diff_eq!(mean_re, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(mean_im, 0.0, epsilon = 0.05);

    let var_re = draws.iter().map(|d| (d.re - mean_re).powi(2)).sum::<f64>() / n;
    let var_im = draws.iter().map(|d| (d.im - mean_im).powi(2)).sum::<f64>() / n;
    assert_abs_diff_eq!(var_re.sqrt(), 1.0, epsilon = 0.03);
    assert_abs_diff_eq!(var_im.sqrt(), 1.0, epsilon = 0.03);

    // The real and imaginary parts are independent.
    let covariance = draws
        .iter()
        .map(|d| (d.re - mean_re) * (d.im - mean_im))
        .sum::<f64>()
        / n;
    assert_abs_diff_eq!(covariance, 0.0, epsilon = 0.05);
}

#[test]
fn test_sensitivity_serde() {
    let s: BaselineSensitivity = toml::from_str(
        r#"
sefd1 = 1000.0
sefd2 = 1000.0
bandwidth = 2e9
integration-time = 10.0
"#,
    )
    .unwrap();
    assert_eq!(s, BaselineSensitivity::new(1000.0, 1000.0, 2e9, 10.0).unwrap());

    let json = serde_json::to_string(&sensitivity()).unwrap();
    let back: BaselineSensitivity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sensitivity());

    let result: Result<BaselineSensitivity, _> = serde_json::from_str(
        r#"{"sefd1": 1.0, "sefd2": 1.0, "bandwidth": -5.0, "integration-time": 1.0}"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_noise_model_serde() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        noise: NoiseModel,
    }

    let w: Wrapper = toml::from_str("noise = \"disabled\"").unwrap();
    assert_eq!(w.noise, NoiseModel::Disabled);
    let w: Wrapper = toml::from_str("noise = { seeded = 42 }").unwrap();
    assert_eq!(w.noise, NoiseModel::Seeded(42));
    let w: Wrapper = serde_json::from_str(r#"{"noise": {"seeded": 7}}"#).unwrap();
    assert_eq!(w.noise, NoiseModel::Seeded(7));
}
