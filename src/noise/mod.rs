// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Thermal noise and visibility weights.
//!
//! The noise on each of the real and imaginary parts of a visibility is
//! Gaussian with the radiometer standard deviation
//!
//! ```text
//! σ = sqrt(SEFD₁ SEFD₂ / (2 Δν τ)) / η
//! ```
//!
//! where `Δν` is the bandwidth \[Hz\], `τ` the integration time \[s\] and `η`
//! the quantisation/correlator efficiency. Weights are `1/σ²`.

mod error;
#[cfg(test)]
mod tests;

pub use error::NoiseError;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{c64, constants::DEFAULT_EFFICIENCY, math::splitmix64, synthesize::Visibility};

/// The smallest non-zero thermal noise \[Jy\]; `1/σ²` overflows below it.
const MIN_SIGMA: f64 = 1.4916681462400413e-154;

/// The sensitivity of a single baseline, as supplied by observation metadata.
/// Always valid; see [`BaselineSensitivity::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SensitivityFields", into = "SensitivityFields")]
pub struct BaselineSensitivity {
    sefds: [f64; 2],
    bandwidth: f64,
    integration_time: f64,
    efficiency: f64,
}

impl BaselineSensitivity {
    /// Make a new sensitivity with the default efficiency (2-bit sampling).
    ///
    /// `sefd1` and `sefd2` are the system-equivalent flux densities of the two
    /// stations \[Jy\], `bandwidth` is in \[Hz\] and `integration_time` in
    /// \[seconds\].
    pub fn new(
        sefd1: f64,
        sefd2: f64,
        bandwidth: f64,
        integration_time: f64,
    ) -> Result<BaselineSensitivity, NoiseError> {
        BaselineSensitivity::with_efficiency(
            sefd1,
            sefd2,
            bandwidth,
            integration_time,
            DEFAULT_EFFICIENCY,
        )
    }

    pub fn with_efficiency(
        sefd1: f64,
        sefd2: f64,
        bandwidth: f64,
        integration_time: f64,
        efficiency: f64,
    ) -> Result<BaselineSensitivity, NoiseError> {
        for sefd in [sefd1, sefd2] {
            if !sefd.is_finite() || sefd < 0.0 {
                return Err(NoiseError::BadSefd { sefd });
            }
        }
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(NoiseError::BadBandwidth { bandwidth });
        }
        if !integration_time.is_finite() || integration_time <= 0.0 {
            return Err(NoiseError::BadIntegrationTime {
                time: integration_time,
            });
        }
        if !(efficiency > 0.0 && efficiency <= 1.0) {
            return Err(NoiseError::BadEfficiency { efficiency });
        }

        let s = BaselineSensitivity {
            sefds: [sefd1, sefd2],
            bandwidth,
            integration_time,
            efficiency,
        };
        let sigma = s.sigma();
        if !sigma.is_finite() {
            return Err(NoiseError::NonFiniteSigma { sigma });
        }
        // Weights are 1/σ², which must also be finite.
        if sigma > 0.0 && sigma < MIN_SIGMA {
            return Err(NoiseError::TinySigma { sigma });
        }
        Ok(s)
    }

    pub fn sefds(&self) -> [f64; 2] {
        self.sefds
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn integration_time(&self) -> f64 {
        self.integration_time
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// The thermal noise on each of the real and imaginary components of a
    /// visibility \[Jy\].
    pub fn sigma(&self) -> f64 {
        let [s1, s2] = self.sefds;
        (s1 * s2 / (2.0 * self.bandwidth * self.integration_time)).sqrt() / self.efficiency
    }
}

/// The (de)serialised form of a [`BaselineSensitivity`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SensitivityFields {
    sefd1: f64,
    sefd2: f64,
    /// \[Hz\]
    bandwidth: f64,
    /// \[seconds\]
    integration_time: f64,
    #[serde(default = "default_efficiency")]
    efficiency: f64,
}

fn default_efficiency() -> f64 {
    DEFAULT_EFFICIENCY
}

impl TryFrom<SensitivityFields> for BaselineSensitivity {
    type Error = NoiseError;

    fn try_from(f: SensitivityFields) -> Result<Self, Self::Error> {
        BaselineSensitivity::with_efficiency(
            f.sefd1,
            f.sefd2,
            f.bandwidth,
            f.integration_time,
            f.efficiency,
        )
    }
}

impl From<BaselineSensitivity> for SensitivityFields {
    fn from(s: BaselineSensitivity) -> Self {
        SensitivityFields {
            sefd1: s.sefds[0],
            sefd2: s.sefds[1],
            bandwidth: s.bandwidth,
            integration_time: s.integration_time,
            efficiency: s.efficiency,
        }
    }
}

/// Whether (and how) thermal noise is added to visibilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseModel {
    /// Visibilities are exactly the kernel output, with no uncertainty.
    #[default]
    Disabled,

    /// Gaussian noise is drawn from generators derived from this seed.
    Seeded(u64),
}

impl NoiseModel {
    /// Attach an uncertainty to a noiseless visibility and perturb it.
    ///
    /// The random numbers used for a request depend only on the seed, `frame`
    /// and `request_index`, so the same inputs always give the same
    /// visibility regardless of how requests are chunked or scheduled.
    ///
    /// Without a sensitivity, or with a zero noise level, the visibility is
    /// returned untouched with `sigma = 0` and no weight.
    pub fn apply(
        &self,
        vis: c64,
        sensitivity: Option<&BaselineSensitivity>,
        frame: usize,
        request_index: usize,
    ) -> Visibility {
        let (seed, sigma) = match (self, sensitivity.map(|s| s.sigma())) {
            (NoiseModel::Seeded(seed), Some(sigma)) if sigma > 0.0 => (*seed, sigma),
            _ => return Visibility::noiseless(vis),
        };

        let mut rng = StdRng::seed_from_u64(request_seed(seed, frame, request_index));
        let normal = Normal::new(0.0, sigma).expect("sigma is finite and positive");
        let noise = c64::new(rng.sample(normal), rng.sample(normal));
        Visibility {
            vis: vis + noise,
            sigma,
            weight: Some(1.0 / (sigma * sigma)),
        }
    }
}

/// Combine a user seed with a frame and request index into an independent
/// generator seed.
fn request_seed(seed: u64, frame: usize, request_index: usize) -> u64 {
    splitmix64(splitmix64(splitmix64(seed) ^ frame as u64) ^ request_index as u64)
}
