// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Apodisation windows applied to images before they are Fourier
//! transformed.
//!
//! Windows are separable in x and y and are evaluated at pixel centres, i.e.
//! at `t = (i + 1/2) / N` for pixel `i` of an axis with `N` pixels, so they
//! never completely zero a pixel.


use log::{debug, warn};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{constants::PI, image::Image};

/// Flux rescaling factors further than this from 1 (either way) are reported.
const SUSPICIOUS_RESCALE: f64 = 1e3;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Taper {
    /// Leave the image untouched.
    #[default]
    None,

    /// `sin²(πt)`
    Hanning,

    /// `1 - (2t - 1)²`
    Welch,
}

impl Taper {
    /// The window value for pixel `i` of an axis with `n` pixels.
    pub fn weight(self, i: usize, n: usize) -> f64 {
        let t = (i as f64 + 0.5) / n as f64;
        match self {
            Taper::None => 1.0,
            Taper::Hanning => {
                let s = (PI * t).sin();
                s * s
            }
            Taper::Welch => {
                let x = 2.0 * t - 1.0;
                1.0 - x * x
            }
        }
    }

    /// The window along a single axis of `n` pixels.
    pub fn window_1d(self, n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |i| self.weight(i, n))
    }

    /// The 2D window for an image of shape `(ny, nx)`.
    pub fn window(self, shape: (usize, usize)) -> Array2<f64> {
        let (ny, nx) = shape;
        let wy = self.window_1d(ny);
        let wx = self.window_1d(nx);
        Array2::from_shape_fn(shape, |(iy, ix)| wy[iy] * wx[ix])
    }

    /// Apply this window to an image, returning a new image. The input is not
    /// modified.
    ///
    /// The tapered image is rescaled so its total flux matches that of the
    /// input; this keeps `V(0, 0)` equal to the untapered total flux. If the
    /// tapered total is zero or not finite, no rescaling is done.
    pub fn apply(self, image: &Image) -> Image {
        if self == Taper::None {
            return image.clone();
        }

        let data = image.data();
        let mut tapered = &data * &self.window(data.dim());
        let original_sum = data.sum();
        let tapered_sum = tapered.sum();
        if tapered_sum != 0.0 && tapered_sum.is_finite() && original_sum.is_finite() {
            let factor = original_sum / tapered_sum;
            debug!("{self} taper: rescaling tapered image by {factor}");
            if is_suspicious_rescale(factor) {
                warn!("{self} taper: the tapered image's flux nearly cancels; rescaling it by {factor} to restore {original_sum} Jy");
            }
            tapered.mapv_inplace(|v| v * factor);
        } else if original_sum != 0.0 {
            warn!("{self} taper: tapered image sums to {tapered_sum}; not rescaling its flux");
        }

        image.replace_data(tapered)
    }
}

/// Tapers weigh pixels by at most 1, so a positive image is rescaled by a
/// modest factor >= 1. Negative or huge factors mean signed pixels nearly
/// cancel.
fn is_suspicious_rescale(factor: f64) -> bool {
    !(1.0 / SUSPICIOUS_RESCALE..=SUSPICIOUS_RESCALE).contains(&factor)
}
