// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The direct strategy: evaluate the Fourier sum for every request.

use ndarray::prelude::*;

use crate::{c64, constants::TAU, coord::ImageGeometry, math::cexp};

pub(super) struct DirectPlan {
    /// Flux density per pixel \[Jy\], indexed `[y, x]`.
    flux: Array2<f64>,

    /// `-2π l` for each column.
    ls: Vec<f64>,

    /// `-2π m` for each row.
    ms: Vec<f64>,
}

impl DirectPlan {
    pub(super) fn new(flux: Array2<f64>, geometry: &ImageGeometry) -> DirectPlan {
        let scale = |angles: Vec<f64>| -> Vec<f64> { angles.into_iter().map(|a| -TAU * a).collect() };
        DirectPlan {
            flux,
            ls: scale(geometry.x.pixel_angles()),
            ms: scale(geometry.y.pixel_angles()),
        }
    }

    /// The exponential is separable, so each row is summed with the x phasors
    /// before being multiplied by its single y phasor.
    pub(super) fn sample(&self, u: f64, v: f64) -> c64 {
        let x_phasors: Vec<c64> = self.ls.iter().map(|&l| cexp(u * l)).collect();

        self.flux
            .outer_iter()
            .zip(self.ms.iter())
            .map(|(row, &m)| {
                let row_sum: c64 = row
                    .iter()
                    .zip(x_phasors.iter())
                    .map(|(&f, &phasor)| phasor * f)
                    .sum();
                row_sum * cexp(v * m)
            })
            .sum()
    }
}
