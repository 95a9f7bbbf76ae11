// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The grid-interpolation strategy: FFT the zero-padded image once, then
//! interpolate requests from the regular frequency grid.

use std::sync::Arc;

use ndarray::{parallel::prelude::*, prelude::*};
use rustfft::{Fft, FftPlanner};

use super::Interpolation;
use crate::{
    c64,
    coord::{GeometryError, ImageGeometry},
    math::{cubic_weights, linear_weights, wrap_index},
};

pub(super) struct GridPlan {
    /// The 2D DFT of the padded image, indexed `[ky, kx]`. Entry `k` along an
    /// axis of `M` points holds the spatial frequency `k/(M·Δθ)` for
    /// `k < M/2`, and `(k - M)/(M·Δθ)` otherwise.
    grid: Array2<c64>,

    /// The padded fields of view `(Mx·Δx, My·Δy)` \[radians\]. Multiplying a
    /// spatial frequency by these gives a fractional grid index.
    padded_fov: (f64, f64),

    interpolation: Interpolation,
}

impl GridPlan {
    pub(super) fn new(
        flux: ArrayView2<f64>,
        geometry: &ImageGeometry,
        padding: usize,
        interpolation: Interpolation,
    ) -> Result<GridPlan, GeometryError> {
        let padded_len = |n: usize| {
            n.checked_mul(padding)
                .filter(|m| i64::try_from(*m).is_ok())
                .ok_or(GeometryError::PaddedTooLarge { n, padding })
        };
        let mx = padded_len(geometry.x.len())?;
        let my = padded_len(geometry.y.len())?;
        // The grid must be addressable in bytes, not just in elements.
        let too_large = mx
            .checked_mul(my)
            .and_then(|n| n.checked_mul(std::mem::size_of::<c64>()))
            .map_or(true, |bytes| bytes > isize::MAX as usize);
        if too_large {
            return Err(GeometryError::PaddedTooLarge {
                n: geometry.num_pixels(),
                padding: padding * padding,
            });
        }

        // Put the reference pixel at index [0, 0]; everything else wraps
        // around. The zeros between are the padding.
        let cx = geometry.x.reference_pixel() as i64;
        let cy = geometry.y.reference_pixel() as i64;
        let mut grid = Array2::zeros((my, mx));
        for ((iy, ix), &f) in flux.indexed_iter() {
            let gy = wrap_index(iy as i64 - cy, my);
            let gx = wrap_index(ix as i64 - cx, mx);
            grid[(gy, gx)] = c64::new(f, 0.0);
        }

        let mut planner = FftPlanner::new();
        fft2_inplace(
            grid.view_mut(),
            planner.plan_fft_forward(mx),
            planner.plan_fft_forward(my),
        );

        Ok(GridPlan {
            grid,
            padded_fov: (
                mx as f64 * geometry.x.scale(),
                my as f64 * geometry.y.scale(),
            ),
            interpolation,
        })
    }

    /// `(My, Mx)`
    pub(super) fn padded_shape(&self) -> (usize, usize) {
        self.grid.dim()
    }

    /// Interpolate the visibility at `(u, v)`. The caller has already checked
    /// that the point is in band.
    pub(super) fn sample(&self, u: f64, v: f64) -> c64 {
        let (my, mx) = self.grid.dim();
        let (y_start, y_weights) = self.stencil(v * self.padded_fov.1);
        let (x_start, x_weights) = self.stencil(u * self.padded_fov.0);

        let mut vis = c64::default();
        for (dy, &wy) in y_weights.iter().enumerate() {
            if wy == 0.0 {
                continue;
            }
            let gy = wrap_index(y_start + dy as i64, my);
            let row = self.grid.row(gy);
            let row_sum: c64 = x_weights
                .iter()
                .enumerate()
                .filter(|(_, wx)| **wx != 0.0)
                .map(|(dx, wx)| row[wrap_index(x_start + dx as i64, mx)] * *wx)
                .sum();
            vis += row_sum * wy;
        }
        vis
    }

    /// The first (unwrapped) lattice index and the weights of the lattice
    /// points used to interpolate at fractional index `q`.
    fn stencil(&self, q: f64) -> (i64, Stencil) {
        let lower = q.floor();
        let t = q - lower;
        let lower = lower as i64;
        match self.interpolation {
            Interpolation::Bilinear => (lower, Stencil::Two(linear_weights(t))),
            Interpolation::Cubic => (lower - 1, Stencil::Four(cubic_weights(t))),
        }
    }
}

enum Stencil {
    Two([f64; 2]),
    Four([f64; 4]),
}

impl Stencil {
    fn iter(&self) -> std::slice::Iter<f64> {
        match self {
            Stencil::Two(w) => w.iter(),
            Stencil::Four(w) => w.iter(),
        }
    }
}

/// Forward 2D FFT of a row-major array, in place: every row, then every
/// column. Rows and columns are each transformed in parallel.
fn fft2_inplace(
    mut grid: ArrayViewMut2<c64>,
    fft_x: Arc<dyn Fft<f64>>,
    fft_y: Arc<dyn Fft<f64>>,
) {
    grid.axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| match row.as_slice_mut() {
            Some(s) => fft_x.process(s),
            None => {
                let mut buffer = row.to_vec();
                fft_x.process(&mut buffer);
                row.iter_mut().zip(buffer).for_each(|(r, b)| *r = b);
            }
        });

    grid.axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(|mut column| {
            let mut buffer = column.to_vec();
            fft_y.process(&mut buffer);
            column.iter_mut().zip(buffer).for_each(|(c, b)| *c = b);
        });
}
