// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to evaluate the Fourier transform of an image at arbitrary (u,v).
//!
//! The convention used everywhere in `foci` is
//!
//! ```text
//! V(u, v) = Σ_{x,y} F[y, x] exp(-2πi (u l_x + v m_y))
//! ```
//!
//! where `F` holds the flux density of each pixel \[Jy\] (surface-brightness
//! images are multiplied by the pixel solid angle first), `(l_x, m_y)` are the
//! sky offsets of pixel centres from the reference pixel \[radians\] and
//! `(u, v)` are in wavelengths. Hence `V(0, 0)` is the total flux density of
//! the image, whatever the pixel scale, and a point source at `l > 0` has a
//! phase of `-2π u l`.
//!
//! Requests with `|u| > 1/(2Δx)` or `|v| > 1/(2Δy)` are out of band for both
//! strategies.

mod direct;
mod grid;

use std::num::NonZeroUsize;

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    c64, constants::DEFAULT_PADDING, coord::ImageGeometry, image::Image, math::is_finite_c64,
    SynthesisError,
};
use direct::DirectPlan;
use grid::GridPlan;

/// How visibilities are computed from an image.
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
pub enum Strategy {
    /// Fourier transform the (padded) image once, then interpolate each
    /// request from the regular frequency grid. Fast for many requests.
    #[default]
    GridInterp,

    /// Evaluate the Fourier sum directly for each request. Exact, but costs
    /// O(N²) per request.
    Direct,
}

/// How off-grid requests are interpolated from the frequency grid.
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
pub enum Interpolation {
    /// 2x2 lattice points.
    #[default]
    Bilinear,

    /// 4x4 lattice points, Keys cubic convolution.
    Cubic,
}

/// Options for the sampling kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelOptions {
    pub strategy: Strategy,

    /// Only used by [`Strategy::GridInterp`].
    pub interpolation: Interpolation,

    /// The factor by which images are zero padded before being Fourier
    /// transformed; refines the frequency grid without changing its band. Only
    /// used by [`Strategy::GridInterp`].
    pub padding: NonZeroUsize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        KernelOptions {
            strategy: Strategy::default(),
            interpolation: Interpolation::default(),
            padding: NonZeroUsize::new(DEFAULT_PADDING).expect("is not zero"),
        }
    }
}

enum PlanKind {
    Grid(GridPlan),
    Direct(DirectPlan),
}

/// Everything derived from an image that is needed to sample its Fourier
/// transform. Made once per image, then shared read-only by all workers.
pub struct TransformPlan {
    geometry: ImageGeometry,
    kind: PlanKind,
}

impl TransformPlan {
    /// Make a plan for an image. Any tapering must already have been applied.
    ///
    /// # Errors
    ///
    /// Fails with [`SynthesisError::InvalidGeometry`] if the padded grid would
    /// be too large to index.
    pub fn new(image: &Image, options: &KernelOptions) -> Result<TransformPlan, SynthesisError> {
        let geometry = *image.geometry();
        let flux = image.flux_per_pixel();
        let kind = match options.strategy {
            Strategy::GridInterp => {
                let plan = GridPlan::new(
                    flux.view(),
                    &geometry,
                    options.padding.get(),
                    options.interpolation,
                )?;
                debug!(
                    "Made a {} plan for a {}x{} image ({}x{} padded grid, {} interpolation)",
                    options.strategy,
                    geometry.x.len(),
                    geometry.y.len(),
                    plan.padded_shape().1,
                    plan.padded_shape().0,
                    options.interpolation
                );
                PlanKind::Grid(plan)
            }

            Strategy::Direct => {
                debug!(
                    "Made a {} plan for a {}x{} image",
                    options.strategy,
                    geometry.x.len(),
                    geometry.y.len(),
                );
                PlanKind::Direct(DirectPlan::new(flux.into_owned(), &geometry))
            }
        };

        Ok(TransformPlan { geometry, kind })
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn strategy(&self) -> Strategy {
        match self.kind {
            PlanKind::Grid(_) => Strategy::GridInterp,
            PlanKind::Direct(_) => Strategy::Direct,
        }
    }

    /// Evaluate the visibility at `(u, v)` \[wavelengths\].
    ///
    /// # Errors
    ///
    /// [`SynthesisError::OutOfBandSample`] if `(u, v)` is outside the band
    /// representable by the image's pixels, and
    /// [`SynthesisError::NumericalOverflow`] if the result is not finite.
    pub fn sample(&self, u: f64, v: f64) -> Result<c64, SynthesisError> {
        if !self.geometry.in_band(u, v) {
            let (u_max, v_max) = self.geometry.nyquist_uv();
            return Err(SynthesisError::OutOfBandSample { u, v, u_max, v_max });
        }

        let vis = match &self.kind {
            PlanKind::Grid(plan) => plan.sample(u, v),
            PlanKind::Direct(plan) => plan.sample(u, v),
        };
        if is_finite_c64(vis) {
            Ok(vis)
        } else {
            Err(SynthesisError::NumericalOverflow { u, v })
        }
    }
}
