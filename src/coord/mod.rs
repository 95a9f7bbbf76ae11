// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversions between pixel indices, sky-offset angles and spatial
//! frequencies.
//!
//! Each image axis is a [`GridAxis`]: `N` pixels of angular width `Δθ`
//! \[radians\]. The reference pixel of an axis is the pixel with index `N/2`
//! (integer division); its centre is at angle 0. The discrete spatial-frequency
//! axis conjugate to a grid axis is `k = n/(N·Δθ)` \[cycles/radian, i.e.
//! wavelengths\] for integer `n`.

mod error;
mod radec;

pub use error::GeometryError;
pub use radec::RADec;

use crate::constants::VEL_C;

/// A single regularly-sampled image axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    /// The number of pixels along this axis.
    n: usize,

    /// The angular width of a pixel \[radians\].
    scale: f64,
}

impl GridAxis {
    /// Make a new grid axis. The number of pixels must be positive and the
    /// pixel scale must be finite and positive.
    pub fn new(n: usize, scale: f64) -> Result<GridAxis, GeometryError> {
        GridAxis::new_named("grid", n, scale)
    }

    pub(crate) fn new_named(
        axis: &'static str,
        n: usize,
        scale: f64,
    ) -> Result<GridAxis, GeometryError> {
        if n == 0 {
            return Err(GeometryError::ZeroPixels { axis });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::BadPixelScale { axis, scale });
        }
        Ok(GridAxis { n, scale })
    }

    /// The number of pixels along this axis.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Axes always have at least one pixel; this is here to keep clippy happy.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The angular width of a pixel \[radians\].
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The index of the pixel whose centre is at angle 0.
    pub fn reference_pixel(&self) -> usize {
        self.n / 2
    }

    /// The angular extent of the whole axis \[radians\].
    pub fn field_of_view(&self) -> f64 {
        self.n as f64 * self.scale
    }

    /// Convert a (possibly fractional) pixel index into an angular offset from
    /// the reference pixel \[radians\].
    pub fn pixel_to_angle(&self, pixel: f64) -> f64 {
        (pixel - self.reference_pixel() as f64) * self.scale
    }

    /// Convert an angular offset from the reference pixel \[radians\] into a
    /// (possibly fractional) pixel index.
    pub fn angle_to_pixel(&self, angle: f64) -> f64 {
        angle / self.scale + self.reference_pixel() as f64
    }

    /// The angular offsets of every pixel centre on this axis \[radians\].
    pub fn pixel_angles(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.pixel_to_angle(i as f64)).collect()
    }

    /// The spacing of the discrete spatial-frequency axis conjugate to this
    /// axis \[wavelengths\].
    pub fn freq_res(&self) -> f64 {
        1.0 / self.field_of_view()
    }

    /// Convert a (possibly fractional) discrete-frequency index into a spatial
    /// frequency \[wavelengths\].
    pub fn freq_index_to_freq(&self, k: f64) -> f64 {
        k * self.freq_res()
    }

    /// Convert a spatial frequency \[wavelengths\] into a (possibly
    /// fractional) discrete-frequency index.
    pub fn freq_to_freq_index(&self, freq: f64) -> f64 {
        freq * self.field_of_view()
    }

    /// The discrete spatial frequencies representable by this axis, in
    /// ascending order: `n/(N·Δθ)` for `n` in `[-N/2, N - N/2)`. For even `N`
    /// this is `[-N/2, N/2)`.
    pub fn freq_axis(&self) -> Vec<f64> {
        let half = (self.n / 2) as i64;
        (-half..self.n as i64 - half)
            .map(|k| self.freq_index_to_freq(k as f64))
            .collect()
    }

    /// The largest spatial frequency that can be represented by this axis
    /// \[wavelengths\]. This is `1/(2Δθ)`.
    pub fn nyquist(&self) -> f64 {
        0.5 / self.scale
    }

    /// Is the spatial frequency within the band `[-1/(2Δθ), 1/(2Δθ)]`?
    /// Non-finite frequencies are never in band.
    pub fn in_band(&self, freq: f64) -> bool {
        freq.abs() <= self.nyquist()
    }
}

/// The conjugate scale of a grid with `n` pixels of width `scale`: `1/(n ·
/// scale)`. Applied to a pixel scale \[radians\] this yields the
/// spatial-frequency resolution \[wavelengths\] and vice versa, so applying
/// it twice recovers the input.
pub fn conjugate_scale(scale: f64, n: usize) -> Result<f64, GeometryError> {
    GridAxis::new(n, scale).map(|a| a.freq_res())
}

/// Convert a baseline length \[metres\] to \[wavelengths\] at the given
/// frequency \[Hz\].
pub fn metres_to_wavelengths(metres: f64, freq_hz: f64) -> f64 {
    metres * freq_hz / VEL_C
}

/// Convert a baseline length \[wavelengths\] to \[metres\] at the given
/// frequency \[Hz\].
pub fn wavelengths_to_metres(wavelengths: f64, freq_hz: f64) -> f64 {
    wavelengths * VEL_C / freq_hz
}

/// The geometry of a 2D image: an x axis (columns, increasing `l`) and a y axis
/// (rows, increasing `m`). Image arrays are indexed `[y, x]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    pub x: GridAxis,
    pub y: GridAxis,
}

impl ImageGeometry {
    /// Make a new image geometry with `nx` columns of width `dx` and `ny`
    /// rows of height `dy` (both \[radians\]).
    pub fn new(nx: usize, ny: usize, dx: f64, dy: f64) -> Result<ImageGeometry, GeometryError> {
        Ok(ImageGeometry {
            x: GridAxis::new_named("x", nx, dx)?,
            y: GridAxis::new_named("y", ny, dy)?,
        })
    }

    /// Make a new square-pixel geometry.
    pub fn square(nx: usize, ny: usize, scale: f64) -> Result<ImageGeometry, GeometryError> {
        ImageGeometry::new(nx, ny, scale, scale)
    }

    /// The shape of image arrays with this geometry, `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    pub fn num_pixels(&self) -> usize {
        self.x.len() * self.y.len()
    }

    /// The solid angle of a single pixel \[steradians\] (small-angle
    /// approximation).
    pub fn pixel_solid_angle(&self) -> f64 {
        self.x.scale() * self.y.scale()
    }

    /// Convert (possibly fractional) pixel indices into sky offsets `(l, m)`
    /// \[radians\].
    pub fn pixel_to_lm(&self, ix: f64, iy: f64) -> (f64, f64) {
        (self.x.pixel_to_angle(ix), self.y.pixel_to_angle(iy))
    }

    /// Convert sky offsets `(l, m)` \[radians\] into (possibly fractional)
    /// pixel indices `(ix, iy)`.
    pub fn lm_to_pixel(&self, l: f64, m: f64) -> (f64, f64) {
        (self.x.angle_to_pixel(l), self.y.angle_to_pixel(m))
    }

    /// The largest representable `(u, v)` \[wavelengths\].
    pub fn nyquist_uv(&self) -> (f64, f64) {
        (self.x.nyquist(), self.y.nyquist())
    }

    /// Is `(u, v)` inside the representable band?
    pub fn in_band(&self, u: f64, v: f64) -> bool {
        self.x.in_band(u) && self.y.in_band(v)
    }
}
