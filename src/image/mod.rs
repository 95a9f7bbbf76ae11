// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sky-brightness images handed to the synthesis engine.

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use hifitime::Epoch;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::coord::{GeometryError, ImageGeometry, RADec};

/// The flux-density convention of image pixel values.
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
pub enum FluxUnit {
    /// Each pixel holds the flux density within it \[Jy\].
    #[default]
    #[strum(serialize = "jy-per-pixel")]
    JyPerPixel,

    /// Each pixel holds a surface brightness \[Jy/sr\].
    #[strum(serialize = "jy-per-steradian")]
    JyPerSteradian,
}

/// A 2D image of real brightness values. The data are indexed `[y, x]`; rows
/// run along `m` and columns along `l`. Images are immutable once made.
///
/// Polarised models are handled as one `Image` per Stokes parameter.
#[derive(Debug, Clone)]
pub struct Image {
    data: Array2<f64>,
    geometry: ImageGeometry,
    unit: FluxUnit,

    /// The sky position of the reference pixel (index `[ny/2, nx/2]`).
    reference: Option<RADec>,

    /// When this image applies (e.g. a frame of a movie).
    timestamp: Option<Epoch>,

    /// The observing frequency this image was made for \[Hz\].
    freq_hz: Option<f64>,
}

impl Image {
    /// Make a new image with square pixels of `pixel_scale` \[radians\].
    pub fn new(data: Array2<f64>, pixel_scale: f64, unit: FluxUnit) -> Result<Image, GeometryError> {
        let (ny, nx) = data.dim();
        let geometry = ImageGeometry::square(nx, ny, pixel_scale)?;
        Image::with_geometry(data, geometry, unit)
    }

    /// Make a new image with an explicit geometry. The data's shape must be
    /// `(ny, nx)`.
    pub fn with_geometry(
        data: Array2<f64>,
        geometry: ImageGeometry,
        unit: FluxUnit,
    ) -> Result<Image, GeometryError> {
        if data.dim() != geometry.shape() {
            return Err(GeometryError::ShapeMismatch {
                expected: geometry.shape(),
                got: data.dim(),
            });
        }
        Ok(Image {
            data,
            geometry,
            unit,
            reference: None,
            timestamp: None,
            freq_hz: None,
        })
    }

    pub fn with_reference(mut self, reference: RADec) -> Image {
        self.reference = Some(reference);
        self
    }

    pub fn with_timestamp(mut self, timestamp: Epoch) -> Image {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_freq(mut self, freq_hz: f64) -> Image {
        self.freq_hz = Some(freq_hz);
        self
    }

    /// A new image with the same metadata as this one, but different data. The
    /// shapes must match.
    pub(crate) fn replace_data(&self, data: Array2<f64>) -> Image {
        assert_eq!(
            data.dim(),
            self.data.dim(),
            "replacement data has a different shape"
        );
        Image {
            data,
            geometry: self.geometry,
            unit: self.unit,
            reference: self.reference,
            timestamp: self.timestamp,
            freq_hz: self.freq_hz,
        }
    }

    pub fn data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn unit(&self) -> FluxUnit {
        self.unit
    }

    pub fn reference(&self) -> Option<RADec> {
        self.reference
    }

    pub fn timestamp(&self) -> Option<Epoch> {
        self.timestamp
    }

    pub fn freq_hz(&self) -> Option<f64> {
        self.freq_hz
    }

    /// The flux density contained in each pixel \[Jy\]. Surface-brightness
    /// images are multiplied by the pixel solid angle.
    pub fn flux_per_pixel(&self) -> Cow<Array2<f64>> {
        match self.unit {
            FluxUnit::JyPerPixel => Cow::Borrowed(&self.data),
            FluxUnit::JyPerSteradian => {
                Cow::Owned(&self.data * self.geometry.pixel_solid_angle())
            }
        }
    }

    /// The total flux density of the image \[Jy\].
    pub fn total_flux(&self) -> f64 {
        match self.unit {
            FluxUnit::JyPerPixel => self.data.sum(),
            FluxUnit::JyPerSteradian => self.data.sum() * self.geometry.pixel_solid_angle(),
        }
    }

    /// The sky position of a pixel, if this image has a reference position.
    pub fn pixel_radec(&self, ix: usize, iy: usize) -> Option<RADec> {
        self.reference.map(|reference| {
            let (l, m) = self.geometry.pixel_to_lm(ix as f64, iy as f64);
            RADec::from_lm(l, m, reference)
        })
    }
}
