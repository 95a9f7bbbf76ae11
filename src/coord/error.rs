// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from malformed grid or image geometry.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("The {axis} axis has no pixels; at least one is required")]
    ZeroPixels { axis: &'static str },

    #[error("The {axis} pixel scale must be finite and positive, but got {scale} radians")]
    BadPixelScale { axis: &'static str, scale: f64 },

    #[error("Image data has shape {got:?} ([y, x]), but the geometry expects {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("A grid of {n} pixels padded by a factor of {padding} is too large")]
    PaddedTooLarge { n: usize, padding: usize },
}
