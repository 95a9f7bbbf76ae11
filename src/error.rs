// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for visibility synthesis.
//!
//! Errors are either fatal to a whole batch (nothing can be computed, e.g.
//! [`SynthesisError::InvalidGeometry`]) or local to a single sample request
//! (e.g. [`SynthesisError::OutOfBandSample`]); local errors are reported next
//! to the results of their siblings.

use thiserror::Error;

use crate::coord::GeometryError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("Invalid image geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Movie frame {frame} has no timestamp; all frames of a multi-frame movie need one")]
    UntimedFrames { frame: usize },

    #[error("(u, v) = ({u}, {v}) λ is outside the representable band (|u| <= {u_max}, |v| <= {v_max})")]
    OutOfBandSample {
        u: f64,
        v: f64,
        u_max: f64,
        v_max: f64,
    },

    #[error("The visibility at (u, v) = ({u}, {v}) λ is not finite; are the image amplitudes pathological?")]
    NumericalOverflow { u: f64, v: f64 },

    #[error("Cancelled before this sample was computed")]
    Cancelled,
}

impl SynthesisError {
    /// Does this error only affect a single sample request?
    pub fn is_per_sample(&self) -> bool {
        matches!(
            self,
            SynthesisError::OutOfBandSample { .. }
                | SynthesisError::NumericalOverflow { .. }
                | SynthesisError::Cancelled
        )
    }
}
