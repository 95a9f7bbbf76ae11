// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Handle (right ascension, declination) coordinates.
 */

use serde::{Deserialize, Serialize};

/// A struct containing a Right Ascension and Declination. All units are in
/// radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RADec {
    /// Right ascension \[radians\]
    pub ra: f64,
    /// Declination \[radians\]
    pub dec: f64,
}

impl RADec {
    /// Make a new `RADec` struct from values in radians.
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Make a new `RADec` struct from values in degrees.
    pub fn new_degrees(ra: f64, dec: f64) -> Self {
        Self::new(ra.to_radians(), dec.to_radians())
    }

    /// Get the (l,m) direction cosines of these coordinates relative to the
    /// `reference` position (orthographic/SIN projection).
    ///
    /// Derived using "Coordinate transformations" on page 388 of Synthesis
    /// Imaging in Radio Astronomy II.
    pub fn to_lm(&self, reference: RADec) -> (f64, f64) {
        let d_ra = self.ra - reference.ra;
        let (s_d_ra, c_d_ra) = d_ra.sin_cos();
        let (s_dec, c_dec) = self.dec.sin_cos();
        let (ref_s_dec, ref_c_dec) = reference.dec.sin_cos();
        (
            c_dec * s_d_ra,
            s_dec * ref_c_dec - c_dec * ref_s_dec * c_d_ra,
        )
    }

    /// The inverse of [`RADec::to_lm`]: the sky position at direction cosines
    /// (l,m) relative to `reference`. (l,m) must lie within the unit circle.
    pub fn from_lm(l: f64, m: f64, reference: RADec) -> RADec {
        let n = (1.0 - l * l - m * m).sqrt();
        let (ref_s_dec, ref_c_dec) = reference.dec.sin_cos();
        let dec = (m * ref_c_dec + n * ref_s_dec).asin();
        let ra = reference.ra + l.atan2(n * ref_c_dec - m * ref_s_dec);
        RADec { ra, dec }
    }
}

impl std::fmt::Display for RADec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}°, {}°)", self.ra.to_degrees(), self.dec.to_degrees())
    }
}
