// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `foci` should do as many
calculations as possible in double precision.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// One degree in \[radians\].
pub const DEG_TO_RAD: f64 = PI / 180.0;

/// One arcsecond in \[radians\].
pub const ARCSEC_TO_RAD: f64 = DEG_TO_RAD / 3600.0;

/// One milliarcsecond in \[radians\].
pub const MAS_TO_RAD: f64 = ARCSEC_TO_RAD / 1e3;

/// One microarcsecond in \[radians\]. EHT-style images are usually specified
/// with pixel scales of a few µas.
pub const UAS_TO_RAD: f64 = ARCSEC_TO_RAD / 1e6;

/// The default factor by which images are zero padded before being Fourier
/// transformed by the grid-interpolation strategy.
pub const DEFAULT_PADDING: usize = 2;

/// The default number of sample requests in a single work chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// The default quantisation/correlator efficiency applied to thermal noise
/// (2-bit sampling).
pub const DEFAULT_EFFICIENCY: f64 = 0.88;

/// The Keys cubic-convolution parameter used by cubic interpolation.
pub const KEYS_CUBIC_A: f64 = -0.5;
