// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

#[cfg(test)]
mod tests;

use crate::{c64, constants::KEYS_CUBIC_A};

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// Are both components of the complex number finite?
#[inline]
pub(crate) fn is_finite_c64(c: c64) -> bool {
    c.re.is_finite() && c.im.is_finite()
}

/// Index `i` wrapped into `[0, n)`. `n` must be non-zero.
#[inline]
pub(crate) fn wrap_index(i: i64, n: usize) -> usize {
    i.rem_euclid(n as i64) as usize
}

/// The SplitMix64 finaliser. Used to turn structured seeds (e.g. a user seed
/// combined with a request index) into well-mixed 64-bit seeds.
#[inline]
pub(crate) fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Linear-interpolation weights for the two lattice points surrounding a
/// sample at fractional offset `t` (in `[0, 1)`) from the lower point.
#[inline]
pub(crate) fn linear_weights(t: f64) -> [f64; 2] {
    [1.0 - t, t]
}

/// Keys cubic-convolution weights for the four lattice points `-1, 0, 1, 2`
/// surrounding a sample at fractional offset `t` (in `[0, 1)`) from point 0.
/// The weights always sum to 1.
#[inline]
pub(crate) fn cubic_weights(t: f64) -> [f64; 4] {
    let a = KEYS_CUBIC_A;
    // |x| <= 1
    let near = |x: f64| ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0;
    // 1 < |x| < 2
    let far = |x: f64| ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a;
    [far(1.0 + t), near(t), near(1.0 - t), far(2.0 - t)]
}
