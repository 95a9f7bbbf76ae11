// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::constants::{FRAC_PI_2, PI};

#[test]
fn test_cexp() {
    assert_abs_diff_eq!(cexp(0.0), c64::new(1.0, 0.0));
    assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0), epsilon = 1e-15);
    assert_abs_diff_eq!(cexp(FRAC_PI_2), c64::new(0.0, 1.0), epsilon = 1e-15);
    assert_abs_diff_eq!(cexp(-FRAC_PI_2), c64::new(0.0, -1.0), epsilon = 1e-15);
}

#[test]
fn test_wrap_index() {
    assert_eq!(wrap_index(0, 8), 0);
    assert_eq!(wrap_index(7, 8), 7);
    assert_eq!(wrap_index(8, 8), 0);
    assert_eq!(wrap_index(-1, 8), 7);
    assert_eq!(wrap_index(-4, 8), 4);
    assert_eq!(wrap_index(-9, 8), 7);
}

#[test]
fn test_splitmix64_is_not_identity() {
    assert_ne!(splitmix64(0), 0);
    assert_ne!(splitmix64(1), splitmix64(2));
    // Deterministic.
    assert_eq!(splitmix64(12345), splitmix64(12345));
}

#[test]
fn test_interpolation_weights_sum_to_one() {
    for i in 0..100 {
        let t = i as f64 / 100.0;
        let l = linear_weights(t);
        assert_abs_diff_eq!(l[0] + l[1], 1.0, epsilon = 1e-15);
        let c = cubic_weights(t);
        assert_abs_diff_eq!(c.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
    }
}

#[test]
fn test_cubic_weights_interpolate_lattice_points() {
    let c = cubic_weights(0.0);
    assert_abs_diff_eq!(c[0], 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(c[1], 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(c[2], 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(c[3], 0.0, epsilon = 1e-15);

    // Symmetric about the half-way point.
    let c = cubic_weights(0.5);
    assert_abs_diff_eq!(c[0], c[3], epsilon = 1e-15);
    assert_abs_diff_eq!(c[1], c[2], epsilon = 1e-15);
}
