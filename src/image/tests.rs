// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;
use crate::constants::UAS_TO_RAD;

#[test]
fn test_new_image() {
    let image = Image::new(Array2::zeros((4, 8)), UAS_TO_RAD, FluxUnit::JyPerPixel).unwrap();
    assert_eq!(image.geometry().shape(), (4, 8));
    assert_eq!(image.geometry().x.len(), 8);
    assert_eq!(image.geometry().y.len(), 4);
    assert!(image.reference().is_none());
    assert!(image.timestamp().is_none());
    assert!(image.freq_hz().is_none());
}

#[test]
fn test_bad_images_are_rejected() {
    let result = Image::new(Array2::zeros((0, 4)), UAS_TO_RAD, FluxUnit::JyPerPixel);
    assert!(matches!(result, Err(GeometryError::ZeroPixels { .. })));

    let result = Image::new(Array2::zeros((4, 4)), 0.0, FluxUnit::JyPerPixel);
    assert!(matches!(result, Err(GeometryError::BadPixelScale { .. })));

    let geometry = ImageGeometry::square(4, 4, UAS_TO_RAD).unwrap();
    let result = Image::with_geometry(Array2::zeros((4, 5)), geometry, FluxUnit::JyPerPixel);
    assert_eq!(
        result.unwrap_err(),
        GeometryError::ShapeMismatch {
            expected: (4, 4),
            got: (4, 5)
        }
    );
}

#[test]
fn test_total_flux_jy_per_pixel() {
    let mut data = Array2::zeros((4, 4));
    data[(2, 2)] = 1.0;
    data[(0, 3)] = 0.25;
    let image = Image::new(data, UAS_TO_RAD, FluxUnit::JyPerPixel).unwrap();
    assert_abs_diff_eq!(image.total_flux(), 1.25);
    assert!(matches!(image.flux_per_pixel(), Cow::Borrowed(_)));
}

#[test]
fn test_total_flux_jy_per_steradian() {
    let scale = 2.0 * UAS_TO_RAD;
    let solid_angle = scale * scale;
    // 16 pixels, each holding 1 Jy.
    let data = Array2::from_elem((4, 4), 1.0 / solid_angle);
    let image = Image::new(data, scale, FluxUnit::JyPerSteradian).unwrap();
    assert_relative_eq!(image.total_flux(), 16.0, max_relative = 1e-12);
    let fpp = image.flux_per_pixel();
    for &v in fpp.iter() {
        assert_relative_eq!(v, 1.0, max_relative = 1e-12);
    }
}

#[test]
fn test_metadata_builders() {
    let epoch = Epoch::from_gpst_seconds(1_300_000_000.0);
    let reference = RADec::new_degrees(187.7059, 12.3911);
    let image = Image::new(Array2::zeros((3, 3)), UAS_TO_RAD, FluxUnit::JyPerPixel)
        .unwrap()
        .with_reference(reference)
        .with_timestamp(epoch)
        .with_freq(230e9);
    assert_eq!(image.reference(), Some(reference));
    assert_eq!(image.timestamp(), Some(epoch));
    assert_eq!(image.freq_hz(), Some(230e9));

    // The reference pixel is at the reference position.
    let radec = image.pixel_radec(1, 1).unwrap();
    assert_abs_diff_eq!(radec.ra, reference.ra, epsilon = 1e-15);
    assert_abs_diff_eq!(radec.dec, reference.dec, epsilon = 1e-15);
    // Increasing x increases RA.
    let radec = image.pixel_radec(2, 1).unwrap();
    assert!(radec.ra > reference.ra);

    // Replacing data keeps the metadata.
    let replaced = image.replace_data(Array2::ones((3, 3)));
    assert_eq!(replaced.reference(), Some(reference));
    assert_eq!(replaced.timestamp(), Some(epoch));
    assert_abs_diff_eq!(replaced.total_flux(), 9.0);
}

#[test]
fn test_flux_unit_strings() {
    assert_eq!(
        FluxUnit::from_str("jy-per-pixel").unwrap(),
        FluxUnit::JyPerPixel
    );
    assert_eq!(
        FluxUnit::from_str("jy-per-steradian").unwrap(),
        FluxUnit::JyPerSteradian
    );
    assert_eq!(FluxUnit::JyPerSteradian.to_string(), "jy-per-steradian");
    assert_eq!(FluxUnit::default(), FluxUnit::JyPerPixel);
}
