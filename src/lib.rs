// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Fast Operations for Computational Interferometry.

`foci` synthesises interferometric visibilities from sky-brightness images:
an [`Image`] is tapered, Fourier transformed by a [`TransformPlan`] and sampled
at the (u,v) of each [`SampleRequest`], optionally with thermal noise. See
[`Synthesizer`] for the entry point.
 */

mod cli;
pub mod constants;
pub mod coord;
mod error;
pub mod image;
pub(crate) mod math;
pub mod noise;
pub(crate) mod params;
pub mod sampling;
pub mod synthesize;
pub mod taper;
pub mod unit_parsing;

use crossbeam_utils::atomic::AtomicCell;

// Re-exports.
pub use cli::{Foci, FociError};
pub use coord::{GeometryError, ImageGeometry, RADec};
pub use error::SynthesisError;
pub use image::{FluxUnit, Image};
pub use noise::{BaselineSensitivity, NoiseError, NoiseModel};
pub use params::SynthesisConfig;
pub use sampling::{Interpolation, Strategy, TransformPlan};
pub use synthesize::{
    CancelToken, SampleOutcome, SampleRequest, SynthesisSummary, SynthesizedChunk, Synthesizer,
    Visibility,
};
pub use taper::Taper;

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;

/// Should progress bars be drawn? Only the binary turns these on.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
