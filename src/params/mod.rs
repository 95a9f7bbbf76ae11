// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that have been parsed and are ready to be used directly.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters are
//! validated by construction.

mod vis_synthesize;
#[cfg(test)]
mod tests;

pub(crate) use vis_synthesize::{VisOutputFormat, VisSynthesizeError, VisSynthesizeParams};

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_CHUNK_SIZE, DEFAULT_PADDING},
    noise::{BaselineSensitivity, NoiseModel},
    sampling::{Interpolation, KernelOptions, Strategy},
    taper::Taper,
};

/// Everything that controls how visibilities are synthesised. Any value that
/// can be represented is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SynthesisConfig {
    pub strategy: Strategy,

    /// Only used by the grid-interpolation strategy.
    pub interpolation: Interpolation,

    /// The factor by which images are zero padded before being Fourier
    /// transformed. Only used by the grid-interpolation strategy.
    pub padding: NonZeroUsize,

    pub taper: Taper,

    pub noise: NoiseModel,

    /// The number of sample requests handled as a single unit of work.
    /// Cancellation is checked between chunks.
    pub chunk_size: NonZeroUsize,

    /// The sensitivity used for requests that don't have their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sensitivity: Option<BaselineSensitivity>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            strategy: Strategy::default(),
            interpolation: Interpolation::default(),
            padding: NonZeroUsize::new(DEFAULT_PADDING).expect("is not zero"),
            taper: Taper::default(),
            noise: NoiseModel::default(),
            chunk_size: NonZeroUsize::new(DEFAULT_CHUNK_SIZE).expect("is not zero"),
            default_sensitivity: None,
        }
    }
}

impl SynthesisConfig {
    pub fn kernel_options(&self) -> KernelOptions {
        KernelOptions {
            strategy: self.strategy,
            interpolation: self.interpolation,
            padding: self.padding,
        }
    }
}
