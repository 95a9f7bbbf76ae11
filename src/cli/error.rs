// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all errors from the `foci` binary. This should be the *only*
//! binary error enum that is publicly visible.

use thiserror::Error;

use super::vis_synthesize::{JobError, VisSynthesizeArgsError};
use crate::{params::VisSynthesizeError, unit_parsing::UnitParseError, SynthesisError};

const URL: &str = "https://github.com/focisrc/foci";

/// The *only* publicly visible error from the `foci` binary. Each error message
/// should include the URL, unless it's "generic".
#[derive(Error, Debug)]
pub enum FociError {
    /// An error related to vis-synthesize.
    #[error("{0}\n\nSee for more info: {URL}#vis-synthesize")]
    VisSynthesize(String),

    /// An error related to job files.
    #[error("{0}\n\nSee for more info: {URL}#job-files")]
    Job(String),

    /// An error related to argument files.
    #[error("{0}\n\nSee for more info: {URL}#argument-files")]
    ArgFile(String),

    /// An error related to quantities with units (e.g. "1uas").
    #[error("{0}\n\nSee for more info: {URL}#units")]
    Units(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<VisSynthesizeArgsError> for FociError {
    fn from(e: VisSynthesizeArgsError) -> Self {
        match e {
            VisSynthesizeArgsError::NoJob
            | VisSynthesizeArgsError::BadStrategy(_)
            | VisSynthesizeArgsError::BadInterpolation(_)
            | VisSynthesizeArgsError::BadTaper(_)
            | VisSynthesizeArgsError::ZeroPadding
            | VisSynthesizeArgsError::ZeroChunkSize
            | VisSynthesizeArgsError::BadSefds { .. }
            | VisSynthesizeArgsError::IncompleteSensitivity
            | VisSynthesizeArgsError::BadOutputExtension(_)
            | VisSynthesizeArgsError::Noise(_) => Self::VisSynthesize(e.to_string()),
            VisSynthesizeArgsError::Job(e) => Self::from(e),
            VisSynthesizeArgsError::UnitParse(e) => Self::from(e),
        }
    }
}

impl From<JobError> for FociError {
    fn from(e: JobError) -> Self {
        let s = e.to_string();
        match e {
            JobError::UnitParse(_) => Self::Units(s),
            JobError::IO(_) => Self::Generic(s),
            _ => Self::Job(s),
        }
    }
}

impl From<VisSynthesizeError> for FociError {
    fn from(e: VisSynthesizeError) -> Self {
        match e {
            VisSynthesizeError::Synthesis(e) => Self::from(e),
            VisSynthesizeError::Json(_) | VisSynthesizeError::IO(_) => Self::Generic(e.to_string()),
        }
    }
}

impl From<SynthesisError> for FociError {
    fn from(e: SynthesisError) -> Self {
        Self::VisSynthesize(e.to_string())
    }
}

impl From<UnitParseError> for FociError {
    fn from(e: UnitParseError) -> Self {
        Self::Units(e.to_string())
    }
}

impl From<std::io::Error> for FociError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
