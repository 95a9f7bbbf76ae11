// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Job files: the images (movie frames) to synthesise visibilities from and
//! the places to sample them.
//!
//! An example in TOML:
//!
//! ```toml
//! [[frames]]
//! pixel-scale = "2uas"
//! unit = "jy-per-pixel"
//! gps-time = 1300000000.0
//! freq = "230GHz"
//! data = [
//!     [0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 0.0],
//! ]
//!
//! [[requests]]
//! u = 1e9
//! v = -2e9
//!
//! [[requests]]
//! u = 3000000.0
//! v = 0.0
//! uv-unit = "metres"
//! freq = "230GHz"
//! ```
//!
//! `data[0]` is the first row, i.e. the most negative `m`.

use std::path::{Path, PathBuf};

use hifitime::Epoch;
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use super::super::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};
use crate::{
    coord::{GeometryError, ImageGeometry, RADec},
    image::{FluxUnit, Image},
    noise::BaselineSensitivity,
    synthesize::SampleRequest,
    unit_parsing::{parse_angle_rad, parse_freq_hz, UnitParseError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(super) struct JobFile {
    pub(super) frames: Vec<JobFrame>,

    #[serde(default)]
    pub(super) requests: Vec<JobRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(super) struct JobFrame {
    /// The angular width of a pixel, e.g. "1uas". Naked numbers are radians.
    pub(super) pixel_scale: String,

    /// The angular height of a pixel, if it differs from the width.
    #[serde(default)]
    pub(super) pixel_scale_y: Option<String>,

    #[serde(default)]
    pub(super) unit: FluxUnit,

    /// \[GPS seconds\]
    #[serde(default)]
    pub(super) gps_time: Option<f64>,

    /// e.g. "230GHz". Naked numbers are Hz.
    #[serde(default)]
    pub(super) freq: Option<String>,

    /// The right ascension of the reference pixel \[degrees\].
    #[serde(default)]
    pub(super) ra: Option<f64>,

    /// The declination of the reference pixel \[degrees\].
    #[serde(default)]
    pub(super) dec: Option<f64>,

    pub(super) data: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) enum UvUnit {
    #[default]
    Wavelengths,
    Metres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(super) struct JobRequest {
    pub(super) u: f64,
    pub(super) v: f64,

    #[serde(default)]
    pub(super) uv_unit: UvUnit,

    #[serde(default)]
    pub(super) freq: Option<String>,

    /// \[GPS seconds\]
    #[serde(default)]
    pub(super) gps_time: Option<f64>,

    #[serde(default)]
    pub(super) sensitivity: Option<BaselineSensitivity>,
}

impl JobFile {
    /// Read a job file; the format is determined by the file extension.
    pub(super) fn read(path: &Path) -> Result<JobFile, JobError> {
        debug!("Reading job file {}", path.display());
        if !path.exists() {
            return Err(JobError::DoesntExist(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        match ArgFileTypes::from_path(path) {
            Some(ArgFileTypes::Toml) => toml::from_str(&contents).map_err(|e| JobError::Toml {
                file: path.to_path_buf(),
                err: e.to_string(),
            }),
            Some(ArgFileTypes::Json) => {
                serde_json::from_str(&contents).map_err(|e| JobError::Json {
                    file: path.to_path_buf(),
                    err: e.to_string(),
                })
            }
            None => Err(JobError::UnknownExtension(path.to_path_buf())),
        }
    }

    /// Turn the job's frames into images and its requests into sample
    /// requests.
    pub(super) fn into_parts(self) -> Result<(Vec1<Image>, Vec<SampleRequest>), JobError> {
        let frames = self
            .frames
            .into_iter()
            .enumerate()
            .map(|(i, frame)| frame.into_image(i))
            .collect::<Result<Vec<Image>, JobError>>()?;
        let frames = Vec1::try_from_vec(frames).map_err(|_| JobError::NoFrames)?;
        let requests = self
            .requests
            .into_iter()
            .enumerate()
            .map(|(i, request)| request.into_request(i))
            .collect::<Result<Vec<SampleRequest>, JobError>>()?;
        Ok((frames, requests))
    }
}

impl JobFrame {
    fn into_image(self, frame: usize) -> Result<Image, JobError> {
        let ny = self.data.len();
        let nx = self.data.first().map(|row| row.len()).unwrap_or(0);
        if let Some((row, r)) = self
            .data
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != nx)
        {
            return Err(JobError::RaggedData {
                frame,
                row,
                expected: nx,
                got: r.len(),
            });
        }

        let dx = parse_angle_rad(&self.pixel_scale)?;
        let dy = match &self.pixel_scale_y {
            Some(s) => parse_angle_rad(s)?,
            None => dx,
        };
        let geometry = ImageGeometry::new(nx, ny, dx, dy)
            .map_err(|err| JobError::Geometry { frame, err })?;
        let data = Array2::from_shape_vec((ny, nx), self.data.into_iter().flatten().collect())
            .expect("rows were checked to all be the same length");
        let mut image = Image::with_geometry(data, geometry, self.unit)
            .map_err(|err| JobError::Geometry { frame, err })?;

        match (self.ra, self.dec) {
            (Some(ra), Some(dec)) => image = image.with_reference(RADec::new_degrees(ra, dec)),
            (None, None) => (),
            _ => return Err(JobError::OnlyOneRaOrDec { frame }),
        }
        if let Some(t) = self.gps_time {
            image = image.with_timestamp(Epoch::from_gpst_seconds(t));
        }
        if let Some(f) = &self.freq {
            image = image.with_freq(parse_freq_hz(f)?);
        }
        Ok(image)
    }
}

impl JobRequest {
    fn into_request(self, request: usize) -> Result<SampleRequest, JobError> {
        let freq_hz = self.freq.as_deref().map(parse_freq_hz).transpose()?;
        let mut sample = match (self.uv_unit, freq_hz) {
            (UvUnit::Wavelengths, _) => SampleRequest::new(self.u, self.v),
            (UvUnit::Metres, Some(f)) => SampleRequest::from_baseline_metres(self.u, self.v, f),
            (UvUnit::Metres, None) => return Err(JobError::MetresWithoutFreq { request }),
        };
        if let Some(f) = freq_hz {
            sample = sample.with_freq(f);
        }
        if let Some(t) = self.gps_time {
            sample = sample.with_timestamp(Epoch::from_gpst_seconds(t));
        }
        if let Some(s) = self.sensitivity {
            sample = sample.with_sensitivity(s);
        }
        Ok(sample)
    }
}

#[derive(Error, Debug)]
pub(crate) enum JobError {
    #[error("Job file '{}' doesn't exist", .0.display())]
    DoesntExist(PathBuf),

    #[error("Job file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .0.display(), *ARG_FILE_TYPES_COMMA_SEPARATED)]
    UnknownExtension(PathBuf),

    #[error("Couldn't decode toml structure from '{}':\n{err}", .file.display())]
    Toml { file: PathBuf, err: String },

    #[error("Couldn't decode json structure from '{}':\n{err}", .file.display())]
    Json { file: PathBuf, err: String },

    #[error("The job file doesn't have any frames")]
    NoFrames,

    #[error("Row {row} of frame {frame} has {got} values, but the first row has {expected}")]
    RaggedData {
        frame: usize,
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Frame {frame} is invalid: {err}")]
    Geometry { frame: usize, err: GeometryError },

    #[error("Frame {frame} has only one of RA and Dec, but none or both are required")]
    OnlyOneRaOrDec { frame: usize },

    #[error("Request {request} is in metres but has no frequency to convert it to wavelengths")]
    MetresWithoutFreq { request: usize },

    #[error(transparent)]
    UnitParse(#[from] UnitParseError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
