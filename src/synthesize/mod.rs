// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Batches of visibilities: taper an image, build its transform plan once,
//! then evaluate chunks of sample requests in parallel.
//!
//! Outcomes are always returned in the same order as their requests. A
//! request that fails (e.g. it is out of band) is reported next to its
//! successful siblings; only problems that prevent any work from being done
//! (e.g. a movie with untimed frames) fail the whole batch.

mod cancel;
mod summary;

pub use cancel::CancelToken;
pub use summary::SynthesisSummary;

use crossbeam_channel::Sender;
use hifitime::Epoch;
use indicatif::ProgressBar;
use log::{debug, trace, warn};
use rayon::prelude::*;
use vec1::Vec1;

use crate::{
    c64, coord::metres_to_wavelengths, image::Image, noise::BaselineSensitivity,
    params::SynthesisConfig, sampling::TransformPlan, SynthesisError,
};

/// A single point at which a visibility is wanted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRequest {
    /// \[wavelengths\]
    pub u: f64,
    /// \[wavelengths\]
    pub v: f64,

    /// The observing frequency \[Hz\].
    pub freq_hz: Option<f64>,

    /// When this sample was taken. Used to pick a frame from a movie.
    pub timestamp: Option<Epoch>,

    /// The sensitivity of the baseline. If this is `None`, the synthesis
    /// configuration's default sensitivity (if any) is used.
    pub sensitivity: Option<BaselineSensitivity>,
}

impl SampleRequest {
    /// A request at `(u, v)` \[wavelengths\] with no other information.
    pub fn new(u: f64, v: f64) -> SampleRequest {
        SampleRequest {
            u,
            v,
            freq_hz: None,
            timestamp: None,
            sensitivity: None,
        }
    }

    /// A request for a projected baseline given in \[metres\], observed at
    /// `freq_hz`.
    pub fn from_baseline_metres(u_metres: f64, v_metres: f64, freq_hz: f64) -> SampleRequest {
        SampleRequest::new(
            metres_to_wavelengths(u_metres, freq_hz),
            metres_to_wavelengths(v_metres, freq_hz),
        )
        .with_freq(freq_hz)
    }

    pub fn with_freq(mut self, freq_hz: f64) -> SampleRequest {
        self.freq_hz = Some(freq_hz);
        self
    }

    pub fn with_timestamp(mut self, timestamp: Epoch) -> SampleRequest {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: BaselineSensitivity) -> SampleRequest {
        self.sensitivity = Some(sensitivity);
        self
    }
}

/// A synthesised visibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    /// \[Jy\]
    pub vis: c64,

    /// The standard deviation of the thermal noise on each of the real and
    /// imaginary components \[Jy\]. Zero for noiseless visibilities.
    pub sigma: f64,

    /// The inverse-variance weight, `1/σ²`. `None` when there is no noise.
    pub weight: Option<f64>,
}

impl Visibility {
    pub(crate) fn noiseless(vis: c64) -> Visibility {
        Visibility {
            vis,
            sigma: 0.0,
            weight: None,
        }
    }

    /// \[Jy\]
    pub fn amplitude(&self) -> f64 {
        self.vis.norm()
    }

    /// \[radians\]
    pub fn phase(&self) -> f64 {
        self.vis.arg()
    }

    /// The signal-to-noise ratio, if this visibility has noise.
    pub fn snr(&self) -> Option<f64> {
        (self.sigma > 0.0).then(|| self.amplitude() / self.sigma)
    }
}

/// A request alongside what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub request: SampleRequest,
    pub result: Result<Visibility, SynthesisError>,
}

/// The outcomes of one chunk of requests, as sent by [`Synthesizer::stream`].
#[derive(Debug, Clone)]
pub struct SynthesizedChunk {
    /// The index of this chunk. Chunks are sent in order.
    pub index: usize,

    /// The index of the first request of this chunk in the whole batch.
    pub offset: usize,

    pub outcomes: Vec<SampleOutcome>,
}

/// Turns images and sample requests into visibilities according to a
/// [`SynthesisConfig`].
pub struct Synthesizer {
    config: SynthesisConfig,
    progress_bar: Option<ProgressBar>,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig) -> Synthesizer {
        Synthesizer {
            config,
            progress_bar: None,
        }
    }

    /// Advance this progress bar by the number of requests in each chunk as it
    /// completes. The caller is responsible for setting its length.
    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Synthesizer {
        self.progress_bar = Some(progress_bar);
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Taper an image and make its transform plan.
    pub fn plan(&self, image: &Image) -> Result<TransformPlan, SynthesisError> {
        let tapered = self.config.taper.apply(image);
        TransformPlan::new(&tapered, &self.config.kernel_options())
    }

    /// Synthesise a visibility for each request from a single image.
    ///
    /// # Errors
    ///
    /// Only errors that prevent the image from being used at all are returned
    /// here; per-request errors are inside the returned outcomes.
    pub fn synthesize(
        &self,
        image: &Image,
        requests: &[SampleRequest],
        cancel: &CancelToken,
    ) -> Result<Vec<SampleOutcome>, SynthesisError> {
        let plan = self.plan(image)?;
        warn_about_frequencies(image, requests);
        debug!(
            "Synthesising {} visibilities in chunks of {}",
            requests.len(),
            self.config.chunk_size
        );
        Ok(self.run_chunks(requests, cancel, |_| (0, &plan)))
    }

    /// Synthesise visibilities from a movie. Each request is sampled from the
    /// frame nearest to it in time; requests without a timestamp use the first
    /// frame. A movie with more than one frame needs a timestamp on every
    /// frame.
    pub fn synthesize_movie(
        &self,
        frames: &Vec1<Image>,
        requests: &[SampleRequest],
        cancel: &CancelToken,
    ) -> Result<Vec<SampleOutcome>, SynthesisError> {
        let movie = self.plan_movie(frames, requests)?;
        Ok(self.run_chunks(requests, cancel, |i| movie.get(i)))
    }

    /// Like [`Synthesizer::synthesize`], but each chunk is sent over `tx` as
    /// soon as it is done, in order, rather than collected. If the receiver
    /// hangs up, no more chunks are evaluated.
    pub fn stream(
        &self,
        image: &Image,
        requests: &[SampleRequest],
        cancel: &CancelToken,
        tx: Sender<SynthesizedChunk>,
    ) -> Result<(), SynthesisError> {
        let plan = self.plan(image)?;
        warn_about_frequencies(image, requests);
        self.stream_with(requests, cancel, tx, |_| (0, &plan));
        Ok(())
    }

    /// [`Synthesizer::stream`] for a movie; frames are picked as in
    /// [`Synthesizer::synthesize_movie`].
    pub fn stream_movie(
        &self,
        frames: &Vec1<Image>,
        requests: &[SampleRequest],
        cancel: &CancelToken,
        tx: Sender<SynthesizedChunk>,
    ) -> Result<(), SynthesisError> {
        let movie = self.plan_movie(frames, requests)?;
        self.stream_with(requests, cancel, tx, |i| movie.get(i));
        Ok(())
    }

    fn plan_movie(
        &self,
        frames: &Vec1<Image>,
        requests: &[SampleRequest],
    ) -> Result<MoviePlans, SynthesisError> {
        let frame_indices = assign_frames(frames, requests)?;
        let mut used = vec![false; frames.len()];
        for &frame in &frame_indices {
            used[frame] = true;
        }

        // Frames are independent, so their plans are made in parallel. Frames
        // that no request uses don't get one.
        let plans = frames
            .as_slice()
            .par_iter()
            .zip(used.par_iter())
            .map(|(image, &used)| {
                if used {
                    self.plan(image).map(Some)
                } else {
                    Ok(None)
                }
            })
            .collect::<Result<Vec<Option<TransformPlan>>, SynthesisError>>()?;
        debug!(
            "Made plans for {} of {} movie frames",
            plans.iter().filter(|p| p.is_some()).count(),
            frames.len()
        );
        for (image, _) in frames.iter().zip(used).filter(|(_, used)| *used) {
            warn_about_frequencies(image, requests);
        }

        Ok(MoviePlans {
            frame_indices,
            plans,
        })
    }

    fn stream_with<'p, F>(
        &self,
        requests: &[SampleRequest],
        cancel: &CancelToken,
        tx: Sender<SynthesizedChunk>,
        plan_for: F,
    ) where
        F: Fn(usize) -> (usize, &'p TransformPlan) + Sync,
    {
        let chunk_size = self.config.chunk_size.get();
        for (index, chunk) in requests.chunks(chunk_size).enumerate() {
            let offset = index * chunk_size;
            let outcomes = self.evaluate_chunk(offset, chunk, cancel, &plan_for);
            match tx.send(SynthesizedChunk {
                index,
                offset,
                outcomes,
            }) {
                Ok(()) => (),
                // The receiver has gone away; there's nobody left to give
                // results to.
                Err(_) => {
                    debug!("Chunk receiver hung up; stopping after chunk {index}");
                    return;
                }
            }
        }
    }

    fn run_chunks<'p, F>(
        &self,
        requests: &[SampleRequest],
        cancel: &CancelToken,
        plan_for: F,
    ) -> Vec<SampleOutcome>
    where
        F: Fn(usize) -> (usize, &'p TransformPlan) + Sync,
    {
        let chunk_size = self.config.chunk_size.get();
        requests
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(index, chunk)| self.evaluate_chunk(index * chunk_size, chunk, cancel, &plan_for))
            .collect::<Vec<Vec<SampleOutcome>>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Evaluate a chunk of requests, the first of which is request `offset` of
    /// the batch. `plan_for` gives the frame index and plan for a request
    /// index.
    fn evaluate_chunk<'p, F>(
        &self,
        offset: usize,
        chunk: &[SampleRequest],
        cancel: &CancelToken,
        plan_for: &F,
    ) -> Vec<SampleOutcome>
    where
        F: Fn(usize) -> (usize, &'p TransformPlan) + Sync,
    {
        if cancel.is_cancelled() {
            trace!("Cancelled; skipping the chunk at request {offset}");
            return chunk
                .iter()
                .map(|request| SampleOutcome {
                    request: *request,
                    result: Err(SynthesisError::Cancelled),
                })
                .collect();
        }

        trace!("Evaluating {} requests from request {offset}", chunk.len());
        let outcomes = chunk
            .par_iter()
            .enumerate()
            .map(|(i, request)| {
                let index = offset + i;
                let (frame, plan) = plan_for(index);
                SampleOutcome {
                    request: *request,
                    result: self.sample(plan, frame, index, request),
                }
            })
            .collect();

        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.inc(chunk.len() as u64);
        }
        outcomes
    }

    fn sample(
        &self,
        plan: &TransformPlan,
        frame: usize,
        index: usize,
        request: &SampleRequest,
    ) -> Result<Visibility, SynthesisError> {
        let vis = plan.sample(request.u, request.v)?;
        let sensitivity = request.sensitivity.or(self.config.default_sensitivity);
        Ok(self
            .config
            .noise
            .apply(vis, sensitivity.as_ref(), frame, index))
    }
}

/// The plans of a movie's frames, and which frame each request uses.
struct MoviePlans {
    frame_indices: Vec<usize>,

    /// `None` for frames that no request uses.
    plans: Vec<Option<TransformPlan>>,
}

impl MoviePlans {
    fn get(&self, request_index: usize) -> (usize, &TransformPlan) {
        let frame = self.frame_indices[request_index];
        let plan = self.plans[frame]
            .as_ref()
            .expect("a plan is made for every frame in use");
        (frame, plan)
    }
}

/// The frame each request should be sampled from.
fn assign_frames(
    frames: &Vec1<Image>,
    requests: &[SampleRequest],
) -> Result<Vec<usize>, SynthesisError> {
    if frames.len() == 1 {
        return Ok(vec![0; requests.len()]);
    }

    let frame_times = frames
        .iter()
        .enumerate()
        .map(|(frame, image)| {
            image
                .timestamp()
                .map(|t| t.to_gpst_seconds())
                .ok_or(SynthesisError::UntimedFrames { frame })
        })
        .collect::<Result<Vec<f64>, SynthesisError>>()?;

    Ok(requests
        .iter()
        .map(|request| match request.timestamp {
            None => 0,
            Some(t) => nearest(&frame_times, t.to_gpst_seconds()),
        })
        .collect())
}

/// The index of the value closest to `t`. Ties go to the earlier index.
fn nearest(values: &[f64], t: f64) -> usize {
    let mut best = 0;
    let mut best_diff = f64::INFINITY;
    for (i, value) in values.iter().enumerate() {
        let diff = (value - t).abs();
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }
    best
}

/// Images are monochromatic; let the user know if requests were observed at
/// other frequencies.
fn warn_about_frequencies(image: &Image, requests: &[SampleRequest]) {
    let image_freq = match image.freq_hz() {
        Some(f) => f,
        None => return,
    };
    let num_mismatched = requests
        .iter()
        .filter_map(|r| r.freq_hz)
        .filter(|f| ((f - image_freq) / image_freq).abs() > 1e-6)
        .count();
    if num_mismatched > 0 {
        warn!(
            "{num_mismatched} sample requests have a frequency different to the image's ({image_freq} Hz); the image is used as is"
        );
    }
}
