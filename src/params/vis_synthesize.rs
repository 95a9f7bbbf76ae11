// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise visibilities from images and write them to a file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread::{self, ScopedJoinHandle},
};

use crossbeam_channel::{bounded, Receiver};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use scopeguard::defer_on_unwind;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use super::SynthesisConfig;
use crate::{
    image::Image,
    synthesize::{
        CancelToken, SampleOutcome, SampleRequest, SynthesisSummary, SynthesizedChunk,
        Synthesizer,
    },
    SynthesisError, PROGRESS_BARS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub(crate) enum VisOutputFormat {
    /// A JSON array with one object per request.
    #[strum(serialize = "json")]
    Json,

    /// Whitespace-separated columns.
    #[strum(serialize = "txt")]
    Txt,

    /// Comma-separated columns.
    #[strum(serialize = "csv")]
    Csv,
}

/// Parameters needed to synthesise visibilities and write them out.
pub(crate) struct VisSynthesizeParams {
    /// One image, or the frames of a movie.
    pub(crate) frames: Vec1<Image>,
    pub(crate) requests: Vec<SampleRequest>,
    pub(crate) config: SynthesisConfig,
    pub(crate) output: PathBuf,
    pub(crate) output_format: VisOutputFormat,
}

impl VisSynthesizeParams {
    pub(crate) fn run(&self) -> Result<SynthesisSummary, VisSynthesizeError> {
        let VisSynthesizeParams {
            frames,
            requests,
            config,
            output,
            output_format,
        } = self;

        // Channel for writing synthesised visibilities.
        let (tx, rx) = bounded(5);

        // Progress bars.
        let multi_progress = MultiProgress::with_draw_target(if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        });
        let synth_progress = multi_progress.add(
            ProgressBar::new(requests.len() as _)
                .with_style(
                    ProgressStyle::default_bar()
                        .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} requests ({elapsed_precise}<{eta_precise})").expect("progress bar template is valid")
                        .progress_chars("=> "),
                )
                .with_position(0)
                .with_message("Synthesising"),
        );
        let write_progress = multi_progress.add(
            ProgressBar::new(requests.len() as _)
                .with_style(
                    ProgressStyle::default_bar()
                        .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} requests ({elapsed_precise}<{eta_precise})").expect("progress bar template is valid")
                        .progress_chars("=> "),
                )
                .with_position(0)
                .with_message("Writing"),
        );

        // Synthesise the visibilities and write them out asynchronously. If
        // either side fails, the token stops the other side.
        let cancel = CancelToken::new();
        let scoped_threads_result: Result<SynthesisSummary, VisSynthesizeError> =
            thread::scope(|scope| {
                // Synthesis thread.
                let synth_handle: ScopedJoinHandle<Result<(), SynthesisError>> =
                    thread::Builder::new()
                        .name("synthesize".to_string())
                        .spawn_scoped(scope, || {
                            defer_on_unwind! { cancel.cancel(); }
                            synth_progress.tick();

                            let synthesizer = Synthesizer::new(*config)
                                .with_progress_bar(synth_progress.clone());
                            let result = if frames.len() == 1 {
                                synthesizer.stream(frames.first(), requests, &cancel, tx)
                            } else {
                                synthesizer.stream_movie(frames, requests, &cancel, tx)
                            };
                            if result.is_err() {
                                cancel.cancel();
                            }
                            synth_progress.abandon_with_message("Finished synthesising");
                            result
                        })
                        .expect("OS can create threads");

                // Writing thread.
                let write_handle: ScopedJoinHandle<Result<SynthesisSummary, VisSynthesizeError>> =
                    thread::Builder::new()
                        .name("write".to_string())
                        .spawn_scoped(scope, || {
                            defer_on_unwind! { cancel.cancel(); }
                            write_progress.tick();

                            let result = write_outcomes(
                                output,
                                *output_format,
                                rx,
                                &cancel,
                                &write_progress,
                            );
                            if result.is_err() {
                                cancel.cancel();
                            }
                            write_progress.abandon_with_message("Finished writing");
                            result
                        })
                        .expect("OS can create threads");

                // Join all thread handles. This propagates any errors and lets
                // us know if any threads panicked, if panics aren't aborting as
                // per the Cargo.toml.
                synth_handle.join().expect("synthesis thread didn't panic")?;
                let summary = write_handle.join().expect("write thread didn't panic")?;
                Ok(summary)
            });

        let summary = match scoped_threads_result {
            Ok(summary) => summary,
            Err(e) => {
                // Don't leave a valid-looking but incomplete file behind.
                if output.exists() {
                    debug!("Removing incomplete output {}", output.display());
                    if let Err(remove_err) = std::fs::remove_file(output) {
                        warn!(
                            "Couldn't remove incomplete output {}: {remove_err}",
                            output.display()
                        );
                    }
                }
                return Err(e);
            }
        };
        info!("Visibilities written to {}", output.display());
        Ok(summary)
    }
}

/// One line (or JSON object) of output.
#[derive(Serialize)]
struct OutputRecord {
    index: usize,
    /// \[wavelengths\]
    u: f64,
    /// \[wavelengths\]
    v: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    freq_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gps_time: Option<f64>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    re: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    im: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl OutputRecord {
    fn new(index: usize, outcome: &SampleOutcome) -> OutputRecord {
        let request = &outcome.request;
        let (status, vis, error) = match &outcome.result {
            Ok(vis) => ("ok", Some(vis), None),
            Err(e @ SynthesisError::OutOfBandSample { .. }) => ("out-of-band", None, Some(e)),
            Err(e @ SynthesisError::NumericalOverflow { .. }) => ("overflow", None, Some(e)),
            Err(e @ SynthesisError::Cancelled) => ("cancelled", None, Some(e)),
            Err(e) => ("error", None, Some(e)),
        };
        OutputRecord {
            index,
            u: request.u,
            v: request.v,
            freq_hz: request.freq_hz,
            gps_time: request.timestamp.map(|t| t.to_gpst_seconds()),
            status,
            re: vis.map(|v| v.vis.re),
            im: vis.map(|v| v.vis.im),
            sigma: vis.map(|v| v.sigma),
            weight: vis.and_then(|v| v.weight),
            error: error.map(|e| e.to_string()),
        }
    }

    /// Columns: index u v re im sigma weight status. Missing values are NaN.
    fn write_columns<W: Write>(&self, w: &mut W, sep: &str) -> std::io::Result<()> {
        let nan = f64::NAN;
        writeln!(
            w,
            "{}{sep}{:e}{sep}{:e}{sep}{:e}{sep}{:e}{sep}{:e}{sep}{:e}{sep}{}",
            self.index,
            self.u,
            self.v,
            self.re.unwrap_or(nan),
            self.im.unwrap_or(nan),
            self.sigma.unwrap_or(nan),
            self.weight.unwrap_or(nan),
            self.status
        )
    }
}

/// Receive chunks of outcomes and write them to `output`. Returns a summary of
/// everything that was written.
fn write_outcomes(
    output: &Path,
    format: VisOutputFormat,
    rx: Receiver<SynthesizedChunk>,
    cancel: &CancelToken,
    progress_bar: &ProgressBar,
) -> Result<SynthesisSummary, VisSynthesizeError> {
    debug!("Writing {format} output to {}", output.display());
    let mut w = BufWriter::new(File::create(output)?);
    let mut summary = SynthesisSummary::default();

    match format {
        VisOutputFormat::Json => writeln!(w, "[")?,
        VisOutputFormat::Txt => writeln!(w, "# index u v re im sigma weight status")?,
        VisOutputFormat::Csv => writeln!(w, "index,u,v,re,im,sigma,weight,status")?,
    }

    let mut first = true;
    for chunk in rx.iter() {
        for (i, outcome) in chunk.outcomes.iter().enumerate() {
            let record = OutputRecord::new(chunk.offset + i, outcome);
            match format {
                VisOutputFormat::Json => {
                    if !first {
                        writeln!(w, ",")?;
                    }
                    write!(w, "  ")?;
                    serde_json::to_writer(&mut w, &record)?;
                }
                VisOutputFormat::Txt => record.write_columns(&mut w, " ")?,
                VisOutputFormat::Csv => record.write_columns(&mut w, ",")?,
            }
            first = false;
            summary.add(outcome);
        }
        progress_bar.inc(chunk.outcomes.len() as u64);

        // Should we continue?
        if cancel.is_cancelled() {
            debug!("Writer stopping early");
            break;
        }
    }

    if format == VisOutputFormat::Json {
        if !first {
            writeln!(w)?;
        }
        writeln!(w, "]")?;
    }
    w.flush()?;
    Ok(summary)
}

#[derive(Error, Debug)]
pub(crate) enum VisSynthesizeError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("Couldn't serialise visibilities to JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
