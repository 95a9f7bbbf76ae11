// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise visibilities from the images and sample requests in a job file.

mod job;

pub(super) use job::JobError;

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use console::style;
use itertools::Itertools;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use self::job::JobFile;
use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    constants::{DEFAULT_CHUNK_SIZE, DEFAULT_EFFICIENCY, DEFAULT_PADDING, UAS_TO_RAD},
    noise::{BaselineSensitivity, NoiseError, NoiseModel},
    params::{SynthesisConfig, VisOutputFormat, VisSynthesizeParams},
    sampling::{Interpolation, Strategy},
    taper::Taper,
    unit_parsing::{parse_freq_hz, parse_time_s, UnitParseError},
    FociError,
};

const DEFAULT_OUTPUT_FILENAME: &str = "foci_vis.json";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output visibility file. Supported formats: {}. Default: {DEFAULT_OUTPUT_FILENAME}", VisOutputFormat::iter().join(", "));

    static ref STRATEGY_HELP: String =
        format!("How visibilities are computed. Supported strategies: {}. Default: {}", Strategy::iter().join(", "), Strategy::default());

    static ref INTERPOLATION_HELP: String =
        format!("How grid-interp samples between frequency-grid points. Supported kinds: {}. Default: {}", Interpolation::iter().join(", "), Interpolation::default());

    static ref PADDING_HELP: String =
        format!("The factor by which images are zero padded before they are Fourier transformed (grid-interp only). Default: {DEFAULT_PADDING}");

    static ref TAPER_HELP: String =
        format!("The window applied to images before synthesis. Supported tapers: {}. Default: {}", Taper::iter().join(", "), Taper::default());

    static ref CHUNK_SIZE_HELP: String =
        format!("The number of sample requests handled as a single unit of work. Default: {DEFAULT_CHUNK_SIZE}");

    static ref EFFICIENCY_HELP: String =
        format!("The correlator efficiency used with --sefds. Default: {DEFAULT_EFFICIENCY}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VisSynthesizeCliArgs {
    /// Path to the job file (toml or json) containing the images and sample
    /// requests.
    #[clap(short, long, parse(from_str), help_heading = "INPUT FILES")]
    pub(super) job: Option<PathBuf>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SynthesisArgs {
    #[clap(long, help = STRATEGY_HELP.as_str(), help_heading = "SYNTHESIS")]
    pub(super) strategy: Option<String>,

    #[clap(long, help = INTERPOLATION_HELP.as_str(), help_heading = "SYNTHESIS")]
    pub(super) interpolation: Option<String>,

    #[clap(long, help = PADDING_HELP.as_str(), help_heading = "SYNTHESIS")]
    pub(super) padding: Option<usize>,

    #[clap(long, help = TAPER_HELP.as_str(), help_heading = "SYNTHESIS")]
    pub(super) taper: Option<String>,

    #[clap(long, help = CHUNK_SIZE_HELP.as_str(), help_heading = "SYNTHESIS")]
    pub(super) chunk_size: Option<usize>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct NoiseArgs {
    /// Add thermal noise, drawn from random numbers seeded with this value.
    /// Without a seed, visibilities are noiseless.
    #[clap(long, help_heading = "NOISE")]
    pub(super) seed: Option<u64>,

    /// The system-equivalent flux densities of the two stations of every
    /// baseline [Jy]. Requests in the job file may have their own
    /// sensitivities.
    #[clap(
        long,
        help_heading = "NOISE",
        number_of_values = 2,
        value_names = &["SEFD1", "SEFD2"]
    )]
    pub(super) sefds: Option<Vec<f64>>,

    /// The bandwidth used with --sefds, e.g. "2GHz". Naked numbers are Hz.
    #[clap(long, help_heading = "NOISE")]
    pub(super) bandwidth: Option<String>,

    /// The integration time used with --sefds, e.g. "10s". Naked numbers are
    /// seconds.
    #[clap(long, help_heading = "NOISE")]
    pub(super) integration_time: Option<String>,

    #[clap(long, help = EFFICIENCY_HELP.as_str(), help_heading = "NOISE")]
    pub(super) efficiency: Option<f64>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VisSynthesizeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "vis-synthesize")]
    #[serde(default)]
    pub(super) io_args: VisSynthesizeCliArgs,

    #[clap(flatten)]
    #[serde(rename = "synthesis")]
    #[serde(default)]
    pub(super) synthesis_args: SynthesisArgs,

    #[clap(flatten)]
    #[serde(rename = "noise")]
    #[serde(default)]
    pub(super) noise_args: NoiseArgs,
}

impl VisSynthesizeArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<VisSynthesizeArgs, FociError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let VisSynthesizeArgs {
                args_file: _,
                io_args,
                synthesis_args,
                noise_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(VisSynthesizeArgs {
                args_file: None,
                io_args: cli_args.io_args.merge(io_args),
                synthesis_args: cli_args.synthesis_args.merge(synthesis_args),
                noise_args: cli_args.noise_args.merge(noise_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<VisSynthesizeParams, VisSynthesizeArgsError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let VisSynthesizeArgs {
            args_file: _,
            io_args: VisSynthesizeCliArgs { job, output },
            synthesis_args,
            noise_args,
        } = self;

        let job = job.ok_or(VisSynthesizeArgsError::NoJob)?;
        let (frames, requests) = JobFile::read(&job)?.into_parts()?;

        let mut image_printer = InfoPrinter::new(
            format!(
                "Synthesising visibilities from {}",
                if frames.len() == 1 {
                    "1 image".to_string()
                } else {
                    format!("a {}-frame movie", frames.len())
                }
            )
            .into(),
        );
        image_printer.push_line(format!("from {}", job.display()).into());
        let first = frames.first();
        let geometry = first.geometry();
        let (ny, nx) = geometry.shape();
        image_printer.push_block(vec![
            style("           x          y").bold().to_string().into(),
            format!("Pixels:     {nx:<10} {ny}").into(),
            format!(
                "Scale:      {:<10.4} {:.4} µas",
                geometry.x.scale() / UAS_TO_RAD,
                geometry.y.scale() / UAS_TO_RAD
            )
            .into(),
        ]);
        image_printer.push_line(
            format!(
                "Total flux density: {:.6} Jy ({})",
                first.total_flux(),
                first.unit()
            )
            .into(),
        );
        if let Some(f) = first.freq_hz() {
            image_printer.push_line(format!("Frequency: {:.6} GHz", f / 1e9).into());
        }
        if let Some(reference) = first.reference() {
            image_printer.push_line(format!("Reference position: {reference}").into());
        }
        if let (Some(t0), Some(t1)) = (first.timestamp(), frames.last().timestamp()) {
            image_printer.push_line(
                format!(
                    "GPS times: {} to {}",
                    t0.to_gpst_seconds(),
                    t1.to_gpst_seconds()
                )
                .into(),
            );
        }
        image_printer.display();

        let (u_max, v_max) = geometry.nyquist_uv();
        let num_out_of_band = requests
            .iter()
            .filter(|r| !geometry.in_band(r.u, r.v))
            .count();
        let mut request_printer = InfoPrinter::new("Sample requests".into());
        request_printer.push_line(format!("{} requests", requests.len()).into());
        request_printer.push_line(
            format!("Band limits: |u| <= {u_max:.6e}, |v| <= {v_max:.6e} wavelengths").into(),
        );
        request_printer.display();
        if num_out_of_band > 0 {
            format!("{num_out_of_band} requests are outside the band of the first frame; they will not be synthesised").warn();
        }

        // Synthesis options.
        let SynthesisArgs {
            strategy,
            interpolation,
            padding,
            taper,
            chunk_size,
        } = synthesis_args;
        let strategy = match strategy {
            Some(s) => {
                Strategy::from_str(&s).map_err(|_| VisSynthesizeArgsError::BadStrategy(s))?
            }
            None => Strategy::default(),
        };
        let interpolation = match interpolation {
            Some(s) => Interpolation::from_str(&s)
                .map_err(|_| VisSynthesizeArgsError::BadInterpolation(s))?,
            None => Interpolation::default(),
        };
        let taper = match taper {
            Some(s) => Taper::from_str(&s).map_err(|_| VisSynthesizeArgsError::BadTaper(s))?,
            None => Taper::default(),
        };
        let padding = NonZeroUsize::new(padding.unwrap_or(DEFAULT_PADDING))
            .ok_or(VisSynthesizeArgsError::ZeroPadding)?;
        let chunk_size = NonZeroUsize::new(chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE))
            .ok_or(VisSynthesizeArgsError::ZeroChunkSize)?;

        // Noise options.
        let NoiseArgs {
            seed,
            sefds,
            bandwidth,
            integration_time,
            efficiency,
        } = noise_args;
        let default_sensitivity = match (sefds, bandwidth, integration_time) {
            (None, None, None) => {
                if efficiency.is_some() {
                    "--efficiency was given without --sefds; ignoring".warn();
                }
                None
            }
            (Some(sefds), Some(bandwidth), Some(integration_time)) => {
                if sefds.len() != 2 {
                    return Err(VisSynthesizeArgsError::BadSefds { sefds });
                }
                Some(BaselineSensitivity::with_efficiency(
                    sefds[0],
                    sefds[1],
                    parse_freq_hz(&bandwidth)?,
                    parse_time_s(&integration_time)?,
                    efficiency.unwrap_or(DEFAULT_EFFICIENCY),
                )?)
            }
            _ => return Err(VisSynthesizeArgsError::IncompleteSensitivity),
        };
        let any_sensitivity =
            default_sensitivity.is_some() || requests.iter().any(|r| r.sensitivity.is_some());
        let noise = match seed {
            Some(seed) => {
                if !any_sensitivity {
                    "A noise seed was given, but there are no baseline sensitivities; visibilities will be noiseless".warn();
                }
                NoiseModel::Seeded(seed)
            }
            None => {
                if any_sensitivity {
                    "Baseline sensitivities were given without a noise seed; visibilities will be noiseless".warn();
                }
                NoiseModel::Disabled
            }
        };

        let config = SynthesisConfig {
            strategy,
            interpolation,
            padding,
            taper,
            noise,
            chunk_size,
            default_sensitivity,
        };
        let mut config_printer = InfoPrinter::new("Synthesis options".into());
        match strategy {
            Strategy::GridInterp => config_printer.push_block(vec![
                format!("Strategy: {strategy}").into(),
                format!("with {interpolation} interpolation, {padding}x padding").into(),
            ]),
            Strategy::Direct => config_printer.push_line(format!("Strategy: {strategy}").into()),
        }
        config_printer.push_line(format!("Taper: {taper}").into());
        match (noise, default_sensitivity) {
            (NoiseModel::Seeded(seed), Some(s)) => config_printer.push_block(vec![
                format!("Thermal noise with seed {seed}").into(),
                format!("Default σ: {:.6e} Jy", s.sigma()).into(),
            ]),
            (NoiseModel::Seeded(seed), None) => {
                config_printer.push_line(format!("Thermal noise with seed {seed}").into())
            }
            (NoiseModel::Disabled, _) => config_printer.push_line("No thermal noise".into()),
        }
        config_printer.push_line(format!("Chunks of {chunk_size} requests").into());
        config_printer.display();

        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        let output_format = output_format(&output)?;
        let mut output_printer = InfoPrinter::new("Output".into());
        output_printer.push_line(format!("{} ({output_format})", output.display()).into());
        output_printer.display();

        display_warnings();

        Ok(VisSynthesizeParams {
            frames,
            requests,
            config,
            output,
            output_format,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), FociError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let summary = params.run()?;
        let mut summary_printer = InfoPrinter::new("Results".into());
        summary_printer.push_line(format!("{} succeeded", summary.succeeded).into());
        if summary.failed() > 0 {
            summary_printer.push_block(vec![
                format!("{} failed", summary.failed()).into(),
                format!("{} out of band", summary.out_of_band).into(),
                format!("{} overflowed", summary.overflowed).into(),
                format!("{} cancelled", summary.cancelled).into(),
            ]);
        }
        summary_printer.display();
        if summary.failed() > 0 {
            warn!(
                "{} of {} requests failed; see the output file for details",
                summary.failed(),
                summary.total()
            );
        }
        Ok(())
    }
}

fn output_format(output: &Path) -> Result<VisOutputFormat, VisSynthesizeArgsError> {
    output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| VisOutputFormat::from_str(&e.to_lowercase()).ok())
        .ok_or_else(|| VisSynthesizeArgsError::BadOutputExtension(output.to_path_buf()))
}

#[derive(Error, Debug)]
pub(super) enum VisSynthesizeArgsError {
    #[error("No job file was supplied")]
    NoJob,

    #[error("Unrecognised synthesis strategy '{0}'. Supported strategies: {}", Strategy::iter().join(", "))]
    BadStrategy(String),

    #[error("Unrecognised interpolation '{0}'. Supported kinds: {}", Interpolation::iter().join(", "))]
    BadInterpolation(String),

    #[error("Unrecognised taper '{0}'. Supported tapers: {}", Taper::iter().join(", "))]
    BadTaper(String),

    #[error("The padding factor cannot be 0")]
    ZeroPadding,

    #[error("The chunk size cannot be 0")]
    ZeroChunkSize,

    #[error("SEFDs specified as {sefds:?}, not [<SEFD1>, <SEFD2>]")]
    BadSefds { sefds: Vec<f64> },

    #[error("--sefds, --bandwidth and --integration-time must be given together")]
    IncompleteSensitivity,

    #[error("Output file '{}' doesn't have a recognised extension. Supported formats: {}", .0.display(), VisOutputFormat::iter().join(", "))]
    BadOutputExtension(PathBuf),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Noise(#[from] NoiseError),

    #[error(transparent)]
    UnitParse(#[from] UnitParseError),
}

impl VisSynthesizeCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            job: self.job.or(other.job),
            output: self.output.or(other.output),
        }
    }
}

impl SynthesisArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            strategy: self.strategy.or(other.strategy),
            interpolation: self.interpolation.or(other.interpolation),
            padding: self.padding.or(other.padding),
            taper: self.taper.or(other.taper),
            chunk_size: self.chunk_size.or(other.chunk_size),
        }
    }
}

impl NoiseArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            seed: self.seed.or(other.seed),
            sefds: self.sefds.or(other.sefds),
            bandwidth: self.bandwidth.or(other.bandwidth),
            integration_time: self.integration_time.or(other.integration_time),
            efficiency: self.efficiency.or(other.efficiency),
        }
    }
}
