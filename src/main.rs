//! H/Alpha 9-zone classifier.
//!
//! Usage:
//!   ha9class --h_file H.tif --alpha_file alpha.tif --out ha9.tif
//!   ha9class --h_file H.bin --alpha_file alpha.bin --width 2048 --height 2048 --dtype float32
//!
//! Produces a paletted GeoTIFF (0 = nodata, 1..9 zones) and `<out>_ql.png`.

use anyhow::Context;
use clap::Parser;
use ha9class::io::{ByteOrder, RawDataType};
use ha9class::{run_pipeline, HAlphaThresholds, PipelineConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ha9class")]
#[command(version, about = "H/Alpha 9-Zone Classifier", long_about = None)]
struct Cli {
    /// Input Entropy (H) file (GeoTIFF or raw)
    #[arg(long = "h_file")]
    h_file: PathBuf,

    /// Input Alpha file (GeoTIFF or raw), radians or degrees
    #[arg(long = "alpha_file")]
    alpha_file: PathBuf,

    /// Output paletted GeoTIFF class map
    #[arg(long, default_value = "ha9.tif")]
    out: PathBuf,

    /// Required if inputs are raw binary
    #[arg(long)]
    width: Option<usize>,

    /// Required if inputs are raw binary
    #[arg(long)]
    height: Option<usize>,

    /// Raw binary data type
    #[arg(long, default_value = "float32")]
    dtype: RawDataType,

    /// Raw binary byte order
    #[arg(long, default_value = "little")]
    byteorder: ByteOrder,

    /// Entropy thresholds; when repeated, the last pair wins
    #[arg(long = "h_thresh", num_args = 2, value_names = ["H_LOW", "H_HIGH"], default_values_t = vec![0.5, 0.9])]
    h_thresh: Vec<f64>,

    /// Alpha thresholds for the Low H bin (degrees)
    #[arg(long = "alpha_thresh_low_h", num_args = 2, value_names = ["A_L1", "A_H1"], default_values_t = vec![42.5, 52.5])]
    alpha_thresh_low_h: Vec<f64>,

    /// Alpha thresholds for the Med H bin (degrees)
    #[arg(long = "alpha_thresh_med_h", num_args = 2, value_names = ["A_L2", "A_H2"], default_values_t = vec![40.0, 50.0])]
    alpha_thresh_med_h: Vec<f64>,

    /// Alpha thresholds for the High H bin (degrees)
    #[arg(long = "alpha_thresh_high_h", num_args = 2, value_names = ["A_L3", "A_H3"], default_values_t = vec![45.0, 55.0])]
    alpha_thresh_high_h: Vec<f64>,

    /// Write a JSON run report (thresholds, units, class statistics)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Last `(low, high)` pair given for a threshold flag.
///
/// Repeated flags append to the same list, so the final two values are the
/// most recent occurrence.
fn last_pair(name: &str, values: &[f64]) -> anyhow::Result<(f64, f64)> {
    match values {
        [.., low, high] => Ok((*low, *high)),
        _ => anyhow::bail!("--{} expects two values", name),
    }
}

impl Cli {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        Ok(PipelineConfig {
            h_file: self.h_file,
            alpha_file: self.alpha_file,
            output: self.out,
            width: self.width,
            height: self.height,
            dtype: self.dtype,
            byte_order: self.byteorder,
            thresholds: HAlphaThresholds {
                h: last_pair("h_thresh", &self.h_thresh)?,
                alpha_low_h: last_pair("alpha_thresh_low_h", &self.alpha_thresh_low_h)?,
                alpha_med_h: last_pair("alpha_thresh_med_h", &self.alpha_thresh_med_h)?,
                alpha_high_h: last_pair("alpha_thresh_high_h", &self.alpha_thresh_high_h)?,
            },
            report: self.report,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    log::debug!("Parsed CLI args: {:?}", cli);

    let config = cli.into_config()?;
    let summary = run_pipeline(&config).context("H/alpha classification failed")?;

    log::info!(
        "Done: {} ({} classified pixels), quicklook {}",
        summary.class_map.display(),
        summary.statistics.classified_pixels(),
        summary.quicklook.display()
    );
    Ok(())
}
