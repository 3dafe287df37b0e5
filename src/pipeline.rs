//! End-to-end H/alpha classification run: load, normalize, mask, classify, write

use crate::core::{
    clamp_entropy, compose_nodata_mask, convert_alpha_to_degrees, AngleUnits, ClassStatistics,
    HAlphaThresholds, ZoneClassifier, UNCLASSIFIED,
};
use crate::io::{quicklook_path, ByteOrder, ClassMapWriter, RasterReader, RawDataType};
use crate::types::{ClassMap, GeoContext, HaError, HaResult, RasterData, RasterGrid, RasterValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything one classification run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub h_file: PathBuf,
    pub alpha_file: PathBuf,
    /// Paletted GeoTIFF output; the quicklook is derived from it
    pub output: PathBuf,
    /// Raw binary width, required with `height` for headerless inputs
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub dtype: RawDataType,
    pub byte_order: ByteOrder,
    pub thresholds: HAlphaThresholds,
    /// Optional JSON run report
    pub report: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            h_file: PathBuf::new(),
            alpha_file: PathBuf::new(),
            output: PathBuf::from("ha9.tif"),
            width: None,
            height: None,
            dtype: RawDataType::Float32,
            byte_order: ByteOrder::Little,
            thresholds: HAlphaThresholds::default(),
            report: None,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub class_map: PathBuf,
    pub quicklook: PathBuf,
    pub alpha_units: AngleUnits,
    pub georeferenced: bool,
    pub thresholds: HAlphaThresholds,
    pub statistics: ClassStatistics,
}

/// Classified grid plus the context needed to persist it
pub struct Classification {
    pub classes: ClassMap,
    pub geo: GeoContext,
    pub alpha_units: AngleUnits,
}

/// Load both inputs and classify them in memory
pub fn classify_inputs(config: &PipelineConfig) -> HaResult<Classification> {
    log::info!("Loading H file: {}", config.h_file.display());
    let h = RasterReader::load(
        &config.h_file,
        config.width,
        config.height,
        config.dtype,
        config.byte_order,
    )?;
    log::info!("Loading Alpha file: {}", config.alpha_file.display());
    let alpha = RasterReader::load(
        &config.alpha_file,
        config.width,
        config.height,
        config.dtype,
        config.byte_order,
    )?;

    if h.data.dim() != alpha.data.dim() {
        return Err(HaError::ShapeMismatch {
            h: h.data.dim(),
            alpha: alpha.data.dim(),
        });
    }

    let geo = GeoContext::merge(h.geo_context(), alpha.geo_context());
    if !geo.is_georeferenced() {
        log::warn!("Neither input carries georeferencing; output will be ungeoreferenced");
    }

    let classifier = ZoneClassifier::new(config.thresholds);
    let (h_nodata, alpha_nodata) = (h.nodata, alpha.nodata);
    let (classes, alpha_units) = match (h.data, alpha.data) {
        (RasterData::Float32(h), RasterData::Float32(alpha)) => {
            classify_grids(&classifier, h, h_nodata, alpha, alpha_nodata)?
        }
        (RasterData::Float32(h), RasterData::Float64(alpha)) => {
            classify_grids(&classifier, h, h_nodata, alpha, alpha_nodata)?
        }
        (RasterData::Float64(h), RasterData::Float32(alpha)) => {
            classify_grids(&classifier, h, h_nodata, alpha, alpha_nodata)?
        }
        (RasterData::Float64(h), RasterData::Float64(alpha)) => {
            classify_grids(&classifier, h, h_nodata, alpha, alpha_nodata)?
        }
    };

    Ok(Classification {
        classes,
        geo,
        alpha_units,
    })
}

/// Mask, normalize and classify one pair of grids, each at its own precision
fn classify_grids<H: RasterValue, A: RasterValue>(
    classifier: &ZoneClassifier,
    mut entropy: RasterGrid<H>,
    entropy_nodata: Option<f64>,
    alpha: RasterGrid<A>,
    alpha_nodata: Option<f64>,
) -> HaResult<(ClassMap, AngleUnits)> {
    // Sentinels refer to raw alpha values, so mask before unit conversion
    let nodata_mask = compose_nodata_mask(&entropy, entropy_nodata, &alpha, alpha_nodata)?;
    let (alpha_deg, alpha_units) = convert_alpha_to_degrees(alpha);

    clamp_entropy(&mut entropy);

    let classes = classifier.classify(&entropy, &alpha_deg, Some(&nodata_mask))?;
    Ok((classes, alpha_units))
}

/// Run the full pipeline and write every output
pub fn run_pipeline(config: &PipelineConfig) -> HaResult<PipelineSummary> {
    let classification = classify_inputs(config)?;

    ClassMapWriter::write_paletted_geotiff(
        &config.output,
        &classification.classes,
        &classification.geo,
        UNCLASSIFIED,
    )?;

    log_thresholds(&config.thresholds);

    let quicklook = quicklook_path(&config.output);
    ClassMapWriter::write_quicklook_png(&quicklook, &classification.classes)?;

    let statistics = ClassStatistics::from_class_map(&classification.classes);
    statistics.log_summary();

    let summary = PipelineSummary {
        class_map: config.output.clone(),
        quicklook,
        alpha_units: classification.alpha_units,
        georeferenced: classification.geo.is_georeferenced(),
        thresholds: config.thresholds,
        statistics,
    };

    if let Some(report) = &config.report {
        write_report(report, &summary)?;
    }

    Ok(summary)
}

/// Write the run summary as pretty-printed JSON
pub fn write_report<P: AsRef<Path>>(path: P, summary: &PipelineSummary) -> HaResult<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path.as_ref(), json)?;
    log::info!("Wrote run report: {}", path.as_ref().display());
    Ok(())
}

fn log_thresholds(thresholds: &HAlphaThresholds) {
    log::info!("Thresholds used:");
    log::info!("  H: {:?}", thresholds.h);
    log::info!("  Alpha (Low H): {:?}", thresholds.alpha_low_h);
    log::info!("  Alpha (Med H): {:?}", thresholds.alpha_med_h);
    log::info!("  Alpha (High H): {:?}", thresholds.alpha_high_h);
}
