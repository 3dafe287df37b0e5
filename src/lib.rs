//! ha9class: H/Alpha 9-zone classifier for polarimetric SAR
//!
//! Classifies co-registered entropy (H) and mean scattering angle (alpha)
//! rasters into the nine Cloude-Pottier scattering zones and writes the
//! result as a paletted GeoTIFF plus an RGB quicklook.
//!
//! S. Cloude and E. Pottier, "An entropy based classification scheme for land
//! applications of polarimetric SAR", IEEE TGRS 35(1), 1997, pp. 68-78.

pub mod types;
pub mod io;
pub mod core;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    ClassMap, GeoContext, GeoTransform, HaError, HaResult, NodataMask, RasterData, RasterGrid,
    RasterValue,
};

pub use crate::core::{HAlphaThresholds, ZoneClassifier};
pub use crate::io::{ClassMapWriter, RasterReader};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineSummary};
