use ndarray::Array2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Real-valued raster sample (entropy, alpha angle).
///
/// Grids are compared against thresholds at their own precision, so every
/// f64 parameter is cast to the sample type before use.
pub trait RasterValue: Float + Send + Sync + std::fmt::Debug + 'static {
    fn from_f64(value: f64) -> Self;
}

impl RasterValue for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl RasterValue for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// 2D real raster grid (rows x cols)
pub type RasterGrid<T = f32> = Array2<T>;

/// Raster samples at the precision they were stored with
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    Float32(RasterGrid<f32>),
    Float64(RasterGrid<f64>),
}

impl RasterData {
    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            RasterData::Float32(grid) => grid.dim(),
            RasterData::Float64(grid) => grid.dim(),
        }
    }

    pub fn as_f32(&self) -> Option<&RasterGrid<f32>> {
        match self {
            RasterData::Float32(grid) => Some(grid),
            RasterData::Float64(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<&RasterGrid<f64>> {
        match self {
            RasterData::Float64(grid) => Some(grid),
            RasterData::Float32(_) => None,
        }
    }

    /// Lossless widening to f64
    pub fn to_f64(&self) -> RasterGrid<f64> {
        match self {
            RasterData::Float32(grid) => grid.mapv(|v| v as f64),
            RasterData::Float64(grid) => grid.clone(),
        }
    }
}

impl From<RasterGrid<f32>> for RasterData {
    fn from(grid: RasterGrid<f32>) -> Self {
        RasterData::Float32(grid)
    }
}

impl From<RasterGrid<f64>> for RasterData {
    fn from(grid: RasterGrid<f64>) -> Self {
        RasterData::Float64(grid)
    }
}

/// 2D class map, one zone code per pixel
pub type ClassMap = Array2<u8>;

/// 2D boolean mask, `true` marks nodata
pub type NodataMask = Array2<bool>;

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from GDAL's six-coefficient ordering
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Convert back to GDAL's six-coefficient ordering
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

/// Georeferencing carried from the inputs to the class map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoContext {
    pub geo_transform: Option<GeoTransform>,
    /// Spatial reference as WKT
    pub projection: Option<String>,
}

impl GeoContext {
    /// Take each field from `primary`, falling back to `secondary` when absent
    pub fn merge(primary: GeoContext, secondary: GeoContext) -> Self {
        Self {
            geo_transform: primary.geo_transform.or(secondary.geo_transform),
            projection: primary.projection.or(secondary.projection),
        }
    }

    pub fn is_georeferenced(&self) -> bool {
        self.geo_transform.is_some() || self.projection.is_some()
    }
}

/// Error types for H/alpha classification
#[derive(Debug, thiserror::Error)]
pub enum HaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Raw file size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("width & height required for raw binary inputs")]
    MissingDimensions,

    #[error("Cannot read raster {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Shape mismatch: H is {h:?}, alpha is {alpha:?}")]
    ShapeMismatch {
        h: (usize, usize),
        alpha: (usize, usize),
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for classification operations
pub type HaResult<T> = Result<T, HaError>;

/// Fail with `ShapeMismatch` unless both grids have the same dimensions
pub(crate) fn ensure_same_shape<A, B>(h: &Array2<A>, other: &Array2<B>) -> HaResult<()> {
    if h.dim() != other.dim() {
        return Err(HaError::ShapeMismatch {
            h: h.dim(),
            alpha: other.dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_context_merge_prefers_primary() {
        let h = GeoContext {
            geo_transform: None,
            projection: Some("H_WKT".to_string()),
        };
        let alpha = GeoContext {
            geo_transform: Some(GeoTransform::from_gdal([10.0, 1.0, 0.0, 20.0, 0.0, -1.0])),
            projection: Some("ALPHA_WKT".to_string()),
        };

        let merged = GeoContext::merge(h, alpha);
        assert_eq!(merged.projection.as_deref(), Some("H_WKT"));
        assert_eq!(
            merged.geo_transform.map(|gt| gt.to_gdal()),
            Some([10.0, 1.0, 0.0, 20.0, 0.0, -1.0])
        );
        assert!(merged.is_georeferenced());
    }

    #[test]
    fn test_raster_data_keeps_precision() {
        let narrow = RasterData::from(ndarray::array![[0.5f32, 1.0]]);
        assert_eq!(narrow.dim(), (1, 2));
        assert!(narrow.as_f64().is_none());
        assert_eq!(narrow.to_f64(), ndarray::array![[0.5f64, 1.0]]);

        let wide = RasterData::from(ndarray::array![[0.9000000001f64]]);
        assert!(wide.as_f32().is_none());
        assert_eq!(wide.as_f64().unwrap()[[0, 0]], 0.9000000001);
        assert_eq!(f32::from_f64(0.9000000001), 0.9f32);
    }

    #[test]
    fn test_shape_check() {
        let a = Array2::<f32>::zeros((2, 3));
        let b = Array2::<f32>::zeros((3, 2));
        assert!(ensure_same_shape(&a, &a).is_ok());
        assert!(matches!(
            ensure_same_shape(&a, &b),
            Err(HaError::ShapeMismatch { h: (2, 3), alpha: (3, 2) })
        ));
    }
}
