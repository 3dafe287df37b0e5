use crate::types::{GeoContext, GeoTransform, HaError, HaResult, RasterData};
use gdal::Dataset;
use ndarray::Array2;
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Element type of a raw binary raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawDataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    #[default]
    Float32,
    Float64,
}

impl RawDataType {
    /// Bytes per element
    pub fn size(&self) -> usize {
        match self {
            RawDataType::Int8 | RawDataType::UInt8 => 1,
            RawDataType::Int16 | RawDataType::UInt16 => 2,
            RawDataType::Int32 | RawDataType::UInt32 | RawDataType::Float32 => 4,
            RawDataType::Float64 => 8,
        }
    }
}

impl FromStr for RawDataType {
    type Err = HaError;

    /// Accepts numpy-style names (`float32`, `f4`, `<f4`, `int16`, `u2`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(['<', '>', '=']).to_lowercase();
        match name.as_str() {
            "int8" | "i1" => Ok(RawDataType::Int8),
            "uint8" | "u1" | "byte" => Ok(RawDataType::UInt8),
            "int16" | "i2" => Ok(RawDataType::Int16),
            "uint16" | "u2" => Ok(RawDataType::UInt16),
            "int32" | "i4" => Ok(RawDataType::Int32),
            "uint32" | "u4" => Ok(RawDataType::UInt32),
            "float32" | "f4" | "single" => Ok(RawDataType::Float32),
            "float64" | "f8" | "double" => Ok(RawDataType::Float64),
            _ => Err(HaError::InvalidParameter(format!("Unsupported raw data type: {}", s))),
        }
    }
}

impl std::fmt::Display for RawDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RawDataType::Int8 => "int8",
            RawDataType::UInt8 => "uint8",
            RawDataType::Int16 => "int16",
            RawDataType::UInt16 => "uint16",
            RawDataType::Int32 => "int32",
            RawDataType::UInt32 => "uint32",
            RawDataType::Float32 => "float32",
            RawDataType::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// Byte order of a raw binary raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl FromStr for ByteOrder {
    type Err = HaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "little" => Ok(ByteOrder::Little),
            "big" => Ok(ByteOrder::Big),
            _ => Err(HaError::InvalidParameter(format!(
                "Invalid byte order '{}', expected 'little' or 'big'",
                s
            ))),
        }
    }
}

/// Dimensions and encoding of a headerless raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLayout {
    pub width: usize,
    pub height: usize,
    pub dtype: RawDataType,
    pub byte_order: ByteOrder,
}

impl RawLayout {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dtype: RawDataType::default(),
            byte_order: ByteOrder::default(),
        }
    }

    /// Exact file size implied by the layout
    pub fn expected_bytes(&self) -> u64 {
        (self.width as u64) * (self.height as u64) * (self.dtype.size() as u64)
    }
}

/// Raster band plus whatever georeferencing the source carried
#[derive(Debug, Clone)]
pub struct LoadedRaster {
    pub data: RasterData,
    pub geo_transform: Option<GeoTransform>,
    pub projection: Option<String>,
    pub nodata: Option<f64>,
}

impl LoadedRaster {
    /// Wrap a bare grid without georeferencing
    pub fn from_grid(data: RasterData) -> Self {
        Self {
            data,
            geo_transform: None,
            projection: None,
            nodata: None,
        }
    }

    pub fn geo_context(&self) -> GeoContext {
        GeoContext {
            geo_transform: self.geo_transform,
            projection: self.projection.clone(),
        }
    }
}

/// Reader for GDAL-readable rasters and raw binaries
pub struct RasterReader;

impl RasterReader {
    /// Read band 1 of a GDAL-readable raster as f32
    pub fn read_gdal<P: AsRef<Path>>(path: P) -> HaResult<LoadedRaster> {
        let path = path.as_ref();
        let dataset = Dataset::open(path)?;

        let (width, height) = dataset.raster_size();
        log::debug!("Raster size: {}x{}", width, height);

        // GDAL reports a missing geotransform as an error
        let geo_transform = dataset.geo_transform().ok().map(GeoTransform::from_gdal);
        let projection = Some(dataset.projection()).filter(|wkt| !wkt.is_empty());

        let rasterband = dataset.rasterband(1)?;
        let nodata = rasterband.no_data_value();
        let band_data = rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let data = Array2::from_shape_vec((height, width), band_data.data)
            .map_err(|e| HaError::Processing(format!("Failed to reshape raster data: {}", e)))?
            .into();

        log::debug!("Geotransform: {:?}, nodata: {:?}", geo_transform, nodata);

        Ok(LoadedRaster {
            data,
            geo_transform,
            projection,
            nodata,
        })
    }

    /// Read a headerless raster whose size must match `layout` exactly.
    ///
    /// `float32` stays single precision; every other type is widened to f64,
    /// which holds all of them exactly.
    pub fn read_raw_binary<P: AsRef<Path>>(path: P, layout: &RawLayout) -> HaResult<RasterData> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| HaError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let expected = layout.expected_bytes();
        if bytes.len() as u64 != expected {
            return Err(HaError::SizeMismatch {
                expected,
                actual: bytes.len() as u64,
            });
        }

        log::debug!(
            "Decoding raw {}x{} {} ({:?} endian)",
            layout.width,
            layout.height,
            layout.dtype,
            layout.byte_order
        );

        let order = layout.byte_order;
        let shape = (layout.height, layout.width);
        let data = match layout.dtype {
            RawDataType::Float32 => {
                let values: Vec<f32> = decode(&bytes, order, f32::from_le_bytes, f32::from_be_bytes);
                RasterData::Float32(reshape(shape, values)?)
            }
            dtype => {
                let values: Vec<f64> = match dtype {
                    RawDataType::Int8 => decode(&bytes, order, i8::from_le_bytes, i8::from_be_bytes),
                    RawDataType::UInt8 => decode(&bytes, order, u8::from_le_bytes, u8::from_be_bytes),
                    RawDataType::Int16 => decode(&bytes, order, i16::from_le_bytes, i16::from_be_bytes),
                    RawDataType::UInt16 => decode(&bytes, order, u16::from_le_bytes, u16::from_be_bytes),
                    RawDataType::Int32 => decode(&bytes, order, i32::from_le_bytes, i32::from_be_bytes),
                    RawDataType::UInt32 => decode(&bytes, order, u32::from_le_bytes, u32::from_be_bytes),
                    _ => decode(&bytes, order, f64::from_le_bytes, f64::from_be_bytes),
                };
                RasterData::Float64(reshape(shape, values)?)
            }
        };

        Ok(data)
    }

    /// Load a raster through GDAL, falling back to raw binary.
    ///
    /// The raw path needs both `width` and `height`; it carries no
    /// georeferencing or nodata value.
    pub fn load<P: AsRef<Path>>(
        path: P,
        width: Option<usize>,
        height: Option<usize>,
        dtype: RawDataType,
        byte_order: ByteOrder,
    ) -> HaResult<LoadedRaster> {
        let path = path.as_ref();

        match Self::read_gdal(path) {
            Ok(raster) => return Ok(raster),
            Err(e) => log::debug!("GDAL cannot open {}: {}", path.display(), e),
        }

        let (Some(width), Some(height)) = (width, height) else {
            return Err(HaError::MissingDimensions);
        };

        log::info!("Reading {} as raw binary", path.display());
        let layout = RawLayout {
            width,
            height,
            dtype,
            byte_order,
        };
        let data = Self::read_raw_binary(path, &layout)?;
        Ok(LoadedRaster::from_grid(data))
    }
}

fn reshape<T>(shape: (usize, usize), values: Vec<T>) -> HaResult<Array2<T>> {
    Array2::from_shape_vec(shape, values)
        .map_err(|e| HaError::Processing(format!("Failed to reshape raw data: {}", e)))
}

fn decode<const N: usize, S, T>(
    bytes: &[u8],
    order: ByteOrder,
    from_le: fn([u8; N]) -> S,
    from_be: fn([u8; N]) -> S,
) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: Copy + 'static,
{
    let convert = match order {
        ByteOrder::Little => from_le,
        ByteOrder::Big => from_be,
    };

    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            convert(buf).as_()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_bytes(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_dtype_parsing() {
        assert_eq!("float32".parse::<RawDataType>().unwrap(), RawDataType::Float32);
        assert_eq!("<f8".parse::<RawDataType>().unwrap(), RawDataType::Float64);
        assert_eq!("UINT16".parse::<RawDataType>().unwrap(), RawDataType::UInt16);
        assert!(matches!(
            "complex64".parse::<RawDataType>(),
            Err(HaError::InvalidParameter(_))
        ));
        assert_eq!("big".parse::<ByteOrder>().unwrap(), ByteOrder::Big);
        assert!(matches!("middle".parse::<ByteOrder>(), Err(HaError::InvalidParameter(_))));
    }

    #[test]
    fn test_read_float32_little_endian() {
        let values = [0.1f32, 0.5, 0.9, 1.0, -2.5, 42.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let file = write_bytes(&bytes);

        let data = RasterReader::read_raw_binary(file.path(), &RawLayout::new(3, 2)).unwrap();
        let grid = data.as_f32().unwrap();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid[[0, 0]], 0.1);
        assert_eq!(grid[[1, 1]], -2.5);
        assert_eq!(grid[[1, 2]], 42.0);
    }

    #[test]
    fn test_read_float32_big_endian() {
        let values = [0.9f32, -9999.0, 1.2345678];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let file = write_bytes(&bytes);
        let layout = RawLayout {
            byte_order: ByteOrder::Big,
            ..RawLayout::new(3, 1)
        };

        let data = RasterReader::read_raw_binary(file.path(), &layout).unwrap();
        assert_eq!(data.as_f32().unwrap().as_slice().unwrap(), &values);

        // Same bytes read as little endian give different values
        let swapped = RasterReader::read_raw_binary(file.path(), &RawLayout::new(3, 1)).unwrap();
        assert_ne!(swapped.as_f32().unwrap().as_slice().unwrap(), &values);
    }

    #[test]
    fn test_float64_keeps_double_precision() {
        let values = [0.9000000001f64, 60.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let file = write_bytes(&bytes);
        let layout = RawLayout {
            dtype: RawDataType::Float64,
            ..RawLayout::new(2, 1)
        };

        let data = RasterReader::read_raw_binary(file.path(), &layout).unwrap();
        let grid = data.as_f64().unwrap();
        assert_eq!(grid[[0, 0]], 0.9000000001);
        assert_eq!(grid[[0, 1]], 60.0);
    }

    #[test]
    fn test_read_big_endian_variants() {
        let values = [1.5f64, -0.25];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let file = write_bytes(&bytes);
        let layout = RawLayout {
            width: 2,
            height: 1,
            dtype: RawDataType::Float64,
            byte_order: ByteOrder::Big,
        };
        let data = RasterReader::read_raw_binary(file.path(), &layout).unwrap();
        let grid = data.as_f64().unwrap();
        assert_eq!(grid[[0, 0]], 1.5);
        assert_eq!(grid[[0, 1]], -0.25);

        let bytes: Vec<u8> = [300i16, -7].iter().flat_map(|v| v.to_be_bytes()).collect();
        let file = write_bytes(&bytes);
        let layout = RawLayout {
            width: 1,
            height: 2,
            dtype: RawDataType::Int16,
            byte_order: ByteOrder::Big,
        };
        let data = RasterReader::read_raw_binary(file.path(), &layout).unwrap();
        let grid = data.as_f64().unwrap();
        assert_eq!(grid[[0, 0]], 300.0);
        assert_eq!(grid[[1, 0]], -7.0);
    }

    #[test]
    fn test_size_mismatch() {
        let file = write_bytes(&[0u8; 20]);
        let result = RasterReader::read_raw_binary(file.path(), &RawLayout::new(2, 2));
        assert!(matches!(
            result,
            Err(HaError::SizeMismatch { expected: 16, actual: 20 })
        ));

        let file = write_bytes(&[0u8; 12]);
        let result = RasterReader::read_raw_binary(file.path(), &RawLayout::new(2, 2));
        assert!(matches!(result, Err(HaError::SizeMismatch { .. })));
    }

    #[test]
    fn test_raw_without_dimensions_rejected() {
        let file = write_bytes(&[0u8; 16]);
        let result = RasterReader::load(file.path(), Some(2), None, RawDataType::Float32, ByteOrder::Little);
        assert!(matches!(result, Err(HaError::MissingDimensions)));
    }

    #[test]
    fn test_load_falls_back_to_raw() {
        let bytes: Vec<u8> = [0.25f32; 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let file = write_bytes(&bytes);
        let raster = RasterReader::load(file.path(), Some(2), Some(2), RawDataType::Float32, ByteOrder::Little)
            .unwrap();
        assert_eq!(raster.data.dim(), (2, 2));
        assert!(raster.data.as_f32().unwrap().iter().all(|&v| v == 0.25));
        assert!(raster.nodata.is_none());
        assert!(!raster.geo_context().is_georeferenced());
    }

    #[test]
    fn test_missing_file_unreadable() {
        let result = RasterReader::load(
            "/nonexistent/ha9class/h.bin",
            Some(2),
            Some(2),
            RawDataType::Float32,
            ByteOrder::Little,
        );
        assert!(matches!(result, Err(HaError::Unreadable { .. })));
    }
}
