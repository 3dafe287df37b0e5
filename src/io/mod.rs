//! I/O modules for reading H/alpha rasters and writing class maps

pub mod raster_reader;
pub mod raster_writer;

pub use raster_reader::{ByteOrder, LoadedRaster, RasterReader, RawDataType, RawLayout};
pub use raster_writer::{quicklook_path, ClassMapWriter};
