use crate::core::palette::{self, NUM_CLASSES, TRANSPARENT};
use crate::types::{ClassMap, GeoContext, HaResult};
use gdal::raster::{Buffer, ColorEntry, ColorInterpretation, ColorTable, PaletteInterpretation, RasterCreationOption};
use gdal::{DriverManager, Metadata};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Band description written into the class map
pub const BAND_DESCRIPTION: &str = "H/alpha 9-zone class map (0=nodata, 1..9 classes)";

/// Derive the quicklook path: `ha9.tif` -> `ha9_ql.png`
pub fn quicklook_path<P: AsRef<Path>>(output: P) -> PathBuf {
    let mut path = output.as_ref().with_extension("").into_os_string();
    path.push("_ql.png");
    PathBuf::from(path)
}

/// Writer for paletted class-map GeoTIFFs and their quicklooks
pub struct ClassMapWriter;

impl ClassMapWriter {
    /// Write a single-band Byte GeoTIFF whose values index the zone palette.
    ///
    /// Palette entries 10..=255 are transparent and the class descriptions
    /// are stored as `CLASS_<n>` dataset metadata.
    pub fn write_paletted_geotiff<P: AsRef<Path>>(
        output_path: P,
        classes: &ClassMap,
        geo: &GeoContext,
        nodata: u8,
    ) -> HaResult<()> {
        log::info!("Writing paletted class GeoTIFF: {}", output_path.as_ref().display());

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let (height, width) = classes.dim();

        let options = [
            RasterCreationOption { key: "COMPRESS", value: "LZW" },
            RasterCreationOption { key: "TILED", value: "YES" },
        ];
        let mut dataset = driver.create_with_band_type_with_options::<u8, _>(
            output_path.as_ref(),
            width as isize,
            height as isize,
            1,
            &options,
        )?;

        if let Some(transform) = &geo.geo_transform {
            dataset.set_geo_transform(&transform.to_gdal())?;
        }
        if let Some(wkt) = &geo.projection {
            dataset.set_projection(wkt)?;
        }

        for (key, description) in palette::metadata_entries() {
            dataset.set_metadata_item(&key, description, "")?;
        }

        let mut rasterband = dataset.rasterband(1)?;
        let flat_data: Vec<u8> = classes.iter().copied().collect();
        let buffer = Buffer::new((width, height), flat_data);
        rasterband.write((0, 0), (width, height), &buffer)?;
        rasterband.set_no_data_value(Some(nodata as f64))?;

        // 256-entry RGBA table: zone colors for 0..=9, transparent elsewhere
        let mut table = ColorTable::new(PaletteInterpretation::Rgba);
        for index in 0..=255u16 {
            let (r, g, b, a) = if (index as usize) < NUM_CLASSES {
                palette::class_color(index as u8)
            } else {
                TRANSPARENT
            };
            table.set_color_entry(index, &ColorEntry::rgba(r as i16, g as i16, b as i16, a as i16));
        }
        rasterband.set_color_table(&table);
        if let Err(e) = rasterband.set_color_interpretation(ColorInterpretation::PaletteIndex) {
            log::warn!("Could not set palette color interpretation: {}", e);
        }
        if let Err(e) = rasterband.set_description(BAND_DESCRIPTION) {
            log::warn!("Could not set band description: {}", e);
        }

        log::info!("Class GeoTIFF saved ({}x{})", width, height);
        Ok(())
    }

    /// Render the class map as RGB using the palette colors
    pub fn render_quicklook(classes: &ClassMap) -> RgbImage {
        let (height, width) = classes.dim();
        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let (r, g, b, _) = palette::class_color(classes[[y as usize, x as usize]]);
            Rgb([r, g, b])
        })
    }

    /// Write the RGB quicklook PNG (no georeferencing)
    pub fn write_quicklook_png<P: AsRef<Path>>(output_path: P, classes: &ClassMap) -> HaResult<()> {
        let image = Self::render_quicklook(classes);
        image.save(output_path.as_ref())?;
        log::info!("Wrote quicklook PNG: {}", output_path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_quicklook_path() {
        assert_eq!(quicklook_path("ha9.tif"), PathBuf::from("ha9_ql.png"));
        assert_eq!(quicklook_path("out/scene.v2.tiff"), PathBuf::from("out/scene.v2_ql.png"));
        assert_eq!(quicklook_path("classes"), PathBuf::from("classes_ql.png"));
    }

    #[test]
    fn test_quicklook_colors_follow_palette() {
        let classes = array![[0u8, 1, 7], [9, 5, 200]];
        let image = ClassMapWriter::render_quicklook(&classes);

        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([255, 165, 0]));
        assert_eq!(image.get_pixel(2, 0), &Rgb([0, 204, 204]));
        assert_eq!(image.get_pixel(0, 1), &Rgb([153, 51, 153]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(image.get_pixel(2, 1), &Rgb([0, 0, 0]));
    }
}
