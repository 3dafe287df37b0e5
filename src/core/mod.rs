//! Core H/alpha classification modules

pub mod classify;
pub mod masking;
pub mod palette;
pub mod statistics;
pub mod units;

// Re-export main types
pub use classify::{
    classify_9zones, classify_pixel, zone_code, AlphaBin, EntropyBin, HAlphaThresholds,
    ZoneClassifier, UNCLASSIFIED, ZONE_TABLE,
};
pub use masking::{clamp_entropy, compose_nodata_mask, nodata_mask_for};
pub use palette::{class_color, class_description, metadata_entries, Rgba, CLASS_COLORS, CLASS_DESCRIPTIONS};
pub use statistics::ClassStatistics;
pub use units::{autodetect_alpha_units, convert_alpha_to_degrees, AngleUnits};
