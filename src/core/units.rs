use crate::types::{RasterGrid, RasterValue};
use serde::{Deserialize, Serialize};

/// Largest alpha maximum still treated as radians (just above pi/2)
pub const RADIANS_MAX_ALPHA: f64 = 1.7;

/// Angular unit of an alpha grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnits {
    Radians,
    Degrees,
}

impl std::fmt::Display for AngleUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngleUnits::Radians => write!(f, "radians"),
            AngleUnits::Degrees => write!(f, "degrees"),
        }
    }
}

/// Maximum finite value of a grid, `None` when nothing is finite
pub fn finite_max<T: RasterValue>(grid: &RasterGrid<T>) -> Option<T> {
    grid.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: T| m.max(v))))
}

/// Decide whether an alpha grid holds radians or degrees.
///
/// The decision is made once for the whole grid from its largest finite
/// value, compared at the grid's precision. A grid with no finite value is
/// reported as degrees.
pub fn autodetect_alpha_units<T: RasterValue>(alpha: &RasterGrid<T>) -> AngleUnits {
    match finite_max(alpha) {
        Some(max) if max <= T::from_f64(RADIANS_MAX_ALPHA) => AngleUnits::Radians,
        _ => AngleUnits::Degrees,
    }
}

/// Return alpha in degrees together with the units that were detected
pub fn convert_alpha_to_degrees<T: RasterValue>(alpha: RasterGrid<T>) -> (RasterGrid<T>, AngleUnits) {
    let units = autodetect_alpha_units(&alpha);
    log::info!("Alpha units detected: {}", units);

    match units {
        AngleUnits::Radians => (alpha.mapv_into(|v| v.to_degrees()), units),
        AngleUnits::Degrees => (alpha, units),
    }
}
