//! ESA color scheme and descriptions for the nine H/alpha zones

/// RGBA color entry
pub type Rgba = (u8, u8, u8, u8);

/// Number of defined class codes (0 = nodata, 1..=9 zones)
pub const NUM_CLASSES: usize = 10;

/// Fully transparent entry, used for nodata and unused palette slots
pub const TRANSPARENT: Rgba = (0, 0, 0, 0);

/// Class color table indexed by class code
pub static CLASS_COLORS: [Rgba; NUM_CLASSES] = [
    TRANSPARENT,          // nodata
    (255, 165, 0, 255),   // dihedral, orange
    (204, 0, 0, 255),     // forestry double-bounce, red
    (128, 0, 64, 255),    // branch/crown, maroon
    (255, 204, 0, 255),   // dipole, yellow
    (0, 255, 0, 255),     // vegetation, lime green
    (0, 100, 0, 255),     // anisotropic needles, dark green
    (0, 204, 204, 255),   // Bragg surface, cyan
    (0, 51, 153, 255),    // surface roughness, dark blue
    (153, 51, 153, 255),  // no feasible region, violet
];

/// Human-readable class descriptions indexed by class code
pub static CLASS_DESCRIPTIONS: [&str; NUM_CLASSES] = [
    "0: nodata / unclassified",
    "1: Dihedral scatterer (orange) [Z1]",
    "2: Forestry / double-bounce (red) [Z2]",
    "3: Branch / crown structure (maroon) [Z3]",
    "4: Dipole (yellow) [Z4]",
    "5: Vegetation (lime green) [Z5]",
    "6: Cloud of anisotropic needles (dark green) [Z6]",
    "7: Bragg surface (cyan) [Z7]",
    "8: Surface roughness / propagation (dark blue) [Z8]",
    "9: No feasible region / ambiguous (violet) [Z9]",
];

/// Color for a class code; codes outside 0..=9 are transparent
pub fn class_color(code: u8) -> Rgba {
    CLASS_COLORS
        .get(code as usize)
        .copied()
        .unwrap_or(TRANSPARENT)
}

pub fn class_description(code: u8) -> Option<&'static str> {
    CLASS_DESCRIPTIONS.get(code as usize).copied()
}

/// `CLASS_<n>` metadata entries for every defined class
pub fn metadata_entries() -> Vec<(String, &'static str)> {
    CLASS_DESCRIPTIONS
        .iter()
        .enumerate()
        .map(|(code, desc)| (format!("CLASS_{}", code), *desc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodata_and_unused_codes_transparent() {
        assert_eq!(class_color(0), TRANSPARENT);
        assert_eq!(class_color(10), TRANSPARENT);
        assert_eq!(class_color(255), TRANSPARENT);
        for code in 1..=9u8 {
            assert_eq!(class_color(code).3, 255);
        }
    }

    #[test]
    fn test_metadata_entries() {
        let entries = metadata_entries();
        assert_eq!(entries.len(), NUM_CLASSES);
        assert_eq!(entries[0], ("CLASS_0".to_string(), "0: nodata / unclassified"));
        assert_eq!(entries[7].0, "CLASS_7");
        assert!(entries[7].1.contains("Bragg"));
        assert_eq!(class_description(10), None);
    }
}
