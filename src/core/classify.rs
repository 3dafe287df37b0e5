use crate::types::{ensure_same_shape, ClassMap, HaResult, NodataMask, RasterGrid, RasterValue};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Class code for nodata / unclassified pixels
pub const UNCLASSIFIED: u8 = 0;

/// Zone codes indexed by `[entropy bin][alpha bin]`.
///
/// Rows are Low/Medium/High entropy, columns are alpha at or below the low
/// threshold, between the thresholds, and above the high threshold.
pub const ZONE_TABLE: [[u8; 3]; 3] = [
    [7, 4, 1],
    [8, 5, 2],
    [9, 6, 3],
];

/// H/alpha decision thresholds
///
/// Alpha thresholds are in degrees and depend on the entropy bin, which is how
/// the curved zone boundaries of the H/alpha plane are approximated.
/// Breakpoints are held as f64 and cast to each grid's sample type before
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HAlphaThresholds {
    /// Entropy breakpoints `(h_low, h_high)`
    pub h: (f64, f64),
    /// Alpha breakpoints for `H <= h_low`
    pub alpha_low_h: (f64, f64),
    /// Alpha breakpoints for `h_low < H <= h_high`
    pub alpha_med_h: (f64, f64),
    /// Alpha breakpoints for `H > h_high`
    pub alpha_high_h: (f64, f64),
}

impl Default for HAlphaThresholds {
    fn default() -> Self {
        Self {
            h: (0.5, 0.9),
            alpha_low_h: (42.5, 52.5),
            alpha_med_h: (40.0, 50.0),
            alpha_high_h: (45.0, 55.0),
        }
    }
}

impl HAlphaThresholds {
    /// Alpha breakpoints used inside the given entropy bin
    pub fn alpha_for(&self, bin: EntropyBin) -> (f64, f64) {
        match bin {
            EntropyBin::Low => self.alpha_low_h,
            EntropyBin::Medium => self.alpha_med_h,
            EntropyBin::High => self.alpha_high_h,
        }
    }

    /// Describe every breakpoint pair given as `low > high`.
    ///
    /// Out-of-order pairs are still accepted by the classifier; they only
    /// collapse or overlap bins.
    pub fn check_ordering(&self) -> Vec<String> {
        let pairs = [
            ("H", self.h),
            ("alpha (low H)", self.alpha_low_h),
            ("alpha (med H)", self.alpha_med_h),
            ("alpha (high H)", self.alpha_high_h),
        ];

        pairs
            .iter()
            .filter(|(_, (low, high))| low > high)
            .map(|(name, (low, high))| {
                format!("{} thresholds out of order: low {} > high {}", name, low, high)
            })
            .collect()
    }
}

/// Entropy bin of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntropyBin {
    Low,
    Medium,
    High,
}

impl EntropyBin {
    /// Bin an entropy value; `None` for NaN.
    ///
    /// Values equal to a breakpoint fall in the lower bin. Tiers are tested
    /// from the top down so that out-of-order breakpoints resolve overlapping
    /// ranges to the higher tier.
    pub fn from_entropy<T: RasterValue>(h: T, thresholds: &HAlphaThresholds) -> Option<Self> {
        let h_low = T::from_f64(thresholds.h.0);
        let h_high = T::from_f64(thresholds.h.1);
        if h > h_high {
            Some(EntropyBin::High)
        } else if h > h_low && h <= h_high {
            Some(EntropyBin::Medium)
        } else if h <= h_low {
            Some(EntropyBin::Low)
        } else {
            None
        }
    }

    fn index(self) -> usize {
        match self {
            EntropyBin::Low => 0,
            EntropyBin::Medium => 1,
            EntropyBin::High => 2,
        }
    }
}

/// Alpha sub-bin of a pixel within its entropy bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlphaBin {
    /// `alpha <= low`
    Low,
    /// `low < alpha <= high`
    Medium,
    /// `alpha > high`
    High,
}

impl AlphaBin {
    /// Bin an alpha angle (degrees) against a `(low, high)` pair; `None` for NaN
    pub fn from_alpha<T: RasterValue>(alpha: T, (low, high): (f64, f64)) -> Option<Self> {
        let (low, high) = (T::from_f64(low), T::from_f64(high));
        if alpha > high {
            Some(AlphaBin::High)
        } else if alpha > low && alpha <= high {
            Some(AlphaBin::Medium)
        } else if alpha <= low {
            Some(AlphaBin::Low)
        } else {
            None
        }
    }

    fn index(self) -> usize {
        match self {
            AlphaBin::Low => 0,
            AlphaBin::Medium => 1,
            AlphaBin::High => 2,
        }
    }
}

/// Zone code (1..=9) for an (entropy bin, alpha bin) combination
pub fn zone_code(entropy: EntropyBin, alpha: AlphaBin) -> u8 {
    ZONE_TABLE[entropy.index()][alpha.index()]
}

/// Classify a single pixel. NaN in either input gives `UNCLASSIFIED`.
///
/// H and alpha are each compared at their own precision.
#[inline]
pub fn classify_pixel<H: RasterValue, A: RasterValue>(
    h: H,
    alpha_deg: A,
    thresholds: &HAlphaThresholds,
) -> u8 {
    let Some(h_bin) = EntropyBin::from_entropy(h, thresholds) else {
        return UNCLASSIFIED;
    };
    match AlphaBin::from_alpha(alpha_deg, thresholds.alpha_for(h_bin)) {
        Some(a_bin) => zone_code(h_bin, a_bin),
        None => UNCLASSIFIED,
    }
}

/// H/alpha 9-zone classifier
pub struct ZoneClassifier {
    thresholds: HAlphaThresholds,
}

impl ZoneClassifier {
    /// Create a classifier with custom thresholds
    pub fn new(thresholds: HAlphaThresholds) -> Self {
        Self { thresholds }
    }

    /// Create a classifier with the standard thresholds
    pub fn standard() -> Self {
        Self::new(HAlphaThresholds::default())
    }

    pub fn thresholds(&self) -> &HAlphaThresholds {
        &self.thresholds
    }

    /// Classify an entropy grid and an alpha grid (degrees) into zone codes.
    ///
    /// Pixels flagged in `nodata_mask` are 0. Without a mask, pixels where H
    /// or alpha is NaN are 0. Inputs are not clamped or validated; every
    /// non-NaN, unmasked pixel receives exactly one code in 1..=9.
    pub fn classify<H: RasterValue, A: RasterValue>(
        &self,
        entropy: &RasterGrid<H>,
        alpha_deg: &RasterGrid<A>,
        nodata_mask: Option<&NodataMask>,
    ) -> HaResult<ClassMap> {
        ensure_same_shape(entropy, alpha_deg)?;

        let (rows, cols) = entropy.dim();
        log::info!("Classifying {}x{} pixels into H/alpha zones", rows, cols);
        log::debug!("Thresholds: {:?}", self.thresholds);

        for warning in self.thresholds.check_ordering() {
            log::warn!("{}", warning);
        }

        let thresholds = &self.thresholds;
        let mut classes = ClassMap::zeros((rows, cols));

        match nodata_mask {
            Some(mask) => {
                ensure_same_shape(entropy, mask)?;
                let assign = |class: &mut u8, &h: &H, &alpha: &A, &masked: &bool| {
                    *class = if masked {
                        UNCLASSIFIED
                    } else {
                        classify_pixel(h, alpha, thresholds)
                    };
                };
                let zip = Zip::from(&mut classes).and(entropy).and(alpha_deg).and(mask);
                #[cfg(feature = "parallel")]
                zip.par_for_each(assign);
                #[cfg(not(feature = "parallel"))]
                zip.for_each(assign);
            }
            None => {
                let assign = |class: &mut u8, &h: &H, &alpha: &A| {
                    *class = if h.is_nan() || alpha.is_nan() {
                        UNCLASSIFIED
                    } else {
                        classify_pixel(h, alpha, thresholds)
                    };
                };
                let zip = Zip::from(&mut classes).and(entropy).and(alpha_deg);
                #[cfg(feature = "parallel")]
                zip.par_for_each(assign);
                #[cfg(not(feature = "parallel"))]
                zip.for_each(assign);
            }
        }

        log::info!("Zone classification completed");
        Ok(classes)
    }
}

/// Classify with the given thresholds in one call
pub fn classify_9zones<H: RasterValue, A: RasterValue>(
    entropy: &RasterGrid<H>,
    alpha_deg: &RasterGrid<A>,
    thresholds: &HAlphaThresholds,
    nodata_mask: Option<&NodataMask>,
) -> HaResult<ClassMap> {
    ZoneClassifier::new(*thresholds).classify(entropy, alpha_deg, nodata_mask)
}
