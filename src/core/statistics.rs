use crate::core::palette::NUM_CLASSES;
use crate::types::ClassMap;
use serde::{Deserialize, Serialize};

/// Pixel counts per class code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// Count for codes 0..=9
    pub counts: [u64; NUM_CLASSES],
    /// Pixels with a code outside 0..=9
    pub out_of_range: u64,
    pub total_pixels: u64,
}

impl ClassStatistics {
    pub fn from_class_map(classes: &ClassMap) -> Self {
        #[cfg(feature = "parallel")]
        let counts = {
            use rayon::prelude::*;

            match classes.as_slice_memory_order() {
                Some(values) => values
                    .par_chunks(64 * 1024)
                    .map(histogram)
                    .reduce(|| [0u64; NUM_CLASSES + 1], merge_histograms),
                None => histogram_iter(classes.iter().copied()),
            }
        };
        #[cfg(not(feature = "parallel"))]
        let counts = histogram_iter(classes.iter().copied());

        let mut per_class = [0u64; NUM_CLASSES];
        per_class.copy_from_slice(&counts[..NUM_CLASSES]);

        Self {
            counts: per_class,
            out_of_range: counts[NUM_CLASSES],
            total_pixels: classes.len() as u64,
        }
    }

    /// Pixels that received a zone code 1..=9
    pub fn classified_pixels(&self) -> u64 {
        self.counts[1..].iter().sum()
    }

    /// Fraction of all pixels carrying `code`
    pub fn fraction(&self, code: u8) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        let count = self.counts.get(code as usize).copied().unwrap_or(0);
        count as f64 / self.total_pixels as f64
    }

    pub fn log_summary(&self) {
        log::info!(
            "Classified {} of {} pixels ({:.2}%)",
            self.classified_pixels(),
            self.total_pixels,
            if self.total_pixels == 0 {
                0.0
            } else {
                self.classified_pixels() as f64 * 100.0 / self.total_pixels as f64
            }
        );
        for (code, count) in self.counts.iter().enumerate() {
            log::debug!("  class {}: {} pixels ({:.2}%)", code, count, self.fraction(code as u8) * 100.0);
        }
        if self.out_of_range > 0 {
            log::warn!("{} pixels carry a code outside 0..=9", self.out_of_range);
        }
    }
}

/// Last slot counts codes above 9
#[cfg(feature = "parallel")]
fn histogram(values: &[u8]) -> [u64; NUM_CLASSES + 1] {
    histogram_iter(values.iter().copied())
}

fn histogram_iter(values: impl Iterator<Item = u8>) -> [u64; NUM_CLASSES + 1] {
    let mut counts = [0u64; NUM_CLASSES + 1];
    for v in values {
        counts[(v as usize).min(NUM_CLASSES)] += 1;
    }
    counts
}

#[cfg(feature = "parallel")]
fn merge_histograms(
    mut a: [u64; NUM_CLASSES + 1],
    b: [u64; NUM_CLASSES + 1],
) -> [u64; NUM_CLASSES + 1] {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x += y;
    }
    a
}
