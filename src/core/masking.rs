use crate::types::{ensure_same_shape, HaResult, NodataMask, RasterGrid, RasterValue};
use ndarray::Zip;

/// Flag pixels equal to the declared nodata sentinel, or NaN.
///
/// The sentinel is compared at the grid's own precision.
pub fn nodata_mask_for<T: RasterValue>(grid: &RasterGrid<T>, nodata: Option<f64>) -> NodataMask {
    match nodata {
        Some(sentinel) => {
            let sentinel = T::from_f64(sentinel);
            grid.mapv(|v| v.is_nan() || v == sentinel)
        }
        None => grid.mapv(|v| v.is_nan()),
    }
}

/// Union of the nodata masks of both inputs.
///
/// Must be computed on the raw alpha grid, before unit conversion, so that
/// the alpha sentinel still matches.
pub fn compose_nodata_mask<H: RasterValue, A: RasterValue>(
    entropy: &RasterGrid<H>,
    entropy_nodata: Option<f64>,
    alpha: &RasterGrid<A>,
    alpha_nodata: Option<f64>,
) -> HaResult<NodataMask> {
    ensure_same_shape(entropy, alpha)?;

    let mut mask = nodata_mask_for(entropy, entropy_nodata);
    Zip::from(&mut mask)
        .and(&nodata_mask_for(alpha, alpha_nodata))
        .for_each(|m, &alpha_masked| *m |= alpha_masked);

    let masked = mask.iter().filter(|&&m| m).count();
    log::debug!(
        "Nodata mask: {} of {} pixels ({:.2}%)",
        masked,
        mask.len(),
        if mask.is_empty() { 0.0 } else { masked as f64 * 100.0 / mask.len() as f64 }
    );

    Ok(mask)
}

/// Clamp entropy to [0, 1] in place; NaN is left untouched.
///
/// Upstream entropy estimates can overshoot 1.0 slightly through rounding.
pub fn clamp_entropy<T: RasterValue>(entropy: &mut RasterGrid<T>) {
    let mut clamped = 0usize;
    entropy.mapv_inplace(|v| {
        if v > T::one() {
            clamped += 1;
            T::one()
        } else if v < T::zero() {
            clamped += 1;
            T::zero()
        } else {
            v
        }
    });

    if clamped > 0 {
        log::debug!("Clamped {} entropy values to [0, 1]", clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::ZoneClassifier;
    use ndarray::array;

    #[test]
    fn test_sentinel_and_nan_masked() {
        let grid = array![[-9999.0, 0.5], [f32::NAN, 0.0]];
        let mask = nodata_mask_for(&grid, Some(-9999.0));
        assert_eq!(mask, array![[true, false], [true, false]]);

        let mask = nodata_mask_for(&grid, None);
        assert_eq!(mask, array![[false, false], [true, false]]);
    }

    #[test]
    fn test_compose_masks_from_both_inputs() {
        let h = array![[0.0, 0.4, 0.6]];
        let alpha = array![[30.0, -1.0, f32::NAN]];
        let mask = compose_nodata_mask(&h, Some(0.0), &alpha, Some(-1.0)).unwrap();
        assert_eq!(mask, array![[true, true, true]]);

        let mask = compose_nodata_mask(&h, None, &alpha, None).unwrap();
        assert_eq!(mask, array![[false, false, true]]);
    }

    #[test]
    fn test_double_precision_sentinel() {
        let grid = array![[-9999.0f64, -9999.000000001, 0.5]];
        let mask = nodata_mask_for(&grid, Some(-9999.0));
        assert_eq!(mask, array![[true, false, false]]);
    }

    #[test]
    fn test_clamp_entropy() {
        let mut h = array![[1.05, -0.1, 0.5, f32::NAN]];
        clamp_entropy(&mut h);
        assert_eq!(h[[0, 0]], 1.0);
        assert_eq!(h[[0, 1]], 0.0);
        assert_eq!(h[[0, 2]], 0.5);
        assert!(h[[0, 3]].is_nan());
    }

    #[test]
    fn test_clamped_values_classify_like_bounds() {
        let classifier = ZoneClassifier::standard();
        let alpha = array![[30.0, 60.0, 30.0, 60.0]];

        let mut clamped = array![[1.05, 1.05, -0.1, -0.1]];
        clamp_entropy(&mut clamped);
        let bounds = array![[1.0, 1.0, 0.0, 0.0]];

        assert_eq!(
            classifier.classify(&clamped, &alpha, None).unwrap(),
            classifier.classify(&bounds, &alpha, None).unwrap()
        );
    }
}
