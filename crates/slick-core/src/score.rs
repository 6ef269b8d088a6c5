//! Score normalization shared by every surface.
//!
//! A normalized score surface holds values in `[0, MAX_SCORE]` in flyable
//! cells and exactly [`MASKED_SCORE`] in masked cells. Both normalizers
//! tolerate degenerate input (no flyable cells, zero maximum) and never
//! produce NaN.

use crate::field::{FlyMask, Surface};

/// Score written to every masked cell.
pub const MASKED_SCORE: f64 = -1.0;

/// Upper end of the visible score range.
pub const MAX_SCORE: f64 = 5.0;

/// Normalize a raw distance field into a proximity score.
///
/// Close to the reference coastline scores high, far away scores low:
/// `score = 5 / maxD * (maxD - d)` over flyable cells, where `maxD` is
/// the largest flyable distance.
///
/// With no flyable cell the result is all [`MASKED_SCORE`]. With flyable
/// cells but `maxD == 0` (every flyable cell sits on the coastline) each
/// flyable cell scores [`MAX_SCORE`].
///
/// # Panics
///
/// Panics if `raw` and `mask` have different dimensions.
pub fn normalize_proximity(raw: &Surface, mask: &FlyMask) -> Surface {
    assert_same_shape(raw, mask);
    let Some(max_d) = raw.max_flyable(mask) else {
        return Surface::filled(raw.width(), raw.height(), MASKED_SCORE);
    };
    let values = raw
        .values()
        .iter()
        .zip(mask.cells())
        .map(|(&d, &m)| {
            if m == 1 {
                MASKED_SCORE
            } else if max_d <= 0.0 {
                MAX_SCORE
            } else {
                (MAX_SCORE * ((max_d - d) / max_d)).clamp(0.0, MAX_SCORE)
            }
        })
        .collect();
    Surface::from_values(raw.width(), raw.height(), values)
}

/// Normalize a non-negative intensity field: `score = 5 * v / max`.
///
/// `max` is taken over flyable cells only. If it is not positive (no
/// flyable cell, or no mass inside the fly zone) the result is the
/// [`Surface::baseline`] of `mask`.
///
/// # Panics
///
/// Panics if `raw` and `mask` have different dimensions.
pub fn normalize_intensity(raw: &Surface, mask: &FlyMask) -> Surface {
    assert_same_shape(raw, mask);
    let max = match raw.max_flyable(mask) {
        Some(m) if m > 0.0 && m.is_finite() => m,
        _ => return Surface::baseline(mask),
    };
    let values = raw
        .values()
        .iter()
        .zip(mask.cells())
        .map(|(&v, &m)| {
            if m == 1 {
                MASKED_SCORE
            } else {
                (MAX_SCORE * (v / max)).clamp(0.0, MAX_SCORE)
            }
        })
        .collect();
    Surface::from_values(raw.width(), raw.height(), values)
}

fn assert_same_shape(raw: &Surface, mask: &FlyMask) {
    assert!(
        raw.width() == mask.width() && raw.height() == mask.height(),
        "surface {}x{} does not match mask {}x{}",
        raw.width(),
        raw.height(),
        mask.width(),
        mask.height()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mask_with(cells: &[(usize, usize)], w: usize, h: usize) -> FlyMask {
        let mut m = FlyMask::all_flyable(w, h);
        for &(i, j) in cells {
            m.set_masked(i, j, true);
        }
        m
    }

    #[test]
    fn proximity_scores_nearest_highest() {
        let raw = Surface::from_values(3, 1, vec![0.0, 1.0, 2.0]);
        let s = normalize_proximity(&raw, &FlyMask::all_flyable(3, 1));
        assert_eq!(s.values(), &[5.0, 2.5, 0.0]);
    }

    #[test]
    fn proximity_masked_cells_are_minus_one() {
        let raw = Surface::from_values(2, 1, vec![10.0, 2.0]);
        let s = normalize_proximity(&raw, &mask_with(&[(0, 0)], 2, 1));
        assert_eq!(s.values(), &[-1.0, 0.0]);
    }

    #[test]
    fn proximity_all_masked_is_all_minus_one() {
        let raw = Surface::filled(2, 2, 0.0);
        let s = normalize_proximity(&raw, &FlyMask::all_masked(2, 2));
        assert!(s.values().iter().all(|&v| v == MASKED_SCORE));
    }

    #[test]
    fn proximity_zero_max_scores_full() {
        let raw = Surface::filled(2, 1, 0.0);
        let s = normalize_proximity(&raw, &mask_with(&[(1, 0)], 2, 1));
        assert_eq!(s.values(), &[MAX_SCORE, MASKED_SCORE]);
    }

    #[test]
    fn intensity_scales_to_max_score() {
        let raw = Surface::from_values(2, 2, vec![1.0, 4.0, 2.0, 100.0]);
        let s = normalize_intensity(&raw, &mask_with(&[(1, 1)], 2, 2));
        assert_eq!(s.values(), &[1.25, 5.0, 2.5, -1.0]);
    }

    #[test]
    fn intensity_without_mass_is_baseline() {
        let mask = mask_with(&[(0, 0)], 2, 1);
        let raw = Surface::filled(2, 1, 0.0);
        assert_eq!(normalize_intensity(&raw, &mask), Surface::baseline(&mask));
    }

    proptest! {
        #[test]
        fn normalized_scores_stay_in_range(
            values in prop::collection::vec(0.0f64..1e6, 12),
            masked in prop::collection::vec(any::<bool>(), 12),
        ) {
            let raw = Surface::from_values(4, 3, values);
            let mut mask = FlyMask::all_flyable(4, 3);
            for (k, &m) in masked.iter().enumerate() {
                mask.set_masked(k % 4, k / 4, m);
            }
            for s in [normalize_proximity(&raw, &mask), normalize_intensity(&raw, &mask)] {
                for (k, &v) in s.values().iter().enumerate() {
                    if mask.cells()[k] == 1 {
                        prop_assert_eq!(v, MASKED_SCORE);
                    } else {
                        prop_assert!((0.0..=MAX_SCORE).contains(&v));
                    }
                }
            }
        }
    }
}
