//! Property tests for smoothing and calving invariants.

use iso_core::GridField;
use iso_geometry::{CALVING_FLOATING_THRESHOLD, CalvingFields, apply_calving, gaussian_filter};
use nalgebra::DMatrix;
use proptest::prelude::*;

proptest! {
    #[test]
    fn blur_conserves_mass_away_from_edges(
        sigma in 0.5f64..2.0,
        values in prop::collection::vec(-1000.0f64..1000.0, 16),
    ) {
        // 4x4 blob in the middle of a grid wide enough that the kernel never
        // reaches the boundary.
        let n = 4 + 2 * 12;
        let mut field = DMatrix::zeros(n, n);
        for (k, v) in values.iter().enumerate() {
            field[(12 + k / 4, 12 + k % 4)] = *v;
        }
        let blurred = gaussian_filter(&field, sigma);
        let before: f64 = field.sum();
        let scale: f64 = values.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
        prop_assert!((blurred.sum() - before).abs() < 1e-9 * scale);
    }

    #[test]
    fn calving_leaves_no_thin_floating_ice(
        cells in prop::collection::vec((0.0f64..1.0, 0.0f64..300.0, 0.0f64..1.0), 1..40),
        min_ice_thickness in 10.0f64..200.0,
    ) {
        let n = cells.len();
        let thickness = DMatrix::from_iterator(1, n, cells.iter().map(|c| c.1));
        let mut surface = GridField::filled("s", 1, n, 25.0);
        let mut draft = GridField::new("d", thickness.map(|t| 25.0 - t));
        let mut floating = GridField::new("f", DMatrix::from_iterator(1, n, cells.iter().map(|c| c.0)));
        let mut open = GridField::filled("o", 1, n, 0.0);
        let grounded = GridField::new("g", DMatrix::from_iterator(1, n, cells.iter().map(|c| c.2)));
        let before = floating.clone();

        apply_calving(&thickness, min_ice_thickness, CalvingFields {
            surface: &mut surface,
            draft: &mut draft,
            floating: &mut floating,
            open_ocean: &mut open,
            grounded: &grounded,
        });

        for i in 0..n {
            let calved = before.get(0, i) > CALVING_FLOATING_THRESHOLD
                && thickness[(0, i)] < min_ice_thickness;
            if calved {
                prop_assert_eq!(surface.get(0, i), 0.0);
                prop_assert_eq!(draft.get(0, i), 0.0);
                prop_assert_eq!(floating.get(0, i), 0.0);
                prop_assert_eq!(open.get(0, i), 1.0 - grounded.get(0, i));
            } else {
                prop_assert_eq!(floating.get(0, i), before.get(0, i));
            }
            if floating.get(0, i) > CALVING_FLOATING_THRESHOLD {
                prop_assert!(thickness[(0, i)] >= min_ice_thickness);
            }
        }
    }
}
