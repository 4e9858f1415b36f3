//! Calving of floating ice that is too thin for the ocean model.

use iso_core::GridField;
use nalgebra::DMatrix;

/// Floating coverage above which a cell is considered ice-covered.
pub const CALVING_FLOATING_THRESHOLD: f64 = 0.1;

/// Fields rewritten by the calving rule.
pub struct CalvingFields<'a> {
    pub surface: &'a mut GridField,
    pub draft: &'a mut GridField,
    pub floating: &'a mut GridField,
    pub open_ocean: &'a mut GridField,
    pub grounded: &'a GridField,
}

/// Convert thin floating ice to open ocean. Returns the number of calved cells.
///
/// `ice_thickness` is surface minus draft before any draft scaling.
pub fn apply_calving(
    ice_thickness: &DMatrix<f64>,
    min_ice_thickness: f64,
    fields: CalvingFields<'_>,
) -> usize {
    let (ny, nx) = ice_thickness.shape();
    let mut calved = 0;
    for r in 0..ny {
        for c in 0..nx {
            let floating = fields.floating.get(r, c);
            if floating > CALVING_FLOATING_THRESHOLD && ice_thickness[(r, c)] < min_ice_thickness {
                fields.surface.set(r, c, 0.0);
                fields.draft.set(r, c, 0.0);
                fields.floating.set(r, c, 0.0);
                fields.open_ocean.set(r, c, 1.0 - fields.grounded.get(r, c));
                calved += 1;
            }
        }
    }
    calved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thin_floating_ice_becomes_open_ocean() {
        let mut surface = GridField::from_row_major("s", 1, 3, &[10.0, 5.0, 50.0]).unwrap();
        let mut draft = GridField::from_row_major("d", 1, 3, &[-90.0, -1.0, -400.0]).unwrap();
        let mut floating = GridField::from_row_major("f", 1, 3, &[1.0, 0.8, 0.05]).unwrap();
        let mut open = GridField::filled("o", 1, 3, 0.0);
        let grounded = GridField::from_row_major("g", 1, 3, &[0.0, 0.2, 0.0]).unwrap();
        let thickness = surface.values.clone() - draft.values.clone();

        let n = apply_calving(
            &thickness,
            100.0,
            CalvingFields {
                surface: &mut surface,
                draft: &mut draft,
                floating: &mut floating,
                open_ocean: &mut open,
                grounded: &grounded,
            },
        );

        assert_eq!(n, 1);
        assert_eq!(surface.get(0, 1), 0.0);
        assert_eq!(draft.get(0, 1), 0.0);
        assert_eq!(floating.get(0, 1), 0.0);
        assert_eq!(open.get(0, 1), 1.0 - 0.2);
        // 100 m thick: kept
        assert_eq!(floating.get(0, 0), 1.0);
        // thin but barely floating: kept
        assert_eq!(floating.get(0, 2), 0.05);
    }
}
