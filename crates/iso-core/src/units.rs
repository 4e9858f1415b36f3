// iso-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Length as UomLength, MassDensity as UomMassDensity,
    Pressure as UomPressure,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Density = UomMassDensity;
pub type Length = UomLength;
pub type Pressure = UomPressure;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn to_pa(p: Pressure) -> f64 {
    use uom::si::pressure::pascal;
    p.get::<pascal>()
}

pub mod constants {
    use super::*;

    /// Gravitational acceleration used by the ocean model's land-ice coupling.
    pub const GRAVITY_MPS2: f64 = 9.80616;

    #[inline]
    pub fn gravity() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(GRAVITY_MPS2)
    }
}

/// Pressure change from displacing a water column of density `rho` by `dh`.
#[inline]
pub fn hydrostatic_pressure(rho: Density, dh: Length) -> Pressure {
    rho * constants::gravity() * dh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(2.0);
        let _rho = kg_per_m3(1027.0);
        let _g = constants::gravity();
    }

    #[test]
    fn hydrostatic_pressure_matches_rho_g_h() {
        let p = hydrostatic_pressure(kg_per_m3(1000.0), m(0.5));
        let expected = 1000.0 * constants::GRAVITY_MPS2 * 0.5;
        assert!((to_pa(p) - expected).abs() < 1e-9);
    }
}
