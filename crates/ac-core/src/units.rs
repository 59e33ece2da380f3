// ac-core/src/units.rs

use uom::si::f64::Pressure as UomPressure;

// Public canonical unit type (SI, f64)
pub type Pressure = UomPressure;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

/// Pressure value in bar, the unit the equilibrium backends expect.
#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

pub mod constants {
    /// Boltzmann constant [erg/K].
    pub const K_BOLTZMANN_CGS: f64 = 1.380_650_4e-16;

    /// Avogadro constant [1/mol].
    pub const AVOGADRO: f64 = 6.022_140_76e23;

    /// Pa -> dyn/cm².
    pub const PA_TO_BARYE: f64 = 10.0;
}

/// Total gas number density [cm⁻³] from pressure [Pa] and temperature [K].
#[inline]
pub fn number_density_cgs(p_pa: f64, t_k: f64) -> f64 {
    p_pa * constants::PA_TO_BARYE / (constants::K_BOLTZMANN_CGS * t_k)
}

/// Mean molecular weight [g/mol] -> mass of one molecule [kg].
#[inline]
pub fn molar_mass_to_kg(g_per_mol: f64) -> f64 {
    g_per_mol * 1e-3 / constants::AVOGADRO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};

    #[test]
    fn pascal_to_bar() {
        let tol = Tolerances::default();
        assert!(nearly_equal(to_bar(pa(1e5)), 1.0, tol));
        assert!(nearly_equal(to_bar(pa(2.5e6)), 25.0, tol));
    }

    #[test]
    fn hydrogen_molecule_mass() {
        // H2 ~ 2.016 g/mol -> ~3.35e-27 kg
        let m = molar_mass_to_kg(2.016);
        assert!(m > 3.3e-27 && m < 3.4e-27, "m = {m}");
    }

    #[test]
    fn loschmidt_order_of_magnitude() {
        // 1 bar, 273.15 K -> ~2.65e19 cm^-3
        let n = number_density_cgs(1e5, 273.15);
        assert!(n > 2.6e19 && n < 2.7e19, "n = {n}");
    }
}
