//! Helper functions for materials
//!
//! Parameter conversions and sanity checks shared by the constitutive models.

/// Physics parameter conversions used by the solid material models.
pub mod physics {
    use crate::math::Real;

    /// Lame parameters (lambda, mu) from Young's modulus and Poisson ratio.
    #[inline]
    pub fn lame_lambda_mu(young_modulus: Real, poisson_ratio: Real) -> (Real, Real) {
        let lambda =
            young_modulus * poisson_ratio / ((1.0 + poisson_ratio) * (1.0 - 2.0 * poisson_ratio));
        (lambda, shear_modulus(young_modulus, poisson_ratio))
    }

    /// Shear modulus (mu) from Young's modulus and Poisson ratio.
    #[inline]
    pub fn shear_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (2.0 * (1.0 + poisson_ratio))
    }

    /// P-wave modulus `lambda + 2 mu`, the stiffness entering the explicit
    /// stability bound.
    #[inline]
    pub fn p_wave_modulus(lambda: Real, mu: Real) -> Real {
        lambda + 2.0 * mu
    }
}

/// Check if material properties make sense
pub mod check {
    use crate::math::Real;

    #[inline]
    pub fn young_modulus_ok(e: Real) -> bool {
        e > 0.0 && e < 1e12 && e.is_finite()
    }

    #[inline]
    pub fn poisson_ratio_ok(nu: Real) -> bool {
        nu > -1.0 && nu < 0.5 && nu.is_finite()
    }

    #[inline]
    pub fn bulk_modulus_ok(k: Real) -> bool {
        k > 0.0 && k.is_finite()
    }

    /// Check if deformation gradient determinant is reasonable
    #[inline]
    pub fn deformation_gradient_ok(det: Real) -> bool {
        det > crate::config::constants::MIN_DEFORMATION_DET && det < 1e6 && det.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lame_parameters_match_reference() {
        // E = 1000, nu = 0.2 (the original dam-break configuration).
        let (lambda, mu) = physics::lame_lambda_mu(1000.0, 0.2);
        assert!((mu - 416.666_66).abs() < 1e-2);
        assert!((lambda - 277.777_77).abs() < 1e-2);
    }

    #[test]
    fn checks_reject_nonsense() {
        assert!(!check::young_modulus_ok(-5.0));
        assert!(!check::poisson_ratio_ok(0.5));
        assert!(check::poisson_ratio_ok(0.2));
        assert!(!check::bulk_modulus_ok(0.0));
        assert!(!check::deformation_gradient_ok(-1.0));
        assert!(check::deformation_gradient_ok(1.0));
    }
}
