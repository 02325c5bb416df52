//! Material types for simulation
//!
//! Closed set of constitutive variants dispatched through a single match,
//! keeping the hot per-particle loop free of virtual calls.

use crate::config::ConfigError;
use crate::config::constants;
use crate::core::particle::Particle;
use crate::materials::fluids::water;
use crate::materials::solids::corotated;
use crate::materials::utils::{check, physics};
use crate::math::{Matrix, Real, zero_matrix};

#[derive(Clone, Debug, PartialEq)]
pub enum MaterialType {
    /// Fixed-corotated hyperelastic solid. F evolves freely; extreme
    /// compression can destabilize it, which is an accepted limitation of
    /// the purely elastic variant.
    Elastic {
        young_modulus: Real,
        poisson_ratio: Real,
        /// Constant scale on the Lame parameters (jelly uses 0.3).
        softening: Real,
    },
    /// Plastic fixed-corotated solid with a singular-value clamp and
    /// compaction hardening.
    SnowJelly {
        young_modulus: Real,
        poisson_ratio: Real,
        critical_compression: Real,
        critical_stretch: Real,
        hardening_exponent: Real,
    },
    /// Weakly compressible liquid tracking only `J`.
    Liquid { bulk_modulus: Real },
}

impl MaterialType {
    pub fn elastic(young_modulus: Real, poisson_ratio: Real) -> Self {
        Self::Elastic {
            young_modulus,
            poisson_ratio,
            softening: 1.0,
        }
    }

    /// Soft elastic preset matching the original jelly material.
    pub fn jelly(young_modulus: Real, poisson_ratio: Real) -> Self {
        Self::Elastic {
            young_modulus,
            poisson_ratio,
            softening: constants::JELLY_SOFTENING,
        }
    }

    pub fn snow(young_modulus: Real, poisson_ratio: Real) -> Self {
        Self::SnowJelly {
            young_modulus,
            poisson_ratio,
            critical_compression: constants::SNOW_CRITICAL_COMPRESSION,
            critical_stretch: constants::SNOW_CRITICAL_STRETCH,
            hardening_exponent: constants::SNOW_HARDENING_EXPONENT,
        }
    }

    pub fn liquid(bulk_modulus: Real) -> Self {
        Self::Liquid { bulk_modulus }
    }

    pub fn material_name(&self) -> &'static str {
        match self {
            Self::Elastic { .. } => "elastic",
            Self::SnowJelly { .. } => "snow",
            Self::Liquid { .. } => "liquid",
        }
    }

    /// Fatal parameter validation, run before the simulation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| Err(ConfigError::InvalidMaterial(reason));
        match *self {
            Self::Elastic {
                young_modulus,
                poisson_ratio,
                softening,
            } => {
                if !check::young_modulus_ok(young_modulus) {
                    return fail(format!("Young's modulus {young_modulus}"));
                }
                if !check::poisson_ratio_ok(poisson_ratio) {
                    return fail(format!("Poisson ratio {poisson_ratio}"));
                }
                if !(softening > 0.0) || !softening.is_finite() {
                    return fail(format!("softening factor {softening}"));
                }
            }
            Self::SnowJelly {
                young_modulus,
                poisson_ratio,
                critical_compression,
                critical_stretch,
                hardening_exponent,
            } => {
                if !check::young_modulus_ok(young_modulus) {
                    return fail(format!("Young's modulus {young_modulus}"));
                }
                if !check::poisson_ratio_ok(poisson_ratio) {
                    return fail(format!("Poisson ratio {poisson_ratio}"));
                }
                if !(critical_compression > 0.0 && critical_compression < 1.0) {
                    return fail(format!("critical compression {critical_compression}"));
                }
                if !(critical_stretch > 0.0) || !critical_stretch.is_finite() {
                    return fail(format!("critical stretch {critical_stretch}"));
                }
                if !hardening_exponent.is_finite() {
                    return fail(format!("hardening exponent {hardening_exponent}"));
                }
            }
            Self::Liquid { bulk_modulus } => {
                if !check::bulk_modulus_ok(bulk_modulus) {
                    return fail(format!("bulk modulus {bulk_modulus}"));
                }
            }
        }
        Ok(())
    }

    /// Kirchhoff-like stress from the particle's current deformation state.
    ///
    /// Returns `None` when the decomposition fails; the caller skips the
    /// stress contribution and lets `project_deformation` recover the
    /// particle at the end of the substep.
    pub fn stress(&self, particle: &Particle) -> Option<Matrix> {
        match *self {
            Self::Elastic {
                young_modulus,
                poisson_ratio,
                softening,
            } => {
                let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
                corotated::corotated_stress(
                    &particle.deformation_gradient,
                    mu * softening,
                    lambda * softening,
                )
            }
            Self::SnowJelly {
                young_modulus,
                poisson_ratio,
                hardening_exponent,
                ..
            } => {
                // Compacted snow stiffens: Jp < 1 raises the hardening factor.
                let hardening =
                    (hardening_exponent * (1.0 - particle.plastic_jacobian)).exp();
                let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
                corotated::corotated_stress(
                    &particle.deformation_gradient,
                    mu * hardening,
                    lambda * hardening,
                )
            }
            Self::Liquid { bulk_modulus } => {
                Some(water::stress(bulk_modulus, particle.jacobian()))
            }
        }
    }

    /// Characteristic elastic wave speed for the explicit stability bound.
    pub fn wave_speed(&self, density: Real) -> Real {
        if density <= 0.0 {
            return 0.0;
        }
        let stiffness = match *self {
            Self::Elastic {
                young_modulus,
                poisson_ratio,
                softening,
            } => {
                let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
                physics::p_wave_modulus(lambda, mu) * softening
            }
            Self::SnowJelly {
                young_modulus,
                poisson_ratio,
                ..
            } => {
                let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
                physics::p_wave_modulus(lambda, mu)
            }
            Self::Liquid { bulk_modulus } => bulk_modulus,
        };
        (stiffness / density).sqrt()
    }

    /// Post-update projection of the deformation state, run after the G2P
    /// deformation gradient update.
    ///
    /// Returns `true` when the particle had to be recovered from a
    /// numerical failure.
    pub fn project_deformation(&self, particle: &mut Particle) -> bool {
        let jacobian = particle.jacobian();
        if !jacobian.is_finite() || !check::deformation_gradient_ok(jacobian) {
            particle.reset_deformation();
            return true;
        }

        match *self {
            Self::Elastic { .. } => false,
            Self::SnowJelly {
                critical_compression,
                critical_stretch,
                ..
            } => {
                match corotated::clamp_deformation(
                    &particle.deformation_gradient,
                    critical_compression,
                    critical_stretch,
                ) {
                    Some((projected, plastic_ratio)) => {
                        particle.deformation_gradient = projected;
                        particle.plastic_jacobian *= plastic_ratio;
                        if !particle.plastic_jacobian.is_finite() {
                            particle.reset_deformation();
                            return true;
                        }
                        false
                    }
                    None => {
                        particle.reset_deformation();
                        true
                    }
                }
            }
            Self::Liquid { .. } => {
                particle.deformation_gradient = water::reset_deformation(jacobian);
                particle.plastic_jacobian = jacobian;
                false
            }
        }
    }
}

/// Scratch-free helper for a stress the transfers can always scatter:
/// failures map to a zero tensor.
#[inline]
pub fn stress_or_zero(material: &MaterialType, particle: &Particle) -> Matrix {
    material.stress(particle).unwrap_or_else(zero_matrix)
}
