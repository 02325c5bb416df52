//! Material particles for MPM simulation
//!
//! Particles carry position, velocity, mass and material state. The
//! population is fixed after scene setup; numerically failing particles are
//! reset in place by the material projection, never removed.

use crate::materials::MaterialType;
use crate::math::{
    Matrix, Real, Vector, identity_matrix, matrix_is_finite, vector_is_finite, zero_matrix,
    zero_vector,
};

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vector,
    pub velocity: Vector,
    /// Constant after creation, strictly positive.
    pub mass: Real,
    /// Initial reference volume, constant after creation.
    pub volume0: Real,
    /// APIC affine velocity field (C matrix), recomputed every substep.
    pub affine_velocity: Matrix,
    /// Accumulated elastic deformation, `det > 0` invariant.
    pub deformation_gradient: Matrix,
    /// Accumulated plastic volume ratio (Jp). Drives snow hardening and the
    /// liquid pressure term.
    pub plastic_jacobian: Real,
    pub material: MaterialType,
}

impl Particle {
    pub fn new(position: Vector, material: MaterialType) -> Self {
        Self {
            position,
            velocity: zero_vector(),
            mass: 1.0,
            volume0: 1.0,
            affine_velocity: zero_matrix(),
            deformation_gradient: identity_matrix(),
            plastic_jacobian: 1.0,
            material,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    /// Particle mass from a reference volume and material density.
    pub fn with_density(mut self, volume0: Real, density: Real) -> Self {
        self.volume0 = volume0;
        self.mass = volume0 * density;
        self
    }

    #[inline(always)]
    pub fn jacobian(&self) -> Real {
        self.deformation_gradient.determinant()
    }

    /// True when every field the solver reads is usable.
    pub fn is_sound(&self) -> bool {
        vector_is_finite(&self.position)
            && vector_is_finite(&self.velocity)
            && matrix_is_finite(&self.deformation_gradient)
            && matrix_is_finite(&self.affine_velocity)
            && self.plastic_jacobian.is_finite()
            && self.mass > 0.0
            && self.volume0 > 0.0
    }

    /// Local recovery for a numerically failed particle: drop back to an
    /// identity-equivalent deformation instead of propagating NaN into the
    /// grid.
    pub fn reset_deformation(&mut self) {
        self.deformation_gradient = identity_matrix();
        self.affine_velocity = zero_matrix();
        self.plastic_jacobian = 1.0;
        if !vector_is_finite(&self.velocity) {
            self.velocity = zero_vector();
        }
    }
}
