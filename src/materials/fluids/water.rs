//! Weakly compressible liquid model.
//!
//! Only the volume ratio `J = det(F)` matters for the pressure response;
//! shear is deliberately discarded each substep by resetting F to
//! `J^(1/3) * I`. That trades shear fidelity for stability.

use crate::math::{Matrix, Real, identity_matrix};

/// Isotropic pressure-like Kirchhoff stress `K (J - 1) I`.
#[inline]
pub fn stress(bulk_modulus: Real, jacobian: Real) -> Matrix {
    identity_matrix() * (bulk_modulus * (jacobian - 1.0))
}

/// Rebuild F as `J^(1/3) * I` so no shear survives the substep.
#[inline]
pub fn reset_deformation(jacobian: Real) -> Matrix {
    identity_matrix() * jacobian.cbrt()
}
