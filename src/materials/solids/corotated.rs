//! Fixed-corotated hyperelasticity and the snow return mapping.
//!
//! Both operate on the singular value decomposition of the deformation
//! gradient. SVD failure is reported as `None` so the caller can fall back
//! to the per-particle recovery path.

use crate::math::{Matrix, Real, Vector, identity_matrix};

const SVD_EPS: Real = 1.0e-7;
const SVD_MAX_ITERS: usize = 256;

pub struct Svd3 {
    pub u: Matrix,
    pub singular_values: Vector,
    pub v_t: Matrix,
}

/// SVD of a 3x3 deformation gradient via `nalgebra`.
pub fn svd3(m: &Matrix) -> Option<Svd3> {
    let svd = m.try_svd(true, true, SVD_EPS, SVD_MAX_ITERS)?;
    let decomposed = Svd3 {
        u: svd.u?,
        singular_values: svd.singular_values,
        v_t: svd.v_t?,
    };
    if decomposed.singular_values.iter().all(|s| s.is_finite()) {
        Some(decomposed)
    } else {
        None
    }
}

/// Fixed-corotated Kirchhoff stress `2 mu (F - R) F^T + lambda J (J - 1) I`
/// with `R = U V^T` taken from the SVD of F.
pub fn corotated_stress(deformation_gradient: &Matrix, mu: Real, lambda: Real) -> Option<Matrix> {
    let svd = svd3(deformation_gradient)?;
    let rotation = svd.u * svd.v_t;
    let jacobian: Real = svd.singular_values.iter().product();

    let stress = (deformation_gradient - rotation) * deformation_gradient.transpose() * (2.0 * mu)
        + identity_matrix() * (lambda * jacobian * (jacobian - 1.0));
    Some(stress)
}

/// Plastic return mapping: clamp each singular value of F to
/// `[1 - critical_compression, 1 + critical_stretch]` and rebuild F.
///
/// Returns the projected F and the ratio of old to new singular value
/// products, which the caller folds into the plastic jacobian. Projecting
/// an already-projected F is a no-op (ratio 1).
pub fn clamp_deformation(
    deformation_gradient: &Matrix,
    critical_compression: Real,
    critical_stretch: Real,
) -> Option<(Matrix, Real)> {
    let svd = svd3(deformation_gradient)?;
    let lo = 1.0 - critical_compression;
    let hi = 1.0 + critical_stretch;

    let mut clamped = svd.singular_values;
    let mut plastic_ratio = 1.0;
    for axis in 0..3 {
        let sigma = svd.singular_values[axis];
        let new_sigma = sigma.clamp(lo, hi);
        plastic_ratio *= sigma / new_sigma;
        clamped[axis] = new_sigma;
    }

    let projected = svd.u * Matrix::from_diagonal(&clamped) * svd.v_t;
    Some((projected, plastic_ratio))
}
