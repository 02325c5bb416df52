use nalgebra::{Matrix3, Vector3};

pub type Real = f32;

pub type Vector = Vector3<Real>;
pub type Matrix = Matrix3<Real>;
pub type GridCoord = Vector3<i32>;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vector::zeros()
}

#[inline(always)]
pub fn repeat_vector(value: Real) -> Vector {
    Vector::repeat(value)
}

#[inline(always)]
pub fn zero_matrix() -> Matrix {
    Matrix::zeros()
}

#[inline(always)]
pub fn identity_matrix() -> Matrix {
    Matrix::identity()
}

/// Rank-one update `a * b^T`, the building block of APIC transfers.
#[inline(always)]
pub fn outer_product(a: Vector, b: Vector) -> Matrix {
    a * b.transpose()
}

#[inline(always)]
pub fn vector_is_finite(v: &Vector) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[inline(always)]
pub fn matrix_is_finite(m: &Matrix) -> bool {
    m.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_product_matches_components() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(4.0, 5.0, 6.0);
        let m = outer_product(a, b);
        assert_eq!(m[(0, 0)], 4.0);
        assert_eq!(m[(1, 2)], 12.0);
        assert_eq!(m[(2, 1)], 15.0);
    }

    #[test]
    fn finiteness_checks_catch_nan() {
        let mut m = identity_matrix();
        assert!(matrix_is_finite(&m));
        m[(1, 1)] = Real::NAN;
        assert!(!matrix_is_finite(&m));

        let mut v = zero_vector();
        assert!(vector_is_finite(&v));
        v.x = Real::INFINITY;
        assert!(!vector_is_finite(&v));
    }
}
