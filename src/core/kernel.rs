//! Quadratic B-spline interpolation shared by the P2G and G2P transfers.
//!
//! Quadratic (rather than linear) splines keep the interpolated gradients
//! continuous across cell crossings, which the stress computation needs.
//! Each particle touches exactly a 3x3x3 node neighborhood.

use crate::math::{GridCoord, Real, Vector};

/// Nodes touched along one axis.
pub const KERNEL_SIZE: usize = 3;
/// Nodes touched by one particle in 3-D.
pub const NEIGHBOR_COUNT: usize = KERNEL_SIZE * KERNEL_SIZE * KERNEL_SIZE;

/// Inverse APIC inertia factor `D^-1 = 4 / dx^2` for quadratic splines.
#[inline(always)]
pub fn inv_d(cell_width: Real) -> Real {
    4.0 / (cell_width * cell_width)
}

/// Per-particle interpolation data: base node of the 3x3x3 neighborhood,
/// per-axis weights and world-space derivative weights.
pub struct GridInterpolation {
    pub base_cell: GridCoord,
    /// `weights[k][axis]` is the spline weight of node offset `k` along `axis`.
    pub weights: [Vector; KERNEL_SIZE],
    /// World-space derivatives of the per-axis weights.
    pub dweights: [Vector; KERNEL_SIZE],
    /// Particle position in cell units relative to `base_cell`.
    pub fx: Vector,
    cell_width: Real,
}

impl GridInterpolation {
    pub fn compute_for_particle(position: Vector, cell_width: Real) -> Self {
        let inv = 1.0 / cell_width;
        let scaled = position * inv;
        let base_cell = GridCoord::new(
            (scaled.x - 0.5).floor() as i32,
            (scaled.y - 0.5).floor() as i32,
            (scaled.z - 0.5).floor() as i32,
        );
        let fx = scaled - Vector::new(base_cell.x as Real, base_cell.y as Real, base_cell.z as Real);

        let mut weights = [Vector::zeros(); KERNEL_SIZE];
        let mut dweights = [Vector::zeros(); KERNEL_SIZE];
        for axis in 0..3 {
            let d = fx[axis];
            weights[0][axis] = 0.5 * (1.5 - d) * (1.5 - d);
            weights[1][axis] = 0.75 - (d - 1.0) * (d - 1.0);
            weights[2][axis] = 0.5 * (d - 0.5) * (d - 0.5);
            dweights[0][axis] = -(1.5 - d) * inv;
            dweights[1][axis] = -2.0 * (d - 1.0) * inv;
            dweights[2][axis] = (d - 0.5) * inv;
        }

        Self {
            base_cell,
            weights,
            dweights,
            fx,
            cell_width,
        }
    }

    /// Full 3-D weight for the neighbor at offsets `(i, j, k)`.
    #[inline(always)]
    pub fn weight(&self, i: usize, j: usize, k: usize) -> Real {
        self.weights[i].x * self.weights[j].y * self.weights[k].z
    }

    /// Full world-space weight gradient by the per-axis product rule.
    #[inline(always)]
    pub fn weight_gradient(&self, i: usize, j: usize, k: usize) -> Vector {
        Vector::new(
            self.dweights[i].x * self.weights[j].y * self.weights[k].z,
            self.weights[i].x * self.dweights[j].y * self.weights[k].z,
            self.weights[i].x * self.weights[j].y * self.dweights[k].z,
        )
    }

    /// World-space offset from the particle to the neighbor node.
    #[inline(always)]
    pub fn node_offset(&self, i: usize, j: usize, k: usize) -> Vector {
        (Vector::new(i as Real, j as Real, k as Real) - self.fx) * self.cell_width
    }

    #[inline(always)]
    pub fn neighbor_coord(&self, i: usize, j: usize, k: usize) -> GridCoord {
        self.base_cell + GridCoord::new(i as i32, j as i32, k as i32)
    }

    /// Iterator over `(coord, weight, gradient, node_offset)` for the full
    /// 3x3x3 neighborhood.
    pub fn iter_neighbors(&self) -> impl Iterator<Item = (GridCoord, Real, Vector, Vector)> + '_ {
        (0..NEIGHBOR_COUNT).map(move |idx| {
            let i = idx / (KERNEL_SIZE * KERNEL_SIZE);
            let j = (idx / KERNEL_SIZE) % KERNEL_SIZE;
            let k = idx % KERNEL_SIZE;
            (
                self.neighbor_coord(i, j, k),
                self.weight(i, j, k),
                self.weight_gradient(i, j, k),
                self.node_offset(i, j, k),
            )
        })
    }
}
