//! Grid update stage (divides momentum by mass, applies gravity, walls).

use crate::config::SolverParams;
use crate::core::grid::Grid;
use crate::math::Real;

pub fn grid_update(grid: &mut Grid, params: &SolverParams, dt: Real) {
    grid.integrate_velocities(dt, params.gravity, params.boundary_width, params.boundary);
}
