pub mod grid;
pub mod kernel;
pub mod mpm_state;
pub mod particle;
pub mod particle_set;

pub use grid::{BoundaryHandling, Grid, GridNode, apply_boundary_conditions};
pub use kernel::{GridInterpolation, KERNEL_SIZE, NEIGHBOR_COUNT, inv_d};
pub use mpm_state::MpmState;
pub use particle::Particle;
pub use particle_set::ParticleSet;
