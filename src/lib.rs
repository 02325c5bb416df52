//! 3-D Material Point Method solver.
//!
//! Hybrid particle/grid simulation of elastic solids, snow-like
//! elastoplastic material and weakly compressible liquid on a dense
//! background grid, with APIC transfers and quadratic B-spline
//! interpolation. Scene setup and rendering live outside this crate; it
//! consumes an initial particle cloud and hands back per-frame position
//! and velocity snapshots.

pub mod config;
pub mod core;
pub mod materials;
pub mod math;
pub mod solver;

// Public re-exports for clean API
pub use crate::config::{ConfigError, SolverParams};
pub use crate::core::{BoundaryHandling, Grid, GridNode, MpmState, Particle, ParticleSet};
pub use crate::materials::MaterialType;
pub use crate::math::{Matrix, Real, Vector};
pub use crate::solver::TransferStats;
