// Physical and numerical constants shared across the solver.
use crate::math::{Real, Vector};

// Global physics
pub const GRAVITY: Vector = Vector::new(0.0, -9.8, 0.0);

/// Grid nodes lighter than this never received a meaningful particle
/// contribution; their velocity stays zero.
pub const NODE_MASS_EPS: Real = 1.0e-10;

/// Deformation gradients with a determinant below this are treated as
/// inverted and reset by the material projection.
pub const MIN_DEFORMATION_DET: Real = 1.0e-8;

// Snow plasticity defaults (singular-value clamp range and hardening).
pub const SNOW_CRITICAL_COMPRESSION: Real = 2.5e-2;
pub const SNOW_CRITICAL_STRETCH: Real = 4.5e-3;
pub const SNOW_HARDENING_EXPONENT: Real = 10.0;

/// Jelly softening factor applied to the Lame parameters.
pub const JELLY_SOFTENING: Real = 0.3;

/// Below this particle count the scatter stages run serially; the
/// thread-local buffer merge is not worth it for tiny scenes.
pub const PARALLEL_MIN_PARTICLES: usize = 4096;

/// Particles per thread-local scatter buffer in the parallel P2G path.
pub const P2G_CHUNK: usize = 8192;
