//! Materials for MPM simulation
//!
//! Three constitutive families:
//!
//! * `fluids` - weakly compressible liquid
//! * `solids` - fixed-corotated elasticity and snow plasticity
//! * `utils` - parameter conversions and sanity checks

pub mod fluids;
pub mod material_types;
pub mod solids;
pub mod utils;

pub use material_types::{MaterialType, stress_or_zero};
