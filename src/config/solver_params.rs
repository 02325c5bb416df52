use std::fmt;

use crate::config::constants;
use crate::core::grid::BoundaryHandling;
use crate::math::{Real, Vector};

/// Solver parameters, supplied once at construction and validated before
/// any substep runs.
#[derive(Clone, Debug)]
pub struct SolverParams {
    /// Grid cells per axis.
    pub resolution: usize,
    /// World-space extent of the cubic domain.
    pub domain_size: Real,
    /// Gravitational acceleration.
    pub gravity: Vector,
    /// Substeps executed per `step_frame` call.
    pub substeps_per_frame: usize,
    /// Default substep length used by `step`.
    pub dt: Real,
    /// Wall thickness in cells. Must be at least 2 so the quadratic
    /// kernel never reads outside the grid.
    pub boundary_width: usize,
    /// Safety coefficient for the advisory `stable_dt` bound.
    pub cfl_coeff: Real,
    /// Wall response mode.
    pub boundary: BoundaryHandling,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            resolution: 64,
            domain_size: 1.0,
            gravity: constants::GRAVITY,
            substeps_per_frame: 25,
            dt: 2.0e-4,
            boundary_width: 3,
            cfl_coeff: 0.5,
            boundary: BoundaryHandling::Slip,
        }
    }
}

impl SolverParams {
    /// Grid spacing.
    #[inline(always)]
    pub fn cell_width(&self) -> Real {
        self.domain_size / self.resolution as Real
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_dt(mut self, dt: Real) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryHandling) -> Self {
        self.boundary = boundary;
        self
    }

    /// Fatal configuration checks. Everything downstream divides by these
    /// values, so a bad configuration must never reach the solver loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }
        if !(self.domain_size > 0.0) || !self.domain_size.is_finite() {
            return Err(ConfigError::InvalidDomainSize(self.domain_size));
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(ConfigError::InvalidTimestep(self.dt));
        }
        if self.substeps_per_frame == 0 {
            return Err(ConfigError::InvalidSubsteps(self.substeps_per_frame));
        }
        if self.boundary_width < 2 || 2 * self.boundary_width >= self.resolution {
            return Err(ConfigError::InvalidBoundaryWidth {
                boundary_width: self.boundary_width,
                resolution: self.resolution,
            });
        }
        if !(self.cfl_coeff > 0.0) || !self.cfl_coeff.is_finite() {
            return Err(ConfigError::InvalidCflCoefficient(self.cfl_coeff));
        }
        Ok(())
    }
}

/// Construction-time configuration failures.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    InvalidResolution(usize),
    InvalidDomainSize(Real),
    InvalidTimestep(Real),
    InvalidSubsteps(usize),
    InvalidBoundaryWidth {
        boundary_width: usize,
        resolution: usize,
    },
    InvalidCflCoefficient(Real),
    InvalidMaterial(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution(res) => {
                write!(f, "grid resolution must be positive, got {res}")
            }
            Self::InvalidDomainSize(size) => {
                write!(f, "domain size must be positive and finite, got {size}")
            }
            Self::InvalidTimestep(dt) => {
                write!(f, "timestep must be positive and finite, got {dt}")
            }
            Self::InvalidSubsteps(substeps) => {
                write!(f, "substeps per frame must be positive, got {substeps}")
            }
            Self::InvalidBoundaryWidth {
                boundary_width,
                resolution,
            } => write!(
                f,
                "boundary width {boundary_width} is invalid for resolution {resolution} \
                 (need 2 <= width < resolution / 2)"
            ),
            Self::InvalidCflCoefficient(coeff) => {
                write!(f, "CFL coefficient must be positive and finite, got {coeff}")
            }
            Self::InvalidMaterial(reason) => write!(f, "invalid material parameters: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(SolverParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert!(matches!(
            SolverParams::default().with_resolution(0).validate(),
            Err(ConfigError::InvalidResolution(0))
        ));
        assert!(matches!(
            SolverParams::default().with_dt(0.0).validate(),
            Err(ConfigError::InvalidTimestep(_))
        ));
        assert!(matches!(
            SolverParams {
                domain_size: -1.0,
                ..Default::default()
            }
            .validate(),
            Err(ConfigError::InvalidDomainSize(_))
        ));
        assert!(matches!(
            SolverParams {
                boundary_width: 1,
                ..Default::default()
            }
            .validate(),
            Err(ConfigError::InvalidBoundaryWidth { .. })
        ));
        // A boundary that swallows the whole domain is as fatal as a thin one.
        assert!(
            SolverParams {
                resolution: 8,
                boundary_width: 4,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn cell_width_matches_domain_partition() {
        let params = SolverParams {
            resolution: 32,
            domain_size: 2.0,
            ..Default::default()
        };
        assert!((params.cell_width() - 0.0625).abs() < 1e-7);
    }
}
