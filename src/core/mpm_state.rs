//! Aggregate simulation state and the per-frame time integrator.
//!
//! One substep is the fixed pipeline clear grid -> P2G -> grid update ->
//! G2P; a frame runs `substeps_per_frame` of them. The grid carries no
//! information across the clear, so a step either completes
//! deterministically or the caller aborts the process.

use crate::config::{ConfigError, SolverParams};
use crate::core::grid::Grid;
use crate::core::particle::Particle;
use crate::core::particle_set::ParticleSet;
use crate::math::{Real, Vector};
use crate::solver::{TransferStats, grid_to_particle, grid_update, particle_to_grid};

pub struct MpmState {
    particle_set: ParticleSet,
    grid: Grid,
    params: SolverParams,
    last_step_stats: TransferStats,
}

impl MpmState {
    /// Build a solver from validated parameters. Configuration faults are
    /// fatal here, before any stepping.
    pub fn new(params: SolverParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            particle_set: ParticleSet::new(),
            grid: Grid::new(params.resolution, params.domain_size),
            params,
            last_step_stats: TransferStats::default(),
        })
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn particle_set(&self) -> &ParticleSet {
        &self.particle_set
    }

    pub fn particle_set_mut(&mut self) -> &mut ParticleSet {
        &mut self.particle_set
    }

    pub fn particle_count(&self) -> usize {
        self.particle_set.len()
    }

    /// Fault counters accumulated over the most recent `step_frame` or
    /// `substep` call.
    pub fn last_step_stats(&self) -> TransferStats {
        self.last_step_stats
    }

    /// Scene-setup entry point: material parameters are validated and the
    /// position must lie inside the domain.
    pub fn add_particle(&mut self, particle: Particle) -> Result<usize, ConfigError> {
        particle.material.validate()?;
        if !particle.is_sound() {
            return Err(ConfigError::InvalidMaterial(
                "particle state is not finite".to_string(),
            ));
        }
        let domain = self.params.domain_size;
        if particle.position.iter().any(|x| *x < 0.0 || *x > domain) {
            return Err(ConfigError::InvalidMaterial(format!(
                "particle position {:?} outside domain [0, {domain}]",
                particle.position
            )));
        }
        Ok(self.particle_set.insert(particle))
    }

    pub fn add_particles(&mut self, batch: Vec<Particle>) -> Result<(), ConfigError> {
        for particle in batch {
            self.add_particle(particle)?;
        }
        Ok(())
    }

    /// One full frame: `substeps_per_frame` substeps of
    /// `frame_dt / substeps_per_frame`.
    pub fn step_frame(&mut self, frame_dt: Real) {
        let substeps = self.params.substeps_per_frame;
        let dt = frame_dt / substeps as Real;
        let mut stats = TransferStats::default();
        for _ in 0..substeps {
            stats = stats.merge(self.run_substep(dt));
        }
        self.last_step_stats = stats;
        self.warn_on_faults();
    }

    /// One substep with the configured default dt.
    pub fn step(&mut self) {
        self.step_frame(self.params.dt * self.params.substeps_per_frame as Real);
    }

    /// A single substep at an explicit dt.
    pub fn substep(&mut self, dt: Real) {
        self.last_step_stats = self.run_substep(dt);
        self.warn_on_faults();
    }

    fn run_substep(&mut self, dt: Real) -> TransferStats {
        self.grid.clear();
        particle_to_grid(&self.particle_set, &mut self.grid, dt);
        grid_update(&mut self.grid, &self.params, dt);
        grid_to_particle(&mut self.particle_set, &self.grid, dt)
    }

    fn warn_on_faults(&self) {
        let stats = &self.last_step_stats;
        if !stats.is_clean() {
            log::warn!(
                "unstable step: {} particles recovered, {} positions clamped \
                 (consider a smaller dt or more substeps)",
                stats.recovered_particles,
                stats.clamped_positions,
            );
        }
    }

    /// Advisory CFL-like bound: `cfl_coeff * dx / (max particle speed +
    /// max elastic wave speed)`. Scenario-dependent, so it is exposed
    /// instead of enforced; exceeding it shows up as blow-up, not an error.
    pub fn stable_dt(&self) -> Real {
        let mut max_signal: Real = 0.0;
        for particle in self.particle_set.iter() {
            let density = particle.mass / particle.volume0;
            let signal = particle.velocity.norm() + particle.material.wave_speed(density);
            max_signal = max_signal.max(signal);
        }
        if max_signal <= 0.0 {
            return self.params.dt;
        }
        self.params.cfl_coeff * self.params.cell_width() / max_signal
    }

    /// Read-only position snapshot for the renderer.
    pub fn positions(&self) -> impl Iterator<Item = Vector> + '_ {
        self.particle_set.positions()
    }

    /// Read-only velocity snapshot for the renderer.
    pub fn velocities(&self) -> impl Iterator<Item = Vector> + '_ {
        self.particle_set.velocities()
    }
}
