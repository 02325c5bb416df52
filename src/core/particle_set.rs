//! Particle storage.
//!
//! Owns every particle in the scene. The population is fixed once the
//! simulation starts; the solver only iterates, serially or via `rayon`.

use rayon::prelude::*;

use crate::core::particle::Particle;
use crate::math::Vector;

#[derive(Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn insert(&mut self, particle: Particle) -> usize {
        let index = self.particles.len();
        self.particles.push(particle);
        index
    }

    pub fn insert_batch(&mut self, mut batch: Vec<Particle>) {
        self.particles.append(&mut batch);
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn par_iter_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut Particle> {
        self.particles.par_iter_mut()
    }

    /// Read-only position snapshot for the renderer interface.
    pub fn positions(&self) -> impl Iterator<Item = Vector> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Read-only velocity snapshot for the renderer interface.
    pub fn velocities(&self) -> impl Iterator<Item = Vector> + '_ {
        self.particles.iter().map(|p| p.velocity)
    }
}
