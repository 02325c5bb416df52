//! Conservation properties of the particle-to-grid transfer.
//!
//! The quadratic kernel weights partition unity, so P2G must hand the grid
//! exactly the particles' total mass and momentum (up to floating-point
//! rounding) for any interior particle configuration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mpm3d::math::zero_vector;
use mpm3d::solver::particle_to_grid;
use mpm3d::{Grid, MaterialType, Particle, ParticleSet, Real, Vector};

fn random_cloud(count: usize, seed: u64) -> ParticleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let materials = [
        MaterialType::liquid(50.0),
        MaterialType::elastic(1000.0, 0.2),
        MaterialType::snow(1000.0, 0.2),
    ];
    let mut set = ParticleSet::new();
    for i in 0..count {
        let position = Vector::new(
            rng.random_range(0.2..0.8),
            rng.random_range(0.2..0.8),
            rng.random_range(0.2..0.8),
        );
        let velocity = Vector::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
        );
        let mut particle = Particle::new(position, materials[i % materials.len()].clone())
            .with_density(1.0e-5, rng.random_range(0.5..2.0))
            .with_velocity(velocity);
        // Mild random deformation so solid stresses are non-trivial.
        particle.deformation_gradient *= rng.random_range(0.97..1.03);
        set.insert(particle);
    }
    set
}

fn grid_mass(grid: &Grid) -> Real {
    grid.nodes().iter().map(|n| n.mass).sum()
}

fn grid_momentum(grid: &Grid) -> Vector {
    grid.nodes()
        .iter()
        .fold(zero_vector(), |acc, n| acc + n.velocity)
}

#[test]
fn p2g_conserves_mass_for_interior_particles() {
    let mut grid = Grid::new(32, 1.0);
    let particles = random_cloud(500, 7);
    let particle_mass: Real = particles.iter().map(|p| p.mass).sum();

    particle_to_grid(&particles, &mut grid, 1.0e-4);

    let transferred = grid_mass(&grid);
    assert!(
        (transferred - particle_mass).abs() < particle_mass * 1e-4,
        "grid mass {transferred} vs particle mass {particle_mass}"
    );
}

#[test]
fn p2g_conserves_momentum_without_gravity() {
    let mut grid = Grid::new(32, 1.0);
    let particles = random_cloud(500, 11);
    let particle_momentum = particles
        .iter()
        .fold(zero_vector(), |acc, p| acc + p.velocity * p.mass);

    particle_to_grid(&particles, &mut grid, 1.0e-4);

    // The stress impulses cancel per particle (kernel gradients sum to
    // zero), so only the advective momentum remains.
    let transferred = grid_momentum(&grid);
    let scale: Real = particles.iter().map(|p| p.mass * p.velocity.norm()).sum();
    assert!(
        (transferred - particle_momentum).norm() < scale * 1e-3,
        "grid momentum {transferred:?} vs particle momentum {particle_momentum:?}"
    );
}

#[test]
fn chunked_scatter_matches_serial_accumulation() {
    // Clouds past the parallel threshold scatter through per-chunk buffers
    // merged afterward. The merged result must conserve mass and momentum
    // and agree node for node with a straight serial pass up to rounding.
    let drift = Vector::new(0.4, -0.1, 0.25);
    let mut cloud = random_cloud(10_000, 99);
    for particle in cloud.particles_mut() {
        particle.velocity += drift;
    }

    let mut parallel_grid = Grid::new(32, 1.0);
    particle_to_grid(&cloud, &mut parallel_grid, 1.0e-4);

    let particle_mass: Real = cloud.iter().map(|p| p.mass).sum();
    let particle_momentum = cloud
        .iter()
        .fold(zero_vector(), |acc, p| acc + p.velocity * p.mass);
    let momentum_scale: Real = cloud.iter().map(|p| p.mass * p.velocity.norm()).sum();

    let transferred_mass = grid_mass(&parallel_grid);
    assert!(
        (transferred_mass - particle_mass).abs() < particle_mass * 1e-4,
        "grid mass {transferred_mass} vs particle mass {particle_mass}"
    );
    assert!(
        (grid_momentum(&parallel_grid) - particle_momentum).norm() < momentum_scale * 1e-3,
        "grid momentum {:?} vs particle momentum {particle_momentum:?}",
        grid_momentum(&parallel_grid)
    );

    // Serial reference: scatter the same cloud in sub-threshold pieces into
    // one grid. P2G only accumulates, so the split does not change the sum.
    let mut serial_grid = Grid::new(32, 1.0);
    for chunk in cloud.particles().chunks(1000) {
        let mut piece = ParticleSet::new();
        piece.insert_batch(chunk.to_vec());
        particle_to_grid(&piece, &mut serial_grid, 1.0e-4);
    }

    let mut max_node_diff: Real = 0.0;
    for (parallel, serial) in parallel_grid.nodes().iter().zip(serial_grid.nodes()) {
        max_node_diff = max_node_diff.max((parallel.mass - serial.mass).abs());
        max_node_diff = max_node_diff.max((parallel.velocity - serial.velocity).norm());
    }
    assert!(
        max_node_diff < 1e-6,
        "parallel and serial scatter diverge: max node diff {max_node_diff}"
    );
}

#[test]
fn p2g_conservation_holds_across_seeds() {
    for seed in [1, 42, 1234] {
        let mut grid = Grid::new(64, 1.0);
        let particles = random_cloud(200, seed);
        let particle_mass: Real = particles.iter().map(|p| p.mass).sum();

        particle_to_grid(&particles, &mut grid, 2.0e-4);
        assert!((grid_mass(&grid) - particle_mass).abs() < particle_mass * 1e-4);
    }
}
