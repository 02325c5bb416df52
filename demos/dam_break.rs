//! Headless water/snow/jelly scene in the spirit of the classic MPM
//! dam-break presets. Prints per-frame summary statistics instead of
//! rendering; wire the position snapshot into your own renderer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mpm3d::{MaterialType, MpmState, Particle, Real, SolverParams, Vector};

struct CubeVolume {
    minimum: Vector,
    size: Vector,
    material: MaterialType,
}

fn fill_cube(state: &mut MpmState, cube: &CubeVolume, count: usize, rng: &mut StdRng) {
    let cell_width = state.params().cell_width();
    let volume0 = (0.5 * cell_width).powi(3);
    let batch: Vec<Particle> = (0..count)
        .map(|_| {
            let position = cube.minimum
                + Vector::new(
                    rng.random_range(0.0..cube.size.x),
                    rng.random_range(0.0..cube.size.y),
                    rng.random_range(0.0..cube.size.z),
                );
            Particle::new(position, cube.material.clone()).with_density(volume0, 1.0)
        })
        .collect();
    state.add_particles(batch).expect("scene setup failed");
}

fn main() {
    let params = SolverParams {
        resolution: 64,
        domain_size: 1.0,
        gravity: Vector::new(0.0, -9.8, 0.0),
        substeps_per_frame: 30,
        dt: 1.0e-4,
        ..Default::default()
    };
    let mut state = MpmState::new(params).expect("invalid solver configuration");

    let cubes = [
        CubeVolume {
            minimum: Vector::new(0.6, 0.05, 0.6),
            size: Vector::new(0.25, 0.25, 0.25),
            material: MaterialType::liquid(50.0),
        },
        CubeVolume {
            minimum: Vector::new(0.35, 0.35, 0.35),
            size: Vector::new(0.25, 0.25, 0.25),
            material: MaterialType::snow(1000.0, 0.2),
        },
        CubeVolume {
            minimum: Vector::new(0.05, 0.6, 0.05),
            size: Vector::new(0.25, 0.25, 0.25),
            material: MaterialType::jelly(1000.0, 0.2),
        },
    ];

    let mut rng = StdRng::seed_from_u64(42);
    for cube in &cubes {
        fill_cube(&mut state, cube, 8_000, &mut rng);
    }

    println!(
        "{} particles on a {}^3 grid, advisory stable dt {:.2e}",
        state.particle_count(),
        state.params().resolution,
        state.stable_dt()
    );

    let frame_dt: Real = 1.0 / 60.0;
    for frame in 0..240 {
        state.step_frame(frame_dt);

        if frame % 30 == 0 {
            let (mut min_y, mut max_y, mut max_speed): (Real, Real, Real) = (1.0, 0.0, 0.0);
            for (position, velocity) in state.positions().zip(state.velocities()) {
                min_y = min_y.min(position.y);
                max_y = max_y.max(position.y);
                max_speed = max_speed.max(velocity.norm());
            }
            let stats = state.last_step_stats();
            println!(
                "frame {frame:3}: y in [{min_y:.3}, {max_y:.3}], max speed {max_speed:.2}, \
                 recovered {}, clamped {}",
                stats.recovered_particles, stats.clamped_positions
            );
        }
    }
}
