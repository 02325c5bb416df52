pub mod g2p;
pub mod grid_update;
pub mod p2g;

pub use g2p::{TransferStats, grid_to_particle};
pub use grid_update::grid_update;
pub use p2g::particle_to_grid;
