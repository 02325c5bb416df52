//! Background grid for MPM simulation
//!
//! Dense cubic node array, rebuilt every substep. During P2G the node
//! `velocity` field accumulates momentum; the grid update pass converts it
//! to an actual velocity and applies the wall conditions.

use rayon::prelude::*;

use crate::config::constants::NODE_MASS_EPS;
use crate::math::{GridCoord, Real, Vector, zero_vector};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridNode {
    /// Momentum during P2G, velocity after the grid update.
    pub velocity: Vector,
    pub mass: Real,
}

impl GridNode {
    #[inline(always)]
    pub fn zeroed() -> Self {
        Self {
            velocity: zero_vector(),
            mass: 0.0,
        }
    }

    #[inline(always)]
    pub fn zero(&mut self) {
        self.velocity = zero_vector();
        self.mass = 0.0;
    }
}

/// Wall response modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryHandling {
    /// Cancel the whole node velocity when it points out of the domain.
    Stick,
    /// Cancel only the outward component; tangential motion survives.
    Slip,
    /// Open domain, no walls.
    None,
}

#[derive(Clone)]
pub struct Grid {
    nodes: Vec<GridNode>,
    resolution: usize,
    cell_width: Real,
}

impl Grid {
    pub fn new(resolution: usize, domain_size: Real) -> Self {
        Self {
            nodes: vec![GridNode::zeroed(); resolution * resolution * resolution],
            resolution,
            cell_width: domain_size / resolution as Real,
        }
    }

    #[inline(always)]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline(always)]
    pub fn cell_width(&self) -> Real {
        self.cell_width
    }

    #[inline(always)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub fn contains(&self, coord: GridCoord) -> bool {
        let res = self.resolution as i32;
        (0..res).contains(&coord.x) && (0..res).contains(&coord.y) && (0..res).contains(&coord.z)
    }

    #[inline(always)]
    pub fn linear_index(&self, coord: GridCoord) -> usize {
        let res = self.resolution;
        (coord.x as usize * res + coord.y as usize) * res + coord.z as usize
    }

    #[inline(always)]
    pub fn node(&self, coord: GridCoord) -> Option<&GridNode> {
        if self.contains(coord) {
            Some(&self.nodes[self.linear_index(coord)])
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn node_mut(&mut self, coord: GridCoord) -> Option<&mut GridNode> {
        if self.contains(coord) {
            let idx = self.linear_index(coord);
            Some(&mut self.nodes[idx])
        } else {
            None
        }
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [GridNode] {
        &mut self.nodes
    }

    /// Reset every node before the next P2G scatter.
    pub fn clear(&mut self) {
        for node in &mut self.nodes {
            node.zero();
        }
    }

    /// Sum masses and momenta accumulated in a thread-local scatter buffer.
    pub fn absorb(&mut self, buffer: &[GridNode]) {
        debug_assert_eq!(buffer.len(), self.nodes.len());
        for (node, contribution) in self.nodes.iter_mut().zip(buffer) {
            node.mass += contribution.mass;
            node.velocity += contribution.velocity;
        }
    }

    /// Grid update pass: momentum to velocity, gravity, wall conditions.
    ///
    /// Pure per-node function with no cross-node coupling, so it runs with
    /// unrestricted parallelism.
    pub fn integrate_velocities(
        &mut self,
        dt: Real,
        gravity: Vector,
        boundary_width: usize,
        boundary: BoundaryHandling,
    ) {
        let res = self.resolution;
        let low = boundary_width as i32;
        let high = res as i32 - 1 - boundary_width as i32;
        let gravity_step = gravity * dt;

        self.nodes
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, node)| {
                if node.mass <= NODE_MASS_EPS {
                    return;
                }
                node.velocity /= node.mass;
                node.velocity += gravity_step;

                let coord = GridCoord::new(
                    (idx / (res * res)) as i32,
                    ((idx / res) % res) as i32,
                    (idx % res) as i32,
                );
                apply_boundary_conditions(node, coord, low, high, boundary);
            });
    }
}

/// Zero the node velocity components that would carry material through a
/// wall. A component counts as violating when the node sits within the
/// boundary band on that axis and the velocity points further outward.
#[inline(always)]
pub fn apply_boundary_conditions(
    node: &mut GridNode,
    coord: GridCoord,
    low: i32,
    high: i32,
    boundary: BoundaryHandling,
) {
    if boundary == BoundaryHandling::None {
        return;
    }

    let mut violated = false;
    for axis in 0..3 {
        let outward_low = coord[axis] < low && node.velocity[axis] < 0.0;
        let outward_high = coord[axis] > high && node.velocity[axis] > 0.0;
        if outward_low || outward_high {
            node.velocity[axis] = 0.0;
            violated = true;
        }
    }

    if violated && boundary == BoundaryHandling::Stick {
        node.velocity = zero_vector();
    }
}
