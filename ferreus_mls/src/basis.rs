/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates hat weights and local Chebyshev bases for the particles around a grid node.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::grid::{Grid, ParticleSet};
use ferreus_mls_utils::{chebyshev_into, decode_into, evaluate_tensor_basis, IndexSet};

/// Multilinear hat weight of a particle with respect to a node.
///
/// `W = prod_d (1 - |node[d] - particle[d]| / edge[d])`, where `edge[d]` is
/// the length along axis `d` of the cell owning the particle. The weight is
/// not clamped, so it goes negative for particles further than one edge
/// length from the node.
#[inline]
pub fn hat_weight(node: &[f64], particle: &[f64], edge: &[f64]) -> f64 {
    node.iter()
        .zip(particle.iter())
        .zip(edge.iter())
        .fold(1.0, |w, ((&xv, &xp), &h)| w * (1.0 - (xv - xp).abs() / h))
}

/// Visits the particles around a node, producing each particle's weight and
/// its local Chebyshev basis values.
///
/// A sampler owns its scratch buffers and is reused across nodes by one
/// worker at a time.
pub struct NodeSampler<'a> {
    index_set: &'a IndexSet,
    grid: &'a Grid,
    particles: &'a ParticleSet,
    node_axis_index: Vec<usize>,
    node_coordinates: Vec<f64>,
    edge: Vec<f64>,
    position: Vec<f64>,
    axis_values: Vec<Vec<f64>>,
    basis: Vec<f64>,
}

impl<'a> NodeSampler<'a> {
    pub fn new(index_set: &'a IndexSet, grid: &'a Grid, particles: &'a ParticleSet) -> Self {
        let dimension = grid.dimension;
        Self {
            index_set,
            grid,
            particles,
            node_axis_index: vec![0; dimension],
            node_coordinates: vec![0.0; dimension],
            edge: vec![0.0; dimension],
            position: vec![0.0; dimension],
            axis_values: vec![Vec::with_capacity(index_set.degree() + 1); dimension],
            basis: vec![0.0; index_set.len()],
        }
    }

    /// Calls `visit(weight, basis, position)` once for every particle in
    /// every cell incident to `node`.
    ///
    /// `basis` holds the leading `basis_count` tensor-product Chebyshev
    /// values evaluated at `(x_node - x_particle) / hv`, with `hv` the
    /// normalisation length of the node along each axis.
    pub fn for_each_particle<F>(&mut self, node: usize, basis_count: usize, mut visit: F)
    where
        F: FnMut(f64, &[f64], &[f64]),
    {
        debug_assert!(basis_count <= self.index_set.len());

        let grid = self.grid;
        let degree = self.index_set.degree();

        decode_into(&mut self.node_axis_index, node, grid.nodes_per_axis);
        for (d, &idx) in self.node_axis_index.iter().enumerate() {
            self.node_coordinates[d] = grid.axes[d].coordinates[idx];
        }

        for cell in grid.node_cells(node) {
            for (d, &idx) in grid.cells[cell].axis_index.iter().enumerate() {
                self.edge[d] = grid.edge_length(d, idx);
            }

            for p in self.particles.cell_range(cell) {
                for d in 0..grid.dimension {
                    let xp = self.particles.positions[(p, d)];
                    self.position[d] = xp;

                    let hv = grid.axes[d].spacing[self.node_axis_index[d]];
                    chebyshev_into(
                        &mut self.axis_values[d],
                        degree,
                        (self.node_coordinates[d] - xp) / hv,
                    );
                }

                let weight = hat_weight(&self.node_coordinates, &self.position, &self.edge);
                let basis = &mut self.basis[..basis_count];
                evaluate_tensor_basis(self.index_set, &self.axis_values, basis);

                visit(weight, basis, &self.position);
            }
        }
    }

    /// Number of particles in the cells incident to `node`.
    pub fn incidence(&self, node: usize) -> usize {
        self.grid
            .node_cells(node)
            .into_iter()
            .map(|cell| self.particles.cell_range(cell).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisCoordinates, ParticleExclusion};
    use equator::assert;
    use ferreus_mls_utils::cell_corners;

    #[test]
    fn weight_is_one_at_node_and_zero_at_far_corner() {
        let edge = [0.4, 0.5];
        assert!(hat_weight(&[0.1, 0.5], &[0.1, 0.5], &edge) == 1.0);
        assert!(hat_weight(&[0.1, 0.5], &[0.5, 1.0], &edge).abs() < 1e-15);
    }

    #[test]
    fn weight_is_not_clamped() {
        assert!(hat_weight(&[0.0], &[2.0], &[1.0]) == -1.0);
    }

    #[test]
    fn corner_weights_form_partition_of_unity() {
        let axis = AxisCoordinates::from_coordinates(vec![0.0, 0.1, 0.5, 1.0, 1.3]);
        let grid = Grid::new(vec![axis; 2], ParticleExclusion::None);
        let particles = ParticleSet::scatter(&grid, 4, Some(3));

        for (cell_id, cell) in grid.cells.iter().enumerate() {
            let edge: Vec<f64> = cell
                .axis_index
                .iter()
                .enumerate()
                .map(|(d, &idx)| grid.edge_length(d, idx))
                .collect();
            let corners = cell_corners(&cell.axis_index, grid.nodes_per_axis);

            for p in particles.cell_range(cell_id) {
                let xp = [particles.positions[(p, 0)], particles.positions[(p, 1)]];
                let total: f64 = corners
                    .iter()
                    .map(|&node| hat_weight(&grid.node_coordinates(node), &xp, &edge))
                    .sum();
                assert!((total - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn sampler_visits_every_incident_particle() {
        let axis = AxisCoordinates::uniform(0.0, 3.0, 4);
        let grid = Grid::new(vec![axis; 2], ParticleExclusion::None);
        let particles = ParticleSet::scatter(&grid, 5, Some(11));
        let index_set = IndexSet::new(2, 2);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        // Corner, edge and interior nodes touch 1, 2 and 4 cells.
        for (node, cells) in [(0, 1), (1, 2), (5, 4)] {
            let mut visited = 0;
            sampler.for_each_particle(node, index_set.len(), |weight, basis, _| {
                assert!(basis.len() == 6);
                // The constant term is always one.
                assert!(basis[0] == 1.0);
                assert!(weight >= 0.0);
                visited += 1;
            });
            assert!(visited == 5 * cells);
            assert!(sampler.incidence(node) == 5 * cells);
        }
    }

    #[test]
    fn sampler_truncates_basis() {
        let axis = AxisCoordinates::uniform(0.0, 2.0, 3);
        let grid = Grid::new(vec![axis], ParticleExclusion::None);
        let particles = ParticleSet::scatter(&grid, 2, Some(5));
        let index_set = IndexSet::new(1, 3);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        sampler.for_each_particle(1, 2, |_, basis, position| {
            assert!(basis.len() == 2);
            // T1 of (x_node - x_p) / hv with x_node = 1 and hv = 1.
            assert!((basis[1] - (1.0 - position[0])).abs() < 1e-15);
        });
    }
}
