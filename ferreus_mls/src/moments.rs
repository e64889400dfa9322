/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles the weighted moment (Gram) matrix of a node and its reproducing linear system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::basis::NodeSampler;
use faer::Mat;
use ferreus_mls_utils::{chebyshev_at_origin_basis, IndexSet};

/// Weighted moments gathered from the particles around one node.
#[derive(Debug, Clone)]
pub struct NodeMoments {
    pub node: usize,

    /// Number of particles in the cells incident to the node.
    pub incidence: usize,

    /// `sum_p W_p * b_p * b_p^T` over the full basis.
    pub gram: Mat<f64>,
}

impl NodeMoments {
    /// Accumulates the moments of `node` with the given sampler.
    pub fn assemble(sampler: &mut NodeSampler<'_>, node: usize, basis_size: usize) -> Self {
        let mut gram = Mat::<f64>::zeros(basis_size, basis_size);
        let mut incidence = 0;

        sampler.for_each_particle(node, basis_size, |weight, basis, _| {
            incidence += 1;
            for (i, &bi) in basis.iter().enumerate() {
                let wbi = weight * bi;
                for (j, &bj) in basis.iter().enumerate() {
                    gram[(i, j)] += wbi * bj;
                }
            }
        });

        Self {
            node,
            incidence,
            gram,
        }
    }

    /// Number of basis functions used for this node.
    ///
    /// A node that sees fewer particles than basis terms keeps only the
    /// leading `incidence` terms of the basis.
    #[inline]
    pub fn basis_count(&self) -> usize {
        self.incidence.min(self.gram.nrows())
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.basis_count() < self.gram.nrows()
    }

    /// Returns the `n x (n + 1)` system `[M | T(0)]`, where `M` is the leading
    /// `n x n` block of the Gram matrix, `n = basis_count()`, and `T(0)` the
    /// basis evaluated at the local origin.
    ///
    /// Returns `None` when the node has no incident particles.
    pub fn augmented_system(&self, index_set: &IndexSet) -> Option<Mat<f64>> {
        let n = self.basis_count();
        if n == 0 {
            return None;
        }

        let rhs = chebyshev_at_origin_basis(index_set, n);
        Some(Mat::from_fn(n, n + 1, |i, j| match j < n {
            true => self.gram[(i, j)],
            false => rhs[i],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisCoordinates, ParticleExclusion};
    use crate::grid::{Grid, ParticleSet};
    use equator::assert;

    fn setup(
        dimension: usize,
        degree: usize,
        per_cell: usize,
        exclusion: ParticleExclusion,
    ) -> (IndexSet, Grid, ParticleSet) {
        let axis = AxisCoordinates::from_coordinates(vec![0.0, 0.1, 0.5, 1.0, 1.3]);
        let grid = Grid::new(vec![axis; dimension], exclusion);
        let particles = ParticleSet::scatter(&grid, per_cell, Some(17));
        (IndexSet::new(dimension, degree), grid, particles)
    }

    #[test]
    fn gram_is_symmetric() {
        let (index_set, grid, particles) = setup(2, 3, 10, ParticleExclusion::FirstAxisBoundary);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        for node in 0..grid.num_nodes() {
            let moments = NodeMoments::assemble(&mut sampler, node, index_set.len());
            let gram = &moments.gram;
            for i in 0..gram.nrows() {
                for j in 0..i {
                    assert!((gram[(i, j)] - gram[(j, i)]).abs() <= 1e-12);
                }
            }
        }
    }

    #[test]
    fn constant_moment_is_sum_of_weights() {
        let (index_set, grid, particles) = setup(1, 2, 3, ParticleExclusion::None);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        let node = 2;
        let mut weight_sum = 0.0;
        sampler.for_each_particle(node, 1, |w, _, _| weight_sum += w);

        let moments = NodeMoments::assemble(&mut sampler, node, index_set.len());
        assert!(moments.incidence == 6);
        assert!((moments.gram[(0, 0)] - weight_sum).abs() < 1e-14);
    }

    #[test]
    fn incidence_reflects_exclusion() {
        let (index_set, grid, particles) = setup(2, 1, 2, ParticleExclusion::FirstAxisBoundary);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        // Node (0, 2) only touches cells at the low end of axis 0.
        let moments = NodeMoments::assemble(&mut sampler, 2, index_set.len());
        assert!(moments.incidence == 0);
        assert!(moments.augmented_system(&index_set).is_none());

        // Node (2, 2) is interior and touches four cells with particles.
        let moments = NodeMoments::assemble(&mut sampler, 12, index_set.len());
        assert!(moments.incidence == 8);
        assert!(!moments.is_truncated());
    }

    #[test]
    fn augmented_system_keeps_leading_block() {
        let (index_set, grid, particles) = setup(2, 2, 1, ParticleExclusion::None);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        // Corner node 0 touches one cell with a single particle.
        let moments = NodeMoments::assemble(&mut sampler, 0, index_set.len());
        assert!(moments.incidence == 1);
        assert!(moments.basis_count() == 1);
        assert!(moments.is_truncated());

        let system = moments.augmented_system(&index_set).unwrap();
        assert!(system.nrows() == 1);
        assert!(system.ncols() == 2);
        assert!(system[(0, 0)] == moments.gram[(0, 0)]);
        assert!(system[(0, 1)] == 1.0);
    }

    #[test]
    fn rhs_is_basis_at_origin() {
        let (index_set, grid, particles) = setup(2, 2, 10, ParticleExclusion::None);
        let mut sampler = NodeSampler::new(&index_set, &grid, &particles);

        let moments = NodeMoments::assemble(&mut sampler, 12, index_set.len());
        let system = moments.augmented_system(&index_set).unwrap();
        let n = system.nrows();

        // Order: [0,0], [0,1], [0,2], [1,0], [1,1], [2,0].
        let rhs: Vec<f64> = (0..n).map(|i| system[(i, n)]).collect();
        assert!(rhs == vec![1.0, 0.0, -1.0, 0.0, 0.0, -1.0]);
    }
}
