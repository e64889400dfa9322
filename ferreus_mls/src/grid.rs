/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds the tensor-product grid topology and scatters particles into its cells.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::{AxisCoordinates, ParticleExclusion};
use faer::{Mat, MatRef};
use ferreus_mls_utils::{cell_corners, decode, decode_into, encode};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Per-axis index of the cell, equal to the per-axis index of its lowest corner.
    pub axis_index: Vec<usize>,

    /// Flat ids of the `2^dimension` corner nodes.
    pub corners: Vec<usize>,

    /// Whether particles are drawn in this cell.
    pub has_particles: bool,
}

/// A regular tensor-product grid with the same number of nodes along every axis.
#[derive(Debug, Clone)]
pub struct Grid {
    pub dimension: usize,
    pub nodes_per_axis: usize,
    pub axes: Vec<AxisCoordinates>,
    pub cells: Vec<Cell>,
}

impl Grid {
    /// Builds the cell topology for the given axes and marks which cells
    /// carry particles according to `exclusion`.
    ///
    /// The axes are expected to have been validated, so all share the same
    /// node count of at least two.
    pub fn new(axes: Vec<AxisCoordinates>, exclusion: ParticleExclusion) -> Self {
        let dimension = axes.len();
        let nodes_per_axis = axes.first().map(|axis| axis.len()).unwrap_or(0);
        let cells_per_axis = nodes_per_axis.saturating_sub(1);
        let num_cells = cells_per_axis.pow(dimension as u32);

        let is_boundary = |idx: usize| idx == 0 || idx + 1 == cells_per_axis;

        let cells = (0..num_cells)
            .map(|cell_id| {
                let axis_index = decode(cell_id, dimension, cells_per_axis);
                let corners = cell_corners(&axis_index, nodes_per_axis);

                let has_particles = match exclusion {
                    ParticleExclusion::FirstAxisBoundary => !is_boundary(axis_index[0]),
                    ParticleExclusion::AllAxisBoundaries => {
                        !axis_index.iter().any(|&idx| is_boundary(idx))
                    }
                    ParticleExclusion::None => true,
                };

                Cell {
                    axis_index,
                    corners,
                    has_particles,
                }
            })
            .collect();

        Self {
            dimension,
            nodes_per_axis,
            axes,
            cells,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes_per_axis.pow(self.dimension as u32)
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells_per_axis(&self) -> usize {
        self.nodes_per_axis.saturating_sub(1)
    }

    /// Per-axis index of a node.
    #[inline]
    pub fn node_axis_index(&self, node: usize) -> Vec<usize> {
        decode(node, self.dimension, self.nodes_per_axis)
    }

    /// Physical coordinates of a node.
    pub fn node_coordinates(&self, node: usize) -> Vec<f64> {
        self.node_axis_index(node)
            .iter()
            .zip(self.axes.iter())
            .map(|(&idx, axis)| axis.coordinates[idx])
            .collect()
    }

    /// Length of cell `cell_index` along `axis`.
    #[inline]
    pub fn edge_length(&self, axis: usize, cell_index: usize) -> f64 {
        let coordinates = &self.axes[axis].coordinates;
        coordinates[cell_index + 1] - coordinates[cell_index]
    }

    /// Lower and upper coordinates of a cell along each axis.
    pub fn cell_bounds(&self, cell: usize) -> Vec<Range<f64>> {
        self.cells[cell]
            .axis_index
            .iter()
            .zip(self.axes.iter())
            .map(|(&idx, axis)| axis.coordinates[idx]..axis.coordinates[idx + 1])
            .collect()
    }

    /// Flat ids of the cells that have `node` as one of their corners.
    ///
    /// Along each axis a node at index `n` touches cells `n - 1` and `n`
    /// where those exist, so an interior node has `2^dimension` incident
    /// cells and a corner node has one.
    pub fn node_cells(&self, node: usize) -> Vec<usize> {
        let cells_per_axis = self.cells_per_axis();
        let mut axis_index = vec![0; self.dimension];
        decode_into(&mut axis_index, node, self.nodes_per_axis);

        axis_index
            .iter()
            .map(|&n| {
                let first = n.saturating_sub(1);
                let last = n.min(cells_per_axis - 1);
                first..=last
            })
            .multi_cartesian_product()
            .map(|cell_index| encode(&cell_index, cells_per_axis))
            .collect()
    }
}

/// Particle positions grouped by the cell that owns them.
///
/// Row `p` of `positions` holds the coordinates of particle `p`; the
/// particles of cell `c` occupy rows `cell_range(c)`.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    pub positions: Mat<f64>,
    pub(crate) cell_offsets: Vec<usize>,
}

impl ParticleSet {
    /// Draws `particles_per_cell` uniformly distributed particles in every
    /// cell of `grid` that carries particles.
    ///
    /// # Arguments
    /// * `grid` - Grid whose cells receive the particles.
    /// * `particles_per_cell` - Number of particles drawn per cell.
    /// * `seed` - Optional seed for reproducible placement. When `None`, the
    ///   generator is seeded from the operating system.
    pub fn scatter(grid: &Grid, particles_per_cell: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut cell_offsets = Vec::with_capacity(grid.num_cells() + 1);
        cell_offsets.push(0);
        for cell in &grid.cells {
            let count = match cell.has_particles {
                true => particles_per_cell,
                false => 0,
            };
            cell_offsets.push(cell_offsets[cell_offsets.len() - 1] + count);
        }

        let num_particles = cell_offsets[cell_offsets.len() - 1];
        let mut positions = Mat::<f64>::zeros(num_particles, grid.dimension);

        for (cell, window) in cell_offsets.windows(2).enumerate() {
            let bounds = grid.cell_bounds(cell);
            for p in window[0]..window[1] {
                for (d, range) in bounds.iter().enumerate() {
                    positions[(p, d)] = rng.random_range(range.clone());
                }
            }
        }

        Self {
            positions,
            cell_offsets,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.nrows() == 0
    }

    /// Rows of `positions` owned by `cell`.
    #[inline]
    pub fn cell_range(&self, cell: usize) -> Range<usize> {
        self.cell_offsets[cell]..self.cell_offsets[cell + 1]
    }

    /// Positions of the particles owned by `cell`.
    #[inline]
    pub fn cell_positions(&self, cell: usize) -> MatRef<'_, f64> {
        let range = self.cell_range(cell);
        self.positions
            .as_ref()
            .subrows(range.start, range.end - range.start)
    }

    /// Number of cells holding at least one particle.
    pub fn cells_with_particles(&self) -> usize {
        self.cell_offsets
            .windows(2)
            .filter(|window| window[1] > window[0])
            .count()
    }
}
