/////////////////////////////////////////////////////////////////////////////////////////////
//
// Converts between flat and per-axis indices on tensor-product grids and numbers cell corners.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;

/// Decodes a flat id into its per-axis index tuple.
///
/// Axis 0 is the most significant, so for `axis_size = 5` in 2D the id `7`
/// decodes to `[1, 2]`.
///
/// # Example
/// ```
/// use ferreus_mls_utils::{decode, encode};
///
/// let idx = decode(7, 2, 5);
/// assert_eq!(idx, vec![1, 2]);
/// assert_eq!(encode(&idx, 5), 7);
/// ```
pub fn decode(flat_id: usize, dimension: usize, axis_size: usize) -> Vec<usize> {
    let mut axis_index = vec![0; dimension];
    decode_into(&mut axis_index, flat_id, axis_size);
    axis_index
}

/// Same as [`decode`], with the dimension taken from `axis_index.len()`.
#[inline]
pub fn decode_into(axis_index: &mut [usize], flat_id: usize, axis_size: usize) {
    let dimension = axis_index.len();
    for (d, idx) in axis_index.iter_mut().enumerate() {
        let upper = axis_size.pow((dimension - d) as u32);
        let lower = axis_size.pow((dimension - 1 - d) as u32);
        *idx = (flat_id % upper) / lower;
    }
}

/// Flattens a per-axis index tuple, the inverse of [`decode`].
#[inline]
pub fn encode(axis_index: &[usize], axis_size: usize) -> usize {
    axis_index
        .iter()
        .fold(0, |flat, &idx| flat * axis_size + idx)
}

/// Returns the relative corner offsets of a cell in an N-dimensional grid.
///
/// Row `j` holds the offsets of local corner `j`; the offset along axis `d`
/// is bit `dimension - 1 - d` of `j`, so axis 0 is the most significant bit.
pub fn corner_offsets(dimension: usize) -> Mat<usize> {
    let num_corners = 1usize << dimension;

    Mat::<usize>::from_fn(num_corners, dimension, |j, d| {
        match (j >> (dimension - 1 - d)) & 1 != 0 {
            true => 1,
            false => 0,
        }
    })
}

/// Returns the `2^dimension` node ids of the cell whose lowest corner has
/// per-axis index `cell_axis_index`, on a grid with `nodes_per_axis` nodes
/// along every axis.
///
/// # Example
/// ```
/// use ferreus_mls_utils::cell_corners;
///
/// // Cell (1, 2) of a 5 x 5 node grid.
/// assert_eq!(cell_corners(&[1, 2], 5), vec![7, 8, 12, 13]);
/// ```
pub fn cell_corners(cell_axis_index: &[usize], nodes_per_axis: usize) -> Vec<usize> {
    let dimension = cell_axis_index.len();
    let offsets = corner_offsets(dimension);
    let mut node_axis_index = vec![0; dimension];

    (0..offsets.nrows())
        .map(|j| {
            node_axis_index
                .iter_mut()
                .zip(cell_axis_index.iter())
                .enumerate()
                .for_each(|(d, (node_idx, &cell_idx))| {
                    *node_idx = cell_idx + offsets[(j, d)];
                });
            encode(&node_axis_index, nodes_per_axis)
        })
        .collect()
}
