/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the basis enumeration, Chebyshev and grid indexing helpers used by ferreus_mls.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`ferreus_mls`] crate
//!
//! Leaf building blocks of the moving least squares engine:
//! - [`IndexSet`]: the exponent tuples of a total-degree polynomial basis.
//! - [`chebyshev`] and [`evaluate_tensor_basis`]: Chebyshev sequences and
//!   their tensor products over an [`IndexSet`].
//! - [`decode`], [`encode`] and [`cell_corners`]: flat/per-axis index
//!   conversion and corner numbering on tensor-product grids.
mod chebyshev;
mod grid_index;
mod multi_index;
mod utils;

pub use {
    chebyshev::{chebyshev, chebyshev_at_origin_basis, chebyshev_into, evaluate_tensor_basis},
    grid_index::{cell_corners, corner_offsets, decode, decode_into, encode},
    multi_index::IndexSet,
    utils::{balanced_exponents, binomial},
};
