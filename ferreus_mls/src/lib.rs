/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for weighted MLS reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Weighted moving least squares (MLS) reconstruction on particle grids.
//!
//! In material point and other particle-in-cell methods, values carried by
//! particles are transferred to the nodes of a background grid. A plain
//! weighted average only reproduces constants. This crate builds, for every
//! grid node, a set of correction coefficients over a local Chebyshev basis
//! so that any polynomial up to a chosen total degree carried by the
//! particles is reproduced exactly at the node.
//!
//! For each node the particles of its incident cells are weighted by the
//! multilinear hat function of the node, the weighted moment matrix
//! `M = sum_p W_p b_p b_p^T` is assembled and `M alpha = T(0)` is solved. A
//! node value is then reconstructed as `sum_p W_p (alpha . b_p) u_p`.
//!
//! A patch test checks the whole pipeline: particles carry the values of a
//! monomial and every node's reconstruction is compared with the exact value.
//!
//! # Features
//! - Any number of dimensions and any basis degree
//! - Non-uniform tensor-product grids with per-node basis scaling
//! - Seeded, reproducible particle placement
//! - Nodes processed in parallel with [`rayon`](https://docs.rs/rayon/latest/rayon/)
//! - Singular nodes reported and skipped, or returned as an error
//! - Settings that round trip through JSON
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for dense matrices
//!
//! Check out the examples directory in the repository for more examples of usage.
//!
//! # Examples
//!
//! ```
//! use ferreus_mls::{AxisCoordinates, MlsReconstructor, MlsSettings};
//!
//! // Five nodes per axis with uneven spacing.
//! let axis = AxisCoordinates::from_coordinates(vec![0.0, 0.1, 0.5, 1.0, 1.3]);
//!
//! // Cubic basis in 2D, tested against x0^2 * x1.
//! let settings = MlsSettings::builder(2, 3, axis)
//!     .particles_per_cell(30)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let reconstructor = MlsReconstructor::builder(settings).build().unwrap();
//! let report = reconstructor.patch_test().unwrap();
//!
//! assert!(report.passed());
//! println!("{report}");
//! ```
pub mod config;

pub mod progress;

mod error;

mod grid;

mod basis;

mod moments;

mod linalg;

mod reconstruction;

mod mls;

pub use {
    basis::{hat_weight, NodeSampler},
    config::{
        AxisCoordinates, MlsSettings, MlsSettingsBuilder, ParticleExclusion, PivotStrategy,
        SingularPolicy,
    },
    error::{MlsError, MlsResult, SingularMatrixError},
    grid::{Cell, Grid, ParticleSet},
    linalg::gaussian_elimination,
    mls::{MlsReconstructor, MlsReconstructorBuilder},
    moments::NodeMoments,
    reconstruction::{
        reconstruct_node, NodeReconstruction, NodeSolution, PatchTestReport, TestPolynomial,
        UnresolvedNode,
    },
};
