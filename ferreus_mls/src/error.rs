/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error types returned by settings validation, settings IO and node solves.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::{io, path::PathBuf};
use thiserror::Error;

/// Returned by the Gaussian elimination when a node's moment matrix
/// has no usable pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("singular matrix: no non-zero pivot in column {column}")]
pub struct SingularMatrixError {
    /// Column of the augmented system in which elimination stopped.
    pub column: usize,
}

/// Errors returned by [`crate::MlsReconstructor`] and [`crate::config::MlsSettings`].
#[derive(Debug, Error)]
pub enum MlsError {
    /// A settings value is out of range or inconsistent with the others.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A node's system was singular and the run was configured to abort.
    #[error("node {node}: {source}")]
    SingularNode {
        node: usize,
        #[source]
        source: SingularMatrixError,
    },

    /// Failed to open a settings file for reading.
    #[error("opening {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Failed to create a settings file for writing.
    #[error("creating {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    /// Error parsing JSON when reading settings from disk.
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Error serializing settings to JSON.
    #[error("serializing {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result alias for fallible `ferreus_mls` operations.
pub type MlsResult<T> = Result<T, MlsError>;
