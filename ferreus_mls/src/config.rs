/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares grid geometry, particle, solver and patch test settings for MLS reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares grid geometry, particle, solver and patch test settings for MLS reconstruction.
use crate::error::{MlsError, MlsResult};
use ferreus_mls_utils::{balanced_exponents, binomial};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Node coordinates and normalisation lengths along one grid axis.
///
/// `coordinates` are the node positions `Xv` and must be strictly increasing.
/// `spacing` holds one length `hv` per node, used to scale the Chebyshev
/// argument `(x_node - x_particle) / hv` of that node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCoordinates {
    pub coordinates: Vec<f64>,
    pub spacing: Vec<f64>,
}

impl AxisCoordinates {
    /// Creates axis coordinates with an explicit normalisation length per node.
    pub fn new(coordinates: Vec<f64>, spacing: Vec<f64>) -> Self {
        Self {
            coordinates,
            spacing,
        }
    }

    /// Creates axis coordinates where each node's normalisation length is the
    /// longer of its two adjacent cell edges.
    ///
    /// # Example
    /// ```
    /// use ferreus_mls::config::AxisCoordinates;
    ///
    /// let axis = AxisCoordinates::from_coordinates(vec![0.0, 0.1, 0.5, 1.0, 1.3]);
    /// let expected = [0.1, 0.4, 0.5, 0.5, 0.3];
    /// for (h, e) in axis.spacing.iter().zip(expected) {
    ///     assert!((h - e).abs() < 1e-12);
    /// }
    /// ```
    pub fn from_coordinates(coordinates: Vec<f64>) -> Self {
        let n = coordinates.len();
        let spacing = (0..n)
            .map(|i| {
                let left = match i > 0 {
                    true => coordinates[i] - coordinates[i - 1],
                    false => 0.0,
                };
                let right = match i + 1 < n {
                    true => coordinates[i + 1] - coordinates[i],
                    false => 0.0,
                };
                left.max(right)
            })
            .collect();

        Self {
            coordinates,
            spacing,
        }
    }

    /// Creates `num_nodes` equally spaced nodes on `[start, end]`, each with
    /// the uniform edge length as its normalisation length.
    pub fn uniform(start: f64, end: f64, num_nodes: usize) -> Self {
        let step = match num_nodes > 1 {
            true => (end - start) / (num_nodes as f64 - 1.0),
            false => 0.0,
        };
        let coordinates = (0..num_nodes).map(|i| start + step * i as f64).collect();
        Self {
            coordinates,
            spacing: vec![step; num_nodes],
        }
    }

    /// Number of nodes along the axis.
    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Which cells receive particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleExclusion {
    /// Cells at either end of axis 0 receive no particles. Other axes are
    /// left untouched.
    #[default]
    FirstAxisBoundary,

    /// Cells touching the grid boundary along any axis receive no particles.
    AllAxisBoundaries,

    /// Every cell receives particles.
    None,
}

/// Pivot selection used by the Gaussian elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotStrategy {
    /// First row at or below the diagonal with a non-zero entry.
    #[default]
    FirstNonZero,

    /// Row at or below the diagonal with the largest magnitude entry.
    LargestMagnitude,
}

/// What to do when a node's moment matrix is singular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SingularPolicy {
    /// Leave the node unresolved, report it and carry on with the other nodes.
    #[default]
    Skip,

    /// Stop and return the first singular node as an error.
    Abort,
}

/// A convenience builder for constructing a validated [`MlsSettings`] instance.
///
/// The builder should be called via the [`MlsSettings::builder`] method.
///
/// See [`MlsSettings`] for details on each field.
#[derive(Debug, Clone)]
pub struct MlsSettingsBuilder {
    pub dimension: usize,
    pub degree: usize,
    pub axes: Vec<AxisCoordinates>,
    pub particles_per_cell: Option<usize>,
    pub test_exponents: Option<Vec<usize>>,
    pub tolerance: f64,
    pub seed: Option<u64>,
    pub particle_exclusion: ParticleExclusion,
    pub pivot_strategy: PivotStrategy,
    pub singular_policy: SingularPolicy,
    pub verbose: bool,
}

impl MlsSettingsBuilder {
    /// Creates a new instance of the [`MlsSettingsBuilder`], using `axis` for
    /// every one of the `dimension` axes.
    fn new(dimension: usize, degree: usize, axis: AxisCoordinates) -> Self {
        Self {
            dimension,
            degree,
            axes: vec![axis; dimension],
            particles_per_cell: None,
            test_exponents: None,
            tolerance: 1e-6,
            seed: None,
            particle_exclusion: ParticleExclusion::default(),
            pivot_strategy: PivotStrategy::default(),
            singular_policy: SingularPolicy::default(),
            verbose: false,
        }
    }

    /// Sets distinct coordinates for each axis.
    pub fn axes(mut self, axes: Vec<AxisCoordinates>) -> Self {
        self.axes = axes;
        self
    }

    /// Sets the number of particles drawn in every cell that carries particles.
    pub fn particles_per_cell(mut self, particles_per_cell: usize) -> Self {
        self.particles_per_cell = Some(particles_per_cell);
        self
    }

    /// Sets the per-axis exponents of the patch test monomial.
    pub fn test_exponents(mut self, test_exponents: Vec<usize>) -> Self {
        self.test_exponents = Some(test_exponents);
        self
    }

    /// Sets the absolute tolerance of the patch test.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Seeds particle placement for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn particle_exclusion(mut self, particle_exclusion: ParticleExclusion) -> Self {
        self.particle_exclusion = particle_exclusion;
        self
    }

    pub fn pivot_strategy(mut self, pivot_strategy: PivotStrategy) -> Self {
        self.pivot_strategy = pivot_strategy;
        self
    }

    pub fn singular_policy(mut self, singular_policy: SingularPolicy) -> Self {
        self.singular_policy = singular_policy;
        self
    }

    /// Emits the basis listing through the progress sink.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builds and validates an instance of [`MlsSettings`] from the values
    /// defined in the builder.
    pub fn build(self) -> MlsResult<MlsSettings> {
        let basis_size = binomial(self.dimension + self.degree, self.degree);

        let settings = MlsSettings {
            dimension: self.dimension,
            degree: self.degree,
            particles_per_cell: self.particles_per_cell.unwrap_or(basis_size),
            test_exponents: self
                .test_exponents
                .unwrap_or_else(|| balanced_exponents(self.dimension, self.degree)),
            axes: self.axes,
            tolerance: self.tolerance,
            seed: self.seed,
            particle_exclusion: self.particle_exclusion,
            pivot_strategy: self.pivot_strategy,
            singular_policy: self.singular_policy,
            verbose: self.verbose,
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// Settings for an MLS reconstruction run and its patch test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlsSettings {
    /// Number of spatial dimensions.
    pub dimension: usize,

    /// Total degree of the Chebyshev basis.
    pub degree: usize,

    /// Node coordinates and normalisation lengths, one entry per axis. Every
    /// axis must have the same number of nodes.
    pub axes: Vec<AxisCoordinates>,

    /// Particles drawn uniformly in each cell that carries particles.
    /// Defaults to the size of the basis.
    pub particles_per_cell: usize,

    /// Per-axis exponents of the patch test monomial. Defaults to `degree`
    /// split evenly across the axes, with the remainder on axis 0.
    pub test_exponents: Vec<usize>,

    /// Maximum absolute difference between exact and reconstructed values.
    pub tolerance: f64,

    /// Seed for particle placement. `None` seeds from the operating system.
    pub seed: Option<u64>,

    pub particle_exclusion: ParticleExclusion,

    pub pivot_strategy: PivotStrategy,

    pub singular_policy: SingularPolicy,

    /// Emit the basis listing through the progress sink.
    pub verbose: bool,
}

impl MlsSettings {
    /// Returns a new [`MlsSettingsBuilder`] with `axis` used along every axis.
    pub fn builder(dimension: usize, degree: usize, axis: AxisCoordinates) -> MlsSettingsBuilder {
        MlsSettingsBuilder::new(dimension, degree, axis)
    }

    /// Number of nodes along each axis.
    #[inline]
    pub fn nodes_per_axis(&self) -> usize {
        self.axes.first().map(|axis| axis.len()).unwrap_or(0)
    }

    /// Size of the untruncated basis, `binomial(dimension + degree, degree)`.
    #[inline]
    pub fn basis_size(&self) -> usize {
        binomial(self.dimension + self.degree, self.degree)
    }

    /// Checks every field for consistency.
    pub fn validate(&self) -> MlsResult<()> {
        let invalid = |msg: String| Err(MlsError::InvalidSettings(msg));

        if self.dimension == 0 {
            return invalid("dimension must be at least 1".to_string());
        }

        if self.axes.len() != self.dimension {
            return invalid(format!(
                "expected {} axes, got {}",
                self.dimension,
                self.axes.len()
            ));
        }

        let nodes_per_axis = self.nodes_per_axis();
        if nodes_per_axis < 2 {
            return invalid(format!(
                "each axis needs at least 2 nodes, got {nodes_per_axis}"
            ));
        }

        for (d, axis) in self.axes.iter().enumerate() {
            if axis.len() != nodes_per_axis {
                return invalid(format!(
                    "axis {d} has {} nodes, axis 0 has {nodes_per_axis}",
                    axis.len()
                ));
            }

            if axis.spacing.len() != axis.len() {
                return invalid(format!(
                    "axis {d} has {} spacing values for {} nodes",
                    axis.spacing.len(),
                    axis.len()
                ));
            }

            if axis.coordinates.iter().any(|x| !x.is_finite()) {
                return invalid(format!("axis {d} has non-finite coordinates"));
            }

            if axis.coordinates.windows(2).any(|pair| pair[1] <= pair[0]) {
                return invalid(format!("axis {d} coordinates must be strictly increasing"));
            }

            if axis.spacing.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
                return invalid(format!("axis {d} spacing values must be positive and finite"));
            }
        }

        if self.particles_per_cell == 0 {
            return invalid("particles_per_cell must be at least 1".to_string());
        }

        if self.test_exponents.len() != self.dimension {
            return invalid(format!(
                "expected {} test exponents, got {}",
                self.dimension,
                self.test_exponents.len()
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return invalid(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            ));
        }

        Ok(())
    }

    /// Loads and validates settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> MlsResult<Self> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| MlsError::Open {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let settings: Self = serde_json::from_reader(reader).map_err(|e| MlsError::Parse {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Writes the settings to a pretty-printed JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> MlsResult<()> {
        let path_ref = path.as_ref();

        let file = File::create(path_ref).map_err(|e| MlsError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let mut w = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut w, self).map_err(|e| MlsError::Serialize {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        w.flush().map_err(|e| MlsError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}
