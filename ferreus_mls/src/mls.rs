/////////////////////////////////////////////////////////////////////////////////////////////
//
// Coordinates per-node moment assembly, solves and reconstruction over the whole grid.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    basis::NodeSampler,
    config::{MlsSettings, SingularPolicy},
    error::{MlsError, MlsResult},
    grid::{Grid, ParticleSet},
    linalg::gaussian_elimination,
    moments::NodeMoments,
    progress::{emit, progress_fraction, ProgressMsg, ProgressSink},
    reconstruction::{
        reconstruct_node, NodeReconstruction, NodeSolution, PatchTestReport, TestPolynomial,
        UnresolvedNode,
    },
};
use ferreus_mls_utils::IndexSet;
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Instant;

/// A convenience builder for constructing an [`MlsReconstructor`].
///
/// The builder should be called via the [`MlsReconstructor::builder`] method.
pub struct MlsReconstructorBuilder {
    settings: MlsSettings,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl MlsReconstructorBuilder {
    fn new(settings: MlsSettings) -> Self {
        Self {
            settings,
            progress_callback: None,
        }
    }

    /// Optional callback for reporting progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Validates the settings, enumerates the basis, builds the grid and
    /// scatters the particles.
    pub fn build(self) -> MlsResult<MlsReconstructor> {
        MlsReconstructor::new(self.settings, self.progress_callback)
    }
}

/// Weighted moving least squares reconstruction on a tensor-product grid.
///
/// Each grid node gathers the particles of its incident cells, assembles the
/// weighted moment matrix of a local Chebyshev basis and solves for
/// correction coefficients `alpha` such that a polynomial carried by the
/// particles is reproduced exactly at the node.
#[derive(Debug)]
pub struct MlsReconstructor {
    /// Validated run settings.
    pub settings: MlsSettings,

    /// Multi-indices of the local basis, constant term first.
    pub index_set: IndexSet,

    /// Grid topology and coordinates.
    pub grid: Grid,

    /// Particles shared by every node pass.
    pub particles: ParticleSet,

    pub(crate) progress_callback: Option<Arc<dyn ProgressSink>>,
}

/// Per-node result of one assemble, solve and evaluate pass.
struct NodePass {
    solution: NodeSolution,
    truncated: bool,
    reconstructed: Option<f64>,
}

/// Counts processed nodes and reports progress at roughly every tenth of the total.
struct NodeCounter<'a> {
    completed: AtomicUsize,
    total: usize,
    step: usize,
    sink: &'a Option<Arc<dyn ProgressSink>>,
}

impl<'a> NodeCounter<'a> {
    fn new(total: usize, sink: &'a Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            step: (total / 10).max(1),
            sink,
        }
    }

    fn tick(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % self.step == 0 || completed == self.total {
            emit(
                self.sink,
                ProgressMsg::NodeProgress {
                    completed,
                    total: self.total,
                    progress: progress_fraction(completed, self.total),
                },
            );
        }
    }
}

impl MlsReconstructor {
    /// Creates a new [`MlsReconstructorBuilder`] for the given settings.
    ///
    /// # Example
    /// ```
    /// use ferreus_mls::{AxisCoordinates, MlsReconstructor, MlsSettings, ParticleExclusion};
    ///
    /// let axis = AxisCoordinates::uniform(0.0, 2.0, 3);
    /// let settings = MlsSettings::builder(1, 1, axis)
    ///     .particles_per_cell(4)
    ///     .particle_exclusion(ParticleExclusion::None)
    ///     .seed(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// let reconstructor = MlsReconstructor::builder(settings).build().unwrap();
    /// let report = reconstructor.patch_test().unwrap();
    /// assert!(report.passed());
    /// ```
    pub fn builder(settings: MlsSettings) -> MlsReconstructorBuilder {
        MlsReconstructorBuilder::new(settings)
    }

    fn new(
        settings: MlsSettings,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> MlsResult<Self> {
        settings.validate()?;

        let index_set = IndexSet::new(settings.dimension, settings.degree);
        emit(
            &progress_callback,
            ProgressMsg::IndexSetBuilt {
                dimension: settings.dimension,
                degree: settings.degree,
                size: index_set.len(),
            },
        );

        if settings.verbose {
            for (position, exponents) in index_set.iter().enumerate() {
                emit(
                    &progress_callback,
                    ProgressMsg::MultiIndex {
                        position,
                        exponents: exponents.to_vec(),
                    },
                );
            }
        }

        let grid = Grid::new(settings.axes.clone(), settings.particle_exclusion);
        let particles = ParticleSet::scatter(&grid, settings.particles_per_cell, settings.seed);

        emit(
            &progress_callback,
            ProgressMsg::ParticlesScattered {
                num_particles: particles.len(),
                num_cells: grid.num_cells(),
                cells_with_particles: particles.cells_with_particles(),
            },
        );

        Ok(Self {
            settings,
            index_set,
            grid,
            particles,
            progress_callback,
        })
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.grid.num_nodes()
    }

    fn sampler(&self) -> NodeSampler<'_> {
        NodeSampler::new(&self.index_set, &self.grid, &self.particles)
    }

    /// Weighted moments of a single node over the full basis.
    pub fn node_moments(&self, node: usize) -> NodeMoments {
        NodeMoments::assemble(&mut self.sampler(), node, self.index_set.len())
    }

    /// Assembles and solves the moment system of a single node.
    pub fn solve_node(&self, node: usize) -> NodeSolution {
        self.solve_with(&mut self.sampler(), node).0
    }

    /// Returns the node's solution and whether its basis was truncated.
    fn solve_with(&self, sampler: &mut NodeSampler<'_>, node: usize) -> (NodeSolution, bool) {
        let moments = NodeMoments::assemble(sampler, node, self.index_set.len());

        let system = match moments.augmented_system(&self.index_set) {
            Some(system) => system,
            None => return (NodeSolution::ZeroIncidence, false),
        };

        let truncated = moments.is_truncated();
        if truncated {
            emit(
                &self.progress_callback,
                ProgressMsg::BasisTruncated {
                    node,
                    incidence: moments.incidence,
                    basis_count: moments.basis_count(),
                },
            );
        }

        let solution = match gaussian_elimination(system, self.settings.pivot_strategy) {
            Ok(alpha) => NodeSolution::Resolved {
                incidence: moments.incidence,
                basis_count: moments.basis_count(),
                alpha,
            },
            Err(e) => {
                emit(
                    &self.progress_callback,
                    ProgressMsg::SingularMatrix {
                        node,
                        column: e.column,
                    },
                );
                NodeSolution::Singular(e)
            }
        };

        (solution, truncated)
    }

    /// Returns the first singular node as an error when the run is set to abort.
    fn check_singular<'s, I>(&self, solutions: I) -> MlsResult<()>
    where
        I: IntoIterator<Item = &'s NodeSolution>,
    {
        if self.settings.singular_policy == SingularPolicy::Skip {
            return Ok(());
        }

        for (node, solution) in solutions.into_iter().enumerate() {
            if let NodeSolution::Singular(e) = solution {
                return Err(MlsError::SingularNode { node, source: *e });
            }
        }
        Ok(())
    }

    /// Solves every node's moment system in parallel.
    ///
    /// # Errors
    /// [`MlsError::SingularNode`] for the lowest numbered singular node when
    /// the singular policy is [`SingularPolicy::Abort`].
    pub fn solve(&self) -> MlsResult<Vec<NodeSolution>> {
        let counter = NodeCounter::new(self.num_nodes(), &self.progress_callback);

        let solutions: Vec<NodeSolution> = (0..self.num_nodes())
            .into_par_iter()
            .map_init(
                || self.sampler(),
                |sampler, node| {
                    let (solution, _) = self.solve_with(sampler, node);
                    counter.tick();
                    solution
                },
            )
            .collect();

        self.check_singular(&solutions)?;
        Ok(solutions)
    }

    /// Reconstructs `polynomial` at every node from its values at the particles,
    /// using previously computed solutions.
    ///
    /// Returns `None` for nodes without a resolved solution.
    pub fn reconstruct(
        &self,
        polynomial: &TestPolynomial,
        solutions: &[NodeSolution],
    ) -> Vec<Option<f64>> {
        solutions
            .par_iter()
            .enumerate()
            .map_init(
                || self.sampler(),
                |sampler, (node, solution)| {
                    solution
                        .alpha()
                        .map(|alpha| reconstruct_node(sampler, node, alpha, polynomial))
                },
            )
            .collect()
    }

    /// Runs the polynomial patch test with the configured test exponents.
    ///
    /// Each node is assembled, solved and evaluated in a single pass, so its
    /// moment matrix is dropped as soon as the node is done.
    ///
    /// # Errors
    /// [`MlsError::SingularNode`] for the lowest numbered singular node when
    /// the singular policy is [`SingularPolicy::Abort`].
    pub fn patch_test(&self) -> MlsResult<PatchTestReport> {
        let start = Instant::now();
        let polynomial = TestPolynomial::new(self.settings.test_exponents.clone());
        let counter = NodeCounter::new(self.num_nodes(), &self.progress_callback);

        let passes: Vec<NodePass> = (0..self.num_nodes())
            .into_par_iter()
            .map_init(
                || self.sampler(),
                |sampler, node| {
                    let (solution, truncated) = self.solve_with(sampler, node);
                    let reconstructed = solution
                        .alpha()
                        .map(|alpha| reconstruct_node(sampler, node, alpha, &polynomial));
                    counter.tick();
                    NodePass {
                        solution,
                        truncated,
                        reconstructed,
                    }
                },
            )
            .collect();

        self.check_singular(passes.iter().map(|pass| &pass.solution))?;

        let mut report = PatchTestReport {
            polynomial,
            tolerance: self.settings.tolerance,
            checked: Vec::new(),
            unresolved: Vec::new(),
            zero_incidence: Vec::new(),
            truncated: Vec::new(),
        };

        for (node, pass) in passes.into_iter().enumerate() {
            if pass.truncated {
                report.truncated.push(node);
            }

            match pass.solution {
                NodeSolution::ZeroIncidence => report.zero_incidence.push(node),
                NodeSolution::Singular(error) => {
                    report.unresolved.push(UnresolvedNode { node, error })
                }
                NodeSolution::Resolved { .. } => {
                    if let Some(reconstructed) = pass.reconstructed {
                        let exact = report
                            .polynomial
                            .evaluate(&self.grid.node_coordinates(node));
                        report.checked.push(NodeReconstruction {
                            node,
                            exact,
                            reconstructed,
                        });
                    }
                }
            }
        }

        for r in report.failures() {
            emit(
                &self.progress_callback,
                ProgressMsg::ToleranceExceeded {
                    node: r.node,
                    exact: r.exact,
                    reconstructed: r.reconstructed,
                },
            );
        }

        emit(
            &self.progress_callback,
            ProgressMsg::Message {
                message: format!(
                    "Took {:?} to test Pn = {} on {} nodes: {} checked, {} unresolved, {} without particles, max error {:e}",
                    start.elapsed(),
                    report.polynomial,
                    self.num_nodes(),
                    report.checked.len(),
                    report.unresolved.len(),
                    report.zero_incidence.len(),
                    report.max_error(),
                ),
            },
        );

        Ok(report)
    }
}
