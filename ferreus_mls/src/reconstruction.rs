/////////////////////////////////////////////////////////////////////////////////////////////
//
// Reconstructs nodal values from particle data and reports patch test outcomes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::basis::NodeSampler;
use crate::error::SingularMatrixError;
use ferreus_mls_utils::balanced_exponents;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monomial `prod_d x_d^e_d` used to check polynomial reproduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPolynomial {
    pub exponents: Vec<usize>,
}

impl TestPolynomial {
    pub fn new(exponents: Vec<usize>) -> Self {
        Self { exponents }
    }

    /// Splits `degree` evenly across the axes with the remainder on axis 0.
    ///
    /// # Example
    /// ```
    /// use ferreus_mls::TestPolynomial;
    ///
    /// assert_eq!(TestPolynomial::balanced(2, 3).exponents, vec![2, 1]);
    /// ```
    pub fn balanced(dimension: usize, degree: usize) -> Self {
        Self::new(balanced_exponents(dimension, degree))
    }

    /// Total degree of the monomial.
    #[inline]
    pub fn degree(&self) -> usize {
        self.exponents.iter().sum()
    }

    #[inline]
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.exponents
            .iter()
            .zip(x.iter())
            .fold(1.0, |acc, (&e, &xi)| acc * xi.powi(e as i32))
    }
}

impl fmt::Display for TestPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (d, e) in self.exponents.iter().enumerate() {
            if d > 0 {
                write!(f, " * ")?;
            }
            write!(f, "x{d}^{e}")?;
        }
        Ok(())
    }
}

/// Outcome of solving one node's moment system.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSolution {
    /// No particles in the cells around the node.
    ZeroIncidence,

    /// Correction coefficients for the leading `basis_count` basis terms.
    Resolved {
        incidence: usize,
        basis_count: usize,
        alpha: Vec<f64>,
    },

    /// The moment matrix could not be solved.
    Singular(SingularMatrixError),
}

impl NodeSolution {
    /// Correction coefficients when the node was resolved.
    #[inline]
    pub fn alpha(&self) -> Option<&[f64]> {
        match self {
            NodeSolution::Resolved { alpha, .. } => Some(alpha),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, NodeSolution::Resolved { .. })
    }
}

/// Reconstructs the value at `node` from particle values `polynomial(x_p)`:
///
/// `Ur = sum_p W_p * (sum_k alpha_k * b_k(x_p)) * P(x_p)`
///
/// where `alpha` holds the node's correction coefficients for the leading
/// `alpha.len()` basis terms.
pub fn reconstruct_node(
    sampler: &mut NodeSampler<'_>,
    node: usize,
    alpha: &[f64],
    polynomial: &TestPolynomial,
) -> f64 {
    let mut value = 0.0;
    sampler.for_each_particle(node, alpha.len(), |weight, basis, position| {
        let correction: f64 = alpha.iter().zip(basis.iter()).map(|(a, b)| a * b).sum();
        value += weight * correction * polynomial.evaluate(position);
    });
    value
}

/// Exact and reconstructed values at a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeReconstruction {
    pub node: usize,
    pub exact: f64,
    pub reconstructed: f64,
}

impl NodeReconstruction {
    #[inline]
    pub fn error(&self) -> f64 {
        (self.exact - self.reconstructed).abs()
    }
}

/// A node whose moment system could not be solved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnresolvedNode {
    pub node: usize,
    pub error: SingularMatrixError,
}

/// Result of a polynomial patch test over every grid node.
#[derive(Debug, Clone)]
pub struct PatchTestReport {
    pub polynomial: TestPolynomial,
    pub tolerance: f64,

    /// Every node with a resolved solution, in node order.
    pub checked: Vec<NodeReconstruction>,

    /// Nodes with a singular moment matrix, in node order.
    pub unresolved: Vec<UnresolvedNode>,

    /// Nodes with no incident particles.
    pub zero_incidence: Vec<usize>,

    /// Nodes whose basis was truncated to fewer terms than the full set.
    pub truncated: Vec<usize>,
}

impl PatchTestReport {
    /// Checked nodes whose error exceeds the tolerance.
    pub fn failures(&self) -> impl Iterator<Item = &NodeReconstruction> + '_ {
        self.checked
            .iter()
            .filter(move |r| !(r.error() <= self.tolerance))
    }

    /// Largest error over the checked nodes, or zero if none were checked.
    pub fn max_error(&self) -> f64 {
        self.checked
            .iter()
            .map(NodeReconstruction::error)
            .fold(0.0, f64::max)
    }

    /// True when every checked node is within tolerance and no node was left
    /// unresolved.
    pub fn passed(&self) -> bool {
        self.failures().next().is_none() && self.unresolved.is_empty()
    }
}

impl fmt::Display for PatchTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Testing Polynomial")?;
        writeln!(f, "Pn = {}", self.polynomial)?;

        for r in self.failures() {
            writeln!(
                f,
                "Error at node = {} exact value = {} reconstructed value = {}",
                r.node, r.exact, r.reconstructed
            )?;
        }

        for u in &self.unresolved {
            writeln!(f, "Singular matrix at node = {} ({})", u.node, u.error)?;
        }

        match self.passed() {
            true => write!(f, "Test passed"),
            false => write!(f, "Test failed"),
        }
    }
}
