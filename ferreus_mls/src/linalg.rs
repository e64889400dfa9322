/////////////////////////////////////////////////////////////////////////////////////////////
//
// Dense Gaussian elimination with back substitution for the per-node moment systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::PivotStrategy;
use crate::error::SingularMatrixError;
use faer::Mat;

/// Solves the `n x (n + 1)` augmented system `[A | b]` by Gaussian
/// elimination followed by back substitution.
///
/// The system is consumed; on failure no partial solution is returned.
///
/// # Arguments
/// * `augmented` - Matrix of `n` rows and `n + 1` columns, with the
///   right-hand side in the last column.
/// * `strategy` - How the pivot row is picked in each column.
///
/// # Errors
/// [`SingularMatrixError`] naming the first column without a non-zero
/// pivot candidate at or below the diagonal.
///
/// # Panics
/// If `augmented` does not have exactly one more column than rows.
pub fn gaussian_elimination(
    augmented: Mat<f64>,
    strategy: PivotStrategy,
) -> Result<Vec<f64>, SingularMatrixError> {
    let n = augmented.nrows();
    assert!(
        augmented.ncols() == n + 1,
        "augmented system must be n x (n + 1), got {} x {}",
        n,
        augmented.ncols()
    );

    let mut a = augmented;

    for k in 0..n {
        let pivot = match strategy {
            PivotStrategy::FirstNonZero => (k..n).find(|&i| a[(i, k)] != 0.0),
            PivotStrategy::LargestMagnitude => (k..n)
                .filter(|&i| a[(i, k)] != 0.0)
                .max_by(|&i, &j| a[(i, k)].abs().total_cmp(&a[(j, k)].abs())),
        }
        .ok_or(SingularMatrixError { column: k })?;

        if pivot != k {
            for j in k..=n {
                let tmp = a[(k, j)];
                a[(k, j)] = a[(pivot, j)];
                a[(pivot, j)] = tmp;
            }
        }

        let diag = a[(k, k)];
        for i in (k + 1)..n {
            let factor = a[(i, k)] / diag;
            if factor == 0.0 {
                continue;
            }
            for j in k..=n {
                let update = factor * a[(k, j)];
                a[(i, j)] -= update;
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| a[(i, j)] * x[j]).sum();
        x[i] = (a[(i, n)] - sum) / a[(i, i)];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{prelude::Solve, utils::approx::*};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_system(n: usize, seed: u64) -> (Mat<f64>, Mat<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = Mat::from_fn(n, n, |i, j| {
            let v = rng.random_range(-1.0..1.0);
            match i == j {
                true => v + n as f64,
                false => v,
            }
        });
        let b = Mat::from_fn(n, 1, |_, _| rng.random_range(-1.0..1.0));
        (a, b)
    }

    fn augment(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
        let n = a.nrows();
        Mat::from_fn(n, n + 1, |i, j| match j < n {
            true => a[(i, j)],
            false => b[(i, 0)],
        })
    }

    #[test]
    fn matches_lu_solve() {
        for (n, seed) in [(1, 1), (3, 2), (6, 3), (10, 4)] {
            let (a, b) = random_system(n, seed);
            let expected = a.partial_piv_lu().solve(&b);

            for strategy in [PivotStrategy::FirstNonZero, PivotStrategy::LargestMagnitude] {
                let x = gaussian_elimination(augment(&a, &b), strategy).unwrap();
                let x = Mat::from_fn(n, 1, |i, _| x[i]);

                let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * (n as f64));
                assert!(&x ~ &expected);
            }
        }
    }

    #[test]
    fn pivots_past_zero_diagonal() {
        // [[0, 1], [1, 0]] x = [2, 3]
        let system = Mat::from_fn(2, 3, |i, j| [[0.0, 1.0, 2.0], [1.0, 0.0, 3.0]][i][j]);
        let x = gaussian_elimination(system, PivotStrategy::FirstNonZero).unwrap();
        assert!(x == vec![3.0, 2.0]);
    }

    #[test]
    fn zero_column_is_singular() {
        let system = Mat::from_fn(3, 4, |i, j| match j {
            1 => 0.0,
            _ => (i + j + 1) as f64,
        });
        for strategy in [PivotStrategy::FirstNonZero, PivotStrategy::LargestMagnitude] {
            let err = gaussian_elimination(system.clone(), strategy).unwrap_err();
            assert!(err.column == 1);
        }
    }

    #[test]
    fn dependent_rows_fail_on_trailing_diagonal() {
        // Second row is twice the first.
        let system = Mat::from_fn(2, 3, |i, j| [[1.0, 2.0, 1.0], [2.0, 4.0, 5.0]][i][j]);
        let err = gaussian_elimination(system, PivotStrategy::FirstNonZero).unwrap_err();
        assert!(err.column == 1);
    }

    #[test]
    fn empty_system_has_empty_solution() {
        let x = gaussian_elimination(Mat::zeros(0, 1), PivotStrategy::FirstNonZero).unwrap();
        assert!(x.is_empty());
    }

    #[test]
    #[should_panic]
    fn rejects_non_augmented_shape() {
        let _ = gaussian_elimination(Mat::zeros(2, 2), PivotStrategy::FirstNonZero);
    }
}
