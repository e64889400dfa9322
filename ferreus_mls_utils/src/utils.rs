/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies small combinatorial helpers shared across the ferreus_mls crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Binomial coefficient `n choose k`, computed with exact integer steps.
///
/// # Examples
///
/// ```
/// use ferreus_mls_utils::binomial;
///
/// assert_eq!(binomial(5, 3), 10);
/// assert_eq!(binomial(4, 0), 1);
/// assert_eq!(binomial(2, 3), 0);
/// ```
#[inline]
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);

    // Each partial product is itself a binomial coefficient, so the division is exact.
    (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}

/// Returns the exponents of a monomial of total degree `degree` split as
/// evenly as possible across `dimension` axes, with the remainder on axis 0.
///
/// # Examples
///
/// ```
/// use ferreus_mls_utils::balanced_exponents;
///
/// assert_eq!(balanced_exponents(2, 3), vec![2, 1]);
/// assert_eq!(balanced_exponents(3, 4), vec![2, 1, 1]);
/// ```
pub fn balanced_exponents(dimension: usize, degree: usize) -> Vec<usize> {
    if dimension == 0 {
        return Vec::new();
    }
    let mut exponents = vec![degree / dimension; dimension];
    exponents[0] += degree % dimension;
    exponents
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn binomial_matches_pascal_triangle() {
        for n in 1..20usize {
            for k in 1..n {
                assert!(binomial(n, k) == binomial(n - 1, k - 1) + binomial(n - 1, k));
            }
        }
    }

    #[test]
    fn binomial_edges() {
        assert!(binomial(0, 0) == 1);
        assert!(binomial(7, 7) == 1);
        assert!(binomial(7, 1) == 7);
        assert!(binomial(3, 5) == 0);
    }

    #[test]
    fn balanced_exponents_sum_to_degree() {
        for dimension in 1..=4 {
            for degree in 0..=7 {
                let exponents = balanced_exponents(dimension, degree);
                assert!(exponents.len() == dimension);
                assert!(exponents.iter().sum::<usize>() == degree);
                assert!(exponents.iter().skip(1).all(|&e| e == degree / dimension));
            }
        }
    }
}
