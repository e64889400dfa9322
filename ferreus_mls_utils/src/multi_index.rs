/////////////////////////////////////////////////////////////////////////////////////////////
//
// Enumerates the exponent tuples of a multivariate polynomial basis up to a total degree.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::binomial;

/// The ordered set of multi-indices of a `dimension`-variable polynomial basis
/// with total degree at most `degree`.
///
/// The order is the generation order of an odometer over `dimension` counters
/// and is the basis ordering used by every moment matrix and coefficient vector.
///
/// # Example
/// ```
/// use ferreus_mls_utils::IndexSet;
///
/// let index_set = IndexSet::new(2, 1);
///
/// assert_eq!(index_set.len(), 3);
/// assert_eq!(index_set.get(0), &[0, 0]);
/// assert_eq!(index_set.get(1), &[0, 1]);
/// assert_eq!(index_set.get(2), &[1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    dimension: usize,
    degree: usize,
    indices: Vec<Vec<usize>>,
}

impl IndexSet {
    /// Enumerates all tuples of `dimension` non-negative integers whose sum
    /// does not exceed `degree`.
    ///
    /// # Panics
    /// Panics if `dimension` is zero.
    pub fn new(dimension: usize, degree: usize) -> Self {
        assert!(dimension >= 1, "IndexSet requires at least one dimension");

        let expected_size = binomial(dimension + degree, degree);
        let mut indices: Vec<Vec<usize>> = Vec::with_capacity(expected_size);

        // The extra counter at position `dimension` only ever receives the final carry.
        let mut counters = vec![0usize; dimension + 1];

        while counters[dimension] == 0 {
            let entry_sum: usize = counters[..dimension].iter().sum();

            if entry_sum <= degree {
                indices.push(counters[..dimension].iter().rev().copied().collect());
            }

            let mut i = 0;
            while i < dimension && counters[i] == degree {
                counters[i] = 0;
                i += 1;
            }
            counters[i] += 1;
        }

        debug_assert_eq!(indices.len(), expected_size);

        Self {
            dimension,
            degree,
            indices,
        }
    }

    /// Number of multi-indices, `binomial(dimension + degree, degree)`.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the `k`-th multi-index.
    #[inline]
    pub fn get(&self, k: usize) -> &[usize] {
        &self.indices[k]
    }

    /// Iterates over the multi-indices in basis order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[usize]> + '_ {
        self.indices.iter().map(|index| index.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use itertools::Itertools;

    #[test]
    fn size_matches_binomial() {
        for dimension in 1..=4 {
            for degree in 0..=6 {
                let index_set = IndexSet::new(dimension, degree);
                assert!(index_set.len() == binomial(dimension + degree, degree));
            }
        }
    }

    #[test]
    fn entries_are_bounded_and_unique() {
        for dimension in 1..=3 {
            for degree in 0..=5 {
                let index_set = IndexSet::new(dimension, degree);

                for index in index_set.iter() {
                    assert!(index.len() == dimension);
                    assert!(index.iter().sum::<usize>() <= degree);
                }

                assert!(index_set.iter().all_unique());
            }
        }
    }

    #[test]
    fn degree_zero_is_single_constant_term() {
        for dimension in 1..=3 {
            let index_set = IndexSet::new(dimension, 0);
            assert!(index_set.len() == 1);
            assert!(index_set.get(0).iter().all(|&e| e == 0));
        }
    }

    #[test]
    fn one_dimensional_order_is_ascending() {
        let index_set = IndexSet::new(1, 3);
        let flat: Vec<usize> = index_set.iter().map(|index| index[0]).collect();
        assert!(flat == vec![0, 1, 2, 3]);
    }

    #[test]
    fn two_dimensional_quadratic_follows_odometer_order() {
        // The first counter runs fastest and lands in the last axis.
        let index_set = IndexSet::new(2, 2);
        let expected: Vec<Vec<usize>> = vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![2, 0],
        ];
        let actual: Vec<Vec<usize>> = index_set.iter().map(|index| index.to_vec()).collect();
        assert!(actual == expected);
    }

    #[test]
    fn constant_term_comes_first() {
        let index_set = IndexSet::new(3, 3);
        assert!(index_set.get(0) == &[0, 0, 0][..]);
        assert!(index_set.dimension() == 3);
        assert!(index_set.degree() == 3);
    }
}
