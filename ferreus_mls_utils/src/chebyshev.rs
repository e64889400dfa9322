/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates Chebyshev polynomial sequences and their tensor products over a multi-index set.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::multi_index::IndexSet;

/// Calculates Tn(x), the chebyshev polynomials of the first kind,
/// for n between 0 and `degree` inclusive.
///
/// Uses the recurrence relation:
///  T_0(x) = 1 \n
///  T_1(x) = x \n
///  T_{n+1}(x) = 2xT_n(x) - T_{n-1}(x) for n >= 1
///
/// # Example
/// ```
/// use ferreus_mls_utils::chebyshev;
///
/// let t = chebyshev(3, 0.5);
/// assert_eq!(t, vec![1.0, 0.5, -0.5, -1.0]);
/// ```
pub fn chebyshev(degree: usize, x: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(degree + 1);
    chebyshev_into(&mut values, degree, x);
    values
}

/// Same as [`chebyshev`], but writes into an existing buffer which is
/// resized to `degree + 1`.
#[inline]
pub fn chebyshev_into(values: &mut Vec<f64>, degree: usize, x: f64) {
    values.clear();
    values.push(1.0);
    if degree >= 1 {
        values.push(x);
    }
    for i in 2..=degree {
        let next = 2.0 * x * values[i - 1] - values[i - 2];
        values.push(next);
    }
}

/// Evaluates the tensor-product basis `prod_d T_d[k[d]]` for the leading
/// `out.len()` multi-indices `k` of `index_set`.
///
/// `axis_values[d]` holds the Chebyshev sequence evaluated along axis `d`
/// and must have at least `index_set.degree() + 1` entries.
#[inline]
pub fn evaluate_tensor_basis(index_set: &IndexSet, axis_values: &[Vec<f64>], out: &mut [f64]) {
    debug_assert_eq!(axis_values.len(), index_set.dimension());
    debug_assert!(out.len() <= index_set.len());

    out.iter_mut()
        .zip(index_set.iter())
        .for_each(|(value, index)| {
            *value = index
                .iter()
                .zip(axis_values.iter())
                .fold(1.0, |acc, (&k, t)| acc * t[k]);
        });
}

/// Returns the tensor-product basis evaluated at the local origin for the
/// leading `basis_count` multi-indices.
///
/// Since T_n(0) cycles through 1, 0, -1, 0, only terms with even exponents
/// along every axis are non-zero.
pub fn chebyshev_at_origin_basis(index_set: &IndexSet, basis_count: usize) -> Vec<f64> {
    let at_origin = chebyshev(index_set.degree(), 0.0);
    let axis_values = vec![at_origin; index_set.dimension()];

    let mut values = vec![0.0; basis_count];
    evaluate_tensor_basis(index_set, &axis_values, &mut values);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn satisfies_recurrence() {
        for &x in &[-1.3, -0.7, 0.0, 0.25, 0.9, 2.0] {
            let n = 8;
            let t = chebyshev(n, x);
            assert!(t.len() == n + 1);
            for i in 2..=n {
                let expected = 2.0 * x * t[i - 1] - t[i - 2];
                assert!((t[i] - expected).abs() <= 1e-12);
            }
        }
    }

    #[test]
    fn all_ones_at_one() {
        let t = chebyshev(10, 1.0);
        assert!(t.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn alternates_at_zero() {
        let t = chebyshev(7, 0.0);
        assert!(t == vec![1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn matches_cosine_definition_inside_interval() {
        for &x in &[-0.95, -0.3, 0.1, 0.6, 0.99] {
            let t = chebyshev(6, x);
            let theta = f64::acos(x);
            for (n, value) in t.iter().enumerate() {
                assert!((value - (n as f64 * theta).cos()).abs() <= 1e-12);
            }
        }
    }

    #[test]
    fn degree_zero_and_one() {
        assert!(chebyshev(0, 0.3) == vec![1.0]);
        assert!(chebyshev(1, 0.3) == vec![1.0, 0.3]);
    }

    #[test]
    fn buffer_is_resized_on_reuse() {
        let mut buffer = vec![9.0; 12];
        chebyshev_into(&mut buffer, 2, 0.5);
        assert!(buffer == vec![1.0, 0.5, -0.5]);
    }

    #[test]
    fn tensor_basis_is_product_of_axis_values() {
        let index_set = IndexSet::new(2, 2);
        let axis_values = vec![chebyshev(2, 0.5), chebyshev(2, -0.25)];
        let mut out = vec![0.0; index_set.len()];
        evaluate_tensor_basis(&index_set, &axis_values, &mut out);

        for (k, index) in index_set.iter().enumerate() {
            let expected = axis_values[0][index[0]] * axis_values[1][index[1]];
            assert!((out[k] - expected).abs() <= 1e-15);
        }
    }

    #[test]
    fn origin_basis_keeps_only_even_exponents() {
        let index_set = IndexSet::new(2, 3);
        let values = chebyshev_at_origin_basis(&index_set, index_set.len());

        for (value, index) in values.iter().zip(index_set.iter()) {
            let expected = match index.iter().all(|e| e % 2 == 0) {
                true => {
                    let negatives = index.iter().filter(|&&e| e % 4 == 2).count();
                    if negatives % 2 == 0 { 1.0 } else { -1.0 }
                }
                false => 0.0,
            };
            assert!(*value == expected);
        }
    }

    #[test]
    fn origin_basis_is_truncated() {
        let index_set = IndexSet::new(2, 2);
        let values = chebyshev_at_origin_basis(&index_set, 2);
        assert!(values.len() == 2);
        assert!(values[0] == 1.0);
    }
}
