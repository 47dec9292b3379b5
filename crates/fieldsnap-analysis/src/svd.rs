//! Reduced singular value decomposition of snapshot matrices.
//!
//! Rows of the input are snapshots in time and columns are grid cells, so the
//! rows of `Vᵀ` are spatial modes ordered by the energy they carry.

use std::cmp::Ordering;

use fieldsnap_core::Element;
use fieldsnap_device::StridedView;
use nalgebra::{DMatrix, DVector, SVD};

use crate::error::AnalysisError;

/// `A = U Σ Vᵀ` with `U: m×k`, `Σ` as `k` descending values and `Vᵀ: k×n`,
/// where `k = min(m, n)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeDecomposition {
    u: DMatrix<f64>,
    singular_values: DVector<f64>,
    v_t: DMatrix<f64>,
}

impl ModeDecomposition {
    /// Decompose a 2-D view, reading it where it lives.
    pub fn decompose<T: Element>(view: &StridedView<'_, T>) -> Result<Self, AnalysisError> {
        if view.ndim() != 2 {
            return Err(AnalysisError::NotTwoDimensional { ndim: view.ndim() });
        }
        let (rows, cols) = (view.shape()[0], view.shape()[1]);
        let matrix = DMatrix::from_row_iterator(rows, cols, view.iter().map(T::to_f64));
        Self::from_matrix(matrix)
    }

    /// Decompose a host matrix.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, AnalysisError> {
        let (rows, cols) = matrix.shape();
        // nalgebra iterates column-major.
        if let Some(at) = matrix.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFinite {
                row: at % rows,
                col: at / rows,
            });
        }
        let k = rows.min(cols);
        if k == 0 || matrix.iter().all(|&v| v == 0.0) {
            return Ok(Self {
                u: DMatrix::identity(rows, k),
                singular_values: DVector::zeros(k),
                v_t: DMatrix::identity(k, cols),
            });
        }
        let svd = SVD::try_new_unordered(matrix, true, true, f64::EPSILON, 0)
            .ok_or(AnalysisError::NoConvergence)?;
        let mut decomposition = Self {
            u: svd.u.expect("left singular vectors requested"),
            singular_values: svd.singular_values,
            v_t: svd.v_t.expect("right singular vectors requested"),
        };
        decomposition.sort_descending();
        Ok(decomposition)
    }

    /// Order the factors by decreasing singular value.
    fn sort_descending(&mut self) {
        let len = self.singular_values.len();
        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by(|&a, &b| {
            self.singular_values[b]
                .partial_cmp(&self.singular_values[a])
                .unwrap_or(Ordering::Equal)
        });
        if order.iter().enumerate().all(|(i, &from)| i == from) {
            return;
        }
        let sorted = order.iter().map(|&i| self.singular_values[i]);
        self.singular_values = DVector::from_iterator(len, sorted);
        self.u = self.u.select_columns(order.iter());
        self.v_t = self.v_t.select_rows(order.iter());
    }

    /// `k = min(rows, cols)`.
    pub fn len(&self) -> usize {
        self.singular_values.len()
    }

    /// Returns `true` if the input had no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.singular_values.is_empty()
    }

    /// Singular values, largest first.
    pub fn singular_values(&self) -> &[f64] {
        self.singular_values.as_slice()
    }

    /// Left singular vectors as columns, `rows × k`.
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    /// Right singular vectors as rows, `k × cols`.
    pub fn v_t(&self) -> &DMatrix<f64> {
        &self.v_t
    }

    /// Spatial mode `index` (row `index` of `Vᵀ`).
    pub fn mode(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.len()).then(|| self.v_t.row(index).iter().copied().collect())
    }

    /// Number of singular values above `tolerance`.
    pub fn rank(&self, tolerance: f64) -> usize {
        self.singular_values.iter().filter(|&&s| s > tolerance).count()
    }

    /// Share of `Σ σ²` carried by each mode. All zero for a zero matrix.
    pub fn energy_fractions(&self) -> Vec<f64> {
        let total: f64 = self.singular_values.iter().map(|s| s * s).sum();
        if total == 0.0 {
            return vec![0.0; self.len()];
        }
        self.singular_values.iter().map(|s| s * s / total).collect()
    }

    /// `U Σ Vᵀ`.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.u * DMatrix::from_diagonal(&self.singular_values) * &self.v_t
    }
}

#[cfg(test)]
mod tests {
    use fieldsnap_core::{Device, Layout};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rank_one_matrix() {
        // Outer product of [1, 2] and [3, 4, 0].
        let data = [3.0f64, 4.0, 0.0, 6.0, 8.0, 0.0];
        let view = StridedView::new(&data, Layout::contiguous(&[2, 3]), Device::Host).unwrap();
        let d = ModeDecomposition::decompose(&view).unwrap();
        assert_eq!(d.len(), 2);
        let expected = 5.0 * 5.0f64.sqrt();
        assert!((d.singular_values()[0] - expected).abs() < 1e-10);
        assert!(d.singular_values()[1].abs() < 1e-10);
        assert_eq!(d.rank(1e-9), 1);
        let mode = d.mode(0).unwrap();
        assert!((mode[0].abs() - 0.6).abs() < 1e-10);
        assert!((mode[1].abs() - 0.8).abs() < 1e-10);
        assert!(d.mode(2).is_none());
    }

    #[test]
    fn zero_matrix_has_zero_singular_values() {
        let d = ModeDecomposition::from_matrix(DMatrix::zeros(5, 3)).unwrap();
        assert_eq!(d.singular_values(), &[0.0; 3]);
        assert_eq!(d.energy_fractions(), vec![0.0; 3]);
        assert_eq!(d.u().shape(), (5, 3));
        assert_eq!(d.v_t().shape(), (3, 3));
    }

    #[test]
    fn empty_matrix() {
        let d = ModeDecomposition::from_matrix(DMatrix::zeros(0, 4)).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.v_t().shape(), (0, 4));
    }

    #[test]
    fn non_finite_is_located() {
        let mut m = DMatrix::<f64>::zeros(3, 2);
        m[(2, 1)] = f64::NAN;
        assert_eq!(
            ModeDecomposition::from_matrix(m).unwrap_err(),
            AnalysisError::NonFinite { row: 2, col: 1 }
        );
    }

    #[test]
    fn three_d_input_is_rejected() {
        let data = [0.0f32; 8];
        let view = StridedView::new(&data, Layout::contiguous(&[2, 2, 2]), Device::Host).unwrap();
        assert_eq!(
            ModeDecomposition::decompose(&view).unwrap_err(),
            AnalysisError::NotTwoDimensional { ndim: 3 }
        );
    }

    #[test]
    fn factors_are_sorted_by_singular_value() {
        // Diagonal input: the unordered factorisation has no reason to
        // return these largest first.
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 3.0, 2.0]));
        let d = ModeDecomposition::from_matrix(m).unwrap();
        for (s, expected) in d.singular_values().iter().zip([3.0, 2.0, 1.0]) {
            assert!((s - expected).abs() < 1e-12);
        }
        let mode = d.mode(0).unwrap();
        for (v, expected) in mode.iter().zip([0.0, 1.0, 0.0]) {
            assert!((v.abs() - expected).abs() < 1e-12);
        }
        assert!((d.u()[(1, 0)].abs() - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn factors_reconstruct_input(
            rows in 1usize..8,
            cols in 1usize..8,
            seed in prop::collection::vec(-10.0f64..10.0, 64),
        ) {
            let m = DMatrix::from_fn(rows, cols, |r, c| seed[r * 8 + c]);
            let d = ModeDecomposition::from_matrix(m.clone()).unwrap();
            prop_assert_eq!(d.len(), rows.min(cols));
            for pair in d.singular_values().windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
            let err = (d.reconstruct() - &m).amax();
            prop_assert!(err < 1e-8, "reconstruction error {}", err);
        }
    }
}
