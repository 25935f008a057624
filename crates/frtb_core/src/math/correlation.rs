//! Dense symmetric correlation matrices.
//!
//! [`CorrelationMatrix`] is the shared representation for intra-bucket ρ,
//! curvature ψ and inter-bucket Γ. Every constructor produces a symmetric
//! matrix: pairwise builders compute the strict lower triangle once and
//! mirror it.

use crate::types::{SbmError, SbmResult};

/// Square symmetric matrix stored row-major.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Matrix of zeros.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; dim * dim],
        }
    }

    /// Identity matrix.
    pub fn identity(dim: usize) -> Self {
        Self::zeros(dim).with_diagonal(1.0)
    }

    /// Constant off-diagonal value with the given diagonal.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::math::CorrelationMatrix;
    ///
    /// let gamma = CorrelationMatrix::uniform(3, 0.5, 0.0);
    /// assert_eq!(gamma.get(0, 2), 0.5);
    /// assert_eq!(gamma.get(1, 1), 0.0);
    /// ```
    pub fn uniform(dim: usize, off_diagonal: f64, diagonal: f64) -> Self {
        Self {
            dim,
            values: vec![off_diagonal; dim * dim],
        }
        .with_diagonal(diagonal)
    }

    /// Builds a matrix from a pairwise rule evaluated for `i > j` only.
    ///
    /// The rule's result is written to both `(i, j)` and `(j, i)`; the
    /// diagonal is set to `diagonal`. The first error from the rule aborts
    /// construction.
    pub fn from_pairwise<E, F>(dim: usize, diagonal: f64, mut rule: F) -> Result<Self, E>
    where
        F: FnMut(usize, usize) -> Result<f64, E>,
    {
        let mut matrix = Self::zeros(dim).with_diagonal(diagonal);
        for i in 0..dim {
            for j in 0..i {
                let value = rule(i, j)?;
                matrix.set_symmetric(i, j, value);
            }
        }
        Ok(matrix)
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the rows are not square, `Asymmetric` if any
    /// off-diagonal pair differs by more than `1e-12`.
    pub fn from_rows(rows: &[Vec<f64>]) -> SbmResult<Self> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(SbmError::ShapeMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        let matrix = Self { dim, values };
        if let Some((row, col)) = matrix.first_asymmetry(1e-12) {
            return Err(SbmError::Asymmetric { row, col });
        }
        Ok(matrix)
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns true for a 0×0 matrix.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dim == 0
    }

    /// Element at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.dim && j < self.dim, "index out of bounds");
        self.values[i * self.dim + j]
    }

    /// Writes `value` to `(i, j)` and `(j, i)`.
    #[inline]
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.dim + j] = value;
        self.values[j * self.dim + i] = value;
    }

    /// Copy with the diagonal overwritten.
    pub fn with_diagonal(mut self, diagonal: f64) -> Self {
        for i in 0..self.dim {
            self.values[i * self.dim + i] = diagonal;
        }
        self
    }

    /// Elementwise transform.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            dim: self.dim,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Elementwise product.
    pub fn hadamard(&self, other: &CorrelationMatrix) -> SbmResult<Self> {
        self.check_dim(other.dim)?;
        Ok(Self {
            dim: self.dim,
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a * b)
                .collect(),
        })
    }

    /// Sub-matrix for the given row/column indices, in order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let dim = indices.len();
        let mut values = Vec::with_capacity(dim * dim);
        for &i in indices {
            for &j in indices {
                values.push(self.get(i, j));
            }
        }
        Self { dim, values }
    }

    /// Evaluates `xᵀ M x`.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::math::CorrelationMatrix;
    ///
    /// let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
    /// let q = rho.quadratic_form(&[100.0, -50.0]).unwrap();
    /// assert_eq!(q, 7500.0);
    /// ```
    pub fn quadratic_form(&self, x: &[f64]) -> SbmResult<f64> {
        self.check_dim(x.len())?;
        let mut total = 0.0;
        for (i, xi) in x.iter().enumerate() {
            let row = &self.values[i * self.dim..(i + 1) * self.dim];
            let inner: f64 = row.iter().zip(x).map(|(m, xj)| m * xj).sum();
            total += xi * inner;
        }
        Ok(total)
    }

    /// Returns true if `|M[i,j] − M[j,i]| ≤ tolerance` for all pairs.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.first_asymmetry(tolerance).is_none()
    }

    /// Row-major copy of the values.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.dim.max(1)).map(<[f64]>::to_vec).collect()
    }

    fn first_asymmetry(&self, tolerance: f64) -> Option<(usize, usize)> {
        for i in 0..self.dim {
            for j in 0..i {
                if (self.get(i, j) - self.get(j, i)).abs() > tolerance {
                    return Some((i, j));
                }
            }
        }
        None
    }

    fn check_dim(&self, actual: usize) -> SbmResult<()> {
        if actual != self.dim {
            return Err(SbmError::ShapeMismatch {
                expected: self.dim,
                actual,
            });
        }
        Ok(())
    }
}
