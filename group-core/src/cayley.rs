//! Cayley-table construction from a closed element list (spec.md §4.2).

use crate::error::{Error, Result};
use crate::matrix::{matrices_approx_eq, Matrix};

/// A square integer table of side `n`, where `table[a][b]` is the index of
/// `a · b`. Index 0 is always the identity (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CayleyTable {
    order: usize,
    table: Vec<Vec<usize>>,
}

impl CayleyTable {
    /// The group order (table side length).
    pub fn order(&self) -> usize {
        self.order
    }

    /// `a · b`, by index.
    #[inline]
    pub fn prod(&self, a: usize, b: usize) -> usize {
        self.table[a][b]
    }

    /// Raw row access, used by [`crate::master::MasterGroup`] to build the
    /// derived per-element tables.
    pub fn row(&self, a: usize) -> &[usize] {
        &self.table[a]
    }
}

/// Builds the Cayley table for an ordered, closed list of matrices.
///
/// For each `(i, j)` the product `Mi · Mj` is located in `elements` by
/// tolerance equality. Row/column "used" bitmaps prune the search: since
/// every row and column of a Cayley table is a permutation, a target index
/// that has already been placed in the current row or column cannot recur.
pub fn build_cayley_table(elements: &[Matrix], tolerance: f64) -> Result<CayleyTable> {
    let n = elements.len();
    let mut table = vec![vec![0usize; n]; n];

    for i in 0..n {
        let mut col_used = vec![false; n];
        for j in 0..n {
            let product = &elements[i] * &elements[j];
            let mut found = None;
            for (k, candidate) in elements.iter().enumerate() {
                if col_used[k] {
                    continue;
                }
                if matrices_approx_eq(candidate, &product, tolerance) {
                    found = Some(k);
                    break;
                }
            }
            let k = found.ok_or(Error::NotClosed { a: i, b: j })?;
            table[i][j] = k;
            col_used[k] = true;
        }
    }

    Ok(CayleyTable { order: n, table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{generate_group, MatrixClosureConfig};
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn rotation(theta: f64) -> Matrix {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(theta.sin(), 0.0);
        Matrix::from_row_slice(2, 2, &[c, -s, s, c])
    }

    #[test]
    fn identity_is_zero_in_every_row_and_column() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let closure = generate_group(&[rotation(2.0 * PI / 5.0)], config).unwrap();
        let table = build_cayley_table(closure.elements(), config.tolerance).unwrap();
        for a in 0..table.order() {
            assert_eq!(table.prod(0, a), a);
            assert_eq!(table.prod(a, 0), a);
        }
    }

    #[test]
    fn rows_and_columns_are_permutations() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let closure = generate_group(&[rotation(2.0 * PI / 5.0)], config).unwrap();
        let table = build_cayley_table(closure.elements(), config.tolerance).unwrap();
        let n = table.order();
        for a in 0..n {
            let mut row: Vec<usize> = (0..n).map(|b| table.prod(a, b)).collect();
            row.sort_unstable();
            assert_eq!(row, (0..n).collect::<Vec<_>>());

            let mut col: Vec<usize> = (0..n).map(|b| table.prod(b, a)).collect();
            col.sort_unstable();
            assert_eq!(col, (0..n).collect::<Vec<_>>());
        }
    }
}
