//! Matrix-level closure generation (spec.md §4.1).
//!
//! Mirrors `application.calc.matcal.generate_group` from the Python original,
//! reworked the way the teacher's [`GenIter`] builds a group from matrix
//! generators: BFS over a frontier, tolerance-based membership testing, and
//! an explicit failure value instead of an exception.

use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A square complex matrix, as supplied by the caller.
pub type Matrix = DMatrix<Complex64>;

/// Bundles the two scalars spec.md passes around together: the entry-wise
/// tolerance and the bound on the closure size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixClosureConfig {
    /// Entry-wise tolerance used for every equality test in this module.
    pub tolerance: f64,
    /// Closure fails once the accumulated element count exceeds this.
    pub max_order: usize,
}

impl MatrixClosureConfig {
    /// Builds a config, rejecting a negative tolerance immediately — a
    /// negative tolerance can never compare anything equal, so the closure
    /// loop would run forever without this check (spec.md §4.1).
    pub fn new(tolerance: f64, max_order: usize) -> Result<Self> {
        if tolerance < 0.0 {
            return Err(Error::InputInvalid("tolerance must be non-negative".into()));
        }
        Ok(Self { tolerance, max_order })
    }
}

/// Two complex numbers are "zero" under the same entry-wise rule used for
/// matrix equality: both the real and imaginary parts must individually fall
/// within the tolerance.
fn complex_is_zero(z: Complex64, tolerance: f64) -> bool {
    approx::abs_diff_eq!(z.re, 0.0, epsilon = tolerance)
        && approx::abs_diff_eq!(z.im, 0.0, epsilon = tolerance)
}

/// Two matrices are equal when every entry satisfies the rule above after
/// subtraction. Differing dimensions are never equal.
pub fn matrices_approx_eq(a: &Matrix, b: &Matrix, tolerance: f64) -> bool {
    if a.shape() != b.shape() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| complex_is_zero(x - y, tolerance))
}

fn contains(list: &[Matrix], m: &Matrix, tolerance: f64) -> bool {
    list.iter().any(|candidate| matrices_approx_eq(candidate, m, tolerance))
}

/// The outcome of a closure attempt: the BFS-ordered element list (identity
/// first) on success, or a reason it failed to close.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureResult {
    elements: Vec<Matrix>,
}

impl ClosureResult {
    /// The closure elements, identity first, in BFS discovery order.
    pub fn elements(&self) -> &[Matrix] {
        &self.elements
    }

    /// Consumes the result, returning the owned element list.
    pub fn into_elements(self) -> Vec<Matrix> {
        self.elements
    }
}

/// Builds the finite closure of `generators` under matrix multiplication.
///
/// Preconditions are validated in the order spec.md §4.1 lists them:
/// non-negative tolerance (already enforced by [`MatrixClosureConfig::new`]),
/// at least one generator, every generator square, all generators sharing a
/// dimension, and every generator having unit-modulus determinant.
pub fn generate_group(generators: &[Matrix], config: MatrixClosureConfig) -> Result<ClosureResult> {
    if generators.is_empty() {
        return Err(Error::InputInvalid("no generators supplied".into()));
    }

    let dim = generators[0].nrows();
    for g in generators {
        if g.nrows() != g.ncols() {
            return Err(Error::InputInvalid(format!(
                "generator is not square: {}x{}",
                g.nrows(),
                g.ncols()
            )));
        }
        if g.nrows() != dim {
            return Err(Error::InputInvalid("generators do not share a dimension".into()));
        }
    }
    for g in generators {
        let det_mag = g.clone().determinant().norm();
        if !complex_is_zero(Complex64::new(det_mag - 1.0, 0.0), config.tolerance) {
            return Err(Error::InputInvalid(
                "generator does not have unit-modulus determinant".into(),
            ));
        }
    }

    let identity = Matrix::identity(dim, dim);

    // Drop generators equal to the identity or duplicating a kept generator.
    let mut kept: Vec<Matrix> = Vec::with_capacity(generators.len());
    for g in generators {
        if matrices_approx_eq(g, &identity, config.tolerance) {
            continue;
        }
        if contains(&kept, g, config.tolerance) {
            continue;
        }
        kept.push(g.clone());
    }

    let mut elements = Vec::with_capacity(kept.len() + 1);
    elements.push(identity);
    elements.extend(kept.iter().cloned());

    let mut frontier = kept.clone();
    let mut loop_count = 0usize;

    while !frontier.is_empty() {
        if elements.len() > config.max_order {
            debug!(max_order = config.max_order, "closure exceeded bound");
            return Err(Error::ClosureExceeded { max_order: config.max_order });
        }
        loop_count += 1;
        trace!(loop_count, elements = elements.len(), "closure loop");

        let mut next_frontier = Vec::new();
        for m in &frontier {
            for g in &kept {
                let product = m * g;
                if !contains(&elements, &product, config.tolerance) {
                    elements.push(product.clone());
                    next_frontier.push(product);
                }
            }
        }
        frontier = next_frontier;
    }

    debug!(order = elements.len(), "closure complete");
    Ok(ClosureResult { elements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn rotation(theta: f64) -> Matrix {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(theta.sin(), 0.0);
        Matrix::from_row_slice(2, 2, &[c, -s, s, c])
    }

    fn reflection() -> Matrix {
        Matrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-1.0, 0.0),
            ],
        )
    }

    #[test]
    fn dihedral_3_closes_to_order_6() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let result = generate_group(&[rotation(2.0 * PI / 3.0), reflection()], config).unwrap();
        assert_eq!(result.elements().len(), 6);
    }

    #[test]
    fn empty_generators_is_invalid() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        assert!(matches!(generate_group(&[], config), Err(Error::InputInvalid(_))));
    }

    #[test]
    fn mismatched_dimensions_is_invalid() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let small = Matrix::identity(1, 1);
        let big = Matrix::identity(2, 2);
        assert!(matches!(generate_group(&[small, big], config), Err(Error::InputInvalid(_))));
    }

    #[test]
    fn non_unit_determinant_is_invalid() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let m = Matrix::from_row_slice(
            1,
            1,
            &[Complex64::new(2.0, 0.0)],
        );
        assert!(matches!(generate_group(&[m], config), Err(Error::InputInvalid(_))));
    }

    #[test]
    fn negative_tolerance_is_invalid() {
        assert!(MatrixClosureConfig::new(-1.0, 10).is_err());
    }

    #[test]
    fn closure_exceeded_reports_bound() {
        let config = MatrixClosureConfig::new(1e-4, 3).unwrap();
        let err = generate_group(&[rotation(2.0 * PI / 7.0)], config).unwrap_err();
        assert_eq!(err, Error::ClosureExceeded { max_order: 3 });
    }
}
