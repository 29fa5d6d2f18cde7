//! Cartesian (direct/semidirect) and quotient decomposition classification
//! (spec.md §9 design notes), ported from `application.calc.groupstructure`.

use std::rc::Rc;

use crate::subgroup::Subgroup;

/// How a pair of subgroups `(H, K)` combines to reconstruct a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartesianOutcome {
    /// Both factors are normal: `G ≅ H × K`.
    Direct,
    /// `H` is normal and `K` is not: `G ≅ H ⋊ K`.
    LeftSemi,
    /// `K` is normal and `H` is not: `G ≅ K ⋊ H`.
    RightSemi,
    /// Neither factor reconstructs `G`, or neither is normal.
    Invalid,
}

/// Whether a normal subgroup yields a valid quotient, carrying the
/// complement subgroup found by [`classify_quotient`]'s greedy search when
/// one exists (spec.md §9: `QuotientOutcome = Valid(SubgroupHandle) |
/// Invalid`).
#[derive(Debug, Clone)]
pub enum QuotientOutcome {
    /// `normal` is a non-trivial normal subgroup of a non-simple parent,
    /// and `complement` is a subgroup meeting it only at the identity
    /// whose order makes up the rest of the parent's order.
    Valid(Rc<Subgroup>),
    /// `normal` is not a non-trivial normal subgroup of the parent, the
    /// parent is simple, or no complement was found.
    Invalid,
}

/// A confirmed internal direct product decomposition `G ≅ H × K`.
#[derive(Debug, Clone)]
pub struct DirectProduct<'a> {
    /// The larger (or equal-order) factor, by convention placed on the left.
    pub left: &'a Subgroup,
    /// The smaller (or equal-order) factor.
    pub right: &'a Subgroup,
}

/// A confirmed internal semidirect product decomposition `G ≅ N ⋊ H`.
#[derive(Debug, Clone)]
pub struct SemidirectProduct<'a> {
    /// The normal factor (the kernel of the product).
    pub normal: &'a Subgroup,
    /// The acting factor.
    pub acting: &'a Subgroup,
}

fn trivial_intersection(a: &Subgroup, b: &Subgroup) -> bool {
    a.elements().iter().filter(|e| b.contains(**e)).count() == 1
}

fn spans(parent: &Subgroup, a: &Subgroup, b: &Subgroup) -> bool {
    use std::collections::HashSet;
    let master = parent.master_handle();
    let mut products: HashSet<usize> = HashSet::new();
    for &x in a.elements() {
        for &y in b.elements() {
            products.insert(master.index_prod(x, y));
        }
    }
    products.len() == parent.order() && parent.elements().iter().all(|e| products.contains(e))
}

/// Classifies how `left` and `right` combine inside `parent`.
pub fn classify_cartesian(parent: &Subgroup, left: &Subgroup, right: &Subgroup) -> CartesianOutcome {
    if left.order() * right.order() != parent.order() {
        return CartesianOutcome::Invalid;
    }
    if !trivial_intersection(left, right) {
        return CartesianOutcome::Invalid;
    }
    if !spans(parent, left, right) {
        return CartesianOutcome::Invalid;
    }

    let left_normal = left.is_normal_subgroup_of(parent);
    let right_normal = right.is_normal_subgroup_of(parent);

    match (left_normal, right_normal) {
        (true, true) => CartesianOutcome::Direct,
        (true, false) => CartesianOutcome::LeftSemi,
        (false, true) => CartesianOutcome::RightSemi,
        (false, false) => CartesianOutcome::Invalid,
    }
}

/// Classifies whether `normal` yields a valid quotient of `parent`,
/// following spec.md §4.4's `study_quotient_decomposition`: fails outright
/// if `parent` is simple or `normal` is not a proper non-trivial normal
/// subgroup, otherwise greedily grows a complement `S` (smallest-index
/// candidate outside `normal` first, for determinism) whose generated
/// subgroup meets `normal` only at the identity, until
/// `|⟨S⟩|·|normal| = |parent|`.
pub fn classify_quotient(parent: &Subgroup, normal: &Subgroup) -> QuotientOutcome {
    if parent.is_simple() {
        return QuotientOutcome::Invalid;
    }
    if normal.order() <= 1 || normal.order() >= parent.order() || !normal.is_normal_subgroup_of(parent) {
        return QuotientOutcome::Invalid;
    }

    let master = parent.master_handle();
    let mut candidates: Vec<usize> = parent
        .elements()
        .iter()
        .copied()
        .filter(|e| !normal.contains(*e))
        .collect();
    candidates.sort_unstable();

    let mut gens: Vec<usize> = Vec::new();
    loop {
        if candidates.is_empty() {
            return QuotientOutcome::Invalid;
        }
        let mut generated: Option<Rc<Subgroup>> = None;
        let mut next_gens = gens.clone();
        for &index in &candidates.clone() {
            let mut trial = gens.clone();
            trial.push(index);
            let gen_group = match master.generate_subgroup(&trial) {
                Ok(g) => g,
                Err(_) => continue,
            };
            let intersection = gen_group.elements().iter().filter(|e| normal.contains(*e)).count();
            if intersection != 1 {
                candidates.retain(|c| *c != index);
            } else {
                next_gens = trial;
                generated = Some(gen_group);
                break;
            }
        }
        gens = next_gens;
        let generated = match generated {
            Some(g) => g,
            None => return QuotientOutcome::Invalid,
        };
        candidates.retain(|c| !generated.contains(*c));
        if generated.order() * normal.order() == parent.order() {
            return QuotientOutcome::Valid(generated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::MasterGroup;
    use crate::matrix::{Matrix, MatrixClosureConfig};
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn dihedral3() -> Rc<MasterGroup> {
        let theta = 2.0 * PI / 3.0;
        let rotation = Matrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(theta.cos(), 0.0),
                Complex64::new(-theta.sin(), 0.0),
                Complex64::new(theta.sin(), 0.0),
                Complex64::new(theta.cos(), 0.0),
            ],
        );
        let reflection = Matrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-1.0, 0.0),
            ],
        );
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        MasterGroup::generate(&[rotation, reflection], config).unwrap()
    }

    #[test]
    fn quotient_by_rotation_subgroup_finds_order_two_complement() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        let rotations = whole
            .all_normal_subgroups()
            .iter()
            .find(|g| g.order() == 3)
            .cloned()
            .expect("D3 has a normal subgroup of order 3");

        match classify_quotient(&whole, &rotations) {
            QuotientOutcome::Valid(complement) => assert_eq!(complement.order(), 2),
            QuotientOutcome::Invalid => panic!("expected a valid quotient complement"),
        }
    }

    #[test]
    fn quotient_by_whole_group_is_invalid() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        assert!(matches!(classify_quotient(&whole, &whole), QuotientOutcome::Invalid));
    }

    #[test]
    fn quotient_of_simple_group_is_invalid() {
        let theta = 2.0 * PI / 3.0;
        let generator = Matrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(theta.cos(), 0.0),
                Complex64::new(-theta.sin(), 0.0),
                Complex64::new(theta.sin(), 0.0),
                Complex64::new(theta.cos(), 0.0),
            ],
        );
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = MasterGroup::generate(&[generator], config).unwrap();
        let whole = master.whole_group().unwrap();
        let trivial = master.create_group(vec![0]).unwrap();
        assert!(matches!(classify_quotient(&whole, &trivial), QuotientOutcome::Invalid));
    }
}
