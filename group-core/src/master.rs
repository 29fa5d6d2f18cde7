//! The master group: the full closure together with its derived index
//! tables (spec.md §3/§4.3), ported from `application.calc.mastergroup`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use rayon::prelude::*;

use crate::cayley::{build_cayley_table, CayleyTable};
use crate::divisor::divisor_dict;
use crate::error::{Error, Result};
use crate::matrix::{generate_group, Matrix, MatrixClosureConfig};
use crate::subgroup::Subgroup;

/// The full group closure, indexed 0..order with element 0 the identity,
/// together with every index-level table the rest of the engine builds on.
///
/// Owned behind an `Rc` so that [`Subgroup`] instances can hold a
/// non-owning [`Weak`] handle back to it instead of a strong reference,
/// which would otherwise form a reference cycle with the subgroup cache
/// held here.
pub struct MasterGroup {
    elements: Vec<Matrix>,
    cayley: CayleyTable,
    inverse: Vec<usize>,
    element_order: Vec<usize>,
    divisors: HashMap<usize, Vec<usize>>,
    tolerance: f64,
    subgroup_cache: RefCell<HashMap<Vec<usize>, Rc<Subgroup>>>,
    named_groups: RefCell<HashMap<String, Rc<Subgroup>>>,
}

impl MasterGroup {
    /// Builds a master group from already-closed elements (element 0 must
    /// be the identity) together with its Cayley table.
    fn from_parts(elements: Vec<Matrix>, cayley: CayleyTable, tolerance: f64) -> Rc<Self> {
        let order = elements.len();
        let inverse = Self::build_inverse_table(&cayley);
        let element_order = Self::build_order_table(&cayley, &inverse);
        let divisors = divisor_dict(order);

        Rc::new(Self {
            elements,
            cayley,
            inverse,
            element_order,
            divisors,
            tolerance,
            subgroup_cache: RefCell::new(HashMap::new()),
            named_groups: RefCell::new(HashMap::new()),
        })
    }

    /// Generates the group closure from matrix generators and builds every
    /// derived table, mirroring `MasterGroup.__init__` in the original.
    pub fn generate(generators: &[Matrix], config: MatrixClosureConfig) -> Result<Rc<Self>> {
        let closure = generate_group(generators, config)?;
        let elements = closure.into_elements();
        let cayley = build_cayley_table(&elements, config.tolerance)?;
        Ok(Self::from_parts(elements, cayley, config.tolerance))
    }

    fn build_inverse_table(cayley: &CayleyTable) -> Vec<usize> {
        (0..cayley.order())
            .into_par_iter()
            .map(|a| {
                (0..cayley.order())
                    .find(|&b| cayley.prod(a, b) == 0)
                    .expect("every element has an inverse in a closed table")
            })
            .collect()
    }

    fn build_order_table(cayley: &CayleyTable, inverse: &[usize]) -> Vec<usize> {
        let _ = inverse;
        (0..cayley.order())
            .into_par_iter()
            .map(|a| {
                let mut current = a;
                let mut k = 1usize;
                while current != 0 {
                    current = cayley.prod(current, a);
                    k += 1;
                }
                k
            })
            .collect()
    }

    /// Number of elements in the group.
    pub fn order(&self) -> usize {
        self.elements.len()
    }

    /// The tolerance this master group was built with; reused by every
    /// operation that needs to re-test matrix equality against it.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The underlying matrix representatives, identity first.
    pub fn elements(&self) -> &[Matrix] {
        &self.elements
    }

    /// `a · b`, by index.
    pub fn index_prod(&self, a: usize, b: usize) -> usize {
        self.cayley.prod(a, b)
    }

    /// `a⁻¹`, by index.
    pub fn index_inverse(&self, a: usize) -> usize {
        self.inverse[a]
    }

    /// `h · g · h⁻¹`, by index.
    pub fn index_conjugate(&self, g: usize, h: usize) -> usize {
        self.index_prod(self.index_prod(h, g), self.inverse[h])
    }

    /// `[g, h] = g·h·g⁻¹·h⁻¹`, by index.
    pub fn index_commutator(&self, g: usize, h: usize) -> usize {
        let gh = self.index_prod(g, h);
        let gh_ginv = self.index_prod(gh, self.inverse[g]);
        self.index_prod(gh_ginv, self.inverse[h])
    }

    /// The multiplicative order of element `a`.
    pub fn index_order(&self, a: usize) -> usize {
        self.element_order[a]
    }

    /// Divisors of `self.order()`, descending.
    pub fn divisor_of_order(&self) -> &[usize] {
        &self.divisors[&self.order()]
    }

    /// Divisors of `d`, where `d` itself divides `self.order()`.
    pub fn divisor_of(&self, d: usize) -> Option<&[usize]> {
        self.divisors.get(&d).map(Vec::as_slice)
    }

    /// Checks whether `candidate`, taken as a set of element indices, is
    /// closed under the master group's product: for every pair `a, b` in
    /// `candidate`, `a · b` is also in `candidate`.
    pub fn is_closed(&self, candidate: &[usize]) -> bool {
        let set: std::collections::HashSet<usize> = candidate.iter().copied().collect();
        candidate.iter().all(|&a| {
            candidate
                .iter()
                .all(|&b| set.contains(&self.cayley.prod(a, b)))
        })
    }

    /// Checks closure and returns an error naming the first failing pair
    /// rather than a bare boolean; used where the caller wants to report
    /// why a candidate subgroup failed.
    pub fn close(&self, candidate: &[usize]) -> Result<()> {
        let set: std::collections::HashSet<usize> = candidate.iter().copied().collect();
        for &a in candidate {
            for &b in candidate {
                let product = self.cayley.prod(a, b);
                if !set.contains(&product) {
                    return Err(Error::NotClosed { a, b });
                }
            }
        }
        Ok(())
    }

    /// Builds (or fetches a cached) [`Subgroup`] for the given element-index
    /// set, sorted and deduplicated before use as the cache key so that two
    /// equal-as-sets candidates always resolve to the same cached handle.
    pub fn create_group(self: &Rc<Self>, mut elements: Vec<usize>) -> Result<Rc<Subgroup>> {
        elements.sort_unstable();
        elements.dedup();
        if !self.is_closed(&elements) {
            let err = self.close(&elements).unwrap_err();
            return Err(err);
        }
        if let Some(cached) = self.subgroup_cache.borrow().get(&elements) {
            return Ok(Rc::clone(cached));
        }
        let subgroup = Subgroup::new(Rc::downgrade(self), elements.clone());
        self.subgroup_cache
            .borrow_mut()
            .insert(elements, Rc::clone(&subgroup));
        Ok(subgroup)
    }

    /// The subgroup generated by `seed` under the master group's product:
    /// the smallest closed set of indices containing `seed`.
    pub fn generate_subgroup(self: &Rc<Self>, seed: &[usize]) -> Result<Rc<Subgroup>> {
        let mut elements: Vec<usize> = seed.to_vec();
        elements.push(0);
        elements.sort_unstable();
        elements.dedup();

        loop {
            let mut grown = elements.clone();
            for &a in &elements {
                for &b in &elements {
                    let product = self.cayley.prod(a, b);
                    if !grown.contains(&product) {
                        grown.push(product);
                    }
                }
            }
            grown.sort_unstable();
            grown.dedup();
            if grown == elements {
                break;
            }
            elements = grown;
        }

        self.create_group(elements)
    }

    /// The whole master group, as a [`Subgroup`] over every index.
    pub fn whole_group(self: &Rc<Self>) -> Result<Rc<Subgroup>> {
        self.create_group((0..self.order()).collect())
    }

    /// Registers `group` under `name`, for later retrieval with
    /// [`MasterGroup::name_to_group`].
    pub fn register_name(&self, name: impl Into<String>, group: Rc<Subgroup>) {
        self.named_groups.borrow_mut().insert(name.into(), group);
    }

    /// Looks up a previously registered named group.
    pub fn name_to_group(&self, name: &str) -> Result<Rc<Subgroup>> {
        self.named_groups
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownGroup(name.to_string()))
    }

    /// Every currently registered named group.
    pub fn all_groups(&self) -> Vec<(String, Rc<Subgroup>)> {
        self.named_groups
            .borrow()
            .iter()
            .map(|(name, group)| (name.clone(), Rc::clone(group)))
            .collect()
    }
}

/// Upgrades a [`Weak<MasterGroup>`] under the invariant that a live
/// [`Subgroup`] always outlives its master — the cache in [`MasterGroup`]
/// holds the only strong references to subgroups and never outlives the
/// master itself.
pub(crate) fn upgrade(master: &Weak<MasterGroup>) -> Rc<MasterGroup> {
    master
        .upgrade()
        .expect("a live Subgroup's MasterGroup has been dropped")
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
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

    fn dihedral3(config: MatrixClosureConfig) -> Rc<MasterGroup> {
        MasterGroup::generate(&[rotation(2.0 * PI / 3.0), reflection()], config).unwrap()
    }

    #[test]
    fn identity_is_index_zero() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = dihedral3(config);
        for a in 0..master.order() {
            assert_eq!(master.index_prod(0, a), a);
            assert_eq!(master.index_prod(a, 0), a);
        }
    }

    #[test]
    fn inverse_table_round_trips() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = dihedral3(config);
        for a in 0..master.order() {
            assert_eq!(master.index_prod(a, master.index_inverse(a)), 0);
            assert_eq!(master.index_prod(master.index_inverse(a), a), 0);
        }
    }

    #[test]
    fn element_orders_divide_group_order() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = dihedral3(config);
        for a in 0..master.order() {
            assert_eq!(master.order() % master.index_order(a), 0);
        }
    }

    #[test]
    fn whole_group_is_closed_and_cached() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = dihedral3(config);
        let whole_a = master.whole_group().unwrap();
        let whole_b = master.whole_group().unwrap();
        assert!(Rc::ptr_eq(&whole_a, &whole_b));
    }

    #[test]
    fn non_closed_candidate_is_rejected() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = dihedral3(config);
        assert!(master.create_group(vec![0, 1]).is_err());
    }
}
