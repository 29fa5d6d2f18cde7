//! A subgroup of a [`MasterGroup`], with every structural invariant memoized
//! on first access (spec.md §3/§4.4), ported from `application.calc.finitegroup.Group`.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use unchecked_unwrap::UncheckedUnwrap;

use crate::divisor::second_largest_divisor;
use crate::identifier::identify;
use crate::master::{upgrade, MasterGroup};
use crate::structure::{CartesianOutcome, QuotientOutcome};

/// A subgroup of a master group, represented as a sorted, deduplicated set
/// of element indices into the master's element list.
///
/// Every derived property — conjugacy data, center, derived series, the
/// normal-subgroup lattice, the simplicity/solvability/perfection flags,
/// and the isomorphism tag — is computed once and cached in a
/// [`OnceCell`], matching spec.md §5's write-once memoization model. The
/// handle back to the owning [`MasterGroup`] is a [`Weak`] reference so
/// that the subgroup cache held by the master does not form a reference
/// cycle with the subgroups it owns.
pub struct Subgroup {
    master: Weak<MasterGroup>,
    elements: Vec<usize>,
    name: RefCell<Option<String>>,

    conjugacy_classes: OnceCell<Vec<Vec<usize>>>,
    center: OnceCell<Rc<Subgroup>>,
    derived: OnceCell<Rc<Subgroup>>,
    derived_series: OnceCell<Vec<Rc<Subgroup>>>,
    all_normal_subgroups: OnceCell<Vec<Rc<Subgroup>>>,
    is_abelian: OnceCell<bool>,
    is_solvable: OnceCell<bool>,
    is_simple: OnceCell<bool>,
    isomorphism_tag: OnceCell<String>,
}

impl Subgroup {
    pub(crate) fn new(master: Weak<MasterGroup>, elements: Vec<usize>) -> Rc<Self> {
        Rc::new(Self {
            master,
            elements,
            name: RefCell::new(None),
            conjugacy_classes: OnceCell::new(),
            center: OnceCell::new(),
            derived: OnceCell::new(),
            derived_series: OnceCell::new(),
            all_normal_subgroups: OnceCell::new(),
            is_abelian: OnceCell::new(),
            is_solvable: OnceCell::new(),
            is_simple: OnceCell::new(),
            isomorphism_tag: OnceCell::new(),
        })
    }

    fn master(&self) -> Rc<MasterGroup> {
        upgrade(&self.master)
    }

    /// The owning master group, for use by sibling modules (such as
    /// [`crate::structure`]) that classify relationships between several
    /// subgroups of the same master.
    pub(crate) fn master_handle(&self) -> Rc<MasterGroup> {
        self.master()
    }

    /// The element indices belonging to this subgroup, sorted ascending.
    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    /// The subgroup's order.
    pub fn order(&self) -> usize {
        self.elements.len()
    }

    /// Whether `index` (into the master's element list) belongs to this
    /// subgroup.
    pub fn contains(&self, index: usize) -> bool {
        self.elements.binary_search(&index).is_ok()
    }

    /// A caller-assigned display name, if one has been set.
    pub fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }

    /// Sets this subgroup's display name, overwriting any previous one.
    pub fn rename(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = Some(name.into());
    }

    /// Whether `self`'s elements are a subset of `other`'s.
    pub fn is_subgroup_of(&self, other: &Subgroup) -> bool {
        self.elements.iter().all(|e| other.contains(*e))
    }

    /// Whether `self` is a normal subgroup of `other`: `self` is a subgroup
    /// of `other`, and conjugation by every element of `other` maps
    /// `self`'s elements back into `self`.
    pub fn is_normal_subgroup_of(&self, other: &Subgroup) -> bool {
        if !self.is_subgroup_of(other) {
            return false;
        }
        let master = self.master();
        other.elements.iter().all(|&g| {
            self.elements
                .iter()
                .all(|&h| self.contains(master.index_conjugate(h, g)))
        })
    }

    /// Partitions the subgroup's elements into conjugacy classes under
    /// conjugation by the subgroup's own elements.
    pub fn conjugacy_classes(&self) -> &[Vec<usize>] {
        self.conjugacy_classes.get_or_init(|| {
            let master = self.master();
            let mut seen = vec![false; master.order()];
            let mut classes = Vec::new();
            for &g in &self.elements {
                if seen[g] {
                    continue;
                }
                let mut class: Vec<usize> = self
                    .elements
                    .iter()
                    .map(|&h| master.index_conjugate(g, h))
                    .collect();
                class.sort_unstable();
                class.dedup();
                for &m in &class {
                    seen[m] = true;
                }
                classes.push(class);
            }
            classes.sort_by_key(|c| (master.index_order(c[0]), c.len()));
            classes
        })
    }

    /// `(element_order, class_size, multiplicity)` triples — one per
    /// distinct `(element_order, class_size)` pairing among this
    /// subgroup's conjugacy classes, with `multiplicity` counting how many
    /// classes share that pairing. This is the fingerprint the
    /// isomorphism identifier matches against its non-abelian catalogue.
    pub fn conjugacy_count(&self) -> Vec<(usize, usize, usize)> {
        let master = self.master();
        let mut labels: Vec<(usize, usize)> = self
            .conjugacy_classes()
            .iter()
            .map(|class| (master.index_order(class[0]), class.len()))
            .collect();
        labels.sort_unstable();

        let mut counts = Vec::new();
        let mut i = 0;
        while i < labels.len() {
            let mut j = i;
            while j < labels.len() && labels[j] == labels[i] {
                j += 1;
            }
            counts.push((labels[i].0, labels[i].1, j - i));
            i = j;
        }
        counts
    }

    /// The center: elements commuting with every element of the subgroup.
    pub fn center(&self) -> Rc<Subgroup> {
        Rc::clone(self.center.get_or_init(|| {
            let master = self.master();
            let central: Vec<usize> = self
                .elements
                .iter()
                .copied()
                .filter(|&g| {
                    self.elements
                        .iter()
                        .all(|&h| master.index_prod(g, h) == master.index_prod(h, g))
                })
                .collect();
            master
                .create_group(central)
                .expect("the center of a group is always closed")
        }))
    }

    /// The centralizer of this subgroup within the whole master group:
    /// master elements `g` commuting with every element of `self`.
    pub fn centralizer_in_master(&self) -> Rc<Subgroup> {
        let master = self.master();
        let elements: Vec<usize> = (0..master.order())
            .filter(|&g| {
                self.elements
                    .iter()
                    .all(|&h| master.index_prod(g, h) == master.index_prod(h, g))
            })
            .collect();
        master
            .create_group(elements)
            .expect("a centralizer is always closed")
    }

    /// The derived (commutator) subgroup: generated by every `[g, h]` for
    /// `g, h` in this subgroup.
    pub fn derived(&self) -> Rc<Subgroup> {
        Rc::clone(self.derived.get_or_init(|| {
            let master = self.master();
            let mut seed = Vec::new();
            for &g in &self.elements {
                for &h in &self.elements {
                    seed.push(master.index_commutator(g, h));
                }
            }
            master
                .generate_subgroup(&seed)
                .expect("a commutator-generated subgroup is always closed")
        }))
    }

    /// The derived series `G' ▷ G'' ▷ G''' ▷ ...`, starting from the first
    /// *derived* term (not `self`). Each computed term is appended once;
    /// the series stops the moment that term is already a fixed point
    /// (`derived(X) == X`, the perfect case) or is itself simple (a prime
    /// or trivial order, which makes any further derivation predictable
    /// without recomputing it).
    pub fn derived_series(&self) -> &[Rc<Subgroup>] {
        self.derived_series.get_or_init(|| {
            let mut series = Vec::new();
            let mut current = self.self_handle();
            loop {
                let next = current.derived();
                series.push(Rc::clone(&next));
                if next.elements == current.elements || next.is_simple() {
                    break;
                }
                current = next;
            }
            series
        })
    }

    fn self_handle(&self) -> Rc<Subgroup> {
        let master = self.master();
        // A Subgroup's own `elements` were already validated closed when it
        // was constructed; re-deriving the handle cannot fail.
        unsafe { master.create_group(self.elements.clone()).unchecked_unwrap() }
    }

    /// Whether this subgroup is abelian: its derived subgroup is trivial.
    pub fn is_abelian(&self) -> bool {
        *self.is_abelian.get_or_init(|| self.derived().order() == 1)
    }

    /// Whether this subgroup is perfect: it equals its own derived
    /// subgroup. The trivial group is perfect (its derived subgroup is
    /// itself).
    pub fn is_perfect(&self) -> bool {
        self.derived().order() == self.order()
    }

    /// Whether this subgroup is solvable: its derived series terminates in
    /// an abelian group (the trivial group, for most groups) rather than
    /// stalling at a non-trivial perfect non-abelian subgroup.
    pub fn is_solvable(&self) -> bool {
        *self
            .is_solvable
            .get_or_init(|| self.derived_series().last().map_or(true, |g| g.is_abelian()))
    }

    /// Every normal subgroup of `self`.
    ///
    /// Built from the conjugacy classes rather than by testing arbitrary
    /// subsets: a conjugacy class is conjugation-invariant by construction,
    /// so the subgroup it generates is automatically normal, and every
    /// proper non-trivial normal subgroup is a union of such closures
    /// (spec.md §4.4). The search is bounded by the second-largest soft
    /// divisor of `order` — a divisor equal to the full order only ever
    /// reconstructs `self`, already known without rediscovery.
    pub fn all_normal_subgroups(&self) -> &[Rc<Subgroup>] {
        self.all_normal_subgroups.get_or_init(|| {
            let master = self.master();
            let order = self.order();
            let trivial = master
                .create_group(vec![0])
                .expect("the trivial subgroup is always closed");
            let whole = self.self_handle();

            let mut found: Vec<Rc<Subgroup>> = vec![Rc::clone(&trivial)];
            if !Rc::ptr_eq(&trivial, &whole) {
                found.push(Rc::clone(&whole));
            }

            if order == 1 || is_prime(order) {
                found.sort_by_key(|g| std::cmp::Reverse(g.order()));
                return found;
            }

            let bound = second_largest_divisor(order).unwrap_or(1);
            let mut seeds: Vec<Rc<Subgroup>> = Vec::new();

            for class in self.conjugacy_classes() {
                if class.len() >= bound {
                    continue;
                }
                let closure = master
                    .generate_subgroup(class)
                    .expect("the closure of a conjugacy class is always closed");
                if !found.iter().any(|g| g.elements() == closure.elements()) {
                    found.push(Rc::clone(&closure));
                }
                if closure.order() > 1
                    && closure.order() < bound
                    && !seeds.iter().any(|g| g.elements() == closure.elements())
                {
                    seeds.push(closure);
                }
            }

            loop {
                let mut grown = Vec::new();
                for seed in &seeds {
                    for current in &found {
                        let seed_subset_of_current =
                            seed.elements().iter().all(|e| current.contains(*e));
                        let current_subset_of_seed =
                            current.elements().iter().all(|e| seed.contains(*e));
                        if seed_subset_of_current || current_subset_of_seed {
                            continue;
                        }
                        let mut union: Vec<usize> = seed
                            .elements()
                            .iter()
                            .chain(current.elements())
                            .copied()
                            .collect();
                        union.sort_unstable();
                        union.dedup();
                        let closure = master
                            .generate_subgroup(&union)
                            .expect("the closure of a union of normal subgroups is always closed");
                        if closure.order() == order {
                            continue;
                        }
                        if found.iter().any(|g| g.elements() == closure.elements())
                            || grown.iter().any(|g: &Rc<Subgroup>| g.elements() == closure.elements())
                        {
                            continue;
                        }
                        grown.push(closure);
                    }
                }
                if grown.is_empty() {
                    break;
                }
                found.extend(grown);
            }

            found.sort_by_key(|g| std::cmp::Reverse(g.order()));
            found
        })
    }

    /// Whether this subgroup is simple: has no normal subgroups besides
    /// the trivial group and itself. The trivial group counts as simple
    /// (its only normal subgroup is itself), matching spec.md's "order is
    /// prime (or 1)" rule for the abelian case.
    pub fn is_simple(&self) -> bool {
        *self.is_simple.get_or_init(|| {
            self.all_normal_subgroups()
                .iter()
                .all(|g| g.order() == 1 || g.order() == self.order())
        })
    }

    /// A canonical isomorphism tag: an abelian primary decomposition name
    /// for abelian groups, or a catalogue lookup by conjugacy fingerprint
    /// for non-abelian ones.
    pub fn isomorphism_tag(&self) -> &str {
        self.isomorphism_tag.get_or_init(|| identify(self))
    }

    /// Attempts to express `self` as (a candidate for) the direct or
    /// semidirect product of two of its normal subgroups, returning the
    /// classification the pair falls into.
    pub fn study_cartesian_product(&self, left: &Subgroup, right: &Subgroup) -> CartesianOutcome {
        crate::structure::classify_cartesian(self, left, right)
    }

    /// Attempts to express `self` as a quotient by a normal subgroup.
    pub fn study_quotient_decomposition(&self, normal: &Subgroup) -> QuotientOutcome {
        crate::structure::classify_quotient(self, normal)
    }

    /// Every unordered pair of normal subgroups `(H, K)` whose product
    /// reconstructs `self` as an internal direct product.
    pub fn direct_product(&self) -> Vec<(Rc<Subgroup>, Rc<Subgroup>)> {
        self.cartesian_pairs(CartesianOutcome::Direct)
    }

    /// Every unordered pair of normal/non-normal subgroups whose product
    /// reconstructs `self` as an internal semidirect product.
    pub fn semidirect_product(&self) -> Vec<(Rc<Subgroup>, Rc<Subgroup>)> {
        let mut pairs = self.cartesian_pairs(CartesianOutcome::LeftSemi);
        pairs.extend(self.cartesian_pairs(CartesianOutcome::RightSemi));
        pairs
    }

    fn cartesian_pairs(&self, wanted: CartesianOutcome) -> Vec<(Rc<Subgroup>, Rc<Subgroup>)> {
        let normals = self.all_normal_subgroups();
        let mut pairs = Vec::new();
        let mut seen_pairs: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();

        for h in normals {
            for k in normals {
                if Rc::ptr_eq(h, k) {
                    continue;
                }
                let key = if h.elements() <= k.elements() {
                    (h.elements().to_vec(), k.elements().to_vec())
                } else {
                    (k.elements().to_vec(), h.elements().to_vec())
                };
                if seen_pairs.contains(&key) {
                    continue;
                }
                let outcome = self.study_cartesian_product(h, k);
                if outcome == wanted {
                    seen_pairs.push(key);
                    pairs.push((Rc::clone(h), Rc::clone(k)));
                }
            }
        }
        pairs
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::MasterGroup;
    use crate::matrix::{Matrix, MatrixClosureConfig};
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

    fn dihedral3() -> Rc<MasterGroup> {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        MasterGroup::generate(&[rotation(2.0 * PI / 3.0), reflection()], config).unwrap()
    }

    #[test]
    fn d3_is_non_abelian_and_solvable_but_not_simple() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        assert!(!whole.is_abelian());
        assert!(whole.is_solvable());
        assert!(!whole.is_simple());
    }

    #[test]
    fn d3_conjugacy_count_matches_expected_fingerprint() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        let mut counts = whole.conjugacy_count();
        counts.sort_unstable();
        let mut expected = vec![(1, 1, 1), (2, 3, 1), (3, 2, 1)];
        expected.sort_unstable();
        assert_eq!(counts, expected);
    }

    #[test]
    fn d3_has_trivial_and_order_three_normal_subgroups() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        let mut orders: Vec<usize> = whole.all_normal_subgroups().iter().map(|g| g.order()).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 3, 6]);
    }

    #[test]
    fn cyclic_three_is_simple() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = MasterGroup::generate(&[rotation(2.0 * PI / 3.0)], config).unwrap();
        let whole = master.whole_group().unwrap();
        assert!(whole.is_simple());
        assert_eq!(whole.all_normal_subgroups().len(), 2);
    }

    #[test]
    fn isomorphism_tag_for_d3_is_d3() {
        let master = dihedral3();
        let whole = master.whole_group().unwrap();
        assert_eq!(whole.isomorphism_tag(), "D(3)");
    }

    #[test]
    fn isomorphism_tag_for_cyclic_three_is_z3() {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = MasterGroup::generate(&[rotation(2.0 * PI / 3.0)], config).unwrap();
        let whole = master.whole_group().unwrap();
        assert_eq!(whole.isomorphism_tag(), "Z(3)");
    }
}
