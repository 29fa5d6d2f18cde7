//! Isomorphism-tag identification (spec.md §4.6), ported from
//! `application.calc.finitegroup.Exam.dp_abelian` (abelian primary
//! decomposition) and `application.calc.finitegroup.Classifier` (the
//! non-abelian conjugacy-fingerprint catalogue).

use std::rc::Rc;

use crate::master::MasterGroup;
use crate::subgroup::Subgroup;

/// Identifies `group` by name: an abelian primary decomposition for
/// abelian groups, or a catalogue lookup by conjugacy fingerprint for
/// non-abelian ones. Falls back to an order-qualified placeholder when the
/// catalogue has no entry for a non-abelian group's order.
pub fn identify(group: &Subgroup) -> String {
    if group.order() == 1 {
        return "Id".to_string();
    }
    if group.is_abelian() {
        let master = group.master_handle();
        let whole = master
            .create_group(group.elements().to_vec())
            .expect("a subgroup's own element set is always closed");
        decompose_abelian(&master, whole)
    } else {
        identify_non_abelian(group).unwrap_or_else(|| format!("Unidentified({})", group.order()))
    }
}

/// Ascending prime factorization, as `(prime, exponent)` pairs.
fn prime_factorize(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut f = 2u64;
    while f * f <= n {
        if n % f == 0 {
            let mut exp = 0u32;
            while n % f == 0 {
                n /= f;
                exp += 1;
            }
            factors.push((f, exp));
        }
        f += if f == 2 { 1 } else { 2 };
    }
    if n != 1 {
        factors.push((n, 1));
    }
    factors
}

/// Finds a cyclic complement to `cyclic` within `group`: a subgroup whose
/// intersection with `cyclic` is trivial and whose order, multiplied by
/// `cyclic`'s, equals `group`'s. Built up generator-by-generator exactly as
/// `Exam.__for_abelian_decompose` does, since for a finite abelian group
/// this complement is guaranteed to exist but not computable in closed
/// form without search.
fn for_abelian_decompose(
    master: &Rc<MasterGroup>,
    group: &Subgroup,
    cyclic: &Subgroup,
) -> Option<Rc<Subgroup>> {
    let mut candidate: Vec<usize> = group
        .elements()
        .iter()
        .copied()
        .filter(|e| !cyclic.contains(*e))
        .collect();
    let mut gens: Vec<usize> = Vec::new();

    loop {
        if candidate.is_empty() {
            return None;
        }
        let mut generated: Option<Rc<Subgroup>> = None;
        let mut next_gens = gens.clone();
        for &index in &candidate.clone() {
            let mut trial = gens.clone();
            trial.push(index);
            let gen_group = master.generate_subgroup(&trial).ok()?;
            let intersection = gen_group
                .elements()
                .iter()
                .filter(|e| cyclic.contains(**e))
                .count();
            if intersection != 1 {
                candidate.retain(|c| *c != index);
            } else {
                next_gens = trial;
                generated = Some(gen_group);
                break;
            }
        }
        gens = next_gens;
        let generated = generated?;
        candidate.retain(|c| !generated.contains(*c));
        if group.order() == cyclic.order() * generated.order() {
            return Some(generated);
        }
    }
}

/// The two-step abelian primary decomposition: first split off a cyclic
/// factor generated by a maximal-order element until every remaining
/// factor's order equals its maximal element order, then split any
/// factor whose order has more than one prime divisor into its
/// prime-power parts. Every factor left at the end is cyclic of
/// prime-power order.
fn decompose_abelian(master: &Rc<MasterGroup>, start: Rc<Subgroup>) -> String {
    let mut remaining = vec![start];

    loop {
        let mut changed = false;
        let mut next_remaining = Vec::new();
        for g in remaining {
            let max_order = g
                .elements()
                .iter()
                .map(|&e| master.index_order(e))
                .max()
                .unwrap_or(1);
            if max_order == g.order() {
                next_remaining.push(g);
                continue;
            }
            changed = true;
            let gen_index = g
                .elements()
                .iter()
                .copied()
                .find(|&e| master.index_order(e) == max_order)
                .expect("the maximal element order occurs on some element");
            let cyclic = master
                .generate_subgroup(&[gen_index])
                .expect("a singleton-generated subgroup is always closed");
            let complement = for_abelian_decompose(master, &g, &cyclic)
                .expect("a finite abelian group always has a complement to any cyclic subgroup");
            next_remaining.push(cyclic);
            next_remaining.push(complement);
        }
        remaining = next_remaining;
        if !changed {
            break;
        }
    }

    loop {
        let mut changed = false;
        let mut next_remaining = Vec::new();
        for g in remaining {
            let factors = prime_factorize(g.order() as u64);
            if factors.len() <= 1 {
                next_remaining.push(g);
                continue;
            }
            changed = true;
            let (prime, max_power) = factors[0];
            let mut power = max_power;
            let mut gen_index = None;
            while power > 0 {
                let target_order = prime.pow(power) as usize;
                gen_index = g
                    .elements()
                    .iter()
                    .copied()
                    .find(|&e| master.index_order(e) == target_order);
                if gen_index.is_some() {
                    break;
                }
                power -= 1;
            }
            let gen_index = gen_index
                .expect("an abelian group of order p^k*m has an element of order p^j for some j");
            let cyclic = master
                .generate_subgroup(&[gen_index])
                .expect("a singleton-generated subgroup is always closed");
            let complement = for_abelian_decompose(master, &g, &cyclic)
                .expect("a finite abelian group always has a complement to any cyclic subgroup");
            next_remaining.push(cyclic);
            next_remaining.push(complement);
        }
        remaining = next_remaining;
        if !changed {
            break;
        }
    }

    remaining.sort_by_key(|g| std::cmp::Reverse(g.order()));
    remaining
        .iter()
        .map(|g| format!("Z({})", g.order()))
        .collect::<Vec<_>>()
        .join(" x ")
}

/// A single catalogue entry: a conjugacy fingerprint and the name it
/// identifies.
type Fingerprint = &'static [(usize, usize, usize)];

/// The non-abelian catalogue, keyed by group order, ported verbatim from
/// `Classifier.conj_dict`. Each fingerprint is a set of
/// `(element_order, class_size, multiplicity)` triples; a group matches an
/// entry when its own [`Subgroup::conjugacy_count`] is the same *set* of
/// triples (order within the list does not matter, mirroring the
/// original's `set(c_count) == set(target_c_count)` comparison).
fn catalogue(order: usize) -> &'static [(Fingerprint, &'static str)] {
    match order {
        6 => &[(&[(1, 1, 1), (2, 3, 1), (3, 2, 1)], "D(3)")],
        8 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 2, 2), (4, 2, 1)], "D(4)"),
            (&[(1, 1, 1), (2, 1, 1), (4, 2, 3)], "Q(4)"),
        ],
        10 => &[(&[(1, 1, 1), (2, 5, 1), (5, 2, 2)], "D(5)")],
        12 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 3, 2), (3, 2, 1), (6, 2, 1)], "D(6)"),
            (&[(1, 1, 1), (2, 1, 1), (3, 2, 1), (4, 3, 2), (6, 2, 1)], "Q(6)"),
            (&[(1, 1, 1), (2, 3, 1), (3, 4, 2)], "A(4)"),
        ],
        14 => &[(&[(1, 1, 1), (2, 7, 1), (7, 2, 3)], "D(7)")],
        16 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 4, 2), (4, 2, 1), (8, 2, 2)], "D(8)"),
            (&[(1, 1, 1), (2, 1, 1), (4, 2, 1), (4, 4, 2), (8, 2, 2)], "Q(8)"),
            (
                &[(1, 1, 1), (2, 1, 1), (2, 4, 1), (4, 2, 1), (4, 4, 1), (8, 2, 2)],
                "QD(16)",
            ),
        ],
        18 => &[
            (&[(1, 1, 1), (2, 9, 1), (3, 2, 1), (9, 2, 3)], "D(9)"),
            (
                &[(1, 1, 1), (2, 3, 1), (3, 1, 2), (3, 2, 3), (6, 3, 2)],
                "Sigma(18)",
            ),
        ],
        20 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 5, 2), (5, 2, 2), (10, 2, 2)], "D(10)"),
            (&[(1, 1, 1), (2, 1, 1), (4, 5, 2), (5, 2, 2), (10, 2, 2)], "Q(10)"),
        ],
        21 => &[(&[(1, 1, 1), (3, 7, 2), (7, 3, 2)], "T(7)")],
        22 => &[(&[(1, 1, 1), (2, 11, 1), (11, 2, 5)], "D(11)")],
        24 => &[
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 6, 2),
                    (3, 2, 1),
                    (4, 2, 1),
                    (6, 2, 1),
                    (12, 2, 2),
                ],
                "D(12)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (3, 2, 1),
                    (4, 2, 1),
                    (4, 6, 2),
                    (6, 2, 1),
                    (12, 2, 2),
                ],
                "Q(12)",
            ),
            (
                &[(1, 1, 1), (2, 3, 1), (2, 6, 1), (3, 8, 1), (4, 6, 1)],
                "S(4)",
            ),
            (
                &[(1, 1, 1), (2, 1, 1), (3, 4, 2), (4, 6, 1), (6, 4, 2)],
                "Tprime",
            ),
            (
                &[(1, 1, 1), (2, 1, 1), (2, 3, 2), (3, 4, 2), (6, 4, 2)],
                "Sigma(24)",
            ),
        ],
        26 => &[(&[(1, 1, 1), (2, 13, 1), (13, 2, 6)], "D(13)")],
        27 => &[(&[(1, 1, 1), (3, 1, 2), (3, 3, 8)], "Delta(27)")],
        28 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 7, 2), (7, 2, 3), (14, 2, 3)], "D(14)"),
            (&[(1, 1, 1), (2, 1, 1), (4, 7, 2), (7, 2, 3), (14, 2, 3)], "Q(14)"),
        ],
        30 => &[(
            &[(1, 1, 1), (2, 15, 1), (3, 2, 1), (5, 2, 2), (15, 2, 4)],
            "D(15)",
        )],
        32 => &[
            (
                &[(1, 1, 1), (2, 1, 1), (2, 8, 2), (4, 2, 1), (8, 2, 2), (16, 2, 4)],
                "D(16)",
            ),
            (
                &[(1, 1, 1), (2, 1, 1), (4, 2, 1), (4, 8, 2), (8, 2, 2), (16, 2, 4)],
                "Q(16)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 8, 1),
                    (4, 2, 1),
                    (4, 8, 1),
                    (8, 2, 2),
                    (16, 2, 4),
                ],
                "QD(32)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 2, 1),
                    (2, 4, 1),
                    (4, 1, 2),
                    (4, 2, 5),
                    (4, 4, 1),
                    (8, 4, 2),
                ],
                "Sigma(32)",
            ),
        ],
        34 => &[(&[(1, 1, 1), (2, 17, 1), (17, 2, 8)], "D(17)")],
        36 => &[
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 9, 2),
                    (3, 2, 1),
                    (6, 2, 1),
                    (9, 2, 3),
                    (18, 2, 3),
                ],
                "D(18)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (3, 2, 1),
                    (4, 9, 2),
                    (6, 2, 1),
                    (9, 2, 3),
                    (18, 2, 3),
                ],
                "Q(18)",
            ),
        ],
        38 => &[(&[(1, 1, 1), (2, 19, 1), (19, 2, 9)], "D(19)")],
        39 => &[(&[(1, 1, 1), (3, 13, 2), (13, 3, 4)], "T(13)")],
        40 => &[
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 10, 2),
                    (4, 2, 1),
                    (5, 2, 2),
                    (10, 2, 2),
                    (20, 2, 4),
                ],
                "D(20)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (4, 2, 1),
                    (4, 10, 2),
                    (5, 2, 2),
                    (10, 2, 2),
                    (20, 2, 4),
                ],
                "Q(20)",
            ),
        ],
        42 => &[(
            &[(1, 1, 1), (2, 21, 1), (3, 2, 1), (7, 2, 3), (21, 2, 6)],
            "D(21)",
        )],
        44 => &[
            (&[(1, 1, 1), (2, 1, 1), (2, 11, 2), (11, 2, 5), (22, 2, 5)], "D(22)"),
            (&[(1, 1, 1), (2, 1, 1), (4, 11, 2), (11, 2, 5), (22, 2, 5)], "Q(22)"),
        ],
        46 => &[(&[(1, 1, 1), (2, 23, 1), (23, 2, 11)], "D(23)")],
        48 => &[
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 12, 2),
                    (3, 2, 1),
                    (4, 2, 1),
                    (6, 2, 1),
                    (8, 2, 2),
                    (12, 2, 2),
                    (24, 2, 4),
                ],
                "D(24)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (3, 2, 1),
                    (4, 2, 1),
                    (4, 12, 2),
                    (6, 2, 1),
                    (8, 2, 2),
                    (12, 2, 2),
                    (24, 2, 4),
                ],
                "Q(24)",
            ),
            (
                &[(1, 1, 1), (2, 3, 1), (3, 16, 2), (4, 3, 4)],
                "Delta(48)",
            ),
        ],
        50 => &[(
            &[(1, 1, 1), (2, 5, 1), (5, 1, 4), (5, 2, 10), (10, 5, 4)],
            "Sigma(50)",
        )],
        54 => &[(
            &[(1, 1, 1), (2, 9, 1), (3, 1, 2), (3, 6, 4), (6, 9, 2)],
            "Delta(54)",
        )],
        57 => &[(&[(1, 1, 1), (3, 19, 2), (19, 3, 6)], "T(19)")],
        60 => &[(
            &[(1, 1, 1), (2, 15, 1), (3, 20, 1), (5, 12, 2)],
            "A(5)",
        )],
        64 => &[(
            &[
                (1, 1, 1),
                (2, 1, 1),
                (2, 16, 1),
                (4, 2, 1),
                (4, 16, 1),
                (8, 2, 2),
                (16, 2, 4),
                (32, 2, 8),
            ],
            "QD(64)",
        )],
        72 => &[(
            &[
                (1, 1, 1),
                (2, 1, 1),
                (2, 2, 1),
                (2, 6, 1),
                (3, 1, 2),
                (3, 2, 3),
                (4, 6, 1),
                (6, 1, 2),
                (6, 2, 11),
                (6, 6, 2),
                (12, 6, 2),
            ],
            "Sigma(72)",
        )],
        75 => &[(&[(1, 1, 1), (3, 25, 2), (5, 3, 8)], "Delta(75)")],
        81 => &[(
            &[(1, 1, 1), (3, 1, 2), (3, 3, 8), (3, 9, 2), (9, 9, 4)],
            "Sigma(81)",
        )],
        96 => &[(
            &[
                (1, 1, 1),
                (2, 3, 1),
                (2, 12, 1),
                (3, 32, 1),
                (4, 3, 2),
                (4, 6, 1),
                (4, 12, 1),
                (8, 12, 2),
            ],
            "Delta(96)",
        )],
        98 => &[(
            &[(1, 1, 1), (2, 7, 1), (7, 1, 6), (7, 2, 21), (14, 7, 6)],
            "Sigma(98)",
        )],
        108 => &[(
            &[
                (1, 1, 1),
                (2, 3, 1),
                (3, 1, 2),
                (3, 3, 2),
                (3, 12, 6),
                (6, 3, 8),
            ],
            "Delta(108)",
        )],
        120 => &[(
            &[
                (1, 1, 1),
                (2, 10, 1),
                (2, 15, 1),
                (3, 20, 1),
                (4, 30, 1),
                (5, 24, 1),
                (6, 20, 1),
            ],
            "S(5)",
        )],
        128 => &[
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 32, 1),
                    (4, 2, 1),
                    (4, 32, 1),
                    (8, 2, 2),
                    (16, 2, 4),
                    (32, 2, 8),
                    (64, 2, 16),
                ],
                "QD(128)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 2, 1),
                    (2, 8, 1),
                    (4, 1, 2),
                    (4, 2, 5),
                    (4, 8, 1),
                    (8, 1, 4),
                    (8, 2, 22),
                    (8, 8, 2),
                    (16, 8, 4),
                ],
                "Sigma(128)",
            ),
        ],
        147 => &[(&[(1, 1, 1), (3, 49, 2), (7, 3, 16)], "Delta(147)")],
        150 => &[(
            &[
                (1, 1, 1),
                (2, 15, 1),
                (3, 50, 1),
                (5, 3, 4),
                (5, 6, 2),
                (10, 15, 4),
            ],
            "Delta(150)",
        )],
        162 => &[(
            &[
                (1, 1, 1),
                (2, 9, 1),
                (3, 1, 2),
                (3, 2, 3),
                (6, 9, 2),
                (9, 1, 6),
                (9, 2, 33),
                (18, 9, 6),
            ],
            "Sigma(162)",
        )],
        192 => &[
            (
                &[(1, 1, 1), (2, 3, 1), (3, 64, 2), (4, 3, 4), (8, 3, 16)],
                "Delta(192)",
            ),
            (
                &[
                    (1, 1, 1),
                    (2, 1, 1),
                    (2, 3, 2),
                    (3, 16, 2),
                    (4, 1, 2),
                    (4, 3, 18),
                    (6, 16, 2),
                    (12, 16, 4),
                ],
                "Sigma(192)",
            ),
        ],
        200 => &[(
            &[
                (1, 1, 1),
                (2, 1, 1),
                (2, 2, 1),
                (2, 10, 1),
                (4, 10, 1),
                (5, 1, 4),
                (5, 2, 10),
                (10, 1, 4),
                (10, 2, 34),
                (10, 10, 4),
                (20, 10, 4),
            ],
            "Sigma(200)",
        )],
        216 => &[(
            &[
                (1, 1, 1),
                (2, 3, 1),
                (2, 18, 1),
                (3, 1, 2),
                (3, 6, 1),
                (3, 24, 3),
                (4, 18, 1),
                (6, 3, 2),
                (6, 6, 3),
                (6, 18, 2),
                (12, 18, 2),
            ],
            "Delta(216)",
        )],
        256 => &[(
            &[
                (1, 1, 1),
                (2, 1, 1),
                (2, 64, 1),
                (4, 2, 1),
                (4, 64, 1),
                (8, 2, 2),
                (16, 2, 4),
                (32, 2, 8),
                (64, 2, 16),
                (128, 2, 32),
            ],
            "QD(256)",
        )],
        360 => &[(
            &[(1, 1, 1), (2, 45, 1), (3, 40, 2), (4, 90, 1), (5, 72, 2)],
            "A(6)",
        )],
        720 => &[(
            &[
                (1, 1, 1),
                (2, 15, 2),
                (2, 45, 1),
                (3, 40, 2),
                (4, 90, 2),
                (5, 144, 1),
                (6, 120, 2),
            ],
            "S(6)",
        )],
        _ => &[],
    }
}

/// Identifies a non-abelian group by its conjugacy fingerprint, matching
/// `Classifier.identify_non_abelian`: the comparison is between the *sets*
/// of `(element_order, class_size, multiplicity)` triples, not ordered
/// sequences, since two presentations of an isomorphic group can enumerate
/// their conjugacy classes in different orders.
fn identify_non_abelian(group: &Subgroup) -> Option<String> {
    let entries = catalogue(group.order());
    if entries.is_empty() {
        return None;
    }
    let observed: std::collections::HashSet<(usize, usize, usize)> =
        group.conjugacy_count().into_iter().collect();
    for (fingerprint, name) in entries {
        let target: std::collections::HashSet<(usize, usize, usize)> =
            fingerprint.iter().copied().collect();
        if observed == target {
            return Some((*name).to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Matrix, MatrixClosureConfig};
    use gcd::Gcd;
    use num_complex::Complex64;

    /// A single `e^{2pi*i*k/n}` scalar generates the cyclic group of order
    /// `n` exactly when `k` and `n` are coprime; otherwise it generates a
    /// proper divisor of `n`. Mirrors the teacher's own `i2()` test, which
    /// filters `(n, d)` pairs the same way before building a symmetry group.
    #[test]
    fn coprime_scalar_generator_yields_cyclic_group_of_full_order() {
        for n in 2..=8usize {
            for k in 1..n {
                if (k as u64).gcd(n as u64) != 1 {
                    continue;
                }
                let angle = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                let generator = Matrix::from_row_slice(1, 1, &[Complex64::from_polar(1.0, angle)]);
                let config = MatrixClosureConfig::new(1e-6, 1_000).unwrap();
                let master = MasterGroup::generate(&[generator], config).unwrap();
                let whole = master.whole_group().unwrap();
                assert_eq!(whole.order(), n, "k={k}, n={n}");

                let mut factors = prime_factorize(n as u64);
                factors.sort_by_key(|&(p, e)| std::cmp::Reverse(p.pow(e)));
                let expected = factors
                    .iter()
                    .map(|&(p, e)| format!("Z({})", p.pow(e)))
                    .collect::<Vec<_>>()
                    .join(" x ");
                assert_eq!(whole.isomorphism_tag(), expected, "k={k}, n={n}");
            }
        }
    }

    #[test]
    fn prime_factorize_handles_prime_powers() {
        assert_eq!(prime_factorize(8), vec![(2, 3)]);
        assert_eq!(prime_factorize(12), vec![(2, 2), (3, 1)]);
        assert_eq!(prime_factorize(17), vec![(17, 1)]);
    }

    #[test]
    fn catalogue_has_dihedral_three_entry() {
        let entries = catalogue(6);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, "D(3)");
    }

    #[test]
    fn catalogue_is_empty_for_unlisted_order() {
        assert!(catalogue(11).is_empty());
    }
}
