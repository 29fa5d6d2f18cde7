//! Soft-divisor helpers (spec.md §4.3), ported from `calctools.calc_divisor`.

use std::collections::HashMap;

/// All divisors of `n` (including `1` and `n` itself), descending.
///
/// `n == 0` returns an empty list; there is no meaningful divisor set for it
/// and callers never ask for the divisors of a group order of zero.
pub fn divisors_of(n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1usize;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            let other = n / d;
            if other != d {
                large.push(other);
            }
        }
        d += 1;
    }
    large.reverse();
    small.extend(large);
    small.sort_unstable_by(|a, b| b.cmp(a));
    small
}

/// The second-largest divisor of `n`, i.e. the largest proper divisor.
///
/// Used as the frontier bound in `Subgroup::all_normal_subgroups`
/// (spec.md §4.4): a soft closure bound of `n` itself admits the whole
/// group trivially, so the search is capped one divisor down.
pub fn second_largest_divisor(n: usize) -> Option<usize> {
    divisors_of(n).get(1).copied()
}

/// Builds a map from every divisor `d` of `order` to the list of divisors
/// of `d` itself, mirroring `MasterGroup._calc_divisor_dict` in the
/// original implementation, where repeated divisor lookups during subgroup
/// enumeration are served from a precomputed table instead of being
/// recomputed per call.
pub fn divisor_dict(order: usize) -> HashMap<usize, Vec<usize>> {
    divisors_of(order)
        .into_iter()
        .map(|d| (d, divisors_of(d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisors_of_twelve() {
        let mut got = divisors_of(12);
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3, 4, 6, 12]);
    }

    #[test]
    fn divisors_of_prime() {
        let mut got = divisors_of(7);
        got.sort_unstable();
        assert_eq!(got, vec![1, 7]);
    }

    #[test]
    fn second_largest_of_prime_is_one() {
        assert_eq!(second_largest_divisor(7), Some(1));
    }

    #[test]
    fn second_largest_of_twelve_is_six() {
        assert_eq!(second_largest_divisor(12), Some(6));
    }

    #[test]
    fn divisor_dict_contains_self_entry() {
        let dict = divisor_dict(6);
        let mut six = dict[&6].clone();
        six.sort_unstable();
        assert_eq!(six, vec![1, 2, 3, 6]);
    }
}
