//! Memoized subset-sum over element magnitudes, with pruning.
//!
//! Signing the magnitudes so they cancel is the same thing as picking the
//! subset that carries the plus sign, so the partition question becomes:
//! how many index subsets of the magnitude list reach half the magnitude
//! mass? Any such subset yields a split, except that a zero-total input owns
//! two one-sided sign assignments that have to be discounted.
//!
//! The prunes are exact, not speculative: an odd magnitude mass or a single
//! dominant magnitude settles the question outright, and a recursion branch
//! dies as soon as the remaining mass cannot reach its goal. Each pruning
//! scan charges one iteration per element it would have inspected.

use std::collections::HashMap;

use crate::variant::SolveOutcome;

struct Search {
    magnitudes: Vec<i64>,
    /// suffix_mass[i] = magnitudes[i..].sum(); one extra zero entry at the end.
    suffix_mass: Vec<i64>,
    memo: HashMap<(usize, i64), u64>,
    calls: u64,
    extra_iterations: u64,
}

pub(crate) fn solve(values: &[i32]) -> SolveOutcome {
    let magnitudes: Vec<i64> = values.iter().map(|&v| i64::from(v).abs()).collect();
    let abs_sum: i64 = magnitudes.iter().sum();
    let signed_sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let n = values.len() as u64;

    if abs_sum % 2 == 1 {
        return SolveOutcome {
            iterations: n,
            partitionable: false,
        };
    }
    let largest = magnitudes.iter().copied().max().unwrap_or(0);
    if largest > abs_sum / 2 {
        return SolveOutcome {
            iterations: 2 * n,
            partitionable: false,
        };
    }

    let mut suffix_mass = vec![0i64; magnitudes.len() + 1];
    for i in (0..magnitudes.len()).rev() {
        suffix_mass[i] = suffix_mass[i + 1] + magnitudes[i];
    }

    let mut search = Search {
        magnitudes,
        suffix_mass,
        memo: HashMap::new(),
        calls: 0,
        extra_iterations: 0,
    };
    let solutions = search.count(0, abs_sum / 2);
    let partitionable = if signed_sum == 0 {
        solutions > 2
    } else {
        solutions > 0
    };
    SolveOutcome {
        iterations: 2 * n + search.calls + search.extra_iterations,
        partitionable,
    }
}

impl Search {
    fn count(&mut self, index: usize, goal: i64) -> u64 {
        self.calls += 1;
        if goal == 0 {
            return 1;
        }
        if index >= self.magnitudes.len() {
            return 0;
        }

        let remaining = (self.magnitudes.len() - index) as u64;
        self.extra_iterations += remaining;
        if self.suffix_mass[index] < goal {
            return 0;
        }

        let with = if goal >= self.magnitudes[index] {
            let key = (index + 1, goal - self.magnitudes[index]);
            match self.memo.get(&key) {
                Some(&cached) => cached,
                None => self.count(key.0, key.1),
            }
        } else {
            0
        };
        let without = match self.memo.get(&(index + 1, goal)) {
            Some(&cached) => cached,
            None => self.count(index + 1, goal),
        };

        let total = with.saturating_add(without);
        self.memo.insert((index, goal), total);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_magnitude_mass_is_settled_immediately() {
        let outcome = solve(&[2, 1]);
        assert!(!outcome.partitionable);
        assert_eq!(outcome.iterations, 2);
    }

    #[test]
    fn dominant_magnitude_is_settled_immediately() {
        let outcome = solve(&[10, -1, 2, 1]);
        assert!(!outcome.partitionable);
        assert_eq!(outcome.iterations, 8);
    }

    #[test]
    fn counts_solutions_for_mixed_signs() {
        assert!(solve(&[1, -2, 3, 4]).partitionable);
        assert!(!solve(&[5, -1, 2]).partitionable);
    }

    #[test]
    fn zero_total_discounts_one_sided_assignments() {
        // Magnitudes {1, 3, 2} reach 3 only as {3} and {1, 2}, which are the
        // two sides of the input's own sign assignment.
        let outcome = solve(&[1, -3, 2]);
        assert!(!outcome.partitionable);
        assert_eq!(outcome.iterations, 23);
    }

    #[test]
    fn zero_total_with_a_genuine_split() {
        // {2, -2, 3, -3} splits as {2, -2} and {3, -3} as well.
        assert!(solve(&[2, -2, 3, -3]).partitionable);
    }
}
