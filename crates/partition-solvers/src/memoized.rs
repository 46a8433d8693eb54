//! Top-down memoized signed subset-sum. Same recursion as the plain solver
//! with a result cache bolted on; the cache size at completion doubles as the
//! iteration count, since every productive call leaves exactly one entry.

use std::collections::HashMap;

use crate::variant::SolveOutcome;

struct Search<'a> {
    values: &'a [i32],
    pos_sum: i64,
    neg_sum: i64,
    memo: HashMap<(usize, i64), bool>,
}

pub(crate) fn solve(values: &[i32]) -> SolveOutcome {
    let pos_sum: i64 = values.iter().filter(|&&v| v > 0).map(|&v| i64::from(v)).sum();
    let neg_sum: i64 = values.iter().filter(|&&v| v <= 0).map(|&v| i64::from(v)).sum();
    let total = pos_sum + neg_sum;

    let mut search = Search {
        values,
        pos_sum,
        neg_sum,
        memo: HashMap::new(),
    };
    let partitionable = search.subset_sum(0, total / 2);
    SolveOutcome {
        iterations: search.memo.len() as u64,
        partitionable,
    }
}

impl Search<'_> {
    fn subset_sum(&mut self, index: usize, goal: i64) -> bool {
        if goal == 0 {
            return true;
        }
        if index >= self.values.len() {
            return false;
        }

        let next = goal - i64::from(self.values[index]);
        // Goals outside the open pos/neg range are unreachable.
        if next < self.pos_sum && next > self.neg_sum {
            let take = match self.memo.get(&(index + 1, next)) {
                Some(&cached) => cached,
                None => self.subset_sum(index + 1, next),
            };
            if take {
                self.memo.insert((index, goal), true);
                return true;
            }
        }

        let skip = match self.memo.get(&(index + 1, goal)) {
            Some(&cached) => cached,
            None => self.subset_sum(index + 1, goal),
        };
        self.memo.insert((index, goal), skip);
        skip
    }
}
