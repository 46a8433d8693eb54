//! Bottom-up tabulated subset-sum over the full signed goal range. Two rows
//! are enough: the row for index i only ever reads the row for index i + 1.
//! The iteration count is exactly the table area, whatever the input.

use crate::variant::SolveOutcome;

pub(crate) fn solve(values: &[i32]) -> SolveOutcome {
    let pos_sum: i64 = values.iter().filter(|&&v| v > 0).map(|&v| i64::from(v)).sum();
    let neg_sum: i64 = values.iter().filter(|&&v| v <= 0).map(|&v| i64::from(v)).sum();
    let offset = -neg_sum;
    let width = (pos_sum - neg_sum + 1) as usize;
    let n = values.len();

    // prev holds the row for index n: only the empty selection's zero.
    let mut prev = vec![false; width];
    let mut curr = vec![false; width];
    prev[offset as usize] = true;

    for i in (0..n).rev() {
        let v = i64::from(values[i]);
        for j in neg_sum..=pos_sum {
            let next_goal = j - v;
            let cell = if next_goal > pos_sum || next_goal < neg_sum {
                prev[(j + offset) as usize]
            } else {
                prev[(j + offset) as usize] || prev[(next_goal + offset) as usize]
            };
            curr[(j + offset) as usize] = cell;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let goal = (pos_sum + neg_sum) / 2;
    SolveOutcome {
        iterations: width as u64 * n as u64,
        partitionable: prev[(goal + offset) as usize],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_area_is_the_iteration_count() {
        // pos 6, neg 0: width 7, three elements.
        let outcome = solve(&[1, 2, 3]);
        assert_eq!(outcome.iterations, 21);
        assert!(outcome.partitionable);
    }

    #[test]
    fn rejects_unreachable_goal() {
        // pos 7, neg -1: width 9, three elements.
        let outcome = solve(&[5, -1, 2]);
        assert_eq!(outcome.iterations, 27);
        assert!(!outcome.partitionable);
    }

    #[test]
    fn mixed_sign_split() {
        assert!(solve(&[1, -2, 3, 4]).partitionable);
    }

    #[test]
    fn zero_sum_hits_the_base_cell() {
        // The empty selection already satisfies a zero goal.
        assert!(solve(&[1, -3, 2]).partitionable);
    }

    #[test]
    fn single_element() {
        let outcome = solve(&[4]);
        assert_eq!(outcome.iterations, 5);
        assert!(!outcome.partitionable);
    }
}
