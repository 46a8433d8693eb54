//! Level-target computation: the achievable range of magnitude sums for a
//! set size, cut into 5 % steps.

use serde::{Deserialize, Serialize};

/// Largest magnitude any element may carry.
pub const MAGNITUDE_CAP: i64 = i16::MAX as i64;

/// Targets run from 0 % to 100 % of the achievable range in 5 % steps.
pub const LEVEL_COUNT: usize = 21;

/// The 21 magnitude-sum targets for one set size, with the tolerance a
/// generated set may deviate by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTargets {
    pub set_size: usize,
    /// Non-decreasing; index 0 is the smallest achievable magnitude sum,
    /// index 20 the largest.
    pub sum_targets: Vec<i64>,
    /// Maximum allowed distance between a generated set's magnitude sum and
    /// its level target (a fifth of one 5 % step).
    pub tolerance: i64,
    /// Tolerance spread over the elements; seeds the generator's deviation.
    pub per_element_bound: i64,
}

impl LevelTargets {
    /// Pure function of the set size; `set_size` must be at least 1.
    ///
    /// Each magnitude below the cap can appear twice in a set (as +m and -m),
    /// so the extreme sets advance their next magnitude only every other
    /// position. Walking both extremes in one pass gives the two end targets;
    /// the rest interpolate linearly with cumulative rounding.
    pub fn compute(set_size: usize) -> Self {
        assert!(set_size >= 1, "set size must be at least 1");

        let mut smallest: i64 = 0;
        let mut biggest: i64 = MAGNITUDE_CAP;
        let mut small_bound: i64 = 0;
        let mut big_bound: i64 = 0;
        let mut advance_small = true;
        for _ in 0..set_size {
            small_bound += smallest;
            big_bound += biggest;
            if advance_small {
                smallest += 1;
            } else {
                biggest -= 1;
            }
            advance_small = !advance_small;
        }

        let step = (big_bound - small_bound) as f64 / 20.0;
        let mut sum_targets = Vec::with_capacity(LEVEL_COUNT);
        sum_targets.push(small_bound);
        for i in 1..LEVEL_COUNT - 1 {
            sum_targets.push((sum_targets[i - 1] as f64 + step).round() as i64);
        }
        sum_targets.push(big_bound);

        let tolerance = (step / 5.0).round() as i64;
        let per_element_bound = ((tolerance as f64 / set_size as f64).round() as i64).max(1);

        Self {
            set_size,
            sum_targets,
            tolerance,
            per_element_bound,
        }
    }
}
