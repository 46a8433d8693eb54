//! Constrained random set generation.
//!
//! A generated set must hold `set_size` distinct integers, never both +x and
//! -x, with a magnitude sum that is even, lands within tolerance of the level
//! target, and a signed sum that is not zero. Plain sampling almost never
//! satisfies all of that near the extreme levels, so generation is a pipeline
//! of a self-adjusting Gaussian draw followed by explicit repair passes, with
//! a deterministic construction as the terminal fallback.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::bounds::{LEVEL_COUNT, LevelTargets, MAGNITUDE_CAP};

/// Fresh sampling attempts before giving up on randomness entirely.
const MAX_ATTEMPTS: usize = 6;
/// Redraws of a single magnitude before the deterministic walk-up kicks in.
const DRAW_RETRY_LIMIT: usize = 20;
/// Victim swaps per repair pass before the whole attempt is discarded.
const REPAIR_RETRY_LIMIT: usize = 5;

pub struct SetGenerator<'a> {
    levels: &'a LevelTargets,
}

impl<'a> SetGenerator<'a> {
    pub fn new(levels: &'a LevelTargets) -> Self {
        Self { levels }
    }

    /// Produce a valid set for the given level. Sampling anomalies are
    /// resolved internally; this always returns a set satisfying every
    /// constraint.
    pub fn generate(&self, target_index: usize, rng: &mut ChaCha8Rng) -> Vec<i32> {
        assert!(target_index < LEVEL_COUNT, "target index out of range");
        for attempt in 0..MAX_ATTEMPTS {
            if let Some(set) = self.try_generate(target_index, rng) {
                return set;
            }
            debug!(target_index, attempt, "regenerating after failed repair");
        }
        self.fallback_set(target_index)
    }

    fn try_generate(&self, target_index: usize, rng: &mut ChaCha8Rng) -> Option<Vec<i32>> {
        let size = self.levels.set_size;
        let target = self.levels.sum_targets[target_index];
        let bound = self.levels.per_element_bound as f64;
        let mean = (target as f64 / size as f64).round();

        let mut chosen: Vec<i64> = Vec::with_capacity(size);
        let mut present: HashSet<i64> = HashSet::with_capacity(size);
        let mut abs_sum: i64 = 0;
        let mut deviation = bound / 2.0;

        for _ in 0..size {
            let magnitude = draw_magnitude(mean, deviation, &present, rng);
            abs_sum += magnitude;
            let value = if rng.random_bool(0.5) {
                magnitude
            } else {
                -magnitude
            };
            present.insert(value);
            chosen.push(value);

            // Deviation tightens as slots fill and widens when the last draw
            // stayed close to the mean, pulling the running sum onto the
            // target without collapsing early variety.
            let filled = chosen.len() as f64;
            let div = 14.0 - filled / size as f64 * 10.0;
            deviation = 6.0 * (2.0 * bound - (magnitude as f64 - mean).abs()) / div;
            if deviation <= 0.0 {
                deviation = bound * 1.5 / div;
            }
        }

        let low = target - self.levels.tolerance;
        let high = target + self.levels.tolerance;
        if !repair_tolerance(&mut chosen, &mut present, &mut abs_sum, low, high, rng) {
            return None;
        }
        if !repair_parity(&mut chosen, &mut present, &mut abs_sum, low, high, rng) {
            return None;
        }
        // A zero signed sum is a trivial base case for every solver.
        if chosen.iter().sum::<i64>() == 0 {
            return None;
        }
        Some(chosen.iter().map(|&v| v as i32).collect())
    }

    /// Deterministic escape hatch: an arithmetic ramp of magnitudes centred
    /// on the target with alternating signs. Distinct by construction, even
    /// magnitude sum, nonzero signed sum, and within tolerance at every
    /// level.
    fn fallback_set(&self, target_index: usize) -> Vec<i32> {
        let size = self.levels.set_size;
        let target = self.levels.sum_targets[target_index];
        if size == 1 {
            let magnitude = ((target / 2) * 2).max(2);
            return vec![magnitude as i32];
        }

        let ramp = (size * (size - 1) / 2) as i64;
        let base = (((target - ramp) as f64) / size as f64).round().max(0.0) as i64;
        let mut magnitudes: Vec<i64> = (0..size as i64).map(|k| base + k).collect();
        let abs_sum: i64 = magnitudes.iter().sum();
        if abs_sum % 2 == 1 {
            magnitudes[size - 1] += 1;
        }
        magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| if k % 2 == 1 { -m as i32 } else { m as i32 })
            .collect()
    }
}

/// One Gaussian magnitude, redrawn while either sign of it is already taken
/// (keeps elements distinct and cancelling pairs out) and folded back under
/// the cap when it overshoots.
fn draw_magnitude(
    mean: f64,
    deviation: f64,
    present: &HashSet<i64>,
    rng: &mut ChaCha8Rng,
) -> i64 {
    let normal = Normal::new(mean, deviation.max(1.0)).expect("clamped deviation is positive");
    for _ in 0..DRAW_RETRY_LIMIT {
        let mut magnitude = normal.sample(rng).round().abs() as i64;
        if magnitude > MAGNITUDE_CAP {
            magnitude = (2 * MAGNITUDE_CAP - magnitude).abs().min(MAGNITUDE_CAP);
        }
        if !present.contains(&magnitude) && !present.contains(&-magnitude) {
            return magnitude;
        }
    }
    // Stuck on collisions: walk up from the mean until a free magnitude shows.
    let mut magnitude = (mean.round() as i64).clamp(0, MAGNITUDE_CAP);
    while present.contains(&magnitude) || present.contains(&-magnitude) {
        magnitude += 1;
    }
    magnitude
}

/// Swap single elements for values shifted by the exact excess until the
/// magnitude sum is back inside `[low, high]`.
fn repair_tolerance(
    chosen: &mut [i64],
    present: &mut HashSet<i64>,
    abs_sum: &mut i64,
    low: i64,
    high: i64,
    rng: &mut ChaCha8Rng,
) -> bool {
    let mut repairs = 0;
    while *abs_sum < low || *abs_sum > high {
        if repairs > REPAIR_RETRY_LIMIT {
            return false;
        }
        repairs += 1;

        // Negative shift means the sum is short and the victim grows.
        let shift = if *abs_sum > high {
            *abs_sum - high
        } else {
            *abs_sum - low
        };
        let idx = rng.random_range(0..chosen.len());
        let victim = chosen[idx];
        let new_magnitude = victim.abs() - shift;
        if new_magnitude <= 0 {
            continue;
        }
        let replacement = if victim < 0 { -new_magnitude } else { new_magnitude };
        if present.contains(&replacement) || present.contains(&-replacement) {
            continue;
        }
        present.remove(&victim);
        present.insert(replacement);
        chosen[idx] = replacement;
        *abs_sum -= shift;
    }
    true
}

/// Nudge one element's magnitude by a unit so the magnitude sum becomes
/// even, without drifting outside `[low, high]`. The victim choice retries
/// around duplicates and wrong-direction nudges.
fn repair_parity(
    chosen: &mut [i64],
    present: &mut HashSet<i64>,
    abs_sum: &mut i64,
    low: i64,
    high: i64,
    rng: &mut ChaCha8Rng,
) -> bool {
    if *abs_sum % 2 == 0 {
        return true;
    }
    for _ in 0..=REPAIR_RETRY_LIMIT {
        let idx = rng.random_range(0..chosen.len());
        let victim = chosen[idx];
        let replacement = victim + 1;
        let delta = replacement.abs() - victim.abs();
        let nudged = *abs_sum + delta;
        if nudged < low || nudged > high {
            continue;
        }
        if present.contains(&replacement) || present.contains(&-replacement) {
            continue;
        }
        present.remove(&victim);
        present.insert(replacement);
        chosen[idx] = replacement;
        *abs_sum = nudged;
        return true;
    }
    false
}
