//! The closed registry of solver variants and their dispatch profiles.

use serde::{Deserialize, Serialize};

use crate::{memoized, pruned, recursive, tabulated};

/// Largest input the plain recursive solver is allowed to see. Its cost is
/// roughly 2^n, so past this point it is left out of dispatch entirely and
/// reported downstream as a precomputed estimate instead.
pub const RECURSIVE_SIZE_LIMIT: usize = 25;

/// What a single solver invocation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Work performed, in the variant's own accounting unit.
    pub iterations: u64,
    /// Whether the input splits into two equal-sum subsets.
    pub partitionable: bool,
}

/// One solving strategy. The set is fixed; dispatch goes through an explicit
/// ordered list rather than any name lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Memoized subset-sum over element magnitudes with exact pruning rules.
    PrunedMemoized,
    /// Top-down memoized signed subset-sum.
    MemoizedNormal,
    /// Bottom-up tabulated signed subset-sum.
    TabulatedNormal,
    /// Plain exponential recursion; small inputs only.
    RecursiveNormal,
}

impl VariantKind {
    /// Registry order. This order is also the tie-break order when verdicts
    /// split evenly.
    pub fn all() -> Vec<Self> {
        vec![
            Self::PrunedMemoized,
            Self::MemoizedNormal,
            Self::TabulatedNormal,
            Self::RecursiveNormal,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrunedMemoized => "pruned_memoized",
            Self::MemoizedNormal => "memoized_normal",
            Self::TabulatedNormal => "tabulated_normal",
            Self::RecursiveNormal => "recursive_normal",
        }
    }

    /// Upper bound on the input size this variant may be dispatched for.
    pub fn max_set_size(&self) -> Option<usize> {
        match self {
            Self::RecursiveNormal => Some(RECURSIVE_SIZE_LIMIT),
            _ => None,
        }
    }

    /// Run this variant against the input.
    pub fn solve(&self, values: &[i32]) -> SolveOutcome {
        match self {
            Self::PrunedMemoized => pruned::solve(values),
            Self::MemoizedNormal => memoized::solve(values),
            Self::TabulatedNormal => tabulated::solve(values),
            Self::RecursiveNormal => recursive::solve(values),
        }
    }
}

/// Which subset of the registry a run dispatches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VariantProfile {
    /// Every variant, with the recursive one size-gated.
    Full,
    /// The two conventional dynamic-programming solvers only.
    Reduced,
}

impl VariantProfile {
    /// All variants this profile covers, whether or not a given size lets
    /// them run. Result rows carry one column per member.
    pub fn members(&self) -> Vec<VariantKind> {
        match self {
            Self::Full => VariantKind::all(),
            Self::Reduced => vec![VariantKind::MemoizedNormal, VariantKind::TabulatedNormal],
        }
    }

    /// The variants actually dispatched for a given input size.
    pub fn executed_for(&self, set_size: usize) -> Vec<VariantKind> {
        self.members()
            .into_iter()
            .filter(|v| v.max_set_size().is_none_or(|cap| set_size <= cap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_stable() {
        assert_eq!(
            VariantKind::all(),
            vec![
                VariantKind::PrunedMemoized,
                VariantKind::MemoizedNormal,
                VariantKind::TabulatedNormal,
                VariantKind::RecursiveNormal,
            ]
        );
    }

    #[test]
    fn full_profile_gates_recursive_by_size() {
        let profile = VariantProfile::Full;
        assert!(
            profile
                .executed_for(RECURSIVE_SIZE_LIMIT)
                .contains(&VariantKind::RecursiveNormal)
        );
        assert!(
            !profile
                .executed_for(RECURSIVE_SIZE_LIMIT + 1)
                .contains(&VariantKind::RecursiveNormal)
        );
        assert_eq!(profile.executed_for(RECURSIVE_SIZE_LIMIT + 1).len(), 3);
    }

    #[test]
    fn reduced_profile_never_runs_recursive() {
        let executed = VariantProfile::Reduced.executed_for(5);
        assert_eq!(
            executed,
            vec![VariantKind::MemoizedNormal, VariantKind::TabulatedNormal]
        );
    }

    #[test]
    fn variants_agree_on_simple_inputs() {
        // Splits as {1, -2, 4} and {3}.
        let yes = [1, -2, 3, 4];
        // No subset reaches half the total.
        let no = [5, -1, 2];
        for variant in VariantKind::all() {
            assert!(variant.solve(&yes).partitionable, "{}", variant.name());
            assert!(!variant.solve(&no).partitionable, "{}", variant.name());
        }
    }
}
