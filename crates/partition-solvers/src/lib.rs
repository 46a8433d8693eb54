//! Solver variants for the set-partition decision problem.
//!
//! Every variant answers the same question for a list of distinct signed
//! integers: can it be split into two subsets with equal sums? Each one also
//! reports how many iterations it spent getting there, which is the quantity
//! the experiment harness actually measures. Variants are safe to run
//! concurrently against a shared input; none of them keeps state between
//! calls.

pub mod variant;

mod memoized;
mod pruned;
mod recursive;
mod tabulated;

pub use variant::{RECURSIVE_SIZE_LIMIT, SolveOutcome, VariantKind, VariantProfile};
