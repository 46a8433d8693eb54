//! Single-trial execution: generate one input, run every applicable variant
//! against it concurrently, and compare verdicts.
//!
//! All variants in a trial share the same input. Regenerating per variant
//! would make the iteration comparison meaningless and disagreement
//! detection impossible.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use partition_solvers::{SolveOutcome, VariantKind};

use crate::bounds::LevelTargets;
use crate::disagreement::{DisagreementLog, DisagreementRecord, VariantAnswer};
use crate::error::ExperimentError;
use crate::generator::SetGenerator;

/// Per-trial result row.
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub trial: usize,
    pub iterations: BTreeMap<VariantKind, u64>,
    /// The agreed (or deterministically resolved) verdict.
    pub partitionable: bool,
    pub disagreement_id: Option<u64>,
}

/// Run one trial: one generated input, one blocking task per variant, one
/// verdict comparison. A panicking solver task fails the whole run.
pub async fn run_trial(
    levels: Arc<LevelTargets>,
    target_index: usize,
    trial: usize,
    variants: Arc<Vec<VariantKind>>,
    log: Arc<DisagreementLog>,
    seed: u64,
) -> Result<TrialResult, ExperimentError> {
    // Every trial gets its own rng stream so results are reproducible no
    // matter which order the pool schedules them in.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(((target_index as u64) << 32) | trial as u64);
    let input = Arc::new(SetGenerator::new(&levels).generate(target_index, &mut rng));

    let tasks = variants.iter().map(|&variant| {
        let input = input.clone();
        tokio::task::spawn_blocking(move || (variant, variant.solve(&input)))
    });

    let mut outcomes: Vec<(VariantKind, SolveOutcome)> = Vec::with_capacity(variants.len());
    for joined in join_all(tasks).await {
        match joined {
            Ok(pair) => outcomes.push(pair),
            Err(err) => return Err(ExperimentError::VariantFailure(err.to_string())),
        }
    }

    let answers: Vec<VariantAnswer> = outcomes
        .iter()
        .map(|&(variant, outcome)| VariantAnswer {
            variant,
            partitionable: outcome.partitionable,
        })
        .collect();
    let unanimous = answers
        .windows(2)
        .all(|pair| pair[0].partitionable == pair[1].partitionable);
    let partitionable = resolve_verdict(&answers);

    let disagreement_id = if unanimous {
        None
    } else {
        warn!(target_index, trial, "solver verdicts disagree");
        Some(log.record(DisagreementRecord {
            id: 0,
            answers,
            trusted_verdict: partitionable,
            set_size: levels.set_size,
            target_index,
            trial,
            target_sum: levels.sum_targets[target_index],
            input: input.to_vec(),
        }))
    };

    Ok(TrialResult {
        trial,
        iterations: outcomes
            .into_iter()
            .map(|(variant, outcome)| (variant, outcome.iterations))
            .collect(),
        partitionable,
        disagreement_id,
    })
}

/// Deterministic truth among split verdicts: the plain recursive solver when
/// it ran, otherwise the majority, with exact ties going to the tabulated
/// solver (or the earliest answer if that one did not run).
pub fn resolve_verdict(answers: &[VariantAnswer]) -> bool {
    if let Some(answer) = answers
        .iter()
        .find(|a| a.variant == VariantKind::RecursiveNormal)
    {
        return answer.partitionable;
    }
    let yes = answers.iter().filter(|a| a.partitionable).count();
    let no = answers.len() - yes;
    if yes != no {
        return yes > no;
    }
    answers
        .iter()
        .find(|a| a.variant == VariantKind::TabulatedNormal)
        .or_else(|| answers.first())
        .map(|a| a.partitionable)
        .unwrap_or(false)
}
