//! Level execution: repeat one target's trial many times concurrently and
//! reduce to per-variant averages.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, info};

use crate::bounds::LevelTargets;
use crate::disagreement::DisagreementLog;
use crate::error::ExperimentError;
use crate::experiment::ExperimentConfig;
use crate::results::LevelAverages;
use crate::trial::{TrialResult, run_trial};

/// Run `repeat_count` trials of one level through a bounded pool and average
/// the iteration counts. The outer pool width is chosen so that outer times
/// inner (one slot per dispatched variant) stays within the configured
/// parallelism budget; a finishing trial immediately frees its slot for a
/// queued one.
///
/// Cancellation drops the in-flight trials wholesale; a level either
/// completes or reports `Cancelled`, never a partial row.
pub async fn run_level(
    levels: Arc<LevelTargets>,
    target_index: usize,
    config: &ExperimentConfig,
    log: Arc<DisagreementLog>,
    seed: u64,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<LevelAverages, ExperimentError> {
    let executed = Arc::new(config.profile.executed_for(levels.set_size));
    let inner_workers = executed.len().max(1);
    let outer_workers = (config.max_parallelism / inner_workers).max(1);
    let semaphore = Arc::new(Semaphore::new(outer_workers));

    debug!(target_index, outer_workers, inner_workers, "starting level");

    let trials = (0..config.repeat_count).map(|trial| {
        let levels = levels.clone();
        let executed = executed.clone();
        let log = log.clone();
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("trial pool semaphore closed");
            run_trial(levels, target_index, trial, executed, log, seed).await
        }
    });

    let joined = tokio::select! {
        joined = join_all(trials) => joined,
        _ = wait_for_interrupt(shutdown) => return Err(ExperimentError::Cancelled),
    };

    // A fixed-size table indexed by trial number keeps repeated seeded runs
    // identical regardless of completion order.
    let mut table: Vec<Option<TrialResult>> = vec![None; config.repeat_count];
    for result in joined {
        let result = result?;
        let slot = result.trial;
        table[slot] = Some(result);
    }

    let mut row = LevelAverages::new(levels.sum_targets[target_index]);
    for variant in config.profile.members() {
        if executed.contains(&variant) {
            let total: u64 = table
                .iter()
                .flatten()
                .map(|result| result.iterations[&variant])
                .sum();
            let mean = total as f64 / config.repeat_count as f64;
            row.mean_iterations.insert(variant, Some(mean));
        } else {
            row.mean_iterations.insert(variant, None);
        }
    }

    info!(
        target_index,
        target_sum = row.target_sum,
        disagreements = log.len(),
        "level complete"
    );
    Ok(row)
}

/// Resolves once the shutdown flag turns true; never resolves if the sender
/// goes away without signalling.
async fn wait_for_interrupt(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use partition_solvers::{VariantKind, VariantProfile};

    use super::*;

    fn test_config(repeat_count: usize) -> ExperimentConfig {
        ExperimentConfig {
            repeat_count,
            profile: VariantProfile::Full,
            max_parallelism: 12,
            seed: Some(5),
        }
    }

    #[tokio::test]
    async fn level_averages_cover_every_executed_variant() {
        let levels = Arc::new(LevelTargets::compute(7));
        let log = Arc::new(DisagreementLog::new());
        let (_tx, mut rx) = watch::channel(false);
        let row = run_level(levels, 4, &test_config(5), log, 5, &mut rx)
            .await
            .unwrap();

        assert_eq!(row.mean_iterations.len(), VariantKind::all().len());
        for (variant, mean) in &row.mean_iterations {
            let mean = mean.unwrap_or_else(|| panic!("{} missing", variant.name()));
            assert!(mean > 0.0);
        }
    }

    #[tokio::test]
    async fn oversized_inputs_leave_a_sentinel_for_the_recursive_solver() {
        // Level 0 keeps the magnitude sums small enough to stay fast.
        let levels = Arc::new(LevelTargets::compute(26));
        let log = Arc::new(DisagreementLog::new());
        let (_tx, mut rx) = watch::channel(false);
        let row = run_level(levels, 0, &test_config(2), log, 11, &mut rx)
            .await
            .unwrap();

        assert_eq!(row.mean_iterations[&VariantKind::RecursiveNormal], None);
        assert!(row.mean_iterations[&VariantKind::MemoizedNormal].is_some());
        assert!(row.mean_iterations[&VariantKind::TabulatedNormal].is_some());
        assert!(row.mean_iterations[&VariantKind::PrunedMemoized].is_some());
    }

    #[tokio::test]
    async fn preset_interrupt_cancels_the_level() {
        let levels = Arc::new(LevelTargets::compute(7));
        let log = Arc::new(DisagreementLog::new());
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        let result = run_level(levels, 0, &test_config(50), log, 1, &mut rx).await;
        assert!(matches!(result, Err(ExperimentError::Cancelled)));
    }

    #[tokio::test]
    async fn seeded_levels_reduce_identically() {
        let levels = Arc::new(LevelTargets::compute(7));
        let (_tx, mut rx) = watch::channel(false);
        let a = run_level(
            levels.clone(),
            2,
            &test_config(4),
            Arc::new(DisagreementLog::new()),
            3,
            &mut rx,
        )
        .await
        .unwrap();
        let b = run_level(
            levels,
            2,
            &test_config(4),
            Arc::new(DisagreementLog::new()),
            3,
            &mut rx,
        )
        .await
        .unwrap();
        assert_eq!(a, b);
    }
}
