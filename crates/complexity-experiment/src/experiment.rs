//! Experiment orchestration: one set size, 21 levels, run in order.

use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use partition_solvers::VariantProfile;

use crate::bounds::{LEVEL_COUNT, LevelTargets};
use crate::disagreement::{DisagreementLog, DisagreementRecord, VariantAnswer};
use crate::error::ExperimentError;
use crate::generator::SetGenerator;
use crate::level::run_level;
use crate::results::{LevelAverages, SizeRunReport};
use crate::trial::resolve_verdict;

/// Immutable per-run configuration.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Trials per target level.
    pub repeat_count: usize,
    /// Which solver lineup to dispatch.
    pub profile: VariantProfile,
    /// Total worker budget shared by the outer trial pool and the per-trial
    /// solver pool; outer times inner never exceeds it.
    pub max_parallelism: usize,
    /// Base seed; per-trial streams derive from it. Random when absent.
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            repeat_count: 20,
            profile: VariantProfile::Full,
            max_parallelism: 12,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    fn validate(&self, set_size: usize) -> Result<(), ExperimentError> {
        if set_size < 1 {
            return Err(ExperimentError::Configuration(
                "set size must be at least 1".into(),
            ));
        }
        if self.repeat_count < 1 {
            return Err(ExperimentError::Configuration(
                "repeat count must be at least 1".into(),
            ));
        }
        if self.max_parallelism < 1 {
            return Err(ExperimentError::Configuration(
                "parallelism budget must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The experiment runner.
pub struct ExperimentRunner {
    config: ExperimentConfig,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Run the full 21-level experiment for one set size.
    ///
    /// Levels run strictly in sequence; that bounds peak concurrency and
    /// makes progress consumable as it happens. An interrupt aborts the
    /// in-flight level and surfaces the rows that finished before it.
    pub async fn run(
        &self,
        set_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SizeRunReport, ExperimentError> {
        self.config.validate(set_size)?;
        let started_at = Utc::now();
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let levels = Arc::new(LevelTargets::compute(set_size));
        let log = Arc::new(DisagreementLog::new());
        let mut shutdown = shutdown;
        debug!(
            set_size,
            smallest = levels.sum_targets[0],
            largest = levels.sum_targets[LEVEL_COUNT - 1],
            tolerance = levels.tolerance,
            "bounds computed"
        );

        info!(
            set_size,
            repeat_count = self.config.repeat_count,
            profile = ?self.config.profile,
            seed,
            "starting experiment"
        );

        let mut rows: Vec<LevelAverages> = Vec::with_capacity(LEVEL_COUNT);
        for target_index in 0..LEVEL_COUNT {
            if *shutdown.borrow() {
                warn!(set_size, completed = rows.len(), "experiment interrupted");
                return Err(ExperimentError::Aborted { completed: rows });
            }
            match run_level(
                levels.clone(),
                target_index,
                &self.config,
                log.clone(),
                seed,
                &mut shutdown,
            )
            .await
            {
                Ok(row) => rows.push(row),
                Err(ExperimentError::Cancelled) => {
                    warn!(
                        set_size,
                        target_index,
                        completed = rows.len(),
                        "experiment interrupted mid-level"
                    );
                    return Err(ExperimentError::Aborted { completed: rows });
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            set_size,
            disagreements = log.len(),
            "experiment complete"
        );
        Ok(SizeRunReport {
            run_id: Uuid::new_v4(),
            set_size,
            repeat_count: self.config.repeat_count,
            profile: self.config.profile,
            seed,
            example_data: false,
            started_at,
            ended_at: Utc::now(),
            levels: rows,
            disagreements: log.drain(),
        })
    }

    /// Fabricate a result table without running any solver.
    ///
    /// Each variant's column is Gaussian noise around the level target with a
    /// per-variant shrinking spread, and rare disagreements are staged over
    /// genuinely generated inputs. This exists so the reporting pipeline can
    /// be exercised in seconds instead of hours; the numbers mean nothing.
    pub fn run_example(&self, set_size: usize) -> Result<SizeRunReport, ExperimentError> {
        self.config.validate(set_size)?;
        let started_at = Utc::now();
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let levels = LevelTargets::compute(set_size);
        let generator = SetGenerator::new(&levels);
        let log = DisagreementLog::new();

        let span = (levels.sum_targets[LEVEL_COUNT - 1] - levels.sum_targets[0]).max(1) as f64;
        let members = self.config.profile.members();
        let executed = self.config.profile.executed_for(set_size);

        let mut rows = Vec::with_capacity(LEVEL_COUNT);
        for target_index in 0..LEVEL_COUNT {
            let target = levels.sum_targets[target_index];
            let mut row = LevelAverages::new(target);
            for (rank, &variant) in members.iter().enumerate() {
                if executed.contains(&variant) {
                    let spread = (span / 2.0f64.powi(rank as i32 + 1)).max(1.0);
                    let noise = Normal::new(target as f64, spread)
                        .expect("spread is clamped positive")
                        .sample(&mut rng);
                    row.mean_iterations.insert(variant, Some(noise.abs()));
                } else {
                    row.mean_iterations.insert(variant, None);
                }
            }
            rows.push(row);

            // Roughly one staged disagreement every couple of tables.
            if rng.random_range(0..52) == 0 && !executed.is_empty() {
                let truth = rng.random_bool(0.5);
                let mut answers: Vec<VariantAnswer> = executed
                    .iter()
                    .map(|&variant| VariantAnswer {
                        variant,
                        partitionable: truth,
                    })
                    .collect();
                let victim = rng.random_range(0..answers.len());
                answers[victim].partitionable = !truth;
                let trusted = resolve_verdict(&answers);
                log.record(DisagreementRecord {
                    id: 0,
                    answers,
                    trusted_verdict: trusted,
                    set_size,
                    target_index,
                    trial: 0,
                    target_sum: target,
                    input: generator.generate(target_index, &mut rng),
                });
            }
        }

        Ok(SizeRunReport {
            run_id: Uuid::new_v4(),
            set_size,
            repeat_count: self.config.repeat_count,
            profile: self.config.profile,
            seed,
            example_data: true,
            started_at,
            ended_at: Utc::now(),
            levels: rows,
            disagreements: log.drain(),
        })
    }
}

#[cfg(test)]
mod tests {
    use partition_solvers::VariantKind;

    use super::*;

    #[test]
    fn configuration_is_validated_up_front() {
        let runner = ExperimentRunner::new(ExperimentConfig {
            repeat_count: 0,
            ..Default::default()
        });
        assert!(matches!(
            runner.run_example(10),
            Err(ExperimentError::Configuration(_))
        ));

        let runner = ExperimentRunner::new(ExperimentConfig::default());
        assert!(matches!(
            runner.run_example(0),
            Err(ExperimentError::Configuration(_))
        ));
    }

    #[test]
    fn example_table_has_a_full_set_of_rows() {
        let runner = ExperimentRunner::new(ExperimentConfig {
            seed: Some(21),
            ..Default::default()
        });
        let report = runner.run_example(10).unwrap();
        assert!(report.example_data);
        assert_eq!(report.levels.len(), LEVEL_COUNT);
        for row in &report.levels {
            for variant in VariantKind::all() {
                assert!(row.mean_iterations[&variant].is_some());
            }
        }
    }

    #[test]
    fn example_table_marks_the_oversized_recursive_column() {
        let runner = ExperimentRunner::new(ExperimentConfig {
            seed: Some(3),
            ..Default::default()
        });
        let report = runner.run_example(26).unwrap();
        for row in &report.levels {
            assert_eq!(row.mean_iterations[&VariantKind::RecursiveNormal], None);
            assert!(row.mean_iterations[&VariantKind::TabulatedNormal].is_some());
        }
    }

    #[test]
    fn example_tables_are_reproducible_per_seed() {
        let config = ExperimentConfig {
            seed: Some(77),
            ..Default::default()
        };
        let a = ExperimentRunner::new(config.clone()).run_example(15).unwrap();
        let b = ExperimentRunner::new(config).run_example(15).unwrap();
        assert_eq!(a.levels, b.levels);
        assert_eq!(a.disagreements.len(), b.disagreements.len());
    }
}
