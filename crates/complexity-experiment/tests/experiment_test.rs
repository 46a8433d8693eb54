//! End-to-end runs of the orchestrator with small sizes.

use tokio::sync::watch;

use complexity_experiment::bounds::LEVEL_COUNT;
use complexity_experiment::error::ExperimentError;
use complexity_experiment::experiment::{ExperimentConfig, ExperimentRunner};
use partition_solvers::{VariantKind, VariantProfile};

fn small_config(repeat_count: usize, seed: u64) -> ExperimentConfig {
    ExperimentConfig {
        repeat_count,
        profile: VariantProfile::Full,
        max_parallelism: 12,
        seed: Some(seed),
    }
}

#[tokio::test]
async fn full_run_produces_a_complete_table() {
    let runner = ExperimentRunner::new(small_config(3, 7));
    let (_tx, rx) = watch::channel(false);
    let report = runner.run(6, rx).await.unwrap();

    assert_eq!(report.levels.len(), LEVEL_COUNT);
    assert!(!report.example_data);
    for pair in report.levels.windows(2) {
        assert!(pair[0].target_sum <= pair[1].target_sum);
    }
    // Size 6 lets every variant run, so no sentinel anywhere.
    for row in &report.levels {
        for variant in VariantKind::all() {
            let mean = row.mean_iterations[&variant]
                .unwrap_or_else(|| panic!("{} missing a mean", variant.name()));
            assert!(mean > 0.0);
        }
    }
}

#[tokio::test]
async fn seeded_runs_are_identical() {
    let (_tx, rx) = watch::channel(false);
    let a = ExperimentRunner::new(small_config(2, 11))
        .run(5, rx.clone())
        .await
        .unwrap();
    let b = ExperimentRunner::new(small_config(2, 11))
        .run(5, rx)
        .await
        .unwrap();
    assert_eq!(a.levels, b.levels);
    assert_eq!(a.disagreements.len(), b.disagreements.len());
}

#[tokio::test]
async fn reduced_profile_limits_the_columns() {
    let config = ExperimentConfig {
        repeat_count: 2,
        profile: VariantProfile::Reduced,
        max_parallelism: 12,
        seed: Some(4),
    };
    let (_tx, rx) = watch::channel(false);
    let report = ExperimentRunner::new(config).run(5, rx).await.unwrap();

    for row in &report.levels {
        assert_eq!(row.mean_iterations.len(), 2);
        assert!(row.mean_iterations[&VariantKind::MemoizedNormal].is_some());
        assert!(row.mean_iterations[&VariantKind::TabulatedNormal].is_some());
    }
}

#[tokio::test]
async fn preset_interrupt_surfaces_no_partial_levels() {
    let runner = ExperimentRunner::new(small_config(5, 2));
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    match runner.run(5, rx).await {
        Err(ExperimentError::Aborted { completed }) => assert!(completed.is_empty()),
        other => panic!("expected an abort, got {other:?}"),
    }
}

#[tokio::test]
async fn example_fast_path_skips_the_solvers_for_oversized_recursion() {
    let runner = ExperimentRunner::new(small_config(3, 9));
    let report = runner.run_example(26).unwrap();

    assert!(report.example_data);
    assert_eq!(report.levels.len(), LEVEL_COUNT);
    for row in &report.levels {
        assert_eq!(row.mean_iterations[&VariantKind::RecursiveNormal], None);
    }
}
