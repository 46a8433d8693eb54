//! Complexity experiment CLI.
//!
//! Commands:
//! - run: one set size across all 21 levels
//! - sweep: the conventional 5..100 size sweep
//! - generate: display a single generated test set
//! - bounds: display the level targets for a size

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use complexity_experiment::bounds::{LEVEL_COUNT, LevelTargets};
use complexity_experiment::error::ExperimentError;
use complexity_experiment::experiment::{ExperimentConfig, ExperimentRunner};
use complexity_experiment::generator::SetGenerator;
use complexity_experiment::results::{SizeRunReport, SweepReport};
use partition_solvers::VariantProfile;

/// Generate a timestamped output path from the given path.
/// e.g., "results.json" -> "results-20260108-010530.json"
fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("results");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

#[derive(Parser)]
#[command(name = "complexity-experiment")]
#[command(version)]
#[command(about = "Partition-problem solver complexity experiments")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the 21-level experiment for one set size
    Run {
        /// Integers per generated set
        #[arg(long)]
        size: usize,

        /// Trials per level
        #[arg(long, default_value = "20")]
        rounds: usize,

        /// Solver lineup: full or reduced
        #[arg(long, default_value = "full")]
        profile: String,

        /// Worker budget shared by the trial and solver pools
        #[arg(long, default_value = "12")]
        workers: usize,

        /// Base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the report
        #[arg(long, default_value = "results.json")]
        output: PathBuf,

        /// Fabricate example data instead of running the solvers
        #[arg(long)]
        example: bool,
    },

    /// Run several set sizes in sequence
    Sweep {
        /// Set sizes to run (comma-separated)
        #[arg(
            long,
            default_value = "5,10,15,20,25,30,35,40,45,50,55,60,65,70,75,80,85,90,95,100",
            value_delimiter = ','
        )]
        sizes: Vec<usize>,

        /// Trials per level
        #[arg(long, default_value = "20")]
        rounds: usize,

        /// Solver lineup: full or reduced
        #[arg(long, default_value = "full")]
        profile: String,

        /// Worker budget shared by the trial and solver pools
        #[arg(long, default_value = "12")]
        workers: usize,

        /// Base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the sweep report
        #[arg(long, default_value = "sweep.json")]
        output: PathBuf,

        /// Fabricate example data instead of running the solvers
        #[arg(long)]
        example: bool,
    },

    /// Generate and display a single test set
    Generate {
        /// Integers per generated set
        #[arg(long)]
        size: usize,

        /// Target level, 0 through 20
        #[arg(long, default_value = "10")]
        level: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Display the level targets for a set size
    Bounds {
        /// Integers per generated set
        #[arg(long)]
        size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    // Ctrl-C flips the shutdown flag; levels cancel their in-flight trials
    // and the orchestrator keeps what already finished.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    match cli.command {
        Commands::Run {
            size,
            rounds,
            profile,
            workers,
            seed,
            output,
            example,
        } => {
            let config = ExperimentConfig {
                repeat_count: rounds,
                profile: parse_profile(&profile)?,
                max_parallelism: workers,
                seed,
            };
            let runner = ExperimentRunner::new(config);

            let report = if example {
                runner.run_example(size)?
            } else {
                match runner.run(size, stop_rx.clone()).await {
                    Ok(report) => report,
                    Err(ExperimentError::Aborted { completed }) => {
                        warn!(
                            completed = completed.len(),
                            "run aborted; nothing was saved"
                        );
                        return Ok(());
                    }
                    Err(err) => return Err(err.into()),
                }
            };

            print_report(&report);
            let output_path = timestamped_path(&output);
            report.save(&output_path)?;
            println!("\nReport saved to: {}", output_path.display());
        }

        Commands::Sweep {
            sizes,
            rounds,
            profile,
            workers,
            seed,
            output,
            example,
        } => {
            let config = ExperimentConfig {
                repeat_count: rounds,
                profile: parse_profile(&profile)?,
                max_parallelism: workers,
                seed,
            };
            let runner = ExperimentRunner::new(config);
            let mut sweep = SweepReport::new();

            info!(sizes = ?sizes, rounds, "starting sweep");
            for &size in &sizes {
                let outcome = if example {
                    runner.run_example(size)
                } else {
                    runner.run(size, stop_rx.clone()).await
                };
                match outcome {
                    Ok(report) => {
                        info!(
                            size,
                            disagreements = report.disagreements.len(),
                            "size complete"
                        );
                        sweep.add(report);
                    }
                    Err(ExperimentError::Aborted { completed }) => {
                        warn!(
                            size,
                            completed_levels = completed.len(),
                            "sweep interrupted; keeping finished sizes"
                        );
                        break;
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            let output_path = timestamped_path(&output);
            sweep.save(&output_path)?;
            println!("\n=== Sweep Complete ===");
            println!("Sizes finished: {}", sweep.reports.len());
            println!("Report saved to: {}", output_path.display());
            for report in &sweep.reports {
                println!(
                    "  size {:>3}: {} disagreements",
                    report.set_size,
                    report.disagreements.len()
                );
            }
        }

        Commands::Generate { size, level, seed } => {
            anyhow::ensure!(size >= 1, "size must be at least 1");
            anyhow::ensure!(level < LEVEL_COUNT, "level must be 0 through 20");

            let levels = LevelTargets::compute(size);
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let set = SetGenerator::new(&levels).generate(level, &mut rng);

            let abs_sum: i64 = set.iter().map(|&v| i64::from(v).abs()).sum();
            let signed_sum: i64 = set.iter().map(|&v| i64::from(v)).sum();
            println!("{:?}", set);
            println!("Seed: {}", seed);
            println!(
                "Target: {} (level {}, tolerance {})",
                levels.sum_targets[level], level, levels.tolerance
            );
            println!("Magnitude sum: {}", abs_sum);
            println!("Signed sum: {}", signed_sum);
        }

        Commands::Bounds { size } => {
            anyhow::ensure!(size >= 1, "size must be at least 1");
            let levels = LevelTargets::compute(size);
            println!("Set size: {}", size);
            println!("Tolerance: {}", levels.tolerance);
            println!("Per-element bound: {}", levels.per_element_bound);
            for (index, target) in levels.sum_targets.iter().enumerate() {
                println!("  level {:>2} ({:>3}%): {}", index, index * 5, target);
            }
        }
    }

    Ok(())
}

fn parse_profile(name: &str) -> Result<VariantProfile> {
    match name.to_lowercase().as_str() {
        "full" => Ok(VariantProfile::Full),
        "reduced" => Ok(VariantProfile::Reduced),
        _ => anyhow::bail!("Unknown profile: {}. Valid: full, reduced", name),
    }
}

fn print_report(report: &SizeRunReport) {
    println!("\n=== Experiment Result ===");
    println!("Set size: {}", report.set_size);
    println!("Rounds per level: {}", report.repeat_count);
    println!("Seed: {}", report.seed);
    if report.example_data {
        println!("Example data: yes (fabricated, for pipeline checks only)");
    }
    println!("Disagreements: {}", report.disagreements.len());

    let members = report.profile.members();
    print!("\n  {:>5} {:>12}", "Level", "Target");
    for variant in &members {
        print!(" {:>18}", variant.name());
    }
    println!();
    for (index, row) in report.levels.iter().enumerate() {
        print!("  {:>5} {:>12}", index, row.target_sum);
        for variant in &members {
            match row.mean_iterations.get(variant) {
                Some(Some(mean)) => print!(" {:>18.1}", mean),
                _ => print!(" {:>18}", "n/a"),
            }
        }
        println!();
    }
}
