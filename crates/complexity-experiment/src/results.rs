//! Result tables and the JSON handoff to the reporting pipeline.
//!
//! The experiment owns nothing on disk beyond these files; spreadsheets,
//! charts, and conflict documents are the reporting side's business.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use partition_solvers::{VariantKind, VariantProfile};

use crate::disagreement::DisagreementRecord;

/// One row of the per-size table: a level target and the mean iteration
/// count per variant across all trials at that level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAverages {
    pub target_sum: i64,
    /// `None` marks a variant the size gate kept out of execution; the
    /// report consumer substitutes its own 2^n estimate there.
    pub mean_iterations: BTreeMap<VariantKind, Option<f64>>,
}

impl LevelAverages {
    pub fn new(target_sum: i64) -> Self {
        Self {
            target_sum,
            mean_iterations: BTreeMap::new(),
        }
    }
}

/// The complete outcome of one set size: 21 level rows plus every recorded
/// disagreement. This is what gets handed to the reporting side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeRunReport {
    pub run_id: Uuid,
    pub set_size: usize,
    pub repeat_count: usize,
    pub profile: VariantProfile,
    pub seed: u64,
    /// True when the table was fabricated by the example fast path.
    pub example_data: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub levels: Vec<LevelAverages>,
    pub disagreements: Vec<DisagreementRecord>,
}

impl SizeRunReport {
    /// Save as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

/// Container for a multi-size sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub reports: Vec<SizeRunReport>,
}

impl SweepReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, report: SizeRunReport) {
        self.reports.push(report);
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let sweep = serde_json::from_str(&json)?;
        Ok(sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_json() {
        let mut row = LevelAverages::new(1_234);
        row.mean_iterations.insert(VariantKind::MemoizedNormal, Some(88.5));
        row.mean_iterations.insert(VariantKind::RecursiveNormal, None);
        let report = SizeRunReport {
            run_id: Uuid::new_v4(),
            set_size: 30,
            repeat_count: 20,
            profile: VariantProfile::Full,
            seed: 7,
            example_data: false,
            started_at: Utc::now(),
            ended_at: Utc::now(),
            levels: vec![row],
            disagreements: Vec::new(),
        };

        let path = std::env::temp_dir().join(format!("size-run-{}.json", report.run_id));
        report.save(&path).unwrap();
        let loaded = SizeRunReport::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.levels, report.levels);
        assert_eq!(
            loaded.levels[0].mean_iterations[&VariantKind::RecursiveNormal],
            None
        );
    }
}
