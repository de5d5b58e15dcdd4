use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::bucket::{AggregatedBucket, Granularity};
use crate::models::observation::Observation;
use crate::processors::Aggregator;

/// What the loader had to repair while cleaning the raw table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    /// Values filled from the next valid observation, per source column
    pub backfilled: BTreeMap<String, usize>,
    /// Rows with a gap that no later observation could fill
    pub dropped_rows: usize,
}

impl CleaningReport {
    pub fn total_backfilled(&self) -> usize {
        self.backfilled.values().sum()
    }

    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.dropped_rows
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Cleaning Report ===\n");
        summary.push_str(&format!("Rows read: {}\n", self.rows_read));
        summary.push_str(&format!("Rows kept: {}\n", self.rows_kept()));
        summary.push_str(&format!(
            "Rows dropped (unfillable trailing gaps): {}\n",
            self.dropped_rows
        ));
        summary.push_str(&format!(
            "Values backfilled: {}\n",
            self.total_backfilled()
        ));

        for (column, count) in self.backfilled.iter().filter(|(_, c)| **c > 0) {
            summary.push_str(&format!("  - {}: {}\n", column, count));
        }

        summary
    }
}

/// The cleaned, immutable observation set shared by every analysis.
///
/// Aggregates are pure functions of the observations, so each granularity is
/// computed at most once per dataset.
#[derive(Debug)]
pub struct Dataset {
    observations: Vec<Observation>,
    report: CleaningReport,
    aggregates: [OnceLock<Vec<AggregatedBucket>>; 4],
}

impl Dataset {
    pub fn new(observations: Vec<Observation>, report: CleaningReport) -> Self {
        Self {
            observations,
            report,
            aggregates: Default::default(),
        }
    }

    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let report = CleaningReport {
            rows_read: observations.len(),
            ..CleaningReport::default()
        };
        Self::new(observations, report)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn report(&self) -> &CleaningReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.observations.iter().map(|o| o.timestamp).min()?;
        let last = self.observations.iter().map(|o| o.timestamp).max()?;
        Some((first, last))
    }

    /// Buckets for a granularity, computed on first use.
    pub fn aggregate(&self, granularity: Granularity) -> &[AggregatedBucket] {
        self.aggregates[granularity.index()]
            .get_or_init(|| Aggregator::new().aggregate(&self.observations, granularity))
    }
}
