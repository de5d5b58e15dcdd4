use crate::models::{Observation, WindDirection};
use crate::utils::constants::DEFAULT_CHART_WIDTH;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindFrequency {
    pub direction: WindDirection,
    pub count: usize,
    /// Share of all observations, in percent
    pub share: f64,
}

/// Wind-direction frequency table, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindStatistics {
    pub total_records: usize,
    pub frequencies: Vec<WindFrequency>,
}

impl WindStatistics {
    pub fn dominant(&self) -> Option<WindDirection> {
        self.frequencies.first().map(|f| f.direction)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Wind Direction Frequency ===\n");
        summary.push_str(&format!("{:<6}{:>8}{:>9}\n", "wd", "count", "share"));
        for f in &self.frequencies {
            summary.push_str(&format!(
                "{:<6}{:>8}{:>8.1}%\n",
                f.direction.code(),
                f.count,
                f.share
            ));
        }

        if let Some(dominant) = self.dominant() {
            summary.push_str(&format!("Dominant direction: {}\n", dominant));
        }

        summary
    }

    /// Horizontal bar chart scaled so the most frequent direction spans `width`.
    pub fn bar_chart(&self, width: usize) -> String {
        let width = if width == 0 { DEFAULT_CHART_WIDTH } else { width };
        let max = self.frequencies.iter().map(|f| f.count).max().unwrap_or(0);

        let mut chart = String::new();
        for f in &self.frequencies {
            let length = if max == 0 { 0 } else { f.count * width / max };
            chart.push_str(&format!(
                "{:<4}|{:<width$}| {}\n",
                f.direction.code(),
                "#".repeat(length),
                f.count,
                width = width
            ));
        }
        chart
    }
}

pub struct WindAnalyzer;

impl WindAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn frequencies(&self, observations: &[Observation]) -> WindStatistics {
        let mut counts: HashMap<WindDirection, usize> = HashMap::new();
        for observation in observations {
            *counts.entry(observation.wind_direction).or_default() += 1;
        }

        let total_records = observations.len();
        let mut frequencies: Vec<WindFrequency> = counts
            .into_iter()
            .map(|(direction, count)| WindFrequency {
                direction,
                count,
                share: 100.0 * count as f64 / total_records as f64,
            })
            .collect();

        // Ties fall back to compass order
        frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.direction.cmp(&b.direction)));

        WindStatistics {
            total_records,
            frequencies,
        }
    }
}

impl Default for WindAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
