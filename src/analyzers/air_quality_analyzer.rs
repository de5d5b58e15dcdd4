use crate::error::{ProcessingError, Result};
use crate::models::{CleaningReport, Dataset, Metric, Observation};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub metrics: Vec<MetricStats>,
    pub cleaning: CleaningReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub metric: Metric,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub min_at: NaiveDateTime,
    pub max_at: NaiveDateTime,
}

pub struct AirQualityAnalyzer;

impl AirQualityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<DatasetStatistics> {
        let observations = dataset.observations();
        let time_range = dataset
            .time_range()
            .ok_or_else(|| ProcessingError::MissingData("No records to analyze".to_string()))?;

        let metrics = Metric::ALL
            .iter()
            .map(|metric| Self::metric_stats(observations, *metric, time_range.0))
            .collect();

        Ok(DatasetStatistics {
            total_records: observations.len(),
            time_range,
            metrics,
            cleaning: dataset.report().clone(),
        })
    }

    fn metric_stats(
        observations: &[Observation],
        metric: Metric,
        first: NaiveDateTime,
    ) -> MetricStats {
        let mut stats = MetricStats {
            metric,
            min: f64::INFINITY,
            mean: 0.0,
            max: f64::NEG_INFINITY,
            min_at: first,
            max_at: first,
        };

        let mut sum = 0.0;
        for observation in observations {
            let value = observation.metric(metric);
            sum += value;

            if value < stats.min {
                stats.min = value;
                stats.min_at = observation.timestamp;
            }
            if value > stats.max {
                stats.max = value;
                stats.max_at = observation.timestamp;
            }
        }
        stats.mean = sum / observations.len() as f64;

        stats
    }
}

impl Default for AirQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStatistics {
    pub fn metric(&self, metric: Metric) -> Option<&MetricStats> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    pub fn summary(&self) -> String {
        let (first, last) = self.time_range;
        format!(
            "Air Quality Parameters: PM2.5, PM10, SO2, NO2, CO, O3, TEMP, PRES\n\
            Records: {} total\n\
            Time Range: {} to {} ({} days)\n\
            Cleaning: {} values backfilled, {} rows dropped",
            self.total_records,
            first,
            last,
            last.signed_duration_since(first).num_days(),
            self.cleaning.total_backfilled(),
            self.cleaning.dropped_rows
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = format!("{}\n\nField Statistics:\n", self.summary());
        out.push_str(&format!(
            "  {:<6}{:>10}{:>10}{:>10}  {:<19}  {:<19}\n",
            "field", "min", "mean", "max", "min at", "max at"
        ));

        for m in &self.metrics {
            out.push_str(&format!(
                "  {:<6}{:>10.1}{:>10.1}{:>10.1}  {:<19}  {:<19}\n",
                m.metric.column(),
                m.min,
                m.mean,
                m.max,
                m.min_at.format("%Y-%m-%d %H:%M").to_string(),
                m.max_at.format("%Y-%m-%d %H:%M").to_string()
            ));
        }

        out.push('\n');
        out.push_str(&self.cleaning.summary());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pollutant, PollutantLevels, WeatherVariable, WindDirection};
    use chrono::{Duration, NaiveDate};

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let observations = (0..48)
            .map(|h| {
                Observation::new(
                    start + Duration::hours(h),
                    PollutantLevels::new(h as f64, 10.0, 5.0, 20.0, 300.0, 60.0),
                    -(h as f64) / 2.0,
                    1000.0,
                    WindDirection::N,
                )
            })
            .collect();

        Dataset::from_observations(observations)
    }

    #[test]
    fn test_statistics() -> Result<()> {
        let stats = AirQualityAnalyzer::new().analyze(&dataset())?;

        assert_eq!(stats.total_records, 48);
        assert_eq!(stats.time_range.1.to_string(), "2013-03-02 23:00:00");

        let pm25 = stats.metric(Pollutant::Pm25.into()).unwrap();
        assert_eq!(pm25.min, 0.0);
        assert_eq!(pm25.max, 47.0);
        assert_eq!(pm25.mean, 23.5);
        assert_eq!(pm25.max_at.to_string(), "2013-03-02 23:00:00");

        let temp = stats.metric(WeatherVariable::Temperature.into()).unwrap();
        assert_eq!(temp.min, -23.5);
        assert_eq!(temp.max, 0.0);

        Ok(())
    }

    #[test]
    fn test_summary_text() -> Result<()> {
        let stats = AirQualityAnalyzer::new().analyze(&dataset())?;
        let summary = stats.detailed_summary();

        assert!(summary.contains("Records: 48 total"));
        assert!(summary.contains("(1 days)"));
        assert!(summary.contains("PM2.5"));
        assert!(summary.contains("=== Cleaning Report ==="));

        Ok(())
    }

    #[test]
    fn test_constant_metric_points_at_range_start() -> Result<()> {
        let stats = AirQualityAnalyzer::new().analyze(&dataset())?;
        let pres = stats.metric(WeatherVariable::Pressure.into()).unwrap();

        assert_eq!(pres.min, 1000.0);
        assert_eq!(pres.max, 1000.0);
        assert_eq!(pres.min_at, stats.time_range.0);
        assert_eq!(pres.max_at, stats.time_range.0);

        Ok(())
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let result = AirQualityAnalyzer::new().analyze(&Dataset::from_observations(vec![]));
        assert!(matches!(result, Err(ProcessingError::MissingData(_))));
    }
}
