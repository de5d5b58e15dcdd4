use crate::error::Result;
use crate::models::{AggregatedBucket, Granularity, HourlyProfile, Pollutant, SeverityCategory};
use crate::processors::{PeriodSummary, SeverityClassifier};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Pretty-printed JSON for any report.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn header(first: &str, width: usize) -> String {
    let mut line = format!("{:<width$}", first, width = width);
    for pollutant in Pollutant::ALL {
        line.push_str(&format!("{:>8}", pollutant.column()));
    }
    line
}

/// Bucket table: one row per bucket with every rounded mean and its category.
pub fn render_buckets(
    buckets: &[AggregatedBucket],
    granularity: Granularity,
    classifier: &SeverityClassifier,
) -> String {
    if buckets.is_empty() {
        return "No data for the selected range\n".to_string();
    }

    let width = granularity.label_format().len() + 4;
    let mut out = header(granularity.to_string().as_str(), width);
    out.push_str(&format!("{:>8}{:>8}{:>6}  {}\n", "TEMP", "PRES", "n", "category"));

    for bucket in buckets {
        out.push_str(&format!("{:<width$}", bucket.label(granularity), width = width));
        for (_, value) in bucket.pollutants.iter() {
            out.push_str(&format!("{:>8}", value));
        }
        out.push_str(&format!(
            "{:>8}{:>8}{:>6}  {}\n",
            bucket.temperature,
            bucket.pressure,
            bucket.observation_count,
            classifier.classify_bucket(bucket)
        ));
    }

    out
}

pub fn render_period_summary(summary: &PeriodSummary, classifier: &SeverityClassifier) -> String {
    let mut out = format!(
        "=== {} period {} to {} ({} buckets by {}) ===\n",
        summary.period,
        summary.start.format("%Y-%m-%d"),
        summary.end.format("%Y-%m-%d"),
        summary.buckets.len(),
        summary.granularity
    );

    out.push_str(&render_buckets(&summary.buckets, summary.granularity, classifier));

    if let (Some(levels), Some(category)) = (summary.mean_levels, summary.category) {
        out.push_str("\nPeriod mean:");
        for (pollutant, value) in levels.iter() {
            out.push_str(&format!(" {}={:.1}", pollutant, value));
        }
        out.push_str(&format!("\nKategori kualitas udara: {}\n", category));
    }

    out
}

pub fn render_profile(profile: &[HourlyProfile]) -> String {
    if profile.is_empty() {
        return "No data for the selected range\n".to_string();
    }

    let mut out = header("hour", 6);
    out.push_str(&format!("{:>6}\n", "n"));
    for row in profile {
        out.push_str(&format!("{:<6}", format!("{:02}", row.hour)));
        for (_, value) in row.pollutants.iter() {
            out.push_str(&format!("{:>8}", value));
        }
        out.push_str(&format!("{:>6}\n", row.observation_count));
    }
    out
}

pub fn render_category(category: SeverityCategory) -> String {
    format!("Kategori kualitas udara: {}\n", category)
}

/// Text line chart of one pollutant across buckets: one row per bucket,
/// bar length proportional to the value.
pub fn render_series(
    buckets: &[AggregatedBucket],
    granularity: Granularity,
    pollutant: Pollutant,
    width: usize,
) -> String {
    let max = buckets
        .iter()
        .map(|b| b.pollutants.get(pollutant))
        .fold(0.0_f64, f64::max);

    let mut out = format!("{} by {}\n", pollutant, granularity);
    for bucket in buckets {
        let value = bucket.pollutants.get(pollutant);
        let length = if max > 0.0 {
            (value / max * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{} |{} {}\n",
            bucket.label(granularity),
            "*".repeat(length),
            value
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PollutantLevels;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn bucket(day: u32, pm25: f64) -> AggregatedBucket {
        AggregatedBucket {
            start: NaiveDate::from_ymd_opt(2013, 3, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            observation_count: 24,
            pollutants: PollutantLevels::new(pm25, 60.0, 10.0, 20.0, 1.0, 50.0),
            temperature: 3.0,
            pressure: 1020.0,
        }
    }

    #[test]
    fn test_render_buckets() {
        let out = render_buckets(
            &[bucket(1, 40.0), bucket(2, 300.0)],
            Granularity::Day,
            &SeverityClassifier::new(),
        );
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("day"));
        assert!(lines[1].starts_with("2013-03-01"));
        assert!(lines[1].ends_with("Sedang"));
        assert!(lines[2].ends_with("Berbahaya"));
    }

    #[test]
    fn test_render_empty_buckets() {
        let out = render_buckets(&[], Granularity::Hour, &SeverityClassifier::new());
        assert_eq!(out, "No data for the selected range\n");
    }

    #[test]
    fn test_render_series() {
        let out = render_series(
            &[bucket(1, 10.0), bucket(2, 20.0)],
            Granularity::Day,
            Pollutant::Pm25,
            4,
        );

        assert_eq!(
            out,
            "PM2.5 by day\n2013-03-01 |** 10\n2013-03-02 |**** 20\n"
        );
    }

    #[test]
    fn test_json_output() -> Result<()> {
        let json = to_json(&bucket(1, 40.0))?;

        assert!(json.contains("\"observation_count\": 24"));
        assert!(json.contains("\"pm25\": 40.0"));
        Ok(())
    }
}
