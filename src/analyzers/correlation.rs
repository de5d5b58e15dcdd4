use crate::models::{Metric, Observation, Pollutant, WeatherVariable};
use crate::utils::constants::CORRELATION_DECIMALS;
use crate::utils::stats::round_to;
use serde::Serialize;
use std::collections::BTreeMap;

/// Pearson correlation coefficient of two equally long series.
///
/// Returns NaN for fewer than two points or when either series has zero
/// variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return f64::NAN;
    }

    (covariance / (variance_x * variance_y).sqrt()).clamp(-1.0, 1.0)
}

/// Coefficient of each pollutant against each weather variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub by_weather: BTreeMap<WeatherVariable, BTreeMap<Pollutant, f64>>,
}

impl CorrelationReport {
    pub fn get(&self, weather: WeatherVariable, pollutant: Pollutant) -> Option<f64> {
        self.by_weather.get(&weather)?.get(&pollutant).copied()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Pollutant / Weather Correlation (Pearson) ===\n");
        summary.push_str(&format!("{:<8}", "Metric"));
        for weather in self.by_weather.keys() {
            summary.push_str(&format!("{:>8}", weather.column()));
        }
        summary.push('\n');

        for pollutant in Pollutant::ALL {
            summary.push_str(&format!("{:<8}", pollutant.column()));
            for coefficients in self.by_weather.values() {
                summary.push_str(&format!(
                    "{:>8}",
                    format_coefficient(coefficients.get(&pollutant).copied().unwrap_or(f64::NAN))
                ));
            }
            summary.push('\n');
        }

        summary
    }
}

/// Symmetric coefficient matrix over every numeric field, for the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: Metric, column: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == row)?;
        let j = self.metrics.iter().position(|m| *m == column)?;
        Some(self.values[i][j])
    }

    /// Text heatmap: coefficients with a shade glyph per cell.
    pub fn heatmap(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{:<7}", ""));
        for metric in &self.metrics {
            out.push_str(&format!("{:>8}", metric.column()));
        }
        out.push('\n');

        for (metric, row) in self.metrics.iter().zip(&self.values) {
            out.push_str(&format!("{:<7}", metric.column()));
            for value in row {
                out.push_str(&format!("{:>7}{}", format_coefficient(*value), shade(*value)));
            }
            out.push('\n');
        }

        out.push_str("\nShade: █ |r|>=0.75  ▓ >=0.5  ▒ >=0.25  ░ <0.25  ? undefined\n");
        out
    }
}

fn shade(value: f64) -> char {
    match value.abs() {
        v if v.is_nan() => '?',
        v if v >= 0.75 => '█',
        v if v >= 0.5 => '▓',
        v if v >= 0.25 => '▒',
        _ => '░',
    }
}

pub fn format_coefficient(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Computes rounded Pearson coefficients over the cleaned observations.
pub struct CorrelationAnalyzer {
    decimals: i32,
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self {
            decimals: CORRELATION_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: i32) -> Self {
        self.decimals = decimals;
        self
    }

    fn column(observations: &[Observation], metric: Metric) -> Vec<f64> {
        observations.iter().map(|o| o.metric(metric)).collect()
    }

    pub fn coefficient(&self, observations: &[Observation], a: Metric, b: Metric) -> f64 {
        let x = Self::column(observations, a);
        let y = Self::column(observations, b);
        round_to(pearson(&x, &y), self.decimals)
    }

    pub fn correlate(&self, observations: &[Observation]) -> CorrelationReport {
        let pollutant_columns: Vec<(Pollutant, Vec<f64>)> = Pollutant::ALL
            .into_iter()
            .map(|p| (p, Self::column(observations, p.into())))
            .collect();

        let by_weather = WeatherVariable::ALL
            .into_iter()
            .map(|weather| {
                let w = Self::column(observations, weather.into());
                let coefficients: BTreeMap<Pollutant, f64> = pollutant_columns
                    .iter()
                    .map(|(p, x)| (*p, round_to(pearson(x, &w), self.decimals)))
                    .collect();
                (weather, coefficients)
            })
            .collect();

        CorrelationReport { by_weather }
    }

    pub fn matrix(&self, observations: &[Observation]) -> CorrelationMatrix {
        let metrics = Metric::ALL.to_vec();
        let columns: Vec<Vec<f64>> = metrics
            .iter()
            .map(|m| Self::column(observations, *m))
            .collect();

        let values: Vec<Vec<f64>> = columns
            .iter()
            .map(|x| {
                columns
                    .iter()
                    .map(|y| round_to(pearson(x, y), self.decimals))
                    .collect()
            })
            .collect();

        CorrelationMatrix { metrics, values }
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PollutantLevels, WindDirection};
    use chrono::{Duration, NaiveDate};

    fn observations(n: i64) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        (0..n)
            .map(|i| {
                let t = i as f64;
                Observation::new(
                    start + Duration::hours(i),
                    // PM2.5 rises with temperature, O3 falls with it, CO is constant
                    PollutantLevels::new(2.0 * t + 1.0, (t * 7.0) % 13.0, 5.0 + t, 40.0, 300.0, 100.0 - t),
                    t,
                    1000.0 + (i % 3) as f64,
                    WindDirection::N,
                )
            })
            .collect()
    }

    #[test]
    fn test_pearson_basics() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
        assert!(pearson(&[1.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_correlation_report() {
        let report = CorrelationAnalyzer::new().correlate(&observations(50));

        assert_eq!(report.get(WeatherVariable::Temperature, Pollutant::Pm25), Some(1.0));
        assert_eq!(report.get(WeatherVariable::Temperature, Pollutant::O3), Some(-1.0));
        assert!(report
            .get(WeatherVariable::Temperature, Pollutant::Co)
            .unwrap()
            .is_nan());
        assert_eq!(report.by_weather.len(), 2);
        assert_eq!(report.by_weather[&WeatherVariable::Pressure].len(), 6);
    }

    #[test]
    fn test_coefficients_are_rounded() {
        let report = CorrelationAnalyzer::new().correlate(&observations(50));

        for coefficients in report.by_weather.values() {
            for value in coefficients.values().filter(|v| !v.is_nan()) {
                assert_eq!(*value, round_to(*value, 2));
                assert!((-1.0..=1.0).contains(value));
            }
        }
    }

    #[test]
    fn test_self_correlation_is_one() {
        let observations = observations(50);
        let analyzer = CorrelationAnalyzer::new();

        for pollutant in Pollutant::ALL {
            let value = analyzer.coefficient(&observations, pollutant.into(), pollutant.into());
            if pollutant == Pollutant::Co || pollutant == Pollutant::No2 {
                assert!(value.is_nan(), "{}", pollutant);
            } else {
                assert_eq!(value, 1.0, "{}", pollutant);
            }
        }
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let matrix = CorrelationAnalyzer::new().matrix(&observations(30));

        assert_eq!(matrix.metrics.len(), 8);
        for i in 0..8 {
            for j in 0..8 {
                let (a, b) = (matrix.values[i][j], matrix.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }

        let heatmap = matrix.heatmap();
        assert!(heatmap.contains("PM2.5"));
        assert!(heatmap.contains("NaN"));
    }

    #[test]
    fn test_summary_layout() {
        let summary = CorrelationAnalyzer::new().correlate(&observations(20)).summary();

        assert!(summary.contains("TEMP"));
        assert!(summary.contains("PRES"));
        assert!(summary.contains("1.00"));
        assert!(summary.contains("-1.00"));
    }
}
