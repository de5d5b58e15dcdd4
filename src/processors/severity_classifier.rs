use crate::error::{ProcessingError, Result};
use crate::models::{AggregatedBucket, PollutantLevels, SeverityCategory};

/// Lower bounds for one severity tier. A reading reaches the tier when any
/// single pollutant meets or exceeds its bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityTier {
    pub category: SeverityCategory,
    pub thresholds: PollutantLevels,
}

impl SeverityTier {
    pub fn matches(&self, levels: &PollutantLevels) -> bool {
        levels
            .iter()
            .any(|(pollutant, value)| value >= self.thresholds.get(pollutant))
    }
}

/// Thresholds in PM2.5, PM10, SO2, NO2, CO, O3 order, most severe first.
const TIERS: [(SeverityCategory, [f64; 6]); 5] = [
    (
        SeverityCategory::Berbahaya,
        [250.0, 420.0, 2620.0, 1130.0, 60.0, 800.0],
    ),
    (
        SeverityCategory::SangatTidakSehat,
        [150.0, 355.0, 1310.0, 565.0, 30.0, 400.0],
    ),
    (
        SeverityCategory::TidakSehat,
        [115.0, 250.0, 800.0, 375.0, 17.0, 300.0],
    ),
    (
        SeverityCategory::TidakSehatBagiKelompokSensitif,
        [75.0, 150.0, 365.0, 188.0, 9.0, 180.0],
    ),
    (
        SeverityCategory::Sedang,
        [35.0, 50.0, 80.0, 100.0, 4.0, 120.0],
    ),
];

/// Maps six pollutant means to a severity category. Total: anything below
/// every tier is `Baik`.
pub struct SeverityClassifier {
    tiers: Vec<SeverityTier>,
}

impl SeverityClassifier {
    pub fn new() -> Self {
        let tiers = TIERS
            .iter()
            .map(|(category, t)| SeverityTier {
                category: *category,
                thresholds: PollutantLevels::new(t[0], t[1], t[2], t[3], t[4], t[5]),
            })
            .collect();

        Self { tiers }
    }

    pub fn tiers(&self) -> &[SeverityTier] {
        &self.tiers
    }

    pub fn classify(&self, levels: &PollutantLevels) -> SeverityCategory {
        self.tiers
            .iter()
            .find(|tier| tier.matches(levels))
            .map_or(SeverityCategory::Baik, |tier| tier.category)
    }

    /// Classify six values in column order; fails on a wrong count or NaN.
    pub fn classify_values(&self, values: &[f64]) -> Result<SeverityCategory> {
        let levels = PollutantLevels::from_slice(values)?;
        Ok(self.classify(&levels))
    }

    /// Classify six textual values, rejecting anything that is not a number.
    pub fn classify_strs<S: AsRef<str>>(&self, values: &[S]) -> Result<SeverityCategory> {
        let parsed = values
            .iter()
            .map(|v| {
                let v = v.as_ref().trim();
                v.parse::<f64>()
                    .map_err(|_| ProcessingError::NonNumeric(v.to_string()))
            })
            .collect::<Result<Vec<f64>>>()?;

        self.classify_values(&parsed)
    }

    pub fn classify_bucket(&self, bucket: &AggregatedBucket) -> SeverityCategory {
        self.classify(&bucket.pollutants)
    }
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pollutant;

    #[test]
    fn test_sedang_example() {
        let classifier = SeverityClassifier::new();
        let category = classifier
            .classify_values(&[40.0, 60.0, 10.0, 20.0, 1.0, 50.0])
            .unwrap();

        assert_eq!(category, SeverityCategory::Sedang);
        assert_eq!(category.label(), "Sedang");
    }

    #[test]
    fn test_default_is_baik() {
        let classifier = SeverityClassifier::new();
        assert_eq!(
            classifier.classify(&PollutantLevels::default()),
            SeverityCategory::Baik
        );
        assert_eq!(
            classifier.classify(&PollutantLevels::new(34.0, 49.0, 79.0, 99.0, 3.0, 119.0)),
            SeverityCategory::Baik
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let classifier = SeverityClassifier::new();

        for tier in classifier.tiers() {
            for pollutant in Pollutant::ALL {
                let mut levels = PollutantLevels::default();
                levels.set(pollutant, tier.thresholds.get(pollutant));
                assert_eq!(classifier.classify(&levels), tier.category, "{}", pollutant);
            }
        }
    }

    #[test]
    fn test_any_single_pollutant_escalates() {
        let classifier = SeverityClassifier::new();

        // Only CO is dangerous
        let levels = PollutantLevels::new(1.0, 1.0, 1.0, 1.0, 60.0, 1.0);
        assert_eq!(classifier.classify(&levels), SeverityCategory::Berbahaya);

        // O3 decides between tiers
        let levels = PollutantLevels::new(80.0, 1.0, 1.0, 1.0, 1.0, 310.0);
        assert_eq!(classifier.classify(&levels), SeverityCategory::TidakSehat);
    }

    #[test]
    fn test_classifier_is_monotonic() {
        let classifier = SeverityClassifier::new();
        let base = PollutantLevels::new(30.0, 45.0, 70.0, 90.0, 3.0, 100.0);

        for pollutant in Pollutant::ALL {
            let mut previous = classifier.classify(&base);
            let mut levels = base;
            for step in 1..=400 {
                levels.set(pollutant, base.get(pollutant) + step as f64 * 7.5);
                let current = classifier.classify(&levels);
                assert!(current >= previous, "{} at step {}", pollutant, step);
                previous = current;
            }
        }
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let classifier = SeverityClassifier::new();

        assert!(matches!(
            classifier.classify_values(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            Err(ProcessingError::ValueCount { expected: 6, found: 5 })
        ));
        assert!(classifier.classify_values(&[]).is_err());
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let classifier = SeverityClassifier::new();

        assert!(matches!(
            classifier.classify_strs(&["40", "60", "ten", "20", "1", "50"]),
            Err(ProcessingError::NonNumeric(ref v)) if v == "ten"
        ));
        assert!(matches!(
            classifier.classify_values(&[40.0, f64::NAN, 10.0, 20.0, 1.0, 50.0]),
            Err(ProcessingError::NonNumeric(_))
        ));
        assert_eq!(
            classifier
                .classify_strs(&["40", " 60 ", "10", "20", "1", "50"])
                .unwrap(),
            SeverityCategory::Sedang
        );
    }
}
