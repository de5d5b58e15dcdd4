pub mod air_quality_analyzer;
pub mod correlation;
pub mod wind_analyzer;

pub use air_quality_analyzer::{AirQualityAnalyzer, DatasetStatistics, MetricStats};
pub use correlation::{pearson, CorrelationAnalyzer, CorrelationMatrix, CorrelationReport};
pub use wind_analyzer::{WindAnalyzer, WindFrequency, WindStatistics};
