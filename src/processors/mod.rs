pub mod aggregator;
pub mod period_filter;
pub mod severity_classifier;

pub use aggregator::Aggregator;
pub use period_filter::{Period, PeriodFilter, PeriodSummary};
pub use severity_classifier::{SeverityClassifier, SeverityTier};
