pub mod bucket;
pub mod dataset;
pub mod observation;
pub mod severity;

pub use bucket::{AggregatedBucket, Granularity, HourlyProfile};
pub use dataset::{CleaningReport, Dataset};
pub use observation::{Metric, Observation, Pollutant, PollutantLevels, WeatherVariable, WindDirection};
pub use severity::SeverityCategory;
