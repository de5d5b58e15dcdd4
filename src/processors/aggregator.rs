use crate::models::{
    AggregatedBucket, Granularity, HourlyProfile, Metric, Observation, Pollutant, PollutantLevels,
    WeatherVariable,
};
use crate::utils::stats::round_half_even;
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::collections::BTreeMap;
use tracing::debug;

/// Running sums of every numeric field for one group.
#[derive(Debug, Default, Clone)]
struct Accumulator {
    count: usize,
    sums: [f64; 8],
}

impl Accumulator {
    fn add(&mut self, observation: &Observation) {
        for (sum, metric) in self.sums.iter_mut().zip(Metric::ALL) {
            *sum += observation.metric(metric);
        }
        self.count += 1;
    }

    fn rounded_mean(&self, metric: Metric) -> f64 {
        round_half_even(self.sums[metric.index()] / self.count as f64)
    }

    fn pollutant_means(&self) -> PollutantLevels {
        let mut levels = PollutantLevels::default();
        for pollutant in Pollutant::ALL {
            levels.set(pollutant, self.rounded_mean(pollutant.into()));
        }
        levels
    }
}

/// Groups observations by time bucket and averages each field.
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// One bucket per distinct truncated timestamp, ascending. Means are
    /// rounded to the nearest integer, ties to even.
    pub fn aggregate(
        &self,
        observations: &[Observation],
        granularity: Granularity,
    ) -> Vec<AggregatedBucket> {
        let mut groups: BTreeMap<_, Accumulator> = BTreeMap::new();
        for observation in observations {
            groups
                .entry(granularity.truncate(observation.timestamp))
                .or_default()
                .add(observation);
        }

        debug!(
            %granularity,
            observations = observations.len(),
            buckets = groups.len(),
            "Aggregated observations"
        );

        groups
            .into_iter()
            .map(|(start, acc)| AggregatedBucket {
                start,
                observation_count: acc.count,
                pollutants: acc.pollutant_means(),
                temperature: acc.rounded_mean(WeatherVariable::Temperature.into()),
                pressure: acc.rounded_mean(WeatherVariable::Pressure.into()),
            })
            .collect()
    }

    /// Average pollution per hour of day for observations between `start`
    /// and `end` (both taken at midnight, inclusive).
    pub fn diurnal_profile(
        &self,
        observations: &[Observation],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<HourlyProfile> {
        let from = start.and_time(NaiveTime::MIN);
        let to = end.and_time(NaiveTime::MIN);

        let mut groups: BTreeMap<u32, Accumulator> = BTreeMap::new();
        for observation in observations
            .iter()
            .filter(|o| o.timestamp >= from && o.timestamp <= to)
        {
            groups
                .entry(observation.timestamp.hour())
                .or_default()
                .add(observation);
        }

        groups
            .into_iter()
            .map(|(hour, acc)| HourlyProfile {
                hour,
                observation_count: acc.count,
                pollutants: acc.pollutant_means(),
            })
            .collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
