use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::observation::{Metric, Pollutant, PollutantLevels, WeatherVariable};

/// Width of an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Hour,
        Granularity::Day,
        Granularity::Month,
        Granularity::Year,
    ];

    /// Truncate a timestamp to the start of the bucket containing it.
    pub fn truncate(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let date = timestamp.date();
        match self {
            Granularity::Hour => date.and_time(
                NaiveTime::from_hms_opt(timestamp.hour(), 0, 0).unwrap_or(NaiveTime::MIN),
            ),
            Granularity::Day => date.and_time(NaiveTime::MIN),
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN),
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN),
        }
    }

    /// Display format for a bucket start at this granularity.
    pub fn label_format(&self) -> &'static str {
        match self {
            Granularity::Hour => "%Y-%m-%d %H:00",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Month => "%Y-%m",
            Granularity::Year => "%Y",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        };
        f.write_str(name)
    }
}

/// Rounded means of every numeric field over the observations in one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub start: NaiveDateTime,
    pub observation_count: usize,
    pub pollutants: PollutantLevels,
    pub temperature: f64,
    pub pressure: f64,
}

impl AggregatedBucket {
    pub fn weather(&self, variable: WeatherVariable) -> f64 {
        match variable {
            WeatherVariable::Temperature => self.temperature,
            WeatherVariable::Pressure => self.pressure,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Pollutant(p) => self.pollutants.get(p),
            Metric::Weather(w) => self.weather(w),
        }
    }

    pub fn label(&self, granularity: Granularity) -> String {
        self.start.format(granularity.label_format()).to_string()
    }
}

/// Rounded pollutant means for one hour of the day across a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyProfile {
    pub hour: u32,
    pub observation_count: usize,
    pub pollutants: PollutantLevels,
}

impl HourlyProfile {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.pollutants.get(pollutant)
    }
}
