use crate::error::Result;
use crate::models::{AggregatedBucket, Dataset, Granularity, Pollutant, PollutantLevels, SeverityCategory};
use crate::processors::SeverityClassifier;
use crate::utils::constants::{
    DAILY_OFFSET_DAYS, DATE_FORMAT, MONTHLY_OFFSET_DAYS, WEEKLY_OFFSET_DAYS, YEARLY_OFFSET_DAYS,
};
use crate::utils::stats::mean;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Reporting period picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// Fixed window length. Months are 30 days and years 365 days regardless
    /// of the calendar.
    pub fn offset(&self) -> Duration {
        let days = match self {
            Period::Daily => DAILY_OFFSET_DAYS,
            Period::Weekly => WEEKLY_OFFSET_DAYS,
            Period::Monthly => MONTHLY_OFFSET_DAYS,
            Period::Yearly => YEARLY_OFFSET_DAYS,
        };
        Duration::days(days)
    }

    /// Bucket width shown for this period.
    pub fn bucket_granularity(&self) -> Granularity {
        match self {
            Period::Daily => Granularity::Hour,
            Period::Weekly | Period::Monthly => Granularity::Day,
            Period::Yearly => Granularity::Month,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Filtered buckets for one period plus the severity of their overall mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub granularity: Granularity,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub buckets: Vec<AggregatedBucket>,
    /// Unrounded mean of the bucket values; `None` when no bucket matched
    pub mean_levels: Option<PollutantLevels>,
    pub category: Option<SeverityCategory>,
}

impl PeriodSummary {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Selects aggregated buckets inside `[start, start + period offset)`.
pub struct PeriodFilter;

impl PeriodFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_start(start: &str) -> Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(start.trim(), DATE_FORMAT)?)
    }

    /// Half-open window for a start date and period.
    pub fn window(start: NaiveDate, period: Period) -> (NaiveDateTime, NaiveDateTime) {
        let from = start.and_time(NaiveTime::MIN);
        (from, from + period.offset())
    }

    /// Parse `start` and filter. An empty result is not an error.
    pub fn filter(
        &self,
        buckets: &[AggregatedBucket],
        start: &str,
        period: Period,
    ) -> Result<Vec<AggregatedBucket>> {
        let start = Self::parse_start(start)?;
        Ok(self.filter_from(buckets, start, period))
    }

    pub fn filter_from(
        &self,
        buckets: &[AggregatedBucket],
        start: NaiveDate,
        period: Period,
    ) -> Vec<AggregatedBucket> {
        let (from, to) = Self::window(start, period);
        let selected: Vec<AggregatedBucket> = buckets
            .iter()
            .filter(|b| b.start >= from && b.start < to)
            .copied()
            .collect();

        debug!(%from, %to, selected = selected.len(), "Filtered buckets");
        selected
    }

    /// Filter the dataset's buckets at the period's natural granularity and
    /// classify their mean.
    pub fn summarize(
        &self,
        dataset: &Dataset,
        start: &str,
        period: Period,
        classifier: &SeverityClassifier,
    ) -> Result<PeriodSummary> {
        let start = Self::parse_start(start)?;
        let granularity = period.bucket_granularity();
        let buckets = self.filter_from(dataset.aggregate(granularity), start, period);
        let (from, to) = Self::window(start, period);

        let mean_levels = mean_of_buckets(&buckets);
        let category = mean_levels.as_ref().map(|levels| classifier.classify(levels));

        info!(
            %period,
            %from,
            buckets = buckets.len(),
            category = category.map_or("-", |c| c.label()),
            "Summarized period"
        );

        Ok(PeriodSummary {
            period,
            granularity,
            start: from,
            end: to,
            buckets,
            mean_levels,
            category,
        })
    }
}

impl Default for PeriodFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_of_buckets(buckets: &[AggregatedBucket]) -> Option<PollutantLevels> {
    let mut levels = PollutantLevels::default();
    for pollutant in Pollutant::ALL {
        levels.set(pollutant, mean(buckets.iter().map(|b| b.pollutants.get(pollutant)))?);
    }
    Some(levels)
}
