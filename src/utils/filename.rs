use chrono::{Datelike, Local};
use std::path::PathBuf;

use crate::models::Granularity;

/// Generate default export filename with format: air-quality-{granularity}-{YYMMDD}.parquet
pub fn generate_default_parquet_filename(granularity: Granularity) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "air-quality-{}-{:02}{:02}{:02}.parquet",
        granularity, year, month, day
    );
    PathBuf::from("output").join(filename)
}
