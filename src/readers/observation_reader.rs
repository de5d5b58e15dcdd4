use crate::error::{ProcessingError, Result};
use crate::models::{CleaningReport, Dataset, Metric, Observation, PollutantLevels};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, DROPPED_COLUMNS, MISSING_MARKERS, REQUIRED_COLUMNS};
use crate::utils::progress::ProgressReporter;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};
use validator::Validate;

const WIND_COLUMN: &str = "wd";

/// One CSV row as exported upstream. Measurement cells stay text until the
/// missing markers have been told apart from malformed numbers.
#[derive(Debug, Deserialize)]
struct RawRecord {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    #[serde(rename = "PM2.5")]
    pm25: Option<String>,
    #[serde(rename = "PM10")]
    pm10: Option<String>,
    #[serde(rename = "SO2")]
    so2: Option<String>,
    #[serde(rename = "NO2")]
    no2: Option<String>,
    #[serde(rename = "CO")]
    co: Option<String>,
    #[serde(rename = "O3")]
    o3: Option<String>,
    #[serde(rename = "TEMP")]
    temp: Option<String>,
    #[serde(rename = "PRES")]
    pres: Option<String>,
    #[serde(rename = "wd")]
    wind_direction: Option<String>,
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(cell))
}

/// `None` for a gap, an error for anything that is neither a gap nor a number.
fn parse_cell(cell: Option<String>, metric: Metric, line: u64) -> Result<Option<f64>> {
    let Some(cell) = cell.filter(|c| !is_missing(c)) else {
        return Ok(None);
    };

    let value: f64 = cell.trim().parse().map_err(|_| {
        ProcessingError::InvalidFormat(format!(
            "Line {}: malformed {} value '{}'",
            line,
            metric.column(),
            cell
        ))
    })?;

    // `nan` and `inf` spellings parse, but are not measurements
    Ok(value.is_finite().then_some(value))
}

/// A row with its timestamp resolved but gaps still open.
#[derive(Debug)]
struct PendingRow {
    line: u64,
    timestamp: NaiveDateTime,
    /// Numeric cells in `Metric::ALL` order
    values: [Option<f64>; 8],
    wind_direction: Option<String>,
}

impl PendingRow {
    fn from_raw(raw: RawRecord, line: u64) -> Result<Self> {
        let timestamp = NaiveDate::from_ymd_opt(raw.year, raw.month, raw.day)
            .and_then(|d| d.and_hms_opt(raw.hour, 0, 0))
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Line {}: invalid timestamp {}-{}-{} {}h",
                    line, raw.year, raw.month, raw.day, raw.hour
                ))
            })?;

        let cells = [
            raw.pm25, raw.pm10, raw.so2, raw.no2, raw.co, raw.o3, raw.temp, raw.pres,
        ];
        let mut values = [None; 8];
        for ((value, cell), metric) in values.iter_mut().zip(cells).zip(Metric::ALL) {
            *value = parse_cell(cell, metric, line)?;
        }

        let wind_direction = raw.wind_direction.filter(|wd| !is_missing(wd));

        Ok(Self {
            line,
            timestamp,
            values,
            wind_direction,
        })
    }

    fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some) && self.wind_direction.is_some()
    }

    fn into_observation(self) -> Result<Observation> {
        let [Some(pm25), Some(pm10), Some(so2), Some(no2), Some(co), Some(o3), Some(temp), Some(pres)] =
            self.values
        else {
            return Err(ProcessingError::MissingData(format!(
                "Line {}: numeric field still missing after cleaning",
                self.line
            )));
        };

        let wind_direction = self
            .wind_direction
            .as_deref()
            .ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "Line {}: wind direction still missing after cleaning",
                    self.line
                ))
            })?
            .parse()?;

        Ok(Observation::new(
            self.timestamp,
            PollutantLevels::new(pm25, pm10, so2, no2, co, o3),
            temp,
            pres,
            wind_direction,
        ))
    }
}

/// Copy the next valid value backward into every gap of one column.
/// Returns the number of cells filled; trailing gaps stay empty.
fn backfill_column<'a, T: Clone + 'a>(
    cells: impl DoubleEndedIterator<Item = &'a mut Option<T>>,
) -> usize {
    let mut next_valid: Option<T> = None;
    let mut filled = 0;

    for cell in cells.rev() {
        if cell.is_some() {
            next_valid = cell.clone();
            continue;
        }

        if next_valid.is_some() {
            *cell = next_valid.clone();
            filled += 1;
        }
    }

    filled
}

/// Loads the station CSV into a cleaned, immutable `Dataset`.
pub struct ObservationReader {
    validate_ranges: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            validate_ranges: true,
        }
    }

    pub fn with_validation(mut self, validate_ranges: bool) -> Self {
        self.validate_ranges = validate_ranges;
        self
    }

    /// Read and clean the dataset at `path`.
    pub fn read_dataset(&self, path: &Path, progress: Option<&ProgressReporter>) -> Result<Dataset> {
        if !path.is_file() {
            return Err(ProcessingError::InputNotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "Loading air quality dataset");
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, progress)
    }

    /// Read and clean a dataset from any CSV source.
    pub fn read_from<R: Read>(&self, source: R, progress: Option<&ProgressReporter>) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        self.check_schema(reader.headers()?)?;

        let mut rows = Vec::new();
        for (index, result) in reader.deserialize::<RawRecord>().enumerate() {
            // Header is line 1
            let line = index as u64 + 2;
            rows.push(PendingRow::from_raw(result?, line)?);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        if let Some(p) = progress {
            p.set_message("Cleaning observations...");
        }

        let (observations, report) = self.clean(rows)?;
        info!(
            rows_read = report.rows_read,
            rows_kept = observations.len(),
            backfilled = report.total_backfilled(),
            "Dataset loaded"
        );

        Ok(Dataset::new(observations, report))
    }

    /// Every required column must be present; identifier columns are ignored.
    fn check_schema(&self, headers: &csv::StringRecord) -> Result<()> {
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ProcessingError::MissingColumn(column.to_string()));
            }
        }

        let ignored: Vec<&str> = headers
            .iter()
            .filter(|h| DROPPED_COLUMNS.contains(h) || !REQUIRED_COLUMNS.contains(h))
            .collect();
        debug!(columns = ?ignored, "Ignoring non-analysis columns");

        Ok(())
    }

    fn clean(&self, mut rows: Vec<PendingRow>) -> Result<(Vec<Observation>, CleaningReport)> {
        rows.sort_by_key(|r| r.timestamp);

        let mut report = CleaningReport {
            rows_read: rows.len(),
            ..CleaningReport::default()
        };

        for (i, metric) in Metric::ALL.iter().enumerate() {
            let filled = backfill_column(rows.iter_mut().map(|r| &mut r.values[i]));
            debug!(column = metric.column(), filled, "Backfilled column");
            report.backfilled.insert(metric.column().to_string(), filled);
        }

        let filled = backfill_column(rows.iter_mut().map(|r| &mut r.wind_direction));
        debug!(column = WIND_COLUMN, filled, "Backfilled column");
        report.backfilled.insert(WIND_COLUMN.to_string(), filled);

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            if !row.is_complete() {
                warn!(line = row.line, timestamp = %row.timestamp, "Dropping row with unfillable gap");
                report.dropped_rows += 1;
                continue;
            }

            let line = row.line;
            let observation = row.into_observation()?;
            if self.validate_ranges {
                observation
                    .validate()
                    .inspect_err(|e| warn!(line, error = %e, "Observation out of range"))?;
            }
            observations.push(observation);
        }

        Ok((observations, report))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, Pollutant, WindDirection};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,DEWP,PRES,RAIN,wd,WSPM,station";

    fn csv_with(rows: &[&str]) -> String {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    #[test]
    fn test_backfill_column() {
        let mut cells = vec![None, Some(1.0), None, None, Some(4.0), None];
        let filled = backfill_column(cells.iter_mut());

        assert_eq!(filled, 3);
        assert_eq!(
            cells,
            vec![Some(1.0), Some(1.0), Some(4.0), Some(4.0), Some(4.0), None]
        );
    }

    #[test]
    fn test_read_clean_rows() -> Result<()> {
        let content = csv_with(&[
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,-18.8,1023,0,NNW,4.4,Dingling",
            "2,2013,3,1,1,8,8,4,7,300,77,-1.1,-18.2,1023.2,0,N,4.7,Dingling",
        ]);

        let dataset = ObservationReader::new().read_from(content.as_bytes(), None)?;

        assert_eq!(dataset.len(), 2);
        let first = &dataset.observations()[0];
        assert_eq!(first.timestamp.to_string(), "2013-03-01 00:00:00");
        assert_eq!(first.pollutants.get(Pollutant::Pm25), 4.0);
        assert_eq!(first.pressure, 1023.0);
        assert_eq!(first.wind_direction, WindDirection::Nnw);
        assert_eq!(dataset.report().total_backfilled(), 0);

        Ok(())
    }

    #[test]
    fn test_missing_values_are_backfilled() -> Result<()> {
        let content = csv_with(&[
            "1,2013,3,1,0,NA,4,4,7,300,77,-0.7,-18.8,1023,0,,4.4,Dingling",
            "2,2013,3,1,1,,8,4,7,300,77,-1.1,-18.2,1023.2,0,NA,4.7,Dingling",
            "3,2013,3,1,2,12,8,4,7,300,77,-1.1,-18.2,1023.2,0,SE,4.7,Dingling",
        ]);

        let dataset = ObservationReader::new().read_from(content.as_bytes(), None)?;

        assert_eq!(dataset.len(), 3);
        for observation in dataset.observations() {
            assert_eq!(observation.pollutants.pm25, 12.0);
            assert_eq!(observation.wind_direction, WindDirection::Se);
        }
        assert_eq!(dataset.report().backfilled["PM2.5"], 2);
        assert_eq!(dataset.report().backfilled["wd"], 2);
        assert_eq!(dataset.report().dropped_rows, 0);

        Ok(())
    }

    #[test]
    fn test_nan_cells_are_backfilled() -> Result<()> {
        let content = csv_with(&[
            "1,2013,3,1,0,NaN,4,4,7,300,nan,-0.7,-18.8,1023,0,N,4.4,Dingling",
            "2,2013,3,1,1,8,8,4,7,300,77,-1.1,-18.2,1023.2,0,N,4.7,Dingling",
        ]);

        let dataset = ObservationReader::new().read_from(content.as_bytes(), None)?;

        assert_eq!(dataset.len(), 2);
        let first = &dataset.observations()[0];
        assert_eq!(first.pollutants.pm25, 8.0);
        assert_eq!(first.pollutants.o3, 77.0);
        assert_eq!(dataset.report().backfilled["PM2.5"], 1);
        assert_eq!(dataset.report().backfilled["O3"], 1);

        let day = &dataset.aggregate(Granularity::Day)[0];
        assert_eq!(day.pollutants.pm25, 8.0);

        Ok(())
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        for bad in ["abc", "12..3"] {
            let row = format!(
                "1,2013,3,1,0,4,4,4,7,{},77,-0.7,-18.8,1023,0,N,4.4,Dingling",
                bad
            );
            let content = csv_with(&[row.as_str()]);
            let err = ObservationReader::new()
                .read_from(content.as_bytes(), None)
                .unwrap_err();

            assert!(
                matches!(err, ProcessingError::InvalidFormat(ref msg) if msg.contains("Line 2") && msg.contains("CO")),
                "unexpected error for {}: {}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_trailing_gap_drops_row() -> Result<()> {
        let content = csv_with(&[
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,-18.8,1023,0,N,4.4,Dingling",
            "2,2013,3,1,1,8,8,4,7,300,NA,-1.1,-18.2,1023.2,0,N,4.7,Dingling",
        ]);

        let dataset = ObservationReader::new().read_from(content.as_bytes(), None)?;

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.report().rows_read, 2);
        assert_eq!(dataset.report().dropped_rows, 1);

        Ok(())
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let content = "No,year,month,day,hour,PM2.5,PM10\n1,2013,3,1,0,4,4";
        let err = ObservationReader::new()
            .read_from(content.as_bytes(), None)
            .unwrap_err();

        assert!(matches!(err, ProcessingError::MissingColumn(ref c) if c == "SO2"));
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let content = csv_with(&["1,2013,2,30,0,4,4,4,7,300,77,-0.7,-18.8,1023,0,N,4.4,Dingling"]);
        let err = ObservationReader::new()
            .read_from(content.as_bytes(), None)
            .unwrap_err();

        assert!(matches!(err, ProcessingError::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_wind_code_is_rejected() {
        let content = csv_with(&["1,2013,3,1,0,4,4,4,7,300,77,-0.7,-18.8,1023,0,UP,4.4,Dingling"]);
        let err = ObservationReader::new()
            .read_from(content.as_bytes(), None)
            .unwrap_err();

        assert!(matches!(err, ProcessingError::InvalidWindDirection(_)));
    }

    #[test]
    fn test_range_validation_can_be_disabled() -> Result<()> {
        let content = csv_with(&["1,2013,3,1,0,-4,4,4,7,300,77,-0.7,-18.8,1023,0,N,4.4,Dingling"]);

        assert!(ObservationReader::new()
            .read_from(content.as_bytes(), None)
            .is_err());

        let dataset = ObservationReader::new()
            .with_validation(false)
            .read_from(content.as_bytes(), None)?;
        assert_eq!(dataset.len(), 1);

        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = ObservationReader::new()
            .read_dataset(Path::new("/nonexistent/main_data.csv"), None)
            .unwrap_err();

        assert!(matches!(err, ProcessingError::InputNotFound(_)));
    }

    #[test]
    fn test_read_dataset_from_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", HEADER)?;
        writeln!(
            temp_file,
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,-18.8,1023,0,NNW,4.4,Dingling"
        )?;

        let dataset = ObservationReader::new().read_dataset(temp_file.path(), None)?;
        assert_eq!(dataset.len(), 1);

        Ok(())
    }
}
