use crate::error::{ProcessingError, Result};
use crate::models::{AggregatedBucket, Granularity, PollutantLevels};
use crate::processors::SeverityClassifier;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use clap::ValueEnum;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Exports aggregated buckets, one row per bucket.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write buckets of one granularity to a Parquet file
    pub fn write_buckets(
        &self,
        buckets: &[AggregatedBucket],
        granularity: Granularity,
        path: &Path,
    ) -> Result<()> {
        if buckets.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let batch = self.buckets_to_batch(buckets, granularity, schema.clone())?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        info!(path = %path.display(), rows = buckets.len(), "Wrote Parquet export");
        Ok(())
    }

    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new(
                "bucket_start",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
            Field::new("granularity", DataType::Utf8, false),
            Field::new("observation_count", DataType::UInt64, false),
            Field::new("pm25", DataType::Float64, false),
            Field::new("pm10", DataType::Float64, false),
            Field::new("so2", DataType::Float64, false),
            Field::new("no2", DataType::Float64, false),
            Field::new("co", DataType::Float64, false),
            Field::new("o3", DataType::Float64, false),
            Field::new("temp", DataType::Float64, false),
            Field::new("pres", DataType::Float64, false),
            Field::new("category", DataType::Utf8, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn buckets_to_batch(
        &self,
        buckets: &[AggregatedBucket],
        granularity: Granularity,
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let classifier = SeverityClassifier::new();
        let float_column = |f: fn(&AggregatedBucket) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(buckets.iter().map(f).collect::<Vec<f64>>()))
        };

        let starts: Vec<i64> = buckets
            .iter()
            .map(|b| b.start.and_utc().timestamp_millis())
            .collect();
        let granularities: Vec<String> = buckets.iter().map(|_| granularity.to_string()).collect();
        let counts: Vec<u64> = buckets.iter().map(|b| b.observation_count as u64).collect();
        let categories: Vec<String> = buckets
            .iter()
            .map(|b| classifier.classify_bucket(b).label().to_string())
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampMillisecondArray::from(starts)),
            Arc::new(StringArray::from(granularities)),
            Arc::new(UInt64Array::from(counts)),
            float_column(|b| b.pollutants.pm25),
            float_column(|b| b.pollutants.pm10),
            float_column(|b| b.pollutants.so2),
            float_column(|b| b.pollutants.no2),
            float_column(|b| b.pollutants.co),
            float_column(|b| b.pollutants.o3),
            float_column(|b| b.temperature),
            float_column(|b| b.pressure),
            Arc::new(StringArray::from(categories)),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read buckets back from an export, up to `limit` rows (0 = all)
    pub fn read_buckets(&self, path: &Path, limit: usize) -> Result<Vec<AggregatedBucket>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut buckets = Vec::new();
        for batch in reader {
            let batch = batch?;

            let starts = column::<TimestampMillisecondArray>(&batch, "bucket_start")?;
            let counts = column::<UInt64Array>(&batch, "observation_count")?;
            let floats = [
                "pm25", "pm10", "so2", "no2", "co", "o3", "temp", "pres",
            ]
            .map(|name| column::<Float64Array>(&batch, name));
            let [pm25, pm10, so2, no2, co, o3, temp, pres] = floats;
            let (pm25, pm10, so2, no2, co, o3, temp, pres) =
                (pm25?, pm10?, so2?, no2?, co?, o3?, temp?, pres?);

            for i in 0..batch.num_rows() {
                if limit > 0 && buckets.len() >= limit {
                    return Ok(buckets);
                }

                let start = DateTime::from_timestamp_millis(starts.value(i))
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat(
                            "Invalid bucket timestamp in Parquet file".to_string(),
                        )
                    })?;

                buckets.push(AggregatedBucket {
                    start,
                    observation_count: counts.value(i) as usize,
                    pollutants: PollutantLevels::new(
                        pm25.value(i),
                        pm10.value(i),
                        so2.value(i),
                        no2.value(i),
                        co.value(i),
                        o3.value(i),
                    ),
                    temperature: temp.value(i),
                    pressure: pres.value(i),
                });
            }
        }

        Ok(buckets)
    }

    /// Granularity recorded in an export; `None` for an empty file.
    pub fn read_granularity(&self, path: &Path) -> Result<Option<Granularity>> {
        let file = File::open(path)?;
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let Some(batch) = reader.next().transpose()? else {
            return Ok(None);
        };
        let labels = column::<StringArray>(&batch, "granularity")?;
        if labels.is_empty() {
            return Ok(None);
        }

        Granularity::from_str(labels.value(0), true)
            .map(Some)
            .map_err(ProcessingError::InvalidFormat)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<A>())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Missing or mistyped column: {}", name))
        })
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::NamedTempFile;

    fn buckets(n: i64) -> Vec<AggregatedBucket> {
        let start = NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        (0..n)
            .map(|d| AggregatedBucket {
                start: start + Duration::days(d),
                observation_count: 24,
                pollutants: PollutantLevels::new(
                    10.0 + d as f64,
                    20.0,
                    5.0,
                    30.0,
                    400.0,
                    60.0,
                ),
                temperature: -2.0,
                pressure: 1021.0,
            })
            .collect()
    }

    #[test]
    fn test_write_empty_buckets() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let result = writer.write_buckets(&[], Granularity::Day, temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let original = buckets(10);

        writer.write_buckets(&original, Granularity::Day, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 10);

        let read = writer.read_buckets(temp_file.path(), 0)?;
        assert_eq!(read, original);

        let sample = writer.read_buckets(temp_file.path(), 3)?;
        assert_eq!(sample.len(), 3);

        assert_eq!(
            writer.read_granularity(temp_file.path())?,
            Some(Granularity::Day)
        );

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new().unwrap();

            let result = writer.write_buckets(&buckets(2), Granularity::Day, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        Ok(())
    }

    #[test]
    fn test_unknown_compression() {
        assert!(matches!(
            ParquetWriter::new().with_compression("brotli-ish"),
            Err(ProcessingError::Config(_))
        ));
    }
}
