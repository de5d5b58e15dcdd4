/// Number of pollutant columns in the dataset
pub const POLLUTANT_COUNT: usize = 6;

/// File names
pub const DEFAULT_INPUT_FILE: &str = "main_data.csv";
pub const DEFAULT_CONFIG_FILE: &str = "aqp.toml";

/// Environment variable prefix for settings overrides (e.g. AQP_INPUT)
pub const ENV_PREFIX: &str = "AQP";

/// Columns that must be present in the source CSV header
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "wd",
];

/// Identifier columns present in the source but never used downstream
pub const DROPPED_COLUMNS: [&str; 2] = ["No", "station"];

/// Missing value markers written by the upstream export, matched case-insensitively
pub const MISSING_MARKERS: [&str; 3] = ["", "NA", "NaN"];

/// Period offsets in days (calendar-naive)
pub const DAILY_OFFSET_DAYS: i64 = 1;
pub const WEEKLY_OFFSET_DAYS: i64 = 7;
pub const MONTHLY_OFFSET_DAYS: i64 = 30;
pub const YEARLY_OFFSET_DAYS: i64 = 365;

/// Date format accepted for period start dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Correlation coefficients are reported to this many decimal places
pub const CORRELATION_DECIMALS: i32 = 2;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_CHART_WIDTH: usize = 40;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
