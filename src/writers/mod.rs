pub mod parquet_writer;
pub mod table_writer;

pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use table_writer::{
    render_buckets, render_category, render_period_summary, render_profile, render_series,
    to_json, OutputFormat,
};
