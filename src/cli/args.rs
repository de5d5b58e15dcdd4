use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{Granularity, Pollutant};
use crate::processors::Period;
use crate::writers::OutputFormat;

#[derive(Parser)]
#[command(name = "aqp")]
#[command(about = "Air quality dataset processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Input CSV file [default: main_data.csv]")]
    pub input: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: aqp.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum, help = "Output format")]
    pub format: Option<OutputFormat>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show dataset statistics and the cleaning report
    Summary,

    /// Show aggregated buckets for one period and its severity category
    Period {
        #[arg(short, long, value_enum)]
        period: Period,

        #[arg(short, long, help = "Start date (YYYY-MM-DD)")]
        start: String,

        #[arg(long, value_enum, help = "Also chart this pollutant across the period")]
        chart: Option<PollutantArg>,
    },

    /// Aggregate the whole dataset by time bucket, optionally exporting to Parquet
    Aggregate {
        #[arg(short, long, value_enum, default_value = "day")]
        granularity: Granularity,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/air-quality-{granularity}-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Write the default Parquet file when no --output is given")]
        export: bool,

        #[arg(short, long)]
        compression: Option<String>,
    },

    /// Average pollution per hour of day between two dates (inclusive)
    Profile {
        #[arg(short, long, help = "Start date (YYYY-MM-DD)")]
        start: String,

        #[arg(short, long, help = "End date (YYYY-MM-DD)")]
        end: String,
    },

    /// Correlate pollutants with temperature and pressure
    Correlate {
        #[arg(long, help = "Also print the full correlation heatmap")]
        heatmap: bool,
    },

    /// Wind direction frequency table and bar chart
    Wind,

    /// Classify six pollutant values: PM2.5,PM10,SO2,NO2,CO,O3
    Classify {
        #[arg(long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Display information about an exported Parquet file
    Info {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, default_value = "10")]
        sample: usize,
    },
}

/// Pollutant names as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PollutantArg {
    #[value(name = "pm25")]
    Pm25,
    #[value(name = "pm10")]
    Pm10,
    So2,
    No2,
    Co,
    O3,
}

impl From<PollutantArg> for Pollutant {
    fn from(arg: PollutantArg) -> Self {
        match arg {
            PollutantArg::Pm25 => Pollutant::Pm25,
            PollutantArg::Pm10 => Pollutant::Pm10,
            PollutantArg::So2 => Pollutant::So2,
            PollutantArg::No2 => Pollutant::No2,
            PollutantArg::Co => Pollutant::Co,
            PollutantArg::O3 => Pollutant::O3,
        }
    }
}
