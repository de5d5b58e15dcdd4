use crate::analyzers::{AirQualityAnalyzer, CorrelationAnalyzer, WindAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::{Dataset, Granularity};
use crate::processors::{Aggregator, PeriodFilter, SeverityClassifier};
use crate::readers::ObservationReader;
use crate::settings::Settings;
use crate::utils::filename::generate_default_parquet_filename;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{
    render_buckets, render_category, render_period_summary, render_profile, render_series,
    to_json, OutputFormat, ParquetWriter,
};
use serde_json::json;
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        settings.input = input;
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }

    let json_output = settings.format == OutputFormat::Json;
    let classifier = SeverityClassifier::new();

    match cli.command {
        Commands::Summary => {
            let dataset = load_dataset(&settings)?;
            let stats = AirQualityAnalyzer::new().analyze(&dataset)?;

            if json_output {
                println!("{}", to_json(&stats)?);
            } else {
                println!("{}", stats.detailed_summary());
            }
        }

        Commands::Period {
            period,
            start,
            chart,
        } => {
            let dataset = load_dataset(&settings)?;
            let summary = PeriodFilter::new().summarize(&dataset, &start, period, &classifier)?;

            if json_output {
                println!("{}", to_json(&summary)?);
            } else {
                println!("{}", render_period_summary(&summary, &classifier));
                if let Some(pollutant) = chart {
                    println!(
                        "{}",
                        render_series(
                            &summary.buckets,
                            summary.granularity,
                            pollutant.into(),
                            settings.chart_width
                        )
                    );
                }
            }
        }

        Commands::Aggregate {
            granularity,
            output,
            export,
            compression,
        } => {
            let dataset = load_dataset(&settings)?;
            let buckets = dataset.aggregate(granularity);
            info!(%granularity, buckets = buckets.len(), "Aggregated dataset");

            let output =
                output.or_else(|| export.then(|| generate_default_parquet_filename(granularity)));
            match output {
                Some(path) => {
                    let compression = compression.unwrap_or_else(|| settings.compression.clone());
                    let writer = ParquetWriter::new()
                        .with_compression(&compression)?
                        .with_row_group_size(settings.row_group_size);

                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }

                    writer.write_buckets(buckets, granularity, &path)?;
                    if buckets.is_empty() {
                        println!("No buckets to write");
                    } else {
                        let file_info = writer.get_file_info(&path)?;
                        println!("Wrote {} buckets to {}", buckets.len(), path.display());
                        println!("\n{}", file_info.summary());
                    }
                }
                None if json_output => println!("{}", to_json(&buckets)?),
                None => println!("{}", render_buckets(buckets, granularity, &classifier)),
            }
        }

        Commands::Profile { start, end } => {
            let dataset = load_dataset(&settings)?;
            let start = PeriodFilter::parse_start(&start)?;
            let end = PeriodFilter::parse_start(&end)?;
            let profile = Aggregator::new().diurnal_profile(dataset.observations(), start, end);

            if json_output {
                println!("{}", to_json(&profile)?);
            } else {
                println!("Average pollution per hour of day, {} to {}", start, end);
                println!("{}", render_profile(&profile));
            }
        }

        Commands::Correlate { heatmap } => {
            let dataset = load_dataset(&settings)?;
            let analyzer = CorrelationAnalyzer::new();
            let report = analyzer.correlate(dataset.observations());
            let matrix = heatmap.then(|| analyzer.matrix(dataset.observations()));

            if json_output {
                println!("{}", to_json(&json!({ "correlations": report, "matrix": matrix }))?);
            } else {
                println!("{}", report.summary());
                if let Some(matrix) = matrix {
                    println!("{}", matrix.heatmap());
                }
            }
        }

        Commands::Wind => {
            let dataset = load_dataset(&settings)?;
            let stats = WindAnalyzer::new().frequencies(dataset.observations());

            if json_output {
                println!("{}", to_json(&stats)?);
            } else {
                println!("{}", stats.summary());
                println!("{}", stats.bar_chart(settings.chart_width));
            }
        }

        Commands::Classify { values } => {
            let category = classifier.classify_strs(&values)?;

            if json_output {
                println!("{}", to_json(&json!({ "category": category.label() }))?);
            } else {
                print!("{}", render_category(category));
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                let granularity = writer.read_granularity(&file)?.unwrap_or(Granularity::Hour);
                let buckets = writer.read_buckets(&file, sample)?;
                println!("\nSample Buckets (showing {} buckets):", buckets.len());
                println!("{}", render_buckets(&buckets, granularity, &classifier));
            }
        }
    }

    Ok(())
}

fn load_dataset(settings: &Settings) -> Result<Dataset> {
    let progress = ProgressReporter::new_spinner(
        "Loading observations...",
        settings.format == OutputFormat::Json,
    );

    let dataset = ObservationReader::new().read_dataset(&settings.input, Some(&progress))?;
    progress.finish_with_message(&format!("Loaded {} observations", dataset.len()));

    Ok(dataset)
}
