use air_quality_processor::cli::{run, Cli};
use air_quality_processor::error::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
