mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::Path;

use chrono::prelude::*;
use clap::Parser;

use common::config::builder::ExportConfig;
use common::helpers::run;
use log::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Along-track altimetry preparation for DIVA",
    long_about = "Collects the along-track altimetry files of several missions over a period centered on a date \
and writes them as a raw point file and as a DIVA data file weighted by the time distance to the center of the period."
)]
struct Args {
    #[arg(
        required = true,
        help = "Center date of the period in the format YYYYMMDD",
        index = 1
    )]
    date: String,

    #[arg(required = true, help = "Path to the configuration file", index = 2)]
    config_path: String,
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let date_str = args.date;
    let config_path_str = args.config_path;

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    if !Path::new(&config_path_str).is_file() {
        return Err(format!("Config file {} is not a file", config_path_str).into());
    }

    let date = NaiveDate::parse_from_str(&date_str, "%Y%m%d")
        .map_err(|_| format!("Could not parse date '{}'", date_str))?;

    let config = ExportConfig::from_file(&config_path_str)
        .map_err(|err| format!("Failed to load config: {}", err))?;

    let start_time = Utc::now();
    let summary = run(&config, date)?;
    info!(
        "Exported {} raw and {} diva records from {} files",
        summary.raw_records, summary.diva_records, summary.files_read
    );

    let elapsed_time = Utc::now() - start_time;
    info!("Elapsed time: {} seconds", elapsed_time.num_seconds());

    Ok(())
}
