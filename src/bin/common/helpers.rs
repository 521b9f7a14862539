use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use divaaltimetry::helpers::AltimetryError;
use divaaltimetry::io::export::{BatchExporter, ExportSummary};
use divaaltimetry::io::filelist::{make_filelist, DateWindow, DirectoryLookup, ProductNaming};
use log::info;

use crate::common::config::builder::ExportConfig;

/// Files produced by a run, named after the period
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub raw: PathBuf,
    pub diva: PathBuf,
    pub param: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, suffix: &str) -> Self {
        Self {
            raw: output_dir.join(format!("data_{}.txt", suffix)),
            diva: output_dir.join(format!("diva_{}.dat", suffix)),
            param: output_dir.join(format!("param_{}.txt", suffix)),
        }
    }
}

/// Exports the tracks of the period centered on `date` and writes the domain file
pub fn run(config: &ExportConfig, date: NaiveDate) -> Result<ExportSummary, AltimetryError> {
    let window = DateWindow::centered(date, config.interval)?;
    let (suffix, title) = window.datestrings();
    info!("Period {}", title.replace("$-$", " - "));

    let naming = ProductNaming::new(config.product, &config.area);
    let filelist = make_filelist(
        &config.database_dir,
        &config.missions,
        &window,
        &naming,
        &DirectoryLookup,
    );

    fs::create_dir_all(&config.output_dir).map_err(|err| {
        format!(
            "Cannot create output directory {}: {}",
            config.output_dir.display(),
            err
        )
    })?;
    let paths = OutputPaths::new(&config.output_dir, &suffix);

    let mut exporter = BatchExporter::new(
        config.product,
        config.write_raw.then_some(paths.raw.as_path()),
        config.write_diva.then_some(paths.diva.as_path()),
        config.timescale,
        window.mid_time(),
    )?
    .skip_missing(config.skip_missing);
    exporter.export_files(&filelist.files)?;
    let summary = exporter.finish()?;

    if let Some(domain) = &config.domain {
        let mut parameters = domain.clone();
        info!("Domain size: {:?}", parameters.get_domain_size());
        parameters.to_file(&paths.param)?;
    }

    Ok(summary)
}
