use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    helpers::AltimetryError,
    io::writers::{open_append, DivaFormat, PointWriter, RawFormat},
    models::track::{Track, TrackProduct},
};

type FileWriter<F> = PointWriter<BufWriter<File>, F>;

/// Outcome of a batch export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// files that were read, missing ones included
    pub files_read: usize,
    /// files that gave an empty track
    pub files_empty: usize,
    pub raw_records: usize,
    pub diva_records: usize,
}

/// Appends the measurements of a list of track files to a raw point file
/// and to a DIVA data file, keeping both outputs open across files
pub struct BatchExporter {
    product: TrackProduct,
    raw: Option<FileWriter<RawFormat>>,
    diva: Option<FileWriter<DivaFormat>>,
    /// [days]
    timescale: f64,
    /// [days since 1950-01-01]
    timemid: f64,
    summary: ExportSummary,
}

impl BatchExporter {
    /// Opens the outputs that are given, in append mode
    pub fn new(
        product: TrackProduct,
        raw_path: Option<&Path>,
        diva_path: Option<&Path>,
        timescale: f64,
        timemid: f64,
    ) -> Result<Self, AltimetryError> {
        let raw = raw_path
            .map(|path| open_append(path).map(|out| PointWriter::new(out, RawFormat)))
            .transpose()?;
        let diva = diva_path
            .map(|path| open_append(path).map(|out| PointWriter::new(out, DivaFormat)))
            .transpose()?;
        Ok(Self {
            product,
            raw,
            diva,
            timescale,
            timemid,
            summary: ExportSummary::default(),
        })
    }

    /// Leaves out the records with missing values instead of writing them as `NaN`
    pub fn skip_missing(mut self, skip_missing: bool) -> Self {
        self.raw = self.raw.map(|writer| writer.skip_missing(skip_missing));
        self.diva = self.diva.map(|writer| writer.skip_missing(skip_missing));
        self
    }

    /// Writes one track to every open output
    pub fn export_track(&mut self, track: &Track) -> Result<(), AltimetryError> {
        if track.is_empty() {
            self.summary.files_empty += 1;
            return Ok(());
        }
        if let Some(raw) = self.raw.as_mut() {
            self.summary.raw_records += raw.write_records(track.records(None))?;
        }
        if let Some(diva) = self.diva.as_mut() {
            let weights = track.compute_time_weights(self.timescale, self.timemid);
            self.summary.diva_records += diva.write_records(track.records(Some(&weights)))?;
        }
        Ok(())
    }

    /// Reads and writes each file in turn. Missing files give empty tracks
    /// and are counted, not reported as errors.
    pub fn export_files(&mut self, files: &[PathBuf]) -> Result<ExportSummary, AltimetryError> {
        for path in files {
            debug!("Exporting {}", path.display());
            let track = Track::read(path, self.product)?;
            self.summary.files_read += 1;
            self.export_track(&track)?;
        }
        info!(
            "Exported {} files ({} empty): {} raw records, {} diva records",
            self.summary.files_read,
            self.summary.files_empty,
            self.summary.raw_records,
            self.summary.diva_records
        );
        Ok(self.summary)
    }

    pub fn summary(&self) -> ExportSummary {
        self.summary
    }

    /// Flushes the outputs
    pub fn finish(self) -> Result<ExportSummary, AltimetryError> {
        if let Some(raw) = self.raw {
            raw.finish()?;
        }
        if let Some(diva) = self.diva {
            diva.finish()?;
        }
        Ok(self.summary)
    }
}
