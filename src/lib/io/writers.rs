use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

use log::{info, warn};

use crate::helpers::AltimetryError;

/// One observation ready to be exported
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub lon: f64,
    pub lat: f64,
    /// days since 1950-01-01
    pub time: f64,
    pub field: f64,
    pub weight: Option<f64>,
}

/// Layout of one line of a point file
pub trait RecordFormat {
    fn name(&self) -> &'static str;

    /// Whether every value written for the record is finite
    fn accepts(&self, record: &PointRecord) -> bool;

    fn write_record(&self, out: &mut dyn Write, record: &PointRecord) -> io::Result<()>;
}

/// `lon lat time field`
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormat;

impl RecordFormat for RawFormat {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn accepts(&self, record: &PointRecord) -> bool {
        record.lon.is_finite()
            && record.lat.is_finite()
            && record.time.is_finite()
            && record.field.is_finite()
    }

    fn write_record(&self, out: &mut dyn Write, record: &PointRecord) -> io::Result<()> {
        writeln!(
            out,
            "{} {} {} {}",
            record.lon, record.lat, record.time, record.field
        )
    }
}

/// `lon lat field weight`, the data file layout read by DIVA
#[derive(Debug, Clone, Copy, Default)]
pub struct DivaFormat;

impl RecordFormat for DivaFormat {
    fn name(&self) -> &'static str {
        "diva"
    }

    fn accepts(&self, record: &PointRecord) -> bool {
        record.lon.is_finite()
            && record.lat.is_finite()
            && record.field.is_finite()
            && record.weight.is_some_and(|w| w.is_finite())
    }

    fn write_record(&self, out: &mut dyn Write, record: &PointRecord) -> io::Result<()> {
        let weight = record.weight.unwrap_or(f64::NAN);
        writeln!(
            out,
            "{} {} {} {}",
            record.lon, record.lat, record.field, weight
        )
    }
}

/// Opens `path` for appending, creating it if absent.
/// Existing content is never truncated.
pub fn open_append(path: &Path) -> Result<BufWriter<File>, AltimetryError> {
    if !path.exists() {
        info!("Creating new file {}", path.display());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("Cannot open {} for appending: {}", path.display(), err))?;
    Ok(BufWriter::new(file))
}

/// Writes point records to an open output with a given line layout
pub struct PointWriter<W: Write, F: RecordFormat> {
    out: W,
    format: F,
    skip_missing: bool,
    written: usize,
    skipped: usize,
}

impl<W: Write, F: RecordFormat> PointWriter<W, F> {
    /// Every record is written, missing values included (printed as `NaN`)
    pub fn new(out: W, format: F) -> Self {
        Self {
            out,
            format,
            skip_missing: false,
            written: 0,
            skipped: 0,
        }
    }

    /// Leaves out the records the format cannot represent with finite values
    pub fn skip_missing(mut self, skip_missing: bool) -> Self {
        self.skip_missing = skip_missing;
        self
    }

    /// Writes the records, one line each.
    /// Returns the number of lines written.
    pub fn write_records<I>(&mut self, records: I) -> Result<usize, AltimetryError>
    where
        I: IntoIterator<Item = PointRecord>,
    {
        let mut written = 0;
        let mut skipped = 0;
        for record in records {
            if self.skip_missing && !self.format.accepts(&record) {
                skipped += 1;
                continue;
            }
            self.format
                .write_record(&mut self.out, &record)
                .map_err(|err| format!("Cannot write {} record: {}", self.format.name(), err))?;
            written += 1;
        }
        if skipped > 0 {
            warn!(
                "Skipped {} {} records with missing values",
                skipped,
                self.format.name()
            );
        }
        self.written += written;
        self.skipped += skipped;
        Ok(written)
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Flushes and returns the underlying output
    pub fn finish(mut self) -> Result<W, AltimetryError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lon: f64, field: f64, weight: Option<f64>) -> PointRecord {
        PointRecord {
            lon,
            lat: 40.25,
            time: 23531.5,
            field,
            weight,
        }
    }

    #[test]
    fn raw_lines_hold_lon_lat_time_field() {
        let mut writer = PointWriter::new(Vec::new(), RawFormat);
        let written = writer
            .write_records(vec![record(18.97, 0.078, None), record(-5.5, -0.1373, None)])
            .expect("should write");
        assert_eq!(written, 2);

        let out = String::from_utf8(writer.finish().expect("flush")).expect("utf8");
        assert_eq!(out, "18.97 40.25 23531.5 0.078\n-5.5 40.25 23531.5 -0.1373\n");
    }

    #[test]
    fn diva_lines_hold_lon_lat_field_weight() {
        let mut writer = PointWriter::new(Vec::new(), DivaFormat);
        writer
            .write_records(vec![record(18.97, 0.078, Some(1.0))])
            .expect("should write");
        let out = String::from_utf8(writer.finish().expect("flush")).expect("utf8");
        assert_eq!(out, "18.97 40.25 0.078 1\n");
    }

    #[test]
    fn records_with_missing_values_are_written() {
        let mut writer = PointWriter::new(Vec::new(), DivaFormat);
        let written = writer
            .write_records(vec![
                record(1.0, f64::NAN, Some(0.5)),
                record(1.0, 0.1, None),
                record(1.0, 0.1, Some(0.5)),
            ])
            .expect("should write");
        assert_eq!(written, 3);
        assert_eq!(writer.skipped(), 0);

        let out = String::from_utf8(writer.finish().expect("flush")).expect("utf8");
        assert_eq!(out, "1 40.25 NaN 0.5\n1 40.25 0.1 NaN\n1 40.25 0.1 0.5\n");
    }

    #[test]
    fn records_with_missing_values_can_be_skipped() {
        let mut writer = PointWriter::new(Vec::new(), DivaFormat).skip_missing(true);
        let written = writer
            .write_records(vec![
                record(1.0, f64::NAN, Some(0.5)),
                record(1.0, 0.1, None),
                record(1.0, 0.1, Some(0.5)),
            ])
            .expect("should write");
        assert_eq!(written, 1);
        assert_eq!(writer.written(), 1);
        assert_eq!(writer.skipped(), 2);
    }

    #[test]
    fn open_append_keeps_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.txt");

        for _ in 0..2 {
            let out = open_append(&path).expect("should open");
            let mut writer = PointWriter::new(out, RawFormat);
            writer
                .write_records(vec![record(3.0, 0.2, None)])
                .expect("should write");
            writer.finish().expect("flush");
        }

        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn open_append_fails_in_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("data.txt");
        assert!(open_append(&path).is_err());
    }
}
