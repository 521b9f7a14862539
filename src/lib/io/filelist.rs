use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, info};

use crate::helpers::{days_since_epoch, AltimetryError};
use crate::models::track::TrackProduct;

/// Period of interest `[start, end)` centered on an analysis date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub mid: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `interval` days before and after `mid`.
    /// Fails when either bound is out of the calendar range.
    pub fn centered(mid: NaiveDate, interval: i64) -> Result<Self, AltimetryError> {
        let out_of_range =
            || format!("Interval of {} days around {} is out of range", interval, mid);
        let delta = Duration::try_days(interval).ok_or_else(out_of_range)?;
        let start = mid.checked_sub_signed(delta).ok_or_else(out_of_range)?;
        let end = mid.checked_add_signed(delta).ok_or_else(out_of_range)?;
        debug!("Start date: {}", start);
        debug!("End   date: {}", end);
        Ok(Self { mid, start, end })
    }

    /// Every day from `start` included to `end` excluded
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| day < &self.end)
            .collect()
    }

    /// (`YYYYMMDD_YYYYMMDD` suffix for file names, `YYYY-MM-DD$-$YYYY-MM-DD` figure title)
    pub fn datestrings(&self) -> (String, String) {
        let suffix = format!(
            "{}_{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        );
        let title = format!(
            "{}$-${}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        );
        (suffix, title)
    }

    /// Center of the window in days since 1950-01-01
    pub fn mid_time(&self) -> f64 {
        let mid = self
            .mid
            .and_hms_opt(0, 0, 0)
            .expect("midnight should be a valid time");
        days_since_epoch(&mid)
    }
}

/// File name made of a fixed prefix, any characters, and a fixed suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNamePattern {
    pub prefix: String,
    pub suffix: String,
}

impl FileNamePattern {
    pub fn matches(&self, name: &str) -> bool {
        name.len() >= self.prefix.len() + self.suffix.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
    }
}

/// Builds the expected file name of a mission for a given day
pub trait FileNaming {
    fn pattern(&self, mission: &str, day: &NaiveDate) -> FileNamePattern;
}

/// Naming of the delayed-time along-track products distributed per mission
#[derive(Debug, Clone)]
pub struct ProductNaming {
    pub product: TrackProduct,
    pub area: String,
}

impl ProductNaming {
    pub fn new(product: TrackProduct, area: &str) -> Self {
        Self {
            product,
            area: area.to_owned(),
        }
    }
}

impl FileNaming for ProductNaming {
    fn pattern(&self, mission: &str, day: &NaiveDate) -> FileNamePattern {
        let kind = match self.product {
            TrackProduct::AvisoAdt => "adt_vfec",
            TrackProduct::CmemsSla => "phy_vxxc_l3",
        };
        FileNamePattern {
            prefix: format!(
                "dt_{}_{}_{}_{}_",
                self.area,
                mission,
                kind,
                day.format("%Y%m%d")
            ),
            suffix: ".nc".to_owned(),
        }
    }
}

/// Finds the files of a directory matching a pattern
pub trait FileLookup {
    fn find(&self, dir: &Path, pattern: &FileNamePattern) -> Vec<PathBuf>;
}

/// Lookup on the file system; matches are sorted by name.
/// A missing directory gives no match.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryLookup;

impl FileLookup for DirectoryLookup {
    fn find(&self, dir: &Path, pattern: &FileNamePattern) -> Vec<PathBuf> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| pattern.matches(name))
            })
            .collect();
        matches.sort();
        matches
    }
}

/// Files found for a set of missions over a period
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    pub files: Vec<PathBuf>,
    pub nfiles: usize,
}

/// List, mission by mission and day by day, the files of `databasedir/<mission>/<YYYY>/`
/// whose name embeds a day of the window.
/// Days without a file are skipped, and only the first match of a day is kept.
pub fn make_filelist(
    databasedir: &Path,
    missions: &[String],
    window: &DateWindow,
    naming: &dyn FileNaming,
    lookup: &dyn FileLookup,
) -> FileList {
    let days = window.days();
    let mut filelist = FileList::default();

    for mission in missions {
        info!("Working on files from mission {}", mission);
        let datadir = databasedir.join(mission);
        for day in &days {
            debug!("{}", day.format("%Y%m%d"));
            let pattern = naming.pattern(mission, day);
            let yeardir = datadir.join(format!("{:04}", day.year()));

            // some missions have no file for some days
            if let Some(file) = lookup.find(&yeardir, &pattern).into_iter().next() {
                filelist.files.push(file);
                filelist.nfiles += 1;
            }
        }
    }
    info!(
        "Found {} files for the selected period and missions",
        filelist.nfiles
    );
    filelist
}
