use std::path::Path;

use itertools::izip;
use log::{debug, warn};
use ndarray::Array1;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    functions::{normalize_longitudes, time_weights},
    helpers::AltimetryError,
    io::{
        source::{open_source, ArraySource},
        writers::{open_append, DivaFormat, PointRecord, PointWriter, RawFormat},
    },
};

const LON_NAME: &str = "longitude";
const LAT_NAME: &str = "latitude";
const TIME_NAME: &str = "time";

/// Along-track product families, which differ by the name of the measured field
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum TrackProduct {
    /// AVISO delayed-time product exposing the Absolute Dynamic Topography (`ADT`)
    AvisoAdt,
    /// CMEMS level-3 product exposing the unfiltered Sea Level Anomaly (`sla_unfiltered`)
    CmemsSla,
}

impl TrackProduct {
    pub fn field_name(&self) -> &'static str {
        match self {
            TrackProduct::AvisoAdt => "ADT",
            TrackProduct::CmemsSla => "sla_unfiltered",
        }
    }
}

/// Positions, times and measurements of one altimeter track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackData {
    /// longitude [degrees east, -180..180]
    pub lon: Array1<f64>,
    /// latitude [degrees north]
    pub lat: Array1<f64>,
    /// time [days since 1950-01-01]
    pub time: Array1<f64>,
    /// measured field (ADT or SLA) [m]
    pub field: Array1<f64>,
}

/// An altimeter track, either loaded from a file or empty when the file was missing
#[derive(Debug, Clone, PartialEq)]
pub enum Track {
    Empty,
    Loaded(TrackData),
}

impl Track {
    /// Builds a track from raw arrays, bringing longitudes back to [-180, 180)
    pub fn from_arrays(
        mut lon: Array1<f64>,
        lat: Array1<f64>,
        time: Array1<f64>,
        field: Array1<f64>,
    ) -> Result<Track, AltimetryError> {
        let npoints = lon.len();
        if lat.len() != npoints || time.len() != npoints || field.len() != npoints {
            return Err(format!(
                "Track arrays have different lengths: lon {}, lat {}, time {}, field {}",
                npoints,
                lat.len(),
                time.len(),
                field.len()
            )
            .into());
        }
        normalize_longitudes(&mut lon);
        Ok(Track::Loaded(TrackData {
            lon,
            lat,
            time,
            field,
        }))
    }

    /// Reads the track variables using the mapping of `product`.
    /// A missing variable is an error.
    pub fn from_source(
        source: &dyn ArraySource,
        product: TrackProduct,
    ) -> Result<Track, AltimetryError> {
        let lon = source.read_variable(LON_NAME)?.into_array1();
        let lat = source.read_variable(LAT_NAME)?.into_array1();
        let time = source.read_variable(TIME_NAME)?.into_array1();
        let field = source.read_variable(product.field_name())?.into_array1();
        Track::from_arrays(lon, lat, time, field)
    }

    /// Reads a track file. A missing file is not an error: the track is empty
    /// and a warning is logged.
    pub fn read(path: &Path, product: TrackProduct) -> Result<Track, AltimetryError> {
        if !path.exists() {
            warn!("File {} doesn't exist", path.display());
            return Ok(Track::Empty);
        }
        debug!("Reading {} track from {}", product, path.display());
        let source = open_source(path)?;
        Track::from_source(source.as_ref(), product)
    }

    pub fn read_from_aviso_adt(path: &Path) -> Result<Track, AltimetryError> {
        Track::read(path, TrackProduct::AvisoAdt)
    }

    pub fn read_from_cmems_sla(path: &Path) -> Result<Track, AltimetryError> {
        Track::read(path, TrackProduct::CmemsSla)
    }

    pub fn data(&self) -> Option<&TrackData> {
        match self {
            Track::Empty => None,
            Track::Loaded(data) => Some(data),
        }
    }

    pub fn npoints(&self) -> usize {
        self.data().map_or(0, |data| data.lon.len())
    }

    pub fn is_empty(&self) -> bool {
        self.npoints() == 0
    }

    /// Weight of each measurement from its time distance to `timemid`.
    /// `timescale` and `timemid` are in days, `timemid` since 1950-01-01.
    /// An empty track gives an empty array.
    pub fn compute_time_weights(&self, timescale: f64, timemid: f64) -> Array1<f64> {
        match self {
            Track::Empty => Array1::zeros(0),
            Track::Loaded(data) => time_weights(&data.time, timemid, timescale),
        }
    }

    /// One record per measurement, with the weights when given
    pub fn records(&self, weights: Option<&Array1<f64>>) -> Vec<PointRecord> {
        let data = match self.data() {
            Some(data) => data,
            None => return Vec::new(),
        };

        let weights: Box<dyn Iterator<Item = Option<f64>> + '_> = match weights {
            Some(weights) => Box::new(weights.iter().map(|w| Some(*w))),
            None => Box::new(std::iter::repeat(None)),
        };

        izip!(&data.lon, &data.lat, &data.time, &data.field, weights)
            .map(|(lon, lat, time, field, weight)| PointRecord {
                lon: *lon,
                lat: *lat,
                time: *time,
                field: *field,
                weight,
            })
            .collect()
    }

    /// Appends `lon lat time field` lines to `path`, creating the file if needed.
    /// Returns the number of lines written.
    pub fn write_textfile(&self, path: &Path) -> Result<usize, AltimetryError> {
        let mut writer = PointWriter::new(open_append(path)?, RawFormat);
        let written = writer.write_records(self.records(None))?;
        writer.finish()?;
        Ok(written)
    }

    /// Appends `lon lat field weight` lines (DIVA data file) to `path`,
    /// the weights being computed from the time distance to `timemid`.
    /// Returns the number of lines written.
    pub fn write_divafile(
        &self,
        path: &Path,
        timescale: f64,
        timemid: f64,
    ) -> Result<usize, AltimetryError> {
        let weights = self.compute_time_weights(timescale, timemid);
        let mut writer = PointWriter::new(open_append(path)?, DivaFormat);
        let written = writer.write_records(self.records(Some(&weights)))?;
        writer.finish()?;
        Ok(written)
    }
}
