use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, warn};
use ndarray::{Array1, Array2};
use ndarray_stats::QuantileExt;

use crate::{
    functions::{gradient, normalize_longitudes},
    helpers::{decode_time_units, AltimetryError},
    io::source::{open_source, ArraySource},
};

/// Variable names of a gridded product
struct GridMapping {
    lon: &'static str,
    lat: &'static str,
    time: Option<&'static str>,
    field: &'static str,
    error: &'static str,
}

/// Gridded reference product (e.g. AVISO maps of sea level anomaly)
const AVISO_MAPPING: GridMapping = GridMapping {
    lon: "lon",
    lat: "lat",
    time: Some("time"),
    field: "sla",
    error: "err",
};

/// Gridded output of the DIVA interpolation tool
const DIVA_MAPPING: GridMapping = GridMapping {
    lon: "x",
    lat: "y",
    time: None,
    field: "analyzed_field",
    error: "error_field",
};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    /// longitude axis [degrees east, -180..180]
    pub lon: Array1<f64>,
    /// latitude axis [degrees north]
    pub lat: Array1<f64>,
    /// raw time values, in the units declared by the file
    pub time: Option<Array1<f64>>,
    /// decoded time values
    pub filetime: Vec<NaiveDateTime>,
    /// field indexed [latitude, longitude]
    pub field: Array2<f64>,
    /// per-cell uncertainty, same shape as `field`
    pub error: Option<Array2<f64>>,
}

/// Minimum, maximum and mean of the non-missing cells of an array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Statistics {
    /// Cells that are NaN or infinite are left out of all three values
    fn of(values: &Array2<f64>) -> Statistics {
        let valid: Array1<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        Statistics {
            min: *valid.min_skipnan(),
            max: *valid.max_skipnan(),
            mean: valid.mean().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    pub field: Statistics,
    pub error: Option<Statistics>,
}

/// 2D gridded altimetry field (SLA, ADT, MDT) with its optional error field
#[derive(Debug, Clone, PartialEq)]
pub enum AltimetryField {
    Empty,
    Loaded(Box<FieldData>),
}

/// Reads a 2D variable and orders it as [latitude, longitude]
fn read_grid(
    source: &dyn ArraySource,
    name: &str,
    nlat: usize,
    nlon: usize,
) -> Result<Array2<f64>, AltimetryError> {
    let grid = source.read_variable(name)?.into_array2()?;
    match grid.dim() {
        (rows, cols) if rows == nlat && cols == nlon => Ok(grid),
        (rows, cols) if rows == nlon && cols == nlat => {
            debug!("Variable {} is stored as [longitude, latitude]", name);
            Ok(grid.reversed_axes().as_standard_layout().into_owned())
        }
        (rows, cols) => Err(format!(
            "Variable {} has shape ({}, {}), expected ({}, {})",
            name, rows, cols, nlat, nlon
        )
        .into()),
    }
}

impl AltimetryField {
    fn from_source(
        source: &dyn ArraySource,
        mapping: &GridMapping,
    ) -> Result<AltimetryField, AltimetryError> {
        let mut lon = source.read_variable(mapping.lon)?.into_array1();
        let lat = source.read_variable(mapping.lat)?.into_array1();
        normalize_longitudes(&mut lon);

        let (time, filetime) = match mapping.time {
            Some(time_name) => {
                let time = source.read_variable(time_name)?;
                let units = time
                    .units
                    .clone()
                    .ok_or_else(|| format!("Variable {} has no units", time_name))?;
                let filetime = decode_time_units(&time.values, &units)?;
                (Some(time.into_array1()), filetime)
            }
            None => (None, Vec::new()),
        };

        let field = read_grid(source, mapping.field, lat.len(), lon.len())?;
        let error = if source.has_variable(mapping.error) {
            Some(read_grid(source, mapping.error, lat.len(), lon.len())?)
        } else {
            None
        };

        Ok(AltimetryField::Loaded(Box::new(FieldData {
            lon,
            lat,
            time,
            filetime,
            field,
            error,
        })))
    }

    fn from_file(path: &Path, mapping: &GridMapping) -> Result<AltimetryField, AltimetryError> {
        if !path.exists() {
            warn!("File {} does not exist", path.display());
            return Ok(AltimetryField::Empty);
        }
        let source = open_source(path)?;
        AltimetryField::from_source(source.as_ref(), mapping)
    }

    /// Reads a gridded reference product (`lon`, `lat`, `time`, `sla`, `err`).
    /// Singleton dimensions are squeezed and the time is decoded with its units.
    pub fn from_aviso_source(source: &dyn ArraySource) -> Result<AltimetryField, AltimetryError> {
        AltimetryField::from_source(source, &AVISO_MAPPING)
    }

    /// Reads the output grid of DIVA (`x`, `y`, `analyzed_field`, `error_field`)
    pub fn from_diva2d_source(source: &dyn ArraySource) -> Result<AltimetryField, AltimetryError> {
        AltimetryField::from_source(source, &DIVA_MAPPING)
    }

    /// Missing file gives an empty field and a warning
    pub fn from_aviso_file(path: &Path) -> Result<AltimetryField, AltimetryError> {
        AltimetryField::from_file(path, &AVISO_MAPPING)
    }

    /// Missing file gives an empty field and a warning
    pub fn from_diva2d_file(path: &Path) -> Result<AltimetryField, AltimetryError> {
        AltimetryField::from_file(path, &DIVA_MAPPING)
    }

    pub fn data(&self) -> Option<&FieldData> {
        match self {
            AltimetryField::Empty => None,
            AltimetryField::Loaded(data) => Some(data.as_ref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_none()
    }

    /// Derivatives of the field along latitude and along longitude, in grid units
    pub fn gradients(&self) -> Option<(Array2<f64>, Array2<f64>)> {
        self.data().map(|data| gradient(&data.field))
    }

    pub fn summary(&self) -> Option<FieldSummary> {
        self.data().map(|data| FieldSummary {
            field: Statistics::of(&data.field),
            error: data.error.as_ref().map(Statistics::of),
        })
    }
}
