use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use divaaltimetry::constants::DEFAULT_AREA;
use divaaltimetry::helpers::AltimetryError;
use divaaltimetry::models::parameters::Parameters;
use divaaltimetry::models::track::TrackProduct;
use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};
use strum::IntoEnumIterator;

fn default_area() -> String {
    DEFAULT_AREA.to_owned()
}

fn default_true() -> bool {
    true
}

fn parse_error(config_file: &str, err: impl std::fmt::Display) -> AltimetryError {
    AltimetryError::from(format!(
        "Cannot parse config file {}: {} (known products: {})",
        config_file,
        err,
        TrackProduct::iter().join(", ")
    ))
}

/// Settings of one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// root of the `<mission>/<YYYY>/` tree
    pub database_dir: PathBuf,
    /// mission codes, in the order their files are exported
    pub missions: Vec<String>,
    pub product: TrackProduct,
    /// region code embedded in the file names
    #[serde(default = "default_area")]
    pub area: String,
    /// half width of the period [days]
    pub interval: i64,
    /// decay of the temporal weight [days]
    pub timescale: f64,
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub write_raw: bool,
    #[serde(default = "default_true")]
    pub write_diva: bool,
    /// leave out the observations with missing values instead of writing `NaN`
    #[serde(default)]
    pub skip_missing: bool,
    /// analysis grid written to the parameter file
    #[serde(default)]
    pub domain: Option<Parameters>,
}

impl ExportConfig {
    pub fn from_file(config_file: &str) -> Result<ExportConfig, AltimetryError> {
        // Check the file extension to determine which method to use
        if config_file.ends_with(".yaml") || config_file.ends_with(".yml") {
            Self::from_yaml(config_file)
        } else if config_file.ends_with(".json") {
            Self::from_json(config_file)
        } else {
            Err(AltimetryError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )))
        }
    }

    fn read_contents(config_file: &str) -> Result<String, AltimetryError> {
        let mut file = File::open(config_file)
            .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;
        Ok(contents)
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, AltimetryError> {
        let contents = Self::read_contents(config_file)?;
        let conf: ExportConfig =
            serde_yaml::from_str(&contents).map_err(|err| parse_error(config_file, err))?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn from_json(config_file: &str) -> Result<Self, AltimetryError> {
        let contents = Self::read_contents(config_file)?;
        let conf: ExportConfig =
            serde_json::from_str(&contents).map_err(|err| parse_error(config_file, err))?;
        conf.validate()?;
        Ok(conf)
    }

    fn validate(&self) -> Result<(), AltimetryError> {
        if self.timescale <= 0.0 {
            return Err(format!("timescale must be positive, got {}", self.timescale).into());
        }
        if let Some(domain) = &self.domain {
            Parameters::new(&domain.origins, &domain.ends, &domain.steps)?;
        }
        Ok(())
    }
}
