use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};

use crate::helpers::AltimetryError;

/// Domain of the analysis: coordinates of the first and last points and step,
/// one entry per dimension (e.g. longitude, latitude, time)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub origins: Vec<f64>,
    pub ends: Vec<f64>,
    pub steps: Vec<f64>,
    #[serde(skip)]
    pub npoints: Vec<f64>,
}

impl Parameters {
    pub fn new(origins: &[f64], ends: &[f64], steps: &[f64]) -> Result<Self, AltimetryError> {
        if ends.len() != origins.len() || steps.len() != origins.len() {
            return Err(format!(
                "Domain needs as many origins, ends and steps: {} {} {}",
                origins.len(),
                ends.len(),
                steps.len()
            )
            .into());
        }
        Ok(Self {
            origins: origins.to_vec(),
            ends: ends.to_vec(),
            steps: steps.to_vec(),
            npoints: Vec::new(),
        })
    }

    pub fn ndim(&self) -> usize {
        self.origins.len()
    }

    /// Number of points in each dimension, `(end - origin) / step`.
    /// The result is not rounded.
    pub fn get_domain_size(&mut self) -> &[f64] {
        self.npoints = (0..self.ndim())
            .map(|i| (self.ends[i] - self.origins[i]) / self.steps[i])
            .collect();
        &self.npoints
    }

    /// Writes origin, step and end of each dimension, one value per line.
    /// The file is truncated.
    pub fn to_file(&self, path: &Path) -> Result<(), AltimetryError> {
        let file = File::create(path)
            .map_err(|err| format!("error creating {}, {}", path.display(), err))?;
        let mut writer = BufWriter::new(file);
        for i in 0..self.ndim() {
            writeln!(writer, "{}", self.origins[i])?;
            writeln!(writer, "{}", self.steps[i])?;
            writeln!(writer, "{}", self.ends[i])?;
        }
        writer.flush()?;
        debug!("Domain written to {}", path.display());
        Ok(())
    }

    /// Reading the domain back is not supported: the parameters are returned unchanged
    pub fn load(self, path: &Path) -> Self {
        // TODO: parse the origin/step/end triplets once the expected value types are settled
        if path.exists() {
            warn!(
                "Reading domain parameters from {} is not supported, keeping the current ones",
                path.display()
            );
        }
        self
    }
}
