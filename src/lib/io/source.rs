use std::{collections::HashMap, path::Path};

use ndarray::{Array1, Array2};

use crate::helpers::AltimetryError;

/// A named numeric array read from a scientific-array file
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    /// `units` attribute, when declared
    pub units: Option<String>,
}

impl Variable {
    pub fn new(name: &str, shape: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            name: name.to_owned(),
            shape,
            values,
            units: None,
        }
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_owned());
        self
    }

    /// Flattened values, whatever the declared shape
    pub fn into_array1(self) -> Array1<f64> {
        Array1::from(self.values)
    }

    /// Values as a 2D array, after dropping every dimension of length 1
    pub fn into_array2(self) -> Result<Array2<f64>, AltimetryError> {
        let dims: Vec<usize> = self.shape.iter().copied().filter(|d| *d != 1).collect();
        let (nrows, ncols) = match dims.as_slice() {
            [nrows, ncols] => (*nrows, *ncols),
            // a 1x1 grid squeezes to nothing, a Nx1 grid to one dimension
            [] if self.shape.len() >= 2 => (1, 1),
            [n] if self.shape.len() >= 2 => {
                let last = self.shape[self.shape.len() - 1];
                if last == 1 {
                    (*n, 1)
                } else {
                    (1, *n)
                }
            }
            _ => {
                return Err(format!(
                    "Variable {} has shape {:?}, expected two non singleton dimensions",
                    self.name, self.shape
                )
                .into())
            }
        };

        Array2::from_shape_vec((nrows, ncols), self.values).map_err(|err| {
            format!("Cannot reshape variable {} to {}x{}: {}", self.name, nrows, ncols, err).into()
        })
    }
}

/// Read-only access to the named arrays of a file
pub trait ArraySource {
    fn has_variable(&self, name: &str) -> bool;

    /// Reads a variable, failing when it does not exist
    fn read_variable(&self, name: &str) -> Result<Variable, AltimetryError>;
}

/// In-memory source, used when the arrays do not come from a file
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    variables: HashMap<String, Variable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.insert(variable.name.clone(), variable);
        self
    }

    /// Adds a 1D variable
    pub fn with_values(self, name: &str, values: &[f64]) -> Self {
        let variable = Variable::new(name, vec![values.len()], values.to_vec());
        self.with_variable(variable)
    }
}

impl ArraySource for MemorySource {
    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn read_variable(&self, name: &str) -> Result<Variable, AltimetryError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| format!("Could not find variable {}", name).into())
    }
}

#[cfg(feature = "netcdf")]
pub use super::netcdf::NetCdfSource;

/// Opens the file at `path` with the available backend
pub fn open_source(path: &Path) -> Result<Box<dyn ArraySource>, AltimetryError> {
    #[cfg(feature = "netcdf")]
    {
        Ok(Box::new(NetCdfSource::open(path)?))
    }
    #[cfg(not(feature = "netcdf"))]
    {
        Err(format!(
            "Cannot open {}: built without the netcdf feature",
            path.display()
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn singleton_leading_dimension_is_squeezed() {
        let var = Variable::new("sla", vec![1, 2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let field = var.into_array2().expect("should reshape");
        assert_eq!(field, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn degenerate_grids_keep_two_dimensions() {
        let column = Variable::new("err", vec![1, 3, 1], vec![1.0, 2.0, 3.0]);
        assert_eq!(column.into_array2().expect("column").shape(), &[3, 1]);

        let row = Variable::new("err", vec![1, 1, 3], vec![1.0, 2.0, 3.0]);
        assert_eq!(row.into_array2().expect("row").shape(), &[1, 3]);

        let cell = Variable::new("err", vec![1, 1, 1], vec![1.0]);
        assert_eq!(cell.into_array2().expect("cell").shape(), &[1, 1]);
    }

    #[test]
    fn three_dimensional_variable_is_rejected() {
        let var = Variable::new("sla", vec![2, 2, 2], vec![0.0; 8]);
        assert!(var.into_array2().is_err());

        let var = Variable::new("sla", vec![4], vec![0.0; 4]);
        assert!(var.into_array2().is_err());
    }

    #[test]
    fn memory_source_reports_missing_variables() {
        let source = MemorySource::new().with_values("longitude", &[1.0, 2.0]);
        assert!(source.has_variable("longitude"));
        assert!(!source.has_variable("ADT"));
        assert!(source.read_variable("ADT").is_err());
        assert_eq!(
            source.read_variable("longitude").expect("exists").into_array1(),
            array![1.0, 2.0]
        );
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn open_source_without_backend_fails() {
        assert!(open_source(Path::new("whatever.nc")).is_err());
    }
}
