use std::path::Path;

use log::trace;
use netcdf::{extent::Extents, AttrValue};

use crate::helpers::AltimetryError;

use super::source::{ArraySource, Variable};

/// Scientific-array source backed by a NetCDF file opened read-only
pub struct NetCdfSource {
    file: netcdf::File,
    path: String,
}

impl NetCdfSource {
    pub fn open(path: &Path) -> Result<Self, AltimetryError> {
        let file = netcdf::open(path)?;
        Ok(Self {
            file,
            path: path.to_string_lossy().into_owned(),
        })
    }
}

fn attribute_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    numeric_value(var.attribute(name)?.value().ok()?)
}

/// Scalar numeric attribute as f64, signed or unsigned
fn numeric_value(value: AttrValue) -> Option<f64> {
    match value {
        AttrValue::Double(d) => Some(d),
        AttrValue::Float(f) => Some(f as f64),
        AttrValue::Short(s) => Some(s as f64),
        AttrValue::Int(i) => Some(i as f64),
        AttrValue::Longlong(l) => Some(l as f64),
        AttrValue::Schar(c) => Some(c as f64),
        AttrValue::Uchar(c) => Some(c as f64),
        AttrValue::Ushort(s) => Some(s as f64),
        AttrValue::Uint(i) => Some(i as f64),
        AttrValue::Ulonglong(l) => Some(l as f64),
        _ => None,
    }
}

fn attribute_str(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttrValue::Str(s) => Some(s),
        _ => None,
    }
}

impl ArraySource for NetCdfSource {
    fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Reads the variable as f64, unpacking `scale_factor`/`add_offset`
    /// and turning `_FillValue`/`missing_value` into NaN
    fn read_variable(&self, name: &str) -> Result<Variable, AltimetryError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| format!("Could not find variable {} in {}", name, self.path))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();

        let scale = attribute_f64(&var, "scale_factor").unwrap_or(1.0);
        let offset = attribute_f64(&var, "add_offset").unwrap_or(0.0);
        let fill = attribute_f64(&var, "_FillValue");
        let missing = attribute_f64(&var, "missing_value");
        trace!(
            "[NC] {}:{} scale {} offset {} fill {:?}",
            self.path,
            name,
            scale,
            offset,
            fill
        );

        let values = var
            .values::<f64, _>(Extents::All)?
            .iter()
            .map(|raw| {
                if Some(*raw) == fill || Some(*raw) == missing {
                    f64::NAN
                } else {
                    raw * scale + offset
                }
            })
            .collect::<Vec<f64>>();

        Ok(Variable {
            name: name.to_owned(),
            shape,
            values,
            units: attribute_str(&var, "units"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_attributes_are_numeric() {
        assert_eq!(numeric_value(AttrValue::Uchar(255)), Some(255.0));
        assert_eq!(numeric_value(AttrValue::Ushort(65535)), Some(65535.0));
        assert_eq!(numeric_value(AttrValue::Uint(4_000_000_000)), Some(4.0e9));
        assert_eq!(numeric_value(AttrValue::Ulonglong(1 << 40)), Some(1_099_511_627_776.0));
    }

    #[test]
    fn signed_and_float_attributes_are_numeric() {
        assert_eq!(numeric_value(AttrValue::Short(-32767)), Some(-32767.0));
        assert_eq!(numeric_value(AttrValue::Float(0.001)), Some(0.001f32 as f64));
        assert_eq!(numeric_value(AttrValue::Double(0.5)), Some(0.5));
        assert_eq!(numeric_value(AttrValue::Str("m".to_owned())), None);
    }
}
