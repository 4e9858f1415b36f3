//! Named 2-D fields sampled on a structured horizontal grid.
//!
//! Values are stored as `nalgebra::DMatrix<f64>` with rows along `y` and
//! columns along `x`, matching the `(y, x)` dimension order of the geometry
//! files.

use nalgebra::DMatrix;

use crate::error::{IsoError, IsoResult};

/// A descriptive attribute value carried alongside a field.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Real(f64),
    Reals(Vec<f64>),
    Int(i64),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Real(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// A named physical quantity on a `(ny, nx)` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub name: String,
    pub values: DMatrix<f64>,
    pub attributes: Vec<Attribute>,
}

impl GridField {
    pub fn new(name: impl Into<String>, values: DMatrix<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attributes: Vec::new(),
        }
    }

    /// Field of shape `(ny, nx)` filled with `fill`.
    pub fn filled(name: impl Into<String>, ny: usize, nx: usize, fill: f64) -> Self {
        Self::new(name, DMatrix::from_element(ny, nx, fill))
    }

    /// Build from row-major data, the layout the array files use.
    pub fn from_row_major(
        name: impl Into<String>,
        ny: usize,
        nx: usize,
        data: &[f64],
    ) -> IsoResult<Self> {
        let name = name.into();
        if data.len() != ny * nx {
            return Err(IsoError::ShapeMismatch {
                what: name,
                expected: (ny, nx),
                found: (data.len(), 1),
            });
        }
        Ok(Self::new(name, DMatrix::from_row_slice(ny, nx, data)))
    }

    /// Values flattened in row-major order.
    pub fn to_row_major(&self) -> Vec<f64> {
        self.values.transpose().as_slice().to_vec()
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.values[(row, col)] = val;
    }

    pub fn ensure_shape(&self, expected: (usize, usize)) -> IsoResult<()> {
        if self.shape() != expected {
            return Err(IsoError::ShapeMismatch {
                what: self.name.clone(),
                expected,
                found: self.shape(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_round_trip_keeps_orientation() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let f = GridField::from_row_major("f", 2, 3, &data).unwrap();
        assert_eq!(f.get(0, 2), 3.0);
        assert_eq!(f.get(1, 0), 4.0);
        assert_eq!(f.to_row_major(), data.to_vec());
    }

    #[test]
    fn from_row_major_rejects_wrong_length() {
        let err = GridField::from_row_major("f", 2, 2, &[1.0]).unwrap_err();
        assert!(format!("{err}").contains("Shape mismatch"));
    }

    #[test]
    fn set_attribute_replaces_existing() {
        let mut f = GridField::filled("bed", 1, 1, 0.0).with_attribute("units", "m");
        f.set_attribute("units", "km");
        assert_eq!(f.attributes.len(), 1);
        assert_eq!(f.attribute("units"), Some(&AttrValue::Text("km".into())));
    }
}
