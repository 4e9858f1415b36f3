//! Cropped and padded computational domain.

use iso_core::{Attribute, GridField};

use crate::error::{GeometryError, GeometryResult};

/// Physical x offset (m) at which the ocean domain starts.
pub const CROP_OFFSET_M: f64 = 320e3;

/// Land cells added on every side of the cropped region.
pub const BUFFER_CELLS: usize = 1;

/// A 1-D coordinate axis with its descriptive attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<f64>,
    pub attributes: Vec<Attribute>,
}

impl Axis {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attributes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn spacing(&self) -> GeometryResult<f64> {
        if self.values.len() < 2 {
            return Err(GeometryError::AxisTooShort {
                name: self.name.clone(),
                needed: 2,
                found: self.values.len(),
            });
        }
        Ok(self.values[1] - self.values[0])
    }
}

/// Output domain: the source grid cropped at `crop_start` along x and padded
/// by `buffer` cells on all four sides. Immutable once built.
#[derive(Debug, Clone)]
pub struct Domain {
    x: Axis,
    y: Axis,
    crop_start: usize,
    buffer: usize,
    source_shape: (usize, usize),
}

impl Domain {
    /// Build the domain from source axes, cropping at the first x ≥ `offset`.
    pub fn new(source_x: &Axis, source_y: &Axis, offset: f64, buffer: usize) -> GeometryResult<Self> {
        let dx = source_x.spacing()?;
        let dy = source_y.spacing()?;

        let crop_start = source_x
            .values
            .iter()
            .position(|&x| x >= offset)
            .ok_or_else(|| GeometryError::OffsetOutOfRange {
                offset,
                max: source_x.values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            })?;

        let nx = source_x.len() - crop_start + 2 * buffer;
        let ny = source_y.len() + 2 * buffer;
        let b = buffer as f64;

        let x0 = source_x.values[crop_start];
        let y0 = source_y.values[0];
        let x = Axis {
            name: source_x.name.clone(),
            values: (0..nx).map(|i| x0 + dx * (i as f64 - b)).collect(),
            attributes: source_x.attributes.clone(),
        };
        let y = Axis {
            name: source_y.name.clone(),
            values: (0..ny).map(|j| y0 + dy * (j as f64 - b)).collect(),
            attributes: source_y.attributes.clone(),
        };

        Ok(Self {
            x,
            y,
            crop_start,
            buffer,
            source_shape: (source_y.len(), source_x.len()),
        })
    }

    /// The ISOMIP+ default: crop at 320 km, one buffer cell.
    pub fn isomip(source_x: &Axis, source_y: &Axis) -> GeometryResult<Self> {
        Self::new(source_x, source_y, CROP_OFFSET_M, BUFFER_CELLS)
    }

    pub fn x(&self) -> &Axis {
        &self.x
    }

    pub fn y(&self) -> &Axis {
        &self.y
    }

    pub fn crop_start(&self) -> usize {
        self.crop_start
    }

    /// `(ny, nx)` of the padded output grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Copy the cropped part of a source field into the padded domain,
    /// filling the buffer with `default`. Name and attributes are kept.
    pub fn embed(&self, source: &GridField, default: f64) -> GeometryResult<GridField> {
        source.ensure_shape(self.source_shape)?;
        let (ny, nx) = self.shape();
        let (src_ny, src_nx) = self.source_shape;
        let mut out = GridField::filled(source.name.clone(), ny, nx, default);
        out.attributes = source.attributes.clone();
        for r in 0..src_ny {
            for c in self.crop_start..src_nx {
                out.set(r + self.buffer, c - self.crop_start + self.buffer, source.get(r, c));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> (Axis, Axis) {
        let x = Axis::new("x", (0..8).map(|i| 300e3 + 10e3 * i as f64).collect());
        let y = Axis::new("y", (0..3).map(|j| 2e3 * j as f64).collect());
        (x, y)
    }

    #[test]
    fn crop_starts_at_first_x_past_offset() {
        let (x, y) = axes();
        let d = Domain::isomip(&x, &y).unwrap();
        assert_eq!(d.crop_start(), 2);
        // 6 cropped columns + 2 buffer, 3 rows + 2 buffer
        assert_eq!(d.shape(), (5, 8));
        assert_eq!(d.x().values[0], 310e3);
        assert_eq!(d.x().values[1], 320e3);
        assert_eq!(d.y().values[0], -2e3);
        assert_eq!(*d.y().values.last().unwrap(), 6e3);
    }

    #[test]
    fn offset_beyond_axis_fails() {
        let (x, y) = axes();
        let err = Domain::new(&x, &y, 1e9, 1).unwrap_err();
        assert!(matches!(err, GeometryError::OffsetOutOfRange { .. }));
    }

    #[test]
    fn single_point_axis_fails() {
        let x = Axis::new("x", vec![400e3]);
        let (_, y) = axes();
        assert!(matches!(
            Domain::isomip(&x, &y).unwrap_err(),
            GeometryError::AxisTooShort { .. }
        ));
    }

    #[test]
    fn embed_places_values_inside_buffer() {
        let (x, y) = axes();
        let d = Domain::isomip(&x, &y).unwrap();
        let src = GridField::new(
            "groundedMask",
            nalgebra::DMatrix::from_fn(3, 8, |r, c| (10 * r + c) as f64),
        );
        let out = d.embed(&src, 1.0).unwrap();
        assert_eq!(out.shape(), (5, 8));
        assert_eq!(out.get(0, 0), 1.0);
        assert_eq!(out.get(4, 7), 1.0);
        // source (0, 2) is the first cropped column
        assert_eq!(out.get(1, 1), 2.0);
        assert_eq!(out.get(3, 6), 27.0);
    }
}
