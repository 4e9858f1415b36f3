//! Variable names, dimension names and buffer layouts shared with the
//! ocean model's files.

use nalgebra::DMatrix;

use crate::error::{IoError, IoResult};

pub const DIM_TIME: &str = "Time";
pub const DIM_CELLS: &str = "nCells";
pub const DIM_VERT_LEVELS: &str = "nVertLevels";
pub const DIM_STR_LEN: &str = "StrLen";

/// Geometry input variables, in the order they appear on `RawGeometry`.
pub mod geometry {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const UPPER_SURFACE: &str = "upperSurface";
    pub const LOWER_SURFACE: &str = "lowerSurface";
    pub const BEDROCK: &str = "bedrockTopography";
    pub const FLOATING_MASK: &str = "floatingMask";
    pub const GROUNDED_MASK: &str = "groundedMask";
    pub const OPEN_OCEAN_MASK: &str = "openOceanMask";
}

pub mod state {
    pub const SSH: &str = "ssh";
    pub const BOTTOM_DEPTH: &str = "bottomDepth";
    pub const MODIFY_SSH_MASK: &str = "modifySSHMask";
    pub const LAND_ICE_PRESSURE: &str = "landIcePressure";
    pub const LAND_ICE_DRAFT: &str = "landIceDraft";
    pub const LAND_ICE_FRACTION: &str = "landIceFraction";
    pub const LAYER_THICKNESS: &str = "layerThickness";
    pub const LON_CELL: &str = "lonCell";
    pub const LAT_CELL: &str = "latCell";
    pub const MAX_LEVEL_CELL: &str = "maxLevelCell";
    pub const DENSITY: &str = "density";
}

pub mod forcing {
    pub const XTIME: &str = "xtime";
    pub const PRESSURE: &str = "landIcePressureForcing";
    pub const FRACTION: &str = "landIceFractionForcing";
    pub const DRAFT: &str = "landIceDraftForcing";

    /// `(name, units, long_name)` for the three forcing fields.
    pub const FIELDS: [(&str, &str, &str); 3] = [
        (
            PRESSURE,
            "Pa",
            "Pressure defined at the sea surface due to land ice",
        ),
        (
            FRACTION,
            "unitless",
            "The fraction of each cell covered by land ice",
        ),
        (
            DRAFT,
            "m",
            "The elevation of the interface between land ice and the ocean",
        ),
    ];
}

/// Build a matrix from C-ordered (row-major) data.
pub fn matrix_from_row_major(rows: usize, cols: usize, data: &[f64]) -> IoResult<DMatrix<f64>> {
    if data.len() != rows * cols {
        return Err(IoError::InvalidData(format!(
            "expected {rows}x{cols} = {} values, found {}",
            rows * cols,
            data.len()
        )));
    }
    Ok(DMatrix::from_row_slice(rows, cols, data))
}

/// Flatten a matrix into C order.
pub fn matrix_to_row_major(m: &DMatrix<f64>) -> Vec<f64> {
    m.transpose().as_slice().to_vec()
}

/// Pack timestamps into a `(nTime, strLen)` character buffer, space padded.
pub fn pack_chars(values: &[String], str_len: usize) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(values.len() * str_len);
    for v in values {
        let bytes = v.as_bytes();
        if bytes.len() > str_len || !v.is_ascii() {
            return Err(IoError::InvalidData(format!(
                "string '{}' does not fit in {str_len} ASCII characters",
                v.trim_end()
            )));
        }
        out.extend_from_slice(bytes);
        out.resize(out.len() + (str_len - bytes.len()), b' ');
    }
    Ok(out)
}

/// Numbered adjustment state, `init{i}.nc`.
pub fn iteration_file_name(iteration: usize) -> String {
    format!("init{iteration}.nc")
}
