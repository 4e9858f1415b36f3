//! NetCDF backend.

use std::ffi::{CStr, CString, c_int};
use std::path::Path;
use std::sync::PoisonError;

use iso_adjust::{IterationState, ModelOutput};
use iso_core::{AttrValue, Attribute, GridField};
use iso_forcing::{ForcingSeries, ReferenceLandIce, STR_LEN};
use iso_geometry::{Axis, ProcessedGeometry, RawGeometry};
use nalgebra::DMatrix;
use netcdf::AttributeValue;
use netcdf_sys::{
    NC_EINDEFINE, NC_GLOBAL, NC_NOERR, NC_WRITE, nc_close, nc_enddef, nc_open, nc_put_att_text,
    nc_redef, nc_strerror,
};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::layout::{self, DIM_CELLS, DIM_STR_LEN, DIM_TIME, DIM_VERT_LEVELS, forcing, geometry, state};

fn file_label(path: &Path) -> String {
    path.display().to_string()
}

fn dim_len(file: &netcdf::File, name: &str, path: &Path) -> IoResult<usize> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| IoError::MissingDimension {
            name: name.to_string(),
            file: file_label(path),
        })
}

fn variable<'f>(file: &'f netcdf::File, name: &str, path: &Path) -> IoResult<netcdf::Variable<'f>> {
    file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        file: file_label(path),
    })
}

fn to_attr_value(value: AttributeValue) -> Option<AttrValue> {
    match value {
        AttributeValue::Str(s) => Some(AttrValue::Text(s)),
        AttributeValue::Double(v) => Some(AttrValue::Real(v)),
        AttributeValue::Float(v) => Some(AttrValue::Real(v as f64)),
        AttributeValue::Doubles(v) => Some(AttrValue::Reals(v)),
        AttributeValue::Floats(v) => Some(AttrValue::Reals(v.into_iter().map(f64::from).collect())),
        AttributeValue::Int(v) => Some(AttrValue::Int(v as i64)),
        AttributeValue::Short(v) => Some(AttrValue::Int(v as i64)),
        AttributeValue::Schar(v) => Some(AttrValue::Int(v as i64)),
        _ => None,
    }
}

fn from_attr_value(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Text(s) => AttributeValue::Str(s.clone()),
        AttrValue::Real(v) => AttributeValue::Double(*v),
        AttrValue::Reals(v) => AttributeValue::Doubles(v.clone()),
        AttrValue::Int(v) => match i32::try_from(*v) {
            Ok(i) => AttributeValue::Int(i),
            Err(_) => AttributeValue::Double(*v as f64),
        },
    }
}

fn read_attributes(var: &netcdf::Variable<'_>) -> Vec<Attribute> {
    var.attributes()
        .filter_map(|a| {
            let value = a.value().ok().and_then(to_attr_value)?;
            Some(Attribute {
                name: a.name().to_string(),
                value,
            })
        })
        .collect()
}

fn read_axis(file: &netcdf::File, name: &str, path: &Path) -> IoResult<Axis> {
    let var = variable(file, name, path)?;
    let values: Vec<f64> = var.get_values(..)?;
    Ok(Axis {
        name: name.to_string(),
        values,
        attributes: read_attributes(&var),
    })
}

fn read_field(file: &netcdf::File, name: &str, shape: (usize, usize), path: &Path) -> IoResult<GridField> {
    let var = variable(file, name, path)?;
    let data: Vec<f64> = var.get_values(..)?;
    let values = layout::matrix_from_row_major(shape.0, shape.1, &data)?;
    Ok(GridField {
        name: name.to_string(),
        values,
        attributes: read_attributes(&var),
    })
}

/// Leading-time variable `(Time, nCells)` at time 0, or `(nCells)`.
fn read_cells<T>(file: &netcdf::File, name: &str, path: &Path) -> IoResult<Vec<T>>
where
    T: netcdf::NcTypeDescriptor + Copy,
{
    let var = variable(file, name, path)?;
    let has_time = var
        .dimensions()
        .first()
        .map(|d| d.name() == DIM_TIME)
        .unwrap_or(false);
    let values = if has_time {
        var.get_values::<T, _>((0, ..))?
    } else {
        var.get_values::<T, _>(..)?
    };
    Ok(values)
}

pub fn read_raw_geometry(path: &Path) -> IoResult<RawGeometry> {
    let file = netcdf::open(path)?;
    let x = read_axis(&file, geometry::X, path)?;
    let y = read_axis(&file, geometry::Y, path)?;
    let shape = (y.len(), x.len());
    debug!(path = %path.display(), nx = x.len(), ny = y.len(), "reading input geometry");
    Ok(RawGeometry {
        upper_surface: read_field(&file, geometry::UPPER_SURFACE, shape, path)?,
        lower_surface: read_field(&file, geometry::LOWER_SURFACE, shape, path)?,
        bedrock_topography: read_field(&file, geometry::BEDROCK, shape, path)?,
        floating_mask: read_field(&file, geometry::FLOATING_MASK, shape, path)?,
        grounded_mask: read_field(&file, geometry::GROUNDED_MASK, shape, path)?,
        open_ocean_mask: read_field(&file, geometry::OPEN_OCEAN_MASK, shape, path)?,
        x,
        y,
    })
}

fn put_attributes(var: &mut netcdf::VariableMut<'_>, attributes: &[Attribute]) -> IoResult<()> {
    for a in attributes {
        // the library manages the fill value itself
        if a.name == "_FillValue" {
            continue;
        }
        var.put_attribute(&a.name, from_attr_value(&a.value))?;
    }
    Ok(())
}

pub fn write_processed_geometry(path: &Path, out: &ProcessedGeometry) -> IoResult<()> {
    let mut file = netcdf::create(path)?;
    file.add_dimension(geometry::X, out.x.len())?;
    file.add_dimension(geometry::Y, out.y.len())?;

    for axis in [&out.x, &out.y] {
        let mut var = file.add_variable::<f64>(&axis.name, &[axis.name.as_str()])?;
        put_attributes(&mut var, &axis.attributes)?;
        var.put_values(&axis.values, ..)?;
    }

    for field in out.fields() {
        let mut var = file.add_variable::<f64>(&field.name, &[geometry::Y, geometry::X])?;
        put_attributes(&mut var, &field.attributes)?;
        var.put_values(&field.to_row_major(), ..)?;
    }
    debug!(path = %path.display(), "wrote processed geometry");
    Ok(())
}

pub fn read_iteration_state(path: &Path) -> IoResult<IterationState> {
    let file = netcdf::open(path)?;
    let n_cells = dim_len(&file, DIM_CELLS, path)?;
    let n_levels = dim_len(&file, DIM_VERT_LEVELS, path)?;

    let thickness_var = variable(&file, state::LAYER_THICKNESS, path)?;
    let thickness: Vec<f64> = thickness_var.get_values((0, .., ..))?;

    let s = IterationState {
        ssh: read_cells(&file, state::SSH, path)?,
        bottom_depth: read_cells(&file, state::BOTTOM_DEPTH, path)?,
        modify_ssh_mask: read_cells(&file, state::MODIFY_SSH_MASK, path)?,
        land_ice_pressure: read_cells(&file, state::LAND_ICE_PRESSURE, path)?,
        land_ice_draft: read_cells(&file, state::LAND_ICE_DRAFT, path)?,
        layer_thickness: layout::matrix_from_row_major(n_cells, n_levels, &thickness)?,
        lon_cell: read_cells(&file, state::LON_CELL, path)?,
        lat_cell: read_cells(&file, state::LAT_CELL, path)?,
        max_level_cell: read_cells(&file, state::MAX_LEVEL_CELL, path)?,
    };
    s.validate()
        .map_err(|e| IoError::InvalidData(format!("{}: {e}", path.display())))?;
    Ok(s)
}

/// Overwrite the fields the adjustment loop changes. Everything else in the
/// file is left as it was.
pub fn write_iteration_state(path: &Path, s: &IterationState) -> IoResult<()> {
    let mut file = netcdf::append(path)?;
    let cells: [(&str, &[f64]); 3] = [
        (state::SSH, &s.ssh),
        (state::LAND_ICE_DRAFT, &s.land_ice_draft),
        (state::LAND_ICE_PRESSURE, &s.land_ice_pressure),
    ];
    for (name, values) in cells {
        let mut var = file.variable_mut(name).ok_or_else(|| IoError::MissingVariable {
            name: name.to_string(),
            file: file_label(path),
        })?;
        var.put_values(values, (0, ..))?;
    }
    let mut var = file
        .variable_mut(state::LAYER_THICKNESS)
        .ok_or_else(|| IoError::MissingVariable {
            name: state::LAYER_THICKNESS.to_string(),
            file: file_label(path),
        })?;
    var.put_values(&layout::matrix_to_row_major(&s.layer_thickness), (0, .., ..))?;
    Ok(())
}

pub fn read_model_output(path: &Path) -> IoResult<ModelOutput> {
    let file = netcdf::open(path)?;
    let n_time = dim_len(&file, DIM_TIME, path)?;
    if n_time == 0 {
        return Err(IoError::InvalidData(format!(
            "{} has no time slices",
            path.display()
        )));
    }
    let last = n_time - 1;
    let final_ssh: Vec<f64> = variable(&file, state::SSH, path)?.get_values((last, ..))?;
    let top_density: Vec<f64> = variable(&file, state::DENSITY, path)?.get_values((last, .., 0))?;
    Ok(ModelOutput {
        final_ssh,
        top_density,
    })
}

pub fn read_reference_land_ice(path: &Path) -> IoResult<ReferenceLandIce> {
    let file = netcdf::open(path)?;
    Ok(ReferenceLandIce {
        draft: read_cells(&file, state::LAND_ICE_DRAFT, path)?,
        pressure: read_cells(&file, state::LAND_ICE_PRESSURE, path)?,
        fraction: read_cells(&file, state::LAND_ICE_FRACTION, path)?,
    })
}

pub fn write_forcing_series(path: &Path, series: &ForcingSeries) -> IoResult<()> {
    let mut file = netcdf::create_with(path, netcdf::Options::_64BIT_OFFSET)?;
    file.add_unlimited_dimension(DIM_TIME)?;
    file.add_dimension(DIM_CELLS, series.n_cells())?;
    file.add_dimension(DIM_STR_LEN, STR_LEN)?;

    let chars = layout::pack_chars(&series.xtime, STR_LEN)?;
    {
        let mut var = file.add_variable_with_type(
            forcing::XTIME,
            &[DIM_TIME, DIM_STR_LEN],
            &netcdf::types::NcVariableType::Char,
        )?;
        var.put_attribute("units", "unitless")?;
        for t in 0..series.n_time() {
            var.put_raw_values(&chars[t * STR_LEN..(t + 1) * STR_LEN], (t, ..))?;
        }
    }

    let fields: [&DMatrix<f64>; 3] = [&series.pressure, &series.fraction, &series.draft];
    for ((name, units, long_name), values) in forcing::FIELDS.into_iter().zip(fields) {
        let mut var = file.add_variable::<f64>(name, &[DIM_TIME, DIM_CELLS])?;
        var.put_attribute("units", units)?;
        var.put_attribute("long_name", long_name)?;
        for t in 0..series.n_time() {
            let row: Vec<f64> = values.row(t).iter().copied().collect();
            var.put_values(&row, (t, ..))?;
        }
    }
    debug!(path = %path.display(), n_time = series.n_time(), "wrote land-ice forcing");
    Ok(())
}

fn c_string(value: &str) -> IoResult<CString> {
    CString::new(value).map_err(|_| IoError::InvalidData(format!("'{value}' contains a NUL byte")))
}

fn nc_status(call: &'static str, code: c_int) -> IoResult<()> {
    if code == NC_NOERR {
        return Ok(());
    }
    // SAFETY: nc_strerror returns a static NUL-terminated message for any code.
    let message = unsafe { CStr::from_ptr(nc_strerror(code)) }
        .to_string_lossy()
        .into_owned();
    Err(IoError::NetCdfStatus {
        call,
        code,
        message,
    })
}

/// Classic and 64-bit offset files only take new attributes in define
/// mode, so the file is opened through the C library and switched into it.
pub fn set_global_attribute(path: &Path, name: &str, value: &str) -> IoResult<()> {
    let c_path = c_string(&path.to_string_lossy())?;
    let c_name = c_string(name)?;
    let _lock = netcdf_sys::libnetcdf_lock
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let mut ncid: c_int = -1;
    // SAFETY: c_path outlives the call and ncid is a valid out pointer.
    nc_status("nc_open", unsafe { nc_open(c_path.as_ptr(), NC_WRITE, &mut ncid) })?;

    let written = (|| -> IoResult<()> {
        // SAFETY: ncid was returned by nc_open and is still open.
        match unsafe { nc_redef(ncid) } {
            NC_NOERR | NC_EINDEFINE => {}
            code => return nc_status("nc_redef", code),
        }
        // SAFETY: name is NUL-terminated; value is read for exactly value.len() bytes.
        nc_status("nc_put_att_text", unsafe {
            nc_put_att_text(ncid, NC_GLOBAL, c_name.as_ptr(), value.len(), value.as_ptr().cast())
        })?;
        // SAFETY: as above.
        nc_status("nc_enddef", unsafe { nc_enddef(ncid) })
    })();

    // SAFETY: closed exactly once.
    let closed = nc_status("nc_close", unsafe { nc_close(ncid) });
    written.and(closed)?;
    debug!(path = %path.display(), name, value, "set global attribute");
    Ok(())
}
