//! Raw benchmark geometry → processed geometry on the padded ocean domain.

use iso_core::GridField;
use tracing::{debug, info};

use crate::calving::{CalvingFields, apply_calving};
use crate::domain::{Axis, Domain};
use crate::error::{GeometryError, GeometryResult};
use crate::smoother::smooth_geometry;

/// The ISOMIP+ input geometry as read from disk, on `(y, x)`.
#[derive(Debug, Clone)]
pub struct RawGeometry {
    pub x: Axis,
    pub y: Axis,
    pub upper_surface: GridField,
    pub lower_surface: GridField,
    pub bedrock_topography: GridField,
    pub floating_mask: GridField,
    pub grounded_mask: GridField,
    pub open_ocean_mask: GridField,
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryParams {
    /// Smoothing length scale in grid cells.
    pub filter_sigma: f64,
    /// Floating ice thinner than this (m) is calved.
    pub min_ice_thickness: f64,
    /// Multiplier applied to the ice draft.
    pub scale: f64,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            filter_sigma: 2.0,
            min_ice_thickness: 100.0,
            scale: 1.0,
        }
    }
}

impl GeometryParams {
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.filter_sigma.is_finite() || self.filter_sigma <= 0.0 {
            return Err(GeometryError::InvalidParam {
                what: format!("filter_sigma must be positive, got {}", self.filter_sigma),
            });
        }
        if !self.min_ice_thickness.is_finite() || self.min_ice_thickness < 0.0 {
            return Err(GeometryError::InvalidParam {
                what: format!(
                    "min_ice_thickness must be non-negative, got {}",
                    self.min_ice_thickness
                ),
            });
        }
        if !self.scale.is_finite() {
            return Err(GeometryError::InvalidParam {
                what: format!("scale must be finite, got {}", self.scale),
            });
        }
        Ok(())
    }
}

/// Processed geometry handed to the mesh converter.
///
/// Field names are the output variable names; attributes are copied from
/// the source variables.
#[derive(Debug, Clone)]
pub struct ProcessedGeometry {
    pub x: Axis,
    pub y: Axis,
    pub ice_surface: GridField,
    pub ice_draft: GridField,
    pub bed: GridField,
    pub floating_ice_fraction: GridField,
    pub land_fraction: GridField,
    pub open_ocean_fraction: GridField,
    pub smoothed_draft_mask: GridField,
    pub calved_cells: usize,
}

impl ProcessedGeometry {
    /// Fields in the order they are written out.
    pub fn fields(&self) -> [&GridField; 7] {
        [
            &self.ice_surface,
            &self.ice_draft,
            &self.bed,
            &self.floating_ice_fraction,
            &self.land_fraction,
            &self.open_ocean_fraction,
            &self.smoothed_draft_mask,
        ]
    }
}

fn renamed(mut field: GridField, name: &str) -> GridField {
    field.name = name.to_string();
    field
}

fn with_values_of(template: &GridField, name: &str, values: nalgebra::DMatrix<f64>) -> GridField {
    GridField {
        name: name.to_string(),
        values,
        attributes: template.attributes.clone(),
    }
}

/// Crop, pad, scale, calve and smooth the raw geometry.
pub fn process_geometry(
    raw: &RawGeometry,
    params: &GeometryParams,
) -> GeometryResult<ProcessedGeometry> {
    params.validate()?;

    let domain = Domain::isomip(&raw.x, &raw.y)?;
    debug!(
        crop_start = domain.crop_start(),
        shape = ?domain.shape(),
        "built padded domain"
    );

    let mut surface = domain.embed(&raw.upper_surface, 0.0)?;
    let mut draft = domain.embed(&raw.lower_surface, 0.0)?;
    let bed = domain.embed(&raw.bedrock_topography, 0.0)?;
    let mut floating = domain.embed(&raw.floating_mask, 0.0)?;
    let grounded = domain.embed(&raw.grounded_mask, 1.0)?;
    let mut open_ocean = domain.embed(&raw.open_ocean_mask, 0.0)?;

    let ice_thickness = &surface.values - &draft.values;

    draft.values *= params.scale;

    let calved_cells = apply_calving(
        &ice_thickness,
        params.min_ice_thickness,
        CalvingFields {
            surface: &mut surface,
            draft: &mut draft,
            floating: &mut floating,
            open_ocean: &mut open_ocean,
            grounded: &grounded,
        },
    );

    let smoothed = smooth_geometry(
        &grounded.values,
        &floating.values,
        &bed.values,
        &draft.values,
        params.filter_sigma,
    )?;

    info!(
        nx = domain.shape().1,
        ny = domain.shape().0,
        calved_cells,
        filter_sigma = params.filter_sigma,
        scale = params.scale,
        "processed input geometry"
    );

    Ok(ProcessedGeometry {
        x: domain.x().clone(),
        y: domain.y().clone(),
        ice_draft: with_values_of(&draft, "Z_ice_draft", smoothed.draft),
        bed: with_values_of(&bed, "Z_bed", smoothed.bed),
        smoothed_draft_mask: with_values_of(&open_ocean, "smoothedDraftMask", smoothed.draft_mask),
        ice_surface: renamed(surface, "Z_ice_surface"),
        floating_ice_fraction: renamed(floating, "floatingIceFraction"),
        land_fraction: renamed(grounded, "landFraction"),
        open_ocean_fraction: renamed(open_ocean, "openOceanFraction"),
        calved_cells,
    })
}
