//! Polar-plot layout primitives for a constellation.
//!
//! [`build_layout`] turns a [`ConstellationResult`] into renderer-neutral shapes in
//! polar coordinates: radius in AU and angle in Carrington degrees, measured
//! counter-clockwise. Spiral angles are left unwrapped so consecutive samples never
//! jump by 360°.

use serde::Serialize;
use solar_constellation::config::DisplayConfig;
use solar_constellation::ephem::catalog;
use solar_constellation::spiral::FieldLine;
use solar_constellation::{ConstellationResult, ReferenceOutcome};
use solar_core::angles::normalize_degrees;
use thiserror::Error;

/// Outer plot radius as a multiple of the farthest resolved body.
pub const OUTER_RADIUS_MARGIN: f64 = 1.2;
/// Stonyhurst spacing of the Earth-aligned grid spokes (degrees).
pub const GRID_SPACING_DEG: i32 = 30;
/// Length of the reference arrow as a fraction of the outer radius.
const REFERENCE_ARROW_FRACTION: f64 = 0.15;
/// Colours for bodies missing from the catalog.
const FALLBACK_PALETTE: &[Rgb] = &[
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
];
const REFERENCE_COLOR: Rgb = (0, 0, 0);

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("outer plot radius must be a positive number of AU (got {radius_au})")]
    InvalidOuterRadius { radius_au: f64 },
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayOptions {
    pub plot_spirals: bool,
    pub plot_sun_body_line: bool,
    pub show_earth_aligned_frame: bool,
    /// Fixed outer radius; derived from the farthest body when absent.
    pub outer_radius_au: Option<f64>,
}

impl DisplayOptions {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            plot_spirals: config.plot_spirals,
            plot_sun_body_line: config.plot_sun_body_line,
            show_earth_aligned_frame: config.show_earth_aligned_frame,
            outer_radius_au: None,
        }
    }
}

/// A body marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarPoint {
    pub label: String,
    pub radius_au: f64,
    pub angle_deg: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    BodySpiral,
    ReferenceSpiral,
}

/// Sampled field line, `(radius_au, angle_deg)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarCurve {
    pub label: String,
    pub kind: CurveKind,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

/// Straight radial line from the Sun to a body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialSegment {
    pub label: String,
    pub angle_deg: f64,
    pub from_radius_au: f64,
    pub to_radius_au: f64,
    pub color: Rgb,
}

/// Arrow marking the reference point on the Sun.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub label: String,
    pub angle_deg: f64,
    pub lat_deg: f64,
    pub from_radius_au: f64,
    pub to_radius_au: f64,
    pub color: Rgb,
}

/// One spoke of the Earth-aligned overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpoke {
    /// Carrington angle of the spoke.
    pub angle_deg: f64,
    /// Stonyhurst longitude label, e.g. `-30°`.
    pub label: String,
}

/// Angular grid rotated so Stonyhurst 0° points at Earth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngularGrid {
    pub rotation_deg: f64,
    pub spokes: Vec<GridSpoke>,
}

/// Everything a renderer needs to draw one constellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotLayout {
    pub title: String,
    pub outer_radius_au: f64,
    pub points: Vec<PolarPoint>,
    pub curves: Vec<PolarCurve>,
    pub sun_lines: Vec<RadialSegment>,
    pub reference: Option<ReferenceMarker>,
    pub earth_grid: Option<AngularGrid>,
    /// Bodies that could not be placed, with the reason.
    pub unplotted: Vec<String>,
}

/// Lay out `result` for display. The result is only read.
pub fn build_layout(
    result: &ConstellationResult,
    options: &DisplayOptions,
) -> Result<PlotLayout, LayoutError> {
    let outer_radius_au = match options.outer_radius_au {
        Some(radius) if radius.is_finite() && radius > 0.0 => radius,
        Some(radius) => return Err(LayoutError::InvalidOuterRadius { radius_au: radius }),
        None => {
            let farthest = result
                .resolved()
                .map(|(_, body)| body.position.radius_au)
                .fold(0.0_f64, f64::max);
            if farthest > 0.0 {
                farthest * OUTER_RADIUS_MARGIN
            } else {
                1.0
            }
        }
    };

    let mut points = Vec::new();
    let mut curves = Vec::new();
    let mut sun_lines = Vec::new();
    let mut unplotted = Vec::new();

    for (row, body) in result.resolved() {
        let color = body_color(&row.name, row.index);
        points.push(PolarPoint {
            label: row.name.clone(),
            radius_au: body.position.radius_au,
            angle_deg: body.position.lon_deg,
            color,
        });
        if options.plot_sun_body_line {
            sun_lines.push(RadialSegment {
                label: row.name.clone(),
                angle_deg: body.position.lon_deg,
                from_radius_au: 0.0,
                to_radius_au: body.position.radius_au,
                color,
            });
        }
        if options.plot_spirals {
            match &body.field_line {
                Ok(line) => curves.push(PolarCurve {
                    label: row.name.clone(),
                    kind: CurveKind::BodySpiral,
                    color,
                    points: sample(line, outer_radius_au, line.inner_boundary_au),
                }),
                Err(err) => unplotted.push(format!("{} spiral: {err}", row.name)),
            }
        }
    }
    for (row, err) in result.failures() {
        unplotted.push(format!("{}: {err}", row.name));
    }

    let mut reference = None;
    match &result.reference {
        Some(ReferenceOutcome::Accepted(row)) => {
            let point = &row.point;
            reference = Some(ReferenceMarker {
                label: format!(
                    "reference ({:.0}°, {:.0}°)",
                    point.input_lon_deg, point.input_lat_deg
                ),
                angle_deg: point.lon_deg,
                lat_deg: point.lat_deg,
                from_radius_au: 0.0,
                to_radius_au: outer_radius_au * REFERENCE_ARROW_FRACTION,
                color: REFERENCE_COLOR,
            });
            match &row.field_line {
                Ok(line) => curves.push(PolarCurve {
                    label: "reference".to_string(),
                    kind: CurveKind::ReferenceSpiral,
                    color: REFERENCE_COLOR,
                    points: sample(line, line.source_radius_au, outer_radius_au),
                }),
                Err(err) => unplotted.push(format!("reference spiral: {err}")),
            }
        }
        Some(ReferenceOutcome::Rejected(err)) => unplotted.push(format!("reference: {err}")),
        None => {}
    }

    let earth_grid = match (options.show_earth_aligned_frame, result.carrington_l0()) {
        (true, Some(l0)) => Some(earth_grid(l0)),
        _ => None,
    };

    Ok(PlotLayout {
        title: result.epoch.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        outer_radius_au,
        points,
        curves,
        sun_lines,
        reference,
        earth_grid,
        unplotted,
    })
}

fn sample(line: &FieldLine, from_au: f64, to_au: f64) -> Vec<(f64, f64)> {
    line.trace(from_au, to_au)
        .map(|s| (s.radius_au, s.lon_deg))
        .collect()
}

fn earth_grid(l0: f64) -> AngularGrid {
    let spokes = (-180 / GRID_SPACING_DEG + 1..=180 / GRID_SPACING_DEG)
        .map(|step| {
            let stonyhurst = step * GRID_SPACING_DEG;
            GridSpoke {
                angle_deg: normalize_degrees(l0 + f64::from(stonyhurst)),
                label: format!("{stonyhurst}°"),
            }
        })
        .collect();
    AngularGrid {
        rotation_deg: l0,
        spokes,
    }
}

/// Catalog colour for known bodies, palette colour by row otherwise.
pub fn body_color(name: &str, index: usize) -> Rgb {
    catalog::lookup(name)
        .map(|body| body.color)
        .unwrap_or(FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()])
}
