//! The coordinate/connectivity table produced by the engine.

use chrono::{DateTime, Utc};
use solar_ephem::{EphemerisError, Frame, HeliographicPosition};
use solar_spiral::{FieldLine, SpiralError};

use crate::CoordinateError;

/// Ordered output of one constellation computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationResult {
    pub epoch: DateTime<Utc>,
    /// Name of the ephemeris backend that resolved the bodies.
    pub backend: &'static str,
    pub connection_tolerance_deg: f64,
    /// Earth's Carrington position, when it could be resolved.
    pub earth: Option<HeliographicPosition>,
    pub reference: Option<ReferenceOutcome>,
    /// One row per requested body, in request order.
    pub rows: Vec<BodyRow>,
}

impl ConstellationResult {
    /// Rows that resolved successfully.
    pub fn resolved(&self) -> impl Iterator<Item = (&BodyRow, &ResolvedBody)> {
        self.rows.iter().filter_map(|row| match &row.outcome {
            RowOutcome::Resolved(body) => Some((row, body)),
            RowOutcome::Failed(_) => None,
        })
    }

    /// Rows whose ephemeris lookup failed.
    pub fn failures(&self) -> impl Iterator<Item = (&BodyRow, &EphemerisError)> {
        self.rows.iter().filter_map(|row| match &row.outcome {
            RowOutcome::Failed(err) => Some((row, err)),
            RowOutcome::Resolved(_) => None,
        })
    }

    /// Accepted reference point, if any.
    pub fn accepted_reference(&self) -> Option<&ReferenceRow> {
        match &self.reference {
            Some(ReferenceOutcome::Accepted(row)) => Some(row),
            _ => None,
        }
    }

    /// Sub-Earth Carrington longitude used for Stonyhurst conversions.
    pub fn carrington_l0(&self) -> Option<f64> {
        self.earth.map(|earth| earth.lon_deg)
    }
}

/// A single requested body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    /// Position in the request.
    pub index: usize,
    /// Name exactly as requested (trimmed).
    pub name: String,
    pub wind_speed_km_s: f64,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Resolved(ResolvedBody),
    /// The ephemeris lookup failed; the row is kept as a marker.
    Failed(EphemerisError),
}

/// Geometry derived for a resolved body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBody {
    /// Carrington position.
    pub position: HeliographicPosition,
    /// Longitude relative to the sub-Earth meridian, when Earth resolved.
    pub stonyhurst_lon_deg: Option<f64>,
    pub field_line: Result<FieldLine, SpiralError>,
    /// Backmapped footpoint longitude in `[0, 360)`.
    pub footpoint_lon_deg: Option<f64>,
    pub earth_separation: Option<EarthSeparation>,
    pub reference_separation: Option<ReferenceSeparation>,
}

impl ResolvedBody {
    pub fn magnetically_connected(&self) -> Option<bool> {
        self.reference_separation
            .as_ref()
            .map(|sep| sep.magnetically_connected)
    }
}

/// Offsets of a body from Earth (body minus Earth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthSeparation {
    /// Signed longitude difference in `(-180, 180]`.
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

/// Offsets of a body and its footpoint from the reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSeparation {
    /// Shortest-arc longitude separation in `[0, 180]`.
    pub longitude_deg: f64,
    /// Body minus reference longitude, in `(-180, 180]`.
    pub longitude_signed_deg: f64,
    /// Body minus reference latitude.
    pub latitude_deg: f64,
    /// Footpoint minus reference longitude, in `(-180, 180]`.
    pub footpoint_deg: Option<f64>,
    /// Footpoint lies within the connection tolerance of the reference.
    pub magnetically_connected: bool,
}

/// Outcome of the optional reference point.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceOutcome {
    Accepted(ReferenceRow),
    /// The coordinates were invalid; body rows carry no reference separations.
    Rejected(CoordinateError),
}

/// Reference point normalised to Carrington.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    /// Frame the user supplied the coordinates in.
    pub input_frame: Frame,
    pub input_lon_deg: f64,
    pub input_lat_deg: f64,
    /// Carrington longitude in `[0, 360)`.
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub wind_speed_km_s: f64,
}

/// Reference point plus the field line rooted under it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub point: ReferencePoint,
    /// Field line from the footpoint radius outward; rejected on a bad wind speed.
    pub field_line: Result<FieldLine, SpiralError>,
}
