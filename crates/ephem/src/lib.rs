//! Ephemeris access for heliographic body positions.
//!
//! The [`Ephemeris`] trait is the seam between the constellation engine and whatever
//! position service backs it. Two implementations ship with the crate:
//! [`AnalyticEphemeris`] (offline Keplerian planets) and [`HorizonsEphemeris`] (JPL
//! Horizons over HTTP). Both report positions in the Carrington frame.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod analytic;
pub mod catalog;
pub mod frames;
pub mod horizons;

pub use analytic::AnalyticEphemeris;
pub use frames::Frame;
pub use horizons::HorizonsEphemeris;

/// Heliocentric position in heliographic coordinates (degrees, AU).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeliographicPosition {
    pub radius_au: f64,
    /// Longitude in `[0, 360)`.
    pub lon_deg: f64,
    /// Latitude in `[-90, 90]`.
    pub lat_deg: f64,
}

/// Errors surfaced while resolving a body or transforming coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EphemerisError {
    #[error("unknown body `{name}`: not in the catalog and not resolvable by the {backend} ephemeris")]
    UnknownBody { name: String, backend: &'static str },
    #[error("ephemeris unavailable for `{name}` at {epoch}: {reason}")]
    Unavailable {
        name: String,
        epoch: String,
        reason: String,
    },
    #[error("failed to initialise the {backend} ephemeris: {reason}")]
    Setup {
        backend: &'static str,
        reason: String,
    },
}

impl EphemerisError {
    /// Convenience constructor for [`EphemerisError::Unavailable`].
    pub fn unavailable(name: &str, epoch: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            name: name.to_string(),
            epoch: format_epoch(epoch),
            reason: reason.into(),
        }
    }
}

/// Position and frame-transform service consumed by the constellation engine.
///
/// Implementations must be deterministic for a fixed `(key, epoch)` and safe to call
/// from several threads at once.
pub trait Ephemeris: Send + Sync {
    /// Short backend name used in diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Carrington position of `key` at `epoch`.
    fn resolve(
        &self,
        key: &str,
        epoch: DateTime<Utc>,
    ) -> Result<HeliographicPosition, EphemerisError>;

    /// Carrington longitude of the sub-Earth point.
    fn carrington_l0(&self, epoch: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.resolve(catalog::EARTH, epoch)?.lon_deg)
    }

    /// Convert a heliographic coordinate given in `frame` into Carrington.
    fn to_carrington(
        &self,
        lon: f64,
        lat: f64,
        frame: Frame,
        epoch: DateTime<Utc>,
    ) -> Result<(f64, f64), EphemerisError> {
        match frame {
            Frame::Carrington => Ok((solar_core::angles::normalize_degrees(lon), lat)),
            Frame::Stonyhurst => {
                let l0 = self.carrington_l0(epoch)?;
                Ok(frames::stonyhurst_to_carrington(lon, lat, l0))
            }
        }
    }
}

/// Format an epoch the way it appears in tables and error messages.
pub fn format_epoch(epoch: DateTime<Utc>) -> String {
    epoch.format("%Y-%m-%d %H:%M:%S").to_string()
}
