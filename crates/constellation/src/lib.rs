//! Heliospheric constellation engine.
//!
//! Given an epoch, a list of bodies with solar wind speeds, and an optional reference
//! point on the Sun, the engine resolves every body through an [`Ephemeris`], roots a
//! Parker spiral at each one, and tabulates longitudinal separations and magnetic
//! connectivity. Per-body failures are kept as rows; only a computation where nothing
//! resolves fails as a whole.

use solar_ephem::{EphemerisError, Frame};
use thiserror::Error;

pub mod dispatch;
pub mod engine;
pub mod input;
pub mod result;

pub use engine::{ConstellationEngine, EngineState};
pub use input::{BodyRequest, ConstellationRequest, InputError, ReferenceRequest};
pub use result::{
    BodyRow, ConstellationResult, EarthSeparation, ReferenceOutcome, ReferencePoint,
    ReferenceRow, ReferenceSeparation, ResolvedBody, RowOutcome,
};

pub use solar_config as config;
pub use solar_ephem as ephem;
pub use solar_spiral as spiral;

/// Invalid reference-point coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("{} longitude {lon} is outside {domain}", .frame.label())]
    LongitudeOutOfRange {
        frame: Frame,
        lon: f64,
        domain: &'static str,
    },
    #[error("latitude {lat} is outside [-90, 90]")]
    LatitudeOutOfRange { lat: f64 },
    #[error("cannot convert reference point to Carrington: {0}")]
    Transform(EphemerisError),
}

/// A body whose ephemeris lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFailure {
    pub index: usize,
    pub name: String,
    pub error: EphemerisError,
}

impl std::fmt::Display for BodyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.name, self.error)
    }
}

/// Errors that abort a constellation computation.
#[derive(Debug, Error)]
pub enum ConstellationError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("invalid reference point: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    #[error(
        "none of the {} requested bodies could be resolved: {}",
        .failures.len(),
        join_failures(.failures)
    )]
    NoBodiesResolved { failures: Vec<BodyFailure> },
    #[error(transparent)]
    Config(#[from] solar_config::ConfigError),
}

fn join_failures(failures: &[BodyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
