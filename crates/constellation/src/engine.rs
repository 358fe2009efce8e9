//! Constellation engine: request state, resolution, and table assembly.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use solar_config::ModelConfig;
use solar_core::angles::{normalize_degrees, separation, signed_separation};
use solar_ephem::catalog::{self, EARTH};
use solar_ephem::frames::carrington_to_stonyhurst;
use solar_ephem::{Ephemeris, Frame, HeliographicPosition, format_epoch};
use solar_spiral::SpiralModel;
use tracing::{debug, info, warn};

use crate::dispatch;
use crate::input::{BodyRequest, ConstellationRequest};
use crate::result::{
    BodyRow, ConstellationResult, EarthSeparation, ReferenceOutcome, ReferencePoint,
    ReferenceRow, ReferenceSeparation, ResolvedBody, RowOutcome,
};
use crate::{BodyFailure, ConstellationError, CoordinateError};

/// Lifecycle of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Accepting bodies and a reference point.
    Initialized,
    /// Ephemeris queries in flight.
    Resolving,
    /// Field lines and separations being derived.
    Modeling,
    /// At least one body resolved; the table is complete.
    Assembled,
    /// No body resolved.
    Failed,
}

pub struct ConstellationEngine {
    epoch: DateTime<Utc>,
    ephemeris: Arc<dyn Ephemeris>,
    config: ModelConfig,
    spiral: SpiralModel,
    bodies: Vec<BodyRequest>,
    reference: Option<Result<ReferencePoint, CoordinateError>>,
    state: EngineState,
}

impl ConstellationEngine {
    /// Empty engine for `epoch`. Fails if `config` holds unusable values.
    pub fn new(
        epoch: DateTime<Utc>,
        ephemeris: Arc<dyn Ephemeris>,
        config: ModelConfig,
    ) -> Result<Self, ConstellationError> {
        config.validate()?;
        let spiral = SpiralModel::from_config(&config);
        Ok(Self {
            epoch,
            ephemeris,
            config,
            spiral,
            bodies: Vec::new(),
            reference: None,
            state: EngineState::Initialized,
        })
    }

    /// Engine loaded with every body and the reference point of `request`.
    ///
    /// An invalid reference point does not fail construction; it is carried through
    /// to the result as [`ReferenceOutcome::Rejected`].
    pub fn from_request(
        request: &ConstellationRequest,
        ephemeris: Arc<dyn Ephemeris>,
        config: ModelConfig,
    ) -> Result<Self, ConstellationError> {
        let mut engine = Self::new(request.epoch, ephemeris, config)?;
        for body in &request.bodies {
            engine.add_body(&body.name, body.wind_speed_km_s)?;
        }
        if let Some(reference) = request.reference {
            match engine.set_reference(
                reference.lon_deg,
                reference.lat_deg,
                reference.frame,
                reference.wind_speed_km_s,
            ) {
                Ok(()) => {}
                Err(ConstellationError::InvalidCoordinate(err)) => {
                    warn!(error = %err, "reference point rejected");
                    engine.reference = Some(Err(err));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(engine)
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[BodyRequest] {
        &self.bodies
    }

    /// Append a body. Duplicates are kept and listed as separate rows.
    pub fn add_body(&mut self, name: &str, wind_speed_km_s: f64) -> Result<(), ConstellationError> {
        let body = BodyRequest::new(self.bodies.len(), name, wind_speed_km_s)?;
        self.bodies.push(body);
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Set the reference point, converting Stonyhurst input to Carrington.
    ///
    /// The wind speed only shapes the reference spiral; an unusable speed surfaces as
    /// that spiral's error in the result while separations are still computed.
    pub fn set_reference(
        &mut self,
        lon_deg: f64,
        lat_deg: f64,
        frame: Frame,
        wind_speed_km_s: f64,
    ) -> Result<(), ConstellationError> {
        if !(lon_deg.is_finite() && frame.accepts_longitude(lon_deg)) {
            return Err(CoordinateError::LongitudeOutOfRange {
                frame,
                lon: lon_deg,
                domain: frame.longitude_domain(),
            }
            .into());
        }
        if !(lat_deg.is_finite() && (-90.0..=90.0).contains(&lat_deg)) {
            return Err(CoordinateError::LatitudeOutOfRange { lat: lat_deg }.into());
        }

        let (lon, lat) = self
            .ephemeris
            .to_carrington(lon_deg, lat_deg, frame, self.epoch)
            .map_err(CoordinateError::Transform)?;
        debug!(
            frame = frame.label(),
            input_lon = lon_deg,
            carrington_lon = lon,
            "reference point set"
        );

        self.reference = Some(Ok(ReferencePoint {
            input_frame: frame,
            input_lon_deg: lon_deg,
            input_lat_deg: lat_deg,
            lon_deg: normalize_degrees(lon),
            lat_deg: lat,
            wind_speed_km_s,
        }));
        self.state = EngineState::Initialized;
        Ok(())
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
        self.state = EngineState::Initialized;
    }

    /// Resolve every body and assemble the coordinate/connectivity table.
    ///
    /// Each call starts from scratch, so repeated calls yield identical tables for a
    /// deterministic ephemeris.
    pub fn compute(&mut self) -> Result<ConstellationResult, ConstellationError> {
        self.state = EngineState::Resolving;
        info!(
            epoch = %format_epoch(self.epoch),
            bodies = self.bodies.len(),
            backend = self.ephemeris.backend_name(),
            "resolving constellation"
        );

        // One query per distinct body; Earth is always needed for L0.
        let mut keys: Vec<String> = Vec::new();
        let mut slot_of: HashMap<String, usize> = HashMap::new();
        let mut slot_for = |name: &str| -> usize {
            let key = canonical_key(name);
            *slot_of.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                keys.len() - 1
            })
        };
        let body_slots: Vec<usize> = self.bodies.iter().map(|b| slot_for(&b.name)).collect();
        let earth_slot = slot_for(EARTH);

        let resolutions = dispatch::resolve_all(
            &self.ephemeris,
            &keys,
            self.epoch,
            self.config.dispatch,
            self.config.ephemeris_timeout(),
        );

        self.state = EngineState::Modeling;
        let earth = match &resolutions[earth_slot] {
            Ok(position) => Some(*position),
            Err(err) => {
                warn!(error = %err, "earth unavailable; Stonyhurst columns left empty");
                None
            }
        };

        let reference = self.reference.clone().map(|reference| match reference {
            Ok(point) => {
                let field_line = self.spiral.field_line(
                    self.config.footpoint_radius_au,
                    point.lon_deg,
                    point.lat_deg,
                    point.wind_speed_km_s,
                );
                if let Err(err) = &field_line {
                    warn!(error = %err, "reference spiral rejected");
                }
                ReferenceOutcome::Accepted(ReferenceRow { point, field_line })
            }
            Err(err) => ReferenceOutcome::Rejected(err),
        });
        let reference_point = match &reference {
            Some(ReferenceOutcome::Accepted(row)) => Some(&row.point),
            _ => None,
        };

        let mut failures = Vec::new();
        let rows: Vec<BodyRow> = self
            .bodies
            .iter()
            .zip(&body_slots)
            .enumerate()
            .map(|(index, (body, &slot))| {
                let outcome = match &resolutions[slot] {
                    Ok(position) => RowOutcome::Resolved(self.derive(
                        body,
                        *position,
                        earth.as_ref(),
                        reference_point,
                    )),
                    Err(err) => {
                        warn!(body = %body.name, error = %err, "body not resolved");
                        failures.push(BodyFailure {
                            index,
                            name: body.name.clone(),
                            error: err.clone(),
                        });
                        RowOutcome::Failed(err.clone())
                    }
                };
                BodyRow {
                    index,
                    name: body.name.clone(),
                    wind_speed_km_s: body.wind_speed_km_s,
                    outcome,
                }
            })
            .collect();

        if failures.len() == rows.len() {
            self.state = EngineState::Failed;
            warn!(failed = failures.len(), "no body could be resolved");
            return Err(ConstellationError::NoBodiesResolved { failures });
        }

        self.state = EngineState::Assembled;
        info!(
            resolved = rows.len() - failures.len(),
            failed = failures.len(),
            "constellation assembled"
        );
        Ok(ConstellationResult {
            epoch: self.epoch,
            backend: self.ephemeris.backend_name(),
            connection_tolerance_deg: self.config.connection_tolerance_deg,
            earth,
            reference,
            rows,
        })
    }

    fn derive(
        &self,
        body: &BodyRequest,
        position: HeliographicPosition,
        earth: Option<&HeliographicPosition>,
        reference: Option<&ReferencePoint>,
    ) -> ResolvedBody {
        let field_line = self.spiral.field_line(
            position.radius_au,
            position.lon_deg,
            position.lat_deg,
            body.wind_speed_km_s,
        );
        if let Err(err) = &field_line {
            warn!(body = %body.name, error = %err, "field line rejected");
        }
        let footpoint_lon_deg = field_line.as_ref().ok().map(|line| line.footpoint_longitude());

        let stonyhurst_lon_deg = earth.map(|e| carrington_to_stonyhurst(position.lon_deg, e.lon_deg));
        let earth_separation = earth.map(|e| EarthSeparation {
            longitude_deg: signed_separation(e.lon_deg, position.lon_deg),
            latitude_deg: position.lat_deg - e.lat_deg,
        });

        let tolerance = self.config.connection_tolerance_deg;
        let reference_separation = reference.map(|point| {
            let footpoint_deg = footpoint_lon_deg.map(|fp| signed_separation(point.lon_deg, fp));
            ReferenceSeparation {
                longitude_deg: separation(point.lon_deg, position.lon_deg),
                longitude_signed_deg: signed_separation(point.lon_deg, position.lon_deg),
                latitude_deg: position.lat_deg - point.lat_deg,
                footpoint_deg,
                magnetically_connected: footpoint_deg.is_some_and(|d| d.abs() <= tolerance),
            }
        });

        debug!(
            body = %body.name,
            lon = position.lon_deg,
            lat = position.lat_deg,
            r = position.radius_au,
            "body modelled"
        );

        ResolvedBody {
            position,
            stonyhurst_lon_deg,
            field_line,
            footpoint_lon_deg,
            earth_separation,
            reference_separation,
        }
    }
}

/// Catalog bodies share one query whatever alias was used; other names go verbatim.
fn canonical_key(name: &str) -> String {
    catalog::lookup(name)
        .map(|body| body.name.to_string())
        .unwrap_or_else(|| name.trim().to_string())
}
