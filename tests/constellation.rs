use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeZone, Utc};
use solar_mach::config::{DispatchMode, ModelConfig};
use solar_mach::constellation::{
    ConstellationEngine, ConstellationError, ConstellationRequest, CoordinateError, EngineState,
    InputError, ReferenceOutcome, ReferenceRequest, RowOutcome,
};
use solar_mach::ephem::{Ephemeris, EphemerisError, Frame, HeliographicPosition};
use solar_mach::spiral::SpiralError;

/// Deterministic ephemeris with optional per-body latency.
#[derive(Default)]
struct StubEphemeris {
    positions: HashMap<&'static str, HeliographicPosition>,
    delays: HashMap<&'static str, Duration>,
    calls: AtomicUsize,
}

impl StubEphemeris {
    fn with(mut self, name: &'static str, lon_deg: f64, lat_deg: f64, radius_au: f64) -> Self {
        self.positions.insert(
            name,
            HeliographicPosition {
                radius_au,
                lon_deg,
                lat_deg,
            },
        );
        self
    }

    fn delayed(mut self, name: &'static str, delay: Duration) -> Self {
        self.delays.insert(name, delay);
        self
    }
}

impl Ephemeris for StubEphemeris {
    fn backend_name(&self) -> &'static str {
        "stub"
    }

    fn resolve(
        &self,
        key: &str,
        _epoch: DateTime<Utc>,
    ) -> Result<HeliographicPosition, EphemerisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(key) {
            thread::sleep(*delay);
        }
        self.positions
            .get(key)
            .copied()
            .ok_or_else(|| EphemerisError::UnknownBody {
                name: key.to_string(),
                backend: "stub",
            })
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 10, 28, 15, 30, 0).unwrap()
}

fn engine_with(stub: StubEphemeris, config: ModelConfig) -> ConstellationEngine {
    ConstellationEngine::new(epoch(), Arc::new(stub), config).unwrap()
}

fn earth_stub() -> StubEphemeris {
    StubEphemeris::default().with("Earth", 100.0, 3.0, 0.99)
}

#[test]
fn unknown_body_becomes_failed_row() {
    let mut engine = engine_with(earth_stub(), ModelConfig::default());
    engine.add_body("Earth", 400.0).unwrap();
    engine.add_body("BadBody", 400.0).unwrap();
    assert_eq!(engine.state(), EngineState::Initialized);

    let result = engine.compute().unwrap();
    assert_eq!(engine.state(), EngineState::Assembled);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.resolved().count(), 1);

    assert_eq!(result.rows[0].name, "Earth");
    assert!(matches!(result.rows[0].outcome, RowOutcome::Resolved(_)));
    assert_eq!(result.rows[1].name, "BadBody");
    assert!(matches!(
        &result.rows[1].outcome,
        RowOutcome::Failed(EphemerisError::UnknownBody { name, .. }) if name == "BadBody"
    ));
}

#[test]
fn nothing_resolved_fails_with_every_failure() {
    let mut engine = engine_with(earth_stub(), ModelConfig::default());
    engine.add_body("Nope", 400.0).unwrap();
    engine.add_body("Nada", 300.0).unwrap();

    match engine.compute() {
        Err(ConstellationError::NoBodiesResolved { failures }) => {
            let names: Vec<_> = failures.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, ["Nope", "Nada"]);
            let message = ConstellationError::NoBodiesResolved { failures }.to_string();
            assert!(message.starts_with("none of the 2 requested bodies"), "{message}");
            assert!(message.contains("#0 Nope: unknown body"), "{message}");
            assert!(message.contains("#1 Nada"), "{message}");
        }
        other => panic!("expected aggregate failure, got {other:?}"),
    }
    assert_eq!(engine.state(), EngineState::Failed);
}

#[test]
fn stonyhurst_reference_lines_up_with_body_at_converted_longitude() {
    let stub = earth_stub().with("Probe", 120.0, 0.0, 0.5);
    let mut engine = engine_with(stub, ModelConfig::default());
    engine.add_body("Probe", 400.0).unwrap();
    engine
        .set_reference(20.0, 0.0, Frame::Stonyhurst, 400.0)
        .unwrap();

    let result = engine.compute().unwrap();
    let reference = result.accepted_reference().unwrap();
    assert_abs_diff_eq!(reference.point.lon_deg, 120.0, epsilon = 1e-9);
    assert_eq!(reference.point.input_frame, Frame::Stonyhurst);

    let (_, probe) = result.resolved().next().unwrap();
    let separation = probe.reference_separation.unwrap();
    assert_abs_diff_eq!(separation.longitude_deg, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(probe.stonyhurst_lon_deg.unwrap(), 20.0, epsilon = 1e-9);
}

#[test]
fn connectivity_follows_footpoint_within_tolerance() {
    // At 400 km/s a body at 1 AU maps back 61.11° ahead in longitude.
    let stub = earth_stub()
        .with("Connected", 10.0, 0.0, 1.0)
        .with("Remote", 300.0, 0.0, 1.0);
    let mut engine = engine_with(stub, ModelConfig::default());
    engine.add_body("Connected", 400.0).unwrap();
    engine.add_body("Remote", 400.0).unwrap();
    engine
        .set_reference(75.0, 5.0, Frame::Carrington, 400.0)
        .unwrap();

    let result = engine.compute().unwrap();
    let rows: Vec<_> = result.resolved().collect();

    let connected = rows[0].1;
    assert_abs_diff_eq!(connected.footpoint_lon_deg.unwrap(), 71.1136, epsilon = 1e-3);
    let sep = connected.reference_separation.unwrap();
    assert_abs_diff_eq!(sep.footpoint_deg.unwrap(), -3.8864, epsilon = 1e-3);
    assert_abs_diff_eq!(sep.longitude_deg, 65.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sep.longitude_signed_deg, -65.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sep.latitude_deg, -5.0, epsilon = 1e-9);
    assert!(sep.magnetically_connected);

    let remote = rows[1].1;
    assert_eq!(remote.magnetically_connected(), Some(false));
    assert_abs_diff_eq!(
        remote.reference_separation.unwrap().longitude_deg,
        135.0,
        epsilon = 1e-9
    );

    let reference_line = result.accepted_reference().unwrap().field_line.as_ref().unwrap();
    assert_abs_diff_eq!(reference_line.source_lon_deg, 75.0, epsilon = 1e-9);
}

#[test]
fn earth_separations_are_body_minus_earth() {
    let stub = earth_stub().with("Probe", 70.0, -4.0, 0.3);
    let mut engine = engine_with(stub, ModelConfig::default());
    engine.add_body("Probe", 400.0).unwrap();

    let result = engine.compute().unwrap();
    let (_, probe) = result.resolved().next().unwrap();
    let earth = probe.earth_separation.unwrap();
    assert_abs_diff_eq!(earth.longitude_deg, -30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(earth.latitude_deg, -7.0, epsilon = 1e-9);
    assert!(probe.reference_separation.is_none());
    assert_eq!(result.carrington_l0(), Some(100.0));
}

#[test]
fn missing_earth_leaves_stonyhurst_columns_empty() {
    let stub = StubEphemeris::default().with("Probe", 70.0, 0.0, 0.3);
    let mut engine = engine_with(stub, ModelConfig::default());
    engine.add_body("Probe", 400.0).unwrap();

    let result = engine.compute().unwrap();
    assert!(result.earth.is_none());
    let (_, probe) = result.resolved().next().unwrap();
    assert!(probe.stonyhurst_lon_deg.is_none());
    assert!(probe.earth_separation.is_none());
}

#[test]
fn compute_twice_gives_identical_tables() {
    let stub = earth_stub()
        .with("Probe", 200.0, 1.0, 0.7)
        .with("Mars", 250.0, 2.0, 1.5);
    let mut engine = engine_with(stub, ModelConfig::default());
    engine.add_body("Probe", 350.0).unwrap();
    engine.add_body("BadBody", 400.0).unwrap();
    engine.add_body("Mars", 500.0).unwrap();
    engine.set_reference(180.0, 0.0, Frame::Carrington, 400.0).unwrap();

    let first = engine.compute().unwrap();
    let second = engine.compute().unwrap();
    assert_eq!(first, second);
}

#[test]
fn rows_follow_input_order_not_completion_order() {
    let stub = earth_stub()
        .with("Slowest", 10.0, 0.0, 0.4)
        .with("Slow", 20.0, 0.0, 0.6)
        .with("Fast", 30.0, 0.0, 0.8)
        .delayed("Slowest", Duration::from_millis(200))
        .delayed("Slow", Duration::from_millis(80));
    let mut engine = engine_with(stub, ModelConfig::default());
    for name in ["Slowest", "Slow", "Fast"] {
        engine.add_body(name, 400.0).unwrap();
    }

    let result = engine.compute().unwrap();
    let names: Vec<_> = result.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Slowest", "Slow", "Fast"]);
    let lons: Vec<_> = result
        .resolved()
        .map(|(_, body)| body.position.lon_deg)
        .collect();
    assert_eq!(lons, [10.0, 20.0, 30.0]);
}

#[test]
fn straggler_times_out_while_others_resolve() {
    let stub = earth_stub()
        .with("Quick", 30.0, 0.0, 0.8)
        .with("Stuck", 40.0, 0.0, 0.8)
        .delayed("Stuck", Duration::from_secs(3));
    let config = ModelConfig {
        ephemeris_timeout_secs: 0.3,
        ..ModelConfig::default()
    };
    let mut engine = engine_with(stub, config);
    engine.add_body("Quick", 400.0).unwrap();
    engine.add_body("Stuck", 400.0).unwrap();

    let result = engine.compute().unwrap();
    assert!(matches!(result.rows[0].outcome, RowOutcome::Resolved(_)));
    match &result.rows[1].outcome {
        RowOutcome::Failed(EphemerisError::Unavailable { name, reason, .. }) => {
            assert_eq!(name, "Stuck");
            assert!(reason.contains("timed out"), "{reason}");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn sequential_dispatch_matches_concurrent() {
    let build = |dispatch| {
        let stub = earth_stub()
            .with("Probe", 200.0, 1.0, 0.7)
            .with("Mars", 250.0, 2.0, 1.5);
        let mut engine = engine_with(
            stub,
            ModelConfig {
                dispatch,
                ..ModelConfig::default()
            },
        );
        for name in ["Mars", "BadBody", "Probe"] {
            engine.add_body(name, 400.0).unwrap();
        }
        engine.compute().unwrap()
    };
    assert_eq!(
        build(DispatchMode::Sequential),
        build(DispatchMode::Concurrent)
    );
}

#[test]
fn duplicate_bodies_are_listed_but_queried_once() {
    let stub = Arc::new(earth_stub());
    let mut engine =
        ConstellationEngine::new(epoch(), stub.clone(), ModelConfig::default()).unwrap();
    engine.add_body("Earth", 400.0).unwrap();
    engine.add_body("earth", 600.0).unwrap();

    let result = engine.compute().unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[1].name, "earth");
    assert_eq!(result.rows[1].wind_speed_km_s, 600.0);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn bad_parameters_are_rejected_at_the_boundary() {
    let mut engine = engine_with(earth_stub(), ModelConfig::default());
    assert!(matches!(
        engine.add_body("   ", 400.0),
        Err(ConstellationError::InvalidInput(InputError::EmptyBodyName { .. }))
    ));
    assert!(matches!(
        engine.add_body("Earth", 0.0),
        Err(ConstellationError::InvalidInput(InputError::InvalidWindSpeed { .. }))
    ));
    assert!(matches!(
        engine.set_reference(360.0, 0.0, Frame::Carrington, 400.0),
        Err(ConstellationError::InvalidCoordinate(
            CoordinateError::LongitudeOutOfRange { .. }
        ))
    ));
    assert!(matches!(
        engine.set_reference(-190.0, 0.0, Frame::Stonyhurst, 400.0),
        Err(ConstellationError::InvalidCoordinate(
            CoordinateError::LongitudeOutOfRange { .. }
        ))
    ));
    assert!(matches!(
        engine.set_reference(10.0, 91.0, Frame::Carrington, 400.0),
        Err(ConstellationError::InvalidCoordinate(
            CoordinateError::LatitudeOutOfRange { .. }
        ))
    ));
    assert!(matches!(
        engine.set_reference(10.0, f64::NAN, Frame::Carrington, 400.0),
        Err(ConstellationError::InvalidCoordinate(_))
    ));
    assert!(engine.bodies().is_empty());
}

#[test]
fn stonyhurst_reference_without_earth_is_a_coordinate_error() {
    let stub = StubEphemeris::default().with("Probe", 70.0, 0.0, 0.3);
    let mut engine = engine_with(stub, ModelConfig::default());
    assert!(matches!(
        engine.set_reference(0.0, 0.0, Frame::Stonyhurst, 400.0),
        Err(ConstellationError::InvalidCoordinate(CoordinateError::Transform(_)))
    ));
}

#[test]
fn rejected_reference_in_request_does_not_block_bodies() {
    let stub = earth_stub().with("Probe", 70.0, 0.0, 0.3);
    let request = ConstellationRequest {
        epoch: epoch(),
        bodies: vec![
            solar_mach::constellation::BodyRequest::new(0, "Probe", 400.0).unwrap(),
        ],
        reference: Some(ReferenceRequest {
            frame: Frame::Carrington,
            lon_deg: 400.0,
            lat_deg: 0.0,
            wind_speed_km_s: 400.0,
        }),
    };
    let mut engine =
        ConstellationEngine::from_request(&request, Arc::new(stub), ModelConfig::default())
            .unwrap();

    let result = engine.compute().unwrap();
    assert!(matches!(
        result.reference,
        Some(ReferenceOutcome::Rejected(CoordinateError::LongitudeOutOfRange { .. }))
    ));
    let (_, probe) = result.resolved().next().unwrap();
    assert!(probe.reference_separation.is_none());
}

#[test]
fn stalled_reference_wind_only_drops_its_spiral() {
    let stub = earth_stub().with("Connected", 10.0, 0.0, 1.0);
    let request = ConstellationRequest {
        epoch: epoch(),
        bodies: vec![
            solar_mach::constellation::BodyRequest::new(0, "Connected", 400.0).unwrap(),
        ],
        reference: Some(ReferenceRequest {
            frame: Frame::Carrington,
            lon_deg: 75.0,
            lat_deg: 0.0,
            wind_speed_km_s: 0.0,
        }),
    };
    let mut engine =
        ConstellationEngine::from_request(&request, Arc::new(stub), ModelConfig::default())
            .unwrap();

    let result = engine.compute().unwrap();
    let reference = result.accepted_reference().expect("reference accepted");
    assert_eq!(reference.point.wind_speed_km_s, 0.0);
    assert!(matches!(
        reference.field_line,
        Err(SpiralError::InvalidSolarWindSpeed { .. })
    ));

    let (_, body) = result.resolved().next().unwrap();
    let separation = body.reference_separation.expect("separations computed");
    assert_abs_diff_eq!(separation.longitude_deg, 65.0, epsilon = 1e-9);
    assert!(separation.magnetically_connected);
}

#[test]
fn invalid_model_config_is_refused() {
    let config = ModelConfig {
        sample_step_au: -1.0,
        ..ModelConfig::default()
    };
    assert!(matches!(
        ConstellationEngine::new(epoch(), Arc::new(earth_stub()), config),
        Err(ConstellationError::Config(_))
    ));
}
