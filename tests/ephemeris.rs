use std::time::Duration;

use approx::assert_abs_diff_eq;
use chrono::{TimeZone, Utc};
use solar_mach::config::ModelConfig;
use solar_mach::ephem::catalog::{self, BODY_CATALOG, BodyKind};
use solar_mach::ephem::frames::{
    carrington_to_stonyhurst, julian_date, stonyhurst_to_carrington,
};
use solar_mach::ephem::horizons::{
    DEFAULT_HORIZONS_URL, HorizonsEphemeris, VectorTableError, parse_vector_table,
};
use solar_mach::ephem::{AnalyticEphemeris, Ephemeris, EphemerisError, Frame};

#[test]
fn catalog_resolves_aliases_case_insensitively() {
    assert_eq!(catalog::lookup("stereo a").unwrap().name, "STEREO-A");
    assert_eq!(catalog::lookup("STA").unwrap().name, "STEREO-A");
    assert_eq!(catalog::lookup("parker solar probe").unwrap().name, "PSP");
    assert_eq!(catalog::lookup("  earth ").map(|b| b.name), Some("Earth"));
    assert!(catalog::lookup("BadBody").is_none());

    let planets = BODY_CATALOG
        .iter()
        .filter(|b| b.kind == BodyKind::Planet)
        .count();
    assert_eq!(planets, 8);
}

#[test]
fn julian_date_of_j2000() {
    let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    assert_abs_diff_eq!(julian_date(epoch), 2_451_545.0, epsilon = 1e-9);
}

#[test]
fn sub_earth_longitude_matches_almanac() {
    // Astronomical Algorithms example 29.a: L0 = 238.63°, B0 = +5.99°.
    let epoch = Utc.with_ymd_and_hms(1992, 10, 13, 0, 0, 0).unwrap();
    let earth = AnalyticEphemeris.resolve("Earth", epoch).unwrap();
    assert_abs_diff_eq!(earth.lon_deg, 238.63, epsilon = 0.5);
    assert_abs_diff_eq!(earth.lat_deg, 5.99, epsilon = 0.3);
    assert_abs_diff_eq!(earth.radius_au, 0.9976, epsilon = 0.005);
}

#[test]
fn analytic_positions_at_2020() {
    let epoch = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let ephemeris = AnalyticEphemeris;

    let earth = ephemeris.resolve("Earth", epoch).unwrap();
    assert_abs_diff_eq!(earth.lon_deg, 70.9, epsilon = 0.5);
    assert_abs_diff_eq!(earth.lat_deg, -2.94, epsilon = 0.3);
    assert_abs_diff_eq!(ephemeris.carrington_l0(epoch).unwrap(), earth.lon_deg);

    let mars = ephemeris.resolve("mars", epoch).unwrap();
    assert_abs_diff_eq!(mars.radius_au, 1.5897, epsilon = 0.01);
    assert!((0.0..360.0).contains(&mars.lon_deg));
    assert!((-90.0..=90.0).contains(&mars.lat_deg));
}

#[test]
fn analytic_failures_are_classified() {
    let ephemeris = AnalyticEphemeris;
    let epoch = Utc.with_ymd_and_hms(2021, 10, 28, 15, 30, 0).unwrap();

    assert!(matches!(
        ephemeris.resolve("BadBody", epoch),
        Err(EphemerisError::UnknownBody { .. })
    ));
    match ephemeris.resolve("Solar Orbiter", epoch) {
        Err(EphemerisError::Unavailable { name, reason, .. }) => {
            assert_eq!(name, "Solar Orbiter");
            assert!(reason.contains("horizons"), "{reason}");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }

    let too_late = Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap();
    assert!(matches!(
        ephemeris.resolve("Earth", too_late),
        Err(EphemerisError::Unavailable { .. })
    ));
}

#[test]
fn stonyhurst_and_carrington_round_trip_through_l0() {
    let l0 = 70.9;
    assert_abs_diff_eq!(carrington_to_stonyhurst(70.9, l0), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(carrington_to_stonyhurst(30.0, l0), -40.9, epsilon = 1e-9);
    let (lon, lat) = stonyhurst_to_carrington(-90.0, 12.0, l0);
    assert_abs_diff_eq!(lon, 340.9, epsilon = 1e-9);
    assert_abs_diff_eq!(lat, 12.0);
}

#[test]
fn to_carrington_uses_earth_for_stonyhurst() {
    let ephemeris = AnalyticEphemeris;
    let epoch = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let l0 = ephemeris.carrington_l0(epoch).unwrap();

    let (lon, _) = ephemeris
        .to_carrington(20.0, 0.0, Frame::Stonyhurst, epoch)
        .unwrap();
    assert_abs_diff_eq!(lon, (l0 + 20.0) % 360.0, epsilon = 1e-9);

    let (lon, lat) = ephemeris
        .to_carrington(370.0, -5.0, Frame::Carrington, epoch)
        .unwrap();
    assert_abs_diff_eq!(lon, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(lat, -5.0);
}

#[test]
fn frame_longitude_domains() {
    assert!(Frame::Carrington.accepts_longitude(0.0));
    assert!(!Frame::Carrington.accepts_longitude(360.0));
    assert!(!Frame::Carrington.accepts_longitude(-1.0));
    assert!(Frame::Stonyhurst.accepts_longitude(-180.0));
    assert!(Frame::Stonyhurst.accepts_longitude(180.0));
    assert!(!Frame::Stonyhurst.accepts_longitude(200.0));
}

const VECTOR_REPLY: &str = "\
*******************************************************************************
Ephemeris / API_USER Thu Oct 28 15:30:00 2021 Pasadena, USA      / Horizons
*******************************************************************************
            JDTDB,            Calendar Date (TDB),                      X,                      Y,                      Z,
**************************************************************************************************************************
$$SOE
2459516.146608796, A.D. 2021-Oct-28 15:31:09.0000,  7.521394017371330E-01,  6.433207519497316E-01, -2.912612093826232E-05,
$$EOE
**************************************************************************************************************************
";

#[test]
fn horizons_vector_table_is_parsed() {
    let [x, y, z] = parse_vector_table(VECTOR_REPLY).unwrap();
    assert_abs_diff_eq!(x, 0.752_139_401_737_133, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.643_320_751_949_731_6, epsilon = 1e-15);
    assert_abs_diff_eq!(z, -2.912_612_093_826_232e-5, epsilon = 1e-18);
}

#[test]
fn horizons_errors_are_classified() {
    let unknown = "No matches found.\n";
    assert!(matches!(
        parse_vector_table(unknown),
        Err(VectorTableError::UnknownTarget(_))
    ));

    let no_data = "*****\nNo ephemeris for target \"Solar Orbiter\" prior to A.D. 2020-FEB-10\n";
    match parse_vector_table(no_data) {
        Err(VectorTableError::NoData(message)) => assert!(message.contains("prior to")),
        other => panic!("expected missing data, got {other:?}"),
    }

    let garbled = "$$SOE\n2459516.1, A.D., not-a-number, 1.0, 2.0,\n$$EOE\n";
    assert!(matches!(
        parse_vector_table(garbled),
        Err(VectorTableError::NoData(_))
    ));
}

#[test]
fn horizons_transport_failure_names_the_catalog_body() {
    let ephemeris =
        HorizonsEphemeris::new("http://127.0.0.1:9/api/horizons.api", Duration::from_secs(2))
            .unwrap();
    let epoch = Utc.with_ymd_and_hms(2021, 10, 28, 15, 30, 0).unwrap();
    match ephemeris.resolve("mars", epoch) {
        Err(EphemerisError::Unavailable { name, reason, .. }) => {
            assert_eq!(name, "Mars");
            assert!(reason.contains("horizons request"), "{reason}");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[test]
fn horizons_default_endpoint_matches_model_default() {
    assert_eq!(ModelConfig::default().horizons_url, DEFAULT_HORIZONS_URL);
}
