use chrono::{TimeZone, Utc};
use rstest::rstest;
use solar_mach::config::load_manifest;
use solar_mach::constellation::input::{parse_body_list, parse_timestamp};
use solar_mach::constellation::{BodyRequest, ConstellationRequest, InputError};
use solar_mach::ephem::Frame;

#[rstest]
#[case("2021-10-28 15:30:00")]
#[case("2021-10-28T15:30:00")]
#[case("2021-10-28 15:30")]
#[case("2021-10-28T15:30:00Z")]
#[case("2021-10-28T17:30:00+02:00")]
#[case(" 2021-10-28 15:30:00.000 ")]
fn timestamps_in_common_formats(#[case] input: &str) {
    let expected = Utc.with_ymd_and_hms(2021, 10, 28, 15, 30, 0).unwrap();
    assert_eq!(parse_timestamp(input).unwrap(), expected);
}

#[test]
fn bare_date_means_midnight_and_garbage_is_rejected() {
    let midnight = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2020-01-01").unwrap(), midnight);
    assert!(matches!(
        parse_timestamp("yesterday"),
        Err(InputError::InvalidTimestamp { .. })
    ));
}

#[test]
fn body_list_pairs_names_with_speeds() {
    let bodies = parse_body_list("Earth, STEREO A ,PSP", "400, 350,600", 400.0).unwrap();
    assert_eq!(
        bodies,
        vec![
            BodyRequest::new(0, "Earth", 400.0).unwrap(),
            BodyRequest::new(1, "STEREO A", 350.0).unwrap(),
            BodyRequest::new(2, "PSP", 600.0).unwrap(),
        ]
    );
}

#[test]
fn empty_speed_list_applies_default() {
    let bodies = parse_body_list("Earth,Mars", "", 450.0).unwrap();
    assert!(bodies.iter().all(|b| b.wind_speed_km_s == 450.0));
}

#[test]
fn every_bad_token_is_reported() {
    let errors = parse_body_list("Earth,,Mars", "400,fast,-3", 400.0).unwrap_err();
    assert!(errors.contains(&InputError::EmptyBodyName { index: 1 }));
    assert!(errors.iter().any(|e| matches!(
        e,
        InputError::MalformedToken { index: 1, token, .. } if token == "fast"
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        InputError::InvalidWindSpeed { body, value } if body == "Mars" && *value == -3.0
    )));
}

#[test]
fn length_mismatch_is_an_error() {
    let errors = parse_body_list("Earth,Mars,Venus", "400,400", 400.0).unwrap_err();
    assert_eq!(
        errors,
        vec![InputError::LengthMismatch {
            bodies: 3,
            speeds: 2
        }]
    );
}

#[test]
fn duplicates_are_kept() {
    let bodies = parse_body_list("Earth,Earth", "400,500", 400.0).unwrap();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1].wind_speed_km_s, 500.0);
}

#[test]
fn request_from_manifest_fills_default_speeds() {
    let manifest = load_manifest("configs/scenarios/example.toml").unwrap();
    let request = ConstellationRequest::from_manifest(&manifest).unwrap();

    assert_eq!(request.epoch, Utc.with_ymd_and_hms(2021, 10, 28, 15, 30, 0).unwrap());
    let names: Vec<_> = request.bodies.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Earth", "Venus", "Mars", "Mercury"]);
    assert_eq!(request.bodies[2].wind_speed_km_s, 400.0);

    let reference = request.reference.unwrap();
    assert_eq!(reference.frame, Frame::Stonyhurst);
    assert_eq!(reference.lon_deg, 20.0);
}
