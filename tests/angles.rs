use approx::assert_abs_diff_eq;
use rstest::rstest;
use solar_mach::core::angles::{
    normalize_degrees, normalize_signed_degrees, separation, signed_separation,
};

#[rstest]
#[case(0.0, 0.0)]
#[case(360.0, 0.0)]
#[case(-10.0, 350.0)]
#[case(725.0, 5.0)]
#[case(-1e-14, 0.0)]
fn normalize_wraps_into_half_open_circle(#[case] lon: f64, #[case] expected: f64) {
    let wrapped = normalize_degrees(lon);
    assert!((0.0..360.0).contains(&wrapped), "{lon} -> {wrapped}");
    assert_abs_diff_eq!(wrapped, expected, epsilon = 1e-9);
}

#[test]
fn normalize_is_periodic() {
    for lon in [-721.5, -33.0, 0.25, 123.4, 359.9] {
        let base = normalize_degrees(lon);
        for k in -3..=3 {
            let shifted = normalize_degrees(lon + 360.0 * f64::from(k));
            assert_abs_diff_eq!(shifted, base, epsilon = 1e-9);
        }
    }
}

#[rstest]
#[case(10.0, 350.0, 20.0)]
#[case(350.0, 10.0, 20.0)]
#[case(0.0, 180.0, 180.0)]
#[case(90.0, 90.0, 0.0)]
#[case(-170.0, 170.0, 20.0)]
fn separation_takes_the_short_way_round(#[case] a: f64, #[case] b: f64, #[case] expected: f64) {
    assert_abs_diff_eq!(separation(a, b), expected, epsilon = 1e-9);
}

#[test]
fn separation_is_symmetric_and_bounded() {
    let longitudes = [0.0, 1.0, 45.0, 179.0, 180.0, 181.0, 270.0, 359.0, -90.0, 540.0];
    for &a in &longitudes {
        for &b in &longitudes {
            let ab = separation(a, b);
            assert!((0.0..=180.0).contains(&ab), "separation({a}, {b}) = {ab}");
            assert_abs_diff_eq!(ab, separation(b, a), epsilon = 1e-9);
        }
    }
}

#[test]
fn signed_separation_measures_to_minus_from() {
    assert_abs_diff_eq!(signed_separation(350.0, 10.0), 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(signed_separation(10.0, 350.0), -20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(signed_separation(0.0, 180.0), 180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(normalize_signed_degrees(-180.0), 180.0, epsilon = 1e-9);
}
