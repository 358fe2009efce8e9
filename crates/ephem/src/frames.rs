//! Heliographic reference frames.
//!
//! Carrington coordinates are derived from heliocentric ecliptic J2000 vectors with the
//! classical solar rotation elements: the solar equator is inclined by 7.25° to the
//! ecliptic, its ascending node drifts slowly with precession, and the Carrington
//! prime meridian rotates with the 25.38 day sidereal period. Stonyhurst longitudes
//! are Carrington longitudes measured from the sub-Earth meridian `L0`.

use chrono::{DateTime, Utc};
use solar_core::angles::{normalize_degrees, normalize_signed_degrees};
use solar_core::constants::{CARRINGTON_SIDEREAL_PERIOD_DAYS, DAYS_PER_CENTURY};
use solar_core::time::{centuries_since_j2000, unix_seconds_to_jd};
use solar_core::vector::{self, Vector3};

use crate::HeliographicPosition;

/// Inclination of the solar equator to the ecliptic (degrees).
pub const SOLAR_EQUATOR_INCLINATION_DEG: f64 = 7.25;
/// Julian date at which the Carrington prime meridian crossed the ascending node.
const CARRINGTON_EPOCH_JD: f64 = 2_398_220.0;
/// General precession in ecliptic longitude (degrees per Julian century).
const PRECESSION_DEG_PER_CENTURY: f64 = 1.396_971;

/// Heliographic frames accepted for reference coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    Carrington,
    Stonyhurst,
}

impl Frame {
    pub fn label(self) -> &'static str {
        match self {
            Self::Carrington => "Carrington",
            Self::Stonyhurst => "Stonyhurst",
        }
    }

    /// Whether `lon` lies inside the longitude domain of this frame.
    ///
    /// Carrington longitudes live in `[0, 360)`, Stonyhurst in `[-180, 180]`.
    pub fn accepts_longitude(self, lon: f64) -> bool {
        match self {
            Self::Carrington => (0.0..360.0).contains(&lon),
            Self::Stonyhurst => (-180.0..=180.0).contains(&lon),
        }
    }

    /// Printable longitude domain, used in validation messages.
    pub fn longitude_domain(self) -> &'static str {
        match self {
            Self::Carrington => "[0, 360)",
            Self::Stonyhurst => "[-180, 180]",
        }
    }
}

/// Julian date (UT) of a timestamp.
pub fn julian_date(epoch: DateTime<Utc>) -> f64 {
    let seconds = epoch.timestamp() as f64 + f64::from(epoch.timestamp_subsec_nanos()) * 1e-9;
    unix_seconds_to_jd(seconds)
}

/// Ecliptic longitude of the ascending node of the solar equator, ecliptic of date.
pub fn solar_node_longitude(jd: f64) -> f64 {
    73.6667 + 1.395_833_3 * (jd - 2_396_758.0) / DAYS_PER_CENTURY
}

/// Angle of the Carrington prime meridian past the ascending node, in `[0, 360)`.
pub fn carrington_prime_meridian(jd: f64) -> f64 {
    normalize_degrees((jd - CARRINGTON_EPOCH_JD) * 360.0 / CARRINGTON_SIDEREAL_PERIOD_DAYS)
}

/// Convert a heliocentric ecliptic J2000 vector (AU) into Carrington coordinates.
pub fn ecliptic_j2000_to_carrington(position_au: &Vector3, jd: f64) -> HeliographicPosition {
    let (lon_j2000, lat, radius_au) = vector::to_spherical(position_au);
    let lon_of_date = lon_j2000 + PRECESSION_DEG_PER_CENTURY * centuries_since_j2000(jd);

    let unit = vector::from_spherical(lon_of_date, lat, 1.0);
    let node_aligned = vector::rotate_z(&unit, solar_node_longitude(jd).to_radians());
    let equatorial = vector::rotate_x(&node_aligned, SOLAR_EQUATOR_INCLINATION_DEG.to_radians());
    let (lon_from_node, helio_lat, _) = vector::to_spherical(&equatorial);

    HeliographicPosition {
        radius_au,
        lon_deg: normalize_degrees(lon_from_node - carrington_prime_meridian(jd)),
        lat_deg: helio_lat,
    }
}

/// Stonyhurst longitude of a Carrington longitude, given the sub-Earth longitude `l0`.
pub fn carrington_to_stonyhurst(carrington_lon: f64, l0: f64) -> f64 {
    normalize_signed_degrees(carrington_lon - l0)
}

/// Carrington longitude/latitude of a Stonyhurst coordinate, given `l0`.
///
/// Both frames share the solar rotation axis, so latitude passes through unchanged.
pub fn stonyhurst_to_carrington(stonyhurst_lon: f64, lat: f64, l0: f64) -> (f64, f64) {
    (normalize_degrees(stonyhurst_lon + l0), lat)
}
