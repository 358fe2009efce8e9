//! Core units, constants, and angle arithmetic shared across the Solar-MACH workspace.

/// Physical constants expressed in SI-derived units (unless stated otherwise).
pub mod constants {
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Nominal solar radius (km).
    pub const SOLAR_RADIUS_KM: f64 = 695_700.0;
    /// Nominal solar radius expressed in AU.
    pub const SOLAR_RADIUS_AU: f64 = SOLAR_RADIUS_KM / AU_KM;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Sidereal Carrington rotation period of the Sun (days).
    pub const CARRINGTON_SIDEREAL_PERIOD_DAYS: f64 = 25.38;
    /// Nominal slow solar wind speed (km/s).
    pub const DEFAULT_SOLAR_WIND_KM_S: f64 = 400.0;
    /// Julian date of the J2000.0 epoch.
    pub const J2000_JD: f64 = 2_451_545.0;
    /// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
    pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
    /// Days per Julian century.
    pub const DAYS_PER_CENTURY: f64 = 36_525.0;
    /// Public JPL Horizons REST endpoint.
    pub const HORIZONS_API_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::SECONDS_PER_DAY;

    /// Angular rate in radians per second for a rotation period given in days.
    #[inline]
    pub fn rotation_rate_rad_s(period_days: f64) -> f64 {
        std::f64::consts::TAU / (period_days * SECONDS_PER_DAY)
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::{DAYS_PER_CENTURY, J2000_JD, SECONDS_PER_DAY, UNIX_EPOCH_JD};

    /// Julian date for a Unix timestamp expressed in (fractional) seconds.
    #[inline]
    pub fn unix_seconds_to_jd(seconds: f64) -> f64 {
        UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY
    }

    /// Julian centuries elapsed since J2000.0.
    #[inline]
    pub fn centuries_since_j2000(jd: f64) -> f64 {
        (jd - J2000_JD) / DAYS_PER_CENTURY
    }
}

/// Wrap-aware longitude arithmetic. All functions take and return degrees.
pub mod angles {
    /// Normalize a longitude into `[0, 360)`.
    ///
    /// `rem_euclid` can round up to exactly 360.0 for tiny negative inputs, so that
    /// case is folded back to zero.
    #[inline]
    pub fn normalize_degrees(lon: f64) -> f64 {
        let wrapped = lon.rem_euclid(360.0);
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Normalize an angle into `(-180, 180]`.
    #[inline]
    pub fn normalize_signed_degrees(angle: f64) -> f64 {
        let wrapped = normalize_degrees(angle);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    /// Signed shortest-arc difference `to - from`, in `(-180, 180]`.
    ///
    /// Positive values mean `to` lies at larger (eastward, in Carrington terms)
    /// longitude than `from`.
    #[inline]
    pub fn signed_separation(from: f64, to: f64) -> f64 {
        normalize_signed_degrees(normalize_degrees(to) - normalize_degrees(from))
    }

    /// Unsigned shortest-arc separation between two longitudes, in `[0, 180]`.
    #[inline]
    pub fn separation(a: f64, b: f64) -> f64 {
        signed_separation(a, b).abs()
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector (AU or unit vectors depending on context).
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Rotate a vector about the x axis by `angle_rad` (passive rotation of the frame).
    #[inline]
    pub fn rotate_x(v: &Vector3, angle_rad: f64) -> Vector3 {
        let (s, c) = angle_rad.sin_cos();
        [v[0], c * v[1] + s * v[2], -s * v[1] + c * v[2]]
    }

    /// Rotate a vector about the z axis by `angle_rad` (passive rotation of the frame).
    #[inline]
    pub fn rotate_z(v: &Vector3, angle_rad: f64) -> Vector3 {
        let (s, c) = angle_rad.sin_cos();
        [c * v[0] + s * v[1], -s * v[0] + c * v[1], v[2]]
    }

    /// Spherical longitude/latitude (degrees) and radius of a Cartesian vector.
    pub fn to_spherical(v: &Vector3) -> (f64, f64, f64) {
        let r = norm(v);
        if r == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let lon = v[1].atan2(v[0]).to_degrees();
        let lat = (v[2] / r).clamp(-1.0, 1.0).asin().to_degrees();
        (lon, lat, r)
    }

    /// Cartesian vector for spherical longitude/latitude (degrees) and radius.
    pub fn from_spherical(lon_deg: f64, lat_deg: f64, r: f64) -> Vector3 {
        let (slon, clon) = lon_deg.to_radians().sin_cos();
        let (slat, clat) = lat_deg.to_radians().sin_cos();
        [r * clat * clon, r * clat * slon, r * slat]
    }
}
