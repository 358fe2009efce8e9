//! Offline planetary ephemeris from JPL approximate Keplerian elements.
//!
//! Elements and rates follow Standish, "Keplerian Elements for Approximate Positions
//! of the Major Planets" (table 1, valid 1800 AD – 2050 AD). Accuracy is a few
//! arcminutes, far below the spread of any Parker spiral assumption.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use solar_core::time::centuries_since_j2000;
use solar_core::vector::Vector3;
use tracing::trace;

use crate::catalog::{self, BodyKind};
use crate::frames::{self, julian_date};
use crate::{Ephemeris, EphemerisError, HeliographicPosition};

/// First Julian date covered by the element table (1800-01-01).
pub const VALID_FROM_JD: f64 = 2_378_496.5;
/// Last Julian date covered by the element table (2051-01-01, exclusive).
pub const VALID_UNTIL_JD: f64 = 2_470_172.5;

const BACKEND: &str = "analytic";

/// Keplerian elements at J2000 with their per-century rates.
#[derive(Debug, Clone, Copy)]
struct ElementSet {
    semi_major_axis_au: [f64; 2],
    eccentricity: [f64; 2],
    inclination_deg: [f64; 2],
    mean_longitude_deg: [f64; 2],
    perihelion_longitude_deg: [f64; 2],
    node_longitude_deg: [f64; 2],
}

impl ElementSet {
    fn at(&self, t: f64) -> [f64; 6] {
        let eval = |p: [f64; 2]| p[0] + p[1] * t;
        [
            eval(self.semi_major_axis_au),
            eval(self.eccentricity),
            eval(self.inclination_deg),
            eval(self.mean_longitude_deg),
            eval(self.perihelion_longitude_deg),
            eval(self.node_longitude_deg),
        ]
    }
}

const PLANET_ELEMENTS: &[(&str, ElementSet)] = &[
    (
        "Mercury",
        ElementSet {
            semi_major_axis_au: [0.387_099_27, 0.000_000_37],
            eccentricity: [0.205_635_93, 0.000_019_06],
            inclination_deg: [7.004_979_02, -0.005_947_49],
            mean_longitude_deg: [252.250_323_50, 149_472.674_111_75],
            perihelion_longitude_deg: [77.457_796_28, 0.160_476_89],
            node_longitude_deg: [48.330_765_93, -0.125_340_81],
        },
    ),
    (
        "Venus",
        ElementSet {
            semi_major_axis_au: [0.723_335_66, 0.000_003_90],
            eccentricity: [0.006_776_72, -0.000_041_07],
            inclination_deg: [3.394_676_05, -0.000_788_90],
            mean_longitude_deg: [181.979_099_50, 58_517.815_387_29],
            perihelion_longitude_deg: [131.602_467_18, 0.002_683_29],
            node_longitude_deg: [76.679_842_55, -0.277_694_18],
        },
    ),
    (
        catalog::EARTH,
        ElementSet {
            semi_major_axis_au: [1.000_002_61, 0.000_005_62],
            eccentricity: [0.016_711_23, -0.000_043_92],
            inclination_deg: [-0.000_015_31, -0.012_946_68],
            mean_longitude_deg: [100.464_571_66, 35_999.372_449_81],
            perihelion_longitude_deg: [102.937_681_93, 0.323_273_64],
            node_longitude_deg: [0.0, 0.0],
        },
    ),
    (
        "Mars",
        ElementSet {
            semi_major_axis_au: [1.523_710_34, 0.000_018_47],
            eccentricity: [0.093_394_10, 0.000_078_82],
            inclination_deg: [1.849_691_42, -0.008_131_31],
            mean_longitude_deg: [-4.553_432_05, 19_140.302_684_99],
            perihelion_longitude_deg: [-23.943_629_59, 0.444_410_88],
            node_longitude_deg: [49.559_538_91, -0.292_573_43],
        },
    ),
    (
        "Jupiter",
        ElementSet {
            semi_major_axis_au: [5.202_887_00, -0.000_116_07],
            eccentricity: [0.048_386_24, -0.000_132_53],
            inclination_deg: [1.304_396_95, -0.001_837_14],
            mean_longitude_deg: [34.396_440_51, 3_034.746_127_75],
            perihelion_longitude_deg: [14.728_479_83, 0.212_526_68],
            node_longitude_deg: [100.473_909_09, 0.204_691_06],
        },
    ),
    (
        "Saturn",
        ElementSet {
            semi_major_axis_au: [9.536_675_94, -0.001_250_60],
            eccentricity: [0.053_861_79, -0.000_509_91],
            inclination_deg: [2.485_991_87, 0.001_936_09],
            mean_longitude_deg: [49.954_244_23, 1_222.493_622_01],
            perihelion_longitude_deg: [92.598_878_31, -0.418_972_16],
            node_longitude_deg: [113.662_424_48, -0.288_677_94],
        },
    ),
    (
        "Uranus",
        ElementSet {
            semi_major_axis_au: [19.189_164_64, -0.001_961_76],
            eccentricity: [0.047_257_44, -0.000_043_97],
            inclination_deg: [0.772_637_83, -0.002_429_39],
            mean_longitude_deg: [313.238_104_51, 428.482_027_85],
            perihelion_longitude_deg: [170.954_276_30, 0.408_052_81],
            node_longitude_deg: [74.016_925_03, 0.042_405_89],
        },
    ),
    (
        "Neptune",
        ElementSet {
            semi_major_axis_au: [30.069_922_76, 0.000_262_91],
            eccentricity: [0.008_590_48, 0.000_051_05],
            inclination_deg: [1.770_043_47, 0.000_353_72],
            mean_longitude_deg: [-55.120_029_69, 218.459_453_25],
            perihelion_longitude_deg: [44.964_762_27, -0.322_414_64],
            node_longitude_deg: [131.784_225_74, -0.005_086_64],
        },
    ),
];

/// Deterministic offline ephemeris for the eight planets.
///
/// Catalog spacecraft are recognised but reported as unavailable, since their
/// trajectories cannot be expressed with mean elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self
    }

    /// Heliocentric ecliptic J2000 position (AU) of a planet by canonical name.
    pub fn ecliptic_position(name: &str, jd: f64) -> Option<Vector3> {
        PLANET_ELEMENTS
            .iter()
            .find(|(planet, _)| *planet == name)
            .map(|(_, elements)| heliocentric_position(elements, jd))
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn resolve(
        &self,
        key: &str,
        epoch: DateTime<Utc>,
    ) -> Result<HeliographicPosition, EphemerisError> {
        let descriptor = catalog::lookup(key).ok_or_else(|| EphemerisError::UnknownBody {
            name: key.to_string(),
            backend: BACKEND,
        })?;

        let jd = julian_date(epoch);
        if !(VALID_FROM_JD..VALID_UNTIL_JD).contains(&jd) {
            return Err(EphemerisError::unavailable(
                descriptor.name,
                epoch,
                "outside the 1800-2050 validity window of the analytic elements",
            ));
        }

        let position = match descriptor.kind {
            BodyKind::Planet => Self::ecliptic_position(descriptor.name, jd),
            BodyKind::Spacecraft => None,
        }
        .ok_or_else(|| {
            EphemerisError::unavailable(
                descriptor.name,
                epoch,
                format!(
                    "no analytic model for {} `{}`; use the horizons backend",
                    descriptor.kind.label(),
                    descriptor.name
                ),
            )
        })?;

        let heliographic = frames::ecliptic_j2000_to_carrington(&position, jd);
        trace!(body = descriptor.name, ?heliographic, "analytic position");
        Ok(heliographic)
    }
}

fn heliocentric_position(elements: &ElementSet, jd: f64) -> Vector3 {
    let t = centuries_since_j2000(jd);
    let [a, e, incl, mean_lon, peri_lon, node] = elements.at(t);

    let arg_perihelion = (peri_lon - node).to_radians();
    let mean_anomaly = wrap_pi((mean_lon - peri_lon).to_radians());
    let ea = solve_kepler(mean_anomaly, e);

    let x_orb = a * (ea.cos() - e);
    let y_orb = a * (1.0 - e * e).sqrt() * ea.sin();

    let (sin_w, cos_w) = arg_perihelion.sin_cos();
    let (sin_om, cos_om) = node.to_radians().sin_cos();
    let (sin_i, cos_i) = incl.to_radians().sin_cos();

    [
        (cos_w * cos_om - sin_w * sin_om * cos_i) * x_orb
            + (-sin_w * cos_om - cos_w * sin_om * cos_i) * y_orb,
        (cos_w * sin_om + sin_w * cos_om * cos_i) * x_orb
            + (-sin_w * sin_om + cos_w * cos_om * cos_i) * y_orb,
        (sin_w * sin_i) * x_orb + (cos_w * sin_i) * y_orb,
    ]
}

fn wrap_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ea = mean_anomaly + e * mean_anomaly.sin();
    for _ in 0..12 {
        let delta = (ea - e * ea.sin() - mean_anomaly) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ea
}
