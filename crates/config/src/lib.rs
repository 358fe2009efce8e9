//! Configuration models and loaders for Solar-MACH.
//!
//! Two documents are understood: [`ModelConfig`] holds the physical constants and
//! engine knobs injected into the spiral model and constellation engine, and
//! [`ScenarioManifest`] describes a single constellation request. Both load from
//! TOML (by `.toml` extension) or YAML (anything else).

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solar_core::constants::{
    AU_KM, CARRINGTON_SIDEREAL_PERIOD_DAYS, DEFAULT_SOLAR_WIND_KM_S, HORIZONS_API_URL,
    SOLAR_RADIUS_AU,
};
use solar_core::units;
use thiserror::Error;

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Finest radial spacing accepted for spiral samples (AU).
pub const MIN_SAMPLE_STEP_AU: f64 = 1e-6;
/// Longest accepted ephemeris deadline (seconds).
pub const MAX_EPHEMERIS_TIMEOUT_SECS: f64 = 3_600.0;

/// How per-body ephemeris queries are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One worker thread per unique body, joined with a deadline.
    #[default]
    Concurrent,
    /// Query bodies one after another on the calling thread.
    Sequential,
}

/// Physical constants and engine parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Sidereal solar rotation period used for the spiral winding (days).
    pub sidereal_rotation_period_days: f64,
    /// Kilometres per AU.
    pub au_km: f64,
    /// Wind speed applied when a request omits speeds (km/s).
    pub default_wind_speed_km_s: f64,
    /// Radius where rendered spiral samples stop (AU).
    pub inner_boundary_au: f64,
    /// Radius at which field lines are backmapped to a footpoint (AU).
    pub footpoint_radius_au: f64,
    /// Radial spacing between spiral samples (AU).
    pub sample_step_au: f64,
    /// Maximum footpoint-to-reference separation counted as connected (degrees).
    pub connection_tolerance_deg: f64,
    /// Deadline for a single ephemeris query (seconds).
    pub ephemeris_timeout_secs: f64,
    pub dispatch: DispatchMode,
    /// Endpoint used by the Horizons backend.
    pub horizons_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sidereal_rotation_period_days: CARRINGTON_SIDEREAL_PERIOD_DAYS,
            au_km: AU_KM,
            default_wind_speed_km_s: DEFAULT_SOLAR_WIND_KM_S,
            inner_boundary_au: SOLAR_RADIUS_AU,
            footpoint_radius_au: SOLAR_RADIUS_AU,
            sample_step_au: 0.001,
            connection_tolerance_deg: 10.0,
            ephemeris_timeout_secs: 30.0,
            dispatch: DispatchMode::Concurrent,
            horizons_url: HORIZONS_API_URL.to_string(),
        }
    }
}

impl ModelConfig {
    /// Sidereal solar rotation rate Ω (rad/s).
    pub fn rotation_rate_rad_s(&self) -> f64 {
        units::rotation_rate_rad_s(self.sidereal_rotation_period_days)
    }

    /// Query deadline; values `validate` would reject fall back to the longest accepted one.
    pub fn ephemeris_timeout(&self) -> Duration {
        let secs = self.ephemeris_timeout_secs;
        if secs > 0.0 && secs <= MAX_EPHEMERIS_TIMEOUT_SECS {
            Duration::from_secs_f64(secs)
        } else {
            Duration::from_secs_f64(MAX_EPHEMERIS_TIMEOUT_SECS)
        }
    }

    /// Reject values the spiral model or engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("sidereal_rotation_period_days", self.sidereal_rotation_period_days)?;
        positive("au_km", self.au_km)?;
        positive("default_wind_speed_km_s", self.default_wind_speed_km_s)?;
        within(
            "sample_step_au",
            self.sample_step_au,
            MIN_SAMPLE_STEP_AU,
            f64::INFINITY,
        )?;
        within(
            "ephemeris_timeout_secs",
            self.ephemeris_timeout_secs,
            f64::MIN_POSITIVE,
            MAX_EPHEMERIS_TIMEOUT_SECS,
        )?;
        non_negative("inner_boundary_au", self.inner_boundary_au)?;
        non_negative("footpoint_radius_au", self.footpoint_radius_au)?;
        if !(0.0..=180.0).contains(&self.connection_tolerance_deg) {
            return Err(ConfigError::Invalid {
                field: "connection_tolerance_deg",
                reason: format!("{} is outside [0, 180]", self.connection_tolerance_deg),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be a positive number"),
        })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [{min}, {max}]"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be zero or positive"),
        })
    }
}

/// Ephemeris backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisBackend {
    #[default]
    Analytic,
    Horizons,
}

/// Heliographic frame of a reference point as written in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameConfig {
    #[default]
    Carrington,
    Stonyhurst,
}

/// One requested body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BodyEntry {
    pub name: String,
    /// Falls back to [`ModelConfig::default_wind_speed_km_s`].
    #[serde(default)]
    pub wind_speed_km_s: Option<f64>,
}

/// Reference point (e.g. flare location).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub frame: FrameConfig,
    pub lon_deg: f64,
    pub lat_deg: f64,
    #[serde(default)]
    pub wind_speed_km_s: Option<f64>,
}

/// Plot switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub plot_spirals: bool,
    pub plot_sun_body_line: bool,
    pub show_earth_aligned_frame: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            plot_spirals: true,
            plot_sun_body_line: true,
            show_earth_aligned_frame: false,
        }
    }
}

/// A complete constellation request read from disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioManifest {
    /// Observation time, e.g. `2021-10-28 15:30:00`.
    pub timestamp: String,
    #[serde(default)]
    pub ephemeris: EphemerisBackend,
    pub bodies: Vec<BodyEntry>,
    #[serde(default)]
    pub reference: Option<ReferenceConfig>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// Load the model configuration from a TOML or YAML file and validate it.
pub fn load_model_config<P: AsRef<Path>>(path: P) -> Result<ModelConfig, ConfigError> {
    let config: ModelConfig = load_document(path)?;
    config.validate()?;
    Ok(config)
}

/// Load a scenario manifest from a TOML or YAML file.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<ScenarioManifest, ConfigError> {
    let manifest: ScenarioManifest = load_document(path)?;
    manifest.model.validate()?;
    Ok(manifest)
}

fn load_document<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}
