//! Typed constellation requests and boundary parsing of user input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use solar_config::{FrameConfig, ScenarioManifest};
use solar_ephem::Frame;
use thiserror::Error;

/// Malformed user parameters. Each variant names the offending field or token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("body #{index} has an empty name")]
    EmptyBodyName { index: usize },
    #[error("solar wind speed for `{body}` must be a positive number of km/s (got {value})")]
    InvalidWindSpeed { body: String, value: f64 },
    #[error("cannot parse {field} token #{index} `{token}`: {reason}")]
    MalformedToken {
        field: &'static str,
        index: usize,
        token: String,
        reason: String,
    },
    #[error("{bodies} bodies were given but {speeds} solar wind speeds")]
    LengthMismatch { bodies: usize, speeds: usize },
    #[error(
        "cannot parse timestamp `{input}`: expected `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, or RFC 3339"
    )]
    InvalidTimestamp { input: String },
}

/// One requested body with its assumed solar wind speed.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRequest {
    pub name: String,
    pub wind_speed_km_s: f64,
}

impl BodyRequest {
    /// Validated constructor: trimmed non-empty name, finite positive speed.
    pub fn new(index: usize, name: &str, wind_speed_km_s: f64) -> Result<Self, InputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InputError::EmptyBodyName { index });
        }
        if !(wind_speed_km_s.is_finite() && wind_speed_km_s > 0.0) {
            return Err(InputError::InvalidWindSpeed {
                body: name.to_string(),
                value: wind_speed_km_s,
            });
        }
        Ok(Self {
            name: name.to_string(),
            wind_speed_km_s,
        })
    }
}

/// Reference point as supplied by the user, before frame normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRequest {
    pub frame: Frame,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub wind_speed_km_s: f64,
}

/// Everything one constellation computation needs, validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationRequest {
    pub epoch: DateTime<Utc>,
    pub bodies: Vec<BodyRequest>,
    pub reference: Option<ReferenceRequest>,
}

impl ConstellationRequest {
    /// Build a request from a scenario manifest, collecting every input error.
    pub fn from_manifest(manifest: &ScenarioManifest) -> Result<Self, Vec<InputError>> {
        let mut errors = Vec::new();
        let default_speed = manifest.model.default_wind_speed_km_s;

        let epoch = parse_timestamp(&manifest.timestamp).map_err(|err| errors.push(err));

        let bodies: Vec<BodyRequest> = manifest
            .bodies
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let speed = entry.wind_speed_km_s.unwrap_or(default_speed);
                BodyRequest::new(index, &entry.name, speed)
                    .map_err(|err| errors.push(err))
                    .ok()
            })
            .collect();

        let reference = manifest.reference.as_ref().map(|reference| ReferenceRequest {
            frame: frame_from_config(reference.frame),
            lon_deg: reference.lon_deg,
            lat_deg: reference.lat_deg,
            wind_speed_km_s: reference.wind_speed_km_s.unwrap_or(default_speed),
        });

        match epoch {
            Ok(epoch) if errors.is_empty() => Ok(Self {
                epoch,
                bodies,
                reference,
            }),
            _ => Err(errors),
        }
    }
}

/// Map the manifest frame name onto the ephemeris frame.
pub fn frame_from_config(frame: FrameConfig) -> Frame {
    match frame {
        FrameConfig::Carrington => Frame::Carrington,
        FrameConfig::Stonyhurst => Frame::Stonyhurst,
    }
}

/// Parse a UTC timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the same with a `T` separator, a bare date
/// (midnight), or an RFC 3339 string with offset.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, InputError> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| InputError::InvalidTimestamp {
            input: input.to_string(),
        })
}

/// Parse comma-separated body names and wind speeds.
///
/// An empty speed list applies `default_speed` to every body. Otherwise the lists
/// must have the same length. Every malformed token is reported, not just the first.
pub fn parse_body_list(
    bodies: &str,
    speeds: &str,
    default_speed: f64,
) -> Result<Vec<BodyRequest>, Vec<InputError>> {
    let names: Vec<&str> = if bodies.trim().is_empty() {
        Vec::new()
    } else {
        bodies.split(',').map(str::trim).collect()
    };

    let mut errors = Vec::new();
    let parsed_speeds: Vec<Option<f64>> = if speeds.trim().is_empty() {
        vec![Some(default_speed); names.len()]
    } else {
        speeds
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, token)| {
                token
                    .parse::<f64>()
                    .map_err(|err| {
                        errors.push(InputError::MalformedToken {
                            field: "solar wind speed",
                            index,
                            token: token.to_string(),
                            reason: err.to_string(),
                        })
                    })
                    .ok()
            })
            .collect()
    };

    if parsed_speeds.len() != names.len() {
        errors.push(InputError::LengthMismatch {
            bodies: names.len(),
            speeds: parsed_speeds.len(),
        });
    }

    let requests: Vec<BodyRequest> = names
        .iter()
        .zip(parsed_speeds.iter())
        .enumerate()
        .filter_map(|(index, (name, speed))| {
            let request = match speed {
                Some(speed) => BodyRequest::new(index, name, *speed),
                None if name.is_empty() => Err(InputError::EmptyBodyName { index }),
                None => return None,
            };
            request.map_err(|err| errors.push(err)).ok()
        })
        .collect();

    if errors.is_empty() {
        Ok(requests)
    } else {
        Err(errors)
    }
}

