//! JPL Horizons ephemeris client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::catalog;
use crate::frames::{self, julian_date};
use crate::{Ephemeris, EphemerisError, HeliographicPosition};

pub use solar_core::constants::HORIZONS_API_URL as DEFAULT_HORIZONS_URL;

const BACKEND: &str = "horizons";

/// Horizons answers that mean the target name itself is not known.
const UNKNOWN_TARGET_MARKERS: &[&str] = &[
    "No matches found",
    "No such object",
    "Unknown target",
    "Cannot interpret",
];

/// Blocking Horizons client requesting heliocentric ecliptic J2000 vectors.
#[derive(Debug, Clone)]
pub struct HorizonsEphemeris {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HorizonsReply {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Why a Horizons vector table could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorTableError {
    /// Horizons did not recognise the target.
    UnknownTarget(String),
    /// The reply carried no usable vector row.
    NoData(String),
}

impl HorizonsEphemeris {
    /// Build a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EphemerisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EphemerisError::Setup {
                backend: BACKEND,
                reason: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Client against the public endpoint.
    pub fn public(timeout: Duration) -> Result<Self, EphemerisError> {
        Self::new(DEFAULT_HORIZONS_URL, timeout)
    }

    fn query(&self, command: &str, jd: f64) -> Result<HorizonsReply, reqwest::Error> {
        let command = format!("'{command}'");
        let tlist = format!("'{jd:.9}'");
        let params: [(&str, &str); 13] = [
            ("format", "json"),
            ("COMMAND", command.as_str()),
            ("OBJ_DATA", "'NO'"),
            ("MAKE_EPHEM", "'YES'"),
            ("EPHEM_TYPE", "'VECTORS'"),
            ("CENTER", "'500@10'"),
            ("REF_PLANE", "'ECLIPTIC'"),
            ("REF_SYSTEM", "'J2000'"),
            ("VEC_TABLE", "'1'"),
            ("OUT_UNITS", "'AU-D'"),
            ("CSV_FORMAT", "'YES'"),
            ("TIME_TYPE", "'UT'"),
            ("TLIST", tlist.as_str()),
        ];
        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| HorizonsReply {
            result: None,
            error: Some(format!("unreadable reply: {}", first_line(&body))),
        }))
    }
}

impl Ephemeris for HorizonsEphemeris {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn resolve(
        &self,
        key: &str,
        epoch: DateTime<Utc>,
    ) -> Result<HeliographicPosition, EphemerisError> {
        let trimmed = key.trim();
        let (label, command) = match catalog::lookup(trimmed) {
            Some(body) => (body.name, body.horizons_id),
            None => (trimmed, trimmed),
        };
        let jd = julian_date(epoch);
        debug!(body = label, command, jd, "querying horizons");

        let reply = self.query(command, jd).map_err(|err| {
            let reason = if err.is_timeout() {
                "horizons request timed out".to_string()
            } else {
                format!("horizons request failed: {err}")
            };
            EphemerisError::unavailable(label, epoch, reason)
        })?;

        let text = match (reply.result, reply.error) {
            (_, Some(error)) => error,
            (Some(result), None) => result,
            (None, None) => String::new(),
        };

        match parse_vector_table(&text) {
            Ok(position) => Ok(frames::ecliptic_j2000_to_carrington(&position, jd)),
            Err(VectorTableError::UnknownTarget(_)) => Err(EphemerisError::UnknownBody {
                name: label.to_string(),
                backend: BACKEND,
            }),
            Err(VectorTableError::NoData(message)) => {
                Err(EphemerisError::unavailable(label, epoch, message))
            }
        }
    }
}

/// Extract the first `X, Y, Z` row (AU) between `$$SOE` and `$$EOE` of a CSV vector table.
pub fn parse_vector_table(text: &str) -> Result<[f64; 3], VectorTableError> {
    if UNKNOWN_TARGET_MARKERS.iter().any(|m| text.contains(m)) {
        return Err(VectorTableError::UnknownTarget(first_line(text)));
    }

    let (Some(start), Some(end)) = (text.find("$$SOE"), text.find("$$EOE")) else {
        let message = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('*'))
            .unwrap_or("empty reply from horizons")
            .to_string();
        return Err(VectorTableError::NoData(message));
    };
    if end <= start {
        return Err(VectorTableError::NoData("malformed vector table".into()));
    }

    let row = text[start + "$$SOE".len()..end]
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| VectorTableError::NoData("vector table has no rows".into()))?;

    // JDTDB, Calendar Date (TDB), X, Y, Z,
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    let component = |idx: usize| -> Result<f64, VectorTableError> {
        fields
            .get(idx)
            .and_then(|field| field.parse::<f64>().ok())
            .ok_or_else(|| VectorTableError::NoData(format!("unparseable vector row `{row}`")))
    };
    Ok([component(2)?, component(3)?, component(4)?])
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect()
}
