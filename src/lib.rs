//! Solar-MACH: multi-spacecraft longitudinal configuration and magnetic connectivity.
//!
//! The physics and table assembly live in the member crates; this facade re-exports
//! them for the binaries and integration tests and adds PNG rendering.

use std::sync::Arc;

pub use solar_config as config;
pub use solar_constellation as constellation;
pub use solar_core as core;
pub use solar_ephem as ephem;
pub use solar_export as export;
pub use solar_layout as layout;
pub use solar_spiral as spiral;

pub mod render;

use solar_config::{EphemerisBackend, ModelConfig};
use solar_ephem::{AnalyticEphemeris, Ephemeris, EphemerisError, HorizonsEphemeris};

/// Build the ephemeris selected by `backend`, configured from `config`.
pub fn ephemeris_for(
    backend: EphemerisBackend,
    config: &ModelConfig,
) -> Result<Arc<dyn Ephemeris>, EphemerisError> {
    Ok(match backend {
        EphemerisBackend::Analytic => Arc::new(AnalyticEphemeris),
        EphemerisBackend::Horizons => Arc::new(HorizonsEphemeris::new(
            config.horizons_url.clone(),
            config.ephemeris_timeout(),
        )?),
    })
}
