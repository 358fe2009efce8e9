//! Steady-state Parker spiral model.
//!
//! A constant, radial solar wind of speed `v` drags the frozen-in field into an
//! Archimedean spiral. Along the field line rooted at `(r₀, λ₀)` the Carrington
//! longitude at radius `r` is
//!
//! ```text
//! λ(r) = λ₀ + (Ω / v) · (r₀ − r)
//! ```
//!
//! with Ω the sidereal solar rotation rate. Longitude therefore grows towards the Sun,
//! so the footpoint of a body's field line lies west of the body in Carrington terms.
//! All public angles are degrees, radii are AU, speeds are km/s.

use serde::Serialize;
use solar_config::ModelConfig;
use solar_core::angles::normalize_degrees;
use thiserror::Error;

/// Upper bound on the number of steps in one traced segment; finer steps are widened.
pub const MAX_SAMPLES: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpiralError {
    #[error("solar wind speed must be a positive number of km/s (got {speed_km_s})")]
    InvalidSolarWindSpeed { speed_km_s: f64 },
    #[error("radius must be a finite, non-negative number of AU (got {radius_au})")]
    InvalidRadius { radius_au: f64 },
}

/// Constants shared by every field line of one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralModel {
    pub rotation_rate_rad_s: f64,
    pub au_km: f64,
    pub inner_boundary_au: f64,
    pub footpoint_radius_au: f64,
    pub sample_step_au: f64,
}

impl SpiralModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            rotation_rate_rad_s: config.rotation_rate_rad_s(),
            au_km: config.au_km,
            inner_boundary_au: config.inner_boundary_au,
            footpoint_radius_au: config.footpoint_radius_au,
            sample_step_au: config.sample_step_au,
        }
    }

    /// Field line through a source point. Fails on non-positive speed or bad radius.
    pub fn field_line(
        &self,
        radius_au: f64,
        lon_deg: f64,
        lat_deg: f64,
        wind_speed_km_s: f64,
    ) -> Result<FieldLine, SpiralError> {
        if !(wind_speed_km_s.is_finite() && wind_speed_km_s > 0.0) {
            return Err(SpiralError::InvalidSolarWindSpeed {
                speed_km_s: wind_speed_km_s,
            });
        }
        check_radius(radius_au)?;

        let winding_rad_per_au = self.rotation_rate_rad_s / wind_speed_km_s * self.au_km;
        Ok(FieldLine {
            source_radius_au: radius_au,
            source_lon_deg: normalize_degrees(lon_deg),
            lat_deg,
            wind_speed_km_s,
            winding_deg_per_au: winding_rad_per_au.to_degrees(),
            inner_boundary_au: self.inner_boundary_au,
            footpoint_radius_au: self.footpoint_radius_au,
            sample_step_au: self.sample_step_au,
        })
    }
}

impl Default for SpiralModel {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

fn check_radius(radius_au: f64) -> Result<(), SpiralError> {
    if radius_au.is_finite() && radius_au >= 0.0 {
        Ok(())
    } else {
        Err(SpiralError::InvalidRadius { radius_au })
    }
}

/// Parker spiral rooted at a body or reference point. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldLine {
    pub source_radius_au: f64,
    /// Source longitude in `[0, 360)`.
    pub source_lon_deg: f64,
    pub lat_deg: f64,
    pub wind_speed_km_s: f64,
    /// Longitude gained per AU travelled sunward.
    pub winding_deg_per_au: f64,
    pub inner_boundary_au: f64,
    pub footpoint_radius_au: f64,
    pub sample_step_au: f64,
}

impl FieldLine {
    /// Unwrapped longitude of the field line at `radius_au`.
    ///
    /// The value is continuous in radius (not wrapped into `[0, 360)`), which keeps
    /// sampled curves free of jumps.
    pub fn longitude_at(&self, radius_au: f64) -> f64 {
        self.source_lon_deg + self.winding_deg_per_au * (self.source_radius_au - radius_au)
    }

    /// Backmapped footpoint longitude at the configured footpoint radius, in `[0, 360)`.
    pub fn footpoint_longitude(&self) -> f64 {
        normalize_degrees(self.longitude_at(self.footpoint_radius_au))
    }

    /// Longitude in `[0, 360)` where the field line crosses `target_radius_au`.
    pub fn footpoint_longitude_at(&self, target_radius_au: f64) -> Result<f64, SpiralError> {
        check_radius(target_radius_au)?;
        Ok(normalize_degrees(self.longitude_at(target_radius_au)))
    }

    /// Total winding between the source and the footpoint radius (degrees).
    pub fn longitude_shift(&self) -> f64 {
        self.longitude_at(self.footpoint_radius_au) - self.source_lon_deg
    }

    /// Samples from the source radius down to the inner boundary.
    pub fn samples(&self) -> SpiralSamples {
        self.trace(self.source_radius_au, self.inner_boundary_au)
    }

    /// Samples between two arbitrary radii, in the given direction.
    ///
    /// Used to extend a field line outward past its source, e.g. a reference spiral
    /// rooted on the Sun and drawn to the edge of the plot.
    pub fn trace(&self, from_au: f64, to_au: f64) -> SpiralSamples {
        let span = (to_au - from_au).abs();
        let step = self.sample_step_au.max(span / MAX_SAMPLES as f64);
        let count = if span == 0.0 || !span.is_finite() || !step.is_finite() {
            1
        } else {
            ((span / step).ceil() as usize).min(MAX_SAMPLES) + 1
        };
        SpiralSamples {
            line: self.clone(),
            from_au,
            to_au,
            step: if to_au >= from_au { step } else { -step },
            count,
            index: 0,
        }
    }
}

/// One point on a field line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpiralSample {
    pub radius_au: f64,
    /// Unwrapped longitude (degrees).
    pub lon_deg: f64,
}

/// Lazy, finite sample sequence along a [`FieldLine`].
///
/// Cloning the iterator (or calling [`FieldLine::samples`] again) restarts it. The last
/// sample always lands exactly on the end radius.
#[derive(Debug, Clone)]
pub struct SpiralSamples {
    line: FieldLine,
    from_au: f64,
    to_au: f64,
    step: f64,
    count: usize,
    index: usize,
}

impl Iterator for SpiralSamples {
    type Item = SpiralSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let radius_au = if self.index + 1 == self.count {
            self.to_au
        } else {
            self.from_au + self.step * self.index as f64
        };
        self.index += 1;
        Some(SpiralSample {
            radius_au,
            lon_deg: self.line.longitude_at(radius_au),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpiralSamples {}
