//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use solar_constellation::ConstellationResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Artifact stem for a result, e.g. `Solar-MACH_2021-10-28_15-30-00`.
pub fn default_file_stem(result: &ConstellationResult) -> String {
    format!("Solar-MACH_{}", result.epoch.format("%Y-%m-%d_%H-%M-%S"))
}

pub mod table {
    use std::io::Write;

    use serde::Serialize;
    use solar_constellation::{ConstellationResult, RowOutcome};

    use crate::ExportError;

    /// One CSV row. Empty cells mean "not applicable" (failed body, no reference, no Earth).
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Record {
        pub body: String,
        pub status: &'static str,
        pub carrington_lon: Option<f64>,
        pub carrington_lat: Option<f64>,
        pub radius_au: Option<f64>,
        pub wind_speed: f64,
        pub stonyhurst_lon: Option<f64>,
        pub earth_lon_separation: Option<f64>,
        pub earth_lat_separation: Option<f64>,
        pub footpoint_lon: Option<f64>,
        pub separation_from_reference: Option<f64>,
        pub signed_separation_from_reference: Option<f64>,
        pub footpoint_separation: Option<f64>,
        pub latitude_separation: Option<f64>,
        pub magnetically_connected: Option<bool>,
        pub error: Option<String>,
    }

    /// Flatten the result into rows, in input order.
    pub fn records(result: &ConstellationResult) -> Vec<Record> {
        result
            .rows
            .iter()
            .map(|row| match &row.outcome {
                RowOutcome::Resolved(body) => {
                    let reference = body.reference_separation.as_ref();
                    Record {
                        body: row.name.clone(),
                        status: "resolved",
                        carrington_lon: Some(body.position.lon_deg),
                        carrington_lat: Some(body.position.lat_deg),
                        radius_au: Some(body.position.radius_au),
                        wind_speed: row.wind_speed_km_s,
                        stonyhurst_lon: body.stonyhurst_lon_deg,
                        earth_lon_separation: body.earth_separation.map(|s| s.longitude_deg),
                        earth_lat_separation: body.earth_separation.map(|s| s.latitude_deg),
                        footpoint_lon: body.footpoint_lon_deg,
                        separation_from_reference: reference.map(|s| s.longitude_deg),
                        signed_separation_from_reference: reference
                            .map(|s| s.longitude_signed_deg),
                        footpoint_separation: reference.and_then(|s| s.footpoint_deg),
                        latitude_separation: reference.map(|s| s.latitude_deg),
                        magnetically_connected: body.magnetically_connected(),
                        error: body.field_line.as_ref().err().map(ToString::to_string),
                    }
                }
                RowOutcome::Failed(err) => Record {
                    body: row.name.clone(),
                    status: "failed",
                    carrington_lon: None,
                    carrington_lat: None,
                    radius_au: None,
                    wind_speed: row.wind_speed_km_s,
                    stonyhurst_lon: None,
                    earth_lon_separation: None,
                    earth_lat_separation: None,
                    footpoint_lon: None,
                    separation_from_reference: None,
                    signed_separation_from_reference: None,
                    footpoint_separation: None,
                    latitude_separation: None,
                    magnetically_connected: None,
                    error: Some(err.to_string()),
                },
            })
            .collect()
    }

    /// Write the coordinate table as CSV with a header row.
    pub fn write_csv<W: Write>(writer: W, result: &ConstellationResult) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in records(result) {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod report {
    use std::io::Write;

    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use solar_constellation::ephem::{HeliographicPosition, format_epoch};
    use solar_constellation::{ConstellationResult, ReferenceOutcome};

    use crate::ExportError;
    use crate::table::{Record, records};

    #[derive(Debug, Serialize)]
    struct Report<'a> {
        epoch: String,
        backend: &'a str,
        connection_tolerance_deg: f64,
        earth: Option<HeliographicPosition>,
        reference: Option<ReferenceReport>,
        rows: Vec<Record>,
    }

    #[derive(Debug, Serialize)]
    struct ReferenceReport {
        status: &'static str,
        frame: Option<&'static str>,
        input_lon: Option<f64>,
        input_lat: Option<f64>,
        carrington_lon: Option<f64>,
        carrington_lat: Option<f64>,
        wind_speed: Option<f64>,
        error: Option<String>,
    }

    fn reference_report(outcome: &ReferenceOutcome) -> ReferenceReport {
        match outcome {
            ReferenceOutcome::Accepted(row) => ReferenceReport {
                status: "accepted",
                frame: Some(row.point.input_frame.label()),
                input_lon: Some(row.point.input_lon_deg),
                input_lat: Some(row.point.input_lat_deg),
                carrington_lon: Some(row.point.lon_deg),
                carrington_lat: Some(row.point.lat_deg),
                wind_speed: Some(row.point.wind_speed_km_s),
                error: row.field_line.as_ref().err().map(ToString::to_string),
            },
            ReferenceOutcome::Rejected(err) => ReferenceReport {
                status: "rejected",
                frame: None,
                input_lon: None,
                input_lat: None,
                carrington_lon: None,
                carrington_lat: None,
                wind_speed: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Write the full result (table, Earth, reference) as pretty JSON.
    pub fn write_json<W: Write>(
        writer: W,
        result: &ConstellationResult,
    ) -> Result<(), ExportError> {
        let report = Report {
            epoch: format_epoch(result.epoch),
            backend: result.backend,
            connection_tolerance_deg: result.connection_tolerance_deg,
            earth: result.earth,
            reference: result.reference.as_ref().map(reference_report),
            rows: records(result),
        };
        to_writer_pretty(writer, &report)?;
        Ok(())
    }
}
