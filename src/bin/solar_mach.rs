use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use solar_mach::config::{
    DisplayConfig, EphemerisBackend, ModelConfig, load_manifest, load_model_config,
};
use solar_mach::constellation::input::{self, parse_body_list};
use solar_mach::constellation::{
    ConstellationEngine, ConstellationError, ConstellationRequest, ConstellationResult,
    InputError, ReferenceOutcome, ReferenceRequest, RowOutcome,
};
use solar_mach::ephem::Frame;
use solar_mach::export::{self, report, table};
use solar_mach::layout::{DisplayOptions, build_layout};
use solar_mach::{ephemeris_for, render};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Compute the heliospheric constellation of a set of bodies and export the result.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Multi-spacecraft longitudinal configuration and magnetic connectivity"
)]
struct Cli {
    /// Scenario manifest (TOML or YAML); flags below override its values
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Model configuration file (TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observation time, e.g. "2021-10-28 15:30:00" (UTC)
    #[arg(long)]
    date: Option<String>,

    /// Comma-separated body names, e.g. "Earth,STEREO-A,PSP"
    #[arg(long)]
    bodies: Option<String>,

    /// Comma-separated solar wind speeds in km/s, one per body (default speed if empty)
    #[arg(long, default_value = "")]
    speeds: String,

    /// Reference longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    reference_lon: Option<f64>,

    /// Reference latitude in degrees (0 for a new reference)
    #[arg(long, allow_hyphen_values = true)]
    reference_lat: Option<f64>,

    /// Frame of the reference coordinates (Carrington for a new reference)
    #[arg(long, value_enum)]
    reference_frame: Option<FrameArg>,

    /// Solar wind speed for the reference spiral in km/s (defaults to the model default)
    #[arg(long)]
    reference_speed: Option<f64>,

    /// Ephemeris backend
    #[arg(long, value_enum)]
    ephemeris: Option<BackendArg>,

    /// Do not draw Parker spirals for the bodies
    #[arg(long, default_value_t = false)]
    no_spirals: bool,

    /// Do not draw straight lines from the Sun to the bodies
    #[arg(long, default_value_t = false)]
    no_sun_body_line: bool,

    /// Overlay a Stonyhurst grid aligned with Earth
    #[arg(long, default_value_t = false)]
    earth_frame: bool,

    /// Write the coordinate table as CSV (use '-' for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full result as JSON (use '-' for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Render the plot to a PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Write Solar-MACH_<date>.csv and .png into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    width: u32,

    #[arg(long, default_value_t = 1000)]
    height: u32,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum FrameArg {
    Carrington,
    Stonyhurst,
}

impl From<FrameArg> for Frame {
    fn from(value: FrameArg) -> Self {
        match value {
            FrameArg::Carrington => Frame::Carrington,
            FrameArg::Stonyhurst => Frame::Stonyhurst,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum BackendArg {
    Analytic,
    Horizons,
}

impl From<BackendArg> for EphemerisBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Analytic => EphemerisBackend::Analytic,
            BackendArg::Horizons => EphemerisBackend::Horizons,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (request, backend, display, model) = build_request(&cli)?;

    let ephemeris = ephemeris_for(backend, &model)?;
    let mut engine = ConstellationEngine::from_request(&request, ephemeris, model)?;
    let result = match engine.compute() {
        Ok(result) => result,
        Err(ConstellationError::NoBodiesResolved { failures }) => {
            for failure in &failures {
                eprintln!("failed: {failure}");
            }
            bail!("none of the {} requested bodies could be resolved", failures.len());
        }
        Err(err) => return Err(err.into()),
    };

    print_table(&result);
    report_problems(&result);

    let mut options = DisplayOptions::from_config(&display);
    options.plot_spirals &= !cli.no_spirals;
    options.plot_sun_body_line &= !cli.no_sun_body_line;
    options.show_earth_aligned_frame |= cli.earth_frame;

    let (mut csv_path, mut png_path) = (cli.csv.clone(), cli.png.clone());
    if let Some(dir) = &cli.out_dir {
        let stem = export::default_file_stem(&result);
        csv_path.get_or_insert_with(|| dir.join(format!("{stem}.csv")));
        png_path.get_or_insert_with(|| dir.join(format!("{stem}.png")));
    }

    if let Some(path) = &csv_path {
        table::write_csv(export::writer_for_path(path)?, &result)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote CSV table");
    }
    if let Some(path) = &cli.json {
        report::write_json(export::writer_for_path(path)?, &result)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON report");
    }
    if let Some(path) = &png_path {
        let layout = build_layout(&result, &options)?;
        render::render_png(&layout, path, (cli.width, cli.height))
            .with_context(|| format!("rendering {}", path.display()))?;
        info!(path = %path.display(), "rendered plot");
    }

    Ok(())
}

fn build_request(
    cli: &Cli,
) -> anyhow::Result<(ConstellationRequest, EphemerisBackend, DisplayConfig, ModelConfig)> {
    let manifest = cli
        .manifest
        .as_deref()
        .map(|path| load_manifest(path).with_context(|| format!("loading {}", path.display())))
        .transpose()?;
    let model = match &cli.config {
        Some(path) => load_model_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => manifest.as_ref().map(|m| m.model.clone()).unwrap_or_default(),
    };

    let mut request = match &manifest {
        Some(manifest) => ConstellationRequest::from_manifest(manifest).map_err(input_errors)?,
        None => {
            let (Some(date), Some(bodies)) = (&cli.date, &cli.bodies) else {
                bail!("either --manifest or both --date and --bodies are required");
            };
            ConstellationRequest {
                epoch: input::parse_timestamp(date).map_err(|err| input_errors(vec![err]))?,
                bodies: parse_body_list(bodies, &cli.speeds, model.default_wind_speed_km_s)
                    .map_err(input_errors)?,
                reference: None,
            }
        }
    };

    if manifest.is_some() {
        if let Some(date) = &cli.date {
            request.epoch = input::parse_timestamp(date).map_err(|err| input_errors(vec![err]))?;
        }
        if let Some(bodies) = &cli.bodies {
            request.bodies = parse_body_list(bodies, &cli.speeds, model.default_wind_speed_km_s)
                .map_err(input_errors)?;
        }
    }
    request.reference = merge_reference(cli, request.reference, model.default_wind_speed_km_s)?;

    let backend = cli
        .ephemeris
        .map(EphemerisBackend::from)
        .or(manifest.as_ref().map(|m| m.ephemeris))
        .unwrap_or_default();
    let display = manifest.as_ref().map(|m| m.display).unwrap_or_default();

    Ok((request, backend, display, model))
}

/// Reference flags override single fields of the manifest reference, or describe a new
/// one when `--reference-lon` is given.
fn merge_reference(
    cli: &Cli,
    base: Option<ReferenceRequest>,
    default_speed: f64,
) -> anyhow::Result<Option<ReferenceRequest>> {
    let base = match (base, cli.reference_lon) {
        (Some(reference), _) => reference,
        (None, Some(lon_deg)) => ReferenceRequest {
            frame: Frame::Carrington,
            lon_deg,
            lat_deg: 0.0,
            wind_speed_km_s: default_speed,
        },
        (None, None) => {
            if cli.reference_lat.is_some()
                || cli.reference_frame.is_some()
                || cli.reference_speed.is_some()
            {
                bail!("reference flags need --reference-lon or a manifest reference");
            }
            return Ok(None);
        }
    };
    Ok(Some(ReferenceRequest {
        frame: cli.reference_frame.map(Frame::from).unwrap_or(base.frame),
        lon_deg: cli.reference_lon.unwrap_or(base.lon_deg),
        lat_deg: cli.reference_lat.unwrap_or(base.lat_deg),
        wind_speed_km_s: cli.reference_speed.unwrap_or(base.wind_speed_km_s),
    }))
}

fn input_errors(errors: Vec<InputError>) -> anyhow::Error {
    let lines: Vec<String> = errors.iter().map(|err| format!("  - {err}")).collect();
    anyhow::anyhow!("invalid input:\n{}", lines.join("\n"))
}

fn print_table(result: &ConstellationResult) {
    println!(
        "Solar-MACH constellation at {} ({} ephemeris)",
        result.epoch.format("%Y-%m-%d %H:%M:%S UTC"),
        result.backend
    );
    if let Some(reference) = result.accepted_reference() {
        println!(
            "Reference: Carrington lon {:.1}°, lat {:.1}° ({} input {:.1}°), v_sw {:.0} km/s",
            reference.point.lon_deg,
            reference.point.lat_deg,
            reference.point.input_frame.label(),
            reference.point.input_lon_deg,
            reference.point.wind_speed_km_s
        );
    }
    println!(
        "{:<16} {:>9} {:>9} {:>8} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "body", "carr_lon", "carr_lat", "r_au", "v_sw", "stony_lon", "foot_lon", "sep_ref",
        "foot_sep", "connected"
    );
    for row in &result.rows {
        match &row.outcome {
            RowOutcome::Resolved(body) => {
                let reference = body.reference_separation.as_ref();
                println!(
                    "{:<16} {:>9.1} {:>9.1} {:>8.3} {:>8.0} {:>9} {:>9} {:>9} {:>9} {:>9}",
                    row.name,
                    body.position.lon_deg,
                    body.position.lat_deg,
                    body.position.radius_au,
                    row.wind_speed_km_s,
                    cell(body.stonyhurst_lon_deg),
                    cell(body.footpoint_lon_deg),
                    cell(reference.map(|s| s.longitude_deg)),
                    cell(reference.and_then(|s| s.footpoint_deg)),
                    reference
                        .map(|s| if s.magnetically_connected { "yes" } else { "no" })
                        .unwrap_or("-"),
                );
            }
            RowOutcome::Failed(_) => {
                println!("{:<16} {:>9}", row.name, "failed");
            }
        }
    }
}

fn report_problems(result: &ConstellationResult) {
    for (row, err) in result.failures() {
        eprintln!("failed: #{} {}: {err}", row.index, row.name);
    }
    if let Some(ReferenceOutcome::Rejected(err)) = &result.reference {
        eprintln!("reference rejected: {err}");
    }
    if result.earth.is_none() {
        eprintln!("warning: Earth could not be resolved; Stonyhurst columns are empty");
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}
