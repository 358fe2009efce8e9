//! PNG rendering of a [`PlotLayout`] with plotters.
//!
//! The polar layout is drawn on a square cartesian chart in AU, with the Sun at the
//! origin and Carrington 0° pointing right.

use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use solar_layout::{CurveKind, PlotLayout, Rgb};
use thiserror::Error;

/// Number of concentric distance rings drawn behind the bodies.
const RING_COUNT: usize = 4;
/// Spacing of the Carrington longitude spokes (degrees).
const SPOKE_SPACING_DEG: u32 = 45;
const SUN_COLOR: RGBColor = RGBColor(255, 200, 0);
const GRID_COLOR: RGBColor = RGBColor(200, 200, 200);
const EARTH_GRID_COLOR: RGBColor = RGBColor(70, 130, 180);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to prepare output: {0}")]
    Io(#[from] std::io::Error),
    #[error("output path `{0}` is not valid UTF-8")]
    InvalidPath(String),
    #[error("failed to draw plot: {0}")]
    Drawing(String),
}

/// Render `layout` to a PNG file of `size` pixels.
pub fn render_png(layout: &PlotLayout, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output = path
        .to_str()
        .ok_or_else(|| RenderError::InvalidPath(path.display().to_string()))?;
    let root = BitMapBackend::new(output, size).into_drawing_area();
    draw(&root, layout).map_err(|err| RenderError::Drawing(err.to_string()))?;
    root.present()
        .map_err(|err| RenderError::Drawing(err.to_string()))?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &PlotLayout,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 14.0, FontStyle::Normal);
    let r = layout.outer_radius_au;

    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .caption(layout.title.clone(), caption_font)
        .build_cartesian_2d(-r..r, -r..r)?;

    for ring in 1..=RING_COUNT {
        let radius = r * ring as f64 / RING_COUNT as f64;
        chart.draw_series(std::iter::once(PathElement::new(
            circle(radius),
            ShapeStyle::from(&GRID_COLOR).stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{radius:.2} AU"),
            to_xy(radius, 22.5),
            label_font.clone().color(&GRID_COLOR),
        )))?;
    }
    for angle in (0..360).step_by(SPOKE_SPACING_DEG as usize) {
        let angle = f64::from(angle);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), to_xy(r, angle)],
            ShapeStyle::from(&GRID_COLOR).stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{angle:.0}°"),
            to_xy(r * 0.97, angle),
            label_font.clone().color(&BLACK.mix(0.6)),
        )))?;
    }

    if let Some(grid) = &layout.earth_grid {
        for spoke in &grid.spokes {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![to_xy(r * 0.05, spoke.angle_deg), to_xy(r * 0.9, spoke.angle_deg)],
                ShapeStyle::from(&EARTH_GRID_COLOR.mix(0.6)).stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                spoke.label.clone(),
                to_xy(r * 0.88, spoke.angle_deg),
                label_font.clone().color(&EARTH_GRID_COLOR),
            )))?;
        }
    }

    for line in &layout.sun_lines {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                to_xy(line.from_radius_au, line.angle_deg),
                to_xy(line.to_radius_au, line.angle_deg),
            ],
            ShapeStyle::from(&rgb(line.color).mix(0.5)).stroke_width(1),
        )))?;
    }

    for curve in &layout.curves {
        let width = match curve.kind {
            CurveKind::BodySpiral => 2,
            CurveKind::ReferenceSpiral => 1,
        };
        chart.draw_series(std::iter::once(PathElement::new(
            curve
                .points
                .iter()
                .filter(|(radius, _)| *radius <= r)
                .map(|&(radius, angle)| to_xy(radius, angle))
                .collect::<Vec<_>>(),
            ShapeStyle::from(&rgb(curve.color)).stroke_width(width),
        )))?;
    }

    chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), 8, SUN_COLOR.filled())))?;

    if let Some(marker) = &layout.reference {
        let color = rgb(marker.color);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                to_xy(marker.from_radius_au, marker.angle_deg),
                to_xy(marker.to_radius_au, marker.angle_deg),
            ],
            ShapeStyle::from(&color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            marker.label.clone(),
            to_xy(marker.to_radius_au, marker.angle_deg),
            label_font.clone().color(&color),
        )))?;
    }

    for point in &layout.points {
        let color = rgb(point.color);
        chart
            .draw_series(std::iter::once(Circle::new(
                to_xy(point.radius_au, point.angle_deg),
                6,
                color.filled(),
            )))?
            .label(point.label.clone())
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    if !layout.points.is_empty() {
        chart
            .configure_series_labels()
            .label_font(label_font.clone())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    for (row, note) in layout.unplotted.iter().enumerate() {
        root.draw(&Text::new(
            note.clone(),
            (10, 10 + 18 * row as i32),
            label_font.clone().color(&RED),
        ))?;
    }

    Ok(())
}

fn to_xy(radius_au: f64, angle_deg: f64) -> (f64, f64) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (radius_au * cos, radius_au * sin)
}

fn circle(radius_au: f64) -> Vec<(f64, f64)> {
    (0..=360).map(|deg| to_xy(radius_au, f64::from(deg))).collect()
}

fn rgb((r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}
