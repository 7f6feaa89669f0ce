use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{AnalysisError, Result};
use crate::plot::figure::{parse_hex_color, Figure, LegendEntry, Panel, PanelContent, PanelLayout};

const PANEL_WIDTH: u32 = 320;
const PANEL_HEIGHT: u32 = 240;
const TITLE_HEIGHT: u32 = 40;
const LEGEND_HEIGHT: u32 = 40;
const FONT: &str = "sans-serif";
const DIM_GRAY: RGBColor = RGBColor(105, 105, 105);

fn render_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Render(e.to_string())
}

fn rgb(color: &str) -> Result<RGBColor> {
    let (r, g, b) = parse_hex_color(color)?;
    Ok(RGBColor(r, g, b))
}

/// Tick text without trailing zeros: 0.4, 1.2, 50
fn tick_text(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 14))
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(panel.x_range.0..panel.x_range.1, panel.y_range.0..panel.y_range.1)
        .map_err(render_err)?;

    let is_bars = matches!(panel.content, PanelContent::Bars(_));
    let x_formatter = |x: &f64| if is_bars { String::new() } else { tick_text(*x) };
    let y_formatter = |y: &f64| tick_text(*y);
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .y_labels(panel.y_ticks.len().max(2))
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter);
        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(render_err)?;
    }

    match &panel.content {
        PanelContent::Bars(bars) => {
            let colored = bars
                .iter()
                .map(|b| rgb(&b.color).map(|c| (b, c)))
                .collect::<Result<Vec<_>>>()?;
            chart
                .draw_series(colored.iter().map(|(b, color)| {
                    Rectangle::new([(b.x - b.width / 2.0, 0.0), (b.x + b.width / 2.0, b.height)], color.filled())
                }))
                .map_err(render_err)?;
            chart
                .draw_series(colored.iter().map(|(b, _)| {
                    Rectangle::new([(b.x - b.width / 2.0, 0.0), (b.x + b.width / 2.0, b.height)], BLACK.stroke_width(1))
                }))
                .map_err(render_err)?;
            chart
                .draw_series(bars.iter().filter(|b| b.error > 0.0).map(|b| {
                    ErrorBar::new_vertical(b.x, b.height - b.error, b.height, b.height + b.error, DIM_GRAY.stroke_width(1), 6)
                }))
                .map_err(render_err)?;

            let label_style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
            chart
                .draw_series(
                    panel
                        .x_ticks
                        .iter()
                        .map(|(x, label)| Text::new(label.clone(), (*x, panel.y_range.0), label_style.clone())),
                )
                .map_err(render_err)?;
        }
        PanelContent::Curves(curves) => {
            for curve in curves {
                let color = rgb(&curve.color)?;
                chart
                    .draw_series(LineSeries::new(
                        curve.xs.iter().copied().zip(curve.ys.iter().copied()),
                        color.stroke_width(2),
                    ))
                    .map_err(render_err)?;
            }
        }
    }
    Ok(())
}

// Color box + label per entry, left to right
fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, legend: &[LegendEntry]) -> Result<()> {
    let mut x = 10;
    for entry in legend {
        let color = rgb(&entry.color)?;
        area.draw(&Rectangle::new([(x, 12), (x + 14, 26)], color.filled())).map_err(render_err)?;
        area.draw(&Rectangle::new([(x, 12), (x + 14, 26)], BLACK.stroke_width(1))).map_err(render_err)?;
        area.draw(&Text::new(entry.label.clone(), (x + 20, 13), (FONT, 12).into_font()))
            .map_err(render_err)?;
        x += 40 + 7 * entry.label.len() as i32;
    }
    Ok(())
}

fn figure_size(figure: &Figure) -> (u32, u32) {
    let n = figure.panels.len().max(1) as u32;
    match figure.layout {
        PanelLayout::Row => (PANEL_WIDTH * n, PANEL_HEIGHT + TITLE_HEIGHT + LEGEND_HEIGHT),
        PanelLayout::Column => (PANEL_WIDTH * 3 / 2, PANEL_HEIGHT * n + TITLE_HEIGHT + LEGEND_HEIGHT),
    }
}

/// Draw the figure into an SVG file with plotters.
pub fn write_svg(figure: &Figure, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, figure_size(figure)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let body = root.titled(&figure.title, (FONT, 18)).map_err(render_err)?;
    let body_height = body.dim_in_pixel().1;
    let (panels_area, legend_area) = body.split_vertically(body_height.saturating_sub(LEGEND_HEIGHT));

    let n = figure.panels.len().max(1);
    let grid = match figure.layout {
        PanelLayout::Row => (1, n),
        PanelLayout::Column => (n, 1),
    };
    for (area, panel) in panels_area.split_evenly(grid).iter().zip(&figure.panels) {
        draw_panel(area, panel)?;
    }
    draw_legend(&legend_area, &figure.legend)?;

    root.present().map_err(render_err)?;
    Ok(())
}
