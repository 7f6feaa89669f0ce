use std::fs;
use std::path::Path;

use plotly::common::{ErrorData, ErrorType, Line, Marker, Mode, Title};
use plotly::layout::{Axis, BarMode};
use plotly::{Bar, Layout, Plot, Scatter};

use crate::data::utils::unique_ordered;
use crate::error::Result;
use crate::plot::figure::{BarEntry, CurveEntry, Figure, Panel, PanelContent, PanelLayout};

fn add_bars(plot: &mut Plot, bars: &[BarEntry]) {
    let labels: Vec<String> = unique_ordered(&bars.iter().map(|b| b.label.clone()).collect::<Vec<_>>());
    for label in labels {
        let series: Vec<&BarEntry> = bars.iter().filter(|b| b.label == label).collect();
        let x: Vec<String> = series.iter().map(|b| b.category.clone()).collect();
        let y: Vec<f64> = series.iter().map(|b| b.height).collect();
        let errors: Vec<f64> = series.iter().map(|b| b.error).collect();
        let trace = Bar::new(x, y)
            .name(&label)
            .error_y(ErrorData::new(ErrorType::Data).array(errors))
            .marker(Marker::new().color(series[0].color.clone()));
        plot.add_trace(trace);
    }
}

fn add_curves(plot: &mut Plot, curves: &[CurveEntry]) {
    for curve in curves {
        let trace = Scatter::new(curve.xs.clone(), curve.ys.clone())
            .mode(Mode::Lines)
            .name(&curve.label)
            .line(Line::new().color(curve.color.clone()).width(1.5));
        plot.add_trace(trace);
    }
}

fn panel_plot(figure: &Figure, panel: &Panel) -> Plot {
    let mut plot = Plot::new();
    let mut x_axis = Axis::new();
    match &panel.content {
        PanelContent::Bars(bars) => add_bars(&mut plot, bars),
        PanelContent::Curves(curves) => {
            add_curves(&mut plot, curves);
            x_axis = x_axis.range(vec![panel.x_range.0, panel.x_range.1]);
        }
    }
    if let Some(label) = &panel.x_label {
        x_axis = x_axis.title(Title::new(label));
    }

    let mut y_axis = Axis::new()
        .range(vec![panel.y_range.0, panel.y_range.1])
        .tick_values(panel.y_ticks.clone());
    if let Some(label) = &panel.y_label {
        y_axis = y_axis.title(Title::new(label));
    }

    let layout = Layout::new()
        .title(Title::new(&format!("{} | {}", figure.title, panel.title)))
        .bar_mode(BarMode::Group)
        .x_axis(x_axis)
        .y_axis(y_axis);
    plot.set_layout(layout);
    plot
}

/// Render every panel as its own inline plotly plot inside one HTML page.
pub fn to_html(figure: &Figure) -> String {
    let direction = match figure.layout {
        PanelLayout::Row => "row",
        PanelLayout::Column => "column",
    };
    let panels: String = figure
        .panels
        .iter()
        .enumerate()
        .map(|(i, panel)| {
            // plotly picks its own inner div id, the wrapper carries the panel id
            let plot_html = panel_plot(figure, panel).to_inline_html(None);
            format!(r#"<div id="panel-{}" style="flex:1; min-width:300px;">{}</div>"#, i, plot_html)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-latest.min.js"></script>
</head>
<body>
<h2 style="text-align:center;">{title}</h2>
<div style="display:flex; flex-direction:{direction}; gap:20px; flex-wrap:wrap;">
{panels}
</div>
</body>
</html>
"#,
        title = figure.title,
        direction = direction,
        panels = panels,
    )
}

pub fn write_html(figure: &Figure, path: &Path) -> Result<()> {
    fs::write(path, to_html(figure))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::figure::LegendEntry;

    fn bar(label: &str, category: &str, x: f64) -> BarEntry {
        BarEntry {
            label: label.to_string(),
            category: category.to_string(),
            x,
            width: 0.2,
            height: 42.0,
            error: 1.5,
            color: "#87ceeb".to_string(),
        }
    }

    #[test]
    fn html_contains_one_div_per_panel() {
        let panel = |title: &str| Panel {
            title: title.to_string(),
            x_label: None,
            y_label: Some("Quality (%)".to_string()),
            x_range: (-0.5, 1.5),
            y_range: (0.0, 100.0),
            y_ticks: vec![0.0, 50.0, 100.0],
            x_ticks: vec![(0.0, "5".to_string()), (1.0, "10".to_string())],
            content: PanelContent::Bars(vec![bar("Top-Down", "5", 0.0), bar("Top-Down", "10", 1.0)]),
        };
        let figure = Figure {
            title: "Distinguishability".to_string(),
            layout: PanelLayout::Row,
            panels: vec![panel("Credit card"), panel("Census community")],
            legend: vec![LegendEntry { label: "Top-Down".to_string(), color: "#87ceeb".to_string() }],
        };
        let html = to_html(&figure);
        assert!(html.contains(r#"<div id="panel-0""#));
        assert!(html.contains(r#"<div id="panel-1""#));
        assert!(!html.contains(r#"<div id="panel-2""#));
        assert!(html.contains("Top-Down"));
        assert!(html.contains("flex-direction:row"));
    }
}
