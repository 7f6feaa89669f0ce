use std::path::Path;

use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::plot::{plot_html, plot_image};

/// How panels are arranged on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelLayout {
    Row,
    Column,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// One bar with a symmetric error bar.
#[derive(Clone, Debug, PartialEq)]
pub struct BarEntry {
    pub label: String,
    /// x tick label the bar belongs to (used for grouping in plotly)
    pub category: String,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub error: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurveEntry {
    pub label: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PanelContent {
    Bars(Vec<BarEntry>),
    Curves(Vec<CurveEntry>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub y_ticks: Vec<f64>,
    pub x_ticks: Vec<(f64, String)>,
    pub content: PanelContent,
}

/// Renderer independent description of one figure of the paper.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub title: String,
    pub layout: PanelLayout,
    pub panels: Vec<Panel>,
    pub legend: Vec<LegendEntry>,
}

impl Figure {
    /// Write the figure, picking the renderer from the file extension
    /// (`html` for plotly, `svg` for plotters). Parent directories are created.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| AnalysisError::UnsupportedFormat(path.to_path_buf()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match ext.as_str() {
            "html" => plot_html::write_html(self, path)?,
            "svg" => plot_image::write_svg(self, path)?,
            _ => return Err(AnalysisError::UnsupportedFormat(path.to_path_buf())),
        }
        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Parse `#rrggbb` into its components.
pub fn parse_hex_color(color: &str) -> Result<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    let bad = || AnalysisError::Config(format!("invalid color '{}'", color));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#daa520").unwrap(), (0xda, 0xa5, 0x20));
        assert_eq!(parse_hex_color("00BFFF").unwrap(), (0, 0xbf, 0xff));
        assert!(parse_hex_color("goldenrod").is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let figure = Figure { title: String::new(), layout: PanelLayout::Row, panels: vec![], legend: vec![] };
        let dir = tempfile::tempdir().unwrap();
        let err = figure.write(dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(_)));
        assert!(matches!(figure.write(dir.path().join("out")), Err(AnalysisError::UnsupportedFormat(_))));
    }
}
