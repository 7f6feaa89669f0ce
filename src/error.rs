use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading benchmark tables, aggregating them and drawing figures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required column is missing, a value cannot be parsed, or two parallel
    /// sequences disagree in length.
    #[error("input format error in {path}: {message}")]
    InputFormat { path: String, message: String },

    /// No measurements matched a group key and the caller asked for a hard failure.
    #[error("no measurements for group {key}")]
    EmptyGroup { key: String },

    /// An evaluation abscissa lies outside the anchored interpolation domain.
    #[error("abscissa {value} outside interpolation range [0, {max}]")]
    InterpolationRange { value: f64, max: f64 },

    #[error("degenerate trace: {0}")]
    DegenerateTrace(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported output format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn input_format(path: impl Into<String>, message: impl Into<String>) -> Self {
        AnalysisError::InputFormat { path: path.into(), message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
