pub mod config;
pub mod error;
pub mod experiments;
pub mod report;

pub mod data {
    pub mod loader;
    pub mod columnar;
    pub mod utils;
}

pub mod metrics {
    pub mod aggregate;
    pub mod traces;
    pub mod interpolate;
}

pub mod plot {
    pub mod figure;
    pub mod plot_html;
    pub mod plot_image;
}

pub use config::FigureConfig;
pub use error::{AnalysisError, Result};
pub use metrics::interpolate::avg_utility_traces;
