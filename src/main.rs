use std::env;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arx_bench_plots::experiments::run_experiment;
use arx_bench_plots::FigureConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1).map(String::as_str) {
        Some("-h") | Some("--help") => {
            println!("Usage: arx_bench_plots [figures.json]");
            return Ok(());
        }
        Some(path) => FigureConfig::from_path(path).with_context(|| format!("failed to load config {}", path))?,
        None => FigureConfig::paper(),
    };

    let pb = ProgressBar::new(config.experiments.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    for spec in &config.experiments {
        pb.set_message(spec.output.display().to_string());
        let output = run_experiment(spec, &config)
            .with_context(|| format!("failed to draw {} from {}", spec.output.display(), spec.input.display()))?;
        info!("Saved {}", output.display());
        pb.inc(1);
    }
    pb.finish_with_message("done");
    Ok(())
}
