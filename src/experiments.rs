//! The paper's three figures: runtime bars, quality-over-time curves and
//! quality-per-time-limit bars.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{ExperimentKind, ExperimentSpec, FigureConfig, TickSpec};
use crate::data::columnar::ColumnarTable;
use crate::data::loader::{load_dataset, ALGORITHM, BATCH_NUMBER, DATASET, TIME_LIMIT};
use crate::data::utils::{unique_ordered, KeyValue};
use crate::error::Result;
use crate::metrics::aggregate::{calc_avg, find, EmptyGroupPolicy};
use crate::metrics::interpolate::{avg_utility_traces, linspace};
use crate::metrics::traces::{create_traces, select_traces, Trace};
use crate::plot::figure::{BarEntry, CurveEntry, Figure, LegendEntry, Panel, PanelContent, PanelLayout};
use crate::report::aggregate_table;

const RUNTIME_BAR_WIDTH: f64 = 0.8;
const TIME_LIMIT_BAR_WIDTH: f64 = 0.2;

/// Configured order, or the first-seen distinct values when none is configured.
fn order_or_observed(configured: &[String], observed: &[KeyValue]) -> Vec<KeyValue> {
    if configured.is_empty() {
        unique_ordered(observed)
    } else {
        configured.iter().map(|s| KeyValue::from(s.as_str())).collect()
    }
}

fn key_values<'a>(keys: impl Iterator<Item = Option<&'a KeyValue>>) -> Vec<KeyValue> {
    keys.flatten().cloned().collect()
}

fn legend(config: &FigureConfig, algorithms: &[KeyValue], line_colors: bool) -> Result<Vec<LegendEntry>> {
    algorithms
        .iter()
        .map(|a| {
            let style = config.style(&a.to_string())?;
            let color = if line_colors { style.line_color() } else { style.color.as_str() };
            Ok(LegendEntry { label: style.label.clone(), color: color.to_string() })
        })
        .collect()
}

fn is_highlighted(config: &FigureConfig, algorithm: &KeyValue) -> bool {
    config.highlight_algorithm.as_deref() == Some(algorithm.to_string().as_str())
}

/// Experiment 1: one panel per dataset, one bar per algorithm showing the mean
/// runtime with its standard deviation.
pub fn runtime_figure(table: &ColumnarTable, spec: &ExperimentSpec, config: &FigureConfig) -> Result<Figure> {
    let rows = calc_avg(table, &[ALGORITHM, DATASET], EmptyGroupPolicy::Carry)?;
    info!("Runtime per group:\n{}", aggregate_table(&rows));

    let datasets = order_or_observed(&spec.dataset_order, &key_values(rows.iter().map(|r| r.key.get(DATASET))));
    let algorithms =
        order_or_observed(&spec.algorithm_order, &key_values(rows.iter().map(|r| r.key.get(ALGORITHM))));

    let mut panels = Vec::with_capacity(datasets.len());
    for (i, dataset) in datasets.iter().enumerate() {
        let name = dataset.to_string();
        let mut bars = Vec::new();
        for (j, algorithm) in algorithms.iter().enumerate() {
            let style = config.style(&algorithm.to_string())?;
            let Some(row) = find(&rows, &[(DATASET, dataset), (ALGORITHM, algorithm)]) else {
                continue;
            };
            if is_highlighted(config, algorithm) {
                info!("{} = {:.2} (+- {:.2})", name, row.time_avg, row.time_std);
            }
            bars.push(BarEntry {
                label: style.label.clone(),
                category: config.alias(&name).to_string(),
                x: j as f64,
                width: RUNTIME_BAR_WIDTH,
                height: row.time_avg,
                error: row.time_std,
                color: style.color.clone(),
            });
        }

        let ticks = config.runtime_ticks(spec.metric, &name)?;
        panels.push(Panel {
            title: config.alias(&name).to_string(),
            x_label: None,
            y_label: (i == 0).then(|| "Time (s)".to_string()),
            x_range: (-0.5, algorithms.len() as f64 - 0.5),
            y_range: (0.0, ticks.max),
            y_ticks: ticks.ticks(),
            x_ticks: Vec::new(),
            content: PanelContent::Bars(bars),
        });
    }

    Ok(Figure {
        title: spec.metric.to_string(),
        layout: PanelLayout::Row,
        panels,
        legend: legend(config, &algorithms, false)?,
    })
}

/// Experiment 2: per dataset, the averaged quality-over-time curve of every algorithm.
pub fn quality_over_time_figure(
    table: &ColumnarTable,
    spec: &ExperimentSpec,
    config: &FigureConfig,
) -> Result<Figure> {
    let x_max = config.metrics.get(spec.metric).quality_x_max;
    let traces = create_traces(table, &[ALGORITHM, BATCH_NUMBER, DATASET], Some(x_max))?;
    let x = linspace(0.0, x_max, config.quality_samples);

    let datasets = order_or_observed(&spec.dataset_order, &trace_keys(&traces, DATASET));
    let algorithms = order_or_observed(&spec.algorithm_order, &trace_keys(&traces, ALGORITHM));

    let n = datasets.len();
    let mut panels = Vec::with_capacity(n);
    for (i, dataset) in datasets.iter().enumerate() {
        let name = dataset.to_string();
        let mut curves = Vec::new();
        for algorithm in &algorithms {
            let style = config.style(&algorithm.to_string())?;
            let (time_traces, utility_traces) = select_traces(&traces, &[(DATASET, dataset), (ALGORITHM, algorithm)]);
            if time_traces.is_empty() {
                warn!("no traces for {} on {}", algorithm, name);
                continue;
            }
            let ys = avg_utility_traces(&time_traces, &utility_traces, x_max, &x)?;
            curves.push(CurveEntry {
                label: style.label.clone(),
                xs: x.clone(),
                ys,
                color: style.line_color().to_string(),
            });
        }

        let ticks = config.quality_ticks(spec.metric, &name)?;
        panels.push(Panel {
            title: config.alias(&name).to_string(),
            x_label: (i + 1 == n).then(|| "Time (s)".to_string()),
            y_label: (i == n / 2).then(|| "Quality (%)".to_string()),
            x_range: (0.0, x_max),
            y_range: (0.0, ticks.max),
            y_ticks: ticks.ticks(),
            x_ticks: Vec::new(),
            content: PanelContent::Curves(curves),
        });
    }

    Ok(Figure {
        title: spec.metric.to_string(),
        layout: PanelLayout::Column,
        panels,
        legend: legend(config, &algorithms, true)?,
    })
}

fn trace_keys(traces: &[Trace], column: &str) -> Vec<KeyValue> {
    key_values(traces.iter().map(|t| t.key.get(column)))
}

/// "%d" rendering of a time limit in seconds
fn time_limit_label(limit: &KeyValue) -> String {
    match limit.as_f64() {
        Some(v) => format!("{}", v.trunc() as i64),
        None => limit.to_string(),
    }
}

/// Experiment 3: per dataset, grouped bars of the mean quality (percent) reached
/// under each time limit.
pub fn quality_by_time_limit_figure(
    table: &ColumnarTable,
    spec: &ExperimentSpec,
    config: &FigureConfig,
) -> Result<Figure> {
    let mut rows = calc_avg(table, &[ALGORITHM, DATASET, TIME_LIMIT], EmptyGroupPolicy::Carry)?;
    rows.iter_mut().for_each(|r| r.scale_utility(100.0));
    info!("Quality per group:\n{}", aggregate_table(&rows));

    let keys = |column: &str| key_values(rows.iter().map(|r| r.key.get(column)));
    let datasets = order_or_observed(&spec.dataset_order, &keys(DATASET));
    let algorithms = order_or_observed(&spec.algorithm_order, &keys(ALGORITHM));
    let time_limits = unique_ordered(&keys(TIME_LIMIT));
    let labels: Vec<String> = time_limits.iter().map(time_limit_label).collect();

    let width = TIME_LIMIT_BAR_WIDTH;
    let offset = (width * algorithms.len() as f64 / -2.0) + width / 2.0;
    let ticks = TickSpec::new(100.0, 6);

    let mut panels = Vec::with_capacity(datasets.len());
    for (i, dataset) in datasets.iter().enumerate() {
        let name = dataset.to_string();
        let mut bars = Vec::new();
        for (j, algorithm) in algorithms.iter().enumerate() {
            let style = config.style(&algorithm.to_string())?;
            for (k, limit) in time_limits.iter().enumerate() {
                let filters = [(DATASET, dataset), (ALGORITHM, algorithm), (TIME_LIMIT, limit)];
                let Some(row) = find(&rows, &filters) else {
                    continue;
                };
                if is_highlighted(config, algorithm) {
                    info!(
                        "{} (Time Limit: {}) = {:.2} (+- {:.2})",
                        name, labels[k], row.utility_avg, row.utility_std
                    );
                }
                bars.push(BarEntry {
                    label: style.label.clone(),
                    category: labels[k].clone(),
                    x: k as f64 + offset + width * j as f64,
                    width,
                    height: row.utility_avg,
                    error: row.utility_std,
                    color: style.color.clone(),
                });
            }
        }

        panels.push(Panel {
            title: config.alias(&name).to_string(),
            x_label: (i == datasets.len() / 2).then(|| "Time limit per iteration (s)".to_string()),
            y_label: (i == 0).then(|| "Quality (%)".to_string()),
            x_range: (-0.5, time_limits.len() as f64 - 0.5),
            y_range: (0.0, ticks.max),
            y_ticks: ticks.ticks(),
            x_ticks: labels.iter().enumerate().map(|(k, l)| (k as f64, l.clone())).collect(),
            content: PanelContent::Bars(bars),
        });
    }

    Ok(Figure {
        title: spec.metric.to_string(),
        layout: PanelLayout::Row,
        panels,
        legend: legend(config, &algorithms, false)?,
    })
}

/// Build the figure an experiment describes from an already loaded table.
pub fn build_figure(table: &ColumnarTable, spec: &ExperimentSpec, config: &FigureConfig) -> Result<Figure> {
    match spec.kind {
        ExperimentKind::Runtime => runtime_figure(table, spec, config),
        ExperimentKind::QualityOverTime => quality_over_time_figure(table, spec, config),
        ExperimentKind::QualityByTimeLimit => quality_by_time_limit_figure(table, spec, config),
    }
}

/// Load the experiment's table, draw its figure and write it to the configured output.
pub fn run_experiment(spec: &ExperimentSpec, config: &FigureConfig) -> Result<PathBuf> {
    info!("Running {:?} ({}) on {}", spec.kind, spec.metric, spec.input.display());
    let table = load_dataset(&spec.input)?;
    let figure = build_figure(&table, spec, config)?;
    figure.write(&spec.output)?;
    Ok(spec.output.clone())
}
