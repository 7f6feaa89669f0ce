use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Privacy model a figure reports on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Distinguishability")]
    Distinguishability,
    #[serde(rename = "Population Uniqueness")]
    PopulationUniqueness,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Distinguishability => write!(f, "Distinguishability"),
            Metric::PopulationUniqueness => write!(f, "Population Uniqueness"),
        }
    }
}

/// Which of the paper's figures an experiment draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    /// Experiment 1: mean runtime per dataset and algorithm.
    Runtime,
    /// Experiment 2: averaged quality over time.
    QualityOverTime,
    /// Experiment 3: quality per time limit.
    QualityByTimeLimit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStyle {
    /// bar color, `#rrggbb`
    pub color: String,
    /// line color for curves, falls back to `color`
    #[serde(default)]
    pub color2: Option<String>,
    pub label: String,
}

impl AlgorithmStyle {
    fn new(color: &str, color2: Option<&str>, label: &str) -> Self {
        AlgorithmStyle { color: color.to_string(), color2: color2.map(str::to_string), label: label.to_string() }
    }

    pub fn line_color(&self) -> &str {
        self.color2.as_deref().unwrap_or(&self.color)
    }
}

/// Y axis upper bound and number of evenly spaced ticks from 0 to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickSpec {
    pub max: f64,
    pub count: usize,
}

impl TickSpec {
    pub fn new(max: f64, count: usize) -> Self {
        TickSpec { max, count }
    }

    pub fn ticks(&self) -> Vec<f64> {
        crate::metrics::interpolate::linspace(0.0, self.max, self.count)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// per dataset y ticks of the runtime figure
    pub runtime_y_ticks: BTreeMap<String, TickSpec>,
    /// plotted horizon of the quality-over-time figure, seconds
    pub quality_x_max: f64,
    /// per dataset y ticks of the quality-over-time figure, percent
    pub quality_y_ticks: BTreeMap<String, TickSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    #[serde(rename = "Distinguishability")]
    pub distinguishability: MetricConfig,
    #[serde(rename = "Population Uniqueness")]
    pub population_uniqueness: MetricConfig,
}

impl MetricTable {
    pub fn get(&self, metric: Metric) -> &MetricConfig {
        match metric {
            Metric::Distinguishability => &self.distinguishability,
            Metric::PopulationUniqueness => &self.population_uniqueness,
        }
    }
}

/// One figure to draw: which experiment, from which table, to which file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSpec {
    pub kind: ExperimentKind,
    pub input: PathBuf,
    pub output: PathBuf,
    pub metric: Metric,
    /// empty means first-seen order of the table
    #[serde(default)]
    pub dataset_order: Vec<String>,
    #[serde(default)]
    pub algorithm_order: Vec<String>,
}

fn default_quality_samples() -> usize {
    100
}

/// Presentation configuration of all figures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    pub algorithms: BTreeMap<String, AlgorithmStyle>,
    pub dataset_aliases: BTreeMap<String, String>,
    pub metrics: MetricTable,
    /// algorithm whose results are logged in detail
    #[serde(default)]
    pub highlight_algorithm: Option<String>,
    /// samples on the time axis of the quality-over-time figure
    #[serde(default = "default_quality_samples")]
    pub quality_samples: usize,
    #[serde(default)]
    pub experiments: Vec<ExperimentSpec>,
}

impl FigureConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn style(&self, algorithm: &str) -> Result<&AlgorithmStyle> {
        self.algorithms
            .get(algorithm)
            .ok_or_else(|| AnalysisError::Config(format!("no style for algorithm '{}'", algorithm)))
    }

    pub fn alias<'a>(&'a self, dataset: &'a str) -> &'a str {
        self.dataset_aliases.get(dataset).map(String::as_str).unwrap_or(dataset)
    }

    pub fn runtime_ticks(&self, metric: Metric, dataset: &str) -> Result<TickSpec> {
        lookup_ticks(&self.metrics.get(metric).runtime_y_ticks, metric, dataset)
    }

    pub fn quality_ticks(&self, metric: Metric, dataset: &str) -> Result<TickSpec> {
        lookup_ticks(&self.metrics.get(metric).quality_y_ticks, metric, dataset)
    }

    /// The six figures of the paper, read from `results/` and written to `figures/`.
    pub fn paper() -> Self {
        let algorithms = [
            ("OPTIMAL", AlgorithmStyle::new("#808080", None, "Optimal")),
            ("BEST_EFFORT_BOTTOM_UP", AlgorithmStyle::new("#dda0dd", Some("#da70d6"), "Bottom-Up")),
            ("BEST_EFFORT_GENETIC", AlgorithmStyle::new("#eee8aa", Some("#daa520"), "Genetic")),
            ("BEST_EFFORT_TOP_DOWN", AlgorithmStyle::new("#87ceeb", Some("#00bfff"), "Top-Down")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let dataset_aliases = [
            ("ADULT", "Census income"),
            ("CUP", "Data mining"),
            ("FARS", "Crash statistics"),
            ("ATUS", "Time use"),
            ("IHIS", "Health interviews"),
            ("SS13ACS", "Census community"),
            ("CREDITCARD", "Credit card"),
            ("MACH2019", "Psychology test"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let ticks = |entries: &[(&str, f64, usize)]| -> BTreeMap<String, TickSpec> {
            entries.iter().map(|(d, max, n)| (d.to_string(), TickSpec::new(*max, *n))).collect()
        };

        let metrics = MetricTable {
            distinguishability: MetricConfig {
                runtime_y_ticks: ticks(&[
                    ("ADULT", 0.4, 5),
                    ("CUP", 6.0, 5),
                    ("FARS", 1.2, 5),
                    ("ATUS", 6.0, 5),
                    ("IHIS", 50.0, 6),
                ]),
                quality_x_max: 10.0,
                quality_y_ticks: ticks(&[("SS13ACS", 80.0, 3), ("CREDITCARD", 40.0, 3), ("MACH2019", 60.0, 3)]),
            },
            population_uniqueness: MetricConfig {
                runtime_y_ticks: ticks(&[
                    ("ADULT", 1.5, 4),
                    ("CUP", 25.0, 6),
                    ("FARS", 10.0, 6),
                    ("ATUS", 12.0, 5),
                    ("IHIS", 50.0, 6),
                ]),
                quality_x_max: 100.0,
                quality_y_ticks: ticks(&[("SS13ACS", 100.0, 3), ("CREDITCARD", 60.0, 3), ("MACH2019", 80.0, 3)]),
            },
        };

        let low_dim: Vec<String> = ["ADULT", "ATUS", "IHIS"].iter().map(|s| s.to_string()).collect();
        let high_dim: Vec<String> = ["SS13ACS", "CREDITCARD", "MACH2019"].iter().map(|s| s.to_string()).collect();
        let all_algorithms: Vec<String> = ["OPTIMAL", "BEST_EFFORT_BOTTOM_UP", "BEST_EFFORT_GENETIC", "BEST_EFFORT_TOP_DOWN"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let best_effort: Vec<String> = all_algorithms[1..].to_vec();

        let experiment = |kind, input: &str, output: &str, metric, datasets: &[String], algorithms: &[String]| {
            ExperimentSpec {
                kind,
                input: PathBuf::from("results").join(input),
                output: PathBuf::from("figures").join(output),
                metric,
                dataset_order: datasets.to_vec(),
                algorithm_order: algorithms.to_vec(),
            }
        };

        use ExperimentKind::*;
        use Metric::*;
        let experiments = vec![
            experiment(Runtime, "Experiment1_kAnon.csv", "ex1_kAnon.svg", Distinguishability, &low_dim, &all_algorithms),
            experiment(Runtime, "Experiment1_popUnique.csv", "ex1_PopUnique.svg", PopulationUniqueness, &low_dim, &all_algorithms),
            experiment(QualityOverTime, "Experiment2_kAnon.csv", "ex2_kAnon.svg", Distinguishability, &high_dim, &best_effort),
            experiment(QualityOverTime, "Experiment2_popUnique.csv", "ex2_popUnique.svg", PopulationUniqueness, &high_dim, &best_effort),
            experiment(QualityByTimeLimit, "Experiment3_kAnon.csv", "ex3_kAnon.svg", Distinguishability, &high_dim, &[]),
            experiment(QualityByTimeLimit, "Experiment3_PopUnique.csv", "ex3_PopUnique.svg", PopulationUniqueness, &high_dim, &[]),
        ];

        FigureConfig {
            algorithms,
            dataset_aliases,
            metrics,
            highlight_algorithm: Some("BEST_EFFORT_GENETIC".to_string()),
            quality_samples: default_quality_samples(),
            experiments,
        }
    }
}

fn lookup_ticks(table: &BTreeMap<String, TickSpec>, metric: Metric, dataset: &str) -> Result<TickSpec> {
    table
        .get(dataset)
        .copied()
        .ok_or_else(|| AnalysisError::Config(format!("no y ticks for {} / {}", metric, dataset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_config_survives_json() {
        let config = FigureConfig::paper();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"Population Uniqueness\""));
        assert!(json.contains("\"quality_over_time\""));
        let back: FigureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn lookups() {
        let config = FigureConfig::paper();
        assert_eq!(config.style("BEST_EFFORT_GENETIC").unwrap().line_color(), "#daa520");
        assert_eq!(config.style("OPTIMAL").unwrap().line_color(), "#808080");
        assert!(matches!(config.style("RANDOM"), Err(AnalysisError::Config(_))));
        assert_eq!(config.alias("ADULT"), "Census income");
        assert_eq!(config.alias("UNKNOWN"), "UNKNOWN");
        assert_eq!(config.metrics.get(Metric::PopulationUniqueness).quality_x_max, 100.0);
        assert!(config.runtime_ticks(Metric::Distinguishability, "SS13ACS").is_err());
    }

    #[test]
    fn ticks_are_evenly_spaced() {
        assert_eq!(TickSpec::new(50.0, 6).ticks(), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(TickSpec::new(80.0, 3).ticks(), vec![0.0, 40.0, 80.0]);
    }
}
