//! CLI argument parsing for abtest

use crate::config::AnalysisConfig;
use crate::dataset::Metric;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "abtest")]
#[command(version)]
#[command(
    about = "Compare control and test groups: assumption checks, automatic test selection, verdict",
    long_about = None
)]
pub struct Cli {
    /// Workbook (xlsx/xls/ods) or directory of per-sheet CSV files
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Load settings from a TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Significance level for every test (default: 0.05)
    #[arg(long = "alpha", value_name = "P")]
    pub alpha: Option<f64>,

    /// Outcome column to compare (default: purchase)
    #[arg(long = "metric", value_enum)]
    pub metric: Option<Metric>,

    /// Sheet holding the control group
    #[arg(long = "control-sheet", value_name = "NAME")]
    pub control_sheet: Option<String>,

    /// Sheet holding the test group
    #[arg(long = "test-sheet", value_name = "NAME")]
    pub test_sheet: Option<String>,

    /// Where to write the SVG bar chart of group means
    #[arg(long = "chart", value_name = "PATH", conflicts_with = "no_chart")]
    pub chart: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long = "no-chart")]
    pub no_chart: bool,

    /// Rows shown in the head/tail previews (default: 5)
    #[arg(long = "head", value_name = "N")]
    pub head: Option<usize>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `config`
    pub fn apply_overrides(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(alpha) = self.alpha {
            config.significance_level = alpha;
        }
        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(sheet) = &self.control_sheet {
            config.control_sheet = sheet.clone();
        }
        if let Some(sheet) = &self.test_sheet {
            config.test_sheet = sheet.clone();
        }
        if let Some(chart) = &self.chart {
            config.chart_path = chart.clone();
        }
        if let Some(head) = self.head {
            config.head_rows = head;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["abtest"]);
        assert!(cli.input.is_none());
        assert!(cli.alpha.is_none());
        assert!(!cli.no_chart);
        assert!(!cli.debug);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_positional_input() {
        let cli = Cli::parse_from(["abtest", "data/ab.xlsx"]);
        assert_eq!(cli.input, Some(PathBuf::from("data/ab.xlsx")));
    }

    #[test]
    fn test_cli_metric_and_format() {
        let cli = Cli::parse_from(["abtest", "--metric", "earning", "--format", "json"]);
        assert_eq!(cli.metric, Some(Metric::Earning));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_chart_conflicts_with_no_chart() {
        let result = Cli::try_parse_from(["abtest", "--chart", "a.svg", "--no-chart"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_metric() {
        assert!(Cli::try_parse_from(["abtest", "--metric", "revenue"]).is_err());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "abtest",
            "input_dir",
            "--alpha",
            "0.01",
            "--metric",
            "click",
            "--control-sheet",
            "A",
            "--test-sheet",
            "B",
            "--chart",
            "out/chart.svg",
            "--head",
            "3",
        ]);
        let config = cli.apply_overrides(AnalysisConfig::default());

        assert_eq!(config.input, PathBuf::from("input_dir"));
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.metric, Metric::Click);
        assert_eq!(config.control_sheet, "A");
        assert_eq!(config.test_sheet, "B");
        assert_eq!(config.chart_path, PathBuf::from("out/chart.svg"));
        assert_eq!(config.head_rows, 3);
    }

    #[test]
    fn test_overrides_keep_unset_values() {
        let cli = Cli::parse_from(["abtest"]);
        let base = AnalysisConfig::permissive();
        assert_eq!(cli.apply_overrides(base.clone()), base);
    }
}
