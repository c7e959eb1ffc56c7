// Configuration for the two-group analysis
//
// Input location, sheet names, outcome column and significance level are
// configuration rather than constants. Values come from a TOML file
// (optional) and are then overridden by command-line flags.

use crate::dataset::Metric;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for an A/B analysis run
///
/// # Example
/// ```
/// use abtest::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Workbook file, or directory holding one CSV per sheet
    pub input: PathBuf,

    /// Sheet holding the control group (existing method)
    pub control_sheet: String,

    /// Sheet holding the test group (new method)
    pub test_sheet: String,

    /// Outcome column under test
    pub metric: Metric,

    /// Statistical significance level (alpha) for every test in the run
    ///
    /// - 0.05 (default): 95% confidence level
    /// - 0.01: stricter, fewer false positives
    /// - 0.10: looser, fewer false negatives
    ///
    /// An assumption "holds" when its p-value is strictly greater than alpha;
    /// the groups "differ" when the final p-value is at most alpha.
    pub significance_level: f64,

    /// Where the bar chart of group means is written
    pub chart_path: PathBuf,

    /// Rows shown in the head/tail previews
    pub head_rows: usize,

    /// Minimum observations per group
    ///
    /// Shapiro-Wilk needs at least 3 values, so lower settings are rejected.
    pub min_sample_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("datasets/ab_testing.xlsx"),
            control_sheet: "Control Group".to_string(),
            test_sheet: "Test Group".to_string(),
            metric: Metric::Purchase,
            significance_level: 0.05, // 95% confidence (standard in science)
            chart_path: PathBuf::from("plots/average_purchase.svg"),
            head_rows: 5,
            min_sample_size: 3,
        }
    }
}

impl AnalysisConfig {
    /// Create a strict configuration (99% confidence)
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            min_sample_size: 10,
            ..Self::default()
        }
    }

    /// Create a permissive configuration (90% confidence)
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    ///
    /// Keys that are absent keep their default values. Values are not
    /// validated here; call [`AnalysisConfig::validate`] once command-line
    /// overrides have been applied.
    ///
    /// # Example TOML
    /// ```toml
    /// input = "datasets/ab_testing.xlsx"
    /// metric = "purchase"
    /// significance_level = 0.05
    /// chart_path = "plots/average_purchase.svg"
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML in {}", path.as_ref().display()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.min_sample_size < 3 {
            return Err(format!(
                "min_sample_size must be >= 3 for Shapiro-Wilk, got {}",
                self.min_sample_size
            ));
        }

        if self.head_rows == 0 {
            return Err("head_rows must be at least 1".to_string());
        }

        if self.control_sheet == self.test_sheet {
            return Err(format!(
                "control_sheet and test_sheet must differ, both are '{}'",
                self.control_sheet
            ));
        }

        Ok(())
    }
}
