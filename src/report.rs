//! Text and JSON output for an analysis run
//!
//! The text form mirrors the console sections of the descriptive summary
//! followed by the hypothesis sections. `--format json` emits one document
//! with the same content for machine consumption.

use crate::dataset::{Group, Metric};
use crate::hypothesis::{AssumptionReport, HypothesisAssessment, TestKind};
use crate::summary::DataSummary;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Null and alternative hypotheses in words
#[derive(Debug, Clone, Serialize)]
pub struct JsonHypotheses {
    pub null: String,
    pub alternative: String,
}

/// Mean outcome of one group
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroupMean {
    pub group: Group,
    pub mean: f64,
}

/// Selected hypothesis test and its result
#[derive(Debug, Clone, Serialize)]
pub struct JsonTest {
    pub kind: TestKind,
    pub name: String,
    /// Why this test was selected
    pub reason: String,
    pub statistic: f64,
    pub pvalue: f64,
}

/// Final decision
#[derive(Debug, Clone, Serialize)]
pub struct JsonVerdict {
    pub significant: bool,
    /// "no statistically significant difference" or
    /// "statistically significant difference"
    pub description: String,
    /// Group favoured by the selected test, only when the difference is significant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub higher_group: Option<Group>,
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub metric: Metric,
    pub significance_level: f64,
    pub summary: DataSummary,
    pub hypotheses: JsonHypotheses,
    pub group_means: Vec<JsonGroupMean>,
    pub assumptions: AssumptionReport,
    pub test: JsonTest,
    pub verdict: JsonVerdict,
    pub recommendation: String,
    /// Chart output path (absent with --no-chart)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<PathBuf>,
}

/// Everything the reporter prints for one run
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub summary: DataSummary,
    pub assessment: HypothesisAssessment,
    /// Where the chart was written, if rendering was enabled
    pub chart_path: Option<PathBuf>,
}

impl AnalysisReport {
    /// Human-readable report
    pub fn to_text(&self) -> String {
        let mut out = self.summary.to_report_string();
        out.push_str(&self.assessment.to_report_string());
        if let Some(path) = &self.chart_path {
            out.push_str(&format!("Chart written to {}\n", path.display()));
        }
        out
    }

    pub fn to_json_report(&self) -> JsonReport {
        let a = &self.assessment;
        JsonReport {
            metric: a.metric,
            significance_level: a.significance_level,
            summary: self.summary.clone(),
            hypotheses: JsonHypotheses {
                null: a.null_hypothesis(),
                alternative: a.alternative_hypothesis(),
            },
            group_means: vec![
                JsonGroupMean {
                    group: Group::Control,
                    mean: a.control_mean,
                },
                JsonGroupMean {
                    group: Group::Test,
                    mean: a.test_mean,
                },
            ],
            assumptions: a.assumptions.clone(),
            test: JsonTest {
                kind: a.test,
                name: a.test.name().to_string(),
                reason: a.selection_reason().to_string(),
                statistic: a.result.statistic,
                pvalue: a.result.pvalue,
            },
            verdict: JsonVerdict {
                significant: a.verdict.is_significant(),
                description: a.verdict.to_string(),
                higher_group: a.verdict.higher_group(),
            },
            recommendation: a.recommendation(),
            chart: self.chart_path.clone(),
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json_report()).context("Failed to serialize report")
    }
}
