//! One analysis run: load, summarize, test, chart
//!
//! Everything `main` does apart from argument parsing and printing, so a full
//! run can be exercised from tests without spawning the binary.

use crate::chart::render_group_means;
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Group};
use crate::hypothesis::assess;
use crate::loader::load_experiment;
use crate::report::AnalysisReport;
use crate::summary::DataSummary;
use anyhow::{Context, Result};

/// Below this many values per group the tests have little power
const RECOMMENDED_SAMPLE_SIZE: usize = 30;

/// Load the configured input and analyze it
///
/// With `render_chart` the bar chart is written to `config.chart_path`.
pub fn run(config: &AnalysisConfig, render_chart: bool) -> Result<AnalysisReport> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let dataset = load_experiment(config)
        .with_context(|| format!("Failed to load experiment data from {}", config.input.display()))?;

    analyze(&dataset, config, render_chart)
}

/// Analyze an already loaded dataset
pub fn analyze(
    dataset: &Dataset,
    config: &AnalysisConfig,
    render_chart: bool,
) -> Result<AnalysisReport> {
    let metric = config.metric;
    let summary = DataSummary::describe(dataset, config.head_rows);

    let control = dataset.sample(Group::Control, metric)?;
    let test = dataset.sample(Group::Test, metric)?;

    for (group, sample) in [(Group::Control, &control), (Group::Test, &test)] {
        if sample.len() < config.min_sample_size {
            anyhow::bail!(
                "Group '{}' has {} {} values, at least {} required",
                group,
                sample.len(),
                metric,
                config.min_sample_size
            );
        }
        if sample.len() < RECOMMENDED_SAMPLE_SIZE {
            tracing::warn!(
                "Group '{}' has only {} values; results may be unreliable",
                group,
                sample.len()
            );
        }
    }

    let assessment = assess(&control, &test, metric, config.significance_level)?;

    let chart_path = if render_chart {
        render_group_means(&dataset.group_means(metric), metric, &config.chart_path)?;
        Some(config.chart_path.clone())
    } else {
        None
    };

    Ok(AnalysisReport {
        summary,
        assessment,
        chart_path,
    })
}
