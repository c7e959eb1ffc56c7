//! Bar chart of the mean outcome per group
//!
//! Rendered as SVG with plotters. Parent directories of the output path are
//! created on demand.

use crate::dataset::{Group, Metric};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const SIZE: (u32, u32) = (640, 480);

/// Chart caption, e.g. "Average Purchase by Group"
pub fn chart_title(metric: Metric) -> String {
    format!("Average {} by Group", metric)
}

/// Draw one bar per group (x = group, y = mean outcome) into `path`
pub fn render_group_means(means: &[(Group, f64)], metric: Metric, path: &Path) -> Result<()> {
    if means.is_empty() {
        anyhow::bail!("No group means to plot");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create chart directory {}", parent.display()))?;
    }

    draw(means, metric, path)
        .with_context(|| format!("Failed to render chart to {}", path.display()))?;

    tracing::info!("Wrote chart {}", path.display());
    Ok(())
}

fn draw(means: &[(Group, f64)], metric: Metric, path: &Path) -> Result<()> {
    let labels: Vec<String> = means.iter().map(|(group, _)| group.to_string()).collect();
    let y_max = means
        .iter()
        .map(|(_, mean)| *mean)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.15;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(chart_title(metric), ("sans-serif", 22).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d((0usize..means.len() - 1).into_segmented(), 0f64..y_max)?;

    let label_of = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Group")
        .y_desc(format!("Average {}", metric))
        .x_label_formatter(&label_of)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(40)
            .data(means.iter().enumerate().map(|(i, (_, mean))| (i, *mean))),
    )?;

    root.present()?;
    Ok(())
}
