//! Descriptive overview of the merged dataset
//!
//! Shape, column types, head/tail previews, missing-value counts and a
//! quantile table of the numeric columns, computed before any test runs.

use crate::dataset::{Dataset, Metric, Observation};
use serde::Serialize;
use std::fmt::Write;

/// Quantile levels reported for every numeric column
pub const QUANTILES: [f64; 6] = [0.0, 0.05, 0.50, 0.95, 0.99, 1.0];

/// Name of the label column added at merge time
pub const GROUP_COLUMN: &str = "group";

/// Preview row: position in the merged dataset plus the observation
#[derive(Debug, Clone, Serialize)]
pub struct IndexedRow {
    pub index: usize,
    #[serde(flatten)]
    pub observation: Observation,
}

/// Quantiles of one numeric column (missing cells excluded)
#[derive(Debug, Clone, Serialize)]
pub struct QuantileRow {
    pub column: String,
    /// One value per entry of [`QUANTILES`]; `None` when the column has no values
    pub values: Vec<Option<f64>>,
}

/// Descriptive summary of a dataset
#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_types: Vec<(String, String)>,
    pub head: Vec<IndexedRow>,
    pub tail: Vec<IndexedRow>,
    pub null_counts: Vec<(String, usize)>,
    pub quantiles: Vec<QuantileRow>,
}

impl DataSummary {
    /// Summarize `dataset`, previewing `head_rows` rows at each end
    pub fn describe(dataset: &Dataset, head_rows: usize) -> Self {
        let rows = dataset.rows();
        let indexed = |(index, obs): (usize, &Observation)| IndexedRow {
            index,
            observation: obs.clone(),
        };

        let head = rows.iter().enumerate().take(head_rows).map(indexed).collect();
        let tail = rows
            .iter()
            .enumerate()
            .skip(rows.len().saturating_sub(head_rows))
            .map(indexed)
            .collect();

        let mut column_types: Vec<(String, String)> = Metric::ALL
            .iter()
            .map(|m| (m.column_name().to_string(), "f64".to_string()))
            .collect();
        column_types.push((GROUP_COLUMN.to_string(), "str".to_string()));

        let mut null_counts: Vec<(String, usize)> = Metric::ALL
            .iter()
            .map(|&m| {
                let missing = dataset.column(m).iter().filter(|v| v.is_none()).count();
                (m.column_name().to_string(), missing)
            })
            .collect();
        null_counts.push((GROUP_COLUMN.to_string(), 0));

        let quantiles = Metric::ALL
            .iter()
            .map(|&m| {
                let mut values: Vec<f64> = dataset.column(m).into_iter().flatten().collect();
                values.sort_by(f64::total_cmp);
                QuantileRow {
                    column: m.column_name().to_string(),
                    values: QUANTILES.iter().map(|&q| quantile(&values, q)).collect(),
                }
            })
            .collect();

        Self {
            rows: dataset.len(),
            columns: column_types.len(),
            column_types,
            head,
            tail,
            null_counts,
            quantiles,
        }
    }

    /// Render the summary as the console sections of the report
    pub fn to_report_string(&self) -> String {
        let mut out = String::new();

        out.push_str("########## Shape ##########\n");
        let _ = writeln!(out, "({}, {})", self.rows, self.columns);

        out.push_str("########## Types ##########\n");
        for (name, kind) in &self.column_types {
            let _ = writeln!(out, "{:<12} {}", name, kind);
        }

        out.push_str("########## Head ##########\n");
        render_rows(&mut out, &self.head);

        out.push_str("########## Tail ##########\n");
        render_rows(&mut out, &self.tail);

        out.push_str("########## NA ##########\n");
        for (name, count) in &self.null_counts {
            let _ = writeln!(out, "{:<12} {}", name, count);
        }

        out.push_str("########## Quantiles ##########\n");
        let _ = write!(out, "{:<12}", "");
        for q in QUANTILES {
            let _ = write!(out, " {:>14}", format!("{:.2}", q));
        }
        out.push('\n');
        for row in &self.quantiles {
            let _ = write!(out, "{:<12}", row.column);
            for value in &row.values {
                let _ = write!(out, " {:>14}", format_cell(*value));
            }
            out.push('\n');
        }

        out
    }
}

fn render_rows(out: &mut String, rows: &[IndexedRow]) {
    let _ = write!(out, "{:>6}", "");
    for metric in Metric::ALL {
        let _ = write!(out, " {:>14}", metric.column_name());
    }
    let _ = writeln!(out, " {:>8}", GROUP_COLUMN);

    for row in rows {
        let _ = write!(out, "{:>6}", row.index);
        for metric in Metric::ALL {
            let _ = write!(out, " {:>14}", format_cell(row.observation.value(metric)));
        }
        let _ = writeln!(out, " {:>8}", row.observation.group);
    }
}

/// Table cells use five decimals; missing values print as NaN
fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.5}", v),
        None => "NaN".to_string(),
    }
}

/// Linear-interpolation quantile of already sorted data
///
/// `q` is a fraction in [0, 1]. Returns `None` for empty input.
pub fn quantile(sorted_data: &[f64], q: f64) -> Option<f64> {
    if sorted_data.is_empty() {
        return None;
    }
    if sorted_data.len() == 1 {
        return Some(sorted_data[0]);
    }

    let index = q.clamp(0.0, 1.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        Some(sorted_data[lower])
    } else {
        let weight = index - lower as f64;
        Some(sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight)
    }
}
