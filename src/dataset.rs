//! Experiment observations and the merged two-group dataset
//!
//! Rows come from the control and test sheets; the group label is attached
//! at merge time and never read from the source data.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Experiment arm an observation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Existing method (maximum bidding)
    Control,
    /// New method (average bidding)
    Test,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Control, Group::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Control => "control",
            Group::Test => "test",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Numeric column of an observation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Number of ad views
    Impression,
    /// Number of ad clicks
    Click,
    /// Number of purchases after clicking
    #[default]
    Purchase,
    /// Revenue from purchases
    Earning,
}

impl Metric {
    /// Columns in sheet order
    pub const ALL: [Metric; 4] = [
        Metric::Impression,
        Metric::Click,
        Metric::Purchase,
        Metric::Earning,
    ];

    /// Column header as it appears in the source sheets
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Impression => "Impression",
            Metric::Click => "Click",
            Metric::Purchase => "Purchase",
            Metric::Earning => "Earning",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column_name())
    }
}

/// One row of experiment data (`None` marks an empty cell)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub impression: Option<f64>,
    pub click: Option<f64>,
    pub purchase: Option<f64>,
    pub earning: Option<f64>,
    pub group: Group,
}

impl Observation {
    /// Build a fully populated observation
    pub fn new(group: Group, impression: f64, click: f64, purchase: f64, earning: f64) -> Self {
        Self {
            impression: Some(impression),
            click: Some(click),
            purchase: Some(purchase),
            earning: Some(earning),
            group,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Impression => self.impression,
            Metric::Click => self.click,
            Metric::Purchase => self.purchase,
            Metric::Earning => self.earning,
        }
    }
}

/// Ordered, immutable collection of observations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// Concatenate control and test rows, labelling each with its group
    ///
    /// Control rows come first, then test rows; source order is kept
    /// within each group.
    pub fn merge(control: Vec<Observation>, test: Vec<Observation>) -> Self {
        let rows = control
            .into_iter()
            .map(|obs| Observation {
                group: Group::Control,
                ..obs
            })
            .chain(test.into_iter().map(|obs| Observation {
                group: Group::Test,
                ..obs
            }))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to `group`, in dataset order
    pub fn group_rows(&self, group: Group) -> impl Iterator<Item = &Observation> {
        self.rows.iter().filter(move |obs| obs.group == group)
    }

    /// All values of `metric` (missing cells included as `None`)
    pub fn column(&self, metric: Metric) -> Vec<Option<f64>> {
        self.rows.iter().map(|obs| obs.value(metric)).collect()
    }

    /// Outcome sample of one group, ready for the statistical routines
    ///
    /// # Errors
    /// Fails when the group has no rows or any of its values is missing.
    pub fn sample(&self, group: Group, metric: Metric) -> Result<Vec<f64>> {
        let values: Vec<Option<f64>> = self.group_rows(group).map(|o| o.value(metric)).collect();

        if values.is_empty() {
            anyhow::bail!("Group '{}' has no observations", group);
        }

        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing > 0 {
            anyhow::bail!(
                "{} has {} missing value(s) in group '{}'",
                metric,
                missing,
                group
            );
        }

        Ok(values.into_iter().flatten().collect())
    }

    /// Mean of `metric` per group, skipping missing cells
    ///
    /// Groups without any value are omitted.
    pub fn group_means(&self, metric: Metric) -> Vec<(Group, f64)> {
        Group::ALL
            .iter()
            .filter_map(|&group| {
                let values: Vec<f64> = self
                    .group_rows(group)
                    .filter_map(|o| o.value(metric))
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some((group, values.iter().sum::<f64>() / values.len() as f64))
                }
            })
            .collect()
    }
}
