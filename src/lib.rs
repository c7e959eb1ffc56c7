//! abtest - Two-group A/B test analysis
//!
//! Loads the control and test groups of an experiment, summarizes the data,
//! checks normality and variance homogeneity, picks Student's t, Welch's t
//! or Mann-Whitney U accordingly, and reports the verdict with a bar chart
//! of the group means.

pub mod chart;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod hypothesis; // Assumption checks, test selection, verdict
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod summary;
