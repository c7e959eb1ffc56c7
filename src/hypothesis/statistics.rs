// Shared result type and sample helpers for the hypothesis tests
//
// Every procedure in this module family returns a (statistic, p-value)
// pair. The helpers below work on plain f64 slices; callers are expected to
// hand over complete samples (missing values are rejected upstream).

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Outcome of one statistical procedure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test statistic (W, F, t or U depending on the procedure)
    pub statistic: f64,

    /// p-value under the procedure's null hypothesis
    pub pvalue: f64,
}

impl TestResult {
    pub fn new(statistic: f64, pvalue: f64) -> Self {
        Self { statistic, pvalue }
    }

    /// Null hypothesis is rejected: p <= alpha
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.pvalue <= alpha
    }

    /// Data are consistent with the null hypothesis: p > alpha
    pub fn supports_null(&self, alpha: f64) -> bool {
        !self.is_significant(alpha)
    }
}

/// Reject samples that are too short or contain NaN/infinite values
pub(crate) fn validate_sample(sample: &[f64], min_len: usize, test: &str) -> Result<()> {
    if sample.len() < min_len {
        anyhow::bail!(
            "{} needs at least {} values per sample, got {}",
            test,
            min_len,
            sample.len()
        );
    }

    if let Some(bad) = sample.iter().find(|v| !v.is_finite()) {
        anyhow::bail!("{} received a non-finite value: {}", test, bad);
    }

    Ok(())
}

pub fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Unbiased sample variance (divides by n - 1)
pub fn sample_variance(sample: &[f64]) -> f64 {
    let m = mean(sample);
    sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (sample.len() as f64 - 1.0)
}

pub fn median(sample: &[f64]) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Clip a p-value into [0, 1]
pub(crate) fn clip_pvalue(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}
