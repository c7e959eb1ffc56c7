// Independent two-sample t-tests
//
// Student's variant pools the two variances (equal-variance assumption);
// Welch's variant keeps them separate and uses the Welch-Satterthwaite
// degrees of freedom. Both report a two-sided p-value for
// t = (mean(a) - mean(b)) / se.

use crate::hypothesis::statistics::{clip_pvalue, mean, sample_variance, validate_sample, TestResult};
use anyhow::{Context, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sample t-test assuming equal variances
///
/// # Example
/// ```
/// use abtest::hypothesis::student_t;
///
/// let control = vec![10.0, 12.0, 11.0, 13.0, 10.0];
/// let test = vec![25.0, 27.0, 26.0, 28.0, 25.0];
/// let result = student_t(&control, &test).unwrap();
/// assert!(result.statistic < 0.0);
/// assert!(result.pvalue < 0.05);
/// ```
pub fn student_t(a: &[f64], b: &[f64]) -> Result<TestResult> {
    validate_sample(a, 2, "Student's t-test")?;
    validate_sample(b, 2, "Student's t-test")?;

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * sample_variance(a) + (n2 - 1.0) * sample_variance(b)) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();

    if se <= 0.0 {
        anyhow::bail!("Student's t-test is undefined: both samples are constant");
    }

    let statistic = (mean(a) - mean(b)) / se;
    let pvalue = two_sided_pvalue(statistic, df)?;

    tracing::debug!("Student t={:.6} df={} p={:.6}", statistic, df, pvalue);
    Ok(TestResult::new(statistic, pvalue))
}

/// Two-sample t-test with Welch's correction for unequal variances
///
/// # Example
/// ```
/// use abtest::hypothesis::welch_t;
///
/// let control = vec![10.0, 12.0, 11.0, 13.0, 10.0];
/// let test = vec![11.0, 13.0, 10.0, 12.0, 11.0];
/// let result = welch_t(&control, &test).unwrap();
/// assert!(result.pvalue >= 0.05);
/// ```
pub fn welch_t(a: &[f64], b: &[f64]) -> Result<TestResult> {
    validate_sample(a, 2, "Welch's t-test")?;
    validate_sample(b, 2, "Welch's t-test")?;

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let v1 = sample_variance(a) / n1;
    let v2 = sample_variance(b) / n2;
    let se2 = v1 + v2;

    if se2 <= 0.0 {
        anyhow::bail!("Welch's t-test is undefined: both samples are constant");
    }

    // Welch-Satterthwaite approximation
    let df = se2.powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
    let statistic = (mean(a) - mean(b)) / se2.sqrt();
    let pvalue = two_sided_pvalue(statistic, df)?;

    tracing::debug!("Welch t={:.6} df={:.3} p={:.6}", statistic, df, pvalue);
    Ok(TestResult::new(statistic, pvalue))
}

fn two_sided_pvalue(statistic: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .with_context(|| format!("Failed to build t distribution with df={}", df))?;
    Ok(clip_pvalue(2.0 * dist.sf(statistic.abs())))
}
