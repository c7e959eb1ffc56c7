// Levene's test for homogeneity of variances
//
// Uses the Brown-Forsythe form: absolute deviations from each group's
// median, which stays robust when the data are skewed. The statistic
// follows an F distribution with (k - 1, N - k) degrees of freedom.

use crate::hypothesis::statistics::{mean, median, validate_sample, TestResult};
use anyhow::{Context, Result};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Levene test of the null hypothesis that all groups share one variance
///
/// Accepts two or more samples. A p-value above the significance level
/// means equal variances cannot be rejected.
///
/// # Errors
/// Fewer than two groups, a group with fewer than two values, non-finite
/// values, or no spread at all within the groups' deviations.
///
/// # Example
/// ```
/// use abtest::hypothesis::levene;
///
/// let narrow = [99.0, 100.0, 101.0, 100.5, 99.5, 100.2];
/// let wide = [60.0, 140.0, 80.0, 120.0, 95.0, 105.0];
/// let result = levene(&[&narrow, &wide]).unwrap();
/// assert!(result.pvalue < 0.05);
/// ```
pub fn levene(samples: &[&[f64]]) -> Result<TestResult> {
    let k = samples.len();
    if k < 2 {
        anyhow::bail!("Levene's test needs at least 2 groups, got {}", k);
    }
    for sample in samples {
        validate_sample(sample, 2, "Levene's test")?;
    }

    // Absolute deviations from the group median
    let deviations: Vec<Vec<f64>> = samples
        .iter()
        .map(|sample| {
            let center = median(sample);
            sample.iter().map(|x| (x - center).abs()).collect()
        })
        .collect();

    let total: usize = deviations.iter().map(Vec::len).sum();
    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zi)| z.len() as f64 * (zi - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zi)| z.iter().map(|zij| (zij - zi).powi(2)).sum::<f64>())
        .sum();

    if within <= 0.0 {
        anyhow::bail!("Levene's test is undefined: deviations from the median have no spread");
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let statistic = (df_within * between) / (df_between * within);

    let f = FisherSnedecor::new(df_between, df_within)
        .context("Failed to build F distribution for Levene's test")?;
    let pvalue = f.sf(statistic);

    tracing::debug!(
        "Levene k={} N={} W={:.6} p={:.6}",
        k,
        total,
        statistic,
        pvalue
    );
    Ok(TestResult::new(statistic, pvalue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_spread() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [11.0, 12.0, 13.0, 14.0, 15.0];
        let result = levene(&[&a, &b]).unwrap();
        assert!(result.statistic.abs() < 1e-12);
        assert!((result.pvalue - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hand_computed_statistic() {
        // medians 2 and 20 → deviations [1,0,1] and [10,0,10]
        // group means 2/3 and 20/3, grand mean 11/3
        // between = 3*3^2 + 3*3^2 = 54, within = 2/3 + 200/3 = 202/3
        // W = (6-2)*54 / (1 * 202/3) = 648/202
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        let result = levene(&[&a, &b]).unwrap();
        assert!((result.statistic - 648.0 / 202.0).abs() < 1e-9);
        assert!(result.pvalue > 0.05 && result.pvalue < 1.0);
    }

    #[test]
    fn test_shift_invariant() {
        let a = [3.0, 7.0, 1.0, 9.0, 4.0];
        let b = [2.0, 8.0, 5.0, 6.0, 0.5];
        let shifted: Vec<f64> = b.iter().map(|x| x + 1000.0).collect();
        let base = levene(&[&a, &b]).unwrap();
        let moved = levene(&[&a, &shifted]).unwrap();
        assert!((base.statistic - moved.statistic).abs() < 1e-9);
    }

    #[test]
    fn test_three_groups() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [0.0, 5.0, 10.0, 20.0];
        let result = levene(&[&a, &b, &c]).unwrap();
        assert!(result.statistic > 0.0);
        assert!(result.pvalue > 0.0 && result.pvalue < 1.0);
    }

    #[test]
    fn test_single_group_rejected() {
        let a = [1.0, 2.0, 3.0];
        assert!(levene(&[&a]).is_err());
    }

    #[test]
    fn test_tiny_group_rejected() {
        let a = [1.0];
        let b = [1.0, 2.0, 3.0];
        assert!(levene(&[&a, &b]).is_err());
    }

    #[test]
    fn test_no_spread_rejected() {
        let a = [5.0, 5.0, 5.0];
        let b = [7.0, 7.0, 7.0];
        assert!(levene(&[&a, &b]).is_err());
    }
}
