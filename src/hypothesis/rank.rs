// Mann-Whitney U rank-sum test
//
// Non-parametric comparison of two independent samples. Small tie-free
// samples use the exact null distribution of U; larger samples or samples
// with ties use the normal approximation with tie correction and a 0.5
// continuity correction.

use crate::hypothesis::statistics::{clip_pvalue, validate_sample, TestResult};
use anyhow::Result;
use statrs::distribution::{ContinuousCDF, Normal};

/// Both samples above this size switch to the normal approximation
const EXACT_MAX_N: usize = 8;

/// Two-sided Mann-Whitney U test
///
/// The reported statistic is U for the first sample,
/// `R1 - n1(n1 + 1) / 2`, where R1 is its rank sum in the pooled data.
///
/// # Errors
/// Empty or non-finite samples, or all pooled values identical.
///
/// # Example
/// ```
/// use abtest::hypothesis::mann_whitney_u;
///
/// let result = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert!((result.pvalue - 0.1).abs() < 1e-12);
/// ```
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TestResult> {
    validate_sample(a, 1, "Mann-Whitney U")?;
    validate_sample(b, 1, "Mann-Whitney U")?;

    let (n1, n2) = (a.len(), b.len());
    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, ties) = rank_with_ties(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let has_ties = ties.iter().any(|&t| t > 1);
    let pvalue = if (n1 > EXACT_MAX_N && n2 > EXACT_MAX_N) || has_ties {
        asymptotic_pvalue(u, n1, n2, &ties)?
    } else {
        exact_pvalue(u, n1, n2)
    };

    tracing::debug!(
        "Mann-Whitney n1={} n2={} U1={} ties={} p={:.6}",
        n1,
        n2,
        u1,
        has_ties,
        pvalue
    );
    Ok(TestResult::new(u1, clip_pvalue(pvalue)))
}

/// Average (1-based) ranks of `values` in input order, plus the size of
/// every group of tied values
fn rank_with_ties(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut ties = Vec::new();
    let mut i = 0;

    while i < order.len() {
        let value = values[order[i]];
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == value {
            j += 1;
        }

        // Positions i..=j share ranks (i+1)..=(j+1)
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }

        ties.push(j - i + 1);
        i = j + 1;
    }

    (ranks, ties)
}

fn asymptotic_pvalue(u: f64, n1: usize, n2: usize, ties: &[usize]) -> Result<f64> {
    let n = (n1 + n2) as f64;
    let product = (n1 * n2) as f64;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t.powi(3) - t
        })
        .sum();

    let sigma = (product / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
    if sigma.is_nan() || sigma <= 0.0 {
        anyhow::bail!("Mann-Whitney U is undefined: all values are identical");
    }

    let z = (u - product / 2.0 - 0.5) / sigma;
    Ok(2.0 * Normal::standard().sf(z))
}

/// Two-sided p-value from the exact distribution of U
///
/// Under H0 every arrangement of the pooled ranks is equally likely; the
/// number of arrangements giving each U is a coefficient of the Gaussian
/// binomial polynomial [n1 + n2 choose n1].
fn exact_pvalue(u: f64, n1: usize, n2: usize) -> f64 {
    let counts = gaussian_binomial(n1.min(n2), n1.max(n2));
    let total: f64 = counts.iter().sum();
    // Without ties U is a whole number
    let start = (u.round() as usize).min(counts.len());
    let upper_tail: f64 = counts[start..].iter().sum();
    2.0 * upper_tail / total
}

/// Coefficients of the Gaussian binomial [k + other choose k] in powers of q
fn gaussian_binomial(k: usize, other: usize) -> Vec<f64> {
    let mut coeffs = vec![1.0];

    for i in 1..=k {
        let shift = other + i;
        let mut next = coeffs.clone();
        next.resize(coeffs.len() + shift, 0.0);

        // Multiply by (1 - q^shift)
        for j in (shift..next.len()).rev() {
            next[j] -= next[j - shift];
        }
        // Divide by (1 - q^i)
        for j in i..next.len() {
            next[j] += next[j - i];
        }

        next.truncate(i * other + 1);
        coeffs = next;
    }

    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_gaussian_binomial_counts() {
        // [5 choose 2]_q
        assert_eq!(
            gaussian_binomial(2, 3),
            vec![1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0]
        );
        // Coefficients sum to the ordinary binomial C(9, 4)
        let total: f64 = gaussian_binomial(4, 5).iter().sum();
        assert_eq!(total, 126.0);
    }

    #[test]
    fn test_ranks_average_ties() {
        let (ranks, ties) = rank_with_ties(&[10.0, 20.0, 20.0, 5.0, 20.0]);
        assert_eq!(ranks, vec![2.0, 4.0, 4.0, 1.0, 4.0]);
        assert_eq!(ties, vec![1, 1, 3]);
    }

    #[test]
    fn test_exact_separated_samples() {
        let result = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_close(result.pvalue, 0.1, 1e-12);

        // Reversed order gives U1 = n1*n2 and the same p-value
        let reversed = mann_whitney_u(&[4.0, 5.0, 6.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(reversed.statistic, 9.0);
        assert_close(reversed.pvalue, 0.1, 1e-12);
    }

    #[test]
    fn test_exact_interleaved_samples() {
        let result = mann_whitney_u(&[1.0, 5.0, 9.0, 3.0], &[2.0, 8.0, 7.0, 6.0, 11.0]).unwrap();
        assert_eq!(result.statistic, 6.0);
        assert_close(result.pvalue, 0.412698, 1e-6);
    }

    #[test]
    fn test_ties_use_normal_approximation() {
        let result = mann_whitney_u(&[1.0, 2.0, 2.0, 3.0], &[2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(result.statistic, 2.5);
        assert_close(result.pvalue, 0.136658, 1e-6);
    }

    #[test]
    fn test_large_samples_use_normal_approximation() {
        let a: Vec<f64> = (1..=10).map(f64::from).collect();
        let b: Vec<f64> = (11..=20).map(f64::from).collect();
        let result = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_close(result.pvalue, 0.000183, 1e-6);
    }

    #[test]
    fn test_identical_samples_not_significant() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let result = mann_whitney_u(&a, &a).unwrap();
        assert!(result.pvalue > 0.5);
        assert!(result.pvalue <= 1.0);
    }

    #[test]
    fn test_all_values_identical_rejected() {
        let a = [3.0, 3.0, 3.0];
        assert!(mann_whitney_u(&a, &a).is_err());
    }

    #[test]
    fn test_empty_sample_rejected() {
        assert!(mann_whitney_u(&[], &[1.0, 2.0]).is_err());
    }
}
