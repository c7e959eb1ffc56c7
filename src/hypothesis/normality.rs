// Shapiro-Wilk normality test
//
// Royston, P. (1995). Remark AS R94: A remark on algorithm AS 181: The
// W-test for normality. Applied Statistics, 44(4), 547-551.
//
// Coefficients come from Royston's polynomial approximations; the p-value
// uses the exact arcsine form for n = 3 and normalizing transformations of
// ln(1 - W) otherwise. Valid for 3 <= n <= 5000.

use crate::hypothesis::statistics::{mean, validate_sample, TestResult};
use anyhow::Result;
use statrs::distribution::{ContinuousCDF, Normal};

/// Above this size the p-value approximation is no longer validated
const MAX_ACCURATE_N: usize = 5000;

// Polynomial coefficients, lowest order first
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Shapiro-Wilk test of the null hypothesis that `sample` is normal
///
/// Returns W as the statistic. A p-value above the significance level means
/// normality cannot be rejected.
///
/// # Errors
/// Fewer than 3 values, non-finite values, or all values identical.
///
/// # Example
/// ```
/// use abtest::hypothesis::shapiro_wilk;
///
/// let weights = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
/// let result = shapiro_wilk(&weights).unwrap();
/// assert!((result.statistic - 0.7888).abs() < 1e-3);
/// assert!(result.pvalue < 0.05); // heavy right tail
/// ```
pub fn shapiro_wilk(sample: &[f64]) -> Result<TestResult> {
    validate_sample(sample, 3, "Shapiro-Wilk")?;

    let n = sample.len();
    if n > MAX_ACCURATE_N {
        tracing::warn!(
            "Shapiro-Wilk p-value may be inaccurate for n={} (> {})",
            n,
            MAX_ACCURATE_N
        );
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    if x[n - 1] - x[0] <= 0.0 {
        anyhow::bail!("Shapiro-Wilk is undefined when all {} values are identical", n);
    }

    let a = coefficients(n);

    let m = mean(&x);
    let ssq: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();

    let w = (numerator * numerator / ssq).min(1.0);
    let pvalue = pvalue(w, n);

    tracing::debug!("Shapiro-Wilk n={} W={:.6} p={:.6}", n, w, pvalue);
    Ok(TestResult::new(w, pvalue))
}

/// Evaluate c[0] + c[1]·x + c[2]·x² + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, ci| acc * x + ci)
}

/// Antisymmetric weights a_1..a_{n/2} for the ordered sample
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let normal = Normal::standard();
    let an25 = n as f64 + 0.25;
    // Expected normal order statistics (lower half, negative values)
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|mi| mi * mi).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let first_scaled = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };

    let (start, fac) = first_scaled;
    for i in start..half {
        a[i] = -m[i] / fac;
    }

    a
}

fn pvalue(w: f64, n: usize) -> f64 {
    if n == 3 {
        const SIX_OVER_PI: f64 = 6.0 / std::f64::consts::PI;
        const PI_OVER_THREE: f64 = std::f64::consts::FRAC_PI_3;
        let p = SIX_OVER_PI * (w.sqrt().asin() - PI_OVER_THREE);
        return p.clamp(0.0, 1.0);
    }

    if w >= 1.0 {
        return 1.0;
    }

    let an = n as f64;
    let mut y = (1.0 - w).ln();

    let (mu, sigma) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            // Beyond the approximation's support: W is extremely small
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    Normal::standard().sf((y - mu) / sigma)
}
