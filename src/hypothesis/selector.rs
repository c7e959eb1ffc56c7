// Assumption checks and hypothesis test selection
//
// Routing:
//   both groups normal, equal variances  -> Student's t
//   both groups normal, unequal variances -> Welch's t
//   either group non-normal               -> Mann-Whitney U
//
// "Holds" always means p > alpha for the assumption test.

use crate::hypothesis::normality::shapiro_wilk;
use crate::hypothesis::rank::mann_whitney_u;
use crate::hypothesis::statistics::TestResult;
use crate::hypothesis::ttest::{student_t, welch_t};
use crate::hypothesis::variance::levene;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

/// Hypothesis test chosen for the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Two-sample t-test with pooled variance
    StudentT,
    /// Two-sample t-test with unequal variances
    WelchT,
    /// Rank-sum test for non-normal data
    MannWhitneyU,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::StudentT => "Student's t-test",
            TestKind::WelchT => "Welch's t-test",
            TestKind::MannWhitneyU => "Mann-Whitney U test",
        }
    }

    /// Symbol used when printing the statistic
    pub fn statistic_label(&self) -> &'static str {
        match self {
            TestKind::StudentT | TestKind::WelchT => "t",
            TestKind::MannWhitneyU => "U",
        }
    }

    pub fn is_parametric(&self) -> bool {
        !matches!(self, TestKind::MannWhitneyU)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Outcome of the normality and variance checks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssumptionReport {
    /// Shapiro-Wilk on the control sample
    pub control_normality: TestResult,

    /// Shapiro-Wilk on the test sample
    pub test_normality: TestResult,

    /// Levene across both samples
    pub variance: TestResult,

    /// Significance level the p-values are compared against
    pub significance_level: f64,
}

impl AssumptionReport {
    /// Normality cannot be rejected for either group
    pub fn normality_holds(&self) -> bool {
        self.control_normality.supports_null(self.significance_level)
            && self.test_normality.supports_null(self.significance_level)
    }

    /// Equal variances cannot be rejected
    pub fn variances_equal(&self) -> bool {
        self.variance.supports_null(self.significance_level)
    }
}

/// Run Shapiro-Wilk on each group and Levene across them
pub fn check_assumptions(control: &[f64], test: &[f64], alpha: f64) -> Result<AssumptionReport> {
    let control_normality =
        shapiro_wilk(control).context("Normality check failed for the control group")?;
    let test_normality = shapiro_wilk(test).context("Normality check failed for the test group")?;
    let variance = levene(&[control, test]).context("Variance homogeneity check failed")?;

    Ok(AssumptionReport {
        control_normality,
        test_normality,
        variance,
        significance_level: alpha,
    })
}

/// Pick the test from the assumption outcomes
pub fn select_test(assumptions: &AssumptionReport) -> TestKind {
    if !assumptions.normality_holds() {
        TestKind::MannWhitneyU
    } else if assumptions.variances_equal() {
        TestKind::StudentT
    } else {
        TestKind::WelchT
    }
}

/// Run the selected test on (control, test)
pub fn run_test(kind: TestKind, control: &[f64], test: &[f64]) -> Result<TestResult> {
    let result = match kind {
        TestKind::StudentT => student_t(control, test),
        TestKind::WelchT => welch_t(control, test),
        TestKind::MannWhitneyU => mann_whitney_u(control, test),
    };
    result.with_context(|| format!("{} failed", kind))
}
