// Hypothesis verdict for the control vs. test comparison
//
// Ties the pieces together: assumption checks, test selection, the selected
// test, and a plain-language conclusion with a recommendation.

use crate::dataset::{Group, Metric};
use crate::hypothesis::selector::{check_assumptions, run_test, select_test, AssumptionReport, TestKind};
use crate::hypothesis::statistics::{mean, TestResult};
use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::{self, Write};

/// Final conclusion about the two groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// p > alpha: H0 is not rejected
    NoSignificantDifference,

    /// p <= alpha: H0 is rejected
    SignificantDifference {
        /// Group favoured by the selected test: higher mean for the t-tests,
        /// stochastically larger for Mann-Whitney U. `None` when the test
        /// gives no direction.
        #[serde(skip_serializing_if = "Option::is_none")]
        higher: Option<Group>,
    },
}

impl Verdict {
    pub fn is_significant(&self) -> bool {
        matches!(self, Verdict::SignificantDifference { .. })
    }

    /// Group favoured by a significant result
    pub fn higher_group(&self) -> Option<Group> {
        match self {
            Verdict::SignificantDifference { higher } => *higher,
            Verdict::NoSignificantDifference => None,
        }
    }

    /// One-sentence business recommendation
    ///
    /// The t-tests compare means, so their wording talks about averages.
    /// Mann-Whitney U compares whole distributions and is worded that way.
    pub fn recommendation(&self, metric: Metric, test: TestKind) -> String {
        let subject = if test.is_parametric() {
            format!("average {}", metric)
        } else {
            format!("{} distribution", metric)
        };

        match self {
            Verdict::NoSignificantDifference => format!(
                "Keep the current method (control group): the {} does not differ \
                 significantly. Consider testing further with more data before switching.",
                subject
            ),
            Verdict::SignificantDifference { higher: None } => format!(
                "Keep the current method (control group): the {} differs significantly, \
                 but neither group is consistently higher. Inspect the data before switching.",
                subject
            ),
            Verdict::SignificantDifference {
                higher: Some(Group::Test),
            } => format!(
                "Consider the new method (test group): its {} is significantly higher.",
                subject
            ),
            Verdict::SignificantDifference {
                higher: Some(Group::Control),
            } => format!(
                "Keep the current method (control group): its {} is significantly higher.",
                subject
            ),
        }
    }
}

/// Direction of a significant difference, read from the selected test
///
/// For Mann-Whitney U the statistic is U for the control group: above
/// n1*n2/2 the control values tend to be larger, below it the test values do.
fn favoured_group(
    kind: TestKind,
    result: &TestResult,
    control: &[f64],
    test: &[f64],
) -> Option<Group> {
    let (control_score, test_score) = match kind {
        TestKind::StudentT | TestKind::WelchT => (mean(control), mean(test)),
        TestKind::MannWhitneyU => {
            let midpoint = control.len() as f64 * test.len() as f64 / 2.0;
            (result.statistic, midpoint)
        }
    };

    match control_score.partial_cmp(&test_score) {
        Some(Ordering::Greater) => Some(Group::Control),
        Some(Ordering::Less) => Some(Group::Test),
        _ => None,
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NoSignificantDifference => {
                f.write_str("no statistically significant difference")
            }
            Verdict::SignificantDifference { .. } => {
                f.write_str("statistically significant difference")
            }
        }
    }
}

/// Everything decided about one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisAssessment {
    /// Outcome column under test
    pub metric: Metric,

    /// Significance level used for every decision
    pub significance_level: f64,

    pub control_mean: f64,
    pub test_mean: f64,

    /// Normality and variance checks
    pub assumptions: AssumptionReport,

    /// Test picked from the assumptions
    pub test: TestKind,

    /// Statistic and p-value of the selected test
    pub result: TestResult,

    pub verdict: Verdict,
}

impl HypothesisAssessment {
    /// Null hypothesis in words
    pub fn null_hypothesis(&self) -> String {
        format!(
            "H0: The average {} of the control group is equal to that of the test group.",
            self.metric
        )
    }

    /// Alternative hypothesis in words
    pub fn alternative_hypothesis(&self) -> String {
        format!(
            "H1: The average {} of the control group is different from that of the test group.",
            self.metric
        )
    }

    /// Why the selected test was chosen
    pub fn selection_reason(&self) -> &'static str {
        match self.test {
            TestKind::StudentT => "both groups look normal and variances are equal",
            TestKind::WelchT => "both groups look normal but variances differ",
            TestKind::MannWhitneyU => "normality is rejected for at least one group",
        }
    }

    pub fn recommendation(&self) -> String {
        self.verdict.recommendation(self.metric, self.test)
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let alpha = self.significance_level;
        let a = &self.assumptions;
        let mut report = String::new();

        report.push_str("########## Hypotheses ##########\n");
        let _ = writeln!(report, "{}", self.null_hypothesis());
        let _ = writeln!(report, "{}", self.alternative_hypothesis());

        let _ = writeln!(report, "########## Average {} ##########", self.metric);
        let _ = writeln!(report, "{:<12} {:.5}", Group::Control, self.control_mean);
        let _ = writeln!(report, "{:<12} {:.5}", Group::Test, self.test_mean);

        report.push_str("########## Assumption Checks ##########\n");
        let normality = |result: &TestResult| {
            if result.supports_null(alpha) {
                "normality holds"
            } else {
                "normality rejected"
            }
        };
        let _ = writeln!(
            report,
            "Shapiro Control: Stat={:.4}, p-value={:.4} -> {}",
            a.control_normality.statistic,
            a.control_normality.pvalue,
            normality(&a.control_normality)
        );
        let _ = writeln!(
            report,
            "Shapiro Test: Stat={:.4}, p-value={:.4} -> {}",
            a.test_normality.statistic,
            a.test_normality.pvalue,
            normality(&a.test_normality)
        );
        let _ = writeln!(
            report,
            "Levene: Stat={:.4}, p-value={:.4} -> {}",
            a.variance.statistic,
            a.variance.pvalue,
            if a.variances_equal() {
                "variances equal"
            } else {
                "variances differ"
            }
        );

        report.push_str("########## Hypothesis Test ##########\n");
        let _ = writeln!(
            report,
            "Selected: {} ({})",
            self.test,
            self.selection_reason()
        );
        let _ = writeln!(
            report,
            "{}: Stat={:.4}, p-value={:.4}",
            self.test, self.result.statistic, self.result.pvalue
        );
        let comparison = if self.verdict.is_significant() {
            "<="
        } else {
            ">"
        };
        let _ = writeln!(
            report,
            "Result: {} between groups (p {} {})",
            self.verdict, comparison, alpha
        );

        report.push_str("########## Conclusion ##########\n");
        let _ = writeln!(report, "{}", self.recommendation());

        report
    }
}

/// Check assumptions, select and run the test, and decide
///
/// # Example
/// ```
/// use abtest::dataset::Metric;
/// use abtest::hypothesis::{assess, TestKind};
///
/// let control = [10.0, 12.0, 11.0, 13.0, 9.0, 12.5, 10.5, 11.5];
/// let test = [10.5, 11.0, 12.0, 12.5, 9.5, 11.5, 10.0, 13.0];
/// let assessment = assess(&control, &test, Metric::Purchase, 0.05).unwrap();
/// assert_eq!(assessment.test, TestKind::StudentT);
/// assert!(!assessment.verdict.is_significant());
/// ```
pub fn assess(
    control: &[f64],
    test: &[f64],
    metric: Metric,
    significance_level: f64,
) -> Result<HypothesisAssessment> {
    let assumptions = check_assumptions(control, test, significance_level)?;
    let kind = select_test(&assumptions);
    tracing::info!("Selected {} for {}", kind, metric);

    let result = run_test(kind, control, test)?;

    let control_mean = mean(control);
    let test_mean = mean(test);
    let verdict = if result.is_significant(significance_level) {
        let higher = favoured_group(kind, &result, control, test);
        Verdict::SignificantDifference { higher }
    } else {
        Verdict::NoSignificantDifference
    };

    Ok(HypothesisAssessment {
        metric,
        significance_level,
        control_mean,
        test_mean,
        assumptions,
        test: kind,
        result,
        verdict,
    })
}
