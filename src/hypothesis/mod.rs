// Statistical hypothesis testing for two-group experiments
//
// Decides whether the control and test groups differ on one outcome:
// 1. Assumption checks: Shapiro-Wilk normality per group, Levene
//    (median-centred) variance homogeneity across groups
// 2. Test selection from the assumption outcomes
// 3. Student's t, Welch's t or Mann-Whitney U on the two samples
// 4. Verdict at the configured significance level
//
// References:
// [1] Royston, P. (1995). Remark AS R94. Applied Statistics, 44(4).
// [2] Brown, M. B., & Forsythe, A. B. (1974). Robust tests for the equality
//     of variances. JASA, 69(346).
// [3] Welch, B. L. (1947). The generalization of "Student's" problem when
//     several different population variances are involved. Biometrika, 34.
// [4] Mann, H. B., & Whitney, D. R. (1947). On a test of whether one of two
//     random variables is stochastically larger than the other. AMS, 18(1).
//
// Distributions (Normal, Student's t, F) come from statrs.

mod normality;
mod rank;
mod selector;
mod statistics;
mod ttest;
mod variance;
mod verdict;

pub use normality::shapiro_wilk;
pub use rank::mann_whitney_u;
pub use selector::{check_assumptions, run_test, select_test, AssumptionReport, TestKind};
pub use statistics::{mean, median, sample_variance, TestResult};
pub use ttest::{student_t, welch_t};
pub use variance::levene;
pub use verdict::{assess, HypothesisAssessment, Verdict};
