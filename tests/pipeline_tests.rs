//! End-to-end tests of the analysis pipeline through the library API

mod utils;

use abtest::config::AnalysisConfig;
use abtest::dataset::{Group, Metric};
use abtest::hypothesis::{run_test, TestKind, Verdict};
use abtest::loader::load_experiment;
use abtest::pipeline;
use utils::{normal_scores, Fixture};

fn config_for(fixture: &Fixture) -> AnalysisConfig {
    AnalysisConfig {
        input: fixture.input(),
        chart_path: fixture.chart_path(),
        ..AnalysisConfig::default()
    }
}

/// Scenario: both groups from N(500, 50)
/// Expected: no test finds a difference, report says so
#[test]
fn test_same_distribution_end_to_end() {
    let fixture = Fixture::same_distribution();
    let config = config_for(&fixture);

    let dataset = load_experiment(&config).unwrap();
    let control = dataset.sample(Group::Control, Metric::Purchase).unwrap();
    let test = dataset.sample(Group::Test, Metric::Purchase).unwrap();
    for kind in [TestKind::StudentT, TestKind::WelchT, TestKind::MannWhitneyU] {
        let result = run_test(kind, &control, &test).unwrap();
        assert!(result.pvalue > 0.05, "{kind}: p={}", result.pvalue);
    }

    let report = pipeline::run(&config, true).unwrap();
    assert_eq!(report.assessment.verdict, Verdict::NoSignificantDifference);
    assert!(report
        .to_text()
        .contains("no statistically significant difference"));
    assert!(fixture.chart_path().exists());
}

/// Scenario: test group shifted by +10 sd
/// Expected: the selected test rejects H0
#[test]
fn test_shifted_group_end_to_end() {
    let fixture = Fixture::shifted();
    let report = pipeline::run(&config_for(&fixture), false).unwrap();

    assert!(report.assessment.result.pvalue <= 0.05);
    assert_eq!(
        report.assessment.verdict,
        Verdict::SignificantDifference {
            higher: Some(Group::Test)
        }
    );
    assert!(report.assessment.recommendation().contains("new method"));
}

#[test]
fn test_pipeline_is_idempotent() {
    let fixture = Fixture::shifted();
    let config = config_for(&fixture);

    let first = pipeline::run(&config, false).unwrap();
    let second = pipeline::run(&config, false).unwrap();

    assert_eq!(first.assessment, second.assessment);
    assert_eq!(first.to_text(), second.to_text());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_skewed_group_routes_to_rank_test() {
    let control = normal_scores(40, 500.0, 50.0, 0.375);
    let test: Vec<f64> = normal_scores(40, 0.0, 1.0, 0.5)
        .iter()
        .map(|z| 100.0 * (1.5 * z).exp())
        .collect();
    let fixture = Fixture::new(&control, &test);

    let report = pipeline::run(&config_for(&fixture), false).unwrap();
    assert_eq!(report.assessment.test, TestKind::MannWhitneyU);
    assert!(report.assessment.verdict.is_significant());
}

#[test]
fn test_missing_outcome_value_is_fatal() {
    let fixture = Fixture::same_distribution();
    std::fs::write(
        fixture.input().join("Test Group.csv"),
        "Impression,Click,Purchase,Earning\n100,10,5,20\n110,11,,22\n120,12,7,24\n",
    )
    .unwrap();

    let err = pipeline::run(&config_for(&fixture), false).unwrap_err();
    assert!(format!("{:#}", err).contains("missing value"));
}
