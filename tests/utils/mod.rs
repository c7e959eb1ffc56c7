// Integration test utilities
//
// Writes experiment fixtures as a directory of per-sheet CSV files, the
// same layout the loader accepts in place of a workbook.

#![allow(dead_code)]

use statrs::distribution::{ContinuousCDF, Normal};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CONTROL_SHEET: &str = "Control Group";
pub const TEST_SHEET: &str = "Test Group";

/// Deterministic normal sample: quantiles of N(mean, sd) at evenly spaced
/// plotting positions
pub fn normal_scores(n: usize, mean: f64, sd: f64, offset: f64) -> Vec<f64> {
    let normal = Normal::standard();
    (1..=n)
        .map(|i| {
            let p = (i as f64 - offset) / (n as f64 + 1.0 - 2.0 * offset);
            mean + sd * normal.inverse_cdf(p)
        })
        .collect()
}

/// Write one sheet; the purchase values drive the other columns
pub fn write_sheet(dir: &Path, sheet: &str, purchases: &[f64]) {
    let mut body = String::from("Impression,Click,Purchase,Earning\n");
    for (i, purchase) in purchases.iter().enumerate() {
        let impression = 100_000.0 + 250.0 * i as f64;
        let click = 5_000.0 + 10.0 * i as f64;
        let earning = purchase * 3.5;
        body.push_str(&format!(
            "{},{},{},{}\n",
            impression, click, purchase, earning
        ));
    }
    fs::write(dir.join(format!("{}.csv", sheet)), body).unwrap();
}

/// Experiment directory with both sheets under a fresh temp dir
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(control: &[f64], test: &[f64]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let fixture = Self { dir };
        write_sheet(&fixture.input(), CONTROL_SHEET, control);
        write_sheet(&fixture.input(), TEST_SHEET, test);
        fixture
    }

    /// 40 vs 40 drawn from the same N(500, 50)
    pub fn same_distribution() -> Self {
        Self::new(
            &normal_scores(40, 500.0, 50.0, 0.375),
            &normal_scores(40, 500.0, 50.0, 0.5),
        )
    }

    /// Test group shifted by +10 standard deviations
    pub fn shifted() -> Self {
        Self::new(
            &normal_scores(40, 500.0, 50.0, 0.375),
            &normal_scores(40, 1000.0, 50.0, 0.5),
        )
    }

    /// Directory passed as INPUT
    pub fn input(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn chart_path(&self) -> PathBuf {
        self.dir.path().join("plots").join("average_purchase.svg")
    }
}
