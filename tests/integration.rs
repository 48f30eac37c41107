//! Integration tests for the BEST library.
//!
//! These tests run complete analyses: sampling, posterior queries, plotting
//! and persistence.

use best::prelude::*;
use tempfile::TempDir;

const DRUG: &[f64] = &[
    101.0, 100.0, 102.0, 104.0, 102.0, 97.0, 105.0, 105.0, 98.0, 101.0, 100.0, 123.0, 105.0,
    103.0, 100.0, 95.0, 102.0, 106.0, 109.0, 102.0, 82.0, 102.0, 100.0, 102.0, 102.0, 101.0,
    102.0, 102.0, 103.0, 103.0, 97.0, 97.0, 103.0, 101.0, 97.0, 104.0, 96.0, 103.0, 124.0,
    101.0, 101.0, 100.0, 101.0, 101.0, 104.0, 100.0, 101.0,
];

const PLACEBO: &[f64] = &[
    99.0, 101.0, 100.0, 101.0, 102.0, 100.0, 97.0, 101.0, 104.0, 101.0, 102.0, 102.0, 100.0,
    105.0, 88.0, 101.0, 100.0, 104.0, 100.0, 100.0, 100.0, 101.0, 102.0, 103.0, 97.0, 101.0,
    101.0, 100.0, 101.0, 99.0, 101.0, 100.0, 100.0, 101.0, 100.0, 99.0, 101.0, 100.0, 102.0,
    99.0, 100.0, 99.0,
];

const MORNING: &[f64] = &[
    8.99, 9.21, 9.03, 9.15, 8.68, 8.82, 8.66, 8.82, 8.59, 8.14, 9.09, 8.80, 8.18, 9.23, 8.55,
    9.03, 9.36, 9.06, 9.57, 8.38,
];

const EVENING: &[f64] = &[
    9.82, 9.34, 9.73, 9.93, 9.33, 9.41, 9.48, 9.14, 8.62, 8.60, 9.60, 9.41, 8.43, 9.77, 8.96,
    9.81, 9.75, 9.50, 9.90, 9.13,
];

fn config() -> SamplerConfig {
    SamplerConfig::default()
        .with_n_samples(1000)
        .with_tune(500)
        .with_chains(2)
        .with_seed(42)
}

fn evening_minus_morning() -> Vec<f64> {
    EVENING.iter().zip(MORNING).map(|(e, m)| e - m).collect()
}

#[test]
fn test_two_group_workflow() {
    let results = analyze_two(DRUG, PLACEBO, &config()).expect("Analysis should succeed");

    assert_eq!(results.trace().n_chains(), 2);
    assert_eq!(results.trace().n_draws(), 1000);

    // The drug group has the higher mean
    let p = results
        .posterior_prob("Difference of means", Some(0.0), None)
        .expect("traced");
    assert!(p > 0.9, "P(diff > 0) should be high: {p}");

    let (low, high) = results.hdi("Difference of means", 0.95).expect("traced");
    assert!(low < high);
    assert!(low > -2.0 && high < 4.0, "HDI ({low}, {high}) is implausible");

    // Outliers in both groups call for heavy tails
    let nu = results.posterior_mode("Normality").expect("traced");
    assert!((2.5..10.0).contains(&nu), "nu mode {nu}");

    let summary = results.summary(0.95).expect("summary");
    let row = summary.get("Group 1 mean").expect("row");
    assert!((row.mean - 101.5).abs() < 1.0, "Group 1 mean {}", row.mean);
}

#[test]
fn test_one_group_workflow() {
    let diff = evening_minus_morning();
    let results = analyze_one(&diff, 0.0, &config()).expect("Analysis should succeed");

    let p = results.posterior_prob("Mean", Some(0.0), None).expect("traced");
    assert!(p > 0.99, "P(Mean > 0) should be near 1: {p}");

    let (low, high) = results.hdi("Mean", 0.95).expect("traced");
    assert!(low > 0.2 && high < 0.8, "HDI ({low}, {high})");

    let effect = results.posterior_mode("Effect size").expect("traced");
    assert!(effect > 1.0, "effect size mode {effect}");
}

#[test]
fn test_same_seed_same_trace() {
    let config = config().with_n_samples(200).with_tune(200);
    let a = analyze_one(&evening_minus_morning(), 0.0, &config).expect("first run");
    let b = analyze_one(&evening_minus_morning(), 0.0, &config).expect("second run");
    assert_eq!(a.trace(), b.trace());
}

#[test]
fn test_plot_all_two_to_svg() {
    let results = analyze_two(DRUG, PLACEBO, &config().with_n_samples(300)).expect("analysis");
    let fig = plot_all_with(
        &results,
        &PlotAllOptions::default().with_group_names("Drug", "Placebo"),
    )
    .expect("plot");
    assert_eq!(fig.shape(), (5, 2));

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("plot_all_two.svg");
    fig.savefig(&path).expect("save");
    let svg = std::fs::read_to_string(&path).expect("written");
    assert!(svg.contains("Drug"));
    assert!(svg.contains("Difference of means"));
}

#[test]
fn test_plot_all_one_to_svg() {
    let results =
        analyze_one(&evening_minus_morning(), 0.0, &config().with_n_samples(300)).expect("analysis");
    let fig = plot_all(&results).expect("plot");
    assert_eq!(fig.shape(), (3, 2));

    let dir = TempDir::new().expect("temp dir");
    fig.savefig(dir.path().join("plot_all_one.svg")).expect("save");
    assert!(fig.savefig(dir.path().join("plot_all_one.pdf")).is_err());
}

#[test]
fn test_results_cache_roundtrip() {
    let results = analyze_two(DRUG, PLACEBO, &config().with_n_samples(200)).expect("analysis");

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("results_two.json");
    results.save_json(&path).expect("save");

    let loaded = BestResultsTwo::load_json(&path).expect("load");
    assert_eq!(loaded.model(), results.model());
    assert_eq!(loaded.trace().len(), results.trace().len());
    let p0 = results.posterior_prob("Effect size", Some(0.0), None).expect("traced");
    let p1 = loaded.posterior_prob("Effect size", Some(0.0), None).expect("traced");
    assert!((p0 - p1).abs() < 1e-9);
}

#[test]
fn test_invalid_input_is_rejected() {
    assert!(analyze_two(&[], PLACEBO, &config()).is_err());
    assert!(analyze_one(&[1.0, f64::INFINITY], 0.0, &config()).is_err());
    assert!(analyze_one(&[2.0, 2.0, 2.0], 0.0, &config()).is_err());
}
