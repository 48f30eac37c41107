//! Report assembly and formatting.

use crate::cli::OutputFormat;
use crate::error::Result;
use best::diagnostics::SampleReport;
use best::model::BestModel;
use best::results::{BestResults, BestResultsOne, BestResultsTwo, Summary};
use best::stats::{self, TTestResult};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

const TWO_GROUP_ESTIMATES: &[&str] = &[
    "Group 1 mean",
    "Group 2 mean",
    "Difference of means",
    "Group 1 SD",
    "Group 2 SD",
    "Difference of SDs",
    "Effect size",
    "Normality",
];

const ONE_GROUP_ESTIMATES: &[&str] = &["Mean", "SD", "Effect size", "Normality"];

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[PASS]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Descriptive statistics of one observed group.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GroupStats {
    pub label: String,
    pub name: String,
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
}

impl GroupStats {
    fn new(label: &str, name: &str, values: &[f64]) -> Self {
        let sd = if values.len() > 1 {
            stats::variance(values, 1).sqrt()
        } else {
            f64::NAN
        };
        Self {
            label: label.to_string(),
            name: name.to_string(),
            n: values.len(),
            mean: stats::mean(values),
            sd,
        }
    }
}

/// Posterior mode and HDI of one variable.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Estimate {
    pub variable: String,
    pub mode: f64,
    pub hdi_low: f64,
    pub hdi_high: f64,
}

/// Posterior probability of an event.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Probability {
    pub event: String,
    pub value: f64,
}

/// Everything the CLI reports about one analysis.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Report {
    pub analysis: &'static str,
    pub credible_mass: f64,
    pub groups: Vec<GroupStats>,
    pub estimates: Vec<Estimate>,
    pub probabilities: Vec<Probability>,
    pub t_test: Option<TTestResult>,
    pub diagnostics: SampleReport,
    pub summary: Summary,
}

impl Report {
    /// Report of a two-group analysis.
    pub(crate) fn two(results: &BestResultsTwo, names: &[String; 2], credible_mass: f64) -> Result<Self> {
        let y1 = results.observed_data(1)?;
        let y2 = results.observed_data(2)?;
        let probabilities = vec![
            Probability {
                event: format!("{} mean > {} mean", names[0], names[1]),
                value: results.posterior_prob("Difference of means", Some(0.0), None)?,
            },
            Probability {
                event: format!("{} SD > {} SD", names[0], names[1]),
                value: results.posterior_prob("Difference of SDs", Some(0.0), None)?,
            },
            Probability {
                event: "Effect size > 0".to_string(),
                value: results.posterior_prob("Effect size", Some(0.0), None)?,
            },
        ];
        Ok(Self {
            analysis: "two-group",
            credible_mass,
            groups: vec![
                GroupStats::new("Group 1", &names[0], y1),
                GroupStats::new("Group 2", &names[1], y2),
            ],
            estimates: estimates(results, TWO_GROUP_ESTIMATES, credible_mass)?,
            probabilities,
            t_test: stats::ttest_ind(y1, y2).ok(),
            diagnostics: results.report().clone(),
            summary: results.summary(credible_mass)?,
        })
    }

    /// Report of a single-group analysis.
    pub(crate) fn one(results: &BestResultsOne, name: &str, credible_mass: f64) -> Result<Self> {
        let y = results.observed_data(1)?;
        let ref_val = results.model().ref_val();
        let probabilities = vec![
            Probability {
                event: format!("Mean > {ref_val}"),
                value: results.posterior_prob("Mean", Some(ref_val), None)?,
            },
            Probability {
                event: "Effect size > 0".to_string(),
                value: results.posterior_prob("Effect size", Some(0.0), None)?,
            },
        ];
        Ok(Self {
            analysis: "one-group",
            credible_mass,
            groups: vec![GroupStats::new("Group", name, y)],
            estimates: estimates(results, ONE_GROUP_ESTIMATES, credible_mass)?,
            probabilities,
            t_test: stats::ttest_1samp(y, ref_val).ok(),
            diagnostics: results.report().clone(),
            summary: results.summary(credible_mass)?,
        })
    }

    /// Write the report to stdout in the given format.
    pub(crate) fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.print_table();
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?);
                Ok(())
            }
            OutputFormat::Csv => self.write_csv(std::io::stdout().lock()),
        }
    }

    fn print_table(&self) {
        section("Data");
        for group in &self.groups {
            kv(
                &format!("{} ({})", group.label, group.name),
                format!("n = {}, mean = {:.4}, sd = {:.4}", group.n, group.mean, group.sd),
            );
        }

        section(&format!(
            "Posterior estimates (mode, {:.0}% HDI)",
            self.credible_mass * 100.0
        ));
        let width = self
            .estimates
            .iter()
            .map(|e| e.variable.chars().count())
            .max()
            .unwrap_or(0);
        for e in &self.estimates {
            println!(
                "  {:<width$}  {:>10.4}  [{:.4}, {:.4}]",
                e.variable, e.mode, e.hdi_low, e.hdi_high
            );
        }

        section("Posterior probabilities");
        for p in &self.probabilities {
            kv(&format!("P({})", p.event), format!("{:.3}", p.value));
        }

        if let Some(t) = &self.t_test {
            section("Classical t-test");
            kv("t", format!("{:.4}", t.statistic));
            kv("df", format!("{:.2}", t.df));
            kv("p-value", format!("{:.4}", t.pvalue));
        }

        section("Diagnostics");
        if self.diagnostics.ok {
            success("chains converged");
        }
        for w in &self.diagnostics.warnings {
            warning(w);
        }
        kv("sampling rounds", self.diagnostics.rounds);
        if let Some(rhat) = self.diagnostics.max_rhat {
            kv("max R-hat", format!("{rhat:.4}"));
        }
        if let Some(ess) = self.diagnostics.min_ess {
            kv("min ESS", format!("{ess:.0}"));
        }

        section("Summary");
        print!("{}", self.summary);
    }

    fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for row in &self.summary.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn estimates<M: BestModel>(
    results: &BestResults<M>,
    variables: &[&str],
    credible_mass: f64,
) -> Result<Vec<Estimate>> {
    variables
        .iter()
        .map(|&variable| {
            let (hdi_low, hdi_high) = results.hdi(variable, credible_mass)?;
            Ok(Estimate {
                variable: variable.to_string(),
                mode: results.posterior_mode(variable)?,
                hdi_low,
                hdi_high,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use best::model::{BestModelOne, BestModelTwo};
    use best::trace::Trace;

    /// Quantiles of a triangular distribution peaking at `center`.
    fn triangular(n: usize, center: f64, half_width: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let u = (i as f64 + 0.5) / n as f64;
                let z = if u < 0.5 {
                    -1.0 + (2.0 * u).sqrt()
                } else {
                    1.0 - (2.0 * (1.0 - u)).sqrt()
                };
                center + half_width * z
            })
            .collect()
    }

    fn mock_two() -> BestResultsTwo {
        let model = BestModelTwo::new(&[1.0, 2.0, 3.0, 4.0], &[0.0, 1.0, 1.5, 2.0]).expect("valid");
        let n = 1000;
        let trace = Trace::from_samples(
            model
                .trace_names()
                .iter()
                .map(|name| {
                    let values = match *name {
                        "Difference of means" => triangular(n, 2.0, 1.0),
                        "Effect size" => triangular(n, 1.5, 1.0),
                        "Difference of SDs" => triangular(n, -1.0, 0.5),
                        _ => triangular(n, 1.0, 0.5),
                    };
                    (name.to_string(), values)
                }),
        )
        .expect("valid trace");
        BestResults::new(model, trace)
    }

    fn mock_one() -> BestResultsOne {
        let model = BestModelOne::new(&[0.5, 1.0, 1.5, 2.0], 0.0).expect("valid");
        let trace = Trace::from_samples(
            model
                .trace_names()
                .iter()
                .map(|name| (name.to_string(), triangular(1000, 1.0, 0.5))),
        )
        .expect("valid trace");
        BestResults::new(model, trace)
    }

    #[test]
    fn test_two_group_report() {
        let names = ["drug".to_string(), "placebo".to_string()];
        let report = Report::two(&mock_two(), &names, 0.95).expect("report");
        assert_eq!(report.analysis, "two-group");
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].n, 4);
        assert!((report.groups[0].mean - 2.5).abs() < 1e-12);
        assert_eq!(report.estimates.len(), TWO_GROUP_ESTIMATES.len());
        assert_eq!(report.probabilities[0].event, "drug mean > placebo mean");
        assert!((report.probabilities[0].value - 1.0).abs() < 1e-12);
        assert!((report.probabilities[1].value - 0.0).abs() < 1e-12);
        assert!(report.t_test.is_some());
    }

    #[test]
    fn test_one_group_report() {
        let report = Report::one(&mock_one(), "diff", 0.9).expect("report");
        assert_eq!(report.analysis, "one-group");
        assert_eq!(report.probabilities[0].event, "Mean > 0");
        assert_eq!(report.estimates.len(), ONE_GROUP_ESTIMATES.len());
        let mean = &report.estimates[0];
        assert!(mean.hdi_low < mean.mode && mean.mode < mean.hdi_high);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = Report::one(&mock_one(), "diff", 0.95).expect("report");
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["analysis"], "one-group");
        assert!(json["summary"]["rows"].is_array());
        assert!(json["diagnostics"]["ok"].is_boolean());
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let report = Report::one(&mock_one(), "diff", 0.95).expect("report");
        let mut buf = Vec::new();
        report.write_csv(&mut buf).expect("writes");
        let text = String::from_utf8(buf).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("variable,mean,sd,hdi_low,hdi_high,mcse_mean,ess,r_hat")
        );
        assert_eq!(lines.count(), report.summary.rows.len());
    }
}
