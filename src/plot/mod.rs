//! Plots of BEST results.
//!
//! The layout follows Kruschke's figures: posterior histograms annotated with
//! their central value and HDI, and the observed data overlaid with
//! posterior predictive densities. Figures are rendered as SVG.
//!
//! # Example
//!
//! ```no_run
//! use best::analyze::analyze_two;
//! use best::plot::plot_all;
//! use best::sampler::SamplerConfig;
//!
//! let results = analyze_two(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], &SamplerConfig::default()).unwrap();
//! plot_all(&results).unwrap().savefig("best.svg").unwrap();
//! ```

mod svg;

pub use svg::{Anchor, Axes, Figure, LineSpec, LineStyle};

use crate::distributions::student_t_pdf;
use crate::error::{BestError, Result};
use crate::model::{format_significant, BestModel, ModelKind};
use crate::results::{BestResults, BestResultsOne, BestResultsTwo};
use crate::stats::hdi::validate_credible_mass;
use crate::stats::{hdi, kde_mode, linspace, mean};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Light blue used for posterior histograms and predictive curves.
pub const PRETTY_BLUE: &str = "#89d1ea";

/// Colour of observed-data histograms.
const DATA_COLOR: &str = "#d62728";

/// Number of posterior draws shown as predictive curves.
const N_PREDICTIVE_CURVES: usize = 50;

/// Points per predictive curve.
const CURVE_POINTS: usize = 200;

/// Central statistic annotated on a posterior plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CentralStat {
    /// Mode of the kernel density estimate
    #[default]
    Mode,
    /// Sample mean
    Mean,
}

impl CentralStat {
    fn name(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::Mean => "mean",
        }
    }
}

/// Options of [`plot_posterior`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorPlotOptions {
    /// Draw a reference line here and annotate the mass on either side
    pub ref_val: Option<f64>,
    /// Mass covered by the HDI bar
    pub credible_mass: f64,
    /// Central statistic to annotate
    pub stat: CentralStat,
    /// Number of histogram bins
    pub bins: usize,
    /// Panel title
    pub title: Option<String>,
    /// x-axis label
    pub label: Option<String>,
    /// Histogram colour
    pub color: String,
}

impl Default for PosteriorPlotOptions {
    fn default() -> Self {
        Self {
            ref_val: None,
            credible_mass: 0.95,
            stat: CentralStat::Mode,
            bins: 30,
            title: None,
            label: None,
            color: PRETTY_BLUE.to_string(),
        }
    }
}

impl PosteriorPlotOptions {
    /// Set the reference value
    #[must_use]
    pub fn with_ref_val(mut self, ref_val: f64) -> Self {
        self.ref_val = Some(ref_val);
        self
    }

    /// Set the credible mass of the HDI
    #[must_use]
    pub fn with_credible_mass(mut self, credible_mass: f64) -> Self {
        self.credible_mass = credible_mass;
        self
    }

    /// Set the central statistic
    #[must_use]
    pub fn with_stat(mut self, stat: CentralStat) -> Self {
        self.stat = stat;
        self
    }

    /// Set the number of bins
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the panel title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the x-axis label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the histogram colour
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Options shared by the whole-figure plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotAllOptions {
    /// Mass covered by every HDI bar
    pub credible_mass: f64,
    /// Number of histogram bins
    pub bins: usize,
    /// Display names of the groups (two-group figures)
    pub group_names: [String; 2],
}

impl Default for PlotAllOptions {
    fn default() -> Self {
        Self {
            credible_mass: 0.95,
            bins: 30,
            group_names: ["Group 1".to_string(), "Group 2".to_string()],
        }
    }
}

impl PlotAllOptions {
    /// Set the credible mass
    #[must_use]
    pub fn with_credible_mass(mut self, credible_mass: f64) -> Self {
        self.credible_mass = credible_mass;
        self
    }

    /// Set the number of bins
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the group names
    #[must_use]
    pub fn with_group_names(mut self, group1: impl Into<String>, group2: impl Into<String>) -> Self {
        self.group_names = [group1.into(), group2.into()];
        self
    }

    fn posterior(&self) -> PosteriorPlotOptions {
        PosteriorPlotOptions::default()
            .with_credible_mass(self.credible_mass)
            .with_bins(self.bins)
    }
}

/// Plot a histogram of posterior samples.
///
/// The panel shows the central statistic on top, the HDI as a thick bar on
/// the x axis with its endpoints, and, with a reference value, a dotted line
/// annotated with the share of samples below and above it.
///
/// # Errors
///
/// Empty samples, zero bins, or an invalid credible mass.
pub fn plot_posterior(
    ax: &mut Axes,
    samples: &[f64],
    options: &PosteriorPlotOptions,
) -> Result<()> {
    validate_credible_mass(options.credible_mass)?;
    if samples.is_empty() {
        return Err(BestError::empty_input("posterior samples to plot"));
    }

    ax.hist(samples, options.bins, false, 0.8, &options.color)?;

    let stat = match options.stat {
        CentralStat::Mode => kde_mode(samples)?,
        CentralStat::Mean => mean(samples),
    };
    ax.text(
        stat,
        0.95,
        format!("{} = {}", options.stat.name(), sig3(stat)),
        Anchor::Middle,
        13.0,
    );

    if let Some(ref_val) = options.ref_val {
        ax.axvline(
            ref_val,
            LineSpec::new("black", 1.2).with_style(LineStyle::Dotted),
        );
        let below = samples.iter().filter(|&&x| x < ref_val).count() as f64 / samples.len() as f64;
        ax.text(
            ref_val,
            0.78,
            format!(
                "{:.1}% < {} < {:.1}%",
                below * 100.0,
                sig3(ref_val),
                (1.0 - below) * 100.0
            ),
            Anchor::Middle,
            12.0,
        );
    }

    let (low, high) = hdi(samples, options.credible_mass)?;
    ax.hline(0.0, low, high, LineSpec::new("black", 5.0));
    ax.text(
        (low + high) / 2.0,
        0.2,
        format!(
            "{}% HDI",
            format_significant(options.credible_mass * 100.0, 4)
        ),
        Anchor::Middle,
        12.0,
    );
    ax.text(low, 0.09, sig3(low), Anchor::Middle, 11.0);
    ax.text(high, 0.09, sig3(high), Anchor::Middle, 11.0);

    if let Some(title) = &options.title {
        ax.set_title(title.clone());
    }
    if let Some(label) = &options.label {
        ax.set_xlabel(label.clone());
    }
    ax.hide_yaxis();
    Ok(())
}

/// Plot the observed data of a group with posterior predictive densities.
///
/// The data is drawn as a density histogram; on top of it, the Student-t
/// densities of 50 randomly chosen posterior samples. The choice of samples
/// is fixed, so the same results always give the same figure.
///
/// # Errors
///
/// Invalid group ID, zero bins, or a trace that lacks the group's parameters.
pub fn plot_data_and_prediction<M: BestModel>(
    ax: &mut Axes,
    results: &BestResults<M>,
    group_id: usize,
    title: Option<&str>,
    bins: usize,
) -> Result<()> {
    let data = results.observed_data(group_id)?;
    let (mean_name, sigma_name) = match results.model().kind() {
        ModelKind::TwoGroup => (
            format!("Group {group_id} mean"),
            format!("Group {group_id} sigma"),
        ),
        ModelKind::OneGroup { .. } => ("Mean".to_string(), "Sigma".to_string()),
    };
    let trace = results.trace();
    let means = trace.get(&mean_name)?;
    let sigmas = trace.get(&sigma_name)?;
    let nus = trace.get("Normality")?;

    ax.hist(data, bins, true, 0.5, DATA_COLOR)?;

    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let span = if hi > lo {
        hi - lo
    } else {
        results.model().priors().data_scale()
    };
    let xs = linspace(lo - 0.1 * span, hi + 0.1 * span, CURVE_POINTS);

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let n_curves = N_PREDICTIVE_CURVES.min(means.len());
    for idx in rand::seq::index::sample(&mut rng, means.len(), n_curves) {
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| student_t_pdf(x, nus[idx], means[idx], sigmas[idx]))
            .collect();
        ax.plot(&xs, &ys, LineSpec::new(PRETTY_BLUE, 1.0).with_opacity(0.5));
    }

    ax.text(
        hi + 0.1 * span,
        0.9,
        format!("N = {}", data.len()),
        Anchor::End,
        12.0,
    );
    ax.set_title(title.map_or_else(
        || "Data w. Post. Pred.".to_string(),
        str::to_string,
    ));
    ax.set_xlabel("y");
    Ok(())
}

/// Plot every result of an analysis with default options.
///
/// # Errors
///
/// See [`plot_all_with`].
pub fn plot_all<M: BestModel>(results: &BestResults<M>) -> Result<Figure> {
    plot_all_with(results, &PlotAllOptions::default())
}

/// Plot every result of an analysis, choosing the layout from the model kind.
///
/// # Errors
///
/// Invalid options or a trace that lacks one of the plotted variables.
pub fn plot_all_with<M: BestModel>(
    results: &BestResults<M>,
    options: &PlotAllOptions,
) -> Result<Figure> {
    match results.model().kind() {
        ModelKind::TwoGroup => two_group_figure(results, options),
        ModelKind::OneGroup { ref_val } => one_group_figure(results, ref_val, options),
    }
}

/// Plot the results of a two-group analysis.
///
/// Five rows of two panels: group means, group standard deviations, data
/// with posterior predictions, differences of means and of standard
/// deviations, normality and effect size.
///
/// # Errors
///
/// See [`plot_all_with`].
pub fn plot_all_two(results: &BestResultsTwo) -> Result<Figure> {
    two_group_figure(results, &PlotAllOptions::default())
}

/// Plot the results of a one-group analysis.
///
/// # Errors
///
/// See [`plot_all_with`].
pub fn plot_all_one(results: &BestResultsOne) -> Result<Figure> {
    one_group_figure(results, results.model().ref_val(), &PlotAllOptions::default())
}

fn two_group_figure<M: BestModel>(
    results: &BestResults<M>,
    options: &PlotAllOptions,
) -> Result<Figure> {
    let trace = results.trace();
    let base = options.posterior();
    let [name1, name2] = &options.group_names;
    let mut fig = Figure::new(5, 2);

    let pairs = [
        (
            ["Group 1 mean", "Group 2 mean"],
            ["μ₁", "μ₂"],
            "mean",
            CentralStat::Mean,
        ),
        (
            ["Group 1 SD", "Group 2 SD"],
            ["σ₁", "σ₂"],
            "std. dev.",
            CentralStat::Mode,
        ),
    ];
    for (row, (vars, labels, what, stat)) in pairs.into_iter().enumerate() {
        let s1 = trace.get(vars[0])?;
        let s2 = trace.get(vars[1])?;
        let (lo, hi) = shared_range(&[s1, s2]);
        for (col, (samples, (label, name))) in [s1, s2]
            .into_iter()
            .zip(labels.into_iter().zip([name1, name2]))
            .enumerate()
        {
            let ax = fig.axes_mut(row, col)?;
            let opts = base
                .clone()
                .with_stat(stat)
                .with_title(format!("{name} {what}"))
                .with_label(label);
            plot_posterior(ax, samples, &opts)?;
            ax.set_xlim(lo, hi);
        }
    }

    for (col, name) in [name1, name2].into_iter().enumerate() {
        plot_data_and_prediction(
            fig.axes_mut(2, col)?,
            results,
            col + 1,
            Some(format!("Data {name} w. Post. Pred.").as_str()),
            options.bins,
        )?;
    }

    plot_posterior(
        fig.axes_mut(3, 0)?,
        trace.get("Difference of means")?,
        &base
            .clone()
            .with_ref_val(0.0)
            .with_title("Difference of means")
            .with_label("μ₁ − μ₂"),
    )?;
    plot_posterior(
        fig.axes_mut(3, 1)?,
        trace.get("Difference of SDs")?,
        &base
            .clone()
            .with_ref_val(0.0)
            .with_title("Difference of std. dev.s")
            .with_label("σ₁ − σ₂"),
    )?;

    let log_nu: Vec<f64> = trace.get("Normality")?.iter().map(|nu| nu.log10()).collect();
    plot_posterior(
        fig.axes_mut(4, 0)?,
        &log_nu,
        &base
            .clone()
            .with_title("Normality")
            .with_label("log₁₀(ν)"),
    )?;
    plot_posterior(
        fig.axes_mut(4, 1)?,
        trace.get("Effect size")?,
        &base
            .clone()
            .with_ref_val(0.0)
            .with_title("Effect size")
            .with_label("(μ₁ − μ₂) / √((σ₁² + σ₂²) / 2)"),
    )?;

    Ok(fig)
}

fn one_group_figure<M: BestModel>(
    results: &BestResults<M>,
    ref_val: f64,
    options: &PlotAllOptions,
) -> Result<Figure> {
    let trace = results.trace();
    let base = options.posterior();
    let mut fig = Figure::new(3, 2);

    plot_posterior(
        fig.axes_mut(0, 0)?,
        trace.get("Mean")?,
        &base
            .clone()
            .with_stat(CentralStat::Mean)
            .with_ref_val(ref_val)
            .with_title("Mean")
            .with_label("μ"),
    )?;
    plot_posterior(
        fig.axes_mut(0, 1)?,
        trace.get("SD")?,
        &base.clone().with_title("Std. dev.").with_label("σ"),
    )?;
    plot_data_and_prediction(
        fig.axes_mut(1, 0)?,
        results,
        1,
        Some("Data w. Post. Pred."),
        options.bins,
    )?;

    let log_nu: Vec<f64> = trace.get("Normality")?.iter().map(|nu| nu.log10()).collect();
    plot_posterior(
        fig.axes_mut(1, 1)?,
        &log_nu,
        &base
            .clone()
            .with_title("Normality")
            .with_label("log₁₀(ν)"),
    )?;
    plot_posterior(
        fig.axes_mut(2, 0)?,
        trace.get("Effect size")?,
        &base
            .clone()
            .with_ref_val(0.0)
            .with_title("Effect size")
            .with_label(format!("(μ − {}) / σ", sig3(ref_val))),
    )?;

    Ok(fig)
}

/// Range covering several sample sets, padded by 5%.
fn shared_range(sets: &[&[f64]]) -> (f64, f64) {
    let (lo, hi) = sets
        .iter()
        .flat_map(|s| s.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let margin = (hi - lo) * 0.05;
    (lo - margin, hi + margin)
}

fn sig3(x: f64) -> String {
    format_significant(x, 3)
}
