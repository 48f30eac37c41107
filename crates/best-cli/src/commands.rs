//! Command implementations.

use crate::cli::{Cli, Commands, SamplingArgs};
use crate::data::Observations;
use crate::error::Result;
use crate::output::Report;
use best::model::{BestModel, BestModelOne, BestModelTwo};
use best::plot::{plot_all_with, Figure, PlotAllOptions};
use best::results::BestResults;
use best::sampler::SamplerConfig;
use best::stats::hdi::validate_credible_mass;
use best::{analyze_one, analyze_two};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Execute the parsed command line.
pub(crate) fn run(cli: &Cli) -> Result<()> {
    validate_credible_mass(cli.sampling.credible_mass)?;
    if let Some(path) = &cli.plot {
        Figure::check_path(path)?;
    }
    let config = sampler_config(&cli.sampling);

    match &cli.command {
        Commands::Two {
            group1,
            group2,
            column,
            names,
        } => {
            let y1 = Observations::load(group1, column.as_deref())?;
            let y2 = Observations::load(group2, column.as_deref())?;
            let names = match names.as_deref() {
                Some([a, b]) => [a.clone(), b.clone()],
                _ => [y1.name(), y2.name()],
            };

            let model = BestModelTwo::new(&y1.values, &y2.values)?;
            let results = cached(cli.cache.as_deref(), &model, || {
                analyze_two(&y1.values, &y2.values, &config)
            })?;
            if let Some(path) = &cli.plot {
                let options = PlotAllOptions::default()
                    .with_credible_mass(cli.sampling.credible_mass)
                    .with_group_names(names[0].clone(), names[1].clone());
                save_plot(&results, &options, path)?;
            }
            Report::two(&results, &names, cli.sampling.credible_mass)?.print(cli.format)
        }
        Commands::One {
            data,
            column,
            ref_val,
        } => {
            let y = Observations::load(data, column.as_deref())?;
            let model = BestModelOne::new(&y.values, *ref_val)?;
            let results = cached(cli.cache.as_deref(), &model, || {
                analyze_one(&y.values, *ref_val, &config)
            })?;
            if let Some(path) = &cli.plot {
                let options =
                    PlotAllOptions::default().with_credible_mass(cli.sampling.credible_mass);
                save_plot(&results, &options, path)?;
            }
            Report::one(&results, &y.name(), cli.sampling.credible_mass)?.print(cli.format)
        }
    }
}

fn sampler_config(args: &SamplingArgs) -> SamplerConfig {
    let mut config = SamplerConfig::default()
        .with_n_samples(args.samples)
        .with_tune(args.tune);
    if let Some(chains) = args.chains {
        config = config.with_chains(chains);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config
}

/// Load results from `cache` when it holds an analysis of `model`, otherwise
/// compute and store them.
fn cached<M, F>(cache: Option<&Path>, model: &M, compute: F) -> Result<BestResults<M>>
where
    M: BestModel + PartialEq + Serialize + DeserializeOwned,
    F: FnOnce() -> best::Result<BestResults<M>>,
{
    match cache {
        Some(path) if path.exists() => match BestResults::<M>::load_json(path) {
            Ok(results) if results.model() == model => {
                info!(path = %path.display(), "loaded cached results");
                Ok(results)
            }
            Ok(_) => {
                warn!(path = %path.display(), "cached results belong to other data; recomputing");
                store(path, compute()?)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache");
                store(path, compute()?)
            }
        },
        Some(path) => store(path, compute()?),
        None => Ok(compute()?),
    }
}

fn store<M: BestModel + Serialize>(path: &Path, results: BestResults<M>) -> Result<BestResults<M>> {
    results.save_json(path)?;
    info!(path = %path.display(), "stored results");
    Ok(results)
}

fn save_plot<M: BestModel>(
    results: &BestResults<M>,
    options: &PlotAllOptions,
    path: &Path,
) -> Result<()> {
    plot_all_with(results, options)?.savefig(path)?;
    info!(path = %path.display(), "saved plot");
    Ok(())
}
