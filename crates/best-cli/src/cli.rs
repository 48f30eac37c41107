//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bayesian estimation of one or two groups of observations
#[derive(Parser, Debug)]
#[command(name = "best")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Output format of the report
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Write all posterior plots to this SVG file
    #[arg(long, global = true)]
    pub plot: Option<PathBuf>,

    /// Reuse the results stored in this JSON file, or store them there
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Compare two independent groups
    Two {
        /// File with the observations of group 1
        #[arg(long)]
        group1: PathBuf,

        /// File with the observations of group 2
        #[arg(long)]
        group2: PathBuf,

        /// CSV column holding the observations (first numeric column if omitted)
        #[arg(long)]
        column: Option<String>,

        /// Display names of the groups (file stems if omitted)
        #[arg(long, num_args = 2, value_names = ["GROUP1", "GROUP2"])]
        names: Option<Vec<String>>,
    },

    /// Compare a single group against a reference value
    One {
        /// File with the observations
        #[arg(long)]
        data: PathBuf,

        /// CSV column holding the observations (first numeric column if omitted)
        #[arg(long)]
        column: Option<String>,

        /// Reference value for the mean and the effect size
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        ref_val: f64,
    },
}

/// Sampler settings shared by all commands.
#[derive(Args, Debug, Clone)]
pub(crate) struct SamplingArgs {
    /// Posterior draws kept per chain
    #[arg(long, default_value_t = 2000, global = true)]
    pub samples: usize,

    /// Tuning iterations per chain
    #[arg(long, default_value_t = 1000, global = true)]
    pub tune: usize,

    /// Number of chains (2 to 4 depending on the available threads if omitted)
    #[arg(long, env = "BEST_CHAINS", global = true)]
    pub chains: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long, env = "BEST_SEED", global = true)]
    pub seed: Option<u64>,

    /// Mass covered by the reported HDIs
    #[arg(long, default_value_t = 0.95, global = true)]
    pub credible_mass: f64,
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Pretty-printed JSON
    Json,
    /// Summary table as CSV
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_two() {
        let cli = Cli::try_parse_from([
            "best", "two", "--group1", "a.csv", "--group2", "b.csv", "--seed", "7",
        ])
        .expect("parses");
        assert_eq!(cli.sampling.seed, Some(7));
        assert_eq!(cli.sampling.samples, 2000);
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Commands::Two { group1, names, .. } => {
                assert_eq!(group1, PathBuf::from("a.csv"));
                assert!(names.is_none());
            }
            Commands::One { .. } => panic!("expected the two-group command"),
        }
    }

    #[test]
    fn test_parse_one_negative_ref_val() {
        let cli = Cli::try_parse_from([
            "best", "one", "--data", "d.txt", "--ref-val", "-1.5", "--format", "json",
        ])
        .expect("parses");
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::One { ref_val, .. } => assert_eq!(ref_val, -1.5),
            Commands::Two { .. } => panic!("expected the one-group command"),
        }
    }

    #[test]
    fn test_names_take_two_values() {
        let cli = Cli::try_parse_from([
            "best", "two", "--group1", "a", "--group2", "b", "--names", "Drug", "Placebo",
        ])
        .expect("parses");
        match cli.command {
            Commands::Two { names, .. } => {
                assert_eq!(names, Some(vec!["Drug".to_string(), "Placebo".to_string()]));
            }
            Commands::One { .. } => panic!("expected the two-group command"),
        }
    }
}
