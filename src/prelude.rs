//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use best::prelude::*;
//! ```

pub use crate::analyze::{analyze_one, analyze_two};
pub use crate::diagnostics::SampleReport;
pub use crate::error::{BestError, Result};
pub use crate::model::{BestModel, BestModelOne, BestModelTwo, ModelKind};
pub use crate::plot::{
    plot_all, plot_all_one, plot_all_two, plot_all_with, plot_data_and_prediction,
    plot_posterior, CentralStat, Figure, PlotAllOptions, PosteriorPlotOptions, PRETTY_BLUE,
};
pub use crate::results::{BestResults, BestResultsOne, BestResultsTwo, Summary};
pub use crate::sampler::SamplerConfig;
pub use crate::trace::Trace;
