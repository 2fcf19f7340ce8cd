//! Causeway Analysis
//!
//! Everything the workflow presents as "computed" comes from here.
//!
//! - [`builtin_fixtures`] and [`load_fixtures`] provide the [`FixtureSet`]
//!   (silos, data sources, query options, the causal DAG) read by the step
//!   controllers.
//! - [`AnalysisProvider`] hands out identification, estimation, experiment
//!   planning and decision-brief results. [`FixtureProvider`] returns canned
//!   values; a real engine can be swapped in behind the same trait.
//!
//! [`FixtureSet`]: causeway_config::FixtureSet

mod error;
pub mod fixtures;
mod loader;
mod provider;

pub use error::AnalysisError;
pub use fixtures::builtin_fixtures;
pub use loader::{load_fixtures, validate_fixtures};
pub use provider::{AnalysisProvider, FixtureProvider};
