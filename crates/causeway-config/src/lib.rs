//! Causeway Config
//!
//! This crate contains the serializable data model shared by every Causeway
//! crate. Nothing in here has behavior beyond small derived accessors:
//!
//! - fixture records consumed by the step controllers (silos, data sources,
//!   treatment/outcome options, the causal DAG)
//! - results handed out by an analysis provider (identification, effect
//!   estimate, experiment plan, decision brief)
//! - the [`CausalQuery`] produced by the query step
//! - [`SessionConfig`] with the [`Pacing`] of every simulated operation
//!
//! Everything round-trips through JSON so fixture sets and configuration can
//! be loaded from files.

mod analysis;
mod brief;
mod fixture;
mod pacing;
mod query;

pub use analysis::{
  DataRequirement, EffectEstimate, ExperimentDesign, ExperimentGroup, ExperimentPlan,
  IdentificationResult, Priority,
};
pub use brief::{BriefAssumption, DecisionBrief, ImpactEstimate, MonitoringItem};
pub use fixture::{DagEdge, DagNode, DataSource, FixtureSet, NodeKind, Silo, SiloIcon, SiloStatus};
pub use pacing::{Pacing, SessionConfig};
pub use query::CausalQuery;
