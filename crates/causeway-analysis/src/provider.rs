use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use causeway_config::{
  CausalQuery, DagEdge, DagNode, DecisionBrief, EffectEstimate, ExperimentPlan,
  IdentificationResult,
};
use chrono::Utc;
use tracing::debug;

use crate::error::AnalysisError;
use crate::fixtures;

/// Source of the results the workflow presents as computed.
///
/// The step controllers and the state machine never compute anything
/// themselves; they ask a provider. Implementations backed by real analysis
/// may fail, the fixture provider never does.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
  /// Find the backdoor paths and an adjustment strategy for the DAG.
  async fn identify(
    &self,
    nodes: &[DagNode],
    edges: &[DagEdge],
  ) -> Result<IdentificationResult, AnalysisError>;

  /// Estimate the average treatment effect for the query.
  async fn estimate_effect(
    &self,
    query: Option<&CausalQuery>,
  ) -> Result<EffectEstimate, AnalysisError>;

  /// Plan the data collection and validating experiment.
  async fn plan_experiment(&self) -> Result<ExperimentPlan, AnalysisError>;

  /// Produce a fresh decision brief.
  async fn decision_brief(&self) -> Result<DecisionBrief, AnalysisError>;
}

/// Serves the built-in canned results.
#[derive(Debug, Default)]
pub struct FixtureProvider {
  /// Millisecond stamp of the last brief id handed out.
  last_brief_ms: AtomicI64,
}

impl FixtureProvider {
  pub fn new() -> Self {
    Self::default()
  }

  /// `BRIEF-<unix millis>`, strictly increasing across calls.
  fn next_brief_id(&self, now_ms: i64) -> String {
    let (Ok(previous) | Err(previous)) =
      self
        .last_brief_ms
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |previous| {
          Some(now_ms.max(previous + 1))
        });
    format!("BRIEF-{}", now_ms.max(previous + 1))
  }
}

#[async_trait]
impl AnalysisProvider for FixtureProvider {
  async fn identify(
    &self,
    _nodes: &[DagNode],
    _edges: &[DagEdge],
  ) -> Result<IdentificationResult, AnalysisError> {
    Ok(fixtures::identification_result())
  }

  async fn estimate_effect(
    &self,
    _query: Option<&CausalQuery>,
  ) -> Result<EffectEstimate, AnalysisError> {
    Ok(fixtures::effect_estimate())
  }

  async fn plan_experiment(&self) -> Result<ExperimentPlan, AnalysisError> {
    Ok(fixtures::experiment_plan())
  }

  async fn decision_brief(&self) -> Result<DecisionBrief, AnalysisError> {
    let timestamp = Utc::now();
    let id = self.next_brief_id(timestamp.timestamp_millis());
    debug!(brief_id = %id, "generated decision brief");
    Ok(fixtures::decision_brief(id, timestamp))
  }
}
