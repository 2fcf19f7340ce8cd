use causeway_config::CausalQuery;

use crate::step::WorkflowStep;

/// Signal a step controller sends upward once its gate holds.
///
/// Only the query step carries a payload. The decision brief step is terminal
/// and has no completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  Unified,
  Query(CausalQuery),
  Identified,
  Estimated,
  Planned,
}

impl Completion {
  /// The step this completion belongs to.
  pub fn step(&self) -> WorkflowStep {
    match self {
      Completion::Unified => WorkflowStep::UnifyContext,
      Completion::Query(_) => WorkflowStep::CausalQuery,
      Completion::Identified => WorkflowStep::Identification,
      Completion::Estimated => WorkflowStep::Estimation,
      Completion::Planned => WorkflowStep::ExperimentPlan,
    }
  }
}
