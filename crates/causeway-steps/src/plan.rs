use causeway_config::ExperimentPlan;
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;
use std::time::Duration;

use crate::StepController;
use crate::reveal::StagedReveal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStage {
  Reveal,
}

/// Step 5: reveal the data-collection plan and experiment design.
///
/// Generation is immediate; the single stage carries no delay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperimentPlanner {
  generating: bool,
  plan: Option<ExperimentPlan>,
}

impl ExperimentPlanner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin_plan(&mut self) -> Option<StagedReveal<PlanStage>> {
    if self.generating || self.plan.is_some() {
      return None;
    }
    self.generating = true;
    Some(StagedReveal::new().then(Duration::ZERO, PlanStage::Reveal))
  }

  pub fn reveal(&mut self, plan: ExperimentPlan) -> bool {
    if !self.generating {
      return false;
    }
    self.generating = false;
    self.plan = Some(plan);
    true
  }

  pub fn plan(&self) -> Option<&ExperimentPlan> {
    self.plan.as_ref()
  }

  pub fn is_generated(&self) -> bool {
    self.plan.is_some()
  }
}

impl StepController for ExperimentPlanner {
  const STEP: WorkflowStep = WorkflowStep::ExperimentPlan;

  fn completion(&self) -> Option<Completion> {
    self.is_generated().then_some(Completion::Planned)
  }

  fn is_busy(&self) -> bool {
    self.generating
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::fixtures;

  #[test]
  fn test_plan_is_revealed_without_delay() {
    let mut planner = ExperimentPlanner::new();
    assert!(planner.completion().is_none());

    let stages: Vec<_> = planner.begin_plan().unwrap().collect();
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].delay, Duration::ZERO);

    assert!(planner.reveal(fixtures::experiment_plan()));
    assert!(planner.is_generated());
    assert_eq!(planner.completion(), Some(Completion::Planned));
    assert!(planner.begin_plan().is_none());
  }

  #[test]
  fn test_reveal_without_begin_is_ignored() {
    let mut planner = ExperimentPlanner::new();
    assert!(!planner.reveal(fixtures::experiment_plan()));
    assert!(planner.plan().is_none());
  }

  #[test]
  fn test_critical_requirements() {
    let mut planner = ExperimentPlanner::new();
    planner.begin_plan();
    planner.reveal(fixtures::experiment_plan());
    let critical: Vec<&str> = planner
      .plan()
      .unwrap()
      .requirements
      .iter()
      .filter(|r| r.is_critical())
      .map(|r| r.variable.as_str())
      .collect();
    assert_eq!(critical, vec!["Competitor Price Index", "Income Bracket"]);
  }
}
