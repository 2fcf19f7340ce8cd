use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// One of the six workflow stages, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkflowStep {
  UnifyContext = 1,
  CausalQuery = 2,
  Identification = 3,
  Estimation = 4,
  ExperimentPlan = 5,
  DecisionBrief = 6,
}

/// Display text for a step: the stepper label plus the action panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
  pub title: &'static str,
  pub description: &'static str,
  pub heading: &'static str,
  pub action: &'static str,
}

const STEP_INFO: [StepInfo; 6] = [
  StepInfo {
    title: "Unify Context",
    description: "Merge data silos",
    heading: "UNIFY CONTEXT",
    action: "Action: SLM is identifying semantic overlaps between Product and Finance datasets to create a shared feature space.",
  },
  StepInfo {
    title: "Causal Query",
    description: "Define treatment & outcome",
    heading: "CAUSAL QUERY",
    action: "Action: Translating natural language business questions into a formal (Treatment, Outcome, Confounder) triplet.",
  },
  StepInfo {
    title: "Identification",
    description: "Analyze causal paths",
    heading: "IDENTIFICATION GATING",
    action: "Action: Evaluating the Micro-DAG for \"Backdoor Paths\". The SLM is blocking non-causal associations.",
  },
  StepInfo {
    title: "Estimation",
    description: "Calculate effects",
    heading: "EFFECT ESTIMATION",
    action: "Action: Running double-machine learning via EconML to isolate the true treatment effect.",
  },
  StepInfo {
    title: "Experiment Plan",
    description: "Design data collection",
    heading: "EXPERIMENT PLANNER",
    action: "Action: Calculating Value of Information (VoI) to suggest the smallest necessary test to resolve uncertainty.",
  },
  StepInfo {
    title: "Decision Brief",
    description: "Export findings",
    heading: "DECISION BRIEF",
    action: "Action: Synthesizing reasoning, data, and uncertainty into a human-auditable memo.",
  },
];

impl WorkflowStep {
  pub const FIRST: WorkflowStep = WorkflowStep::UnifyContext;
  pub const LAST: WorkflowStep = WorkflowStep::DecisionBrief;
  pub const COUNT: u8 = 6;

  pub const ALL: [WorkflowStep; 6] = [
    WorkflowStep::UnifyContext,
    WorkflowStep::CausalQuery,
    WorkflowStep::Identification,
    WorkflowStep::Estimation,
    WorkflowStep::ExperimentPlan,
    WorkflowStep::DecisionBrief,
  ];

  /// Parse a 1-based step number.
  pub fn from_number(number: u8) -> Result<Self, WorkflowError> {
    match number {
      1..=6 => Ok(Self::ALL[usize::from(number - 1)]),
      _ => Err(WorkflowError::InvalidStep(number)),
    }
  }

  pub fn number(self) -> u8 {
    self as u8
  }

  /// The following step, `None` for the terminal one.
  pub fn next(self) -> Option<Self> {
    Self::from_number(self.number() + 1).ok()
  }

  pub fn previous(self) -> Option<Self> {
    Self::from_number(self.number().checked_sub(1)?).ok()
  }

  pub fn is_terminal(self) -> bool {
    self == Self::LAST
  }

  pub fn info(self) -> &'static StepInfo {
    &STEP_INFO[usize::from(self.number() - 1)]
  }
}

impl TryFrom<u8> for WorkflowStep {
  type Error = WorkflowError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::from_number(value)
  }
}

impl From<WorkflowStep> for u8 {
  fn from(step: WorkflowStep) -> Self {
    step.number()
  }
}

impl fmt::Display for WorkflowStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "STEP {}: {}", self.number(), self.info().heading)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_number_round_trips() {
    for step in WorkflowStep::ALL {
      assert_eq!(WorkflowStep::from_number(step.number()), Ok(step));
    }
  }

  #[test]
  fn test_from_number_out_of_range() {
    assert_eq!(
      WorkflowStep::from_number(0),
      Err(WorkflowError::InvalidStep(0))
    );
    assert_eq!(
      WorkflowStep::from_number(7),
      Err(WorkflowError::InvalidStep(7))
    );
  }

  #[test]
  fn test_next_and_previous() {
    assert_eq!(
      WorkflowStep::UnifyContext.next(),
      Some(WorkflowStep::CausalQuery)
    );
    assert_eq!(WorkflowStep::DecisionBrief.next(), None);
    assert_eq!(WorkflowStep::UnifyContext.previous(), None);
    assert_eq!(
      WorkflowStep::DecisionBrief.previous(),
      Some(WorkflowStep::ExperimentPlan)
    );
  }

  #[test]
  fn test_ordering() {
    assert!(WorkflowStep::CausalQuery < WorkflowStep::Identification);
    assert!(WorkflowStep::ALL.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn test_info_table() {
    assert_eq!(WorkflowStep::Identification.info().title, "Identification");
    assert_eq!(
      WorkflowStep::Identification.info().heading,
      "IDENTIFICATION GATING"
    );
    assert_eq!(
      WorkflowStep::DecisionBrief.to_string(),
      "STEP 6: DECISION BRIEF"
    );
  }

  #[test]
  fn test_serializes_as_number() {
    let json = serde_json::to_value(WorkflowStep::Estimation).unwrap();
    assert_eq!(json, 4);
    let step: WorkflowStep = serde_json::from_value(json).unwrap();
    assert_eq!(step, WorkflowStep::Estimation);
    assert!(serde_json::from_str::<WorkflowStep>("9").is_err());
  }
}
