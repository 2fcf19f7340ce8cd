use causeway_config::{DecisionBrief, Pacing};
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;

use crate::StepController;
use crate::reveal::StagedReveal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefStage {
  Generate,
}

/// Step 6: generate the decision brief. Terminal, never completes.
///
/// Shows either the prompt or the generated brief. Once a brief is stored it
/// is not replaced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecisionBriefStep {
  generating: bool,
  brief: Option<DecisionBrief>,
}

impl DecisionBriefStep {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin(&mut self, pacing: &Pacing) -> Option<StagedReveal<BriefStage>> {
    if self.generating || self.brief.is_some() {
      return None;
    }
    self.generating = true;
    Some(StagedReveal::new().then(pacing.brief_delay(), BriefStage::Generate))
  }

  pub fn store(&mut self, brief: DecisionBrief) -> bool {
    if !self.generating || self.brief.is_some() {
      return false;
    }
    self.generating = false;
    self.brief = Some(brief);
    true
  }

  pub fn is_generating(&self) -> bool {
    self.generating
  }

  pub fn brief(&self) -> Option<&DecisionBrief> {
    self.brief.as_ref()
  }
}

impl StepController for DecisionBriefStep {
  const STEP: WorkflowStep = WorkflowStep::DecisionBrief;

  fn completion(&self) -> Option<Completion> {
    None
  }

  fn is_busy(&self) -> bool {
    self.generating
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::fixtures;
  use chrono::Utc;
  use std::time::Duration;

  #[test]
  fn test_brief_generated_once() {
    let mut step = DecisionBriefStep::new();
    let stages: Vec<_> = step.begin(&Pacing::default()).unwrap().collect();
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].delay, Duration::from_millis(1500));
    assert!(step.is_generating());
    assert!(step.begin(&Pacing::default()).is_none());

    let brief = fixtures::decision_brief("BRIEF-1".to_string(), Utc::now());
    assert!(step.store(brief));
    assert!(!step.is_generating());
    assert_eq!(step.brief().map(|b| b.id.as_str()), Some("BRIEF-1"));

    let second = fixtures::decision_brief("BRIEF-2".to_string(), Utc::now());
    assert!(!step.store(second));
    assert!(step.begin(&Pacing::default()).is_none());
    assert_eq!(step.brief().map(|b| b.id.as_str()), Some("BRIEF-1"));
  }

  #[test]
  fn test_terminal_step_never_completes() {
    let mut step = DecisionBriefStep::new();
    step.begin(&Pacing::instant());
    step.store(fixtures::decision_brief("BRIEF-1".to_string(), Utc::now()));
    assert!(step.completion().is_none());
  }
}
