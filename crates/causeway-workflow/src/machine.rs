use causeway_config::CausalQuery;
use tracing::{debug, info};

use crate::completion::Completion;
use crate::step::WorkflowStep;

/// Result of a state machine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// The active step changed (or was re-entered).
  Moved {
    from: WorkflowStep,
    to: WorkflowStep,
  },
  /// The request was not valid in the current state and was ignored.
  Unchanged,
}

impl Transition {
  pub fn is_moved(self) -> bool {
    matches!(self, Transition::Moved { .. })
  }
}

/// The linear six-state workflow sequencer.
///
/// `current_step` only increases through [`advance`](Self::advance), one step
/// at a time. [`go_to`](Self::go_to) can only revisit steps that were already
/// reached. All mutation goes through `advance`, `go_to` and `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowMachine {
  current: WorkflowStep,
  query: Option<CausalQuery>,
}

impl Default for WorkflowMachine {
  fn default() -> Self {
    Self::new()
  }
}

impl WorkflowMachine {
  pub fn new() -> Self {
    Self {
      current: WorkflowStep::FIRST,
      query: None,
    }
  }

  pub fn current_step(&self) -> WorkflowStep {
    self.current
  }

  /// The finalized query, once the query step has completed.
  pub fn query(&self) -> Option<&CausalQuery> {
    self.query.as_ref()
  }

  /// Move to the next step on behalf of the active step's controller.
  ///
  /// Ignored when the completion belongs to another step, when the current
  /// step is terminal, or when a query completion carries no assumptions.
  pub fn advance(&mut self, completion: Completion) -> Transition {
    let from = self.current;
    if completion.step() != from {
      debug!(
        current = from.number(),
        completed = completion.step().number(),
        "ignoring completion for inactive step"
      );
      return Transition::Unchanged;
    }

    let Some(to) = from.next() else {
      return Transition::Unchanged;
    };

    if let Completion::Query(query) = completion {
      if !query.is_complete() {
        debug!("ignoring incomplete causal query");
        return Transition::Unchanged;
      }
      info!(
        treatment = %query.treatment,
        outcome = %query.outcome,
        assumptions = query.assumptions.len(),
        "causal query stored"
      );
      self.query = Some(query);
    }

    self.current = to;
    info!(from = from.number(), to = to.number(), "workflow advanced");
    Transition::Moved { from, to }
  }

  /// Revisit an already reached step.
  ///
  /// Going to the current step re-enters it. The stored query is kept.
  pub fn go_to(&mut self, step: WorkflowStep) -> Transition {
    if !self.is_clickable(step) {
      debug!(
        current = self.current.number(),
        requested = step.number(),
        "ignoring jump to unreached step"
      );
      return Transition::Unchanged;
    }
    let from = self.current;
    self.current = step;
    info!(from = from.number(), to = step.number(), "workflow revisited");
    Transition::Moved { from, to: step }
  }

  /// Back to the first step with no stored query.
  pub fn reset(&mut self) -> Transition {
    let from = self.current;
    self.current = WorkflowStep::FIRST;
    self.query = None;
    info!(from = from.number(), "workflow reset");
    Transition::Moved {
      from,
      to: WorkflowStep::FIRST,
    }
  }

  /// Steps up to and including the current one can be navigated to.
  pub fn is_clickable(&self, step: WorkflowStep) -> bool {
    step <= self.current
  }

  pub fn is_completed(&self, step: WorkflowStep) -> bool {
    step < self.current
  }

  /// Fraction of the stepper line that is filled, `0.0..=1.0`.
  pub fn progress_fraction(&self) -> f64 {
    f64::from(self.current.number() - 1) / f64::from(WorkflowStep::COUNT - 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_query() -> CausalQuery {
    CausalQuery::new(
      "Price Increase (+15%)",
      "Customer Retention (90-day)",
      vec![
        "No unmeasured confounders".to_string(),
        "Treatment is well-defined".to_string(),
      ],
    )
  }

  fn completion_for(step: WorkflowStep) -> Option<Completion> {
    match step {
      WorkflowStep::UnifyContext => Some(Completion::Unified),
      WorkflowStep::CausalQuery => Some(Completion::Query(sample_query())),
      WorkflowStep::Identification => Some(Completion::Identified),
      WorkflowStep::Estimation => Some(Completion::Estimated),
      WorkflowStep::ExperimentPlan => Some(Completion::Planned),
      WorkflowStep::DecisionBrief => None,
    }
  }

  fn machine_at(step: WorkflowStep) -> WorkflowMachine {
    let mut machine = WorkflowMachine::new();
    while machine.current_step() < step {
      let completion = completion_for(machine.current_step()).unwrap();
      assert!(machine.advance(completion).is_moved());
    }
    machine
  }

  #[test]
  fn test_starts_at_first_step() {
    let machine = WorkflowMachine::new();
    assert_eq!(machine.current_step(), WorkflowStep::UnifyContext);
    assert!(machine.query().is_none());
  }

  #[test]
  fn test_advance_moves_one_step() {
    for step in WorkflowStep::ALL {
      let Some(completion) = completion_for(step) else {
        continue;
      };
      let mut machine = machine_at(step);
      let transition = machine.advance(completion);
      assert_eq!(
        transition,
        Transition::Moved {
          from: step,
          to: step.next().unwrap()
        }
      );
      assert_eq!(machine.current_step().number(), step.number() + 1);
    }
  }

  #[test]
  fn test_advance_from_last_step_is_noop() {
    let mut machine = machine_at(WorkflowStep::DecisionBrief);
    // No completion exists for the terminal step; a stale one is ignored.
    assert_eq!(
      machine.advance(Completion::Planned),
      Transition::Unchanged
    );
    assert_eq!(machine.current_step(), WorkflowStep::DecisionBrief);
  }

  #[test]
  fn test_advance_with_wrong_completion_is_noop() {
    let mut machine = WorkflowMachine::new();
    assert_eq!(
      machine.advance(Completion::Estimated),
      Transition::Unchanged
    );
    assert_eq!(machine.current_step(), WorkflowStep::UnifyContext);
  }

  #[test]
  fn test_query_completion_stores_query() {
    let mut machine = machine_at(WorkflowStep::CausalQuery);
    machine.advance(Completion::Query(sample_query()));
    assert_eq!(machine.current_step(), WorkflowStep::Identification);
    assert_eq!(machine.query(), Some(&sample_query()));
  }

  #[test]
  fn test_query_without_assumptions_is_rejected() {
    let mut machine = machine_at(WorkflowStep::CausalQuery);
    let query = CausalQuery::new("Price Increase (+15%)", "Churn Rate", vec![]);
    assert_eq!(
      machine.advance(Completion::Query(query)),
      Transition::Unchanged
    );
    assert_eq!(machine.current_step(), WorkflowStep::CausalQuery);
    assert!(machine.query().is_none());
  }

  #[test]
  fn test_new_query_replaces_old() {
    let mut machine = machine_at(WorkflowStep::Estimation);
    machine.go_to(WorkflowStep::CausalQuery);
    let replacement = CausalQuery::new(
      "Product Bundle Offer",
      "Monthly Revenue",
      vec!["Treatment is well-defined".to_string()],
    );
    machine.advance(Completion::Query(replacement.clone()));
    assert_eq!(machine.query(), Some(&replacement));
  }

  #[test]
  fn test_go_to_reached_and_unreached_steps() {
    for current in WorkflowStep::ALL {
      for target in WorkflowStep::ALL {
        let mut machine = machine_at(current);
        let transition = machine.go_to(target);
        if target <= current {
          assert!(transition.is_moved());
          assert_eq!(machine.current_step(), target);
        } else {
          assert_eq!(transition, Transition::Unchanged);
          assert_eq!(machine.current_step(), current);
        }
      }
    }
  }

  #[test]
  fn test_go_to_keeps_query() {
    let mut machine = machine_at(WorkflowStep::ExperimentPlan);
    machine.go_to(WorkflowStep::UnifyContext);
    assert_eq!(machine.query(), Some(&sample_query()));
  }

  #[test]
  fn test_go_to_back_limits_forward_jumps() {
    let mut machine = machine_at(WorkflowStep::ExperimentPlan);
    machine.go_to(WorkflowStep::CausalQuery);
    assert_eq!(
      machine.go_to(WorkflowStep::Estimation),
      Transition::Unchanged
    );
  }

  #[test]
  fn test_reset_from_any_step() {
    for step in WorkflowStep::ALL {
      let mut machine = machine_at(step);
      machine.reset();
      assert_eq!(machine.current_step(), WorkflowStep::UnifyContext);
      assert!(machine.query().is_none());
    }
  }

  #[test]
  fn test_stepper_helpers() {
    let machine = machine_at(WorkflowStep::Identification);
    assert!(machine.is_completed(WorkflowStep::CausalQuery));
    assert!(!machine.is_completed(WorkflowStep::Identification));
    assert!(machine.is_clickable(WorkflowStep::Identification));
    assert!(!machine.is_clickable(WorkflowStep::Estimation));
    assert!((machine.progress_fraction() - 0.4).abs() < 1e-9);
    assert_eq!(WorkflowMachine::new().progress_fraction(), 0.0);
    assert_eq!(machine_at(WorkflowStep::DecisionBrief).progress_fraction(), 1.0);
  }
}
