use causeway_analysis::fixtures::DEFAULT_ASSUMPTIONS;
use causeway_config::CausalQuery;
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;

use crate::StepController;

/// Step 2: choose a treatment and an outcome and state the assumptions.
#[derive(Debug, Clone, Serialize)]
pub struct CausalQueryStep {
  treatments: Vec<String>,
  outcomes: Vec<String>,
  treatment: Option<String>,
  outcome: Option<String>,
  assumptions: Vec<String>,
}

impl CausalQueryStep {
  pub fn new(treatments: &[String], outcomes: &[String]) -> Self {
    Self {
      treatments: treatments.to_vec(),
      outcomes: outcomes.to_vec(),
      treatment: None,
      outcome: None,
      assumptions: DEFAULT_ASSUMPTIONS.iter().map(|a| a.to_string()).collect(),
    }
  }

  pub fn treatments(&self) -> &[String] {
    &self.treatments
  }

  pub fn outcomes(&self) -> &[String] {
    &self.outcomes
  }

  /// Select one of the offered treatments. Unknown options are ignored.
  pub fn select_treatment(&mut self, treatment: &str) -> bool {
    if !self.treatments.iter().any(|t| t == treatment) {
      return false;
    }
    self.treatment = Some(treatment.to_string());
    true
  }

  /// Select one of the offered outcomes. Unknown options are ignored.
  pub fn select_outcome(&mut self, outcome: &str) -> bool {
    if !self.outcomes.iter().any(|o| o == outcome) {
      return false;
    }
    self.outcome = Some(outcome.to_string());
    true
  }

  pub fn treatment(&self) -> Option<&str> {
    self.treatment.as_deref()
  }

  pub fn outcome(&self) -> Option<&str> {
    self.outcome.as_deref()
  }

  pub fn assumptions(&self) -> &[String] {
    &self.assumptions
  }

  /// Append a trimmed assumption; blank input is ignored.
  pub fn add_assumption(&mut self, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
      return false;
    }
    self.assumptions.push(text.to_string());
    true
  }

  /// Drop the assumption at `index`, keeping the others in order.
  pub fn remove_assumption(&mut self, index: usize) -> bool {
    if index >= self.assumptions.len() {
      return false;
    }
    self.assumptions = std::mem::take(&mut self.assumptions)
      .into_iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .map(|(_, assumption)| assumption)
      .collect();
    true
  }

  /// The question being asked, once both sides are chosen.
  pub fn preview(&self) -> Option<String> {
    self.draft().map(|query| query.question())
  }

  pub fn can_proceed(&self) -> bool {
    self.draft().is_some_and(|query| query.is_complete())
  }

  fn draft(&self) -> Option<CausalQuery> {
    Some(CausalQuery::new(
      self.treatment.clone()?,
      self.outcome.clone()?,
      self.assumptions.clone(),
    ))
  }
}

impl StepController for CausalQueryStep {
  const STEP: WorkflowStep = WorkflowStep::CausalQuery;

  fn completion(&self) -> Option<Completion> {
    self
      .draft()
      .filter(CausalQuery::is_complete)
      .map(Completion::Query)
  }

  fn is_busy(&self) -> bool {
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::builtin_fixtures;

  fn controller() -> CausalQueryStep {
    let fixtures = builtin_fixtures();
    CausalQueryStep::new(&fixtures.treatments, &fixtures.outcomes)
  }

  #[test]
  fn test_starts_with_default_assumptions() {
    let step = controller();
    assert_eq!(
      step.assumptions(),
      &[
        "No unmeasured confounders".to_string(),
        "Treatment is well-defined".to_string()
      ]
    );
    assert!(step.completion().is_none());
  }

  #[test]
  fn test_gate_requires_both_selections() {
    let mut step = controller();
    assert!(step.select_treatment("Price Increase (+15%)"));
    assert!(!step.can_proceed());
    assert!(step.completion().is_none());

    assert!(step.select_outcome("Customer Retention (90-day)"));
    assert!(step.can_proceed());
    let Some(Completion::Query(query)) = step.completion() else {
      panic!("expected a query completion");
    };
    assert_eq!(query.treatment, "Price Increase (+15%)");
    assert_eq!(query.outcome, "Customer Retention (90-day)");
    assert_eq!(query.assumptions.len(), 2);
  }

  #[test]
  fn test_gate_requires_an_assumption() {
    let mut step = controller();
    step.select_treatment("Retention Campaign Launch");
    step.select_outcome("Churn Rate");
    assert!(step.remove_assumption(0));
    assert!(step.remove_assumption(0));
    assert!(step.assumptions().is_empty());
    assert!(!step.can_proceed());
    assert!(step.completion().is_none());

    assert!(step.add_assumption("Campaign reach is measurable"));
    assert!(step.can_proceed());
  }

  #[test]
  fn test_unknown_option_is_ignored() {
    let mut step = controller();
    assert!(!step.select_treatment("Free Lunch"));
    assert!(!step.select_outcome("Happiness"));
    assert_eq!(step.treatment(), None);
    assert_eq!(step.outcome(), None);
  }

  #[test]
  fn test_reselect_replaces_choice() {
    let mut step = controller();
    step.select_treatment("Price Increase (+15%)");
    step.select_treatment("Product Bundle Offer");
    assert_eq!(step.treatment(), Some("Product Bundle Offer"));
  }

  #[test]
  fn test_add_trims_and_ignores_blank() {
    let mut step = controller();
    assert!(!step.add_assumption("   "));
    assert!(step.add_assumption("  Stable seasonality  "));
    assert_eq!(step.assumptions().last().unwrap(), "Stable seasonality");
  }

  #[test]
  fn test_remove_keeps_relative_order() {
    let mut step = controller();
    step.add_assumption("third");
    step.add_assumption("fourth");
    let before = step.assumptions().to_vec();

    assert!(step.remove_assumption(1));
    let after = step.assumptions();
    assert_eq!(after.len(), before.len() - 1);
    assert_eq!(after, &[before[0].clone(), before[2].clone(), before[3].clone()]);
  }

  #[test]
  fn test_remove_out_of_range_is_noop() {
    let mut step = controller();
    assert!(!step.remove_assumption(2));
    assert_eq!(step.assumptions().len(), 2);
  }

  #[test]
  fn test_preview() {
    let mut step = controller();
    assert_eq!(step.preview(), None);
    step.select_treatment("Price Increase (+15%)");
    step.select_outcome("Monthly Revenue");
    assert_eq!(
      step.preview().as_deref(),
      Some("What is the causal effect of Price Increase (+15%) on Monthly Revenue?")
    );
  }
}
