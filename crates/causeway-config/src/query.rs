use serde::{Deserialize, Serialize};

/// A treatment/outcome pair plus the assumptions the analysis rests on.
///
/// Produced by the causal query step and owned by the workflow machine
/// afterwards. A query is never patched: a new completion replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalQuery {
  pub treatment: String,
  pub outcome: String,
  pub assumptions: Vec<String>,
}

impl CausalQuery {
  pub fn new(
    treatment: impl Into<String>,
    outcome: impl Into<String>,
    assumptions: Vec<String>,
  ) -> Self {
    Self {
      treatment: treatment.into(),
      outcome: outcome.into(),
      assumptions,
    }
  }

  /// A query is only usable when at least one assumption is stated.
  pub fn is_complete(&self) -> bool {
    !self.treatment.is_empty() && !self.outcome.is_empty() && !self.assumptions.is_empty()
  }

  /// Natural-language rendering of the query.
  pub fn question(&self) -> String {
    format!(
      "What is the causal effect of {} on {}?",
      self.treatment, self.outcome
    )
  }
}
