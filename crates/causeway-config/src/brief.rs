use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::CausalQuery;

/// A causal assumption and whether it has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefAssumption {
  pub text: String,
  pub verified: bool,
}

/// Baseline versus projected value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
  pub metric: String,
  pub baseline: f64,
  pub projected: f64,
  /// Confidence, percent.
  pub confidence: u8,
}

impl ImpactEstimate {
  pub fn delta(&self) -> f64 {
    self.projected - self.baseline
  }

  pub fn is_decline(&self) -> bool {
    self.projected < self.baseline
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringItem {
  pub metric: String,
  pub frequency: String,
  pub threshold: String,
}

/// The auditable decision document produced by the final step.
///
/// Immutable once generated; regenerating yields a whole new brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionBrief {
  pub id: String,
  pub timestamp: DateTime<Utc>,
  pub query: CausalQuery,
  pub assumptions: Vec<BriefAssumption>,
  pub estimated_impact: Vec<ImpactEstimate>,
  pub monitoring_plan: Vec<MonitoringItem>,
  pub recommendation: String,
}

impl DecisionBrief {
  /// Assumptions that still need a sensitivity analysis.
  pub fn unverified_assumptions(&self) -> impl Iterator<Item = &BriefAssumption> {
    self.assumptions.iter().filter(|a| !a.verified)
  }

  /// True when both briefs carry the same findings, ignoring identity and
  /// generation time.
  pub fn same_content(&self, other: &DecisionBrief) -> bool {
    self.query == other.query
      && self.assumptions == other.assumptions
      && self.estimated_impact == other.estimated_impact
      && self.monitoring_plan == other.monitoring_plan
      && self.recommendation == other.recommendation
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_impact_delta() {
    let impact = ImpactEstimate {
      metric: "Retention Rate".to_string(),
      baseline: 72.3,
      projected: 68.1,
      confidence: 85,
    };
    assert!(impact.is_decline());
    assert!((impact.delta() + 4.2).abs() < 1e-9);
  }
}
