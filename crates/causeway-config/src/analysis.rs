//! Results handed out by an analysis provider.

use serde::{Deserialize, Serialize};

/// Outcome of the identification scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationResult {
  /// Human-readable backdoor paths, e.g. `Income → Price → Usage → Retention`.
  pub backdoor_paths: Vec<String>,
  /// Variables to adjust for.
  pub adjustment_set: Vec<String>,
  pub method: String,
  pub identifiable: bool,
}

/// A point estimate of the average treatment effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEstimate {
  /// Average treatment effect, in percentage points.
  pub ate: f64,
  /// 95% confidence interval (lower, upper).
  pub ci: (f64, f64),
  pub p_value: f64,
  pub samples: u64,
}

impl EffectEstimate {
  pub fn is_significant(&self, alpha: f64) -> bool {
    self.p_value < alpha
  }

  /// Half the width of the confidence interval.
  pub fn margin(&self) -> f64 {
    (self.ci.1 - self.ci.0) / 2.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
  High,
  Medium,
}

/// A variable whose coverage must be raised before the experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequirement {
  pub variable: String,
  /// Current coverage, percent.
  pub current_coverage: f64,
  /// Required coverage, percent.
  pub required_coverage: f64,
  pub priority: Priority,
  pub source: String,
}

impl DataRequirement {
  /// Coverage is below 70% of what is required.
  pub fn is_critical(&self) -> bool {
    self.current_coverage < self.required_coverage * 0.7
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentGroup {
  pub name: String,
  pub size: String,
  pub treatment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentDesign {
  pub kind: String,
  pub duration: String,
  pub sample_size: String,
  pub groups: Vec<ExperimentGroup>,
  pub stratification: Vec<String>,
}

/// Data-collection requirements plus the validating experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
  /// Why more data is needed before deployment.
  pub rationale: String,
  pub requirements: Vec<DataRequirement>,
  pub design: ExperimentDesign,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn requirement(current: f64, required: f64) -> DataRequirement {
    DataRequirement {
      variable: "Income Bracket".to_string(),
      current_coverage: current,
      required_coverage: required,
      priority: Priority::Medium,
      source: "Third-party Enrichment".to_string(),
    }
  }

  #[test]
  fn test_requirement_criticality() {
    assert!(requirement(45.0, 70.0).is_critical());
    assert!(requirement(0.0, 80.0).is_critical());
    assert!(!requirement(89.0, 95.0).is_critical());
    assert!(!requirement(67.0, 95.0).is_critical());
  }

  #[test]
  fn test_estimate_margin_and_significance() {
    let estimate = EffectEstimate {
      ate: -4.2,
      ci: (-6.1, -2.3),
      p_value: 0.002,
      samples: 12847,
    };
    assert!((estimate.margin() - 1.9).abs() < 1e-9);
    assert!(estimate.is_significant(0.01));
    assert!(!estimate.is_significant(0.001));
  }

  #[test]
  fn test_priority_serialization() {
    assert_eq!(serde_json::to_value(Priority::High).unwrap(), "HIGH");
  }
}
