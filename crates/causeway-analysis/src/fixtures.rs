//! Built-in mock data.
//!
//! The numbers here are pre-authored, not derived from the DAG or from any
//! data. They are what [`FixtureProvider`](crate::FixtureProvider) serves.

use causeway_config::{
  BriefAssumption, CausalQuery, DagEdge, DagNode, DataRequirement, DataSource, DecisionBrief,
  EffectEstimate, ExperimentDesign, ExperimentGroup, ExperimentPlan, FixtureSet,
  IdentificationResult, ImpactEstimate, MonitoringItem, NodeKind, Priority, Silo, SiloIcon,
  SiloStatus,
};
use chrono::{DateTime, Utc};

/// Assumptions a new causal query starts with.
pub const DEFAULT_ASSUMPTIONS: [&str; 2] = ["No unmeasured confounders", "Treatment is well-defined"];

/// Phase labels shown while the estimate is being "computed", in order.
pub const ESTIMATION_PHASES: [&str; 7] = [
  "Initializing causal engine...",
  "Loading unified context...",
  "Applying backdoor adjustment...",
  "Bootstrap resampling (1000 iterations)...",
  "Computing confidence intervals...",
  "Validating assumptions...",
  "Finalizing estimates...",
];

/// Model stages lit up as estimation progresses.
pub const MODEL_STAGES: [&str; 4] = ["Bootstrap", "Propensity", "Outcome", "Doubly Robust"];

pub const ESTIMATOR: &str = "Doubly Robust Estimator with Bootstrap Confidence Intervals";

fn silo(
  id: &str,
  name: &str,
  kpi: &str,
  kpi_value: &str,
  kpi_target: &str,
  icon: SiloIcon,
  description: &str,
) -> Silo {
  Silo {
    id: id.to_string(),
    name: name.to_string(),
    kpi: kpi.to_string(),
    kpi_value: kpi_value.to_string(),
    kpi_target: kpi_target.to_string(),
    status: SiloStatus::Conflict,
    icon,
    description: description.to_string(),
  }
}

fn source(id: &str, name: &str, silo: &str) -> DataSource {
  DataSource {
    id: id.to_string(),
    name: name.to_string(),
    silo: silo.to_string(),
    merged: false,
  }
}

fn node(id: &str, label: &str, x: f64, y: f64, kind: NodeKind) -> DagNode {
  DagNode {
    id: id.to_string(),
    label: label.to_string(),
    x,
    y,
    kind,
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// The price-increase scenario: four conflicting silos, six data sources and
/// a six-node DAG.
pub fn builtin_fixtures() -> FixtureSet {
  FixtureSet {
    silos: vec![
      silo(
        "product",
        "Product",
        "Feature Adoption Rate",
        "23%",
        "40%",
        SiloIcon::Box,
        "Pushing aggressive feature rollouts to boost engagement",
      ),
      silo(
        "finance",
        "Finance",
        "Gross Margin",
        "18%",
        "25%",
        SiloIcon::DollarSign,
        "Recommending price increase to improve margins",
      ),
      silo(
        "growth",
        "Growth",
        "Customer Acquisition Cost",
        "$142",
        "$95",
        SiloIcon::TrendingUp,
        "Scaling paid channels despite rising costs",
      ),
      silo(
        "risk",
        "Risk",
        "Churn Probability",
        "34%",
        "15%",
        SiloIcon::Shield,
        "Flagging unsustainable growth patterns",
      ),
    ],
    data_sources: vec![
      source("ds1", "User Behavior Logs", "product"),
      source("ds2", "Pricing Database", "finance"),
      source("ds3", "Marketing Spend", "growth"),
      source("ds4", "Churn Predictions", "risk"),
      source("ds5", "Customer Segments", "product"),
      source("ds6", "Revenue Pipeline", "finance"),
    ],
    treatments: strings(&[
      "Price Increase (+15%)",
      "Feature Rollout (Premium Tier)",
      "Marketing Spend Cut (-30%)",
      "Retention Campaign Launch",
      "Product Bundle Offer",
    ]),
    outcomes: strings(&[
      "Customer Retention (90-day)",
      "Monthly Revenue",
      "Customer Lifetime Value",
      "Net Promoter Score",
      "Churn Rate",
    ]),
    dag_nodes: vec![
      node("price", "Price Change", 50.0, 150.0, NodeKind::Treatment),
      node("retention", "Retention", 450.0, 150.0, NodeKind::Outcome),
      node(
        "satisfaction",
        "Customer Satisfaction",
        250.0,
        50.0,
        NodeKind::Confounder,
      ),
      node("usage", "Product Usage", 250.0, 150.0, NodeKind::Mediator),
      node("income", "Customer Income", 150.0, 250.0, NodeKind::Confounder),
      node(
        "competition",
        "Competitor Pricing",
        350.0,
        250.0,
        NodeKind::Confounder,
      ),
    ],
    dag_edges: vec![
      DagEdge::new("price", "usage"),
      DagEdge::new("usage", "retention"),
      DagEdge::new("satisfaction", "price"),
      DagEdge::new("satisfaction", "retention"),
      DagEdge::new("income", "price"),
      DagEdge::new("income", "retention"),
      DagEdge::new("competition", "retention"),
    ],
  }
}

pub fn identification_result() -> IdentificationResult {
  IdentificationResult {
    backdoor_paths: strings(&[
      "Satisfaction → Price → Usage → Retention",
      "Income → Price → Usage → Retention",
    ]),
    adjustment_set: strings(&["Customer Income", "Satisfaction"]),
    method: "Backdoor Adjustment".to_string(),
    identifiable: true,
  }
}

pub fn effect_estimate() -> EffectEstimate {
  EffectEstimate {
    ate: -4.2,
    ci: (-6.1, -2.3),
    p_value: 0.002,
    samples: 12847,
  }
}

fn requirement(
  variable: &str,
  current_coverage: f64,
  required_coverage: f64,
  priority: Priority,
  source: &str,
) -> DataRequirement {
  DataRequirement {
    variable: variable.to_string(),
    current_coverage,
    required_coverage,
    priority,
    source: source.to_string(),
  }
}

pub fn experiment_plan() -> ExperimentPlan {
  ExperimentPlan {
    rationale: "The estimated effect has a wide confidence interval (±1.9pp). \
                Additional data collection is recommended before full deployment."
      .to_string(),
    requirements: vec![
      requirement(
        "Customer Satisfaction Score",
        67.0,
        95.0,
        Priority::High,
        "Survey Integration",
      ),
      requirement(
        "Competitor Price Index",
        0.0,
        80.0,
        Priority::High,
        "Market API",
      ),
      requirement(
        "Usage Frequency (Daily)",
        89.0,
        95.0,
        Priority::Medium,
        "Product Analytics",
      ),
      requirement(
        "Income Bracket",
        45.0,
        70.0,
        Priority::Medium,
        "Third-party Enrichment",
      ),
    ],
    design: ExperimentDesign {
      kind: "A/B Test with Stratified Randomization".to_string(),
      duration: "6 weeks".to_string(),
      sample_size: "2,500 customers".to_string(),
      groups: vec![
        ExperimentGroup {
          name: "Control".to_string(),
          size: "50%".to_string(),
          treatment: "Current pricing".to_string(),
        },
        ExperimentGroup {
          name: "Treatment".to_string(),
          size: "50%".to_string(),
          treatment: "+15% price increase".to_string(),
        },
      ],
      stratification: strings(&["Customer tenure", "Usage tier", "Geographic region"]),
    },
  }
}

fn impact(metric: &str, baseline: f64, projected: f64, confidence: u8) -> ImpactEstimate {
  ImpactEstimate {
    metric: metric.to_string(),
    baseline,
    projected,
    confidence,
  }
}

fn monitor(metric: &str, frequency: &str, threshold: &str) -> MonitoringItem {
  MonitoringItem {
    metric: metric.to_string(),
    frequency: frequency.to_string(),
    threshold: threshold.to_string(),
  }
}

fn assumption(text: &str, verified: bool) -> BriefAssumption {
  BriefAssumption {
    text: text.to_string(),
    verified,
  }
}

/// The brief template stamped with an id and generation time.
pub fn decision_brief(id: String, timestamp: DateTime<Utc>) -> DecisionBrief {
  DecisionBrief {
    id,
    timestamp,
    query: CausalQuery::new(
      "Price Increase (+15%)",
      "Customer Retention (90-day)",
      strings(&[
        "Customer income distribution is measurable",
        "No unmeasured confounders between price and satisfaction",
        "Competitor pricing is stable during evaluation period",
      ]),
    ),
    assumptions: vec![
      assumption("SUTVA: No interference between customer units", true),
      assumption("Positivity: All customer segments have price variation", true),
      assumption("Consistency: Price treatment is well-defined", true),
      assumption("No unmeasured confounding via satisfaction pathway", false),
    ],
    estimated_impact: vec![
      impact("Retention Rate", 72.3, 68.1, 85),
      impact("Revenue per Customer", 89.50, 98.40, 92),
      impact("Net Revenue Impact", 0.0, 142000.0, 78),
    ],
    monitoring_plan: vec![
      monitor("Daily Churn Rate", "Daily", ">1.2% triggers alert"),
      monitor("Customer Complaints", "Weekly", ">15% increase"),
      monitor("Competitor Response", "Bi-weekly", "Price match detected"),
    ],
    recommendation: "PROCEED WITH CAUTION: Estimated +$142K net revenue impact, but retention \
                     drop of 4.2pp requires active monitoring. Recommend A/B test on 20% of \
                     customer base before full rollout."
      .to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_fixture_shape() {
    let fixtures = builtin_fixtures();
    assert_eq!(fixtures.silos.len(), 4);
    assert_eq!(fixtures.data_sources.len(), 6);
    assert!(fixtures.data_sources.iter().all(|s| !s.merged));
    assert_eq!(fixtures.treatments.len(), 5);
    assert_eq!(fixtures.outcomes.len(), 5);
    assert_eq!(fixtures.dag_nodes.len(), 6);
    assert_eq!(fixtures.dag_edges.len(), 7);
    assert!(fixtures.dangling_edges().is_empty());
  }

  #[test]
  fn test_every_source_belongs_to_a_silo() {
    let fixtures = builtin_fixtures();
    for source in &fixtures.data_sources {
      assert!(fixtures.silo(&source.silo).is_some(), "{}", source.id);
    }
  }

  #[test]
  fn test_identification_has_two_paths() {
    let result = identification_result();
    assert_eq!(result.backdoor_paths.len(), 2);
    assert!(result.identifiable);
  }

  #[test]
  fn test_brief_recommendation_text() {
    let brief = decision_brief("BRIEF-1".to_string(), Utc::now());
    assert!(brief.recommendation.starts_with("PROCEED WITH CAUTION"));
    assert!(brief.recommendation.contains("retention drop of 4.2pp"));
    assert_eq!(brief.unverified_assumptions().count(), 1);
  }
}
