use serde::{Deserialize, Serialize};

/// Whether a silo's KPI pulls against the global target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiloStatus {
  Conflict,
  Aligned,
}

/// Icon shown next to a silo card.
///
/// A closed set: renderers match on it instead of looking icons up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiloIcon {
  Box,
  DollarSign,
  TrendingUp,
  Shield,
}

/// A functional team and the KPI it optimizes for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Silo {
  pub id: String,
  pub name: String,
  pub kpi: String,
  pub kpi_value: String,
  pub kpi_target: String,
  pub status: SiloStatus,
  pub icon: SiloIcon,
  pub description: String,
}

/// A data source owned by one silo, waiting to be merged into the unified
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
  pub id: String,
  pub name: String,
  /// Id of the owning [`Silo`].
  pub silo: String,
  #[serde(default)]
  pub merged: bool,
}

/// Role of a variable in the causal DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  Treatment,
  Outcome,
  Confounder,
  Mediator,
}

impl NodeKind {
  pub const ALL: [NodeKind; 4] = [
    NodeKind::Treatment,
    NodeKind::Outcome,
    NodeKind::Confounder,
    NodeKind::Mediator,
  ];

  pub fn label(self) -> &'static str {
    match self {
      NodeKind::Treatment => "Treatment",
      NodeKind::Outcome => "Outcome",
      NodeKind::Confounder => "Confounder",
      NodeKind::Mediator => "Mediator",
    }
  }
}

/// A DAG variable with its layout position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagNode {
  pub id: String,
  pub label: String,
  pub x: f64,
  pub y: f64,
  pub kind: NodeKind,
}

/// A directed edge between two [`DagNode`] ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
  pub from: String,
  pub to: String,
}

impl DagEdge {
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
    }
  }

  /// Identity of the edge, `from-to`.
  pub fn key(&self) -> String {
    format!("{}-{}", self.from, self.to)
  }
}

/// The immutable input data every step controller reads from.
///
/// Loaded once when a session starts and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
  pub silos: Vec<Silo>,
  pub data_sources: Vec<DataSource>,
  pub treatments: Vec<String>,
  pub outcomes: Vec<String>,
  pub dag_nodes: Vec<DagNode>,
  pub dag_edges: Vec<DagEdge>,
}

impl FixtureSet {
  /// Look up a silo by id.
  pub fn silo(&self, id: &str) -> Option<&Silo> {
    self.silos.iter().find(|s| s.id == id)
  }

  /// Look up a DAG node by id.
  pub fn dag_node(&self, id: &str) -> Option<&DagNode> {
    self.dag_nodes.iter().find(|n| n.id == id)
  }

  /// Edges whose endpoints are not declared as nodes.
  pub fn dangling_edges(&self) -> Vec<&DagEdge> {
    self
      .dag_edges
      .iter()
      .filter(|e| self.dag_node(&e.from).is_none() || self.dag_node(&e.to).is_none())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_edge_key() {
    let edge = DagEdge::new("price", "usage");
    assert_eq!(edge.key(), "price-usage");
  }

  #[test]
  fn test_data_source_merged_defaults_to_false() {
    let json = r#"{"id": "ds1", "name": "User Behavior Logs", "silo": "product"}"#;
    let source: DataSource = serde_json::from_str(json).unwrap();
    assert!(!source.merged);
  }

  #[test]
  fn test_node_kind_serialization() {
    let node = DagNode {
      id: "income".to_string(),
      label: "Customer Income".to_string(),
      x: 150.0,
      y: 250.0,
      kind: NodeKind::Confounder,
    };
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["kind"], "confounder");
  }

  #[test]
  fn test_dangling_edges() {
    let fixtures = FixtureSet {
      silos: vec![],
      data_sources: vec![],
      treatments: vec![],
      outcomes: vec![],
      dag_nodes: vec![DagNode {
        id: "price".to_string(),
        label: "Price Change".to_string(),
        x: 0.0,
        y: 0.0,
        kind: NodeKind::Treatment,
      }],
      dag_edges: vec![DagEdge::new("price", "ghost")],
    };
    assert_eq!(fixtures.dangling_edges().len(), 1);
  }
}
