use std::collections::BTreeSet;

use causeway_config::{DagEdge, DagNode, IdentificationResult, NodeKind, Pacing};
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;
use tracing::debug;

use crate::StepController;
use crate::reveal::StagedReveal;

/// A stage of the identification scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
  /// Mark the edge at this fixture index identified.
  Edge(usize),
  /// Every edge is identified; fetch the identification result.
  Resolve,
}

/// Step 3: scan the DAG and report backdoor paths.
///
/// Edges are revealed in fixture list order. The backdoor paths are whatever
/// the analysis provider returns, not derived here.
#[derive(Debug, Clone, Serialize)]
pub struct IdentificationGating {
  nodes: Vec<DagNode>,
  edges: Vec<DagEdge>,
  identified: BTreeSet<String>,
  scanning: bool,
  result: Option<IdentificationResult>,
}

impl IdentificationGating {
  pub fn new(nodes: &[DagNode], edges: &[DagEdge]) -> Self {
    Self {
      nodes: nodes.to_vec(),
      edges: edges.to_vec(),
      identified: BTreeSet::new(),
      scanning: false,
      result: None,
    }
  }

  /// Begin the scan: one edge per stage, then the resolve stage.
  pub fn begin_scan(&mut self, pacing: &Pacing) -> Option<StagedReveal<ScanStage>> {
    if self.scanning || self.result.is_some() {
      return None;
    }
    self.scanning = true;
    self.identified.clear();

    let reveal = (0..self.edges.len())
      .fold(StagedReveal::new(), |reveal, index| {
        reveal.then(pacing.scan_edge(), ScanStage::Edge(index))
      })
      .then(pacing.scan_settle(), ScanStage::Resolve);
    Some(reveal)
  }

  /// Mark one edge identified. Returns false if nothing changed.
  pub fn reveal_edge(&mut self, index: usize) -> bool {
    if !self.scanning {
      return false;
    }
    let Some(edge) = self.edges.get(index) else {
      return false;
    };
    let inserted = self.identified.insert(edge.key());
    if inserted {
      debug!(edge = %edge.key(), "edge identified");
    }
    inserted
  }

  /// Attach the identification result and end the scan.
  pub fn resolve(&mut self, result: IdentificationResult) -> bool {
    if !self.scanning || self.identified != self.edge_keys() {
      return false;
    }
    self.scanning = false;
    self.result = Some(result);
    true
  }

  pub fn nodes(&self) -> &[DagNode] {
    &self.nodes
  }

  pub fn edges(&self) -> &[DagEdge] {
    &self.edges
  }

  pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &DagNode> {
    self.nodes.iter().filter(move |n| n.kind == kind)
  }

  pub fn identified_edges(&self) -> &BTreeSet<String> {
    &self.identified
  }

  pub fn is_identified(&self, edge: &DagEdge) -> bool {
    self.identified.contains(&edge.key())
  }

  pub fn is_scanning(&self) -> bool {
    self.scanning
  }

  pub fn is_scanned(&self) -> bool {
    self.result.is_some()
  }

  /// Empty until the scan has finished.
  pub fn backdoor_paths(&self) -> &[String] {
    self
      .result
      .as_ref()
      .map(|r| r.backdoor_paths.as_slice())
      .unwrap_or(&[])
  }

  pub fn result(&self) -> Option<&IdentificationResult> {
    self.result.as_ref()
  }

  fn edge_keys(&self) -> BTreeSet<String> {
    self.edges.iter().map(DagEdge::key).collect()
  }
}

impl StepController for IdentificationGating {
  const STEP: WorkflowStep = WorkflowStep::Identification;

  fn completion(&self) -> Option<Completion> {
    self.is_scanned().then_some(Completion::Identified)
  }

  fn is_busy(&self) -> bool {
    self.scanning
  }
}
