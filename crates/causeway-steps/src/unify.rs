use causeway_config::{DataSource, Pacing};
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;
use tracing::debug;

use crate::StepController;
use crate::reveal::StagedReveal;

/// A stage of the merge reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStage {
  /// Mark the source at this fixture index merged.
  Source(usize),
  /// All sources merged; the merge animation is over.
  Settle,
}

/// Step 1: fold the silo data sources into one context.
#[derive(Debug, Clone, Serialize)]
pub struct UnifyContext {
  sources: Vec<DataSource>,
  merging: bool,
  settled: bool,
}

impl UnifyContext {
  /// Start from the fixture list with every source unmerged.
  pub fn new(sources: &[DataSource]) -> Self {
    Self {
      sources: sources
        .iter()
        .map(|s| DataSource {
          merged: false,
          ..s.clone()
        })
        .collect(),
      merging: false,
      settled: false,
    }
  }

  /// Begin the merge. One source per stage, in fixture order, then a settle.
  pub fn begin_merge(&mut self, pacing: &Pacing) -> Option<StagedReveal<MergeStage>> {
    if self.merging || self.settled || self.is_unified() {
      return None;
    }
    self.merging = true;

    let reveal = (0..self.sources.len())
      .fold(StagedReveal::new(), |reveal, index| {
        reveal.then(pacing.merge_item(), MergeStage::Source(index))
      })
      .then(pacing.merge_settle(), MergeStage::Settle);
    Some(reveal)
  }

  /// Apply one merge stage. Out-of-order or stray stages are ignored.
  pub fn apply(&mut self, stage: MergeStage) -> bool {
    if !self.merging {
      return false;
    }
    match stage {
      MergeStage::Source(index) => {
        if index != self.merged_count() || index >= self.sources.len() {
          debug!(index, "ignoring out-of-order merge stage");
          return false;
        }
        self.sources[index].merged = true;
        debug!(source = %self.sources[index].id, "data source merged");
        true
      }
      MergeStage::Settle => {
        if !self.is_unified() {
          return false;
        }
        self.merging = false;
        self.settled = true;
        true
      }
    }
  }

  pub fn sources(&self) -> &[DataSource] {
    &self.sources
  }

  pub fn merged_count(&self) -> usize {
    self.sources.iter().take_while(|s| s.merged).count()
  }

  pub fn is_merging(&self) -> bool {
    self.merging
  }

  /// Every source is merged.
  pub fn is_unified(&self) -> bool {
    self.sources.iter().all(|s| s.merged)
  }

  /// Sources grouped by silo, silos in order of first appearance.
  pub fn sources_by_silo(&self) -> Vec<(&str, Vec<&DataSource>)> {
    let mut groups: Vec<(&str, Vec<&DataSource>)> = Vec::new();
    for source in &self.sources {
      match groups.iter_mut().find(|(silo, _)| *silo == source.silo) {
        Some((_, members)) => members.push(source),
        None => groups.push((source.silo.as_str(), vec![source])),
      }
    }
    groups
  }
}

impl StepController for UnifyContext {
  const STEP: WorkflowStep = WorkflowStep::UnifyContext;

  fn completion(&self) -> Option<Completion> {
    self.is_unified().then_some(Completion::Unified)
  }

  fn is_busy(&self) -> bool {
    self.merging
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::builtin_fixtures;
  use std::time::Duration;

  fn controller() -> UnifyContext {
    UnifyContext::new(&builtin_fixtures().data_sources)
  }

  #[test]
  fn test_merge_plan_shape() {
    let mut unify = controller();
    let reveal = unify.begin_merge(&Pacing::default()).unwrap();
    let stages: Vec<_> = reveal.collect();

    assert_eq!(stages.len(), 7);
    for (index, stage) in stages.iter().take(6).enumerate() {
      assert_eq!(stage.payload, MergeStage::Source(index));
      assert_eq!(stage.delay, Duration::from_millis(400));
    }
    assert_eq!(stages[6].payload, MergeStage::Settle);
    assert_eq!(stages[6].delay, Duration::from_millis(500));
  }

  #[test]
  fn test_merges_in_fixture_order() {
    let mut unify = controller();
    let reveal = unify.begin_merge(&Pacing::instant()).unwrap();

    for step in reveal {
      if let MergeStage::Source(index) = step.payload {
        assert!(!unify.is_unified());
        assert!(unify.completion().is_none());
        assert!(unify.apply(step.payload));
        assert_eq!(unify.merged_count(), index + 1);
        assert!(unify.sources()[..=index].iter().all(|s| s.merged));
        assert!(unify.sources()[index + 1..].iter().all(|s| !s.merged));
      } else {
        assert!(unify.is_unified());
        assert!(unify.apply(step.payload));
      }
    }

    assert!(unify.is_unified());
    assert!(!unify.is_merging());
    assert_eq!(unify.completion(), Some(Completion::Unified));
  }

  #[test]
  fn test_begin_is_idempotent_while_running() {
    let mut unify = controller();
    assert!(unify.begin_merge(&Pacing::default()).is_some());
    assert!(unify.begin_merge(&Pacing::default()).is_none());
    assert!(unify.is_busy());
  }

  #[test]
  fn test_out_of_order_stage_is_ignored() {
    let mut unify = controller();
    unify.begin_merge(&Pacing::default());
    assert!(!unify.apply(MergeStage::Source(2)));
    assert!(!unify.apply(MergeStage::Settle));
    assert_eq!(unify.merged_count(), 0);
  }

  #[test]
  fn test_stage_without_merge_is_ignored() {
    let mut unify = controller();
    assert!(!unify.apply(MergeStage::Source(0)));
    assert_eq!(unify.merged_count(), 0);
  }

  #[test]
  fn test_new_resets_merged_flags() {
    let mut sources = builtin_fixtures().data_sources;
    sources[0].merged = true;
    let unify = UnifyContext::new(&sources);
    assert_eq!(unify.merged_count(), 0);
  }

  #[test]
  fn test_groups_by_silo() {
    let unify = controller();
    let groups = unify.sources_by_silo();
    let silos: Vec<&str> = groups.iter().map(|(silo, _)| *silo).collect();
    assert_eq!(silos, vec!["product", "finance", "growth", "risk"]);
    assert_eq!(groups[0].1.len(), 2);
  }
}
