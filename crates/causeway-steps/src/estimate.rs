use causeway_analysis::fixtures::{ESTIMATION_PHASES, ESTIMATOR, MODEL_STAGES};
use causeway_config::{EffectEstimate, Pacing};
use causeway_workflow::{Completion, WorkflowStep};
use serde::Serialize;
use std::time::Duration;

use crate::StepController;
use crate::reveal::StagedReveal;

/// A stage of the estimation progress counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStage {
  /// Set progress to this percentage.
  Tick(u8),
  /// Progress is at 100; fetch the estimate.
  Finish,
}

/// Phase label for a progress percentage.
///
/// `min(floor(progress / 100 * phases), phases - 1)`.
pub fn phase_for(progress: u8) -> &'static str {
  let count = ESTIMATION_PHASES.len();
  let index = (usize::from(progress.min(100)) * count / 100).min(count - 1);
  ESTIMATION_PHASES[index]
}

/// Step 4: run the (simulated) effect estimation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectEstimation {
  calculating: bool,
  progress: u8,
  phase: Option<&'static str>,
  result: Option<EffectEstimate>,
}

impl EffectEstimation {
  pub fn new() -> Self {
    Self::default()
  }

  /// Begin the calculation: ticks from 0 to 100, then the finish stage.
  pub fn begin(&mut self, pacing: &Pacing) -> Option<StagedReveal<EstimateStage>> {
    if self.calculating || self.result.is_some() {
      return None;
    }
    self.calculating = true;
    self.progress = 0;
    self.phase = None;

    let step = usize::from(pacing.estimate_increment());
    let mut reveal = (0..=100u8)
      .step_by(step)
      .fold(StagedReveal::new(), |reveal, progress| {
        reveal.then(pacing.estimate_tick(), EstimateStage::Tick(progress))
      });
    if 100 % step != 0 {
      reveal = reveal.then(pacing.estimate_tick(), EstimateStage::Tick(100));
    }
    Some(reveal.then(Duration::ZERO, EstimateStage::Finish))
  }

  /// Advance the progress counter. It never moves backwards.
  pub fn tick(&mut self, progress: u8) -> bool {
    if !self.calculating || progress < self.progress || progress > 100 {
      return false;
    }
    self.progress = progress;
    self.phase = Some(phase_for(progress));
    true
  }

  /// Attach the estimate once progress has reached 100.
  pub fn finish(&mut self, estimate: EffectEstimate) -> bool {
    if !self.calculating || self.progress < 100 {
      return false;
    }
    self.calculating = false;
    self.result = Some(estimate);
    true
  }

  pub fn progress(&self) -> u8 {
    self.progress
  }

  /// Current phase label, `None` before the first tick.
  pub fn phase(&self) -> Option<&'static str> {
    self.phase
  }

  pub fn estimator(&self) -> &'static str {
    ESTIMATOR
  }

  /// Model stages already passed: stage `i` is lit once progress exceeds
  /// `(i + 1) * 20`.
  pub fn active_models(&self) -> Vec<&'static str> {
    MODEL_STAGES
      .iter()
      .enumerate()
      .filter(|(i, _)| usize::from(self.progress) > (i + 1) * 20)
      .map(|(_, model)| *model)
      .collect()
  }

  pub fn is_calculating(&self) -> bool {
    self.calculating
  }

  pub fn result(&self) -> Option<&EffectEstimate> {
    self.result.as_ref()
  }
}

impl StepController for EffectEstimation {
  const STEP: WorkflowStep = WorkflowStep::Estimation;

  fn completion(&self) -> Option<Completion> {
    self.result.is_some().then_some(Completion::Estimated)
  }

  fn is_busy(&self) -> bool {
    self.calculating
  }
}
