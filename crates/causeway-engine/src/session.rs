//! The workflow session.
//!
//! A `WorkflowSession` pairs the [`WorkflowMachine`] with the controller
//! mounted for the current step. Every transition mounts a fresh controller
//! and bumps the session generation; reveal stages are tagged with the
//! generation they were issued under and are discarded once it is stale.

use std::sync::Arc;

use causeway_analysis::AnalysisProvider;
use causeway_config::{CausalQuery, FixtureSet, SessionConfig};
use causeway_steps::reveal::pause;
use causeway_steps::{
  BriefStage, CausalQueryStep, DecisionBriefStep, EffectEstimation, EstimateStage,
  ExperimentPlanner, IdentificationGating, MergeStage, PlanStage, ScanStage, StagedReveal,
  StepController, UnifyContext,
};
use causeway_workflow::{Completion, Transition, WorkflowMachine, WorkflowStep};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SessionError;
use crate::events::{NoopNotifier, SessionEvent, SessionNotifier};

/// The controller mounted for the current step.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "controller", content = "state", rename_all = "snake_case")]
pub enum ActiveStep {
  Unify(UnifyContext),
  Query(CausalQueryStep),
  Identify(IdentificationGating),
  Estimate(EffectEstimation),
  Plan(ExperimentPlanner),
  Brief(DecisionBriefStep),
}

impl ActiveStep {
  /// A freshly initialized controller for `step`.
  pub fn mount(step: WorkflowStep, fixtures: &FixtureSet) -> Self {
    match step {
      WorkflowStep::UnifyContext => ActiveStep::Unify(UnifyContext::new(&fixtures.data_sources)),
      WorkflowStep::CausalQuery => {
        ActiveStep::Query(CausalQueryStep::new(&fixtures.treatments, &fixtures.outcomes))
      }
      WorkflowStep::Identification => ActiveStep::Identify(IdentificationGating::new(
        &fixtures.dag_nodes,
        &fixtures.dag_edges,
      )),
      WorkflowStep::Estimation => ActiveStep::Estimate(EffectEstimation::new()),
      WorkflowStep::ExperimentPlan => ActiveStep::Plan(ExperimentPlanner::new()),
      WorkflowStep::DecisionBrief => ActiveStep::Brief(DecisionBriefStep::new()),
    }
  }

  pub fn step(&self) -> WorkflowStep {
    match self {
      ActiveStep::Unify(_) => UnifyContext::STEP,
      ActiveStep::Query(_) => CausalQueryStep::STEP,
      ActiveStep::Identify(_) => IdentificationGating::STEP,
      ActiveStep::Estimate(_) => EffectEstimation::STEP,
      ActiveStep::Plan(_) => ExperimentPlanner::STEP,
      ActiveStep::Brief(_) => DecisionBriefStep::STEP,
    }
  }

  pub fn completion(&self) -> Option<Completion> {
    match self {
      ActiveStep::Unify(c) => c.completion(),
      ActiveStep::Query(c) => c.completion(),
      ActiveStep::Identify(c) => c.completion(),
      ActiveStep::Estimate(c) => c.completion(),
      ActiveStep::Plan(c) => c.completion(),
      ActiveStep::Brief(c) => c.completion(),
    }
  }

  pub fn is_busy(&self) -> bool {
    match self {
      ActiveStep::Unify(c) => c.is_busy(),
      ActiveStep::Query(c) => c.is_busy(),
      ActiveStep::Identify(c) => c.is_busy(),
      ActiveStep::Estimate(c) => c.is_busy(),
      ActiveStep::Plan(c) => c.is_busy(),
      ActiveStep::Brief(c) => c.is_busy(),
    }
  }
}

/// A stage of whichever action the mounted controller is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "stage", rename_all = "snake_case")]
pub enum StepStage {
  Merge(MergeStage),
  Scan(ScanStage),
  Estimate(EstimateStage),
  Plan(PlanStage),
  Brief(BriefStage),
}

/// A triggered action: its stages and the generation they belong to.
#[derive(Debug, Clone)]
pub struct Ticket {
  pub generation: u64,
  pub step: WorkflowStep,
  pub reveal: StagedReveal<StepStage>,
}

/// Serializable view of a session for presentation shells.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
  pub session_id: String,
  pub step: WorkflowStep,
  pub heading: &'static str,
  pub generation: u64,
  pub progress: f64,
  pub busy: bool,
  pub can_proceed: bool,
  pub query: Option<CausalQuery>,
  pub active: ActiveStep,
}

/// The state machine plus the controller mounted for its current step.
///
/// Generic over `N: SessionNotifier`; defaults to discarding events.
pub struct WorkflowSession<N: SessionNotifier = NoopNotifier> {
  id: String,
  machine: WorkflowMachine,
  active: ActiveStep,
  generation: u64,
  fixtures: Arc<FixtureSet>,
  provider: Arc<dyn AnalysisProvider>,
  config: SessionConfig,
  notifier: N,
}

impl<N: SessionNotifier> WorkflowSession<N> {
  /// Start a session at the first step.
  pub fn new(
    fixtures: Arc<FixtureSet>,
    provider: Arc<dyn AnalysisProvider>,
    config: SessionConfig,
    notifier: N,
  ) -> Self {
    let machine = WorkflowMachine::new();
    let active = ActiveStep::mount(machine.current_step(), &fixtures);
    let session = Self {
      id: uuid::Uuid::new_v4().to_string(),
      machine,
      active,
      generation: 0,
      fixtures,
      provider,
      config,
      notifier,
    };
    session.notifier.notify(SessionEvent::StepEntered {
      session_id: session.id.clone(),
      step: session.current_step(),
      generation: session.generation,
    });
    session
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn current_step(&self) -> WorkflowStep {
    self.machine.current_step()
  }

  /// The stored query, once step 2 has completed.
  pub fn query(&self) -> Option<&CausalQuery> {
    self.machine.query()
  }

  pub fn machine(&self) -> &WorkflowMachine {
    &self.machine
  }

  /// The controller mounted for the current step.
  pub fn active(&self) -> &ActiveStep {
    &self.active
  }

  /// Bumped every time a controller is mounted or an action is abandoned.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn fixtures(&self) -> &FixtureSet {
    &self.fixtures
  }

  pub fn config(&self) -> &SessionConfig {
    &self.config
  }

  /// Revisit a step that was already reached.
  pub fn go_to(&mut self, step: WorkflowStep) -> Transition {
    let transition = self.machine.go_to(step);
    if transition.is_moved() {
      self.remount();
    }
    transition
  }

  /// Back to step 1, clearing the stored query.
  pub fn reset(&mut self) -> Transition {
    let transition = self.machine.reset();
    self.notifier.notify(SessionEvent::Reset {
      session_id: self.id.clone(),
    });
    self.remount();
    transition
  }

  /// Advance past the current step if its controller's gate holds.
  pub fn proceed(&mut self) -> Transition {
    let Some(completion) = self.active.completion() else {
      debug!(step = self.current_step().number(), "step not complete");
      return Transition::Unchanged;
    };

    let transition = self.machine.advance(completion);
    if let Transition::Moved { from, .. } = transition {
      if from == WorkflowStep::CausalQuery
        && let Some(query) = self.machine.query()
      {
        self.notifier.notify(SessionEvent::QueryStored {
          session_id: self.id.clone(),
          query: query.clone(),
        });
      }
      self.remount();
    }
    transition
  }

  /// Start the mounted controller's action.
  ///
  /// Returns `None` when the step has no action or its trigger is disabled
  /// (already running or already finished).
  pub fn trigger(&mut self) -> Option<Ticket> {
    let pacing = self.config.pacing;
    let reveal = match &mut self.active {
      ActiveStep::Unify(c) => c.begin_merge(&pacing)?.map_payload(StepStage::Merge),
      ActiveStep::Query(_) => return None,
      ActiveStep::Identify(c) => c.begin_scan(&pacing)?.map_payload(StepStage::Scan),
      ActiveStep::Estimate(c) => c.begin(&pacing)?.map_payload(StepStage::Estimate),
      ActiveStep::Plan(c) => c.begin_plan()?.map_payload(StepStage::Plan),
      ActiveStep::Brief(c) => c.begin(&pacing)?.map_payload(StepStage::Brief),
    };

    let step = self.current_step();
    info!(
      session_id = %self.id,
      step = step.number(),
      stages = reveal.len(),
      duration_ms = reveal.remaining_time().as_millis() as u64,
      "action started"
    );
    self.notifier.notify(SessionEvent::ActionStarted {
      session_id: self.id.clone(),
      step,
      generation: self.generation,
      stages: reveal.len(),
    });

    Some(Ticket {
      generation: self.generation,
      step,
      reveal,
    })
  }

  /// Apply one stage issued under `generation`.
  ///
  /// Stale or mismatched stages are ignored and reported as `Ok(false)`.
  /// A provider failure abandons the action and remounts the step.
  pub async fn apply(&mut self, generation: u64, stage: StepStage) -> Result<bool, SessionError> {
    if generation != self.generation {
      debug!(
        stage_generation = generation,
        generation = self.generation,
        "discarding stale stage"
      );
      return Ok(false);
    }

    let applied = match self.apply_stage(stage).await {
      Ok(applied) => applied,
      Err(e) => {
        warn!(session_id = %self.id, error = %e, "action failed");
        self.abandon();
        return Err(e);
      }
    };
    if !applied {
      return Ok(false);
    }

    let step = self.current_step();
    self.notifier.notify(SessionEvent::StageApplied {
      session_id: self.id.clone(),
      step,
      generation,
      stage,
    });
    if !self.active.is_busy() {
      info!(session_id = %self.id, step = step.number(), "action finished");
      self.notifier.notify(SessionEvent::ActionFinished {
        session_id: self.id.clone(),
        step,
        generation,
      });
    }
    Ok(true)
  }

  async fn apply_stage(&mut self, stage: StepStage) -> Result<bool, SessionError> {
    let applied = match (&mut self.active, stage) {
      (ActiveStep::Unify(c), StepStage::Merge(stage)) => c.apply(stage),
      (ActiveStep::Identify(c), StepStage::Scan(ScanStage::Edge(index))) => c.reveal_edge(index),
      (ActiveStep::Identify(c), StepStage::Scan(ScanStage::Resolve)) => {
        if !c.is_scanning() {
          return Ok(false);
        }
        let result = self.provider.identify(c.nodes(), c.edges()).await?;
        c.resolve(result)
      }
      (ActiveStep::Estimate(c), StepStage::Estimate(EstimateStage::Tick(progress))) => {
        c.tick(progress)
      }
      (ActiveStep::Estimate(c), StepStage::Estimate(EstimateStage::Finish)) => {
        if !c.is_calculating() {
          return Ok(false);
        }
        let estimate = self.provider.estimate_effect(self.machine.query()).await?;
        c.finish(estimate)
      }
      (ActiveStep::Plan(c), StepStage::Plan(PlanStage::Reveal)) => {
        if !c.is_busy() {
          return Ok(false);
        }
        let plan = self.provider.plan_experiment().await?;
        c.reveal(plan)
      }
      (ActiveStep::Brief(c), StepStage::Brief(BriefStage::Generate)) => {
        if !c.is_generating() {
          return Ok(false);
        }
        let brief = self.provider.decision_brief().await?;
        let brief_id = brief.id.clone();
        let stored = c.store(brief);
        if stored {
          info!(session_id = %self.id, brief_id = %brief_id, "decision brief generated");
          self.notifier.notify(SessionEvent::BriefGenerated {
            session_id: self.id.clone(),
            brief_id,
          });
        }
        stored
      }
      (active, stage) => {
        debug!(step = active.step().number(), ?stage, "stage does not match mounted step");
        false
      }
    };
    Ok(applied)
  }

  /// Trigger the mounted controller's action and drive it to the end.
  ///
  /// Returns `Ok(false)` if there was nothing to trigger. Cancelling the
  /// token abandons the action and remounts the step.
  #[instrument(skip_all, fields(session_id = %self.id, step = self.current_step().number()))]
  pub async fn run_action(&mut self, cancel: &CancellationToken) -> Result<bool, SessionError> {
    let Some(ticket) = self.trigger() else {
      return Ok(false);
    };

    for stage in ticket.reveal {
      if pause(stage.delay, cancel).await.is_err() {
        info!("action cancelled");
        self.abandon();
        return Err(SessionError::Cancelled);
      }
      self.apply(ticket.generation, stage.payload).await?;
    }
    Ok(true)
  }

  /// Drop an in-flight action, leaving the step freshly mounted.
  pub fn abandon(&mut self) {
    self.remount();
  }

  /// Serializable view of the current state.
  pub fn snapshot(&self) -> SessionSnapshot {
    let step = self.current_step();
    SessionSnapshot {
      session_id: self.id.clone(),
      step,
      heading: step.info().heading,
      generation: self.generation,
      progress: self.machine.progress_fraction(),
      busy: self.active.is_busy(),
      can_proceed: self.active.completion().is_some(),
      query: self.machine.query().cloned(),
      active: self.active.clone(),
    }
  }

  pub fn select_treatment(&mut self, treatment: &str) -> bool {
    self
      .query_step_mut()
      .is_some_and(|c| c.select_treatment(treatment))
  }

  pub fn select_outcome(&mut self, outcome: &str) -> bool {
    self
      .query_step_mut()
      .is_some_and(|c| c.select_outcome(outcome))
  }

  pub fn add_assumption(&mut self, text: &str) -> bool {
    self.query_step_mut().is_some_and(|c| c.add_assumption(text))
  }

  pub fn remove_assumption(&mut self, index: usize) -> bool {
    self
      .query_step_mut()
      .is_some_and(|c| c.remove_assumption(index))
  }

  fn query_step_mut(&mut self) -> Option<&mut CausalQueryStep> {
    match &mut self.active {
      ActiveStep::Query(c) => Some(c),
      _ => None,
    }
  }

  fn remount(&mut self) {
    if self.active.is_busy() {
      info!(
        session_id = %self.id,
        step = self.active.step().number(),
        "in-flight action abandoned"
      );
      self.notifier.notify(SessionEvent::ActionAbandoned {
        session_id: self.id.clone(),
        step: self.active.step(),
        generation: self.generation,
      });
    }

    self.generation += 1;
    self.active = ActiveStep::mount(self.current_step(), &self.fixtures);
    self.notifier.notify(SessionEvent::StepEntered {
      session_id: self.id.clone(),
      step: self.current_step(),
      generation: self.generation,
    });
  }
}
