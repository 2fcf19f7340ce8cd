//! Step controllers for the Causeway workflow.
//!
//! Each controller owns the interactive state of one workflow step and exposes
//! its completion gate through [`StepController::completion`]. Controllers are
//! plain synchronous state: the simulated long-running actions (merge, scan,
//! calculate, generate) are described as a [`StagedReveal`] of stages that a
//! driver applies back to the controller at the reveal's cadence.
//!
//! ```text
//! controller.begin_*()  ──►  StagedReveal<Stage>
//!                                 │  (driver waits each step's delay)
//!                                 ▼
//! controller.apply(stage) / reveal_edge / tick / store ...
//! ```
//!
//! A `begin_*` call returns `None` while an action is already running or has
//! finished, which is how the trigger is disabled.

mod brief;
mod estimate;
mod identify;
mod plan;
mod query;
pub mod reveal;
mod unify;

use causeway_workflow::{Completion, WorkflowStep};

pub use brief::{BriefStage, DecisionBriefStep};
pub use estimate::{EffectEstimation, EstimateStage, phase_for};
pub use identify::{IdentificationGating, ScanStage};
pub use plan::{ExperimentPlanner, PlanStage};
pub use query::CausalQueryStep;
pub use reveal::{Cancelled, RevealStep, StagedReveal};
pub use unify::{MergeStage, UnifyContext};

/// Contract shared by all step controllers.
pub trait StepController {
  /// The workflow step this controller drives.
  const STEP: WorkflowStep;

  /// The completion signal, once the step's gate holds.
  fn completion(&self) -> Option<Completion>;

  /// A simulated action is in flight.
  fn is_busy(&self) -> bool;
}
