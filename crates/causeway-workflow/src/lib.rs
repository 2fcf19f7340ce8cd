//! Causeway Workflow
//!
//! The linear six-step state machine that sequences a causal analysis:
//!
//! ```text
//! 1 Unify Context → 2 Causal Query → 3 Identification
//!   → 4 Estimation → 5 Experiment Plan → 6 Decision Brief
//! ```
//!
//! The machine owns only the active [`WorkflowStep`] and the finalized
//! [`CausalQuery`](causeway_config::CausalQuery). Step-local state lives in the
//! step controllers; they report back with a [`Completion`].
//!
//! Invalid requests (advancing past the last step, jumping ahead, completing
//! the wrong step) are ignored and reported as [`Transition::Unchanged`].

mod completion;
mod error;
mod machine;
mod step;

pub use completion::Completion;
pub use error::WorkflowError;
pub use machine::{Transition, WorkflowMachine};
pub use step::{StepInfo, WorkflowStep};
