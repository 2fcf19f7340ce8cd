//! Causeway Engine
//!
//! Drives the six-step causal analysis workflow for a presentation shell.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SessionRunner                          │
//! │  - owns mpsc channel of SessionCommands                     │
//! │  - schedules reveal stages with sleep_until                 │
//! │  - start(cancel) runs the command loop                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WorkflowSession                          │
//! │  - WorkflowMachine (current step, stored query)             │
//! │  - controller mounted for the current step                  │
//! │  - generation: stale stages are discarded                   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AnalysisProvider                         │
//! │  - identification, estimate, plan, decision brief           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use causeway_analysis::{FixtureProvider, builtin_fixtures};
//! use causeway_engine::{NoopNotifier, WorkflowSession};
//!
//! let mut session = WorkflowSession::new(
//!   Arc::new(builtin_fixtures()),
//!   Arc::new(FixtureProvider::new()),
//!   SessionConfig::default(),
//!   NoopNotifier,
//! );
//! session.run_action(&CancellationToken::new()).await?;
//! session.proceed();
//! ```

mod error;
mod events;
mod runner;
mod session;

pub use error::SessionError;
pub use events::{ChannelNotifier, NoopNotifier, SessionEvent, SessionNotifier};
pub use runner::{SessionCommand, SessionRunner};
pub use session::{ActiveStep, SessionSnapshot, StepStage, Ticket, WorkflowSession};
