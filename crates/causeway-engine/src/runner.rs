//! Session runner with channel-based commands.
//!
//! The `SessionRunner` owns a [`WorkflowSession`] and an mpsc channel of
//! [`SessionCommand`]s. Triggered actions are not awaited inline: their
//! stages are scheduled with `sleep_until`, so commands keep being served
//! while a reveal is in flight and a navigation command supersedes it.

use causeway_steps::StagedReveal;
use causeway_workflow::WorkflowStep;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::events::{NoopNotifier, SessionNotifier};
use crate::session::{SessionSnapshot, StepStage, Ticket, WorkflowSession};

/// A request from the presentation shell.
#[derive(Debug)]
pub enum SessionCommand {
  /// Start the mounted step's action.
  Trigger,
  /// Advance past the current step if its gate holds.
  Proceed,
  GoTo(WorkflowStep),
  Reset,
  SelectTreatment(String),
  SelectOutcome(String),
  AddAssumption(String),
  RemoveAssumption(usize),
  /// Reply with the current state.
  Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// The reveal currently being played back.
struct InFlight {
  generation: u64,
  reveal: StagedReveal<StepStage>,
  due: Instant,
}

impl InFlight {
  fn start(ticket: Ticket, now: Instant) -> Option<Self> {
    let delay = ticket.reveal.peek()?.delay;
    Some(Self {
      generation: ticket.generation,
      reveal: ticket.reveal,
      due: now + delay,
    })
  }
}

/// A runner that drives a session in response to commands.
///
/// # Usage
///
/// ```ignore
/// let runner = SessionRunner::new(session);
/// let sender = runner.sender();
///
/// let cancel = CancellationToken::new();
/// let handle = tokio::spawn(runner.start(cancel.clone()));
/// sender.send(SessionCommand::Trigger).await?;
/// ```
pub struct SessionRunner<N: SessionNotifier = NoopNotifier> {
  sender: mpsc::Sender<SessionCommand>,
  receiver: mpsc::Receiver<SessionCommand>,
  session: WorkflowSession<N>,
}

impl<N: SessionNotifier> SessionRunner<N> {
  pub fn new(session: WorkflowSession<N>) -> Self {
    Self::with_buffer_size(session, 32)
  }

  pub fn with_buffer_size(session: WorkflowSession<N>, buffer_size: usize) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      session,
    }
  }

  /// Get a sender handle for issuing commands.
  pub fn sender(&self) -> mpsc::Sender<SessionCommand> {
    self.sender.clone()
  }

  /// Send a command through the runner's channel.
  pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
    self
      .sender
      .send(command)
      .await
      .map_err(|_| SessionError::RunnerClosed)
  }

  pub fn session(&self) -> &WorkflowSession<N> {
    &self.session
  }

  /// Run the command loop.
  ///
  /// Returns the session once the token is cancelled or every sender is
  /// dropped. A reveal still in flight at that point is abandoned.
  pub async fn start(self, cancel: CancellationToken) -> WorkflowSession<N> {
    let Self {
      sender,
      mut receiver,
      mut session,
    } = self;
    // Only external senders keep the loop alive.
    drop(sender);

    info!(session_id = %session.id(), "starting session runner");
    let mut in_flight: Option<InFlight> = None;

    loop {
      let due = in_flight.as_ref().map(|flight| flight.due);
      tokio::select! {
          _ = cancel.cancelled() => {
              info!(session_id = %session.id(), "session runner cancelled");
              break;
          }
          command = receiver.recv() => {
              match command {
                  Some(command) => {
                      handle_command(&mut session, command, &mut in_flight);
                  }
                  None => {
                      info!(session_id = %session.id(), "session runner channel closed");
                      break;
                  }
              }
          }
          () = wait_until(due) => {
              play_next(&mut session, &mut in_flight).await;
          }
      }
    }

    if in_flight.take().is_some() {
      session.abandon();
    }
    session
  }
}

async fn wait_until(due: Option<Instant>) {
  match due {
    Some(due) => sleep_until(due).await,
    None => std::future::pending().await,
  }
}

fn handle_command<N: SessionNotifier>(
  session: &mut WorkflowSession<N>,
  command: SessionCommand,
  in_flight: &mut Option<InFlight>,
) {
  debug!(?command, "session command");
  match command {
    SessionCommand::Trigger => {
      if let Some(ticket) = session.trigger() {
        *in_flight = InFlight::start(ticket, Instant::now());
      }
    }
    SessionCommand::Proceed => {
      session.proceed();
    }
    SessionCommand::GoTo(step) => {
      session.go_to(step);
    }
    SessionCommand::Reset => {
      session.reset();
    }
    SessionCommand::SelectTreatment(treatment) => {
      session.select_treatment(&treatment);
    }
    SessionCommand::SelectOutcome(outcome) => {
      session.select_outcome(&outcome);
    }
    SessionCommand::AddAssumption(text) => {
      session.add_assumption(&text);
    }
    SessionCommand::RemoveAssumption(index) => {
      session.remove_assumption(index);
    }
    SessionCommand::Snapshot(reply) => {
      // Requester may have gone away
      let _ = reply.send(session.snapshot());
    }
  }

  // Navigation remounts the step; whatever was in flight is now stale.
  if in_flight
    .as_ref()
    .is_some_and(|flight| flight.generation != session.generation())
  {
    debug!("in-flight reveal superseded");
    *in_flight = None;
  }
}

async fn play_next<N: SessionNotifier>(
  session: &mut WorkflowSession<N>,
  in_flight: &mut Option<InFlight>,
) {
  let Some(flight) = in_flight.as_mut() else {
    return;
  };
  let Some(stage) = flight.reveal.next() else {
    *in_flight = None;
    return;
  };
  let generation = flight.generation;

  if let Err(e) = session.apply(generation, stage.payload).await {
    error!(session_id = %session.id(), error = %e, "action failed");
    *in_flight = None;
    return;
  }

  let now = Instant::now();
  *in_flight = in_flight.take().and_then(|mut flight| {
    let delay = flight.reveal.peek()?.delay;
    flight.due = now + delay;
    Some(flight)
  });
}
