//! Session events and notifiers for observability.
//!
//! Events are emitted as the session moves between steps and applies the
//! stages of simulated actions, so a presentation shell can render progress.

use causeway_config::CausalQuery;
use causeway_workflow::WorkflowStep;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::session::StepStage;

/// Events emitted by a workflow session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
  /// A fresh controller was mounted for a step.
  StepEntered {
    session_id: String,
    step: WorkflowStep,
    generation: u64,
  },

  /// A simulated action was triggered.
  ActionStarted {
    session_id: String,
    step: WorkflowStep,
    generation: u64,
    stages: usize,
  },

  /// One stage of the in-flight action was applied.
  StageApplied {
    session_id: String,
    step: WorkflowStep,
    generation: u64,
    stage: StepStage,
  },

  /// The in-flight action completed its last stage.
  ActionFinished {
    session_id: String,
    step: WorkflowStep,
    generation: u64,
  },

  /// The in-flight action was superseded, cancelled, or failed.
  ActionAbandoned {
    session_id: String,
    step: WorkflowStep,
    generation: u64,
  },

  /// The query step completed and its query was stored.
  QueryStored {
    session_id: String,
    query: CausalQuery,
  },

  /// A decision brief was generated.
  BriefGenerated { session_id: String, brief_id: String },

  /// The workflow went back to the first step.
  Reset { session_id: String },
}

/// Trait for receiving session events.
///
/// The session calls `notify` for each event; implementations decide what to
/// do with them (render, log, forward, ignore).
pub trait SessionNotifier: Send + Sync {
  fn notify(&self, event: SessionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl SessionNotifier for NoopNotifier {
  fn notify(&self, _event: SessionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded: the session must never wait on a slow renderer. Volume is
  // bounded by the number of reveal stages.
  sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
    Self { sender }
  }

  /// A notifier plus the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl SessionNotifier for ChannelNotifier {
  fn notify(&self, event: SessionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_channel_notifier_delivers_in_order() {
    let (notifier, mut receiver) = ChannelNotifier::channel();
    notifier.notify(SessionEvent::Reset {
      session_id: "s".to_string(),
    });
    notifier.notify(SessionEvent::BriefGenerated {
      session_id: "s".to_string(),
      brief_id: "BRIEF-1".to_string(),
    });

    assert!(matches!(receiver.try_recv(), Ok(SessionEvent::Reset { .. })));
    assert!(matches!(
      receiver.try_recv(),
      Ok(SessionEvent::BriefGenerated { brief_id, .. }) if brief_id == "BRIEF-1"
    ));
  }

  #[test]
  fn test_channel_notifier_survives_dropped_receiver() {
    let (notifier, receiver) = ChannelNotifier::channel();
    drop(receiver);
    notifier.notify(SessionEvent::Reset {
      session_id: "s".to_string(),
    });
  }

  #[test]
  fn test_event_serializes_with_tag() {
    let event = SessionEvent::StepEntered {
      session_id: "s".to_string(),
      step: WorkflowStep::Identification,
      generation: 4,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "step_entered");
    assert_eq!(json["step"], 3);
    assert_eq!(json["generation"], 4);
  }
}
