use causeway_analysis::AnalysisError;
use thiserror::Error;

/// Errors that can occur while driving a workflow session.
#[derive(Debug, Error)]
pub enum SessionError {
  /// The in-flight action was cancelled before it finished.
  #[error("action cancelled")]
  Cancelled,

  /// The analysis provider could not produce a result.
  #[error("analysis failed: {0}")]
  Analysis(#[from] AnalysisError),

  /// The session runner is no longer accepting commands.
  #[error("session runner closed")]
  RunnerClosed,
}
