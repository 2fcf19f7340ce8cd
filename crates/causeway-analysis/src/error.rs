use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid fixture json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid fixture set: {message}")]
  InvalidFixtures { message: String },

  /// The provider could not produce a result. Never returned by
  /// [`FixtureProvider`](crate::FixtureProvider).
  #[error("analysis unavailable: {message}")]
  Unavailable { message: String },
}

impl AnalysisError {
  pub fn invalid_fixtures(message: impl Into<String>) -> Self {
    Self::InvalidFixtures {
      message: message.into(),
    }
  }
}
