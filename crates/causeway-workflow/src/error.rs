use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
  #[error("invalid workflow step: {0} (expected 1..=6)")]
  InvalidStep(u8),
}
