//! Staged reveals.
//!
//! A simulated operation is a finite sequence of stages, each preceded by a
//! delay. The sequence is plain data: the consumer decides how to wait
//! (inline with [`pause`], or on a scheduler) and can stop at any point.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The reveal was stopped before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("staged reveal cancelled")]
pub struct Cancelled;

/// One stage and the delay that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep<T> {
  pub delay: Duration,
  pub payload: T,
}

/// A restartable, finite sequence of [`RevealStep`]s in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedReveal<T> {
  steps: Vec<RevealStep<T>>,
  cursor: usize,
}

impl<T> Default for StagedReveal<T> {
  fn default() -> Self {
    Self {
      steps: Vec::new(),
      cursor: 0,
    }
  }
}

impl<T: Clone> StagedReveal<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a stage.
  pub fn then(mut self, delay: Duration, payload: T) -> Self {
    self.steps.push(RevealStep { delay, payload });
    self
  }

  /// Map every payload, keeping delays and position.
  pub fn map_payload<U, F>(self, mut f: F) -> StagedReveal<U>
  where
    F: FnMut(T) -> U,
  {
    StagedReveal {
      steps: self
        .steps
        .into_iter()
        .map(|step| RevealStep {
          delay: step.delay,
          payload: f(step.payload),
        })
        .collect(),
      cursor: self.cursor,
    }
  }

  /// The next stage without consuming it.
  pub fn peek(&self) -> Option<&RevealStep<T>> {
    self.steps.get(self.cursor)
  }

  /// Rewind to the first stage.
  pub fn restart(&mut self) {
    self.cursor = 0;
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn remaining(&self) -> usize {
    self.steps.len() - self.cursor
  }

  /// Sum of the delays still ahead.
  pub fn remaining_time(&self) -> Duration {
    self.steps[self.cursor..].iter().map(|s| s.delay).sum()
  }
}

impl<T: Clone> Iterator for StagedReveal<T> {
  type Item = RevealStep<T>;

  fn next(&mut self) -> Option<Self::Item> {
    let step = self.steps.get(self.cursor)?.clone();
    self.cursor += 1;
    Some(step)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.remaining();
    (remaining, Some(remaining))
  }
}

impl<T: Clone> ExactSizeIterator for StagedReveal<T> {}

/// Wait out a stage delay unless the token fires first.
///
/// A zero delay does not yield.
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
  if cancel.is_cancelled() {
    return Err(Cancelled);
  }
  if delay.is_zero() {
    return Ok(());
  }
  tokio::select! {
    _ = cancel.cancelled() => Err(Cancelled),
    _ = tokio::time::sleep(delay) => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> StagedReveal<char> {
    StagedReveal::new()
      .then(Duration::from_millis(10), 'a')
      .then(Duration::from_millis(20), 'b')
      .then(Duration::ZERO, 'c')
  }

  #[test]
  fn test_yields_in_order() {
    let payloads: Vec<char> = sample().map(|s| s.payload).collect();
    assert_eq!(payloads, vec!['a', 'b', 'c']);
  }

  #[test]
  fn test_restart_replays() {
    let mut reveal = sample();
    assert_eq!(reveal.next().map(|s| s.payload), Some('a'));
    assert_eq!(reveal.remaining(), 2);
    assert_eq!(reveal.remaining_time(), Duration::from_millis(20));
    reveal.restart();
    assert_eq!(reveal.remaining(), 3);
    assert_eq!(reveal.peek().map(|s| s.payload), Some('a'));
  }

  #[test]
  fn test_map_payload_keeps_delays() {
    let reveal = sample().map_payload(|c| c.to_ascii_uppercase());
    let steps: Vec<RevealStep<char>> = reveal.collect();
    assert_eq!(steps[1].payload, 'B');
    assert_eq!(steps[1].delay, Duration::from_millis(20));
  }

  #[test]
  fn test_exhausted() {
    let mut reveal = sample();
    reveal.by_ref().for_each(drop);
    assert_eq!(reveal.next(), None);
    assert_eq!(reveal.remaining(), 0);
    assert_eq!(reveal.len(), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_pause_waits_for_delay() {
    let cancel = CancellationToken::new();
    let start = tokio::time::Instant::now();
    pause(Duration::from_millis(300), &cancel).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
  }

  #[tokio::test(start_paused = true)]
  async fn test_pause_stops_on_cancel() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(50)).await;
      trigger.cancel();
    });
    let result = pause(Duration::from_secs(10), &cancel).await;
    assert_eq!(result, Err(Cancelled));
  }

  #[tokio::test]
  async fn test_pause_on_cancelled_token() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(pause(Duration::ZERO, &cancel).await, Err(Cancelled));
  }
}
