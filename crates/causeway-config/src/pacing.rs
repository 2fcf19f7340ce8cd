//! Timing of the simulated operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays for every staged reveal, in milliseconds.
///
/// Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
  /// Delay before each data source flips to merged.
  pub merge_item_ms: u64,
  /// Delay after the last source merged.
  pub merge_settle_ms: u64,
  /// Delay before each DAG edge is revealed.
  pub scan_edge_ms: u64,
  /// Delay between the last edge and the backdoor paths.
  pub scan_settle_ms: u64,
  /// Delay before each estimation progress tick.
  pub estimate_tick_ms: u64,
  /// Progress added per estimation tick.
  pub estimate_step: u8,
  /// Delay before the decision brief is generated.
  pub brief_delay_ms: u64,
}

impl Default for Pacing {
  fn default() -> Self {
    Self {
      merge_item_ms: 400,
      merge_settle_ms: 500,
      scan_edge_ms: 300,
      scan_settle_ms: 500,
      estimate_tick_ms: 60,
      estimate_step: 2,
      brief_delay_ms: 1500,
    }
  }
}

impl Pacing {
  /// Same stages, no waiting.
  pub fn instant() -> Self {
    Self {
      merge_item_ms: 0,
      merge_settle_ms: 0,
      scan_edge_ms: 0,
      scan_settle_ms: 0,
      estimate_tick_ms: 0,
      estimate_step: Self::default().estimate_step,
      brief_delay_ms: 0,
    }
  }

  pub fn merge_item(&self) -> Duration {
    Duration::from_millis(self.merge_item_ms)
  }

  pub fn merge_settle(&self) -> Duration {
    Duration::from_millis(self.merge_settle_ms)
  }

  pub fn scan_edge(&self) -> Duration {
    Duration::from_millis(self.scan_edge_ms)
  }

  pub fn scan_settle(&self) -> Duration {
    Duration::from_millis(self.scan_settle_ms)
  }

  pub fn estimate_tick(&self) -> Duration {
    Duration::from_millis(self.estimate_tick_ms)
  }

  /// Progress increment, never zero so the counter always reaches 100.
  pub fn estimate_increment(&self) -> u8 {
    self.estimate_step.clamp(1, 100)
  }

  pub fn brief_delay(&self) -> Duration {
    Duration::from_millis(self.brief_delay_ms)
  }
}

/// Session-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  pub pacing: Pacing,
}
