use std::collections::HashSet;
use std::path::Path;

use causeway_config::FixtureSet;
use tokio::fs;
use tracing::info;

use crate::error::AnalysisError;

/// Read a fixture set from a JSON file and validate it.
pub async fn load_fixtures(path: &Path) -> Result<FixtureSet, AnalysisError> {
  let content = fs::read_to_string(path).await?;
  let fixtures: FixtureSet = serde_json::from_str(&content)?;
  validate_fixtures(&fixtures)?;
  info!(
    path = %path.display(),
    sources = fixtures.data_sources.len(),
    nodes = fixtures.dag_nodes.len(),
    edges = fixtures.dag_edges.len(),
    "loaded fixture set"
  );
  Ok(fixtures)
}

/// Check the invariants the step controllers rely on.
pub fn validate_fixtures(fixtures: &FixtureSet) -> Result<(), AnalysisError> {
  if fixtures.treatments.is_empty() || fixtures.outcomes.is_empty() {
    return Err(AnalysisError::invalid_fixtures(
      "at least one treatment and one outcome are required",
    ));
  }

  if let Some(edge) = fixtures.dangling_edges().first() {
    return Err(AnalysisError::invalid_fixtures(format!(
      "edge references unknown node: from={}, to={}",
      edge.from, edge.to
    )));
  }

  let mut seen = HashSet::new();
  for source in &fixtures.data_sources {
    if !seen.insert(source.id.as_str()) {
      return Err(AnalysisError::invalid_fixtures(format!(
        "duplicate data source id: {}",
        source.id
      )));
    }
  }

  let mut keys = HashSet::new();
  for edge in &fixtures.dag_edges {
    if !keys.insert(edge.key()) {
      return Err(AnalysisError::invalid_fixtures(format!(
        "duplicate edge: {}",
        edge.key()
      )));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::builtin_fixtures;
  use causeway_config::DagEdge;

  #[test]
  fn test_builtin_fixtures_are_valid() {
    assert!(validate_fixtures(&builtin_fixtures()).is_ok());
  }

  #[test]
  fn test_rejects_dangling_edge() {
    let mut fixtures = builtin_fixtures();
    fixtures.dag_edges.push(DagEdge::new("price", "weather"));
    let err = validate_fixtures(&fixtures).unwrap_err();
    assert!(err.to_string().contains("from=price, to=weather"));
  }

  #[test]
  fn test_rejects_duplicate_edge() {
    let mut fixtures = builtin_fixtures();
    fixtures.dag_edges.push(DagEdge::new("price", "usage"));
    assert!(matches!(
      validate_fixtures(&fixtures),
      Err(AnalysisError::InvalidFixtures { .. })
    ));
  }

  #[test]
  fn test_rejects_missing_options() {
    let mut fixtures = builtin_fixtures();
    fixtures.outcomes.clear();
    assert!(validate_fixtures(&fixtures).is_err());
  }

  #[tokio::test]
  async fn test_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixtures.json");
    let fixtures = builtin_fixtures();
    std::fs::write(&path, serde_json::to_string_pretty(&fixtures).unwrap()).unwrap();

    let loaded = load_fixtures(&path).await.unwrap();
    assert_eq!(loaded, fixtures);
  }

  #[tokio::test]
  async fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_fixtures(&dir.path().join("absent.json")).await;
    assert!(matches!(result, Err(AnalysisError::Io(_))));
  }
}
