//! Plain-text rendering for the terminal shell.

use std::sync::Arc;

use causeway_config::{DecisionBrief, FixtureSet, Silo, SiloIcon, SiloStatus};
use causeway_engine::{ActiveStep, SessionEvent, SessionNotifier, SessionSnapshot, StepStage};
use causeway_steps::{EstimateStage, MergeStage, ScanStage, phase_for};
use causeway_workflow::WorkflowStep;

fn icon(icon: SiloIcon) -> &'static str {
  match icon {
    SiloIcon::Box => "[#]",
    SiloIcon::DollarSign => "[$]",
    SiloIcon::TrendingUp => "[^]",
    SiloIcon::Shield => "[+]",
  }
}

pub fn silo(silo: &Silo) -> String {
  let status = match silo.status {
    SiloStatus::Conflict => "CONFLICT",
    SiloStatus::Aligned => "ALIGNED",
  };
  format!(
    "{} {:<12} {:<22} {:>7} (target {:>6})  {:<8}  {}",
    icon(silo.icon),
    silo.name,
    silo.kpi,
    silo.kpi_value,
    silo.kpi_target,
    status,
    silo.description
  )
}

pub fn stepper(current: Option<WorkflowStep>) -> String {
  WorkflowStep::ALL
    .iter()
    .map(|&step| {
      let info = step.info();
      let marker = match current {
        Some(current) if step < current => "x",
        Some(current) if step == current => ">",
        _ => " ",
      };
      format!(
        "[{marker}] {} {:<16} {}",
        step.number(),
        info.title,
        info.description
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn verb(step: WorkflowStep) -> &'static str {
  match step {
    WorkflowStep::UnifyContext => "merging data sources",
    WorkflowStep::CausalQuery => "defining query",
    WorkflowStep::Identification => "scanning causal graph",
    WorkflowStep::Estimation => "calculating effect",
    WorkflowStep::ExperimentPlan => "generating plan",
    WorkflowStep::DecisionBrief => "generating brief",
  }
}

/// One line describing a stage that was just applied.
fn stage(fixtures: &FixtureSet, stage: StepStage) -> Option<String> {
  match stage {
    StepStage::Merge(MergeStage::Source(index)) => fixtures.data_sources.get(index).map(|source| {
      let silo = fixtures
        .silo(&source.silo)
        .map_or(source.silo.as_str(), |silo| silo.name.as_str());
      format!("  merged {} ({silo})", source.name)
    }),
    StepStage::Merge(MergeStage::Settle) => Some("  context unified".to_string()),
    StepStage::Scan(ScanStage::Edge(index)) => fixtures.dag_edges.get(index).map(|edge| {
      let label = |id: &str| fixtures.dag_node(id).map_or(id.to_string(), |n| n.label.clone());
      format!("  identified {} -> {}", label(&edge.from), label(&edge.to))
    }),
    StepStage::Scan(ScanStage::Resolve) => Some("  backdoor paths resolved".to_string()),
    StepStage::Estimate(EstimateStage::Tick(progress)) if progress % 10 == 0 => {
      Some(format!("  {progress:>3}%  {}", phase_for(progress)))
    }
    StepStage::Estimate(EstimateStage::Tick(_)) => None,
    StepStage::Estimate(EstimateStage::Finish) => Some("  estimate ready".to_string()),
    StepStage::Plan(_) | StepStage::Brief(_) => None,
  }
}

/// Renders session events to stderr as they happen.
pub struct ConsoleNotifier {
  fixtures: Arc<FixtureSet>,
}

impl ConsoleNotifier {
  pub fn new(fixtures: Arc<FixtureSet>) -> Self {
    Self { fixtures }
  }

  fn line(&self, event: &SessionEvent) -> Option<String> {
    match event {
      SessionEvent::StepEntered { step, .. } => {
        Some(format!("\n== {step} ==\n{}", step.info().action))
      }
      SessionEvent::ActionStarted { step, .. } => Some(format!("{}...", verb(*step))),
      SessionEvent::StageApplied { stage: s, .. } => stage(&self.fixtures, *s),
      SessionEvent::ActionFinished { .. } => None,
      SessionEvent::ActionAbandoned { step, .. } => Some(format!("  {} abandoned", verb(*step))),
      SessionEvent::QueryStored { query, .. } => Some(format!("query: {}", query.question())),
      SessionEvent::BriefGenerated { brief_id, .. } => Some(format!("  brief {brief_id} ready")),
      SessionEvent::Reset { .. } => Some("workflow reset".to_string()),
    }
  }
}

impl SessionNotifier for ConsoleNotifier {
  fn notify(&self, event: SessionEvent) {
    if let Some(line) = self.line(&event) {
      eprintln!("{line}");
    }
  }
}

/// What the mounted controller currently shows.
pub fn controller(active: &ActiveStep) -> String {
  let mut out = Vec::new();
  match active {
    ActiveStep::Unify(unify) => {
      for (silo, sources) in unify.sources_by_silo() {
        let names: Vec<String> = sources
          .iter()
          .map(|s| format!("{}{}", s.name, if s.merged { " (merged)" } else { "" }))
          .collect();
        out.push(format!("  {silo}: {}", names.join(", ")));
      }
      out.push(format!(
        "  {}/{} sources merged",
        unify.merged_count(),
        unify.sources().len()
      ));
    }
    ActiveStep::Query(query) => {
      out.push("  treatments:".to_string());
      for (i, t) in query.treatments().iter().enumerate() {
        let selected = if Some(t.as_str()) == query.treatment() { "*" } else { " " };
        out.push(format!("   {selected}{}. {t}", i + 1));
      }
      out.push("  outcomes:".to_string());
      for (i, o) in query.outcomes().iter().enumerate() {
        let selected = if Some(o.as_str()) == query.outcome() { "*" } else { " " };
        out.push(format!("   {selected}{}. {o}", i + 1));
      }
      out.push("  assumptions:".to_string());
      for (i, a) in query.assumptions().iter().enumerate() {
        out.push(format!("    {}. {a}", i + 1));
      }
      if let Some(preview) = query.preview() {
        out.push(format!("  {preview}"));
      }
    }
    ActiveStep::Identify(gating) => {
      out.push(format!(
        "  {}/{} edges identified",
        gating.identified_edges().len(),
        gating.edges().len()
      ));
      if let Some(result) = gating.result() {
        out.push("  backdoor paths:".to_string());
        out.extend(result.backdoor_paths.iter().map(|p| format!("    {p}")));
        out.push(format!("  adjustable: {}", result.adjustment_set.join(", ")));
        out.push(format!("  method: {}", result.method));
        let status = if result.identifiable {
          "IDENTIFIABLE"
        } else {
          "NOT IDENTIFIABLE"
        };
        out.push(format!("  status: {status}"));
      }
    }
    ActiveStep::Estimate(estimation) => {
      out.push(format!("  {}", estimation.estimator()));
      out.push(format!(
        "  progress {}%  models: {}",
        estimation.progress(),
        estimation.active_models().join(", ")
      ));
      if let Some(result) = estimation.result() {
        out.push(format!(
          "  ATE {:+.1}pp  95% CI [{:.1}, {:.1}]  p = {}  n = {}",
          result.ate, result.ci.0, result.ci.1, result.p_value, result.samples
        ));
      }
    }
    ActiveStep::Plan(planner) => {
      if let Some(plan) = planner.plan() {
        out.push(format!("  {}", plan.rationale));
        for r in &plan.requirements {
          out.push(format!(
            "  {} {:<28} {:>3.0}% / {:>3.0}%  {:?}  {}",
            if r.is_critical() { "!" } else { " " },
            r.variable,
            r.current_coverage,
            r.required_coverage,
            r.priority,
            r.source
          ));
        }
        let design = &plan.design;
        out.push(format!(
          "  {}: {}, {}",
          design.kind, design.duration, design.sample_size
        ));
        for group in &design.groups {
          out.push(format!("    {} ({}): {}", group.name, group.size, group.treatment));
        }
        out.push(format!("  stratify by {}", design.stratification.join(", ")));
      }
    }
    ActiveStep::Brief(step) => match step.brief() {
      Some(brief) => out.push(self::brief(brief)),
      None if step.is_generating() => out.push("  generating...".to_string()),
      None => out.push("  no brief yet".to_string()),
    },
  }
  out.join("\n")
}

pub fn brief(brief: &DecisionBrief) -> String {
  let mut out = vec![
    format!("DECISION BRIEF {}", brief.id),
    format!("generated {}", brief.timestamp.to_rfc3339()),
    String::new(),
    brief.query.question(),
    String::new(),
    "Assumptions:".to_string(),
  ];
  out.extend(brief.assumptions.iter().map(|a| {
    format!("  [{}] {}", if a.verified { "x" } else { " " }, a.text)
  }));
  out.push("Estimated impact:".to_string());
  out.extend(brief.estimated_impact.iter().map(|i| {
    format!(
      "  {:<22} {:>10.1} -> {:>10.1}  ({:+.1}, {}% confidence)",
      i.metric,
      i.baseline,
      i.projected,
      i.delta(),
      i.confidence
    )
  }));
  out.push("Monitoring:".to_string());
  out.extend(
    brief
      .monitoring_plan
      .iter()
      .map(|m| format!("  {:<22} {:<10} {}", m.metric, m.frequency, m.threshold)),
  );
  out.push(String::new());
  out.push(brief.recommendation.clone());
  out.join("\n")
}

pub fn status(snapshot: &SessionSnapshot) -> String {
  let mut out = vec![
    stepper(Some(snapshot.step)),
    String::new(),
    format!("{}{}", snapshot.step, if snapshot.busy { " (running)" } else { "" }),
  ];
  if let Some(query) = &snapshot.query {
    out.push(format!("query: {}", query.question()));
  }
  out.push(controller(&snapshot.active));
  if snapshot.can_proceed {
    out.push("ready to proceed".to_string());
  }
  out.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::builtin_fixtures;

  #[test]
  fn test_stage_lines_name_fixture_records() {
    let fixtures = builtin_fixtures();
    let merged = stage(&fixtures, StepStage::Merge(MergeStage::Source(0))).unwrap();
    assert!(merged.contains(&fixtures.data_sources[0].name));

    let edge = stage(&fixtures, StepStage::Scan(ScanStage::Edge(0))).unwrap();
    assert!(edge.contains("Price Change"));

    assert!(stage(&fixtures, StepStage::Estimate(EstimateStage::Tick(12))).is_none());
    assert!(stage(&fixtures, StepStage::Estimate(EstimateStage::Tick(50))).is_some());
  }

  #[test]
  fn test_stepper_marks_progress() {
    let table = stepper(Some(WorkflowStep::Identification));
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("[x] 1"));
    assert!(lines[2].starts_with("[>] 3"));
    assert!(lines[5].starts_with("[ ] 6"));
  }
}
