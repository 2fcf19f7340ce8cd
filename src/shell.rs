//! Interactive line-oriented shell over a `SessionRunner`.

use std::sync::Arc;

use anyhow::{Context, Result};
use causeway_analysis::FixtureProvider;
use causeway_config::{FixtureSet, SessionConfig};
use causeway_engine::{SessionCommand, SessionRunner, WorkflowSession};
use causeway_workflow::WorkflowStep;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::render::{self, ConsoleNotifier};

const HELP: &str = "\
commands:
  trigger          start the current step's action
  treatment <n>    select treatment option n
  outcome <n>      select outcome option n
  assume <text>    add an assumption
  drop <n>         remove assumption n
  proceed          advance to the next step
  goto <n>         revisit step n
  reset            back to step 1
  status           show the current step
  quit             leave the shell";

/// A parsed shell line.
#[derive(Debug, PartialEq, Eq)]
enum Line {
  Command(SessionCommandKind),
  Status,
  Help,
  Quit,
  Invalid(String),
}

#[derive(Debug, PartialEq, Eq)]
enum SessionCommandKind {
  Trigger,
  Treatment(usize),
  Outcome(usize),
  Assume(String),
  Drop(usize),
  Proceed,
  GoTo(u8),
  Reset,
}

fn index(arg: &str) -> Option<usize> {
  arg.trim().parse::<usize>().ok().filter(|n| *n >= 1)
}

fn parse(line: &str) -> Line {
  let line = line.trim();
  let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
  let rest = rest.trim();
  let with_index = |make: fn(usize) -> SessionCommandKind| match index(rest) {
    Some(n) => Line::Command(make(n)),
    None => Line::Invalid(format!("{word} expects a number from 1")),
  };

  match word {
    "" | "help" | "?" => Line::Help,
    "trigger" | "t" => Line::Command(SessionCommandKind::Trigger),
    "treatment" => with_index(SessionCommandKind::Treatment),
    "outcome" => with_index(SessionCommandKind::Outcome),
    "drop" => with_index(SessionCommandKind::Drop),
    "assume" if !rest.is_empty() => Line::Command(SessionCommandKind::Assume(rest.to_string())),
    "assume" => Line::Invalid("assume expects some text".to_string()),
    "proceed" | "p" => Line::Command(SessionCommandKind::Proceed),
    "goto" => match rest.parse::<u8>() {
      Ok(n) => Line::Command(SessionCommandKind::GoTo(n)),
      Err(_) => Line::Invalid("goto expects a step number".to_string()),
    },
    "reset" => Line::Command(SessionCommandKind::Reset),
    "status" | "s" => Line::Status,
    "quit" | "exit" | "q" => Line::Quit,
    other => Line::Invalid(format!("unknown command '{other}'")),
  }
}

/// Resolve shell indices against the fixture options.
fn to_command(kind: SessionCommandKind, fixtures: &FixtureSet) -> Result<SessionCommand, String> {
  let option = |options: &[String], n: usize, what: &str| {
    options
      .get(n - 1)
      .cloned()
      .ok_or_else(|| format!("no {what} option {n}"))
  };

  Ok(match kind {
    SessionCommandKind::Trigger => SessionCommand::Trigger,
    SessionCommandKind::Treatment(n) => {
      SessionCommand::SelectTreatment(option(&fixtures.treatments, n, "treatment")?)
    }
    SessionCommandKind::Outcome(n) => {
      SessionCommand::SelectOutcome(option(&fixtures.outcomes, n, "outcome")?)
    }
    SessionCommandKind::Assume(text) => SessionCommand::AddAssumption(text),
    SessionCommandKind::Drop(n) => SessionCommand::RemoveAssumption(n - 1),
    SessionCommandKind::Proceed => SessionCommand::Proceed,
    SessionCommandKind::GoTo(n) => {
      SessionCommand::GoTo(WorkflowStep::from_number(n).map_err(|e| e.to_string())?)
    }
    SessionCommandKind::Reset => SessionCommand::Reset,
  })
}

async fn print_status(sender: &mpsc::Sender<SessionCommand>) -> Result<()> {
  let (reply, snapshot) = oneshot::channel();
  sender
    .send(SessionCommand::Snapshot(reply))
    .await
    .context("session runner stopped")?;
  let snapshot = snapshot.await.context("session runner stopped")?;
  println!("{}", render::status(&snapshot));
  Ok(())
}

pub async fn run(fixtures: Arc<FixtureSet>, config: SessionConfig) -> Result<()> {
  let session = WorkflowSession::new(
    fixtures.clone(),
    Arc::new(FixtureProvider::new()),
    config,
    ConsoleNotifier::new(fixtures.clone()),
  );
  let runner = SessionRunner::new(session);
  let sender = runner.sender();

  let cancel = CancellationToken::new();
  let handle = tokio::spawn(runner.start(cancel.clone()));
  println!("{HELP}");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    let line = tokio::select! {
        _ = tokio::signal::ctrl_c() => break,
        line = lines.next_line() => line.context("failed to read from stdin")?,
    };
    let Some(line) = line else {
      break;
    };

    match parse(&line) {
      Line::Command(kind) => match to_command(kind, &fixtures) {
        Ok(command) => sender
          .send(command)
          .await
          .context("session runner stopped")?,
        Err(message) => println!("{message}"),
      },
      Line::Status => print_status(&sender).await?,
      Line::Help => println!("{HELP}"),
      Line::Quit => break,
      Line::Invalid(message) => println!("{message}"),
    }
  }

  cancel.cancel();
  let session = handle.await.context("session runner panicked")?;
  info!(
    session_id = %session.id(),
    step = session.current_step().number(),
    "shell closed"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use causeway_analysis::builtin_fixtures;

  #[test]
  fn test_parse_commands() {
    assert_eq!(parse("trigger"), Line::Command(SessionCommandKind::Trigger));
    assert_eq!(
      parse("treatment 2"),
      Line::Command(SessionCommandKind::Treatment(2))
    );
    assert_eq!(
      parse("assume  Stable demand "),
      Line::Command(SessionCommandKind::Assume("Stable demand".to_string()))
    );
    assert_eq!(parse("goto 3"), Line::Command(SessionCommandKind::GoTo(3)));
    assert_eq!(parse("quit"), Line::Quit);
    assert_eq!(parse(""), Line::Help);
  }

  #[test]
  fn test_parse_rejects_bad_arguments() {
    assert!(matches!(parse("drop 0"), Line::Invalid(_)));
    assert!(matches!(parse("outcome x"), Line::Invalid(_)));
    assert!(matches!(parse("assume"), Line::Invalid(_)));
    assert!(matches!(parse("merge"), Line::Invalid(_)));
  }

  #[test]
  fn test_indices_resolve_against_fixtures() {
    let fixtures = builtin_fixtures();
    let command = to_command(SessionCommandKind::Treatment(1), &fixtures).unwrap();
    assert!(
      matches!(command, SessionCommand::SelectTreatment(t) if t == "Price Increase (+15%)")
    );
    assert!(to_command(SessionCommandKind::Outcome(9), &fixtures).is_err());
    assert!(to_command(SessionCommandKind::GoTo(7), &fixtures).is_err());
    assert!(matches!(
      to_command(SessionCommandKind::Drop(1), &fixtures),
      Ok(SessionCommand::RemoveAssumption(0))
    ));
  }
}
