use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use causeway_analysis::{FixtureProvider, builtin_fixtures, load_fixtures};
use causeway_config::{FixtureSet, Pacing, SessionConfig};
use causeway_engine::{ActiveStep, WorkflowSession};
use causeway_workflow::WorkflowStep;

mod render;
mod shell;

use render::ConsoleNotifier;

/// Causeway - guided causal analysis from siloed data to a decision brief
#[derive(Parser)]
#[command(name = "causeway")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.causeway)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Session configuration file (default: <data-dir>/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Fixture set to use instead of the built-in one (JSON)
  #[arg(long, global = true)]
  fixtures: Option<PathBuf>,

  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the KPI of every data silo
  Silos,

  /// Show the six workflow steps
  Steps,

  /// Print the active fixture set as JSON
  Fixtures,

  /// Walk every step without interaction and print the decision brief
  Run {
    /// Treatment to analyze (default: the first option)
    #[arg(long)]
    treatment: Option<String>,

    /// Outcome to analyze (default: the first option)
    #[arg(long)]
    outcome: Option<String>,

    /// Assumption to state; repeat to add several (default: the built-in pair)
    #[arg(long = "assumption")]
    assumptions: Vec<String>,

    /// Skip the simulated delays
    #[arg(long)]
    fast: bool,

    /// Print the brief as JSON
    #[arg(long)]
    json: bool,
  },

  /// Drive the workflow interactively
  Shell {
    /// Skip the simulated delays
    #[arg(long)]
    fast: bool,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose { "debug" } else { "info" };
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
    )
    .with(
      tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr),
    )
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let rt = tokio::runtime::Runtime::new()?;
  let result = rt.block_on(async { dispatch(cli).await });
  // A pending stdin read would otherwise hold shutdown until the next line.
  rt.shutdown_background();
  result
}

async fn dispatch(cli: Cli) -> Result<()> {
  let Some(command) = cli.command else {
    println!("causeway - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".causeway"),
  };
  let fixtures = Arc::new(read_fixtures(cli.fixtures.as_deref()).await?);

  match command {
    Commands::Silos => {
      for silo in &fixtures.silos {
        println!("{}", render::silo(silo));
      }
    }
    Commands::Steps => {
      println!("{}", render::stepper(None));
      for step in WorkflowStep::ALL {
        println!("\n{step}\n  {}", step.info().action);
      }
    }
    Commands::Fixtures => {
      println!("{}", serde_json::to_string_pretty(fixtures.as_ref())?);
    }
    Commands::Run {
      treatment,
      outcome,
      assumptions,
      fast,
      json,
    } => {
      let config = read_config(cli.config.as_deref(), &data_dir, fast).await?;
      let choices = QueryChoices {
        treatment,
        outcome,
        assumptions,
      };
      run_workflow(fixtures, config, choices, json).await?;
    }
    Commands::Shell { fast } => {
      let config = read_config(cli.config.as_deref(), &data_dir, fast).await?;
      shell::run(fixtures, config).await?;
    }
  }

  Ok(())
}

async fn read_fixtures(path: Option<&Path>) -> Result<FixtureSet> {
  match path {
    Some(path) => load_fixtures(path)
      .await
      .with_context(|| format!("failed to load fixtures: {}", path.display())),
    None => Ok(builtin_fixtures()),
  }
}

/// Explicit `--config` must exist; the data-dir default is optional.
async fn read_config(path: Option<&Path>, data_dir: &Path, fast: bool) -> Result<SessionConfig> {
  let (path, required) = match path {
    Some(path) => (path.to_path_buf(), true),
    None => (data_dir.join("config.json"), false),
  };

  let mut config = if required || tokio::fs::try_exists(&path).await.unwrap_or(false) {
    let content = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: SessionConfig = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    info!(path = %path.display(), "loaded session config");
    config
  } else {
    debug!(path = %path.display(), "no session config, using defaults");
    SessionConfig::default()
  };

  if fast {
    config.pacing = Pacing::instant();
  }
  Ok(config)
}

struct QueryChoices {
  treatment: Option<String>,
  outcome: Option<String>,
  assumptions: Vec<String>,
}

/// Cancelled on Ctrl-C.
fn interrupt_token() -> CancellationToken {
  let cancel = CancellationToken::new();
  let token = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      token.cancel();
    }
  });
  cancel
}

async fn run_workflow(
  fixtures: Arc<FixtureSet>,
  config: SessionConfig,
  choices: QueryChoices,
  json: bool,
) -> Result<()> {
  let notifier = ConsoleNotifier::new(fixtures.clone());
  let mut session = WorkflowSession::new(
    fixtures.clone(),
    Arc::new(FixtureProvider::new()),
    config,
    notifier,
  );
  let cancel = interrupt_token();

  loop {
    let step = session.current_step();
    if step == WorkflowStep::CausalQuery {
      fill_query(&mut session, &fixtures, &choices)?;
    } else {
      session
        .run_action(&cancel)
        .await
        .with_context(|| format!("step {} did not finish", step.number()))?;
      eprintln!("{}", render::controller(session.active()));
    }

    if step.is_terminal() {
      break;
    }
    if !session.proceed().is_moved() {
      bail!("step {} did not complete", step.number());
    }
  }

  let ActiveStep::Brief(step) = session.active() else {
    bail!("workflow ended before the decision brief");
  };
  let brief = step.brief().context("no decision brief was generated")?;
  if json {
    println!("{}", serde_json::to_string_pretty(brief)?);
  } else {
    println!("\n{}", render::brief(brief));
  }
  Ok(())
}

fn fill_query(
  session: &mut WorkflowSession<ConsoleNotifier>,
  fixtures: &FixtureSet,
  choices: &QueryChoices,
) -> Result<()> {
  let treatment = match &choices.treatment {
    Some(treatment) => treatment.as_str(),
    None => fixtures
      .treatments
      .first()
      .map(String::as_str)
      .context("no treatment options")?,
  };
  if !session.select_treatment(treatment) {
    bail!(
      "unknown treatment '{}', expected one of: {}",
      treatment,
      fixtures.treatments.join(", ")
    );
  }

  let outcome = match &choices.outcome {
    Some(outcome) => outcome.as_str(),
    None => fixtures
      .outcomes
      .first()
      .map(String::as_str)
      .context("no outcome options")?,
  };
  if !session.select_outcome(outcome) {
    bail!(
      "unknown outcome '{}', expected one of: {}",
      outcome,
      fixtures.outcomes.join(", ")
    );
  }

  if !choices.assumptions.is_empty() {
    while session.remove_assumption(0) {}
    for assumption in &choices.assumptions {
      session.add_assumption(assumption);
    }
  }
  eprintln!("{}", render::controller(session.active()));
  Ok(())
}
