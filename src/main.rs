use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use stepgate_config::parse_definitions;
use stepgate_gateway::{
  DEFAULT_QUEUE_NAME, EnqueueRequest, Gateway, GatewayConfig, Response,
};
use stepgate_queue::SqliteQueue;
use stepgate_store::{SqliteStore, Store};

/// Stepgate - admission and enqueue gateway for step-based workflows
#[derive(Parser)]
#[command(name = "stepgate")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.stepgate)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Database URL (default: sqlite://<data-dir>/stepgate.db?mode=rwc)
  #[arg(long, global = true, env = "STEPGATE_DATABASE_URL")]
  database_url: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Apply database migrations
  Migrate,

  /// Manage workflow definitions
  Definitions {
    #[command(subcommand)]
    action: DefinitionsAction,
  },

  /// Serve the HTTP gateway
  Serve {
    /// Address to listen on
    #[arg(long, env = "STEPGATE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: String,

    #[command(flatten)]
    gateway: GatewayArgs,
  },

  /// Admit one workflow trigger; the payload is read from stdin
  Enqueue {
    /// Workflow name
    workflow: String,

    /// Idempotency key; repeated ids return the first execution
    #[arg(long)]
    correlation_id: Option<String>,

    /// Principal recorded on the execution
    #[arg(long, default_value = "cli")]
    triggered_by: String,

    #[command(flatten)]
    gateway: GatewayArgs,
  },

  /// Print the stored state of an execution
  Status {
    /// Execution id returned by enqueue
    execution_id: String,
  },
}

#[derive(Subcommand)]
enum DefinitionsAction {
  /// Register definitions from a JSON file (one definition or a list)
  Load {
    /// Path to the definitions file
    file: PathBuf,
  },
}

#[derive(Args)]
struct GatewayArgs {
  /// Queue that admitted executions are published to
  #[arg(long, env = "STEPGATE_QUEUE", default_value = DEFAULT_QUEUE_NAME)]
  queue: String,

  /// How long to wait for the queue before rolling back
  #[arg(
    long,
    env = "STEPGATE_PUBLISH_TIMEOUT_MS",
    default_value_t = 5000,
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  publish_timeout_ms: u64,
}

impl GatewayArgs {
  fn config(&self) -> GatewayConfig {
    GatewayConfig {
      queue_name: self.queue.clone(),
      publish_timeout: Duration::from_millis(self.publish_timeout_ms),
    }
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,stepgate=debug".into()),
    )
    .with_writer(io::stderr)
    .init();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".stepgate"),
  };
  let database_url = match cli.database_url {
    Some(url) => url,
    None => default_database_url(&data_dir)?,
  };

  let Some(command) = cli.command else {
    println!("stepgate - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, &database_url).await })
}

async fn run(command: Commands, database_url: &str) -> Result<()> {
  let store = open_store(database_url).await?;

  match command {
    Commands::Migrate => {
      eprintln!("Migrations applied to {}", database_url);
    }
    Commands::Definitions {
      action: DefinitionsAction::Load { file },
    } => {
      load_definitions(&store, &file).await?;
    }
    Commands::Serve { bind, gateway } => {
      serve(store, &bind, gateway.config()).await?;
    }
    Commands::Enqueue {
      workflow,
      correlation_id,
      triggered_by,
      gateway,
    } => {
      let payload = read_payload_from_stdin()?;
      let serde_json::Value::Object(data) = payload else {
        bail!("payload must be a JSON object");
      };

      let mut request = EnqueueRequest::new(workflow, data);
      if let Some(id) = correlation_id {
        request = request.with_correlation_id(id);
      }

      let gateway = build_gateway(store, gateway.config());
      let response = gateway
        .enqueue(request, &triggered_by)
        .await
        .context("enqueue failed")?;
      println!("{}", serde_json::to_string_pretty(&Response::Enqueued(response))?);
    }
    Commands::Status { execution_id } => {
      let gateway = build_gateway(store, GatewayConfig::default());
      let execution = gateway.status(&execution_id).await?;
      println!("{}", serde_json::to_string_pretty(&execution)?);
    }
  }

  Ok(())
}

fn default_database_url(data_dir: &Path) -> Result<String> {
  std::fs::create_dir_all(data_dir)
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
  Ok(format!(
    "sqlite://{}?mode=rwc",
    data_dir.join("stepgate.db").display()
  ))
}

async fn open_store(database_url: &str) -> Result<Arc<SqliteStore>> {
  let pool = stepgate_store::connect(database_url)
    .await
    .with_context(|| format!("failed to connect to database: {}", database_url))?;
  let store = SqliteStore::new(pool);
  store.migrate().await.context("failed to apply migrations")?;
  Ok(Arc::new(store))
}

fn build_gateway(store: Arc<SqliteStore>, config: GatewayConfig) -> Gateway {
  let queue = Arc::new(SqliteQueue::new(store.pool().clone()));
  Gateway::new(store, queue, config)
}

async fn load_definitions(store: &SqliteStore, file: &Path) -> Result<()> {
  let content = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("failed to read definitions file: {}", file.display()))?;

  let defs = parse_definitions(&content)
    .with_context(|| format!("failed to parse definitions file: {}", file.display()))?;

  for def in &defs {
    let registered = store
      .register_definition(def)
      .await
      .with_context(|| format!("failed to register workflow '{}'", def.name))?;
    eprintln!(
      "Registered {} v{} ({} steps)",
      registered.name,
      registered.version,
      registered.step_count()
    );
  }

  Ok(())
}

async fn serve(store: Arc<SqliteStore>, bind: &str, config: GatewayConfig) -> Result<()> {
  let gateway = Arc::new(build_gateway(store, config));
  let app = stepgate_server::build_router(gateway);

  let listener = tokio::net::TcpListener::bind(bind)
    .await
    .with_context(|| format!("failed to bind to {}", bind))?;

  let shutdown = CancellationToken::new();
  let signal = shutdown.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("shutdown requested");
    }
    signal.cancel();
  });

  stepgate_server::serve(listener, app, shutdown)
    .await
    .context("server error")
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read payload from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_publish_timeout_must_be_positive() {
    let zero = Cli::try_parse_from(["stepgate", "serve", "--publish-timeout-ms", "0"]);
    assert!(zero.is_err());

    let cli = Cli::try_parse_from(["stepgate", "serve", "--publish-timeout-ms", "250"]).unwrap();
    let Some(Commands::Serve { gateway, .. }) = cli.command else {
      panic!("expected serve command");
    };
    assert_eq!(gateway.config().publish_timeout, Duration::from_millis(250));
  }

  #[test]
  fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
  }
}
