//! `padron` — command-line and terminal dashboard for the person services.
//!
//! # Usage
//!
//! ```text
//! padron list
//! padron show 1020304050
//! padron create --document-type Cédula --document-number 1020304050 \
//!   --first-name Ana --last-names "Gómez Ruiz" --birth-date 1990-04-01 \
//!   --gender Femenino --email ana@example.com --phone 3001234567
//! padron logs --action PERSON_CREATED --from 2024-03-01
//! padron browse
//! ```
//!
//! Endpoints come from `padron.toml` (or `--config`), overridable through
//! `PADRON_ENDPOINTS__<SERVICE>` environment variables.

mod app;
mod client;
mod commands;
mod ui;


use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, Endpoints};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "padron", version, about = "Manage person records through the padron services")]
struct Args {
  /// Path to a TOML config file with an `[endpoints]` table.
  #[arg(short, long, value_name = "FILE", env = "PADRON_CONFIG", default_value = "padron.toml")]
  config: PathBuf,

  /// Request timeout in seconds (overrides the config file).
  #[arg(long, value_name = "SECS")]
  timeout: Option<u64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every person.
  List {
    /// Print canonical records as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Show one person by document number.
  Show {
    document: String,
    #[arg(long)]
    json: bool,
  },
  /// Register a new person.
  Create(commands::CreateArgs),
  /// Edit a person. The document number cannot change.
  Update {
    document: String,
    #[command(flatten)]
    fields: commands::PersonFields,
  },
  /// Delete a person.
  Delete {
    document: String,
    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
  },
  /// Show the audit log, optionally filtered.
  Logs(commands::LogsArgs),
  /// Delete every audit-log entry.
  ClearLogs {
    #[arg(long)]
    yes: bool,
  },
  /// Search persons with a natural-language query.
  Ask {
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
  },
  /// Show which optional backend features are enabled.
  Features,
  /// Open the interactive dashboard.
  Browse,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Resolved settings: built-in defaults, then the config file, then
/// `PADRON_*` environment variables.
#[derive(Deserialize, Debug)]
struct Settings {
  endpoints:    Endpoints,
  timeout_secs: u64,
}

fn load_settings(path: PathBuf) -> Result<Settings> {
  let d = Endpoints::default();
  let settings = config::Config::builder()
    .set_default("endpoints.create", d.create)?
    .set_default("endpoints.read", d.read)?
    .set_default("endpoints.update", d.update)?
    .set_default("endpoints.delete", d.delete)?
    .set_default("endpoints.logs", d.logs)?
    .set_default("endpoints.rag", d.rag)?
    .set_default("endpoints.features", d.features)?
    .set_default("timeout_secs", 30_i64)?
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("PADRON")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  settings.try_deserialize().context("failed to deserialise settings")
}

fn init_tracing(default: LevelFilter) {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy(),
    )
    .init();
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Log lines would tear the dashboard; keep it quiet unless RUST_LOG asks.
  let browsing = matches!(args.command, Command::Browse);
  init_tracing(if browsing { LevelFilter::OFF } else { LevelFilter::WARN });

  let settings = load_settings(args.config)?;
  let api_config = ApiConfig {
    endpoints: settings.endpoints,
    timeout:   Duration::from_secs(args.timeout.unwrap_or(settings.timeout_secs)),
  };
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List { json } => commands::list(&client, json).await,
    Command::Show { document, json } => commands::show(&client, &document, json).await,
    Command::Create(create) => commands::create(&client, create).await,
    Command::Update { document, fields } => commands::update(&client, &document, fields).await,
    Command::Delete { document, yes } => commands::delete(&client, &document, yes).await,
    Command::Logs(logs) => commands::logs(&client, logs).await,
    Command::ClearLogs { yes } => commands::clear_logs(&client, yes).await,
    Command::Ask { query } => commands::ask(&client, &query.join(" ")).await,
    Command::Features => commands::features(&client).await,
    Command::Browse => browse(client).await,
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

async fn browse(client: ApiClient) -> Result<()> {
  let mut app = App::new(client);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // A failed initial load is shown in the status bar; the user can retry.
  app.load_persons().await;
  app.load_features().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await {
        break;
      }
    }
  }

  Ok(())
}
