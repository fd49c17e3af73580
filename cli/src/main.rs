//! Handover status command-line tool.
//!
//! Wires the in-memory event store and job queue to the status, listing,
//! submission and dispatch services, loaded with either a JSON-lines event
//! file or the built-in sample trail.
//!
//! Usage:
//!   cargo run -p handover-cli -- list
//!   cargo run -p handover-cli -- list --release 100
//!   cargo run -p handover-cli -- status 6a2e9d73-18c4-4b0f-8e21-d4c35f7a9b02
//!   cargo run -p handover-cli -- matches drosophila_melanogaster_core_48_101_7 101
//!   cargo run -p handover-cli -- --config handover.toml submit --src-uri ... --contact ... --comment ...

mod sample_data;

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use handover_config::HandoverConfig;
use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::EventRecord,
    status::StatusView,
};
use handover_core::{
    EventDispatcher, HandoverService, JobService, ListingService, ReportFormat, StatusReducer,
};
use handover_store::{InMemoryEventStore, InMemoryJobQueue};
use handover_verify::SchemaValidator;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Handover status: track database handovers from their event trail.
#[derive(Parser)]
#[command(
    name = "handover-cli",
    about = "Query and drive database handovers",
    long_about = "Reduces handover event trails to a current status, lists the handovers\n\
                  of a release, and submits handovers, jobs and events."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-lines file of events to load. The sample trail is used when omitted.
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Current status of one handover.
    Status {
        token: String,
    },
    /// Every handover of a release, newest submission first.
    List {
        /// Release to list. Defaults to the configured release.
        #[arg(long)]
        release: Option<String>,
    },
    /// Whether a database identifier belongs to a release.
    Matches {
        identifier: String,
        release: String,
    },
    /// Delete every event of one handover.
    Purge {
        token: String,
    },
    /// Submit a handover.
    Submit {
        #[arg(long)]
        src_uri: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        comment: String,
        /// Explicit target. Derived from the configured server when omitted.
        #[arg(long)]
        tgt_uri: Option<String>,
    },
    /// Submit a job on the configured jobs analysis and report on it.
    Job {
        /// Job payload as a JSON object.
        payload: String,
        /// Report format: `failures` or `email`. Full result when omitted.
        #[arg(long)]
        format: Option<String>,
        /// Recipient for the `email` format.
        #[arg(long)]
        email: Option<String>,
    },
    /// Route an event to the processes configured for its type.
    Dispatch {
        /// Event as a JSON object with a `type` field.
        event: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("handover error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> HandoverResult<()> {
    let config = match &cli.config {
        Some(path) => HandoverConfig::from_file(path)?,
        None => HandoverConfig::default(),
    }
    .with_env_overrides()?;

    let app = App::new(config, cli.events.as_deref())?;

    match cli.command {
        Command::Status { token } => print_json(&app.reducer().reduce(&token)?),
        Command::List { release } => {
            let release = release.unwrap_or_else(|| app.config.release.clone());
            let views: Vec<StatusView> = app.listing().list_by_release(&release)?.collect();
            info!(release = %release, handovers = views.len(), "release listed");
            print_json(&views)
        }
        Command::Matches {
            identifier,
            release,
        } => print_json(&json!({
            "identifier": identifier,
            "release": release,
            "matches": app.config.matcher().matches(&identifier, &release),
        })),
        Command::Purge { token } => {
            let removed = app.handover()?.purge(&token)?;
            print_json(&json!({ "handover_token": token, "removed": removed }))
        }
        Command::Submit {
            src_uri,
            contact,
            comment,
            tgt_uri,
        } => {
            let mut body = json!({ "src_uri": src_uri, "contact": contact, "comment": comment });
            if let Some(tgt_uri) = tgt_uri {
                body["tgt_uri"] = json!(tgt_uri);
            }
            let ticket = app.handover()?.submit(&body)?;
            print_json(&json!({
                "ticket": ticket,
                "status": app.reducer().reduce(&ticket.handover_token)?,
            }))
        }
        Command::Job {
            payload,
            format,
            email,
        } => {
            let format = ReportFormat::parse(format.as_deref(), email.as_deref())?;
            let jobs = JobService::new(app.queue.clone(), app.config.jobs.analysis.as_str());
            let handle = jobs.submit(parse_json("job payload", &payload)?)?;
            print_json(&jobs.report(handle.id, &format)?)
        }
        Command::Dispatch { event } => {
            let dispatcher = EventDispatcher::new(
                app.queue.clone(),
                app.config.events.clone(),
                app.config.process_analyses(),
            );
            print_json(&dispatcher.dispatch(parse_json("event", &event)?)?)
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

struct App {
    config: HandoverConfig,
    store: Arc<InMemoryEventStore>,
    queue: Arc<InMemoryJobQueue>,
}

impl App {
    fn new(config: HandoverConfig, events: Option<&Path>) -> HandoverResult<Self> {
        let records = match events {
            Some(path) => load_events(path)?,
            None => sample_data::events(&config.status.submission_marker)?,
        };

        let store = Arc::new(InMemoryEventStore::new());
        store.extend(records)?;
        debug!(events = store.len()?, "event store loaded");

        Ok(Self {
            config,
            store,
            queue: Arc::new(InMemoryJobQueue::new()),
        })
    }

    fn reducer(&self) -> StatusReducer {
        StatusReducer::new(self.store.clone(), self.config.reducer_options())
    }

    fn listing(&self) -> ListingService {
        ListingService::new(
            self.store.clone(),
            self.reducer(),
            self.config.matcher(),
            self.config.listing_options(),
        )
    }

    fn handover(&self) -> HandoverResult<HandoverService> {
        Ok(HandoverService::new(
            self.store.clone(),
            self.queue.clone(),
            Box::new(SchemaValidator::for_handover()?),
            self.config.submission_options(),
        ))
    }
}

/// Read one event per non-blank line. Any invalid line rejects the file.
fn load_events(path: &Path) -> HandoverResult<Vec<EventRecord>> {
    let file = std::fs::File::open(path).map_err(|e| HandoverError::Config {
        reason: format!("failed to open events file '{}': {}", path.display(), e),
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| HandoverError::Config {
            reason: format!("failed to read '{}': {}", path.display(), e),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| HandoverError::Validation {
            reason: format!("{}:{}: invalid event: {}", path.display(), index + 1, e),
        })?;
        records.push(record);
    }

    info!(path = %path.display(), events = records.len(), "events file loaded");
    Ok(records)
}

fn parse_json(what: &str, text: &str) -> HandoverResult<Value> {
    serde_json::from_str(text).map_err(|e| HandoverError::Validation {
        reason: format!("{what} is not valid JSON: {e}"),
    })
}

fn print_json<T: Serialize>(value: &T) -> HandoverResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| HandoverError::Format {
        reason: format!("failed to render output: {e}"),
    })?;
    println!("{text}");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
