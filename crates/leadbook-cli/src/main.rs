//! `leadbook` — terminal client for the leadbook gateway.
//!
//! # Usage
//!
//! ```
//! leadbook --url http://localhost:5000 --access-id ops --password secret leads
//! leadbook --config ~/.config/leadbook/config.toml edit ChIJabc123
//! ```

mod client;
mod sync;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use leadbook_core::{CallStatus, Lead, LeadPatch};
use serde::Deserialize;
use sync::{Gateway as _, LeadSync, SaveState};
use tokio::io::{AsyncBufReadExt, BufReader};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "leadbook", about = "Terminal client for the leadbook CRM")]
struct Args {
  /// Path to a TOML config file (url, access_id, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the leadbook server (default: http://localhost:5000).
  #[arg(long, env = "LEADBOOK_URL")]
  url: Option<String>,

  /// Login access id.
  #[arg(long, env = "LEADBOOK_ACCESS_ID")]
  access_id: Option<String>,

  /// Login password (plaintext).
  #[arg(long, env = "LEADBOOK_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Verify credentials against the gateway.
  Login,
  /// List leads (archived ones hidden unless --all).
  Leads {
    /// Only leads whose follow-up is due today.
    #[arg(long)]
    today: bool,
    /// Include archived leads.
    #[arg(long)]
    all: bool,
  },
  /// Apply a one-shot field update to a lead.
  Update {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    telecaller: Option<String>,
    #[arg(long)]
    remarks: Option<String>,
    /// Call status token, e.g. "Follow Up".
    #[arg(long)]
    status: Option<String>,
    /// Follow-up date (YYYY-MM-DD), empty string to clear.
    #[arg(long)]
    reminder: Option<String>,
    #[arg(long)]
    highlighted: Option<bool>,
    #[arg(long)]
    archived: Option<bool>,
  },
  /// Append a note to a lead's engagement log.
  Note { id: String, note: String },
  /// Run discovery ingestion for a city.
  Scrape {
    city: String,
    #[arg(required = true)]
    categories: Vec<String>,
  },
  /// Interactive remarks editor with debounced autosave.
  Edit { id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  access_id: String,
  #[serde(default)]
  password:  String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into()),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:  args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5000".to_string()),
    access_id: args
      .access_id
      .or_else(|| {
        (!file_cfg.access_id.is_empty()).then(|| file_cfg.access_id.clone())
      })
      .unwrap_or_default(),
    password:  args
      .password
      .or_else(|| {
        (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone())
      })
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Login => {
      let token = client.login().await?;
      println!("ok, token: {token}");
    }
    Command::Leads { today, all } => {
      let leads = client.fetch_leads().await?;
      print_leads(&leads, today, all);
    }
    Command::Update {
      id,
      name,
      phone,
      city,
      telecaller,
      remarks,
      status,
      reminder,
      highlighted,
      archived,
    } => {
      let patch = LeadPatch {
        name,
        phone,
        city,
        telecaller,
        remarks,
        call_status: status.as_deref().map(CallStatus::from_token),
        reminder_date: reminder,
        highlighted,
        archived,
        ..LeadPatch::default()
      };
      if patch.is_empty() {
        return Err(anyhow!("nothing to update — pass at least one field"));
      }
      client.patch_lead(&id, &patch).await?;
      println!("updated {id}");
    }
    Command::Note { id, note } => {
      let sync = LeadSync::new(client);
      sync.refresh().await?;
      if sync.lead(&id).is_none() {
        return Err(anyhow!("no lead with id {id}"));
      }
      sync.add_note(&id, &note).await;
      match sync.save_state(&id) {
        SaveState::Written => println!("noted."),
        _ => return Err(anyhow!("note write failed, see logs")),
      }
    }
    Command::Scrape { city, categories } => {
      let summary = client.scrape(&city, &categories).await?;
      println!("{} (spent ${:.2})", summary.message, summary.usage);
    }
    Command::Edit { id } => {
      edit_loop(client, &id).await?;
    }
  }

  Ok(())
}

// ─── Lead table ───────────────────────────────────────────────────────────────

fn print_leads(leads: &[Lead], today_only: bool, include_archived: bool) {
  let today = chrono::Local::now().date_naive();
  let visible = leads.iter().filter(|lead| {
    (include_archived || !lead.archived)
      && (!today_only || lead.reminder_day() == Some(today))
  });

  println!(
    "{:<28} {:<22} {:<14} {:<14} {:<12} REMARKS",
    "ID", "NAME", "PHONE", "STATUS", "FOLLOW-UP"
  );
  for lead in visible {
    println!(
      "{:<28} {:<22} {:<14} {:<14} {:<12} {}",
      truncate(&lead.id, 28),
      truncate(&lead.name, 22),
      truncate(&lead.phone, 14),
      lead.call_status.as_token(),
      lead.reminder_date,
      truncate(&lead.remarks, 40),
    );
  }
}

fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
  }
}

// ─── Interactive editor ───────────────────────────────────────────────────────

/// Line-oriented editing session against one lead.
///
/// Plain lines update the remarks field through the debounced autosave path;
/// `:save` flushes immediately, `:note <text>` appends to the engagement log,
/// `:status <token>` sets the call status, `:quit` leaves (flushing first).
async fn edit_loop(client: ApiClient, id: &str) -> Result<()> {
  let sync = LeadSync::new(client);
  sync.refresh().await?;
  let lead = sync
    .lead(id)
    .ok_or_else(|| anyhow!("no lead with id {id}"))?;

  println!("editing {} — {}", lead.id, lead.name);
  println!("current remarks: {}", lead.remarks);
  println!("type to replace remarks; :save, :note <text>, :status <token>, :quit");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  while let Some(line) = lines.next_line().await? {
    let line = line.trim();
    match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b)) {
      (":quit", _) => break,
      (":save", _) => {
        sync.flush(id).await;
        println!("[{}]", state_label(sync.save_state(id)));
      }
      (":note", text) => {
        sync.add_note(id, text).await;
        println!("[{}]", state_label(sync.save_state(id)));
      }
      (":status", token) => {
        sync
          .apply(id, LeadPatch {
            call_status: Some(CallStatus::from_token(token)),
            ..LeadPatch::default()
          })
          .await;
        println!("[{}]", state_label(sync.save_state(id)));
      }
      _ if !line.is_empty() => {
        sync.edit(id, LeadPatch {
          remarks: Some(line.to_string()),
          ..LeadPatch::default()
        });
        println!("[{}]", state_label(sync.save_state(id)));
      }
      _ => {}
    }
  }

  // Never leave a coalesced edit behind.
  sync.flush(id).await;
  // Give an in-flight debounced write a moment to land before exiting.
  tokio::time::sleep(Duration::from_millis(50)).await;
  Ok(())
}

fn state_label(state: SaveState) -> &'static str {
  match state {
    SaveState::Idle => "idle",
    SaveState::Scheduled => "pending save",
    SaveState::Writing => "saving…",
    SaveState::Written => "saved",
  }
}
