//! Client-side lead synchronization.
//!
//! Keeps an on-screen lead list consistent with the gateway while hiding
//! network latency:
//!
//! - every edit lands in the local list immediately (optimistic update);
//! - free-text edits coalesce behind a per-lead debounce timer — an explicit
//!   task handle that is aborted and re-armed on every keystroke;
//! - a failed write triggers one reconciling re-fetch, replacing local state
//!   with server truth — the only rollback mechanism;
//! - history notes always write immediately, never debounced.
//!
//! A write already dispatched is never cancelled; a newer edit schedules a
//! subsequent write and the server applies them last-write-wins.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::Result;
use chrono::Utc;
use leadbook_core::{CallEntry, Lead, LeadPatch};
use tokio::task::JoinHandle;

// ─── Transport seam ──────────────────────────────────────────────────────────

/// The two gateway calls the sync engine needs. Implemented by
/// [`ApiClient`](crate::client::ApiClient) over HTTP and by a recording fake
/// in tests.
pub trait Gateway: Send + Sync + 'static {
  fn fetch_leads(
    &self,
  ) -> impl Future<Output = Result<Vec<Lead>>> + Send + '_;

  fn patch_lead<'a>(
    &'a self,
    id: &'a str,
    patch: &'a LeadPatch,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

// ─── Status projection ───────────────────────────────────────────────────────

/// Per-lead save indicator, purely for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
  #[default]
  Idle,
  /// An edit is parked behind the debounce timer.
  Scheduled,
  /// A write is on the wire.
  Writing,
  /// The last write succeeded and nothing newer is pending.
  Written,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

struct PendingEdit {
  patch: LeadPatch,
  timer: JoinHandle<()>,
}

struct SyncInner<G> {
  gateway:  G,
  debounce: Duration,
  leads:    Mutex<Vec<Lead>>,
  pending:  Mutex<HashMap<String, PendingEdit>>,
  states:   Mutex<HashMap<String, SaveState>>,
}

/// The synchronization engine. Cheap to clone; all clones share state.
pub struct LeadSync<G> {
  inner: Arc<SyncInner<G>>,
}

impl<G> Clone for LeadSync<G> {
  fn clone(&self) -> Self {
    LeadSync {
      inner: Arc::clone(&self.inner),
    }
  }
}

const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

impl<G: Gateway> LeadSync<G> {
  pub fn new(gateway: G) -> Self {
    Self::with_debounce(gateway, DEFAULT_DEBOUNCE)
  }

  pub fn with_debounce(gateway: G, debounce: Duration) -> Self {
    LeadSync {
      inner: Arc::new(SyncInner {
        gateway,
        debounce,
        leads: Mutex::new(Vec::new()),
        pending: Mutex::new(HashMap::new()),
        states: Mutex::new(HashMap::new()),
      }),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Replace the local list with server truth.
  pub async fn refresh(&self) -> Result<()> {
    let leads = self.inner.gateway.fetch_leads().await?;
    *self.inner.leads.lock().unwrap() = leads;
    Ok(())
  }

  /// Snapshot of the local list.
  pub fn leads(&self) -> Vec<Lead> {
    self.inner.leads.lock().unwrap().clone()
  }

  pub fn lead(&self, id: &str) -> Option<Lead> {
    self
      .inner
      .leads
      .lock()
      .unwrap()
      .iter()
      .find(|l| l.id == id)
      .cloned()
  }

  pub fn save_state(&self, id: &str) -> SaveState {
    self
      .inner
      .states
      .lock()
      .unwrap()
      .get(id)
      .copied()
      .unwrap_or_default()
  }

  fn set_state(&self, id: &str, state: SaveState) {
    self
      .inner
      .states
      .lock()
      .unwrap()
      .insert(id.to_string(), state);
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Apply the patch to the local list only, stamping a local last-updated
  /// so sort-by-recency reflects the edit at once.
  fn apply_local(&self, id: &str, patch: &LeadPatch) {
    let mut leads = self.inner.leads.lock().unwrap();
    if let Some(lead) = leads.iter_mut().find(|l| l.id == id) {
      lead.apply_patch(patch);
      lead.last_updated = Utc::now().to_rfc3339();
    }
  }

  /// Optimistic edit with an immediate network write.
  pub async fn apply(&self, id: &str, patch: LeadPatch) {
    self.apply_local(id, &patch);
    self.write(id, patch).await;
  }

  /// Optimistic edit behind the debounce window.
  ///
  /// The previous pending timer for this lead (if any) is aborted and its
  /// patch folded into this one; a fresh timer is armed. A write already on
  /// the wire is unaffected.
  pub fn edit(&self, id: &str, patch: LeadPatch) {
    self.apply_local(id, &patch);

    let mut pending = self.inner.pending.lock().unwrap();
    let merged = match pending.remove(id) {
      Some(previous) => {
        previous.timer.abort();
        let mut folded = previous.patch;
        folded.merge(patch);
        folded
      }
      None => patch,
    };

    let sync = self.clone();
    let fire_id = id.to_string();
    let delay = self.inner.debounce;
    let timer = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      sync.fire(&fire_id).await;
    });

    pending.insert(id.to_string(), PendingEdit {
      patch: merged,
      timer,
    });
    drop(pending);
    self.set_state(id, SaveState::Scheduled);
  }

  /// Manual save: cancel the pending timer and write the coalesced patch
  /// now. A no-op when nothing is pending.
  pub async fn flush(&self, id: &str) {
    let taken = self.inner.pending.lock().unwrap().remove(id);
    if let Some(pending) = taken {
      pending.timer.abort();
      self.write(id, pending.patch).await;
    }
  }

  /// Append a history note: extends the local history, mirrors the note into
  /// `reminder_remark`, and writes immediately — a discrete, high-value
  /// action that is never debounced.
  pub async fn add_note(&self, id: &str, note: &str) {
    let note = note.trim();
    if note.is_empty() {
      return;
    }
    let mut history =
      self.lead(id).map(|l| l.call_history).unwrap_or_default();
    history.push(CallEntry {
      date: Utc::now(),
      note: note.to_string(),
    });
    let patch = LeadPatch {
      call_history: Some(history),
      reminder_remark: Some(note.to_string()),
      ..LeadPatch::default()
    };
    self.apply(id, patch).await;
  }

  /// Timer callback: take the coalesced patch, if a manual flush has not
  /// beaten us to it, and write it. The pending entry is removed before the
  /// network await so an edit arriving mid-write schedules a fresh write
  /// instead of touching this one.
  async fn fire(&self, id: &str) {
    let taken = self.inner.pending.lock().unwrap().remove(id);
    if let Some(pending) = taken {
      self.write(id, pending.patch).await;
    }
  }

  /// One network write; on failure, reconcile by re-fetching server truth.
  async fn write(&self, id: &str, patch: LeadPatch) {
    self.set_state(id, SaveState::Writing);
    match self.inner.gateway.patch_lead(id, &patch).await {
      Ok(()) => self.set_state(id, SaveState::Written),
      Err(error) => {
        tracing::warn!(%id, %error, "write failed, re-fetching server state");
        if let Err(fetch_error) = self.refresh().await {
          tracing::warn!(%fetch_error, "reconciling re-fetch failed");
        }
        self.set_state(id, SaveState::Idle);
      }
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
