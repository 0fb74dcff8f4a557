//! Sparse update and append payloads.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lead::{CallEntry, CallStatus, WebsiteStatus};

// ─── Patch ───────────────────────────────────────────────────────────────────

/// A partial update: every `Some` field is overwritten, every `None` field is
/// left untouched. An all-`None` patch is legal and writes nothing except the
/// server's `last_updated` stamp.
///
/// Serializes sparsely — unset fields are omitted, not sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub city:            Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub instagram:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub website:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub telecaller:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub call_status:     Option<CallStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub remarks:         Option<String>,
  /// `YYYY-MM-DD`, or an empty string to clear the follow-up.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reminder_date:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reminder_remark: Option<String>,
  /// Full replacement history. Callers append to the existing sequence and
  /// send the whole list; the store recomputes the attempt count from it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub call_history:    Option<Vec<CallEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub highlighted:     Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub archived:        Option<bool>,
}

impl LeadPatch {
  /// `true` when no field is set.
  pub fn is_empty(&self) -> bool {
    *self == LeadPatch::default()
  }

  /// Overlay `newer` on top of `self`: fields set in `newer` win, fields set
  /// only in `self` survive. Used to coalesce rapid edits into one write.
  pub fn merge(&mut self, newer: LeadPatch) {
    macro_rules! take {
      ($field:ident) => {
        if newer.$field.is_some() {
          self.$field = newer.$field;
        }
      };
    }
    take!(name);
    take!(phone);
    take!(city);
    take!(instagram);
    take!(website);
    take!(telecaller);
    take!(call_status);
    take!(remarks);
    take!(reminder_date);
    take!(reminder_remark);
    take!(call_history);
    take!(color);
    take!(highlighted);
    take!(archived);
  }
}

// ─── New lead ────────────────────────────────────────────────────────────────

/// A fully-formed, newly-discovered lead ready to be appended to the sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
  pub place_id:       String,
  pub name:           String,
  pub city:           String,
  pub category:       String,
  pub phone:          String,
  pub website:        String,
  pub website_status: WebsiteStatus,
  pub maps_url:       String,
  /// RFC 3339 timestamp of the discovery run.
  pub retrieved_date: String,
}

impl NewLead {
  /// A manually seeded lead. Assigned a `manual-{uuid}` identifier at
  /// creation time so it never depends on the decode-side fallback id.
  pub fn manual(name: &str, city: &str, phone: &str) -> Self {
    NewLead {
      place_id:       format!("manual-{}", Uuid::new_v4()),
      name:           name.to_string(),
      city:           city.to_string(),
      category:       "General".to_string(),
      phone:          phone.to_string(),
      website:        String::new(),
      website_status: WebsiteStatus::Missing,
      maps_url:       String::new(),
      retrieved_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
