//! Lead — the central entity, one spreadsheet row per lead.
//!
//! Fields that the sheet stores as free text stay `String` here even when a
//! richer type exists: the sheet enforces nothing, and a legacy row with a
//! hand-typed date must survive a decode/encode cycle byte-for-byte. Parsing
//! happens at the point of use (`reminder_day`) and degrades to `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::LeadPatch;

// ─── Call status ─────────────────────────────────────────────────────────────

/// Outcome of the most recent call attempt.
///
/// Wire and sheet representation are the same human-readable tokens the
/// telecallers see in the status dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallStatus {
  #[default]
  #[serde(rename = "Not Contacted")]
  NotContacted,
  Connected,
  Busy,
  #[serde(rename = "Switch Off")]
  SwitchOff,
  #[serde(rename = "Wrong Number")]
  WrongNumber,
  #[serde(rename = "Follow Up")]
  FollowUp,
}

impl CallStatus {
  /// The token written to the `Call Status` column.
  pub fn as_token(self) -> &'static str {
    match self {
      CallStatus::NotContacted => "Not Contacted",
      CallStatus::Connected => "Connected",
      CallStatus::Busy => "Busy",
      CallStatus::SwitchOff => "Switch Off",
      CallStatus::WrongNumber => "Wrong Number",
      CallStatus::FollowUp => "Follow Up",
    }
  }

  /// Lenient parse for sheet cells. Unknown or empty tokens decode to
  /// [`CallStatus::NotContacted`] rather than erroring — the sheet has no
  /// schema enforcement and hand-edited cells do occur.
  pub fn from_token(s: &str) -> Self {
    match s.trim() {
      "Connected" => CallStatus::Connected,
      "Busy" => CallStatus::Busy,
      "Switch Off" => CallStatus::SwitchOff,
      "Wrong Number" => CallStatus::WrongNumber,
      "Follow Up" => CallStatus::FollowUp,
      _ => CallStatus::NotContacted,
    }
  }
}

// ─── Website status ──────────────────────────────────────────────────────────

/// Health of a discovered business's website, classified once at discovery
/// time and stored for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
  Working,
  Broken,
  Missing,
  #[serde(rename = "non-functional")]
  NonFunctional,
}

impl WebsiteStatus {
  pub fn as_token(self) -> &'static str {
    match self {
      WebsiteStatus::Working => "working",
      WebsiteStatus::Broken => "broken",
      WebsiteStatus::Missing => "missing",
      WebsiteStatus::NonFunctional => "non-functional",
    }
  }
}

// ─── Call history ────────────────────────────────────────────────────────────

/// One entry in a lead's append-only engagement log.
///
/// Stored in the sheet as a JSON array cell; insertion order is chronological
/// and significant. Entries are never reordered or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEntry {
  pub date: DateTime<Utc>,
  pub note: String,
}

// ─── Lead ────────────────────────────────────────────────────────────────────

/// A prospective business contact — the unit of storage and editing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
  /// Stable identifier; the sole key used to locate the sheet row.
  pub id:              String,
  pub name:            String,
  pub phone:           String,
  pub telecaller:      String,
  pub city:            String,
  /// RFC 3339 timestamp of the last accepted write, stamped by the server.
  pub last_updated:    String,
  pub call_status:     CallStatus,
  pub remarks:         String,
  /// `YYYY-MM-DD` follow-up date, or empty. Kept as raw text; malformed
  /// values are treated as absent by `reminder_day`.
  pub reminder_date:   String,
  /// Mirror of the latest history note, shown in compact views.
  pub reminder_remark: String,
  pub category:        String,
  pub website:         String,
  /// Display-only; raw token from the `Website Status` column.
  pub website_status:  String,
  pub maps_link:       String,
  pub retrieved_date:  String,
  pub highlighted:     bool,
  pub call_history:    Vec<CallEntry>,
  pub instagram:       String,
  pub color:           String,
  pub archived:        bool,
}

impl Lead {
  /// The follow-up date, if present and parseable as a calendar date.
  pub fn reminder_day(&self) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(self.reminder_date.trim(), "%Y-%m-%d").ok()
  }

  /// Overwrite the fields named by `patch`, leaving the rest untouched.
  ///
  /// Used by the client synchronization layer for optimistic local updates;
  /// the server applies the same patch independently.
  pub fn apply_patch(&mut self, patch: &LeadPatch) {
    if let Some(v) = &patch.name {
      self.name = v.clone();
    }
    if let Some(v) = &patch.phone {
      self.phone = v.clone();
    }
    if let Some(v) = &patch.city {
      self.city = v.clone();
    }
    if let Some(v) = &patch.instagram {
      self.instagram = v.clone();
    }
    if let Some(v) = &patch.website {
      self.website = v.clone();
    }
    if let Some(v) = &patch.telecaller {
      self.telecaller = v.clone();
    }
    if let Some(v) = patch.call_status {
      self.call_status = v;
    }
    if let Some(v) = &patch.remarks {
      self.remarks = v.clone();
    }
    if let Some(v) = &patch.reminder_date {
      self.reminder_date = v.clone();
    }
    if let Some(v) = &patch.reminder_remark {
      self.reminder_remark = v.clone();
    }
    if let Some(v) = &patch.call_history {
      self.call_history = v.clone();
    }
    if let Some(v) = &patch.color {
      self.color = v.clone();
    }
    if let Some(v) = patch.highlighted {
      self.highlighted = v;
    }
    if let Some(v) = patch.archived {
      self.archived = v;
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
