//! [`LeadPatch`] / [`NewLead`] → column-value encoding.
//!
//! The encode path assumes the canonical column order; callers guarantee the
//! header row matches [`crate::schema::COLUMNS`] before any write.

use leadbook_core::{CallEntry, LeadPatch, NewLead, Result};

use crate::schema::{COLUMNS, col};

// ─── Column writes ───────────────────────────────────────────────────────────

/// One cell value destined for a canonical column of a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWrite {
  pub column: usize,
  pub value:  String,
}

fn write(column: usize, value: impl Into<String>) -> ColumnWrite {
  ColumnWrite {
    column,
    value: value.into(),
  }
}

fn bool_token(v: bool) -> &'static str {
  if v { "TRUE" } else { "FALSE" }
}

/// Serialize a call history for its JSON cell.
pub fn encode_history(entries: &[CallEntry]) -> Result<String> {
  Ok(serde_json::to_string(entries)?)
}

// ─── Patch encode ────────────────────────────────────────────────────────────

/// Produce the sparse set of column writes for a partial update.
///
/// Unset fields emit nothing — a patch never rewrites the full row. A history
/// write also recomputes the derived `Attempt Count` column. The unconditional
/// last-updated stamp is the store's concern, not the codec's.
pub fn encode_patch(patch: &LeadPatch) -> Result<Vec<ColumnWrite>> {
  let mut writes = Vec::new();

  if let Some(v) = &patch.name {
    writes.push(write(col::NAME, v));
  }
  if let Some(v) = &patch.phone {
    writes.push(write(col::PHONE, v));
  }
  if let Some(v) = &patch.city {
    writes.push(write(col::CITY, v));
  }
  if let Some(v) = &patch.telecaller {
    writes.push(write(col::TELECALLER, v));
  }
  if let Some(v) = patch.call_status {
    writes.push(write(col::CALL_STATUS, v.as_token()));
  }
  if let Some(v) = &patch.remarks {
    writes.push(write(col::REMARKS, v));
  }
  if let Some(v) = &patch.reminder_date {
    writes.push(write(col::REMINDER_DATE, v));
  }
  if let Some(v) = &patch.reminder_remark {
    writes.push(write(col::REMINDER_REMARK, v));
  }
  if let Some(entries) = &patch.call_history {
    writes.push(write(col::CALL_HISTORY, encode_history(entries)?));
    writes.push(write(col::ATTEMPT_COUNT, entries.len().to_string()));
  }
  if let Some(v) = &patch.website {
    writes.push(write(col::WEBSITE, v));
  }
  if let Some(v) = &patch.instagram {
    writes.push(write(col::INSTAGRAM, v));
  }
  if let Some(v) = &patch.color {
    writes.push(write(col::COLOR, v));
  }
  if let Some(v) = patch.highlighted {
    writes.push(write(col::HIGHLIGHTED, bool_token(v)));
  }
  if let Some(v) = patch.archived {
    writes.push(write(col::ARCHIVED, bool_token(v)));
  }

  Ok(writes)
}

// ─── Append encode ───────────────────────────────────────────────────────────

/// Produce one full row, in canonical column order, for a newly-discovered
/// lead. Technical columns get their defaults; the retrieval timestamp
/// doubles as the initial last-updated stamp.
pub fn encode_row(lead: &NewLead) -> Result<Vec<String>> {
  let mut row = vec![String::new(); COLUMNS.len()];
  row[col::NAME] = lead.name.clone();
  row[col::PHONE] = lead.phone.clone();
  row[col::CITY] = lead.city.clone();
  row[col::LAST_UPDATED] = lead.retrieved_date.clone();
  row[col::CALL_STATUS] = "Not Contacted".to_string();
  row[col::ATTEMPT_COUNT] = "0".to_string();
  row[col::PLACE_ID] = lead.place_id.clone();
  row[col::CATEGORY] = lead.category.clone();
  row[col::WEBSITE] = lead.website.clone();
  row[col::WEBSITE_STATUS] = lead.website_status.as_token().to_string();
  row[col::MAPS_LINK] = lead.maps_url.clone();
  row[col::RETRIEVED_DATE] = lead.retrieved_date.clone();
  row[col::HIGHLIGHTED] = "FALSE".to_string();
  row[col::CALL_HISTORY] = "[]".to_string();
  row[col::ARCHIVED] = "FALSE".to_string();
  Ok(row)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
