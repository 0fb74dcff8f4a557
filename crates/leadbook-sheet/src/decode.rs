//! Row → [`Lead`] decoding.
//!
//! Pipeline:
//!   header row + data row
//!     └─ normalize_header()      → alphanumeric-only keys
//!          └─ keyed cell lookup  → raw string values
//!               └─ alias table   → semantic `Lead` fields, with defaults

use leadbook_core::{CallEntry, CallStatus, Lead};
use url::Url;

// ─── Header normalization ────────────────────────────────────────────────────

/// Strip every non-alphanumeric character, preserving case:
/// `"Business / City"` → `"BusinessCity"`, `"Next Follow-up Date"` →
/// `"NextFollowupDate"`.
pub fn normalize_header(header: &str) -> String {
  header.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Case-preserving lookup of a cell by normalized header name. Missing cells
/// (short rows) decode to the empty string.
fn cell<'a>(headers: &[String], row: &'a [String], key: &str) -> &'a str {
  headers
    .iter()
    .position(|h| normalize_header(h) == key)
    .and_then(|i| row.get(i))
    .map(String::as_str)
    .unwrap_or("")
}

// ─── Fallback identifier ─────────────────────────────────────────────────────

/// Deterministic identifier for a row whose `Place ID` cell is empty:
/// a slugified lead name plus the 0-based data row position.
///
/// Two idless rows with the same name stay distinct while the sheet is
/// stable, but the id shifts if rows above move. Creation paths always write
/// a real id; this exists only for legacy hand-entered rows.
pub fn fallback_id(name: &str, row_index: usize) -> String {
  let slug: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() {
        c.to_ascii_lowercase()
      } else {
        '-'
      }
    })
    .collect();
  if slug.is_empty() {
    format!("manual-{row_index}")
  } else {
    format!("manual-{slug}-{row_index}")
  }
}

// ─── History cells ───────────────────────────────────────────────────────────

/// Parse a `Call History` JSON cell. Anything malformed degrades to an empty
/// history rather than failing the row.
fn parse_history(raw: &str) -> Vec<CallEntry> {
  if raw.trim().is_empty() {
    return Vec::new();
  }
  serde_json::from_str(raw).unwrap_or_default()
}

// ─── Maps link ───────────────────────────────────────────────────────────────

/// A search link built from the lead's name and city, for rows whose
/// `Google Maps Link` cell is empty.
fn derived_maps_link(name: &str, city: &str) -> String {
  let query = if city.is_empty() {
    name.to_string()
  } else {
    format!("{name} {city}")
  };
  Url::parse_with_params("https://www.google.com/maps/search/", &[
    ("api", "1"),
    ("query", query.as_str()),
  ])
  .map(String::from)
  .unwrap_or_default()
}

// ─── Row decode ──────────────────────────────────────────────────────────────

/// Decode one data row against the sheet's actual header row.
///
/// `row_index` is the 0-based position within the data rows (sheet row minus
/// two); it feeds the fallback identifier.
pub fn decode_row(
  headers: &[String],
  row: &[String],
  row_index: usize,
) -> Lead {
  let get = |key: &str| cell(headers, row, key).to_string();

  let name = get("LeadName");
  let city = get("BusinessCity");

  let id = {
    let raw = get("PlaceID");
    if raw.is_empty() {
      fallback_id(&name, row_index)
    } else {
      raw
    }
  };

  let maps_link = {
    let raw = get("GoogleMapsLink");
    if raw.is_empty() && !name.is_empty() {
      derived_maps_link(&name, &city)
    } else {
      raw
    }
  };

  let category = {
    let raw = get("Category");
    if raw.is_empty() { "General".to_string() } else { raw }
  };

  Lead {
    id,
    name,
    phone: get("PhoneNumber"),
    telecaller: get("Telecaller"),
    city,
    last_updated: get("LastCallDate"),
    call_status: CallStatus::from_token(&get("CallStatus")),
    remarks: get("Outcome"),
    reminder_date: get("NextFollowupDate"),
    reminder_remark: get("Notes"),
    category,
    website: get("Website"),
    website_status: get("WebsiteStatus"),
    maps_link,
    retrieved_date: get("RetrievedDate"),
    highlighted: get("Highlighted") == "TRUE",
    call_history: parse_history(&get("CallHistory")),
    instagram: get("Instagram"),
    color: get("Color"),
    archived: get("Archived") == "TRUE",
  }
}

/// Decode a full sheet fetch (header row first) into leads, in sheet order.
/// A sheet with no data rows decodes to an empty list.
pub fn decode_leads(rows: &[Vec<String>]) -> Vec<Lead> {
  let Some((headers, data)) = rows.split_first() else {
    return Vec::new();
  };
  data
    .iter()
    .enumerate()
    .map(|(index, row)| decode_row(headers, row, index))
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use leadbook_core::CallStatus;

  use super::*;
  use crate::schema;

  fn canonical_headers() -> Vec<String> {
    schema::COLUMNS.iter().map(|h| h.to_string()).collect()
  }

  fn row_with(pairs: &[(usize, &str)]) -> Vec<String> {
    let mut row = vec![String::new(); schema::COLUMNS.len()];
    for (i, v) in pairs {
      row[*i] = v.to_string();
    }
    row
  }

  #[test]
  fn normalize_strips_punctuation_preserving_case() {
    assert_eq!(normalize_header("Business / City"), "BusinessCity");
    assert_eq!(normalize_header("Next Follow-up Date"), "NextFollowupDate");
    assert_eq!(normalize_header("Place ID"), "PlaceID");
  }

  #[test]
  fn alias_projection_maps_columns_to_fields() {
    let row = row_with(&[
      (schema::col::NAME, "Cafe Luna"),
      (schema::col::PHONE, "+91 111"),
      (schema::col::CITY, "Mumbai"),
      (schema::col::CALL_STATUS, "Follow Up"),
      (schema::col::REMARKS, "asked for brochure"),
      (schema::col::REMINDER_DATE, "2025-06-10"),
      (schema::col::REMINDER_REMARK, "send brochure"),
      (schema::col::PLACE_ID, "p-1"),
    ]);
    let lead = decode_row(&canonical_headers(), &row, 0);
    assert_eq!(lead.id, "p-1");
    assert_eq!(lead.name, "Cafe Luna");
    assert_eq!(lead.phone, "+91 111");
    assert_eq!(lead.city, "Mumbai");
    assert_eq!(lead.call_status, CallStatus::FollowUp);
    assert_eq!(lead.remarks, "asked for brochure");
    assert_eq!(lead.reminder_date, "2025-06-10");
    assert_eq!(lead.reminder_remark, "send brochure");
  }

  #[test]
  fn reordered_headers_still_decode() {
    // Decode looks cells up by name, not position.
    let headers = vec![
      "Phone Number".to_string(),
      "Lead Name".to_string(),
      "Place ID".to_string(),
    ];
    let row = vec![
      "+91 222".to_string(),
      "Blue Door Salon".to_string(),
      "p-2".to_string(),
    ];
    let lead = decode_row(&headers, &row, 0);
    assert_eq!(lead.name, "Blue Door Salon");
    assert_eq!(lead.phone, "+91 222");
    assert_eq!(lead.id, "p-2");
  }

  #[test]
  fn short_rows_decode_to_defaults() {
    // Trailing empty cells are routinely trimmed by the values API.
    let row = vec!["Cafe Luna".to_string()];
    let lead = decode_row(&canonical_headers(), &row, 3);
    assert_eq!(lead.name, "Cafe Luna");
    assert_eq!(lead.phone, "");
    assert_eq!(lead.call_status, CallStatus::NotContacted);
    assert!(lead.call_history.is_empty());
    assert!(!lead.highlighted);
    assert!(!lead.archived);
    assert_eq!(lead.category, "General");
  }

  #[test]
  fn missing_id_gets_slug_and_position_fallback() {
    let row = row_with(&[(schema::col::NAME, "Cafe Luna & Co.")]);
    let lead = decode_row(&canonical_headers(), &row, 7);
    assert_eq!(lead.id, "manual-cafe-luna---co--7");
  }

  #[test]
  fn missing_id_and_name_falls_back_to_position() {
    let row = row_with(&[(schema::col::PHONE, "+91 333")]);
    let lead = decode_row(&canonical_headers(), &row, 4);
    assert_eq!(lead.id, "manual-4");
  }

  #[test]
  fn history_cell_decodes_entries_in_order() {
    let row = row_with(&[(
      schema::col::CALL_HISTORY,
      r#"[{"date":"2025-05-01T10:00:00Z","note":"first call"},
          {"date":"2025-05-03T11:30:00Z","note":"called back"}]"#,
    )]);
    let lead = decode_row(&canonical_headers(), &row, 0);
    assert_eq!(lead.call_history.len(), 2);
    assert_eq!(lead.call_history[0].note, "first call");
    assert_eq!(lead.call_history[1].note, "called back");
  }

  #[test]
  fn malformed_history_degrades_to_empty() {
    for raw in ["not json", "{", "[{\"note\":3}]"] {
      let row = row_with(&[(schema::col::CALL_HISTORY, raw)]);
      let lead = decode_row(&canonical_headers(), &row, 0);
      assert!(lead.call_history.is_empty(), "raw: {raw:?}");
    }
  }

  #[test]
  fn boolean_tokens_decode_strictly() {
    let row = row_with(&[
      (schema::col::HIGHLIGHTED, "TRUE"),
      (schema::col::ARCHIVED, "false"),
    ]);
    let lead = decode_row(&canonical_headers(), &row, 0);
    assert!(lead.highlighted);
    assert!(!lead.archived);
  }

  #[test]
  fn empty_maps_link_is_derived_from_name_and_city() {
    let row = row_with(&[
      (schema::col::NAME, "Cafe Luna"),
      (schema::col::CITY, "Mumbai"),
    ]);
    let lead = decode_row(&canonical_headers(), &row, 0);
    assert!(
      lead
        .maps_link
        .starts_with("https://www.google.com/maps/search/?api=1&query="),
      "maps_link: {}",
      lead.maps_link
    );
    assert!(lead.maps_link.contains("Cafe"));
  }

  #[test]
  fn existing_maps_link_is_kept() {
    let row = row_with(&[
      (schema::col::NAME, "Cafe Luna"),
      (schema::col::MAPS_LINK, "https://maps.google.com/?cid=42"),
    ]);
    let lead = decode_row(&canonical_headers(), &row, 0);
    assert_eq!(lead.maps_link, "https://maps.google.com/?cid=42");
  }

  #[test]
  fn decode_leads_skips_header_and_keeps_order() {
    let rows = vec![
      canonical_headers(),
      row_with(&[(schema::col::NAME, "First"), (schema::col::PLACE_ID, "a")]),
      row_with(&[(schema::col::NAME, "Second"), (schema::col::PLACE_ID, "b")]),
    ];
    let leads = decode_leads(&rows);
    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].id, "a");
    assert_eq!(leads[1].id, "b");
  }

  #[test]
  fn decode_leads_empty_sheet() {
    assert!(decode_leads(&[]).is_empty());
    assert!(decode_leads(&[canonical_headers()]).is_empty());
  }
}
