//! Sheet row codec for leadbook.
//!
//! Converts between the flat, column-addressed rows of the backing
//! spreadsheet and [`leadbook_core`] domain types. Pure synchronous; no HTTP
//! dependencies.
//!
//! Decode is tolerant: cells are looked up by (normalized) header name, so a
//! reordered or extended sheet still reads correctly, and missing cells
//! become defaults. Encode is strict: it assumes the canonical column order,
//! which [`schema::header_matches`] verifies (and the store rewrites) at
//! startup.

pub mod decode;
pub mod encode;
pub mod schema;

pub use decode::{decode_leads, decode_row, fallback_id};
pub use encode::{ColumnWrite, encode_history, encode_patch, encode_row};

// ─── Round-trip test ─────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use leadbook_core::{NewLead, WebsiteStatus};

  use super::*;

  #[test]
  fn append_row_survives_decode() {
    let lead = NewLead {
      place_id:       "ChIJabc123".to_string(),
      name:           "Cafe Luna".to_string(),
      city:           "Mumbai".to_string(),
      category:       "Restaurant".to_string(),
      phone:          "+91 98765 43210".to_string(),
      website:        "https://cafeluna.example".to_string(),
      website_status: WebsiteStatus::Broken,
      maps_url:       "https://maps.google.com/?cid=42".to_string(),
      retrieved_date: "2025-06-01T09:00:00.000Z".to_string(),
    };

    let row = encode_row(&lead).expect("encode");
    assert_eq!(row.len(), schema::COLUMNS.len());

    let headers: Vec<String> =
      schema::COLUMNS.iter().map(|h| h.to_string()).collect();
    let decoded = decode_row(&headers, &row, 0);

    assert_eq!(decoded.id, "ChIJabc123");
    assert_eq!(decoded.name, "Cafe Luna");
    assert_eq!(decoded.city, "Mumbai");
    assert_eq!(decoded.category, "Restaurant");
    assert_eq!(decoded.phone, "+91 98765 43210");
    assert_eq!(decoded.website, "https://cafeluna.example");
    assert_eq!(decoded.website_status, "broken");
    assert_eq!(decoded.maps_link, "https://maps.google.com/?cid=42");
    assert_eq!(decoded.retrieved_date, "2025-06-01T09:00:00.000Z");
    // The retrieval timestamp doubles as the initial last-updated stamp.
    assert_eq!(decoded.last_updated, "2025-06-01T09:00:00.000Z");
    // Technical defaults.
    assert_eq!(decoded.call_status, leadbook_core::CallStatus::NotContacted);
    assert!(decoded.call_history.is_empty());
    assert!(!decoded.highlighted);
    assert!(!decoded.archived);
    assert_eq!(decoded.telecaller, "");
    assert_eq!(decoded.remarks, "");
    assert_eq!(decoded.reminder_date, "");
    assert_eq!(decoded.reminder_remark, "");
    assert_eq!(decoded.instagram, "");
    assert_eq!(decoded.color, "");
    assert_eq!(row[schema::col::ATTEMPT_COUNT], "0");
  }
}
