//! Canonical sheet layout: one spreadsheet, one sheet, a fixed ordered header
//! row. Row 1 is always the header; data begins at row 2.

/// The canonical header row, columns A through U.
///
/// Columns A–J are the telecaller-facing layout; K–U are technical columns
/// written by discovery ingestion and the store client.
pub const COLUMNS: [&str; 21] = [
  "Lead Name",           // A
  "Phone Number",        // B
  "Telecaller",          // C
  "Business / City",     // D
  "Last Call Date",      // E
  "Call Status",         // F
  "Outcome",             // G
  "Next Follow-up Date", // H
  "Attempt Count",       // I
  "Notes",               // J
  "Place ID",            // K
  "Category",            // L
  "Website",             // M
  "Website Status",      // N
  "Google Maps Link",    // O
  "Retrieved Date",      // P
  "Highlighted",         // Q
  "Call History",        // R
  "Instagram",           // S
  "Color",               // T
  "Archived",            // U
];

/// Column indices into [`COLUMNS`], used by the encode path and the store.
pub mod col {
  pub const NAME: usize = 0;
  pub const PHONE: usize = 1;
  pub const TELECALLER: usize = 2;
  pub const CITY: usize = 3;
  pub const LAST_UPDATED: usize = 4;
  pub const CALL_STATUS: usize = 5;
  pub const REMARKS: usize = 6;
  pub const REMINDER_DATE: usize = 7;
  pub const ATTEMPT_COUNT: usize = 8;
  pub const REMINDER_REMARK: usize = 9;
  pub const PLACE_ID: usize = 10;
  pub const CATEGORY: usize = 11;
  pub const WEBSITE: usize = 12;
  pub const WEBSITE_STATUS: usize = 13;
  pub const MAPS_LINK: usize = 14;
  pub const RETRIEVED_DATE: usize = 15;
  pub const HIGHLIGHTED: usize = 16;
  pub const CALL_HISTORY: usize = 17;
  pub const INSTAGRAM: usize = 18;
  pub const COLOR: usize = 19;
  pub const ARCHIVED: usize = 20;
}

/// Sheet row number of the first data row.
pub const FIRST_DATA_ROW: usize = 2;

/// The A1 letter for a 0-based column index. The schema never exceeds
/// column Z.
pub fn column_letter(index: usize) -> char {
  debug_assert!(index < 26);
  (b'A' + index as u8) as char
}

fn last_letter() -> char {
  column_letter(COLUMNS.len() - 1)
}

/// `'{sheet}'!A1:U1`
pub fn header_range(sheet: &str) -> String {
  format!("{sheet}!A1:{}1", last_letter())
}

/// `'{sheet}'!A:U` — the full data range, header row included.
pub fn data_range(sheet: &str) -> String {
  format!("{sheet}!A:{}", last_letter())
}

/// One cell, addressed by column index and 0-based data row index.
pub fn cell_range(sheet: &str, column: usize, row_index: usize) -> String {
  format!(
    "{sheet}!{}{}",
    column_letter(column),
    row_index + FIRST_DATA_ROW
  )
}

/// An entire data column (row 2 downward).
pub fn column_range(sheet: &str, column: usize) -> String {
  let letter = column_letter(column);
  format!("{sheet}!{letter}{FIRST_DATA_ROW}:{letter}")
}

/// `true` when `actual` is exactly the canonical header row.
pub fn header_matches(actual: &[String]) -> bool {
  actual.len() == COLUMNS.len()
    && COLUMNS.iter().zip(actual).all(|(want, got)| want == got)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ranges_cover_a_through_u() {
    assert_eq!(header_range("Leads"), "Leads!A1:U1");
    assert_eq!(data_range("Leads"), "Leads!A:U");
    assert_eq!(column_range("Leads", col::PLACE_ID), "Leads!K2:K");
  }

  #[test]
  fn cell_range_offsets_past_header() {
    // Data row 0 lives in sheet row 2.
    assert_eq!(cell_range("Leads", col::REMINDER_DATE, 0), "Leads!H2");
    assert_eq!(cell_range("Leads", col::NAME, 9), "Leads!A11");
  }

  #[test]
  fn header_matches_is_exact() {
    let canonical: Vec<String> =
      COLUMNS.iter().map(|h| h.to_string()).collect();
    assert!(header_matches(&canonical));

    let mut reordered = canonical.clone();
    reordered.swap(0, 1);
    assert!(!header_matches(&reordered));

    let truncated = canonical[..20].to_vec();
    assert!(!header_matches(&truncated));
  }
}
