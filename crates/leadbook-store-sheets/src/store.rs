//! [`SheetStore`] — the sheet-backed implementation of
//! [`LeadStore`](leadbook_core::LeadStore).

use std::{collections::HashSet, future::Future};

use chrono::{NaiveDate, SecondsFormat, Utc};
use leadbook_core::{Lead, LeadPatch, LeadStore, NewLead};
use leadbook_sheet::{
  decode_leads, encode_patch, encode_row, fallback_id, schema,
};

use crate::{Error, Result};

// ─── Backend seam ────────────────────────────────────────────────────────────

/// One range's worth of cell values for a batched write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWrite {
  pub range:  String,
  pub values: Vec<Vec<String>>,
}

impl ValueWrite {
  /// A single-cell write.
  pub fn cell(range: String, value: String) -> Self {
    ValueWrite {
      range,
      values: vec![vec![value]],
    }
  }
}

/// The remote values API, reduced to the four calls the store needs.
///
/// Implemented by [`SheetsClient`](crate::SheetsClient) over HTTP and by an
/// in-memory grid in tests. Implementations surface remote failures
/// unchanged; there are no retries at any layer.
pub trait ValuesBackend: Send + Sync {
  /// Title of the sheet all ranges are qualified with.
  fn sheet_title(&self) -> &str;

  fn get<'a>(
    &'a self,
    range: &'a str,
  ) -> impl Future<Output = Result<Vec<Vec<String>>>> + Send + 'a;

  fn update<'a>(
    &'a self,
    range: &'a str,
    values: Vec<Vec<String>>,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// One atomic-enough multi-range write: all listed ranges are submitted in
  /// a single call, so a patch either lands whole or errors whole.
  fn batch_update(
    &self,
    writes: Vec<ValueWrite>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn append<'a>(
    &'a self,
    range: &'a str,
    values: Vec<Vec<String>>,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lead store backed by a single sheet.
pub struct SheetStore<B> {
  pub(crate) backend: B,
}

impl<B: ValuesBackend> SheetStore<B> {
  pub fn new(backend: B) -> Self {
    SheetStore { backend }
  }

  /// Compare the actual header row to the canonical schema and rewrite it on
  /// mismatch. Returns `true` when a rewrite happened. Run once at startup,
  /// before any encode-path write.
  pub async fn ensure_header_row(&self) -> Result<bool> {
    let title = self.backend.sheet_title();
    let range = schema::header_range(title);
    let rows = self.backend.get(&range).await?;
    let actual = rows.first().map(Vec::as_slice).unwrap_or(&[]);

    if schema::header_matches(actual) {
      return Ok(false);
    }
    let canonical: Vec<String> =
      schema::COLUMNS.iter().map(|h| h.to_string()).collect();
    self.backend.update(&range, vec![canonical]).await?;
    tracing::info!("rewrote sheet header row to canonical schema");
    Ok(true)
  }

  /// All row identifiers, in data-row order, with the decode-side fallback
  /// applied to rows whose id cell is empty.
  ///
  /// Fetches only the id and name columns — never the full sheet. A linear
  /// scan over these is the whole "index"; at this sheet's scale (hundreds
  /// to low thousands of rows) nothing more is warranted.
  async fn resolved_ids(&self) -> Result<Vec<String>> {
    let title = self.backend.sheet_title();
    let ids = self
      .backend
      .get(&schema::column_range(title, schema::col::PLACE_ID))
      .await?;
    let names = self
      .backend
      .get(&schema::column_range(title, schema::col::NAME))
      .await?;

    let first_cell = |rows: &[Vec<String>], index: usize| -> String {
      rows
        .get(index)
        .and_then(|row| row.first())
        .cloned()
        .unwrap_or_default()
    };

    let count = ids.len().max(names.len());
    Ok(
      (0..count)
        .map(|index| {
          let raw = first_cell(&ids, index);
          if raw.is_empty() {
            fallback_id(&first_cell(&names, index), index)
          } else {
            raw
          }
        })
        .collect(),
    )
  }

  /// Resolve an identifier to its 0-based data row index, or `None`.
  ///
  /// Not transactional with a subsequent write: a row could move between
  /// resolution and write. Accepted for this write volume.
  pub async fn find_row_by_id(&self, id: &str) -> Result<Option<usize>> {
    let ids = self.resolved_ids().await?;
    Ok(ids.iter().position(|candidate| candidate == id))
  }
}

// ─── LeadStore impl ──────────────────────────────────────────────────────────

impl<B: ValuesBackend> LeadStore for SheetStore<B> {
  type Error = Error;

  async fn list_all(&self) -> Result<Vec<Lead>> {
    let title = self.backend.sheet_title();
    let rows = self.backend.get(&schema::data_range(title)).await?;
    Ok(decode_leads(&rows))
  }

  async fn patch(&self, id: &str, patch: &LeadPatch) -> Result<()> {
    let row_index = self
      .find_row_by_id(id)
      .await?
      .ok_or_else(|| Error::LeadNotFound(id.to_string()))?;

    let title = self.backend.sheet_title();
    let mut writes: Vec<ValueWrite> = encode_patch(patch)
      .map_err(Error::Core)?
      .into_iter()
      .map(|w| {
        ValueWrite::cell(schema::cell_range(title, w.column, row_index), w.value)
      })
      .collect();

    // Every accepted write freshens the last-updated stamp.
    writes.push(ValueWrite::cell(
      schema::cell_range(title, schema::col::LAST_UPDATED, row_index),
      Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    ));

    self.backend.batch_update(writes).await
  }

  async fn append(&self, leads: &[NewLead]) -> Result<()> {
    if leads.is_empty() {
      return Ok(());
    }
    let rows = leads
      .iter()
      .map(|lead| encode_row(lead).map_err(Error::Core))
      .collect::<Result<Vec<_>>>()?;
    let title = self.backend.sheet_title();
    self.backend.append(&schema::data_range(title), rows).await
  }

  async fn sync_overdue_reminders(&self, today: NaiveDate) -> Result<usize> {
    let title = self.backend.sheet_title();
    let rows = self.backend.get(&schema::data_range(title)).await?;
    let leads = decode_leads(&rows);

    let today_cell = today.format("%Y-%m-%d").to_string();
    let writes: Vec<ValueWrite> = leads
      .iter()
      .enumerate()
      .filter(|(_, lead)| {
        matches!(lead.reminder_day(), Some(day) if day < today)
      })
      .map(|(index, _)| {
        ValueWrite::cell(
          schema::cell_range(title, schema::col::REMINDER_DATE, index),
          today_cell.clone(),
        )
      })
      .collect();

    let advanced = writes.len();
    if advanced > 0 {
      self.backend.batch_update(writes).await?;
      tracing::info!(advanced, "rolled overdue follow-ups forward to today");
    }
    Ok(advanced)
  }

  async fn existing_ids(&self) -> Result<HashSet<String>> {
    Ok(self.resolved_ids().await?.into_iter().collect())
  }
}
