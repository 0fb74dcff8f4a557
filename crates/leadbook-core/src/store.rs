//! The `LeadStore` trait — the seam between the HTTP gateway and a storage
//! backend.
//!
//! The trait is implemented by `leadbook-store-sheets`; higher layers depend
//! on this abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use chrono::NaiveDate;

use crate::{
  lead::Lead,
  patch::{LeadPatch, NewLead},
};

/// Abstraction over a leadbook storage backend.
///
/// All remote calls may fail; implementations surface failures unchanged —
/// no retries, no backoff. Callers decide whether to reconcile or report.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait LeadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch and decode every lead, in sheet order (row order = insertion
  /// order; callers do their own sorting).
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + '_;

  /// Apply a sparse field update to the lead identified by `id`.
  ///
  /// Writes only the changed columns plus an unconditional last-updated
  /// stamp, in one batched call. Fails when `id` does not resolve to a row.
  fn patch<'a>(
    &'a self,
    id: &'a str,
    patch: &'a LeadPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Append newly-discovered leads as full rows, in one call.
  ///
  /// No dedup is performed here; discovery filters against
  /// [`existing_ids`](Self::existing_ids) before appending.
  fn append<'a>(
    &'a self,
    leads: &'a [NewLead],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Advance every strictly-overdue follow-up date to `today` in one batched
  /// write and return the number of leads touched.
  ///
  /// Leads with no follow-up date, or with one that does not parse as a
  /// calendar date, are left untouched.
  fn sync_overdue_reminders(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The set of all known lead identifiers, for discovery-time dedup.
  fn existing_ids(
    &self,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;
}
