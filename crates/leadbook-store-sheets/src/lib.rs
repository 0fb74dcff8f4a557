//! Google-Sheets-backed [`LeadStore`](leadbook_core::LeadStore)
//! implementation — the only component that talks to the external sheet.
//!
//! [`SheetStore`] holds the store logic (row resolution, batched patch
//! writes, the overdue-reminder rollover sweep) and is generic over
//! [`ValuesBackend`], the thin seam to the remote values API. The real
//! backend is [`SheetsClient`]; tests run the same store against an
//! in-memory grid.

mod access;
mod client;
mod store;

pub mod error;

pub use client::{SheetsClient, SheetsConfig};
pub use error::{Error, Result};
pub use store::{SheetStore, ValueWrite, ValuesBackend};
