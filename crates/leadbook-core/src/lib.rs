//! Core types and trait definitions for the leadbook lead store.
//!
//! This crate is deliberately free of HTTP and spreadsheet dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod lead;
pub mod patch;
pub mod store;

pub use error::{Error, Result};
pub use lead::{CallEntry, CallStatus, Lead, WebsiteStatus};
pub use patch::{LeadPatch, NewLead};
pub use store::LeadStore;
