//! Discovery ingestion: query the Places API for businesses in a city,
//! filter by review recency and website health, and hand back leads worth
//! calling.
//!
//! The pipeline is a straightforward filter-and-collect; every external call
//! is metered against an explicit [`UsageMeter`] owned by the caller, and
//! failures in one category abort that category, not the run.

pub mod discover;
pub mod error;
pub mod places;
pub mod usage;
pub mod website;

pub use discover::{Discovery, MAX_PER_CATEGORY};
pub use error::{Error, Result};
pub use usage::{PLACE_DETAILS_USD, TEXT_SEARCH_USD, UsageMeter};
