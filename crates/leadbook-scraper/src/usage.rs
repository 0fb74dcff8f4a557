//! Running cost accumulator for metered Places calls.

/// Approximate list price of one text-search page, USD.
pub const TEXT_SEARCH_USD: f64 = 0.04;
/// Approximate list price of one place-details call, USD.
pub const PLACE_DETAILS_USD: f64 = 0.025;

const DEFAULT_LIMIT_USD: f64 = 190.0;

/// Explicit cost counter, passed into every ingestion call and owned by the
/// caller for the lifetime of the process. Once the limit is reached, all
/// ingestion loops stop issuing paid calls.
#[derive(Debug, Clone)]
pub struct UsageMeter {
  spent_usd: f64,
  limit_usd: f64,
}

impl UsageMeter {
  pub fn new(limit_usd: f64) -> Self {
    UsageMeter {
      spent_usd: 0.0,
      limit_usd,
    }
  }

  /// A meter with the stock monthly budget.
  pub fn with_default_limit() -> Self {
    Self::new(DEFAULT_LIMIT_USD)
  }

  pub fn charge(&mut self, usd: f64) {
    self.spent_usd += usd;
  }

  /// `true` once the accumulated spend has reached the limit.
  pub fn exhausted(&self) -> bool {
    self.spent_usd >= self.limit_usd
  }

  pub fn spent_usd(&self) -> f64 {
    self.spent_usd
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
