//! Website health classification.
//!
//! Decides, from one probe request, whether a business's site is worth a
//! redesign pitch. The classification is stored on the lead at discovery
//! time and never re-run.

use std::time::Duration;

use leadbook_core::WebsiteStatus;

use crate::Result;

/// Sites that block obvious bots still need a browser-looking probe.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bodies shorter than this are assumed to be placeholders.
const MIN_LIVE_BODY_BYTES: usize = 500;

/// Build the probe client used by [`classify`].
pub fn probe_client() -> Result<reqwest::Client> {
  Ok(
    reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(PROBE_TIMEOUT)
      .build()?,
  )
}

/// Classify `url` by fetching it once.
///
/// - no url at all → `Missing`
/// - 404 or any 5xx → `Broken`
/// - 401/403/406/429 → `Working` (alive, just walling off scrapers)
/// - any other 4xx → `Broken`
/// - tiny or parked-looking body → `NonFunctional`
/// - network failure of any kind → `Broken`
pub async fn classify(http: &reqwest::Client, url: &str) -> WebsiteStatus {
  if url.trim().is_empty() {
    return WebsiteStatus::Missing;
  }

  let resp = match http.get(url).send().await {
    Ok(resp) => resp,
    Err(_) => return WebsiteStatus::Broken,
  };

  let status = resp.status().as_u16();
  if status == 404 || status >= 500 {
    return WebsiteStatus::Broken;
  }
  if matches!(status, 401 | 403 | 406 | 429) {
    return WebsiteStatus::Working;
  }
  if status >= 400 {
    return WebsiteStatus::Broken;
  }

  let body = resp.text().await.unwrap_or_default().to_lowercase();
  if classify_body(&body) == WebsiteStatus::NonFunctional {
    return WebsiteStatus::NonFunctional;
  }
  WebsiteStatus::Working
}

/// The body-content half of the heuristic, split out for testing.
fn classify_body(lowercased: &str) -> WebsiteStatus {
  if lowercased.len() < MIN_LIVE_BODY_BYTES
    || lowercased.contains("parked")
    || lowercased.contains("buy this domain")
  {
    WebsiteStatus::NonFunctional
  } else {
    WebsiteStatus::Working
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_bodies_look_parked() {
    assert_eq!(classify_body("<html></html>"), WebsiteStatus::NonFunctional);
  }

  #[test]
  fn parked_markers_flag_non_functional() {
    let long_parked =
      format!("{} this domain is parked", "x".repeat(MIN_LIVE_BODY_BYTES));
    assert_eq!(classify_body(&long_parked), WebsiteStatus::NonFunctional);

    let long_for_sale =
      format!("{} buy this domain today", "x".repeat(MIN_LIVE_BODY_BYTES));
    assert_eq!(classify_body(&long_for_sale), WebsiteStatus::NonFunctional);
  }

  #[test]
  fn substantial_bodies_are_working() {
    let body = "lorem ipsum ".repeat(100);
    assert_eq!(classify_body(&body), WebsiteStatus::Working);
  }
}
