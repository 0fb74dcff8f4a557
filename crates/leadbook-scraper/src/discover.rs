//! The discovery pipeline: search, filter, collect.

use std::{collections::HashSet, time::Duration};

use chrono::{SecondsFormat, Utc};
use leadbook_core::{NewLead, WebsiteStatus};
use url::Url;

use crate::{
  Result,
  error::Error,
  places::{PlaceDetails, PlacesClient},
  usage::{PLACE_DETAILS_USD, TEXT_SEARCH_USD, UsageMeter},
  website,
};

/// Cap on kept leads per category per run.
pub const MAX_PER_CATEGORY: usize = 30;

/// A fresh `next_page_token` takes a moment to become valid upstream.
const PAGE_TOKEN_PAUSE: Duration = Duration::from_secs(2);

/// A lead is only worth calling if someone reviewed it within the year.
const REVIEW_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

// ─── Discovery ───────────────────────────────────────────────────────────────

pub struct Discovery {
  places: PlacesClient,
  probe:  reqwest::Client,
}

impl Discovery {
  pub fn new(api_key: String) -> Result<Self> {
    Ok(Discovery {
      places: PlacesClient::new(api_key)?,
      probe:  website::probe_client()?,
    })
  }

  /// Search `"{category} in {city}"` for every category and collect leads
  /// whose website is not working.
  ///
  /// `existing` is the pre-fetched dedup set of known lead ids; ids found
  /// during this run are deduped against it too, so a place matching two
  /// categories is kept once. A failing category is logged and skipped; the
  /// run continues.
  pub async fn discover(
    &self,
    city: &str,
    categories: &[String],
    existing: &HashSet<String>,
    meter: &mut UsageMeter,
  ) -> Vec<NewLead> {
    let mut seen: HashSet<String> = existing.clone();
    let mut found = Vec::new();

    for category in categories {
      if meter.exhausted() {
        tracing::warn!("usage limit reached, stopping discovery");
        break;
      }
      if let Err(error) = self
        .discover_category(city, category, &mut seen, meter, &mut found)
        .await
      {
        tracing::error!(%category, %error, "category search failed");
      }
    }

    found
  }

  async fn discover_category(
    &self,
    city: &str,
    category: &str,
    seen: &mut HashSet<String>,
    meter: &mut UsageMeter,
    found: &mut Vec<NewLead>,
  ) -> Result<()> {
    let query = format!("{category} in {city}");
    tracing::info!(%query, "searching");

    let mut page_token: Option<String> = None;
    let mut kept = 0usize;

    loop {
      let page = self
        .places
        .text_search(&query, page_token.as_deref())
        .await?;
      meter.charge(TEXT_SEARCH_USD);

      for hit in &page.results {
        if meter.exhausted() || kept >= MAX_PER_CATEGORY {
          break;
        }
        if seen.contains(&hit.place_id) {
          continue;
        }

        let details = self.places.place_details(&hit.place_id).await?;
        meter.charge(PLACE_DETAILS_USD);
        let Some(details) = details else {
          continue;
        };

        if !has_recent_review(&details, Utc::now().timestamp()) {
          tracing::debug!(name = %details.name, "skipped: reviews stale or absent");
          continue;
        }

        let site = details.website.clone().unwrap_or_default();
        let status = website::classify(&self.probe, &site).await;
        if status == WebsiteStatus::Working {
          continue;
        }

        seen.insert(details.place_id.clone());
        found.push(lead_from_details(details, city, category, status));
        kept += 1;
      }

      page_token = page.next_page_token;
      if page_token.is_none() || kept >= MAX_PER_CATEGORY || meter.exhausted()
      {
        return Ok(());
      }
      tokio::time::sleep(PAGE_TOKEN_PAUSE).await;
    }
  }

  /// Single-URL variant: ingest the place behind a pasted maps link.
  ///
  /// An explicit link is operator intent, so neither the review-recency nor
  /// the website-health filter applies; the status is still recorded.
  /// Returns `None` when the place is already known or yields no details.
  pub async fn discover_link(
    &self,
    link: &str,
    existing: &HashSet<String>,
    meter: &mut UsageMeter,
  ) -> Result<Option<NewLead>> {
    let place_id = place_id_from_link(link)?;
    if existing.contains(&place_id) {
      return Ok(None);
    }

    let details = self.places.place_details(&place_id).await?;
    meter.charge(PLACE_DETAILS_USD);
    let Some(details) = details else {
      return Ok(None);
    };

    let site = details.website.clone().unwrap_or_default();
    let status = website::classify(&self.probe, &site).await;
    let city = details.formatted_address.clone();
    Ok(Some(lead_from_details(details, &city, "General", status)))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn lead_from_details(
  details: PlaceDetails,
  city: &str,
  category: &str,
  status: WebsiteStatus,
) -> NewLead {
  NewLead {
    place_id:       details.place_id,
    name:           details.name,
    city:           city.to_string(),
    category:       category.to_string(),
    phone:          details.formatted_phone_number,
    website:        details.website.unwrap_or_default(),
    website_status: status,
    maps_url:       details.url.unwrap_or_default(),
    retrieved_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
  }
}

/// `true` when the newest review is within [`REVIEW_MAX_AGE_SECS`] of `now`.
fn has_recent_review(details: &PlaceDetails, now: i64) -> bool {
  details
    .reviews
    .iter()
    .map(|r| r.time)
    .max()
    .is_some_and(|latest| latest >= now - REVIEW_MAX_AGE_SECS)
}

/// Extract a place id from a shared maps link.
///
/// Accepts a `query_place_id` query parameter or a bare place id pasted as
/// the whole "link".
fn place_id_from_link(link: &str) -> Result<String> {
  let link = link.trim();
  if let Ok(url) = Url::parse(link) {
    if let Some((_, id)) =
      url.query_pairs().find(|(k, _)| k == "query_place_id")
      && !id.is_empty()
    {
      return Ok(id.into_owned());
    }
    return Err(Error::InvalidLink(link.to_string()));
  }
  // Not a URL at all — treat a bare token as the id itself.
  if !link.is_empty() && !link.contains(char::is_whitespace) {
    return Ok(link.to_string());
  }
  Err(Error::InvalidLink(link.to_string()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
