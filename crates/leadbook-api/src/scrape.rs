//! Handlers for the discovery-ingestion endpoints.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use leadbook_core::LeadStore;
use leadbook_scraper::Error as ScrapeError;

use crate::{AppState, error::ApiError};

// ─── Bulk scrape ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
  pub city:       Option<String>,
  pub categories: Option<Vec<String>>,
}

/// `POST /scrape` — body `{"city": …, "categories": […]}`.
pub async fn run<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ScrapeBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LeadStore + 'static,
{
  let city = body.city.unwrap_or_default();
  let categories = body.categories.unwrap_or_default();
  if city.trim().is_empty() || categories.is_empty() {
    return Err(ApiError::BadRequest(
      "City and categories (array) are required".to_string(),
    ));
  }

  let existing = state
    .store
    .existing_ids()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut meter = state.usage.lock().await;
  let found = state
    .discovery
    .discover(&city, &categories, &existing, &mut meter)
    .await;

  if !found.is_empty() {
    state
      .store
      .append(&found)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  Ok(Json(json!({
    "count": found.len(),
    "usage": meter.spent_usd(),
    "message": format!("Scraped {} new leads.", found.len()),
  })))
}

// ─── Single link ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScrapeLinkBody {
  pub url: Option<String>,
}

/// `POST /scrape-link` — body `{"url": …}`; ingests the one place behind a
/// pasted maps link.
pub async fn run_link<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ScrapeLinkBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LeadStore + 'static,
{
  let url = body.url.unwrap_or_default();
  if url.trim().is_empty() {
    return Err(ApiError::BadRequest("URL is required".to_string()));
  }

  let existing = state
    .store
    .existing_ids()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut meter = state.usage.lock().await;
  let found = state
    .discovery
    .discover_link(&url, &existing, &mut meter)
    .await
    .map_err(|e| match e {
      ScrapeError::InvalidLink(_) => ApiError::BadRequest(e.to_string()),
      other => ApiError::Store(Box::new(other)),
    })?;

  let count = match found {
    Some(lead) => {
      state
        .store
        .append(std::slice::from_ref(&lead))
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      1
    }
    None => 0,
  };

  let message = if count == 1 {
    "Lead added from link.".to_string()
  } else {
    "Lead already tracked or not found.".to_string()
  };
  Ok(Json(json!({
    "count": count,
    "usage": meter.spent_usd(),
    "message": message,
  })))
}
