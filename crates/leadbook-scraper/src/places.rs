//! Thin client for the Places text-search and details endpoints.

use std::time::Duration;

use serde::Deserialize;

use crate::{Result, error::Error};

const TEXT_SEARCH_URL: &str =
  "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str =
  "https://maps.googleapis.com/maps/api/place/details/json";

/// The detail fields worth paying for.
const DETAILS_FIELDS: &str =
  "name,formatted_phone_number,formatted_address,website,url,place_id,reviews";

// ─── Response shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextSearchPage {
  #[serde(default)]
  pub results:         Vec<SearchHit>,
  pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
  pub place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
  result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
  pub place_id:               String,
  pub name:                   String,
  #[serde(default)]
  pub formatted_phone_number: String,
  #[serde(default)]
  pub formatted_address:      String,
  pub website:                Option<String>,
  /// The canonical Google Maps URL for the place.
  pub url:                    Option<String>,
  #[serde(default)]
  pub reviews:                Vec<Review>,
}

#[derive(Debug, Deserialize)]
pub struct Review {
  /// Unix timestamp (seconds) of the review.
  pub time: i64,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct PlacesClient {
  http:    reqwest::Client,
  api_key: String,
}

impl PlacesClient {
  pub fn new(api_key: String) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(PlacesClient { http, api_key })
  }

  async fn checked(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Api {
      status: status.as_u16(),
      message,
    })
  }

  /// One page of text-search results for `query`; pass the previous page's
  /// token to continue.
  pub async fn text_search(
    &self,
    query: &str,
    page_token: Option<&str>,
  ) -> Result<TextSearchPage> {
    let mut params = vec![("query", query), ("key", self.api_key.as_str())];
    if let Some(token) = page_token {
      params.push(("pagetoken", token));
    }
    let resp = self.http.get(TEXT_SEARCH_URL).query(&params).send().await?;
    Ok(Self::checked(resp).await?.json().await?)
  }

  /// Details for one place, or `None` when the API has nothing for the id.
  pub async fn place_details(
    &self,
    place_id: &str,
  ) -> Result<Option<PlaceDetails>> {
    let resp = self
      .http
      .get(DETAILS_URL)
      .query(&[
        ("place_id", place_id),
        ("fields", DETAILS_FIELDS),
        ("key", self.api_key.as_str()),
      ])
      .send()
      .await?;
    let body: DetailsResponse = Self::checked(resp).await?.json().await?;
    Ok(body.result)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_search_page_deserializes() {
    let page: TextSearchPage = serde_json::from_str(
      r#"{
        "results": [{"place_id": "ChIJa"}, {"place_id": "ChIJb"}],
        "next_page_token": "tok",
        "status": "OK"
      }"#,
    )
    .unwrap();
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.next_page_token.as_deref(), Some("tok"));
  }

  #[test]
  fn empty_page_defaults() {
    let page: TextSearchPage =
      serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
    assert!(page.results.is_empty());
    assert!(page.next_page_token.is_none());
  }

  #[test]
  fn details_tolerate_sparse_fields() {
    let body: DetailsResponse = serde_json::from_str(
      r#"{"result": {"place_id": "ChIJa", "name": "Cafe Luna"}}"#,
    )
    .unwrap();
    let details = body.result.unwrap();
    assert_eq!(details.name, "Cafe Luna");
    assert_eq!(details.formatted_phone_number, "");
    assert!(details.website.is_none());
    assert!(details.reviews.is_empty());
  }
}
