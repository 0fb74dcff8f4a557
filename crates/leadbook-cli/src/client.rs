//! Async HTTP client wrapping the leadbook JSON gateway.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use leadbook_core::{Lead, LeadPatch};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::sync::Gateway;

/// Connection settings for the leadbook gateway.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:  String,
  pub access_id: String,
  pub password:  String,
}

/// Summary returned by the discovery endpoints.
#[derive(Debug, Deserialize)]
pub struct ScrapeSummary {
  pub count:   usize,
  pub usage:   f64,
  pub message: String,
}

/// Async HTTP client for the leadbook gateway.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `POST /api/auth/login` — returns the session token.
  pub async fn login(&self) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({
        "accessId": self.config.access_id,
        "password": self.config.password,
      }))
      .send()
      .await
      .context("POST /auth/login failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /auth/login → {}", resp.status()));
    }
    let body: Value = resp.json().await.context("deserialising login")?;
    body["token"]
      .as_str()
      .map(String::from)
      .ok_or_else(|| anyhow!("login response carried no token"))
  }

  /// `POST /api/scrape`
  pub async fn scrape(
    &self,
    city: &str,
    categories: &[String],
  ) -> Result<ScrapeSummary> {
    let resp = self
      .client
      .post(self.url("/scrape"))
      .json(&json!({ "city": city, "categories": categories }))
      .send()
      .await
      .context("POST /scrape failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /scrape → {}", resp.status()));
    }
    resp.json().await.context("deserialising scrape summary")
  }

  /// The gateway stores `callHistory` as a JSON-encoded string cell, so the
  /// wire body carries it re-encoded as a string.
  fn wire_body(patch: &LeadPatch) -> Result<Value> {
    let mut body =
      serde_json::to_value(patch).context("serialising patch")?;
    if let Some(entries) = &patch.call_history {
      body["callHistory"] = Value::String(
        serde_json::to_string(entries).context("serialising history")?,
      );
    }
    Ok(body)
  }
}

impl Gateway for ApiClient {
  /// `GET /api/leads`
  async fn fetch_leads(&self) -> Result<Vec<Lead>> {
    let resp = self
      .client
      .get(self.url("/leads"))
      .send()
      .await
      .context("GET /leads failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /leads → {}", resp.status()));
    }
    resp.json().await.context("deserialising leads")
  }

  /// `PATCH /api/lead/{id}`
  async fn patch_lead(&self, id: &str, patch: &LeadPatch) -> Result<()> {
    let body = Self::wire_body(patch)?;
    let resp = self
      .client
      .patch(self.url(&format!("/lead/{id}")))
      .json(&body)
      .send()
      .await
      .context("PATCH /lead failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("PATCH /lead/{id} → {}", resp.status()));
    }
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
