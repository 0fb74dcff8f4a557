//! Thin REST client for the Google Sheets v4 values API.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::{
  Result,
  access::AccessBroker,
  error::Error,
  store::{ValueWrite, ValuesBackend},
};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Connection settings for the sheet backend.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
  pub spreadsheet_id:        String,
  pub service_account_email: String,
  /// PEM private key from the service-account JSON (literal `\n` escapes
  /// tolerated).
  pub private_key:           String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
  #[serde(default)]
  sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
  properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
  title: String,
}

#[derive(Deserialize)]
struct ValueRange {
  #[serde(default)]
  values: Vec<Vec<String>>,
}

/// Surface a non-success response as [`Error::Api`], verbatim.
pub(crate) async fn ok_or_api_error(
  resp: reqwest::Response,
) -> Result<reqwest::Response> {
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

// ─── Client ──────────────────────────────────────────────────────────────────

/// Authenticated client bound to one spreadsheet.
///
/// The first sheet's title is resolved once at connect time and used to
/// qualify every range.
pub struct SheetsClient {
  http:           reqwest::Client,
  access:         AccessBroker,
  spreadsheet_id: String,
  sheet_title:    String,
}

impl SheetsClient {
  /// Build the HTTP client, mint a first token, and resolve the sheet title.
  pub async fn connect(config: SheetsConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    let access = AccessBroker::new(
      config.service_account_email.clone(),
      &config.private_key,
    )?;

    let token = access.token(&http).await?;
    let url = format!(
      "{SHEETS_BASE}/{}?fields=sheets.properties.title",
      config.spreadsheet_id
    );
    let resp = http.get(&url).bearer_auth(&token).send().await?;
    let meta: SpreadsheetMeta = ok_or_api_error(resp).await?.json().await?;
    let sheet_title = meta
      .sheets
      .first()
      .map(|s| s.properties.title.clone())
      .ok_or(Error::NoSheet)?;

    tracing::debug!(%sheet_title, "connected to spreadsheet");
    Ok(SheetsClient {
      http,
      access,
      spreadsheet_id: config.spreadsheet_id,
      sheet_title,
    })
  }

  fn values_url(&self, tail: &str) -> String {
    format!("{SHEETS_BASE}/{}/values{tail}", self.spreadsheet_id)
  }
}

// ─── ValuesBackend impl ──────────────────────────────────────────────────────

impl ValuesBackend for SheetsClient {
  fn sheet_title(&self) -> &str {
    &self.sheet_title
  }

  async fn get(&self, range: &str) -> Result<Vec<Vec<String>>> {
    let token = self.access.token(&self.http).await?;
    let resp = self
      .http
      .get(self.values_url(&format!("/{range}")))
      .bearer_auth(&token)
      .send()
      .await?;
    let body: ValueRange = ok_or_api_error(resp).await?.json().await?;
    Ok(body.values)
  }

  async fn update(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
    let token = self.access.token(&self.http).await?;
    let resp = self
      .http
      .put(self.values_url(&format!("/{range}")))
      .query(&[("valueInputOption", "RAW")])
      .bearer_auth(&token)
      .json(&json!({ "values": values }))
      .send()
      .await?;
    ok_or_api_error(resp).await?;
    Ok(())
  }

  async fn batch_update(&self, writes: Vec<ValueWrite>) -> Result<()> {
    let token = self.access.token(&self.http).await?;
    let data: Vec<_> = writes
      .iter()
      .map(|w| json!({ "range": w.range, "values": w.values }))
      .collect();
    let resp = self
      .http
      .post(self.values_url(":batchUpdate"))
      .bearer_auth(&token)
      .json(&json!({ "valueInputOption": "RAW", "data": data }))
      .send()
      .await?;
    ok_or_api_error(resp).await?;
    Ok(())
  }

  async fn append(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
    let token = self.access.token(&self.http).await?;
    let resp = self
      .http
      .post(self.values_url(&format!("/{range}:append")))
      .query(&[("valueInputOption", "RAW")])
      .bearer_auth(&token)
      .json(&json!({ "values": values }))
      .send()
      .await?;
    ok_or_api_error(resp).await?;
    Ok(())
  }
}
