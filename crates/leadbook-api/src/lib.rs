//! JSON REST gateway for leadbook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`LeadStore`](leadbook_core::LeadStore). The route set is mounted under
//! `/api` and duplicated at the root, matching what the browser client
//! expects in production and local development respectively.

pub mod auth;
pub mod error;
pub mod leads;
pub mod scrape;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use leadbook_core::LeadStore;
use leadbook_scraper::{Discovery, UsageMeter};
use serde::Deserialize;
use tokio::sync::Mutex;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  5000
}

/// Runtime server configuration, deserialised from `config.toml` and/or
/// `LEADBOOK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,

  pub spreadsheet_id:        String,
  pub service_account_email: String,
  /// PEM private key of the service account (`\n` escapes tolerated).
  pub private_key:           String,

  pub places_api_key: String,

  /// Comma-separated valid login identifiers.
  pub access_ids: String,
  /// Comma-separated passwords, paired with `access_ids` by position.
  pub passwords:  String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub config:    Arc<ServerConfig>,
  pub discovery: Arc<Discovery>,
  /// Process-lifetime cost accumulator for discovery calls.
  pub usage:     Arc<Mutex<UsageMeter>>,
}

// Manual impl: `Arc` fields clone regardless of whether `S` does.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    AppState {
      store:     Arc::clone(&self.store),
      config:    Arc::clone(&self.config),
      discovery: Arc::clone(&self.discovery),
      usage:     Arc::clone(&self.usage),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the fully-materialised gateway router.
///
/// The returned `Router<()>` serves every route both under `/api` and at the
/// root.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LeadStore + 'static,
{
  let routes = Router::new()
    .route("/auth/login", post(auth::login::<S>))
    .route("/leads", get(leads::list::<S>))
    .route("/lead/{id}", patch(leads::update::<S>))
    .route("/scrape", post(scrape::run::<S>))
    .route("/scrape-link", post(scrape::run_link::<S>))
    .with_state(state);

  Router::new().nest("/api", routes.clone()).merge(routes)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex},
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Local, Utc};
  use leadbook_core::{Error as CoreError, Lead, LeadPatch, NewLead};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  // ── In-memory store ───────────────────────────────────────────────────────

  /// A functional in-memory `LeadStore` for router tests.
  #[derive(Clone, Default)]
  struct MemStore {
    leads: Arc<StdMutex<Vec<Lead>>>,
  }

  impl MemStore {
    fn with_leads(leads: Vec<Lead>) -> Self {
      MemStore {
        leads: Arc::new(StdMutex::new(leads)),
      }
    }

    fn lead(&self, id: &str) -> Option<Lead> {
      self.leads.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }
  }

  impl LeadStore for MemStore {
    type Error = CoreError;

    async fn list_all(&self) -> Result<Vec<Lead>, CoreError> {
      Ok(self.leads.lock().unwrap().clone())
    }

    async fn patch(&self, id: &str, patch: &LeadPatch) -> Result<(), CoreError> {
      let mut leads = self.leads.lock().unwrap();
      let lead = leads
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| CoreError::LeadNotFound(id.to_string()))?;
      lead.apply_patch(patch);
      lead.last_updated = Utc::now().to_rfc3339();
      Ok(())
    }

    async fn append(&self, new: &[NewLead]) -> Result<(), CoreError> {
      let mut leads = self.leads.lock().unwrap();
      for n in new {
        leads.push(Lead {
          id: n.place_id.clone(),
          name: n.name.clone(),
          city: n.city.clone(),
          category: n.category.clone(),
          ..Lead::default()
        });
      }
      Ok(())
    }

    async fn sync_overdue_reminders(
      &self,
      today: chrono::NaiveDate,
    ) -> Result<usize, CoreError> {
      let mut advanced = 0;
      for lead in self.leads.lock().unwrap().iter_mut() {
        if matches!(lead.reminder_day(), Some(day) if day < today) {
          lead.reminder_date = today.format("%Y-%m-%d").to_string();
          advanced += 1;
        }
      }
      Ok(advanced)
    }

    async fn existing_ids(&self) -> Result<HashSet<String>, CoreError> {
      Ok(
        self
          .leads
          .lock()
          .unwrap()
          .iter()
          .map(|l| l.id.clone())
          .collect(),
      )
    }
  }

  // ── Harness ───────────────────────────────────────────────────────────────

  fn make_state(store: MemStore) -> AppState<MemStore> {
    AppState {
      store:     Arc::new(store),
      config:    Arc::new(ServerConfig {
        host:                  "127.0.0.1".to_string(),
        port:                  5000,
        spreadsheet_id:        "sheet".to_string(),
        service_account_email: "svc@example.iam.gserviceaccount.com"
          .to_string(),
        private_key:           String::new(),
        places_api_key:        "test-key".to_string(),
        access_ids:            "ops,field".to_string(),
        passwords:             "alpha,beta".to_string(),
      }),
      discovery: Arc::new(Discovery::new("test-key".to_string()).unwrap()),
      usage:     Arc::new(Mutex::new(UsageMeter::with_default_limit())),
    }
  }

  async fn request(
    state: AppState<MemStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn seeded_lead(id: &str) -> Lead {
    Lead {
      id: id.to_string(),
      name: "Cafe Luna".to_string(),
      city: "Mumbai".to_string(),
      ..Lead::default()
    }
  }

  // ── Login ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_with_valid_pair_returns_token() {
    let state = make_state(MemStore::default());
    let (status, body) = request(
      state,
      "POST",
      "/auth/login",
      Some(json!({ "accessId": "field", "password": "beta" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
  }

  #[tokio::test]
  async fn login_with_crossed_pair_is_rejected() {
    let state = make_state(MemStore::default());
    let (status, body) = request(
      state,
      "POST",
      "/auth/login",
      Some(json!({ "accessId": "ops", "password": "beta" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("Invalid"));
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_leads_returns_decoded_list() {
    let state = make_state(MemStore::with_leads(vec![seeded_lead("p-1")]));
    let (status, body) = request(state, "GET", "/leads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], json!("p-1"));
    assert_eq!(body[0]["name"], json!("Cafe Luna"));
  }

  #[tokio::test]
  async fn get_leads_rolls_overdue_reminders_to_today() {
    let mut lead = seeded_lead("p-1");
    lead.reminder_date = "2020-01-01".to_string();
    let state = make_state(MemStore::with_leads(vec![lead]));

    let (status, body) = request(state, "GET", "/leads", None).await;
    assert_eq!(status, StatusCode::OK);
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(body[0]["reminderDate"], json!(today));
  }

  #[tokio::test]
  async fn routes_are_mounted_at_api_prefix_too() {
    let state = make_state(MemStore::with_leads(vec![seeded_lead("p-1")]));
    let (status, body) = request(state, "GET", "/api/leads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  // ── Patch ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_applies_named_fields() {
    let store = MemStore::with_leads(vec![seeded_lead("p-1")]);
    let state = make_state(store.clone());

    let (status, body) = request(
      state,
      "PATCH",
      "/lead/p-1",
      Some(json!({ "remarks": "x", "highlighted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let lead = store.lead("p-1").unwrap();
    assert_eq!(lead.remarks, "x");
    assert!(lead.highlighted);
    assert_eq!(lead.name, "Cafe Luna");
  }

  #[tokio::test]
  async fn patch_ignores_unrecognized_fields() {
    let store = MemStore::with_leads(vec![seeded_lead("p-1")]);
    let state = make_state(store.clone());

    let (status, _) = request(
      state,
      "PATCH",
      "/lead/p-1",
      Some(json!({ "remarks": "x", "totallyUnknown": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.lead("p-1").unwrap().remarks, "x");
  }

  #[tokio::test]
  async fn patch_decodes_json_encoded_history() {
    let store = MemStore::with_leads(vec![seeded_lead("p-1")]);
    let state = make_state(store.clone());

    let history = r#"[{"date":"2025-05-01T10:00:00Z","note":"called back"}]"#;
    let (status, _) = request(
      state,
      "PATCH",
      "/lead/p-1",
      Some(json!({ "callHistory": history, "reminderRemark": "called back" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lead = store.lead("p-1").unwrap();
    assert_eq!(lead.call_history.len(), 1);
    assert_eq!(lead.call_history[0].note, "called back");
    assert_eq!(lead.reminder_remark, "called back");
  }

  #[tokio::test]
  async fn patch_with_malformed_history_is_a_bad_request() {
    let store = MemStore::with_leads(vec![seeded_lead("p-1")]);
    let state = make_state(store.clone());

    let (status, body) = request(
      state,
      "PATCH",
      "/lead/p-1",
      Some(json!({ "callHistory": "not json" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("callHistory"));
    // Nothing reached the store.
    assert!(store.lead("p-1").unwrap().call_history.is_empty());
  }

  #[tokio::test]
  async fn patch_unknown_id_is_a_server_error() {
    let state = make_state(MemStore::with_leads(vec![seeded_lead("p-1")]));
    let (status, body) = request(
      state,
      "PATCH",
      "/lead/missing",
      Some(json!({ "remarks": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("missing"));
  }

  // ── Scrape validation ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn scrape_without_city_is_a_bad_request() {
    let state = make_state(MemStore::default());
    let (status, body) = request(
      state,
      "POST",
      "/scrape",
      Some(json!({ "categories": ["Restaurant"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("City"));
  }

  #[tokio::test]
  async fn scrape_with_empty_categories_is_a_bad_request() {
    let state = make_state(MemStore::default());
    let (status, _) = request(
      state,
      "POST",
      "/scrape",
      Some(json!({ "city": "Mumbai", "categories": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn scrape_link_without_url_is_a_bad_request() {
    let state = make_state(MemStore::default());
    let (status, _) =
      request(state, "POST", "/scrape-link", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn scrape_link_with_unparseable_link_is_a_bad_request() {
    let state = make_state(MemStore::default());
    let (status, body) = request(
      state,
      "POST",
      "/scrape-link",
      Some(json!({ "url": "https://www.google.com/maps/search/?query=cafe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("place id"));
  }
}
