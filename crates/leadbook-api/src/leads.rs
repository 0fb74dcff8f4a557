//! Handlers for the lead list and partial-update endpoints.
//!
//! | Method  | Path         | Notes |
//! |---------|--------------|-------|
//! | `GET`   | `/leads`     | Runs the rollover sweep, then lists |
//! | `PATCH` | `/lead/{id}` | Sparse body of recognized fields |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};

use leadbook_core::{CallEntry, CallStatus, Lead, LeadPatch, LeadStore};

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /leads`
///
/// Runs the overdue-reminder rollover sweep first so "today" views are
/// self-healing, then returns the full decoded list. A failed sweep is
/// logged and does not block the read.
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Lead>>, ApiError>
where
  S: LeadStore + 'static,
{
  let today = Local::now().date_naive();
  if let Err(error) = state.store.sync_overdue_reminders(today).await {
    tracing::warn!(%error, "reminder rollover sweep failed");
  }

  let leads = state
    .store
    .list_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(leads))
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// The public sparse-update vocabulary. Unrecognized fields in the request
/// body are ignored, not errored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadBody {
  pub name:            Option<String>,
  pub phone:           Option<String>,
  pub city:            Option<String>,
  pub instagram:       Option<String>,
  pub website:         Option<String>,
  pub telecaller:      Option<String>,
  pub call_status:     Option<CallStatus>,
  pub remarks:         Option<String>,
  pub reminder_date:   Option<String>,
  pub reminder_remark: Option<String>,
  /// JSON-encoded `[{date, note}, …]`, as the sheet stores it.
  pub call_history:    Option<String>,
  pub color:           Option<String>,
  pub highlighted:     Option<bool>,
  pub archived:        Option<bool>,
}

impl UpdateLeadBody {
  /// Translate the wire body into a store patch, decoding the JSON-encoded
  /// history sequence.
  pub fn into_patch(self) -> Result<LeadPatch, ApiError> {
    let call_history = match self.call_history {
      Some(raw) => Some(
        serde_json::from_str::<Vec<CallEntry>>(&raw).map_err(|e| {
          ApiError::BadRequest(format!("callHistory is not valid JSON: {e}"))
        })?,
      ),
      None => None,
    };

    Ok(LeadPatch {
      name: self.name,
      phone: self.phone,
      city: self.city,
      instagram: self.instagram,
      website: self.website,
      telecaller: self.telecaller,
      call_status: self.call_status,
      remarks: self.remarks,
      reminder_date: self.reminder_date,
      reminder_remark: self.reminder_remark,
      call_history,
      color: self.color,
      highlighted: self.highlighted,
      archived: self.archived,
    })
  }
}

/// `PATCH /lead/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateLeadBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LeadStore + 'static,
{
  tracing::debug!(%id, "patching lead");
  let patch = body.into_patch()?;
  state
    .store
    .patch(&id, &patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "success": true })))
}
