//! `POST /auth/login` — static credential comparison against the configured
//! comma-separated access-id / password lists.

use axum::{Json, extract::State};
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use leadbook_core::LeadStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
  pub access_id: String,
  pub password:  String,
}

/// `true` when `access_id`/`password` match at the same position of the
/// configured lists. Entries are trimmed; list lengths may differ, unpaired
/// entries never match.
pub fn credentials_match(
  access_ids: &str,
  passwords: &str,
  access_id: &str,
  password: &str,
) -> bool {
  access_ids
    .split(',')
    .zip(passwords.split(','))
    .any(|(id, pw)| id.trim() == access_id && pw.trim() == password)
}

/// An opaque session token. Returned to the client as its login receipt;
/// nothing server-side is keyed on it.
fn issue_token() -> String {
  let mut nonce = [0u8; 32];
  OsRng.fill_bytes(&mut nonce);
  hex::encode(Sha256::digest(nonce))
}

/// `POST /auth/login` — body `{"accessId": …, "password": …}`.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LeadStore + 'static,
{
  if !credentials_match(
    &state.config.access_ids,
    &state.config.passwords,
    &body.access_id,
    &body.password,
  ) {
    return Err(ApiError::Unauthorized(
      "Invalid access ID or password".to_string(),
    ));
  }
  Ok(Json(json!({ "success": true, "token": issue_token() })))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pairs_match_by_position() {
    assert!(credentials_match("ops, field", "alpha, beta", "field", "beta"));
    assert!(credentials_match("ops, field", "alpha, beta", "ops", "alpha"));
  }

  #[test]
  fn crossed_pairs_do_not_match() {
    assert!(!credentials_match("ops,field", "alpha,beta", "ops", "beta"));
    assert!(!credentials_match("ops,field", "alpha,beta", "field", "alpha"));
  }

  #[test]
  fn unpaired_entries_never_match() {
    // Three ids, two passwords: the third id has no password to pair with.
    assert!(!credentials_match("a,b,c", "p1,p2", "c", ""));
  }

  #[test]
  fn tokens_are_unique_hex() {
    let a = issue_token();
    let b = issue_token();
    assert_eq!(a.len(), 64);
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
  }
}
