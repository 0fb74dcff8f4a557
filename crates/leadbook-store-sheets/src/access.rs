//! Service-account access tokens for the Google APIs.
//!
//! Mints a short-lived bearer token from an RS256-signed JWT grant
//! (OAuth 2.0 `jwt-bearer` flow) and caches it until shortly before expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Result, client::ok_or_api_error};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh this long before the token actually expires.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Serialize)]
struct Claims {
  iss:   String,
  scope: String,
  aud:   String,
  iat:   i64,
  exp:   i64,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in:   i64,
}

struct CachedToken {
  token:      String,
  expires_at: DateTime<Utc>,
}

/// Signs JWT grants for one service account and hands out cached bearer
/// tokens.
pub(crate) struct AccessBroker {
  email:  String,
  key:    EncodingKey,
  cached: Mutex<Option<CachedToken>>,
}

impl AccessBroker {
  /// `private_key` is the PEM from the service-account JSON. Keys passed
  /// through env files carry literal `\n` escapes; those are unescaped here.
  pub(crate) fn new(email: String, private_key: &str) -> Result<Self> {
    let pem = private_key.replace("\\n", "\n");
    let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
    Ok(AccessBroker {
      email,
      key,
      cached: Mutex::new(None),
    })
  }

  /// A valid bearer token, minting a fresh one when the cached token is
  /// absent or within [`EXPIRY_SLACK_SECS`] of expiry.
  pub(crate) async fn token(&self, http: &reqwest::Client) -> Result<String> {
    let mut cached = self.cached.lock().await;
    let now = Utc::now();

    if let Some(c) = cached.as_ref()
      && now < c.expires_at - Duration::seconds(EXPIRY_SLACK_SECS)
    {
      return Ok(c.token.clone());
    }

    let claims = Claims {
      iss:   self.email.clone(),
      scope: SCOPE.to_string(),
      aud:   TOKEN_URL.to_string(),
      iat:   now.timestamp(),
      exp:   now.timestamp() + 3600,
    };
    let assertion =
      jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;

    let resp = http
      .post(TOKEN_URL)
      .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
      .send()
      .await?;
    let resp = ok_or_api_error(resp).await?;
    let granted: TokenResponse = resp.json().await?;

    let token = granted.access_token.clone();
    *cached = Some(CachedToken {
      token:      granted.access_token,
      expires_at: now + Duration::seconds(granted.expires_in),
    });
    Ok(token)
  }
}
