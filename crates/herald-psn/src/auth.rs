//! NPSSO credential exchange against the PSN OAuth endpoints.
//!
//! The flow mirrors what the official PlayStation app does: the long-lived
//! NPSSO cookie is traded for a one-shot access code via a redirect, and the
//! code is then traded for a bearer token.

use reqwest::header;
use url::Url;

use crate::error::{PsnError, Result};

const AUTH_BASE: &str = "https://ca.account.sony.com/api/authz/v3/oauth";
const CLIENT_ID: &str = "09515159-7237-4370-9b40-3806e67c0891";
const REDIRECT_URI: &str = "com.scee.psxandroid.scecompcall://redirect";
// Pre-encoded `client_id:client_secret` of the mobile app client.
const CLIENT_BASIC: &str = "Basic MDk1MTUxNTktNzIzNy00MzcwLTliNDAtMzgwNmU2N2MwODkxOnVjUGprYTV0bnRCMktxc1A=";

/// Bearer token for the trophy API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Exchanges an NPSSO token for a trophy-API access token.
///
/// `http` must be a client with redirects disabled: the access code is
/// carried in the `Location` header of a 302 response that points at a
/// non-HTTP scheme.
pub async fn authenticate(http: &reqwest::Client, npsso: &str) -> Result<AccessToken> {
    let code = exchange_npsso_for_code(http, npsso).await?;
    exchange_code_for_token(http, &code).await
}

async fn exchange_npsso_for_code(http: &reqwest::Client, npsso: &str) -> Result<String> {
    let response = http
        .get(format!("{AUTH_BASE}/authorize"))
        .query(&[
            ("access_type", "offline"),
            ("client_id", CLIENT_ID),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("scope", "psn:mobile.v2.core psn:clientapp"),
        ])
        .header(header::COOKIE, format!("npsso={npsso}"))
        .send()
        .await?;

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            PsnError::Authentication(
                "authorize endpoint did not redirect; the NPSSO token was rejected".to_string(),
            )
        })?;

    let url = Url::parse(location)
        .map_err(|e| PsnError::UnexpectedResponse(format!("bad redirect location: {e}")))?;

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            PsnError::Authentication(
                "redirect carried no access code; the NPSSO token is likely expired".to_string(),
            )
        })
}

async fn exchange_code_for_token(http: &reqwest::Client, code: &str) -> Result<AccessToken> {
    let response = http
        .post(format!("{AUTH_BASE}/token"))
        .header(header::AUTHORIZATION, CLIENT_BASIC)
        .form(&[
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
            ("token_format", "jwt"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PsnError::Authentication(format!(
            "token exchange failed with status {status}"
        )));
    }

    Ok(response.json().await?)
}
