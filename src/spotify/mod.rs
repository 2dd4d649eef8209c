//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API that plartists needs.
//!
//! ```text
//! CLI (playlist, playlists, artists)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, token refresh)
//!     └── Playlists (fetch by id, user playlists, artist counts)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`crate::error::Result`]:
//! - transport failures become [`Error::Http`]
//! - non-success responses become [`Error::Api`] carrying Spotify's status
//!   and message; an expired access token is recognised with
//!   [`Error::is_token_expired`]
//!
//! ## Rate Limiting
//!
//! - 502 Bad Gateway is retried after a 10 second delay
//! - 429 Too Many Requests is retried after `Retry-After` seconds, as long as
//!   Spotify asks for at most two minutes
//!
//! ## API Coverage
//!
//! - `GET /playlists/{playlist_id}` and the `tracks.next` pages behind it
//! - `GET /me/playlists`
//! - `POST /api/token` (code exchange and refresh)

pub mod auth;
pub mod playlist;

use std::time::Duration;

use log::debug;
use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    error::{Error, Result},
    types::ApiErrorResponse,
    warning,
};

const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const MAX_RETRY_AFTER_SECS: u64 = 120;
/// Requests made for one call before a 502 or 429 response is returned as an error.
pub const MAX_ATTEMPTS: u32 = 5;

/// Sends an authenticated GET request and decodes the JSON body.
///
/// Retries on 502 and on 429 (honouring `Retry-After`), up to
/// [`MAX_ATTEMPTS`] attempts.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    token: &str,
) -> Result<T> {
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!("GET {url} (attempt {attempt})");
        let response = client.get(url).bearer_auth(token).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if attempt < MAX_ATTEMPTS {
            if status == StatusCode::BAD_GATEWAY {
                sleep(BAD_GATEWAY_DELAY).await;
                continue; // retry
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(&response);
                if retry_after <= MAX_RETRY_AFTER_SECS {
                    debug!("Rate limited, retrying in {retry_after}s");
                    sleep(Duration::from_secs(retry_after)).await;
                    continue; // retry
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds. Try again later.",
                    retry_after
                );
            }
        }

        return Err(api_error(response).await);
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

/// Builds an [`Error::Api`] from a non-success response.
///
/// Spotify wraps errors as `{"error": {"status": 401, "message": "..."}}`;
/// bodies in any other shape fall back to the HTTP reason phrase.
async fn api_error(response: Response) -> Error {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Error::Http(e),
    };

    let parsed = serde_json::from_str::<ApiErrorResponse>(&body).ok();
    let message = parsed
        .as_ref()
        .and_then(|p| p.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
    let status = parsed
        .and_then(|p| p.error.status)
        .unwrap_or_else(|| status.as_u16());

    Error::Api { status, message }
}
