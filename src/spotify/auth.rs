use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config,
    error::{Error, Result},
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// Maximum time to wait for the browser to hit the callback.
const AUTH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Result<Token> {
        if let Some(error) = self.error {
            let description = self.error_description.unwrap_or_default();
            return Err(Error::Auth(format!("{error}: {description}")));
        }

        let access_token = self
            .access_token
            .ok_or_else(|| Error::Auth("token response without access_token".to_string()))?;

        Ok(Token {
            access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}

/// Runs the OAuth 2.0 PKCE flow and stores the resulting token.
///
/// 1. Generates a code verifier and its S256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the browser
/// 4. Waits for the callback handler to exchange the code
/// 5. Persists the token for later commands
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<()> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = authorize_url(
        &config::spotify_apiauth_url(),
        &config::spotify_client_id()?,
        &config::spotify_redirect_uri()?,
        &code_challenge,
        &config::spotify_scope(),
    )?;

    // Store verifier before the browser can hit the callback
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move { start_api_server(server_state).await });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state, AUTH_TIMEOUT).await;
    server.abort();

    let token = token.ok_or_else(|| Error::Auth("authentication failed or timed out".into()))?;
    TokenManager::new(token).persist().await?;

    success!("Authentication successful!");
    Ok(())
}

/// Builds the Spotify authorization URL for the PKCE flow.
///
/// All query values are percent-encoded, so redirect URIs carrying their own
/// query string and space-separated scopes survive intact.
///
/// # Arguments
///
/// * `base` - Authorization endpoint, e.g. `https://accounts.spotify.com/authorize`
/// * `client_id` - Client id of the registered application
/// * `redirect_uri` - Callback URL registered for the application
/// * `code_challenge` - S256 challenge derived from the code verifier
/// * `scope` - Space-separated list of requested scopes
///
/// # Errors
///
/// Returns [`Error::Config`] when `base` is not a valid URL.
pub fn authorize_url(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
    scope: &str,
) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        base,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization URL '{base}': {e}")))?;

    Ok(url.to_string())
}

/// Polls the shared state until the callback handler stored a token.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PkceToken>>>,
    max_wait: Duration,
) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(token) = lock.as_ref().and_then(|p| p.token.as_ref()) {
                return Some(token.clone());
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token using the configured
/// token endpoint and client id.
pub async fn refresh_token(refresh_token: &str) -> Result<Token> {
    let client_id = config::spotify_client_id()?;
    refresh_token_at(&config::spotify_apitoken_url(), &client_id, refresh_token).await
}

/// Exchanges a refresh token for a new access token at `token_url`.
///
/// # Returns
///
/// The new token. Spotify does not always rotate the refresh token, so the
/// returned `refresh_token` may be empty; [`TokenManager`] keeps the old one
/// in that case.
///
/// # Errors
///
/// - [`Error::Http`] if the token endpoint cannot be reached or answers with
///   something that is not JSON
/// - [`Error::Auth`] if the endpoint rejects the refresh token
pub async fn refresh_token_at(
    token_url: &str,
    client_id: &str,
    refresh_token: &str,
) -> Result<Token> {
    debug!("Refreshing access token");

    let res = Client::new()
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ])
        .send()
        .await?;

    res.json::<TokenResponse>().await?.into_token()
}

/// Exchanges the authorization code from the callback for a token.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri()?;

    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?;

    res.json::<TokenResponse>().await?.into_token()
}
