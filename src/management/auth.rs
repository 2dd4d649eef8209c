use std::path::PathBuf;

use chrono::Utc;
use log::debug;

use crate::{config, error::Result, spotify, types::Token};

/// Seconds before the real expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Owns the cached OAuth token and keeps it fresh.
///
/// By default the token lives in `{data_dir}/cache/token.json` and is
/// refreshed against the configured Spotify token endpoint. Both can be
/// overridden with [`TokenManager::with_path`] and
/// [`TokenManager::with_token_endpoint`].
pub struct TokenManager {
    token: Token,
    path: PathBuf,
    token_endpoint: Option<TokenEndpoint>,
}

struct TokenEndpoint {
    url: String,
    client_id: String,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            path: Self::default_path(),
            token_endpoint: None,
        }
    }

    /// Loads the token stored at the default location.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::Io`] when no token has been stored yet and with
    /// [`crate::Error::Json`] when the file is not a valid token.
    pub async fn load() -> Result<Self> {
        Self::load_from(Self::default_path()).await
    }

    /// Loads the token stored at `path`. Later refreshes are persisted there too.
    pub async fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = async_fs::read_to_string(&path).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self {
            token,
            path,
            token_endpoint: None,
        })
    }

    /// Stores the token at `path` instead of the default cache location.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Refreshes against `url` with `client_id` instead of the configured
    /// Spotify endpoint.
    pub fn with_token_endpoint(
        mut self,
        url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.token_endpoint = Some(TokenEndpoint {
            url: url.into(),
            client_id: client_id.into(),
        });
        self
    }

    pub async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Returns an access token, refreshing it first when it is about to expire.
    ///
    /// A failed refresh is not fatal here: the stale token is returned and the
    /// API call that uses it reports the expiry.
    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            if let Err(e) = self.force_refresh().await {
                debug!("Token refresh failed: {e}");
            }
        }

        self.token.access_token.clone()
    }

    /// Exchanges the refresh token for a new access token and persists it.
    ///
    /// # Returns
    ///
    /// The new access token.
    ///
    /// # Errors
    ///
    /// Any error of the token request, or an I/O error when the refreshed
    /// token cannot be written back.
    pub async fn force_refresh(&mut self) -> Result<String> {
        let refresh_token = &self.token.refresh_token;
        let mut new_token = match &self.token_endpoint {
            Some(endpoint) => {
                spotify::auth::refresh_token_at(&endpoint.url, &endpoint.client_id, refresh_token)
                    .await?
            }
            None => spotify::auth::refresh_token(refresh_token).await?,
        };
        // Spotify may omit the refresh token when it does not rotate it.
        if new_token.refresh_token.is_empty() {
            new_token.refresh_token = self.token.refresh_token.clone();
        }
        self.token = new_token;
        self.persist().await?;
        debug!("Refreshed access token");
        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        is_expired_at(&self.token, now)
    }

    fn default_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

fn is_expired_at(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at + token.expires_in
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            scope: String::new(),
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn token_expires_within_margin() {
        let t = token(1_000, 3_600);
        assert!(!is_expired_at(&t, 1_000));
        assert!(!is_expired_at(&t, 1_000 + 3_600 - EXPIRY_MARGIN_SECS - 1));
        assert!(is_expired_at(&t, 1_000 + 3_600 - EXPIRY_MARGIN_SECS));
    }

    #[test]
    fn short_lived_token_does_not_underflow() {
        let t = token(1_000, 60);
        assert!(is_expired_at(&t, 1_000));
    }
}
