//! # CLI Module
//!
//! User-facing commands of plartists. Each command loads the cached token,
//! calls into [`crate::spotify`] and renders the result as tables or JSON.
//!
//! ## Commands
//!
//! - [`auth`] - OAuth 2.0 PKCE login, stores the token locally
//! - [`list_playlists`] - playlists of the current user
//! - [`show_playlist`] - one playlist with its tracks
//! - [`top_artists`] - ranked artist report for one playlist
//!
//! ## Error Surface
//!
//! - an expired access token is refreshed and the request retried once; if
//!   that fails too the user is asked to run `plartists auth` again
//! - other Spotify API errors are shown with Spotify's message
//! - transport failures are reported as "Failed to fetch <what>.", naming
//!   what the command was loading

mod artists;
mod auth;
mod playlist;
mod playlists;

pub use artists::{DEFAULT_LIMIT as DEFAULT_ARTIST_LIMIT, top_artists};
pub use auth::auth;
pub use playlist::show_playlist;
pub use playlists::list_playlists;

use std::future::Future;

use log::debug;

use crate::{
    error::{Error, Result},
    management::TokenManager,
};

/// Runs `call` with a valid access token from the stored token cache.
async fn with_token<T, F, Fut>(call: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut token_mgr = TokenManager::load().await.map_err(|e| {
        debug!("Failed to load token: {e}");
        Error::Auth("no stored token".to_string())
    })?;

    with_token_manager(&mut token_mgr, call).await
}

/// Runs `call` with a valid access token taken from `token_mgr`.
///
/// When Spotify answers that the token expired, the token is refreshed and
/// `call` runs a second time. Any other error is returned unchanged.
///
/// # Errors
///
/// - [`Error::Auth`] if the expired token cannot be refreshed
/// - whatever `call` returns otherwise
pub async fn with_token_manager<T, F, Fut>(token_mgr: &mut TokenManager, mut call: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let token = token_mgr.get_valid_token().await;
    match call(token).await {
        Err(e) if e.is_token_expired() => {
            debug!("Access token expired, refreshing");
            let token = token_mgr.force_refresh().await.map_err(|e| {
                debug!("Refresh after expiry failed: {e}");
                Error::Auth("access token expired".to_string())
            })?;
            call(token).await
        }
        other => other,
    }
}

/// Message shown for `err`. `what` names the thing being fetched.
fn failure_message(err: &Error, what: &str) -> String {
    match err {
        Error::Auth(reason) => format!("Not authenticated ({reason}). Please run plartists auth"),
        e if e.is_token_expired() => "Access token expired. Please run plartists auth".to_string(),
        Error::Http(_) => format!("Failed to fetch {what}."),
        e => e.to_string(),
    }
}

/// Prints `err` the way the CLI reports failures and exits.
fn fail(err: Error, what: &str) -> ! {
    debug!("{err:?}");
    crate::error!("{}", failure_message(&err, what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_asks_for_login() {
        let msg = failure_message(&Error::Auth("no stored token".to_string()), "playlist");
        assert_eq!(msg, "Not authenticated (no stored token). Please run plartists auth");
    }

    #[test]
    fn expired_token_asks_for_login() {
        let err = Error::Api {
            status: 401,
            message: "The access token expired".to_string(),
        };
        assert_eq!(
            failure_message(&err, "playlist"),
            "Access token expired. Please run plartists auth"
        );
    }

    #[test]
    fn api_error_shows_spotify_message() {
        let err = Error::Api {
            status: 404,
            message: "Resource not found".to_string(),
        };
        let msg = failure_message(&err, "playlists");
        assert!(msg.contains("Resource not found"));
        assert!(!msg.contains("Failed to fetch"));
    }

    #[tokio::test]
    async fn transport_failure_names_what_was_fetched() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err: Error = reqwest::get(url).await.unwrap_err().into();

        assert_eq!(failure_message(&err, "playlists"), "Failed to fetch playlists.");
        assert_eq!(failure_message(&err, "playlist"), "Failed to fetch playlist.");
    }
}
