//! Configuration management for plartists.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Spotify endpoints and the callback
//! server address have defaults; the client id and redirect URI must be
//! provided by the user.

use std::{env, path::PathBuf};

use log::debug;

use crate::error::{Error, Result};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_API_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_AUTH_SCOPE: &str =
    "playlist-read-private playlist-read-collaborative";

/// Directory holding `.env`, the token cache and other local state.
///
/// - Linux: `~/.local/share/plartists`
/// - macOS: `~/Library/Application Support/plartists`
/// - Windows: `%LOCALAPPDATA%/plartists`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plartists");
    path
}

/// Loads environment variables from `.env` in the local data directory.
///
/// Creates the data directory if needed. A missing `.env` file is not an
/// error: variables may come straight from the environment.
pub async fn load_env() -> Result<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    match dotenv::from_path(&path) {
        Ok(()) => debug!("Loaded environment from {path:?}"),
        Err(e) => debug!("No environment loaded from {path:?}: {e}"),
    }
    Ok(())
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{name} must be set")))
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the registered Spotify application (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Redirect URI registered for the application (`SPOTIFY_API_REDIRECT_URI`).
/// Must point at the `/callback` route of [`server_addr`].
pub fn spotify_redirect_uri() -> Result<String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_API_AUTH_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_API_AUTH_URL)
}

/// Base URL of the Web API, without trailing slash.
pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
        .trim_end_matches('/')
        .to_string()
}

pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_API_TOKEN_URL)
}
