use log::debug;
use reqwest::Client;

use crate::{
    config,
    error::Result,
    stats::{self, ArtistCounts},
    types::{GetUserPlaylistsResponse, Playlist, PlaylistTracksPage},
};

use super::get_json;

/// Fetches a playlist with all of its tracks.
///
/// Spotify embeds only the first page of items in the playlist object; the
/// remaining pages are followed through `tracks.next` and appended in order.
pub async fn fetch_playlist_by_id(token: &str, playlist_id: &str) -> Result<Playlist> {
    fetch_playlist_at(&config::spotify_apiurl(), token, playlist_id).await
}

/// [`fetch_playlist_by_id`] against an explicit API base URL.
///
/// # Arguments
///
/// * `api_url` - Base URL of the Web API without trailing slash,
///   e.g. `https://api.spotify.com/v1`
/// * `token` - Bearer access token
/// * `playlist_id` - Bare playlist id
///
/// # Errors
///
/// - [`crate::Error::Http`] if the API cannot be reached or a page is not valid JSON
/// - [`crate::Error::Api`] for any non-success response, including the 401 that
///   signals an expired token (see [`crate::Error::is_token_expired`])
pub async fn fetch_playlist_at(api_url: &str, token: &str, playlist_id: &str) -> Result<Playlist> {
    let client = Client::new();
    let url = format!("{api_url}/playlists/{playlist_id}");

    let mut playlist: Playlist = get_json(&client, &url, token).await?;

    if let Some(tracks) = playlist.tracks.as_mut() {
        let mut next = tracks.next.take();
        while let Some(page_url) = next {
            let page: PlaylistTracksPage = get_json(&client, &page_url, token).await?;
            tracks.items.extend(page.items);
            next = page.next;
        }
        debug!(
            "Fetched {} items of playlist {playlist_id}",
            tracks.items.len()
        );
    }

    Ok(playlist)
}

/// Fetches all playlists owned or followed by the current user.
pub async fn get_user_playlists(token: &str) -> Result<Vec<Playlist>> {
    get_user_playlists_at(&config::spotify_apiurl(), token).await
}

/// [`get_user_playlists`] against an explicit API base URL.
///
/// Pages are requested 50 at a time and followed through `next`. Null
/// entries in a page are dropped.
///
/// # Errors
///
/// Same as [`fetch_playlist_at`].
pub async fn get_user_playlists_at(api_url: &str, token: &str) -> Result<Vec<Playlist>> {
    let client = Client::new();
    let mut playlists = Vec::new();
    let mut next = Some(format!("{api_url}/me/playlists?limit=50"));

    while let Some(url) = next {
        let page: GetUserPlaylistsResponse = get_json(&client, &url, token).await?;
        playlists.extend(page.items.into_iter().flatten());
        next = page.next;
    }

    Ok(playlists)
}

/// Counts the appearances of each artist in a playlist.
pub async fn artist_count_for_playlist(token: &str, playlist_id: &str) -> Result<ArtistCounts> {
    artist_count_for_playlist_at(&config::spotify_apiurl(), token, playlist_id).await
}

/// [`artist_count_for_playlist`] against an explicit API base URL.
///
/// Fetches every page of the playlist, then runs [`stats::count_artists`]
/// over its tracks.
pub async fn artist_count_for_playlist_at(
    api_url: &str,
    token: &str,
    playlist_id: &str,
) -> Result<ArtistCounts> {
    let playlist = fetch_playlist_at(api_url, token, playlist_id).await?;
    Ok(stats::count_artists(playlist.tracks()))
}
