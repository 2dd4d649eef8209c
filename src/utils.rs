use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Playlist, PlaylistTableRow, Track, TrackTableRow};

pub const DEFAULT_PLAYLIST_NAME: &str = "Playlist";
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";
pub const DEFAULT_OWNER: &str = "Unknown";

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Extracts a playlist id from a bare id, a `spotify:playlist:` URI or an
/// `open.spotify.com/playlist/` link.
pub fn parse_playlist_id(input: &str) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("playlist id cannot be empty".to_string());
    }

    let id = if let Some(rest) = input.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some(pos) = input.find("/playlist/") {
        let rest = &input[pos + "/playlist/".len()..];
        rest.split(['?', '#', '/']).next().unwrap_or_default()
    } else {
        input
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("invalid playlist id '{input}'"));
    }

    Ok(id.to_string())
}

pub fn playlist_name(playlist: &Playlist) -> &str {
    playlist.name.as_deref().unwrap_or(DEFAULT_PLAYLIST_NAME)
}

pub fn playlist_description(playlist: &Playlist) -> &str {
    playlist
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DESCRIPTION)
}

pub fn playlist_owner(playlist: &Playlist) -> &str {
    playlist
        .owner
        .as_ref()
        .and_then(|o| o.display_name.as_deref())
        .unwrap_or(DEFAULT_OWNER)
}

pub fn playlist_total_tracks(playlist: &Playlist) -> u64 {
    playlist.tracks.as_ref().and_then(|t| t.total).unwrap_or(0)
}

pub fn playlist_url(playlist: &Playlist) -> &str {
    playlist
        .external_urls
        .as_ref()
        .and_then(|u| u.spotify.as_deref())
        .unwrap_or_default()
}

pub fn playlist_cover_url(playlist: &Playlist) -> Option<&str> {
    playlist
        .images
        .as_ref()
        .and_then(|images| images.first())
        .map(|image| image.url.as_str())
}

/// `"Artist A, Artist B • Album"`; the album part only when it has a name.
pub fn track_artists_line(track: &Track) -> String {
    let artists = track
        .artists
        .iter()
        .flatten()
        .filter_map(|a| a.name.as_deref())
        .collect::<Vec<_>>()
        .join(", ");

    match track.album.as_ref().and_then(|a| a.name.as_deref()) {
        Some(album) if !album.is_empty() => format!("{artists} • {album}"),
        _ => artists,
    }
}

pub fn track_url(track: &Track) -> &str {
    track
        .external_urls
        .as_ref()
        .and_then(|u| u.spotify.as_deref())
        .unwrap_or_default()
}

pub fn playlist_table_row(playlist: &Playlist) -> PlaylistTableRow {
    PlaylistTableRow {
        name: playlist_name(playlist).to_string(),
        owner: playlist_owner(playlist).to_string(),
        tracks: playlist_total_tracks(playlist),
        link: playlist_url(playlist).to_string(),
    }
}

/// Table rows for the tracks of a playlist, skipping entries without a track.
pub fn track_table_rows(playlist: &Playlist) -> Vec<TrackTableRow> {
    playlist
        .tracks()
        .flatten()
        .map(|track| TrackTableRow {
            name: track.name.clone().unwrap_or_default(),
            artists: track_artists_line(track),
            popularity: track
                .popularity
                .map(|p| p.to_string())
                .unwrap_or_default(),
            link: track_url(track).to_string(),
        })
        .collect()
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
