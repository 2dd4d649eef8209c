use colored::Colorize;
use tabled::Table;

use crate::{info, spotify, utils};

use super::{fail, with_token};

/// Prints the playlist header followed by a table of its tracks.
pub async fn show_playlist(playlist_id: String) {
    let pb = utils::spinner("Loading playlist...");
    let result = with_token(|token| {
        let playlist_id = playlist_id.clone();
        async move { spotify::playlist::fetch_playlist_by_id(&token, &playlist_id).await }
    })
    .await;
    pb.finish_and_clear();

    let playlist = match result {
        Ok(p) => p,
        Err(e) => fail(e, "playlist"),
    };

    println!("{}", utils::playlist_name(&playlist).bold());
    println!("{}", utils::playlist_description(&playlist));
    println!(
        "By {} · {} tracks",
        utils::playlist_owner(&playlist).bold(),
        utils::playlist_total_tracks(&playlist)
    );
    if let Some(cover) = utils::playlist_cover_url(&playlist) {
        info!("Cover: {}", cover);
    }
    let url = utils::playlist_url(&playlist);
    if !url.is_empty() {
        info!("Open in Spotify: {}", url);
    }
    println!();

    let rows = utils::track_table_rows(&playlist);
    if rows.is_empty() {
        info!("This playlist is empty.");
        return;
    }

    println!("{}", Table::new(rows));
}
