use tabled::Table;

use crate::{info, spotify, types::PlaylistTableRow, utils};

use super::{fail, with_token};

pub async fn list_playlists() {
    let pb = utils::spinner("Fetching playlists...");
    let result = with_token(|token| async move {
        spotify::playlist::get_user_playlists(&token).await
    })
    .await;
    pb.finish_and_clear();

    let playlists = match result {
        Ok(p) => p,
        Err(e) => fail(e, "playlists"),
    };

    if playlists.is_empty() {
        info!("No playlists found.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists.iter().map(utils::playlist_table_row).collect();
    println!("{}", Table::new(rows));
    info!("{} playlists", playlists.len());
}
