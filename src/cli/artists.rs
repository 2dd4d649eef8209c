use tabled::Table;

use crate::{
    info, spotify,
    stats::{self, ArtistCounts},
    types::ArtistCount,
    utils, warning,
};

use super::{fail, with_token};

/// Number of artists reported when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Prints the artists credited most often in a playlist.
pub async fn top_artists(playlist_id: String, limit: usize, json: bool) {
    let pb = utils::spinner("Counting artists...");
    let result = with_token(|token| {
        let playlist_id = playlist_id.clone();
        async move { spotify::playlist::artist_count_for_playlist(&token, &playlist_id).await }
    })
    .await;
    pb.finish_and_clear();

    let counts: ArtistCounts = match result {
        Ok(c) => c,
        Err(e) => fail(e, "playlist"),
    };
    let ranked: Vec<ArtistCount> = stats::rank_top_artists(&counts, limit);

    if json {
        match serde_json::to_string_pretty(&ranked) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(e.into(), "playlist"),
        }
        return;
    }

    match outcome(&counts, &ranked) {
        Outcome::NoArtists => warning!("No artists found in this playlist."),
        Outcome::NoneShown => info!(
            "{} artists across {} credits, none shown with a limit of 0",
            counts.len(),
            counts.total()
        ),
        Outcome::Ranked => {
            info!(
                "{} artists across {} credits, showing top {}",
                counts.len(),
                counts.total(),
                ranked.len()
            );
            println!("{}", Table::new(ranked));
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// The playlist credits no artist at all.
    NoArtists,
    /// Artists were counted but the limit left none to show.
    NoneShown,
    Ranked,
}

fn outcome(counts: &ArtistCounts, ranked: &[ArtistCount]) -> Outcome {
    if counts.is_empty() {
        Outcome::NoArtists
    } else if ranked.is_empty() {
        Outcome::NoneShown
    } else {
        Outcome::Ranked
    }
}
