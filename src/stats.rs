//! Artist aggregation over playlist tracks.
//!
//! Counts how often each artist is credited across a playlist and ranks the
//! most frequent ones. Everything here is pure and in-memory: no I/O, no
//! shared state, and malformed track data degrades to "not counted" instead
//! of failing the whole report.
//!
//! Artists are keyed by their exact display name (case-sensitive, untrimmed).
//! Two different artists that share a display name are therefore merged.

use std::collections::HashMap;

use crate::types::{ArtistCount, Track};

/// Artist name to appearance count, in order of first appearance.
///
/// The insertion order is what [`rank_top_artists`] falls back to when two
/// artists have the same count, so it is kept explicitly instead of relying
/// on the iteration order of a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistCounts {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl ArtistCounts {
    /// Creates empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one appearance of `name`.
    pub fn increment(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), 1));
            }
        }
    }

    /// Returns how often `name` was credited, or `None` if it never was.
    ///
    /// The lookup is exact: `"abba"` and `"ABBA"` are different artists.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.index.get(name).map(|&pos| self.entries[pos].1)
    }

    /// Number of distinct artists.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the number of (track, artist) credits seen.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| u64::from(*c)).sum()
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

/// Counts artist credits across `tracks`.
///
/// Absent tracks, tracks without an artist list and artists without a name
/// are skipped. An empty input yields empty counts.
///
/// # Arguments
///
/// * `tracks` - Tracks in playlist order; `None` stands for an entry whose
///   track is missing (removed or local content)
///
/// # Returns
///
/// Counts keyed by display name, in first-appearance order. The sum of all
/// counts equals the number of named artist credits in the input.
pub fn count_artists<'a, I>(tracks: I) -> ArtistCounts
where
    I: IntoIterator<Item = Option<&'a Track>>,
{
    let mut counts = ArtistCounts::new();

    for track in tracks.into_iter().flatten() {
        let Some(artists) = &track.artists else {
            continue;
        };
        for name in artists.iter().filter_map(|a| a.name.as_deref()) {
            counts.increment(name);
        }
    }

    counts
}

/// Returns at most `limit` artists ordered by count, highest first.
///
/// Artists with equal counts keep their first-appearance order. This relies
/// on `sort_by` being a stable sort.
///
/// # Arguments
///
/// * `counts` - Counts produced by [`count_artists`]
/// * `limit` - Maximum number of entries; `0` yields an empty list
pub fn rank_top_artists(counts: &ArtistCounts, limit: usize) -> Vec<ArtistCount> {
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<ArtistCount> = counts
        .iter()
        .map(|(name, count)| ArtistCount {
            name: name.to_string(),
            count,
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}
