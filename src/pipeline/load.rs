//! Load stage: append the record collections in a fixed table order.
//!
//! The first failed append aborts the remainder of the order. Earlier tables
//! stay committed (each append is its own transaction, nothing spans tables),
//! so a mid-sequence failure leaves the catalog partially updated for this
//! run.

use crate::catalog_store::models::{
    AlbumRecord, ArtistAlbumRow, ArtistGenreRow, ArtistRecord, ArtistTrackRow, TrackAlbumRow,
    TrackRecord,
};
use crate::catalog_store::CatalogStore;
use tracing::info;

/// Everything the transform stage produced, ready for loading.
pub struct RecordSets {
    pub artists: Vec<ArtistRecord>,
    pub albums: Vec<AlbumRecord>,
    pub tracks: Vec<TrackRecord>,
    pub artist_genres: Vec<ArtistGenreRow>,
    pub artist_tracks: Vec<ArtistTrackRow>,
    pub artist_albums: Vec<ArtistAlbumRow>,
    pub track_albums: Vec<TrackAlbumRow>,
}

/// One successfully loaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: &'static str,
    pub rows: usize,
}

/// Result of the load stage.
pub enum LoadOutcome {
    Completed(Vec<TableLoad>),
    /// The named table failed; tables after it in the order were not
    /// attempted, tables before it remain committed.
    Aborted {
        loaded: Vec<TableLoad>,
        table: &'static str,
        error: anyhow::Error,
    },
}

pub fn run(store: &dyn CatalogStore, sets: &RecordSets) -> LoadOutcome {
    type Append<'a> = Box<dyn Fn() -> anyhow::Result<usize> + 'a>;

    let steps: Vec<(&'static str, Append<'_>)> = vec![
        ("artist", Box::new(|| store.append_artists(&sets.artists))),
        ("album", Box::new(|| store.append_albums(&sets.albums))),
        ("track", Box::new(|| store.append_tracks(&sets.tracks))),
        (
            "artist_genre",
            Box::new(|| store.append_artist_genres(&sets.artist_genres)),
        ),
        (
            "artist_track",
            Box::new(|| store.append_artist_tracks(&sets.artist_tracks)),
        ),
        (
            "artist_album",
            Box::new(|| store.append_artist_albums(&sets.artist_albums)),
        ),
        (
            "track_album",
            Box::new(|| store.append_track_albums(&sets.track_albums)),
        ),
    ];

    let mut loaded = Vec::with_capacity(steps.len());
    for (table, append) in steps {
        match append() {
            Ok(rows) => {
                info!(table, rows, "Appended rows");
                loaded.push(TableLoad { table, rows });
            }
            Err(error) => {
                return LoadOutcome::Aborted {
                    loaded,
                    table,
                    error,
                };
            }
        }
    }
    LoadOutcome::Completed(loaded)
}
