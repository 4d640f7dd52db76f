//! Extract stage: one genre search page plus one artist document per unique
//! artist id found on it.
//!
//! Artist documents are fetched serially, one blocking call each; the run
//! cost is O(unique artists). A 429 from the API aborts the stage.

use super::transform;
use crate::spotify::models::{ArtistDetail, SearchPage};
use crate::spotify::{SpotifyClient, SpotifyError};
use tracing::info;

/// Raw material for the transform stage.
pub struct Extraction {
    pub page: SearchPage,
    pub artist_details: Vec<ArtistDetail>,
}

pub fn run(
    client: &SpotifyClient,
    genre: &str,
    offset: u32,
    limit: u32,
) -> Result<Extraction, SpotifyError> {
    let page = client.search_tracks_by_genre(genre, offset, limit)?;

    let ids = transform::artist_ids(&page);
    info!(
        items = page.items.len(),
        unique_artists = ids.len(),
        "Fetching artist documents"
    );

    let mut artist_details = Vec::with_capacity(ids.len());
    for id in &ids {
        artist_details.push(client.get_artist(id)?);
    }

    Ok(Extraction {
        page,
        artist_details,
    })
}
