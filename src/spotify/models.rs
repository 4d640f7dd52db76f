//! Typed documents for the Spotify Web API responses the job consumes.
//!
//! Parsing is strict: every field the pipeline depends on is required, so a
//! malformed document fails at the parse boundary instead of deep inside the
//! transform stage. Fields Spotify marks as possibly absent (`images`,
//! `genres`) default to empty collections.

use serde::Deserialize;

/// Access token from the client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Envelope of `GET /search?type=track`; the page lives under `tracks`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchPage,
}

/// One paginated batch of genre search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    pub items: Vec<PageItem>,
    pub offset: u32,
    pub limit: u32,
    pub total: u32,
}

/// One track entry of a search page, nested with its album and artist stubs.
#[derive(Debug, Deserialize)]
pub struct PageItem {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    pub duration_ms: u64,
    pub explicit: bool,
    pub artists: Vec<ArtistRef>,
    pub album: ItemAlbum,
}

/// Album object as embedded in a search page item.
///
/// The artist list here may differ in membership from the item's own list;
/// both feed the unique-artist fetch set.
#[derive(Debug, Deserialize)]
pub struct ItemAlbum {
    pub id: String,
    pub name: String,
    pub album_type: String,
    pub release_date: String,
    pub total_tracks: u32,
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
    pub artists: Vec<ArtistRef>,
}

/// Artist stub (id + name) as embedded in items and albums.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Full artist document from `GET /artists/{id}`.
#[derive(Debug, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

/// Image descriptor; Spotify orders arrays largest-first.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// URL of the image at `index`, or an empty string when the array is shorter.
/// Image columns are NOT NULL with an empty-string default, never null.
pub fn image_url_at(images: &[Image], index: usize) -> String {
    images
        .get(index)
        .map(|image| image.url.clone())
        .unwrap_or_default()
}
