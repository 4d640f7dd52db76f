//! Pure normalization of one search page into flat record collections.
//!
//! Nothing here does I/O: every function is a deterministic mapping from the
//! page (and, for artists and genres, from the separately fetched artist
//! documents) to records and join rows.
//!
//! Two asymmetries are intentional and mirror the upstream data flow:
//! - the unique-artist fetch set is the union of item-level and album-level
//!   artist stubs, while the artist_track/artist_album join maps are built
//!   from the item-level list only;
//! - join maps keep duplicates and insertion order, only the three entity
//!   collections are ever deduplicated.

use crate::catalog_store::models::{
    AlbumRecord, ArtistAlbumRow, ArtistGenreRow, ArtistRecord, ArtistTrackRow, HasId, TrackAlbumRow,
    TrackRecord,
};
use crate::spotify::models::{image_url_at, ArtistDetail, SearchPage};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered buckets keyed by id.
///
/// Join tables keep duplicates and the order values were appended in, so a
/// plain `HashMap` is not enough.
#[derive(Debug, Default)]
pub struct JoinMap {
    order: Vec<String>,
    buckets: HashMap<String, Vec<String>>,
}

impl JoinMap {
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        match self.buckets.get_mut(key) {
            Some(bucket) => bucket.push(value.into()),
            None => {
                self.order.push(key.to_string());
                self.buckets.insert(key.to_string(), vec![value.into()]);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Buckets in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.buckets[key].as_slice()))
    }

    /// Exploded (key, value) pairs, one per appended value.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Unique artist ids appearing anywhere on the page, first-seen order.
///
/// Union of each item's album artists and the item's own artists: this is the
/// fetch set for the per-artist detail calls, deliberately wider than what
/// the join maps reference.
pub fn artist_ids(page: &SearchPage) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for item in &page.items {
        for artist in item.album.artists.iter().chain(item.artists.iter()) {
            if seen.insert(artist.id.clone()) {
                ids.push(artist.id.clone());
            }
        }
    }
    ids
}

/// One track record per page item, in page order.
pub fn track_records(page: &SearchPage) -> Vec<TrackRecord> {
    page.items
        .iter()
        .map(|item| TrackRecord {
            id: item.id.clone(),
            name: item.name.clone(),
            url: item.external_urls.spotify.clone(),
            duration_ms: item.duration_ms,
            release_date: item.album.release_date.clone(),
            is_single: item.album.album_type == "single",
            explicit: item.explicit,
        })
        .collect()
}

/// Album records, deduplicated across items sharing an album (first wins).
pub fn album_records(page: &SearchPage) -> Vec<AlbumRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for item in &page.items {
        let album = &item.album;
        if !seen.insert(album.id.clone()) {
            continue;
        }
        records.push(AlbumRecord {
            id: album.id.clone(),
            name: album.name.clone(),
            release_date: album.release_date.clone(),
            url: album.external_urls.spotify.clone(),
            total_tracks: album.total_tracks,
            album_type: album.album_type.clone(),
            image_640_url: image_url_at(&album.images, 0),
            image_300_url: image_url_at(&album.images, 1),
            image_64_url: image_url_at(&album.images, 2),
        });
    }
    records
}

/// Artist records from the fetched artist documents, in fetch order.
pub fn artist_records(details: &[ArtistDetail]) -> Vec<ArtistRecord> {
    details
        .iter()
        .map(|detail| ArtistRecord {
            id: detail.id.clone(),
            name: detail.name.clone(),
            url: detail.external_urls.spotify.clone(),
            image_640_url: image_url_at(&detail.images, 0),
            image_320_url: image_url_at(&detail.images, 1),
            image_160_url: image_url_at(&detail.images, 2),
        })
        .collect()
}

/// artist id -> track ids, from each item's own artist list only.
pub fn artist_track_map(page: &SearchPage) -> JoinMap {
    let mut map = JoinMap::default();
    for item in &page.items {
        for artist in &item.artists {
            map.append(&artist.id, item.id.clone());
        }
    }
    map
}

/// artist id -> album ids, from each item's own artist list only.
/// An artist appearing on two items of the same album gets the album twice.
pub fn artist_album_map(page: &SearchPage) -> JoinMap {
    let mut map = JoinMap::default();
    for item in &page.items {
        for artist in &item.artists {
            map.append(&artist.id, item.album.id.clone());
        }
    }
    map
}

/// artist id -> genres, keyed from the fetched artist documents.
/// Artists without genres simply contribute no rows.
pub fn artist_genre_map(details: &[ArtistDetail]) -> JoinMap {
    let mut map = JoinMap::default();
    for detail in details {
        for genre in &detail.genres {
            map.append(&detail.id, genre.clone());
        }
    }
    map
}

/// track id -> album id pairs, first-writer-wins per track id.
pub fn track_album_rows(page: &SearchPage) -> Vec<TrackAlbumRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for item in &page.items {
        if seen.insert(item.id.clone()) {
            rows.push(TrackAlbumRow {
                track_id: item.id.clone(),
                album_id: item.album.id.clone(),
            });
        }
    }
    rows
}

pub fn artist_track_rows(page: &SearchPage) -> Vec<ArtistTrackRow> {
    artist_track_map(page)
        .rows()
        .map(|(artist_id, track_id)| ArtistTrackRow {
            artist_id: artist_id.to_string(),
            track_id: track_id.to_string(),
        })
        .collect()
}

pub fn artist_album_rows(page: &SearchPage) -> Vec<ArtistAlbumRow> {
    artist_album_map(page)
        .rows()
        .map(|(artist_id, album_id)| ArtistAlbumRow {
            artist_id: artist_id.to_string(),
            album_id: album_id.to_string(),
        })
        .collect()
}

pub fn artist_genre_rows(details: &[ArtistDetail]) -> Vec<ArtistGenreRow> {
    artist_genre_map(details)
        .rows()
        .map(|(artist_id, genre)| ArtistGenreRow {
            artist_id: artist_id.to_string(),
            genre: genre.to_string(),
        })
        .collect()
}

/// Records whose id is not yet persisted, preserving original order.
/// Re-applying with the same id set is a no-op.
pub fn filter_new<R: HasId>(records: Vec<R>, existing_ids: &HashSet<String>) -> Vec<R> {
    records
        .into_iter()
        .filter(|record| !existing_ids.contains(record.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::models::{ArtistRef, ExternalUrls, Image, ItemAlbum, PageItem};

    fn urls(url: &str) -> ExternalUrls {
        ExternalUrls {
            spotify: url.to_string(),
        }
    }

    fn artist_ref(id: &str) -> ArtistRef {
        ArtistRef {
            id: id.to_string(),
            name: format!("Artist {id}"),
        }
    }

    fn image(url: &str, size: u32) -> Image {
        Image {
            url: url.to_string(),
            width: Some(size),
            height: Some(size),
        }
    }

    fn album(id: &str, album_type: &str, artists: &[&str], images: Vec<Image>) -> ItemAlbum {
        ItemAlbum {
            id: id.to_string(),
            name: format!("Album {id}"),
            album_type: album_type.to_string(),
            release_date: "2023-05-15".to_string(),
            total_tracks: 10,
            external_urls: urls(&format!("https://open.spotify.com/album/{id}")),
            images,
            artists: artists.iter().map(|a| artist_ref(a)).collect(),
        }
    }

    fn item(id: &str, artists: &[&str], album: ItemAlbum) -> PageItem {
        PageItem {
            id: id.to_string(),
            name: format!("Track {id}"),
            external_urls: urls(&format!("https://open.spotify.com/track/{id}")),
            duration_ms: 200_000,
            explicit: false,
            artists: artists.iter().map(|a| artist_ref(a)).collect(),
            album,
        }
    }

    fn page(items: Vec<PageItem>) -> SearchPage {
        let len = items.len() as u32;
        SearchPage {
            items,
            offset: 0,
            limit: 20,
            total: len,
        }
    }

    fn detail(id: &str, genres: &[&str]) -> ArtistDetail {
        ArtistDetail {
            id: id.to_string(),
            name: format!("Artist {id}"),
            external_urls: urls(&format!("https://open.spotify.com/artist/{id}")),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            images: vec![],
        }
    }

    #[test]
    fn test_one_track_record_per_item_with_is_single_rule() {
        let page = page(vec![
            item("t1", &["a1"], album("b1", "single", &["a1"], vec![])),
            item("t2", &["a1"], album("b2", "album", &["a1"], vec![])),
        ]);
        let records = track_records(&page);
        assert_eq!(records.len(), 2);
        assert!(records[0].is_single);
        assert!(!records[1].is_single);
        assert_eq!(records[0].id, "t1");
        assert_eq!(records[0].release_date, "2023-05-15");
    }

    #[test]
    fn test_album_records_missing_image_tiers_are_empty_strings() {
        let one_image = album("b1", "album", &["a1"], vec![image("big", 640)]);
        let page = page(vec![item("t1", &["a1"], one_image)]);

        let records = album_records(&page);
        assert_eq!(records[0].image_640_url, "big");
        assert_eq!(records[0].image_300_url, "");
        assert_eq!(records[0].image_64_url, "");
    }

    #[test]
    fn test_album_records_dedup_shared_album() {
        let page = page(vec![
            item("t1", &["a1"], album("b1", "album", &["a1"], vec![])),
            item("t2", &["a1"], album("b1", "album", &["a1"], vec![])),
        ]);
        assert_eq!(album_records(&page).len(), 1);
    }

    #[test]
    fn test_artist_ids_union_of_item_and_album_artists() {
        // a2 appears only on the album, a3 only on the item
        let page = page(vec![item(
            "t1",
            &["a1", "a3"],
            album("b1", "album", &["a1", "a2"], vec![]),
        )]);
        let ids = artist_ids(&page);
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_join_maps_use_item_artists_only() {
        // Album-only artist a2 must not appear in the join maps even though
        // it is part of the fetch set.
        let page = page(vec![item(
            "t1",
            &["a1"],
            album("b1", "album", &["a1", "a2"], vec![]),
        )]);
        assert!(artist_track_map(&page).get("a2").is_none());
        assert!(artist_album_map(&page).get("a2").is_none());
        assert_eq!(artist_track_map(&page).get("a1").unwrap(), ["t1"]);
    }

    #[test]
    fn test_artist_album_map_keeps_duplicate_pairs() {
        // Two items of the same album by the same artist: the bucket holds
        // the album twice and the exploded join rows count two.
        let page = page(vec![
            item("t1", &["a1"], album("b1", "album", &["a1"], vec![])),
            item("t2", &["a1"], album("b1", "album", &["a1"], vec![])),
        ]);
        let map = artist_album_map(&page);
        assert_eq!(map.get("a1").unwrap(), ["b1", "b1"]);

        let rows = artist_album_rows(&page);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
    }

    #[test]
    fn test_track_album_rows_first_writer_wins() {
        let page = page(vec![
            item("t1", &["a1"], album("b1", "album", &["a1"], vec![])),
            item("t1", &["a1"], album("b2", "album", &["a1"], vec![])),
        ]);
        let rows = track_album_rows(&page);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].album_id, "b1");
    }

    #[test]
    fn test_artist_genre_map_from_details() {
        let details = vec![
            detail("a1", &["dubstep", "brostep"]),
            detail("a2", &[]),
        ];
        let map = artist_genre_map(&details);
        assert_eq!(map.get("a1").unwrap(), ["dubstep", "brostep"]);
        // No genres, no rows; not an error.
        assert!(map.get("a2").is_none());
        assert_eq!(artist_genre_rows(&details).len(), 2);
    }

    #[test]
    fn test_filter_new_preserves_order_and_is_idempotent() {
        let records = vec![
            ArtistRecord {
                id: "a1".to_string(),
                name: "A1".to_string(),
                url: String::new(),
                image_640_url: String::new(),
                image_320_url: String::new(),
                image_160_url: String::new(),
            },
            ArtistRecord {
                id: "a2".to_string(),
                name: "A2".to_string(),
                url: String::new(),
                image_640_url: String::new(),
                image_320_url: String::new(),
                image_160_url: String::new(),
            },
            ArtistRecord {
                id: "a3".to_string(),
                name: "A3".to_string(),
                url: String::new(),
                image_640_url: String::new(),
                image_320_url: String::new(),
                image_160_url: String::new(),
            },
        ];
        let existing: HashSet<String> = ["a2".to_string()].into_iter().collect();

        let once = filter_new(records, &existing);
        let ids: Vec<&str> = once.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);

        let twice = filter_new(once.clone(), &existing);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_join_map_insertion_order() {
        let mut map = JoinMap::default();
        map.append("z", "1");
        map.append("a", "2");
        map.append("z", "3");

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
        let pairs: Vec<(&str, &str)> = map.rows().collect();
        assert_eq!(pairs, vec![("z", "1"), ("z", "3"), ("a", "2")]);
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
    }
}
