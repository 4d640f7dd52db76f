//! Normalized records destined for the catalog tables.
//!
//! These are the flat shapes the transform stage produces from one search
//! page; every run rebuilds them from scratch. Foreign keys are stripped out
//! of the entity records and carried by the join rows instead.

/// One row of the `track` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub duration_ms: u64,
    /// Release date of the containing album, as Spotify reports it
    /// ('2023-05-15', '2023-05' or '2023' depending on precision).
    pub release_date: String,
    pub is_single: bool,
    pub explicit: bool,
}

/// One row of the `album` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub url: String,
    pub total_tracks: u32,
    pub album_type: String,
    pub image_640_url: String,
    pub image_300_url: String,
    pub image_64_url: String,
}

/// One row of the `artist` table, built from a fetched artist document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub image_640_url: String,
    pub image_320_url: String,
    pub image_160_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistGenreRow {
    pub artist_id: String,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistTrackRow {
    pub artist_id: String,
    pub track_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistAlbumRow {
    pub artist_id: String,
    pub album_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackAlbumRow {
    pub track_id: String,
    pub album_id: String,
}

/// The three tables with a primary `id` column.
///
/// Deduplication and the row-count based offset only ever address these; the
/// enum doubles as the table-name whitelist for id queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityTable {
    Artist,
    Album,
    Track,
}

impl EntityTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityTable::Artist => "artist",
            EntityTable::Album => "album",
            EntityTable::Track => "track",
        }
    }
}

/// Access to the primary key shared by the three entity records.
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for TrackRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for AlbumRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for ArtistRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_table_names() {
        assert_eq!(EntityTable::Artist.table_name(), "artist");
        assert_eq!(EntityTable::Album.table_name(), "album");
        assert_eq!(EntityTable::Track.table_name(), "track");
    }
}
