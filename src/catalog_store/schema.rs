//! Database schema for the destination catalog.
//!
//! Entity tables carry the Spotify base62 id as primary key; join tables are
//! plain append-only pairs (duplicates allowed, order of insertion kept).
//! Image URL columns default to the empty string, never NULL.

/// SQL schema for the catalog database.
pub const CATALOG_SCHEMA_SQL: &str = r#"
-- Entity tables

CREATE TABLE IF NOT EXISTS artist (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    image_640_url TEXT NOT NULL DEFAULT '',
    image_320_url TEXT NOT NULL DEFAULT '',
    image_160_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS album (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    release_date TEXT NOT NULL,
    url TEXT NOT NULL,
    total_tracks INTEGER NOT NULL,
    album_type TEXT NOT NULL,
    image_640_url TEXT NOT NULL DEFAULT '',
    image_300_url TEXT NOT NULL DEFAULT '',
    image_64_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS track (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    release_date TEXT NOT NULL,
    is_single INTEGER NOT NULL,
    explicit INTEGER NOT NULL
);

-- Join tables

CREATE TABLE IF NOT EXISTS artist_genre (
    artist_id TEXT NOT NULL,
    genre TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_artist_genre_artist ON artist_genre(artist_id);

CREATE TABLE IF NOT EXISTS artist_track (
    artist_id TEXT NOT NULL,
    track_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_artist_track_artist ON artist_track(artist_id);
CREATE INDEX IF NOT EXISTS idx_artist_track_track ON artist_track(track_id);

CREATE TABLE IF NOT EXISTS artist_album (
    artist_id TEXT NOT NULL,
    album_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_artist_album_artist ON artist_album(artist_id);
CREATE INDEX IF NOT EXISTS idx_artist_album_album ON artist_album(album_id);

CREATE TABLE IF NOT EXISTS track_album (
    track_id TEXT NOT NULL,
    album_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_track_album_track ON track_album(track_id);
"#;
