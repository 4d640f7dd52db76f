//! The page-at-a-time ETL pipeline.
//!
//! Strictly sequential stages: extract -> transform -> load. A stage never
//! starts before its predecessor's full output is available, and one run
//! processes exactly one search page. Extraction failures propagate to the
//! caller; load failures terminate the run here, summarized in the outcome.

pub mod extract;
pub mod load;
pub mod transform;

pub use extract::Extraction;
pub use load::{LoadOutcome, RecordSets, TableLoad};

use crate::catalog_store::models::EntityTable;
use crate::catalog_store::CatalogStore;
use crate::config::AppConfig;
use crate::spotify::{SpotifyClient, SpotifyError};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Spotify(#[from] SpotifyError),

    #[error("querying existing ids for table `{table}` failed: {source}")]
    ExistingIds {
        table: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("counting rows in `track` for the page offset failed: {0}")]
    Offset(#[source] anyhow::Error),
}

/// What one run did, stage by stage.
pub struct RunSummary {
    pub offset: u32,
    pub extract_duration: Duration,
    pub transform_duration: Duration,
    pub load_duration: Duration,
    pub outcome: LoadOutcome,
}

impl RunSummary {
    pub fn total_duration(&self) -> Duration {
        self.extract_duration + self.transform_duration + self.load_duration
    }
}

/// Run the whole pipeline once against `store`.
pub fn run(
    client: &SpotifyClient,
    store: &dyn CatalogStore,
    config: &AppConfig,
) -> Result<RunSummary, PipelineError> {
    // The track row count stands in for a persisted page cursor unless the
    // operator fixed the offset explicitly. Partially failed earlier runs
    // skew the count; see --offset.
    let offset = match config.offset {
        Some(offset) => offset,
        None => store
            .count_rows(EntityTable::Track)
            .map_err(PipelineError::Offset)? as u32,
    };
    info!(genre = %config.genre, offset, limit = config.page_limit, "Starting pipeline run");

    let extract_started = Instant::now();
    let extraction = extract::run(client, &config.genre, offset, config.page_limit)?;
    let extract_duration = extract_started.elapsed();

    let transform_started = Instant::now();
    let artists = transform::filter_new(
        transform::artist_records(&extraction.artist_details),
        &existing_ids(store, EntityTable::Artist, config)?,
    );
    let albums = transform::filter_new(
        transform::album_records(&extraction.page),
        &existing_ids(store, EntityTable::Album, config)?,
    );
    let tracks = transform::filter_new(
        transform::track_records(&extraction.page),
        &existing_ids(store, EntityTable::Track, config)?,
    );
    let sets = RecordSets {
        artists,
        albums,
        tracks,
        artist_genres: transform::artist_genre_rows(&extraction.artist_details),
        artist_tracks: transform::artist_track_rows(&extraction.page),
        artist_albums: transform::artist_album_rows(&extraction.page),
        track_albums: transform::track_album_rows(&extraction.page),
    };
    let transform_duration = transform_started.elapsed();

    let load_started = Instant::now();
    let outcome = load::run(store, &sets);
    let load_duration = load_started.elapsed();

    Ok(RunSummary {
        offset,
        extract_duration,
        transform_duration,
        load_duration,
        outcome,
    })
}

/// Ids already persisted for one entity table.
///
/// A failed query aborts the run unless the operator opted into the degraded
/// behavior, in which case nothing is excluded and duplicate key errors
/// surface at load time instead.
fn existing_ids(
    store: &dyn CatalogStore,
    table: EntityTable,
    config: &AppConfig,
) -> Result<HashSet<String>, PipelineError> {
    match store.existing_ids(table) {
        Ok(ids) => Ok(ids),
        Err(source) if config.load_all_on_id_query_failure => {
            warn!(
                table = table.table_name(),
                error = %source,
                "Existing-id query failed; loading everything without deduplication"
            );
            Ok(HashSet::new())
        }
        Err(source) => Err(PipelineError::ExistingIds {
            table: table.table_name(),
            source,
        }),
    }
}
