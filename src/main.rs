use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_etl::catalog_store::SqliteCatalogStore;
use catalog_etl::config::{credentials_from_env, AppConfig, CliConfig};
use catalog_etl::pipeline::{self, LoadOutcome};
use catalog_etl::spotify::SpotifyClient;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database file (created on first run).
    pub catalog_db: PathBuf,

    /// Genre to search tracks for.
    #[clap(long, default_value = "dubstep")]
    pub genre: String,

    /// Number of tracks to fetch per page.
    #[clap(long, default_value_t = 20)]
    pub limit: u32,

    /// Page offset override. Defaults to the current `track` row count.
    #[clap(long)]
    pub offset: Option<u32>,

    /// Keep going and load everything when the existing-id query fails,
    /// instead of aborting the run. Risks duplicate rows.
    #[clap(long)]
    pub load_all_on_id_query_failure: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let config = AppConfig::resolve(
        &CliConfig {
            catalog_db: cli_args.catalog_db,
            genre: cli_args.genre,
            limit: cli_args.limit,
            offset: cli_args.offset,
            load_all_on_id_query_failure: cli_args.load_all_on_id_query_failure,
        },
        credentials_from_env()?,
    )?;

    info!("Opening catalog database at {:?}...", config.catalog_db);
    let store = SqliteCatalogStore::open(&config.catalog_db)?;

    let client = SpotifyClient::connect(&config.credentials)
        .context("Failed to authenticate against the Spotify API")?;

    let summary = pipeline::run(&client, &store, &config)?;

    match &summary.outcome {
        LoadOutcome::Completed(loads) => {
            let rows: usize = loads.iter().map(|load| load.rows).sum();
            info!(tables = loads.len(), rows, "Run complete");
        }
        LoadOutcome::Aborted {
            loaded,
            table,
            error,
        } => {
            // Write failures end the run here; earlier tables stay committed.
            error!(
                table,
                error = %error,
                tables_committed = loaded.len(),
                "Error when loading to table; aborting remainder of the run"
            );
        }
    }

    info!(
        "Pipeline duration: {:.3}s",
        summary.total_duration().as_secs_f64()
    );
    info!(
        "Extract duration: {:.3}s",
        summary.extract_duration.as_secs_f64()
    );
    info!(
        "Transform duration: {:.3}s",
        summary.transform_duration.as_secs_f64()
    );
    info!(
        "Load duration: {:.3}s",
        summary.load_duration.as_secs_f64()
    );

    Ok(())
}
