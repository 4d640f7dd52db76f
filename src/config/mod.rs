//! Run configuration.
//!
//! Everything the job needs comes from two places: CLI arguments (database
//! path, genre, paging) and the environment (API credentials). There is no
//! config file and no persisted state.

use crate::spotify::SpotifyCredentials;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// The search endpoint rejects page sizes above this.
const MAX_PAGE_LIMIT: u32 = 50;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

/// CLI arguments relevant for config resolution. This struct mirrors the
/// clap arguments so resolution stays testable without a parser.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_db: PathBuf,
    pub genre: String,
    pub limit: u32,
    pub offset: Option<u32>,
    pub load_all_on_id_query_failure: bool,
}

/// Resolved, validated configuration for one pipeline run.
#[derive(Clone)]
pub struct AppConfig {
    pub catalog_db: PathBuf,
    pub genre: String,
    pub page_limit: u32,
    /// Fixed page offset. When absent the run derives it from the current
    /// `track` row count.
    pub offset: Option<u32>,
    /// When true, a failed existing-id query degrades to "no exclusions"
    /// (everything is loaded, duplicates possible) instead of aborting.
    pub load_all_on_id_query_failure: bool,
    pub credentials: SpotifyCredentials,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("catalog_db", &self.catalog_db)
            .field("genre", &self.genre)
            .field("page_limit", &self.page_limit)
            .field("offset", &self.offset)
            .field(
                "load_all_on_id_query_failure",
                &self.load_all_on_id_query_failure,
            )
            .field("credentials", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    /// Validate CLI values and combine them with the given credentials.
    pub fn resolve(cli: &CliConfig, credentials: SpotifyCredentials) -> Result<Self> {
        if cli.genre.trim().is_empty() {
            bail!("genre must not be empty");
        }
        if cli.limit == 0 || cli.limit > MAX_PAGE_LIMIT {
            bail!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT,
                cli.limit
            );
        }

        Ok(Self {
            catalog_db: cli.catalog_db.clone(),
            genre: cli.genre.clone(),
            page_limit: cli.limit,
            offset: cli.offset,
            load_all_on_id_query_failure: cli.load_all_on_id_query_failure,
            credentials,
        })
    }
}

/// Read the API credentials from the environment.
pub fn credentials_from_env() -> Result<SpotifyCredentials> {
    let client_id = std::env::var(CLIENT_ID_VAR)
        .with_context(|| format!("{} must be set in the environment", CLIENT_ID_VAR))?;
    let client_secret = std::env::var(CLIENT_SECRET_VAR)
        .with_context(|| format!("{} must be set in the environment", CLIENT_SECRET_VAR))?;
    Ok(SpotifyCredentials {
        client_id,
        client_secret,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn valid_cli() -> CliConfig {
        CliConfig {
            catalog_db: PathBuf::from("catalog.db"),
            genre: "dubstep".to_string(),
            limit: 20,
            offset: None,
            load_all_on_id_query_failure: false,
        }
    }

    #[test]
    fn test_resolve_valid_config() {
        let config = AppConfig::resolve(&valid_cli(), test_credentials()).unwrap();
        assert_eq!(config.genre, "dubstep");
        assert_eq!(config.page_limit, 20);
        assert!(config.offset.is_none());
        assert!(!config.load_all_on_id_query_failure);
    }

    #[test]
    fn test_resolve_rejects_empty_genre() {
        let cli = CliConfig {
            genre: "  ".to_string(),
            ..valid_cli()
        };
        let err = AppConfig::resolve(&cli, test_credentials()).unwrap_err();
        assert!(err.to_string().contains("genre"));
    }

    #[test]
    fn test_resolve_rejects_bad_limits() {
        for limit in [0, 51, 1000] {
            let cli = CliConfig {
                limit,
                ..valid_cli()
            };
            assert!(AppConfig::resolve(&cli, test_credentials()).is_err());
        }
        for limit in [1, 20, 50] {
            let cli = CliConfig {
                limit,
                ..valid_cli()
            };
            assert!(AppConfig::resolve(&cli, test_credentials()).is_ok());
        }
    }

    #[test]
    fn test_resolve_keeps_offset_override() {
        let cli = CliConfig {
            offset: Some(120),
            ..valid_cli()
        };
        let config = AppConfig::resolve(&cli, test_credentials()).unwrap();
        assert_eq!(config.offset, Some(120));
    }
}
