//! Blocking Spotify Web API client for the ETL job.
//!
//! Client-credentials flow only: one token per run, no refresh, no retry.
//! A 429 from the API is surfaced to the caller, never retried here.

use super::models::{ArtistDetail, SearchPage, SearchResponse, Token};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Maximum searchable depth of the paginated search endpoint. The API refuses
/// windows reaching this offset, so the check runs before any request.
const MAX_SEARCH_WINDOW: u32 = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error(
        "search window exceeds maximum depth: offset {offset} + limit {limit} >= {MAX_SEARCH_WINDOW}"
    )]
    OffsetExceeded { offset: u32, limit: u32 },

    #[error("rate limited by the Spotify API (HTTP 429)")]
    RateLimited,

    #[error("{endpoint} request failed with HTTP {status}")]
    Api {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("malformed {endpoint} document: {source}")]
    Schema {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client id/secret pair for the client-credentials grant.
#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

pub struct SpotifyClient {
    http: Client,
    token: Token,
}

impl SpotifyClient {
    /// Authenticate with the client-credentials grant and build a client.
    pub fn connect(credentials: &SpotifyCredentials) -> Result<Self, SpotifyError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let response = http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()?;
        if !response.status().is_success() {
            return Err(SpotifyError::Api {
                endpoint: "token",
                status: response.status(),
            });
        }
        let token: Token = parse(response, "token")?;

        info!("Obtained Spotify access token ({})", token.token_type);
        Ok(Self { http, token })
    }

    /// Fetch one page of track search results for a genre.
    ///
    /// Fails with [`SpotifyError::OffsetExceeded`] before any network call
    /// when the requested window reaches the API's maximum searchable depth.
    pub fn search_tracks_by_genre(
        &self,
        genre: &str,
        offset: u32,
        limit: u32,
    ) -> Result<SearchPage, SpotifyError> {
        check_search_window(offset, limit)?;

        let url = format!(
            "{API_BASE}/search?q={}&type=track&offset={offset}&limit={limit}",
            urlencoding::encode(&format!("genre:{genre}")),
        );
        let response = self.get("search", &url)?;
        let search: SearchResponse = parse(response, "search")?;
        info!(genre, offset, limit, "Fetched genre search page");
        Ok(search.tracks)
    }

    /// Fetch the full artist document for one artist id.
    pub fn get_artist(&self, artist_id: &str) -> Result<ArtistDetail, SpotifyError> {
        let url = format!("{API_BASE}/artists/{artist_id}");
        let response = self.get("artist", &url)?;
        parse(response, "artist")
    }

    fn get(&self, endpoint: &'static str, url: &str) -> Result<Response, SpotifyError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token.access_token)
            .send()?;
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(SpotifyError::RateLimited),
            status if !status.is_success() => Err(SpotifyError::Api { endpoint, status }),
            _ => Ok(response),
        }
    }
}

fn check_search_window(offset: u32, limit: u32) -> Result<(), SpotifyError> {
    if offset + limit >= MAX_SEARCH_WINDOW {
        return Err(SpotifyError::OffsetExceeded { offset, limit });
    }
    Ok(())
}

fn parse<T: DeserializeOwned>(response: Response, endpoint: &'static str) -> Result<T, SpotifyError> {
    let body = response.text()?;
    serde_json::from_str(&body).map_err(|source| SpotifyError::Schema { endpoint, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_window_at_maximum_depth_is_rejected() {
        let err = check_search_window(990, 20).unwrap_err();
        assert!(matches!(
            err,
            SpotifyError::OffsetExceeded {
                offset: 990,
                limit: 20
            }
        ));
    }

    #[test]
    fn test_search_window_boundary() {
        // 979 + 20 = 999 is the deepest allowed window
        assert!(check_search_window(979, 20).is_ok());
        assert!(check_search_window(980, 20).is_err());
        assert!(check_search_window(0, 20).is_ok());
    }

    #[test]
    fn test_offset_exceeded_message_names_the_window() {
        let err = check_search_window(990, 20).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("990"));
        assert!(msg.contains("20"));
        assert!(msg.contains("1000"));
    }
}
