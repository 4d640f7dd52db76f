//! Spotify Web API integration.
//!
//! One blocking client per run, authenticated with the client-credentials
//! grant. The typed response documents live in [`models`].

mod client;
pub mod models;

pub use client::{SpotifyClient, SpotifyCredentials, SpotifyError};
