//! `Reeldeck` Core Library
//!
//! This crate provides the watch-state core for the `Reeldeck`
//! application:
//! - Typed media records (movies, shows, episodes) with stable catalog ids
//! - A locally persisted watched/progress ledger
//! - Reconciliation against a Trakt-style remote tracking service that may
//!   be unavailable, slow, or stale
//! - An on-deck ("continue watching") derivation
//!
//! # Consistency model
//!
//! Mutations are local-first: marking an item watched or recording
//! playback progress always succeeds against the local store, with the
//! remote service notified on a best-effort, fire-and-forget basis.
//! Remote reads replace local state wholesale when they succeed and leave
//! it untouched when they fail.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reeldeck_core::{
//!     FixedCredential, ReqwestTransport, StateStore, TraktClient, TraktConfig, WatchHistory,
//! };
//!
//! let store = Arc::new(StateStore::open_default()?);
//! let client = Arc::new(TraktClient::new(
//!     TraktConfig::default().with_client_id("client-id"),
//!     ReqwestTransport::new(),
//!     Arc::new(FixedCredential::new("token")),
//! ));
//! let history = WatchHistory::with_client(store, client);
//!
//! history.movies().toggle(&movie)?;
//! let on_deck = history.movies().refresh_on_deck().await;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod history;
pub mod media;
pub mod store;
pub mod trakt;
pub mod transport;
pub mod watchedlist;

pub use auth::{CredentialProvider, FixedCredential, SignedOut};
pub use config::{AppConfig, ConfigManager, DEFAULT_TRAKT_BASE_URL, TraktConfig};
pub use error::{Error, Result};
pub use history::WatchHistory;
pub use media::{Episode, Media, MediaKind, Movie, Show};
pub use store::{STORE_FILE, StateStore, default_data_directory};
pub use trakt::{RemoteSync, TraktClient, WatchedStatus};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use watchedlist::{WATCHED_THRESHOLD, Watchedlist};
