//! Tracking-service sync client.
//!
//! [`RemoteSync`] is the seam the watchedlist reconciler talks to;
//! [`TraktClient`] implements it against a Trakt-style REST API through
//! the [`HttpTransport`] collaborator.
//!
//! Credential rules, applied uniformly to every operation:
//! - signed out (`Ok(None)` from the provider): event submissions are a
//!   silent no-op, fetches fail with [`Error::NotAuthenticated`] so the
//!   caller's local state stays untouched;
//! - expired credential whose refresh failed (`Err` from the provider):
//!   the error propagates through the operation's own channel.
//!
//! Errors from this client are terminal: nothing is retried here.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::auth::CredentialProvider;
use crate::config::TraktConfig;
use crate::error::{Error, Result};
use crate::media::{Media, MediaKind};
use crate::transport::{HttpRequest, HttpTransport};

/// Playback status reported alongside a scrobble event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedStatus {
    /// Playback is running.
    Watching,
    /// Playback is paused.
    Paused,
    /// Playback finished (or the item was explicitly marked watched).
    Finished,
}

impl WatchedStatus {
    /// Path segment of the scrobble endpoint for this status.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Watching => "start",
            Self::Paused => "pause",
            Self::Finished => "stop",
        }
    }
}

impl std::fmt::Display for WatchedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Watching => write!(f, "Watching"),
            Self::Paused => write!(f, "Paused"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// Remote side of the watch-state reconciliation.
///
/// Generic over the record type so fetched payloads come back as typed
/// records ready for snapshot caching.
#[async_trait]
pub trait RemoteSync<M: Media>: Send + Sync {
    /// Report playback progress for one item.
    async fn scrobble(
        &self,
        id: &str,
        progress: f32,
        kind: MediaKind,
        status: WatchedStatus,
    ) -> Result<()>;

    /// Remove one item from the remote watched history.
    async fn remove_watched(&self, id: &str, kind: MediaKind) -> Result<()>;

    /// Fetch the full remote watched list for `kind`.
    async fn fetch_watched(&self, kind: MediaKind) -> Result<Vec<M>>;

    /// Fetch the remote playback-progress entries for `kind`, with
    /// progress normalized to `[0, 1]`.
    async fn fetch_progress(&self, kind: MediaKind) -> Result<Vec<(M, f32)>>;
}

/// Wire key of the record fragment inside a response item.
const fn item_key(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Show => "show",
        MediaKind::Episode => "episode",
    }
}

/// Client for a Trakt-style tracking service.
pub struct TraktClient<T: HttpTransport> {
    config: TraktConfig,
    transport: T,
    credentials: Arc<dyn CredentialProvider>,
}

impl<T: HttpTransport> TraktClient<T> {
    /// Create a client over the given transport and credential provider.
    pub fn new(config: TraktConfig, transport: T, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            transport,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: HttpRequest, token: &str) -> HttpRequest {
        request
            .with_bearer(token)
            .with_header("trakt-api-key", self.config.client_id.clone())
            .with_header("trakt-api-version", "2")
    }

    /// Format the id payload for an event submission.
    ///
    /// Movies (and shows) are keyed by their imdb string id; episodes by
    /// their numeric tvdb id. Storage treats ids as opaque strings, so the
    /// numeric parse happens only here.
    fn id_payload(id: &str, kind: MediaKind) -> Result<Value> {
        match kind {
            MediaKind::Movie | MediaKind::Show => Ok(json!({ "ids": { "imdb": id } })),
            MediaKind::Episode => {
                let tvdb: u64 = id.parse().map_err(|_| Error::InvalidRemoteId {
                    id: id.to_string(),
                    kind,
                })?;
                Ok(json!({ "ids": { "tvdb": tvdb } }))
            }
        }
    }
}

#[async_trait]
impl<M: Media, T: HttpTransport> RemoteSync<M> for TraktClient<T> {
    async fn scrobble(
        &self,
        id: &str,
        progress: f32,
        kind: MediaKind,
        status: WatchedStatus,
    ) -> Result<()> {
        let Some(token) = self.credentials.access_token().await? else {
            debug!("Not signed in, skipping scrobble for {kind} {id}");
            return Ok(());
        };

        let ids = Self::id_payload(id, kind)?;
        let body = json!({
            (item_key(kind)): ids,
            "progress": f64::from(progress) * 100.0,
        });
        let request = self.authorized(
            HttpRequest::post(self.url(&format!("/scrobble/{}", status.endpoint())), body),
            &token,
        );

        self.transport.execute(request).await?;
        debug!("Scrobbled {kind} {id} at {progress} ({status})");
        Ok(())
    }

    async fn remove_watched(&self, id: &str, kind: MediaKind) -> Result<()> {
        let Some(token) = self.credentials.access_token().await? else {
            debug!("Not signed in, skipping watched removal for {kind} {id}");
            return Ok(());
        };

        let ids = Self::id_payload(id, kind)?;
        let body = json!({ (kind.namespace()): [ids] });
        let request =
            self.authorized(HttpRequest::post(self.url("/sync/history/remove"), body), &token);

        self.transport.execute(request).await?;
        debug!("Removed {kind} {id} from remote watched history");
        Ok(())
    }

    async fn fetch_watched(&self, kind: MediaKind) -> Result<Vec<M>> {
        let token = self
            .credentials
            .access_token()
            .await?
            .ok_or(Error::NotAuthenticated)?;

        let request = self.authorized(
            HttpRequest::get(self.url(&format!("/sync/watched/{}", kind.namespace()))),
            &token,
        );
        let response = self.transport.execute(request).await?;

        let items = response.body.as_array().cloned().unwrap_or_default();
        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            match M::from_remote(&item[item_key(kind)]) {
                Some(record) => records.push(record),
                None => warn!("Dropping malformed {kind} record from watched payload"),
            }
        }

        debug!("Fetched {} watched {} records", records.len(), kind);
        Ok(records)
    }

    async fn fetch_progress(&self, kind: MediaKind) -> Result<Vec<(M, f32)>> {
        let token = self
            .credentials
            .access_token()
            .await?
            .ok_or(Error::NotAuthenticated)?;

        let request = self.authorized(
            HttpRequest::get(self.url(&format!("/sync/playback/{}", kind.namespace()))),
            &token,
        );
        let response = self.transport.execute(request).await?;

        let items = response.body.as_array().cloned().unwrap_or_default();
        let mut entries = Vec::with_capacity(items.len());
        for item in &items {
            let Some(progress) = item["progress"].as_f64() else {
                warn!("Dropping {kind} playback entry without progress");
                continue;
            };
            match M::from_remote(&item[item_key(kind)]) {
                Some(record) => entries.push((record, (progress / 100.0) as f32)),
                None => warn!("Dropping malformed {kind} record from playback payload"),
            }
        }

        debug!("Fetched {} {} playback entries", entries.len(), kind);
        Ok(entries)
    }
}
