//! Watch-state reconciliation.
//!
//! [`Watchedlist`] is the single authoritative API for a user's watched
//! flags and playback progress within one [`MediaKind`]. It reconciles
//! two sources of truth that can disagree:
//!
//! - the local [`StateStore`], always available, updated synchronously by
//!   every mutating call;
//! - the remote tracking service, reached through [`RemoteSync`], which
//!   may be slow, stale, signed out, or down.
//!
//! The contract is local-first, remote-best-effort. A user action (mark
//! watched, scrub a progress bar) always lands in the store before the
//! method returns and is never blocked or rolled back by network
//! conditions; the matching remote event is spawned fire-and-forget and
//! its failure is only logged. In the other direction, a remote fetch
//! that succeeds fully REPLACES the local partition (the service is
//! authoritative when it answers); a fetch that fails leaves local state
//! byte-for-byte untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::media::{Media, MediaKind};
use crate::store::StateStore;
use crate::trakt::{RemoteSync, WatchedStatus};

/// Progress fraction at which an item is automatically promoted into the
/// watched set: nearly finished counts as finished.
pub const WATCHED_THRESHOLD: f32 = 0.8;

/// Storage keys within a kind's namespace. The watchedlist key holds full
/// serialized records (ids are derived from them); progress is split into
/// a fraction map and a parallel snapshot map.
const WATCHEDLIST_KEY: &str = "Watchedlist";
const PROGRESS_KEY: &str = "Progress";
const PROGRESS_MEDIA_KEY: &str = "ProgressRawMedia";

/// Watched/progress reconciler for a single media kind.
///
/// Mutating methods write the store synchronously, so per-item ordering
/// follows caller-invocation order even when the corresponding remote
/// notifications complete out of order or never. They spawn their remote
/// notification onto the runtime and must therefore be called from within
/// one.
pub struct Watchedlist<M: Media> {
    kind: MediaKind,
    store: Arc<StateStore>,
    remote: Arc<dyn RemoteSync<M>>,
}

impl<M: Media> Watchedlist<M> {
    /// Create a reconciler for `kind` over a shared store and remote
    /// client.
    pub fn new(kind: MediaKind, store: Arc<StateStore>, remote: Arc<dyn RemoteSync<M>>) -> Self {
        Self {
            kind,
            store,
            remote,
        }
    }

    /// Kind this reconciler is bound to.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    // =========================================================================
    // Watched set
    // =========================================================================

    /// Check whether `media` is in the watched set. Pure local read.
    #[must_use]
    pub fn is_added(&self, media: &M) -> bool {
        self.load_watched().iter().any(|r| r.id() == media.id())
    }

    /// Flip the watched state of `media`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted.
    pub fn toggle(&self, media: &M) -> Result<()> {
        if self.is_added(media) {
            self.remove(media)
        } else {
            self.add(media)
        }
    }

    /// Mark `media` watched.
    ///
    /// Notifies the remote service (progress 1.0, finished) without
    /// waiting for it, then inserts the record into the local watched
    /// set. Idempotent: re-adding an already watched item overwrites its
    /// snapshot without duplicating membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted. Remote failures
    /// are logged and swallowed.
    pub fn add(&self, media: &M) -> Result<()> {
        self.notify_scrobble(media.id(), 1.0, WatchedStatus::Finished);

        let mut records = self.load_watched();
        records.retain(|r| r.id() != media.id());
        records.push(media.clone());
        self.store_watched(&records)
    }

    /// Remove `media` from the watched set.
    ///
    /// Notifies the remote service without waiting for it. Removing an
    /// item that is not in the set is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted.
    pub fn remove(&self, media: &M) -> Result<()> {
        self.notify_removal(media.id());

        let mut records = self.load_watched();
        let before = records.len();
        records.retain(|r| r.id() != media.id());
        if records.len() == before {
            return Ok(());
        }
        self.store_watched(&records)
    }

    /// Current local watched set. Possibly stale with respect to the
    /// remote service; never blocks.
    #[must_use]
    pub fn watched(&self) -> Vec<M> {
        self.load_watched()
    }

    /// Fetch the remote watched list and replace the local set with it.
    ///
    /// # Errors
    ///
    /// Returns the fetch or persistence error; on any error the local set
    /// is left untouched. Errors are terminal, nothing is retried.
    pub async fn refresh_watched(&self) -> Result<Vec<M>> {
        let records = self.remote.fetch_watched(self.kind).await?;
        self.store_watched(&records)?;
        debug!("Replaced local {} watchedlist with {} remote records", self.kind, records.len());
        Ok(records)
    }

    // =========================================================================
    // Playback progress
    // =========================================================================

    /// Last stored playback progress for `media`, 0.0 when none. Pure
    /// local read.
    #[must_use]
    pub fn progress(&self, media: &M) -> f32 {
        self.load_progress()
            .get(media.id())
            .copied()
            .unwrap_or(0.0)
    }

    /// Current local progress map (id to fraction).
    #[must_use]
    pub fn progress_map(&self) -> HashMap<String, f32> {
        self.load_progress()
    }

    /// Record playback progress for `media`.
    ///
    /// Scrobbles the raw value to the remote service without waiting for
    /// it, then overwrites the local progress and snapshot entries. At
    /// [`WATCHED_THRESHOLD`] or above the item is additionally promoted
    /// through the full [`add`](Self::add) sequence.
    ///
    /// The value is stored exactly as passed; callers are expected to
    /// stay within `[0, 1]` and nothing here clamps them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted.
    pub fn set_progress(&self, progress: f32, media: &M, status: WatchedStatus) -> Result<()> {
        self.notify_scrobble(media.id(), progress, status);

        let mut fractions = self.load_progress();
        let mut snapshots = self.load_progress_media();
        fractions.insert(media.id().to_owned(), progress);
        snapshots.insert(media.id().to_owned(), media.clone());
        self.store
            .set(self.kind.namespace(), PROGRESS_KEY, &fractions)?;
        self.store
            .set(self.kind.namespace(), PROGRESS_MEDIA_KEY, &snapshots)?;

        if progress >= WATCHED_THRESHOLD {
            self.add(media)?;
        }
        Ok(())
    }

    /// Fetch remote playback progress and replace the local progress and
    /// snapshot maps with it.
    ///
    /// # Errors
    ///
    /// Returns the fetch or persistence error; on any error the local
    /// maps are left untouched.
    pub async fn refresh_progress(&self) -> Result<HashMap<String, f32>> {
        let entries = self.remote.fetch_progress(self.kind).await?;

        let mut fractions = HashMap::with_capacity(entries.len());
        let mut snapshots = HashMap::with_capacity(entries.len());
        for (record, progress) in entries {
            fractions.insert(record.id().to_owned(), progress);
            snapshots.insert(record.id().to_owned(), record);
        }
        self.store
            .set(self.kind.namespace(), PROGRESS_KEY, &fractions)?;
        self.store
            .set(self.kind.namespace(), PROGRESS_MEDIA_KEY, &snapshots)?;
        debug!("Replaced local {} progress with {} remote entries", self.kind, fractions.len());
        Ok(fractions)
    }

    // =========================================================================
    // On deck
    // =========================================================================

    /// Items with recorded progress that are not yet watched, derived
    /// from current local state.
    #[must_use]
    pub fn on_deck(&self) -> Vec<M> {
        self.compute_on_deck()
    }

    /// Refresh both the watched set and the progress map, then derive the
    /// on-deck set from whatever local state is then available.
    ///
    /// The two refreshes run concurrently and are always both awaited;
    /// either one failing only means its partition keeps the pre-call
    /// local state. Yields exactly once regardless of completion order.
    pub async fn refresh_on_deck(&self) -> Vec<M> {
        let (watched, progress) = tokio::join!(self.refresh_watched(), self.refresh_progress());
        if let Err(e) = watched {
            warn!("Watched refresh failed, deriving on-deck from local state: {e}");
        }
        if let Err(e) = progress {
            warn!("Progress refresh failed, deriving on-deck from local state: {e}");
        }
        self.compute_on_deck()
    }

    fn compute_on_deck(&self) -> Vec<M> {
        let watched: HashSet<String> = self
            .load_watched()
            .iter()
            .map(|r| r.id().to_owned())
            .collect();
        self.load_progress_media()
            .into_values()
            .filter(|r| !watched.contains(r.id()))
            .collect()
    }

    // =========================================================================
    // Store and remote plumbing
    // =========================================================================

    fn load_watched(&self) -> Vec<M> {
        self.store
            .get(self.kind.namespace(), WATCHEDLIST_KEY)
            .unwrap_or_default()
    }

    fn store_watched(&self, records: &[M]) -> Result<()> {
        self.store
            .set(self.kind.namespace(), WATCHEDLIST_KEY, &records)
    }

    fn load_progress(&self) -> HashMap<String, f32> {
        self.store
            .get(self.kind.namespace(), PROGRESS_KEY)
            .unwrap_or_default()
    }

    fn load_progress_media(&self) -> HashMap<String, M> {
        self.store
            .get(self.kind.namespace(), PROGRESS_MEDIA_KEY)
            .unwrap_or_default()
    }

    /// Send a scrobble event without blocking the caller. Failure is
    /// logged and swallowed: a local action never fails visibly because
    /// the network did.
    fn notify_scrobble(&self, id: &str, progress: f32, status: WatchedStatus) {
        let remote = Arc::clone(&self.remote);
        let id = id.to_owned();
        let kind = self.kind;
        tokio::spawn(async move {
            if let Err(e) = remote.scrobble(&id, progress, kind, status).await {
                debug!("Scrobble for {kind} {id} not delivered: {e}");
            }
        });
    }

    /// Send a watched-removal event without blocking the caller.
    fn notify_removal(&self, id: &str) {
        let remote = Arc::clone(&self.remote);
        let id = id.to_owned();
        let kind = self.kind;
        tokio::spawn(async move {
            if let Err(e) = remote.remove_watched(&id, kind).await {
                debug!("Watched removal for {kind} {id} not delivered: {e}");
            }
        });
    }
}

impl<M: Media> std::fmt::Debug for Watchedlist<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watchedlist")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
