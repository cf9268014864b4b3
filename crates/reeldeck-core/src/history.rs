//! Watch-history registry.
//!
//! One [`Watchedlist`] exists per media kind with independent storage
//! namespaces. Instead of lazily created global singletons, the registry
//! is built once at startup with its collaborators injected and handed to
//! whoever needs watch state. Shows carry no watch state of their own, so
//! the registry exposes movie and episode reconcilers only.

use std::sync::Arc;

use crate::media::{Episode, MediaKind, Movie};
use crate::store::StateStore;
use crate::trakt::{RemoteSync, TraktClient};
use crate::transport::HttpTransport;
use crate::watchedlist::Watchedlist;

/// Per-kind watch-state reconcilers over one shared store.
#[derive(Debug)]
pub struct WatchHistory {
    movies: Watchedlist<Movie>,
    episodes: Watchedlist<Episode>,
}

impl WatchHistory {
    /// Build the registry from a shared store and per-kind remote
    /// clients.
    pub fn new(
        store: Arc<StateStore>,
        movie_remote: Arc<dyn RemoteSync<Movie>>,
        episode_remote: Arc<dyn RemoteSync<Episode>>,
    ) -> Self {
        Self {
            movies: Watchedlist::new(MediaKind::Movie, Arc::clone(&store), movie_remote),
            episodes: Watchedlist::new(MediaKind::Episode, store, episode_remote),
        }
    }

    /// Build the registry with one [`TraktClient`] serving both kinds.
    pub fn with_client<T: HttpTransport + 'static>(
        store: Arc<StateStore>,
        client: Arc<TraktClient<T>>,
    ) -> Self {
        Self::new(
            store,
            Arc::clone(&client) as Arc<dyn RemoteSync<Movie>>,
            client as Arc<dyn RemoteSync<Episode>>,
        )
    }

    /// Movie watch state.
    #[must_use]
    pub const fn movies(&self) -> &Watchedlist<Movie> {
        &self.movies
    }

    /// Episode watch state.
    #[must_use]
    pub const fn episodes(&self) -> &Watchedlist<Episode> {
        &self.episodes
    }
}
