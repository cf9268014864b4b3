//! Integration tests for Reeldeck watch-state workflows.
//!
//! These tests verify end-to-end reconciliation behavior including:
//! - Local-first reads and writes over an on-disk store
//! - Remote refreshes replacing (never merging into) local state
//! - On-deck derivation with partially failing refreshes
//! - Durability across a simulated application restart
//!
//! All tests use temporary directories as fixtures and a scripted fake
//! remote; no network is involved.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reeldeck_core::{
    Episode, Error, Media, MediaKind, Movie, RemoteSync, Result, StateStore, WatchHistory,
    Watchedlist, WatchedStatus, STORE_FILE,
};
use tempfile::TempDir;

// =============================================================================
// Test Fixtures and Utilities
// =============================================================================

/// Scripted stand-in for the tracking service. Fetches serve canned data
/// or fail when none is scripted; event submissions always succeed and
/// are recorded.
struct ScriptedRemote<M> {
    watched: Mutex<Option<Vec<M>>>,
    progress: Mutex<Option<Vec<(M, f32)>>>,
    scrobbles: Mutex<Vec<(String, f32)>>,
}

impl<M> ScriptedRemote<M> {
    fn offline() -> Self {
        Self {
            watched: Mutex::new(None),
            progress: Mutex::new(None),
            scrobbles: Mutex::new(Vec::new()),
        }
    }

    fn serve_watched(&self, records: Vec<M>) {
        *self.watched.lock().unwrap() = Some(records);
    }

    fn serve_progress(&self, entries: Vec<(M, f32)>) {
        *self.progress.lock().unwrap() = Some(entries);
    }
}

#[async_trait]
impl<M: Media> RemoteSync<M> for ScriptedRemote<M> {
    async fn scrobble(
        &self,
        id: &str,
        progress: f32,
        _kind: MediaKind,
        _status: WatchedStatus,
    ) -> Result<()> {
        self.scrobbles.lock().unwrap().push((id.to_string(), progress));
        Ok(())
    }

    async fn remove_watched(&self, _id: &str, _kind: MediaKind) -> Result<()> {
        Ok(())
    }

    async fn fetch_watched(&self, _kind: MediaKind) -> Result<Vec<M>> {
        self.watched
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Transport("scripted remote offline".to_string()))
    }

    async fn fetch_progress(&self, _kind: MediaKind) -> Result<Vec<(M, f32)>> {
        self.progress
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Transport("scripted remote offline".to_string()))
    }
}

/// Test fixture providing an on-disk store and a movie watchedlist wired
/// to a scripted remote.
struct TestFixture {
    /// Keeps the store directory alive for the fixture's lifetime.
    _data_dir: TempDir,
    store_path: PathBuf,
    remote: Arc<ScriptedRemote<Movie>>,
    movies: Watchedlist<Movie>,
}

impl TestFixture {
    fn new() -> Self {
        let data_dir = TempDir::new().expect("Failed to create temp data dir");
        let store_path = data_dir.path().join(STORE_FILE);
        let store = Arc::new(StateStore::open(&store_path).expect("Failed to open store"));
        let remote = Arc::new(ScriptedRemote::offline());
        let movies = Watchedlist::new(
            MediaKind::Movie,
            store,
            Arc::clone(&remote) as Arc<dyn RemoteSync<Movie>>,
        );

        Self {
            _data_dir: data_dir,
            store_path,
            remote,
            movies,
        }
    }

    /// Reopen the store from disk, as an application restart would.
    fn reopened_movies(&self) -> Watchedlist<Movie> {
        let store = Arc::new(StateStore::open(&self.store_path).expect("Failed to reopen store"));
        Watchedlist::new(
            MediaKind::Movie,
            store,
            Arc::clone(&self.remote) as Arc<dyn RemoteSync<Movie>>,
        )
    }
}

fn movie(id: &str, title: &str) -> Movie {
    Movie {
        id: id.to_string(),
        tmdb_id: None,
        title: title.to_string(),
        year: None,
        summary: String::new(),
        rating: 0.0,
        certification: String::new(),
        trailer: None,
        large_background_image: None,
        large_cover_image: None,
    }
}

fn episode(id: &str, title: &str, season: u32, number: u32) -> Episode {
    Episode {
        id: id.to_string(),
        show_id: None,
        title: title.to_string(),
        season,
        episode: number,
        summary: String::new(),
        first_aired: None,
        screenshot_image: None,
    }
}

// =============================================================================
// Local-first behavior
// =============================================================================

#[tokio::test]
async fn local_mutations_succeed_while_remote_is_down() {
    let fixture = TestFixture::new();
    let deadpool = movie("tt1431045", "Deadpool");

    fixture.movies.add(&deadpool).unwrap();
    fixture
        .movies
        .set_progress(0.3, &movie("tt0137523", "Fight Club"), WatchedStatus::Paused)
        .unwrap();

    assert!(fixture.movies.is_added(&deadpool));
    assert_eq!(
        fixture.movies.progress(&movie("tt0137523", "Fight Club")),
        0.3
    );
}

#[tokio::test]
async fn synchronous_read_reflects_pre_refresh_state() {
    let fixture = TestFixture::new();
    let local = movie("tt-local", "Local");
    fixture.movies.add(&local).unwrap();
    fixture
        .remote
        .serve_watched(vec![movie("tt-remote", "Remote")]);

    // The synchronous read answers from local state even though a remote
    // refresh would produce something different.
    let snapshot = fixture.movies.watched();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "tt-local");

    let refreshed = fixture.movies.refresh_watched().await.unwrap();
    assert_eq!(refreshed[0].id, "tt-remote");
}

// =============================================================================
// Remote reconciliation
// =============================================================================

#[tokio::test]
async fn successful_refresh_replaces_local_state_entirely() {
    let fixture = TestFixture::new();
    let a = movie("tt-a", "A");
    let b = movie("tt-b", "B");
    let c = movie("tt-c", "C");

    fixture.movies.add(&a).unwrap();
    fixture.movies.add(&b).unwrap();
    fixture.remote.serve_watched(vec![b.clone(), c.clone()]);

    fixture.movies.refresh_watched().await.unwrap();

    assert!(!fixture.movies.is_added(&a));
    assert!(fixture.movies.is_added(&b));
    assert!(fixture.movies.is_added(&c));
    assert_eq!(fixture.movies.watched().len(), 2);
}

#[tokio::test]
async fn failed_refresh_leaves_local_state_untouched() {
    let fixture = TestFixture::new();
    let deadpool = movie("tt1431045", "Deadpool");
    fixture.movies.add(&deadpool).unwrap();
    fixture
        .movies
        .set_progress(0.4, &deadpool, WatchedStatus::Paused)
        .unwrap();

    assert!(fixture.movies.refresh_watched().await.is_err());
    assert!(fixture.movies.refresh_progress().await.is_err());

    assert!(fixture.movies.is_added(&deadpool));
    assert_eq!(fixture.movies.progress(&deadpool), 0.4);
}

// =============================================================================
// On deck
// =============================================================================

#[tokio::test]
async fn on_deck_excludes_promoted_items() {
    let fixture = TestFixture::new();
    let halfway = movie("tt-half", "Halfway There");
    let finished = movie("tt-done", "Almost Done");

    fixture
        .movies
        .set_progress(0.5, &halfway, WatchedStatus::Paused)
        .unwrap();
    // 0.9 crosses the promotion threshold and lands in the watched set.
    fixture
        .movies
        .set_progress(0.9, &finished, WatchedStatus::Paused)
        .unwrap();

    let on_deck = fixture.movies.on_deck();
    assert_eq!(on_deck.len(), 1);
    assert_eq!(on_deck[0].id, "tt-half");
}

#[tokio::test]
async fn on_deck_refresh_settles_when_one_source_fails() {
    let fixture = TestFixture::new();
    let watched = movie("tt-seen", "Seen");
    let in_progress = movie("tt-deck", "On Deck");

    fixture.movies.add(&watched).unwrap();
    // Progress refresh is scripted, watched refresh stays offline.
    fixture
        .remote
        .serve_progress(vec![(in_progress.clone(), 0.25), (watched.clone(), 0.95)]);

    let on_deck = fixture.movies.refresh_on_deck().await;

    // The refreshed progress map combined with the surviving local
    // watched set: only the unwatched in-progress item is on deck.
    let ids: Vec<&str> = on_deck.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["tt-deck"]);
    assert!(fixture.movies.is_added(&watched));
}

#[tokio::test]
async fn on_deck_refresh_settles_when_both_sources_fail() {
    let fixture = TestFixture::new();
    let in_progress = movie("tt-deck", "On Deck");
    fixture
        .movies
        .set_progress(0.25, &in_progress, WatchedStatus::Paused)
        .unwrap();

    // Both fetches fail; the derivation still completes from local state.
    let on_deck = fixture.movies.refresh_on_deck().await;

    assert_eq!(on_deck.len(), 1);
    assert_eq!(on_deck[0].id, "tt-deck");
}

// =============================================================================
// Durability and partitioning
// =============================================================================

#[tokio::test]
async fn watch_state_survives_restart() {
    let fixture = TestFixture::new();
    let deadpool = movie("tt1431045", "Deadpool");
    fixture.movies.add(&deadpool).unwrap();
    fixture
        .movies
        .set_progress(0.6, &movie("tt0137523", "Fight Club"), WatchedStatus::Paused)
        .unwrap();

    let reopened = fixture.reopened_movies();

    assert!(reopened.is_added(&deadpool));
    assert_eq!(reopened.progress(&movie("tt0137523", "Fight Club")), 0.6);
    assert_eq!(reopened.watched()[0].title, "Deadpool");
}

#[tokio::test]
async fn movie_and_episode_state_are_independent() {
    let data_dir = TempDir::new().expect("Failed to create temp data dir");
    let store = Arc::new(
        StateStore::open(data_dir.path().join(STORE_FILE)).expect("Failed to open store"),
    );
    let history = WatchHistory::new(
        Arc::clone(&store),
        Arc::new(ScriptedRemote::offline()) as Arc<dyn RemoteSync<Movie>>,
        Arc::new(ScriptedRemote::offline()) as Arc<dyn RemoteSync<Episode>>,
    );

    let deadpool = movie("tt1431045", "Deadpool");
    let pilot = episode("349232", "Pilot", 1, 1);

    history.movies().add(&deadpool).unwrap();
    history.episodes().add(&pilot).unwrap();
    history.episodes().remove(&pilot).unwrap();

    assert!(history.movies().is_added(&deadpool));
    assert!(history.episodes().watched().is_empty());
}

#[tokio::test]
async fn scrubbing_scrobbles_raw_progress() {
    let fixture = TestFixture::new();
    let deadpool = movie("tt1431045", "Deadpool");

    fixture
        .movies
        .set_progress(0.42, &deadpool, WatchedStatus::Watching)
        .unwrap();

    // Fire-and-forget notification; give the spawned task a moment.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let scrobbles = fixture.remote.scrobbles.lock().unwrap();
    assert!(scrobbles.contains(&("tt1431045".to_string(), 0.42)));
}
