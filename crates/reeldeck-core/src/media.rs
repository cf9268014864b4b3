//! Media identity and typed catalog records.
//!
//! Every watchable item carries a stable catalog id and a [`MediaKind`]
//! discriminator. The watch-state subsystem partitions all of its storage
//! by kind and treats ids as opaque strings; the only place the
//! imdb-string / tvdb-number distinction matters is the remote wire
//! protocol (see the `trakt` module).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator for the three watchable media kinds.
///
/// Each kind has an independent storage namespace. Shows carry no watch
/// state of their own; only their episodes do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film, identified by an imdb-style string id.
    Movie,
    /// Television show. Watch state lives on its episodes.
    Show,
    /// Single episode of a show, identified by a numeric tvdb id
    /// carried as a string.
    Episode,
}

impl MediaKind {
    /// Storage namespace for this kind. Doubles as the path segment the
    /// tracking service uses for the same partition.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Show => "shows",
            Self::Episode => "episodes",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Show => write!(f, "show"),
            Self::Episode => write!(f, "episode"),
        }
    }
}

/// A watchable catalog record.
///
/// Implementors are plain serde-serializable data so the watchedlist can
/// snapshot full records into the local store and reconstruct them
/// without a remote round-trip.
pub trait Media: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable catalog id, unique within a kind.
    fn id(&self) -> &str;

    /// Display title.
    fn title(&self) -> &str;

    /// Reconstruct a record from a remote payload fragment.
    ///
    /// Returns `None` when a required field is missing, in which case the
    /// caller drops that single record and continues with the rest of the
    /// batch.
    fn from_remote(value: &Value) -> Option<Self>;
}

fn sized_variant(url: Option<&String>, size: &str) -> Option<String> {
    url.map(|u| u.replace("original", size))
}

/// A feature film.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Imdb id of the movie.
    pub id: String,
    /// TMDB id, when the catalog supplied one.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    /// Title of the movie.
    pub title: String,
    /// Release year.
    #[serde(default)]
    pub year: Option<u16>,
    /// Synopsis. Empty when the catalog has none.
    #[serde(default)]
    pub summary: String,
    /// Rating percentage, 0.0 when unrated.
    #[serde(default)]
    pub rating: f32,
    /// Certification according to the motion picture rating system.
    #[serde(default)]
    pub certification: String,
    /// Trailer URL, if any.
    #[serde(default)]
    pub trailer: Option<String>,
    /// Fanart image URL at original size.
    #[serde(default)]
    pub large_background_image: Option<String>,
    /// Poster image URL at original size.
    #[serde(default)]
    pub large_cover_image: Option<String>,
}

impl Movie {
    /// Poster URL at thumbnail size, derived from the original-size URL.
    #[must_use]
    pub fn small_cover_image(&self) -> Option<String> {
        sized_variant(self.large_cover_image.as_ref(), "thumb")
    }

    /// Poster URL at medium size.
    #[must_use]
    pub fn medium_cover_image(&self) -> Option<String> {
        sized_variant(self.large_cover_image.as_ref(), "medium")
    }

    /// Fanart URL at thumbnail size.
    #[must_use]
    pub fn small_background_image(&self) -> Option<String> {
        sized_variant(self.large_background_image.as_ref(), "thumb")
    }

    /// Fanart URL at medium size.
    #[must_use]
    pub fn medium_background_image(&self) -> Option<String> {
        sized_variant(self.large_background_image.as_ref(), "medium")
    }
}

/// Equality and hashing consider only the catalog id.
impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl std::hash::Hash for Movie {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Media for Movie {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn from_remote(value: &Value) -> Option<Self> {
        let id = value["ids"]["imdb"].as_str()?.to_string();
        let title = value["title"].as_str()?.to_string();
        Some(Self {
            id,
            tmdb_id: value["ids"]["tmdb"].as_u64(),
            title,
            year: value["year"].as_u64().and_then(|y| u16::try_from(y).ok()),
            summary: value["overview"].as_str().unwrap_or_default().to_string(),
            rating: value["rating"].as_f64().unwrap_or_default() as f32,
            certification: value["certification"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            trailer: value["trailer"].as_str().map(str::to_string),
            large_background_image: None,
            large_cover_image: None,
        })
    }
}

/// A television show.
///
/// Shows appear in catalog listings and own episodes, but carry no
/// watched/progress state themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// Imdb id of the show.
    pub id: String,
    /// TMDB id, when the catalog supplied one.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    /// Title of the show.
    pub title: String,
    /// Year the show first aired.
    #[serde(default)]
    pub year: Option<u16>,
    /// Synopsis. Empty when the catalog has none.
    #[serde(default)]
    pub summary: String,
    /// Number of seasons, when known.
    #[serde(default)]
    pub num_seasons: Option<u32>,
    /// Fanart image URL at original size.
    #[serde(default)]
    pub large_background_image: Option<String>,
    /// Poster image URL at original size.
    #[serde(default)]
    pub large_cover_image: Option<String>,
}

impl Show {
    /// Poster URL at thumbnail size.
    #[must_use]
    pub fn small_cover_image(&self) -> Option<String> {
        sized_variant(self.large_cover_image.as_ref(), "thumb")
    }

    /// Poster URL at medium size.
    #[must_use]
    pub fn medium_cover_image(&self) -> Option<String> {
        sized_variant(self.large_cover_image.as_ref(), "medium")
    }
}

/// Equality and hashing consider only the catalog id.
impl PartialEq for Show {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Show {}

impl std::hash::Hash for Show {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Media for Show {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn from_remote(value: &Value) -> Option<Self> {
        let id = value["ids"]["imdb"].as_str()?.to_string();
        let title = value["title"].as_str()?.to_string();
        Some(Self {
            id,
            tmdb_id: value["ids"]["tmdb"].as_u64(),
            title,
            year: value["year"].as_u64().and_then(|y| u16::try_from(y).ok()),
            summary: value["overview"].as_str().unwrap_or_default().to_string(),
            num_seasons: value["aired_seasons"]
                .as_u64()
                .and_then(|n| u32::try_from(n).ok()),
            large_background_image: None,
            large_cover_image: None,
        })
    }
}

/// A single episode of a show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Tvdb id of the episode, carried as a string. The numeric form is
    /// only reconstructed at the remote wire boundary.
    pub id: String,
    /// Imdb id of the show this episode belongs to, when known.
    #[serde(default)]
    pub show_id: Option<String>,
    /// Title of the episode.
    pub title: String,
    /// Season the episode is in.
    pub season: u32,
    /// Number of the episode within its season.
    pub episode: u32,
    /// Synopsis. Empty when the catalog has none.
    #[serde(default)]
    pub summary: String,
    /// First-aired date as supplied by the catalog.
    #[serde(default)]
    pub first_aired: Option<String>,
    /// Screenshot image URL at original size.
    #[serde(default)]
    pub screenshot_image: Option<String>,
}

impl Episode {
    /// Screenshot URL at thumbnail size.
    #[must_use]
    pub fn small_screenshot_image(&self) -> Option<String> {
        sized_variant(self.screenshot_image.as_ref(), "thumb")
    }

    /// Screenshot URL at medium size.
    #[must_use]
    pub fn medium_screenshot_image(&self) -> Option<String> {
        sized_variant(self.screenshot_image.as_ref(), "medium")
    }
}

/// Equality and hashing consider only the catalog id.
impl PartialEq for Episode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Episode {}

impl std::hash::Hash for Episode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Media for Episode {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn from_remote(value: &Value) -> Option<Self> {
        let id = value["ids"]["tvdb"].as_u64()?.to_string();
        let title = value["title"].as_str()?.to_string();
        let season = u32::try_from(value["season"].as_u64()?).ok()?;
        let episode = u32::try_from(value["number"].as_u64()?).ok()?;
        Some(Self {
            id,
            show_id: value["show_ids"]["imdb"].as_str().map(str::to_string),
            title,
            season,
            episode,
            summary: value["overview"].as_str().unwrap_or_default().to_string(),
            first_aired: value["first_aired"].as_str().map(str::to_string),
            screenshot_image: None,
        })
    }
}
