use serde::{Deserialize, Serialize};

/// Cross-service content identifiers.
///
/// Every item carries a tracker id (Trakt, used for writes) and a metadata id
/// (TMDB, used as the join key for synchronized watch state and for artwork).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaIds {
    pub trakt: Option<u64>,
    pub tmdb: Option<u64>,
    pub imdb: Option<String>,
    pub slug: Option<String>,
}

impl MediaIds {
    pub fn new(trakt: Option<u64>, tmdb: Option<u64>) -> Self {
        Self {
            trakt,
            tmdb,
            ..Default::default()
        }
    }

    /// Key used to correlate tracker records with metadata records.
    pub fn join_key(&self) -> Option<u64> {
        self.tmdb
    }

    /// Identifier accepted by the tracker's write endpoints.
    pub fn tracker_id(&self) -> Option<u64> {
        self.trakt
    }
}

/// Top-level content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// Path segment used by the metadata provider (`movie` / `tv`).
    pub fn tmdb_path(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "tv",
        }
    }

    /// Plural form used by the tracker (`movies` / `shows`).
    pub fn trakt_plural(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Show => "shows",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Show => write!(f, "show"),
        }
    }
}

/// The subject of a mutating tracker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    Movie(MediaIds),
    Show(MediaIds),
    Episode {
        show: MediaIds,
        season: u32,
        number: u32,
    },
}

impl WatchTarget {
    /// Ids of the top-level item (the show, for an episode).
    pub fn ids(&self) -> &MediaIds {
        match self {
            Self::Movie(ids) | Self::Show(ids) => ids,
            Self::Episode { show, .. } => show,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Movie(_) => MediaKind::Movie,
            Self::Show(_) | Self::Episode { .. } => MediaKind::Show,
        }
    }
}
