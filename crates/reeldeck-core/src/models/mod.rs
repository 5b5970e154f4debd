pub mod ids;
pub mod watch;

pub use ids::{MediaIds, MediaKind, WatchTarget};
pub use watch::{
    episode_key, EpisodeRecord, SeasonRecord, WatchedEpisodeEntry, WatchedMovieEntry,
    WatchedRecord, WatchedSeasonEntry, WatchedShowEntry, WatchedShowRecord,
};
