use clap::{Args, Parser, Subcommand, ValueEnum};

use reeldeck_core::models::{MediaIds, MediaKind, WatchTarget};

use crate::error::CliError;

/// reeldeck - Trakt watch-state sync with TMDB metadata
#[derive(Debug, Parser)]
#[command(name = "reeldeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in to Trakt through the browser
    Login,

    /// Finish a sign-in with the code and state from the redirect URL
    Callback {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },

    /// Forget Trakt tokens and the local watch snapshot
    Logout,

    /// Pull watched movies and shows from Trakt
    Sync,

    /// Look up watch state in the local snapshot
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },

    /// Mark a movie, show or episode as watched
    Watch(TargetArgs),

    /// Remove a movie, show or episode from watch history
    Unwatch(TargetArgs),

    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        command: WatchlistCommand,
    },

    /// Rate a movie, show or episode from 1 to 10
    Rate {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },

    /// Watch history, newest first
    History {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Watch statistics
    Stats {
        /// Trakt username
        #[arg(default_value = "me")]
        user: String,
    },

    /// Upcoming episodes or movie releases
    Calendar {
        #[arg(value_enum, default_value = "show")]
        kind: KindArg,
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Follow a Trakt user
    Follow { user: String },

    /// Unfollow a Trakt user
    Unfollow { user: String },

    /// Metadata from TMDB
    Details {
        #[command(subcommand)]
        command: DetailsCommand,
    },

    /// Browse the AniList catalog
    Anime {
        #[command(subcommand)]
        command: AnimeCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum StatusCommand {
    /// Watched flag and play count of a movie
    Movie { tmdb: u64 },
    /// Watched flag and watched episodes of a show
    Show { tmdb: u64 },
    /// Whether every episode of a season is watched
    Season { tmdb: u64, season: u32 },
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    Add(TargetArgs),
    Remove(TargetArgs),
    /// List the Trakt watchlist
    List,
}

#[derive(Debug, Subcommand)]
pub enum DetailsCommand {
    Movie {
        id: u64,
        /// Also resolve the title logo
        #[arg(long)]
        banner: bool,
    },
    Show {
        id: u64,
        #[arg(long)]
        banner: bool,
    },
    Episode {
        show: u64,
        season: u32,
        episode: u32,
    },
    Similar {
        #[arg(value_enum)]
        kind: KindArg,
        id: u64,
    },
    Person {
        id: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnimeCommand {
    Trending {
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Most popular this broadcast season
    Popular,
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Episodes airing soon
    Airing {
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Show,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Show => MediaKind::Show,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetKind {
    Movie,
    Show,
    Episode,
}

/// Identifies the item a mutating command acts on. Writes to Trakt need
/// `--trakt`; local watch state is keyed by `--tmdb`.
#[derive(Debug, Args)]
pub struct TargetArgs {
    #[arg(value_enum)]
    pub kind: TargetKind,
    /// TMDB id (of the show, for episodes)
    #[arg(long)]
    pub tmdb: Option<u64>,
    /// Trakt id (of the show, for episodes)
    #[arg(long)]
    pub trakt: Option<u64>,
    #[arg(long, required_if_eq("kind", "episode"))]
    pub season: Option<u32>,
    #[arg(long, required_if_eq("kind", "episode"))]
    pub episode: Option<u32>,
}

impl TargetArgs {
    pub fn target(&self) -> Result<WatchTarget, CliError> {
        if self.tmdb.is_none() && self.trakt.is_none() {
            return Err(CliError::Usage("pass --tmdb, --trakt or both".into()));
        }
        let ids = MediaIds::new(self.trakt, self.tmdb);
        Ok(match self.kind {
            TargetKind::Movie => WatchTarget::Movie(ids),
            TargetKind::Show => WatchTarget::Show(ids),
            TargetKind::Episode => {
                let (Some(season), Some(number)) = (self.season, self.episode) else {
                    return Err(CliError::Usage("episodes need --season and --episode".into()));
                };
                WatchTarget::Episode {
                    show: ids,
                    season,
                    number,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("reeldeck").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watch_episode_target() {
        let cli = parse(&[
            "watch", "episode", "--tmdb", "1396", "--trakt", "1", "--season", "2", "--episode", "5",
        ])
        .unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(
            args.target().unwrap(),
            WatchTarget::Episode {
                show: MediaIds::new(Some(1), Some(1396)),
                season: 2,
                number: 5,
            }
        );
    }

    #[test]
    fn test_episode_requires_season_and_number() {
        assert!(parse(&["watch", "episode", "--tmdb", "1396"]).is_err());
    }

    #[test]
    fn test_target_requires_an_id() {
        let Command::Unwatch(args) = parse(&["unwatch", "movie"]).unwrap().command else {
            panic!("expected unwatch");
        };
        assert!(matches!(args.target(), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_rating_range_is_enforced() {
        assert!(parse(&["rate", "movie", "8", "--trakt", "432"]).is_ok());
        assert!(parse(&["rate", "movie", "11", "--trakt", "432"]).is_err());
        assert!(parse(&["rate", "movie", "0", "--trakt", "432"]).is_err());
    }

    #[test]
    fn test_status_season() {
        let cli = parse(&["status", "season", "1396", "1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Status {
                command: StatusCommand::Season { tmdb: 1396, season: 1 }
            }
        ));
    }

    #[test]
    fn test_anime_search_joins_words() {
        let cli = parse(&["anime", "search", "cowboy", "bebop"]).unwrap();
        let Command::Anime {
            command: AnimeCommand::Search { query },
        } = cli.command
        else {
            panic!("expected anime search");
        };
        assert_eq!(query.join(" "), "cowboy bebop");
    }
}
