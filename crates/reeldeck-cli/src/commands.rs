use reeldeck_api::anilist::{AiringEpisode, AniListClient, CatalogEntry};
use reeldeck_api::tmdb::types::DetailsRecord;
use reeldeck_api::tmdb::{ResolutionMiss, TmdbClient};
use reeldeck_api::trakt::TraktClient;
use reeldeck_core::actions::{ActionOutcome, WatchActions};
use reeldeck_core::config::AppConfig;
use reeldeck_core::models::{MediaKind, WatchTarget};
use reeldeck_core::store::SharedStore;
use reeldeck_core::sync::{clear_snapshot, SyncResult, Synchronizer};
use tokio_util::sync::CancellationToken;

use crate::cli::{AnimeCommand, Command, DetailsCommand, StatusCommand, WatchlistCommand};
use crate::error::CliError;

/// Configuration plus the shared store every client is built over.
pub struct App {
    pub config: AppConfig,
    pub store: SharedStore,
}

impl App {
    fn trakt(&self) -> TraktClient {
        TraktClient::new(self.config.trakt.clone(), self.store.clone())
    }

    fn tmdb(&self) -> TmdbClient {
        TmdbClient::new(self.config.tmdb.clone())
    }

    fn anilist(&self) -> AniListClient {
        AniListClient::new(self.config.catalog.clone())
    }

    fn synchronizer(&self) -> Synchronizer<TraktClient> {
        Synchronizer::new(self.trakt(), self.store.clone())
    }

    fn signed_in_trakt(&self) -> Result<TraktClient, CliError> {
        let trakt = self.trakt();
        if !trakt.is_authenticated() {
            return Err(CliError::NotSignedIn);
        }
        Ok(trakt)
    }
}

pub async fn run(app: &App, command: Command) -> Result<(), CliError> {
    let uses_session = !matches!(
        command,
        Command::Login
            | Command::Callback { .. }
            | Command::Logout
            | Command::Details { .. }
            | Command::Anime { .. }
    );
    if uses_session {
        if let Err(e) = app.trakt().refresh_if_expired().await {
            tracing::warn!(error = %e, "Could not refresh Trakt token");
        }
    }

    match command {
        Command::Login => {
            let trakt = app.trakt();
            trakt.authorize().await?;
            println!("Signed in to Trakt.");
            sync(app).await
        }
        Command::Callback { code, state } => {
            app.trakt().exchange_code_for_token(&code, &state).await?;
            println!("Signed in to Trakt.");
            sync(app).await
        }
        Command::Logout => {
            app.trakt().logout()?;
            clear_snapshot(app.store.as_ref())?;
            println!("Signed out.");
            Ok(())
        }
        Command::Sync => sync(app).await,
        Command::Status { command } => status(app, command).await,
        Command::Watch(target) => mutate(app, Mutation::Watch, &target.target()?).await,
        Command::Unwatch(target) => mutate(app, Mutation::Unwatch, &target.target()?).await,
        Command::Watchlist { command } => match command {
            WatchlistCommand::Add(target) => {
                mutate(app, Mutation::AddToWatchlist, &target.target()?).await
            }
            WatchlistCommand::Remove(target) => {
                mutate(app, Mutation::RemoveFromWatchlist, &target.target()?).await
            }
            WatchlistCommand::List => {
                let items = app.signed_in_trakt()?.get_watchlist().await?;
                if items.is_empty() {
                    println!("Watchlist is empty.");
                }
                for item in items {
                    let title = item
                        .movie
                        .as_ref()
                        .and_then(|m| m.title.clone())
                        .or_else(|| item.show.as_ref().and_then(|s| s.title.clone()))
                        .unwrap_or_default();
                    println!("{:<8} {title}", item.kind);
                }
                Ok(())
            }
        },
        Command::Rate { target, rating } => {
            let target = target.target()?;
            app.signed_in_trakt()?.rate_content(&target, rating).await?;
            println!("Rated {rating}/10.");
            Ok(())
        }
        Command::History { page, limit } => {
            let items = app.signed_in_trakt()?.get_history(page, limit).await?;
            for item in items {
                let title = match (&item.movie, &item.show, &item.episode) {
                    (Some(movie), _, _) => movie.title.clone().unwrap_or_default(),
                    (_, Some(show), Some(ep)) => format!(
                        "{} S{:02}E{:02}",
                        show.title.as_deref().unwrap_or_default(),
                        ep.season,
                        ep.number
                    ),
                    _ => String::new(),
                };
                println!("{}  {title}", item.watched_at.format("%Y-%m-%d %H:%M"));
            }
            Ok(())
        }
        Command::Stats { user } => {
            let stats = app.signed_in_trakt()?.get_stats(&user).await?;
            println!(
                "Movies:   {} watched, {} plays, {} minutes",
                stats.movies.watched, stats.movies.plays, stats.movies.minutes
            );
            println!("Shows:    {} watched", stats.shows.watched);
            println!(
                "Episodes: {} watched, {} plays, {} minutes",
                stats.episodes.watched, stats.episodes.plays, stats.episodes.minutes
            );
            Ok(())
        }
        Command::Calendar { kind, days } => {
            let entries = app
                .signed_in_trakt()?
                .get_upcoming(kind.into(), days)
                .await?;
            if entries.is_empty() {
                println!("Nothing scheduled.");
            }
            for entry in entries {
                let when = entry
                    .first_aired
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .or(entry.released)
                    .unwrap_or_default();
                let title = match (&entry.show, &entry.episode, &entry.movie) {
                    (Some(show), Some(ep), _) => format!(
                        "{} S{:02}E{:02}",
                        show.title.as_deref().unwrap_or_default(),
                        ep.season,
                        ep.number
                    ),
                    (_, _, Some(movie)) => movie.title.clone().unwrap_or_default(),
                    _ => String::new(),
                };
                println!("{when:<10}  {title}");
            }
            Ok(())
        }
        Command::Follow { user } => {
            app.signed_in_trakt()?.follow_user(&user).await?;
            println!("Following {user}.");
            Ok(())
        }
        Command::Unfollow { user } => {
            app.signed_in_trakt()?.unfollow_user(&user).await?;
            println!("Unfollowed {user}.");
            Ok(())
        }
        Command::Details { command } => {
            details(app, command).await;
            Ok(())
        }
        Command::Anime { command } => {
            anime(app, command).await;
            Ok(())
        }
    }
}

async fn sync(app: &App) -> Result<(), CliError> {
    let sync = app.synchronizer();
    if !sync.source().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let result = sync.sync_cancellable(&cancel).await?;
    print_sync(&result);
    Ok(())
}

fn print_sync(result: &SyncResult) {
    println!(
        "Synced {} movies, {} shows, {} episodes.",
        result.state.movies.len(),
        result.state.shows.len(),
        result.state.episodes.len()
    );
    if result.skipped > 0 {
        println!("Skipped {} items without a TMDB id.", result.skipped);
    }
    if result.movies_failed {
        println!("Movies could not be fetched; kept the previous movie snapshot.");
    }
    if result.shows_failed {
        println!("Shows could not be fetched; kept the previous show snapshot.");
    }
}

async fn status(app: &App, command: StatusCommand) -> Result<(), CliError> {
    let sync = app.synchronizer();
    let state = if app.config.sync.on_startup && sync.source().is_authenticated() {
        match sync.sync().await {
            Ok(result) => result.state,
            Err(e) => {
                tracing::warn!(error = %e, "Sync failed, reading the stored snapshot");
                sync.snapshot()
            }
        }
    } else {
        sync.snapshot()
    };

    match command {
        StatusCommand::Movie { tmdb } => {
            if state.is_movie_watched(tmdb) {
                println!("Watched ({} plays).", state.movie_watch_count(tmdb));
            } else {
                println!("Not watched.");
            }
        }
        StatusCommand::Show { tmdb } => {
            let episodes = state.episode_watch_statuses_for_show(tmdb);
            let watched = if state.is_show_watched(tmdb) { "watched" } else { "not watched" };
            println!("Show {watched}, {} episodes watched.", episodes.len());
            for key in episodes.keys() {
                println!("  {key}");
            }
        }
        StatusCommand::Season { tmdb, season } => {
            let watched = state.watched_episode_count(tmdb, season);
            match app.tmdb().get_season(tmdb, season).await {
                Ok(details) => {
                    let total = details.episode_count() as usize;
                    let verdict = if state.is_season_fully_watched(tmdb, season, total) {
                        "fully watched"
                    } else {
                        "not fully watched"
                    };
                    println!("Season {season}: {watched}/{total} episodes, {verdict}.");
                }
                Err(miss) => {
                    tracing::debug!(%miss, "Season total unavailable");
                    println!("Season {season}: {watched} episodes watched.");
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Watch,
    Unwatch,
    AddToWatchlist,
    RemoveFromWatchlist,
}

async fn mutate(app: &App, mutation: Mutation, target: &WatchTarget) -> Result<(), CliError> {
    let actions = WatchActions::new(app.synchronizer());
    let outcome = match mutation {
        Mutation::Watch => actions.mark_watched(target).await?,
        Mutation::Unwatch => actions.unmark_watched(target).await?,
        Mutation::AddToWatchlist => actions.add_to_watchlist(target).await?,
        Mutation::RemoveFromWatchlist => actions.remove_from_watchlist(target).await?,
    };

    match outcome {
        ActionOutcome::Synced(result) => print_sync(&result),
        ActionOutcome::LocalOnly(_) => {
            println!("Not signed in to Trakt; saved locally until the next sync.")
        }
    }
    Ok(())
}

async fn details(app: &App, command: DetailsCommand) {
    let tmdb = app.tmdb();
    match command {
        DetailsCommand::Movie { id, banner } => {
            print_details(tmdb.get_details(MediaKind::Movie, id, banner).await)
        }
        DetailsCommand::Show { id, banner } => {
            print_details(tmdb.get_details(MediaKind::Show, id, banner).await)
        }
        DetailsCommand::Episode {
            show,
            season,
            episode,
        } => match tmdb.get_episode_details(show, season, episode).await {
            Ok(ep) => {
                println!(
                    "S{:02}E{:02} {}",
                    ep.season,
                    ep.number,
                    ep.name.unwrap_or_default()
                );
                if let Some(date) = ep.air_date {
                    println!("Aired:    {date}");
                }
                if let Some(runtime) = ep.runtime {
                    println!("Runtime:  {runtime} min");
                }
                if let Some(overview) = ep.overview {
                    println!("\n{overview}");
                }
            }
            Err(miss) => print_miss(&miss),
        },
        DetailsCommand::Similar { kind, id } => match tmdb.get_similar(kind.into(), id).await {
            Ok(titles) => {
                for title in titles {
                    println!("{:>8}  {}", title.id, title.title);
                }
            }
            Err(miss) => print_miss(&miss),
        },
        DetailsCommand::Person { id } => match tmdb.get_person(id).await {
            Ok(person) => {
                println!("{}", person.name);
                if let Some(dept) = person.known_for_department {
                    println!("Known for: {dept}");
                }
                for credit in person.credits.iter().take(15) {
                    let role = credit
                        .character
                        .as_deref()
                        .or(credit.job.as_deref())
                        .unwrap_or_default();
                    println!("  {}  {role}", credit.title);
                }
            }
            Err(miss) => print_miss(&miss),
        },
    }
}

fn print_details(details: Result<DetailsRecord, ResolutionMiss>) {
    let details = match details {
        Ok(d) => d,
        Err(miss) => return print_miss(&miss),
    };

    println!("{} ({})", details.title, details.kind);
    if let Some(date) = &details.release_date {
        println!("Released: {date}");
    }
    if let Some(runtime) = details.runtime {
        println!("Runtime:  {runtime} min");
    }
    if !details.genres.is_empty() {
        println!("Genres:   {}", details.genres.join(", "));
    }
    if let Some(seasons) = details.season_count {
        println!("Seasons:  {seasons}");
    }
    if let Some(poster) = &details.poster_url {
        println!("Poster:   {poster}");
    }
    if let Some(logo) = &details.logo_url {
        println!("Logo:     {logo}");
    }
    if let Some(trailer) = &details.trailer_url {
        println!("Trailer:  {trailer}");
    }
    for provider in &details.providers {
        println!(
            "Stream:   {} {}",
            provider.name,
            provider.link.unwrap_or_default()
        );
    }
    let cast: Vec<&str> = details.cast.iter().take(5).map(|c| c.name.as_str()).collect();
    if !cast.is_empty() {
        println!("Cast:     {}", cast.join(", "));
    }
    if let Some(overview) = &details.overview {
        println!("\n{overview}");
    }
}

fn print_miss(miss: &ResolutionMiss) {
    match miss {
        ResolutionMiss::NotFound => println!("No such title on TMDB."),
        ResolutionMiss::Unavailable(reason) => {
            tracing::warn!(%reason, "TMDB lookup failed");
            println!("Metadata unavailable right now.");
        }
    }
}

async fn anime(app: &App, command: AnimeCommand) {
    let client = app.anilist();
    match command {
        AnimeCommand::Trending { page } => print_catalog(&client.trending(page).await),
        AnimeCommand::Popular => print_catalog(&client.popular_this_season().await),
        AnimeCommand::Search { query } => print_catalog(&client.search(&query.join(" ")).await),
        AnimeCommand::Airing { days } => print_airing(&client.airing_schedule(days).await),
    }
}

fn print_catalog(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No results.");
    }
    for entry in entries {
        let score = entry
            .mean_score
            .map(|s| format!("{s}%"))
            .unwrap_or_else(|| "-".into());
        let episodes = entry
            .episodes
            .map(|e| e.to_string())
            .unwrap_or_else(|| "?".into());
        println!("{:>7}  {score:>4}  {episodes:>4} eps  {}", entry.id, entry.title);
    }
}

fn print_airing(episodes: &[AiringEpisode]) {
    if episodes.is_empty() {
        println!("Nothing airing.");
    }
    for ep in episodes {
        println!(
            "{}  {} episode {}",
            ep.airing_at.format("%a %d %b %H:%M"),
            ep.title,
            ep.episode
        );
    }
}
