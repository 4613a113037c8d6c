//! League and team page discovery.
//!
//! Before any table can be scraped, npbstats has to find where the tables
//! live: the league index links to each league page, and each league page
//! links to the team pages of every season. The markup parsing is in
//! [`parser`]; this module adds the fetching around it.

mod parser;

use npbstats_crawler::Fetcher;
use npbstats_shared::{LeagueConfig, Result, TeamDirectory};
use tracing::{info, instrument};
use url::Url;

pub use parser::{resolve_league_link, resolve_team_links};

/// A league together with the URL of its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLeague {
    pub league: LeagueConfig,
    pub url: Url,
}

/// Fetch the league index once and resolve every configured league on it.
///
/// Fails on the first league whose link is missing.
#[instrument(skip_all, fields(index_url = %index_url))]
pub async fn resolve_leagues(
    fetcher: &Fetcher,
    base: &Url,
    index_url: &Url,
    leagues: &[LeagueConfig],
) -> Result<Vec<ResolvedLeague>> {
    let page = fetcher.fetch(index_url).await?;

    let mut resolved = Vec::with_capacity(leagues.len());
    for league in leagues {
        let url = resolve_league_link(&page.body, base, &league.name)?;
        info!(league = %league.name, %url, "league page resolved");
        resolved.push(ResolvedLeague {
            league: league.clone(),
            url,
        });
    }

    Ok(resolved)
}

/// Fetch a league page and collect the team links for `year`.
#[instrument(skip_all, fields(league_url = %league_url, year = year))]
pub async fn discover_teams(
    fetcher: &Fetcher,
    base: &Url,
    league_url: &Url,
    year: u32,
) -> Result<TeamDirectory> {
    let page = fetcher.fetch(league_url).await?;
    let teams = resolve_team_links(&page.body, base, year)?;
    info!(teams = teams.len(), "team directory built");
    Ok(teams)
}
