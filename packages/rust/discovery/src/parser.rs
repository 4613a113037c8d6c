//! Link discovery over raw page markup.
//!
//! Both functions here are pure: they take markup already fetched and never
//! touch the network, so they can be tested against fixtures and swapped out
//! if the source site's layout changes.

use std::sync::LazyLock;

use npbstats_shared::{NpbStatsError, Result, TeamDirectory};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

/// Visible text of an anchor, whitespace-trimmed.
fn link_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn join_href(base: &Url, href: &str) -> Result<Url> {
    base.join(href)
        .map_err(|e| NpbStatsError::parse(format!("bad href '{href}': {e}")))
}

// ---------------------------------------------------------------------------
// League links
// ---------------------------------------------------------------------------

/// Find the link whose text is exactly `league` and resolve it against `base`.
///
/// Matching is case-sensitive. The first matching link wins.
pub fn resolve_league_link(markup: &str, base: &Url, league: &str) -> Result<Url> {
    let doc = Html::parse_document(markup);

    let href = doc
        .select(&ANCHOR_SEL)
        .filter(|a| link_text(a) == league)
        .find_map(|a| a.value().attr("href"))
        .ok_or_else(|| NpbStatsError::LeagueNotFound {
            league: league.to_string(),
        })?;

    join_href(base, href)
}

// ---------------------------------------------------------------------------
// Team links
// ---------------------------------------------------------------------------

/// Collect the team links of one season from a league page.
///
/// The league page lists every season's teams in one run of anchors, each
/// season introduced by an anchor whose text is the year. The teams of `year`
/// are the anchors strictly between the `year` marker and the `year - 1`
/// marker. Where a year's text occurs more than once, the second-to-last
/// occurrence is the marker (the last one belongs to the page footer).
///
/// The walk is bounded by the anchors actually present: a missing marker, or
/// an end marker that does not come after the start marker, is a
/// [`NpbStatsError::MarkerNotFound`].
pub fn resolve_team_links(markup: &str, base: &Url, year: u32) -> Result<TeamDirectory> {
    let doc = Html::parse_document(markup);
    let anchors: Vec<ElementRef<'_>> = doc.select(&ANCHOR_SEL).collect();
    let texts: Vec<String> = anchors.iter().map(link_text).collect();

    let start_label = year.to_string();
    let end_label = year.saturating_sub(1).to_string();

    let start = pick_marker(&texts, &start_label).ok_or_else(|| {
        NpbStatsError::marker(format!("no link with text '{start_label}' (season start)"))
    })?;
    let end = pick_marker(&texts, &end_label).ok_or_else(|| {
        NpbStatsError::marker(format!("no link with text '{end_label}' (season end)"))
    })?;

    if end <= start {
        return Err(NpbStatsError::marker(format!(
            "'{end_label}' marker does not follow '{start_label}' marker"
        )));
    }

    let mut teams = TeamDirectory::new();
    for (anchor, name) in anchors[start + 1..end].iter().zip(&texts[start + 1..end]) {
        let Some(href) = anchor.value().attr("href") else {
            debug!(team = %name, "anchor without href between markers, skipping");
            continue;
        };
        if name.is_empty() {
            debug!(href, "anchor without text between markers, skipping");
            continue;
        }
        teams.insert(name.clone(), join_href(base, href)?);
    }

    debug!(year, teams = teams.len(), "team links resolved");
    Ok(teams)
}

/// Index of the marker anchor for `label`: the second-to-last occurrence,
/// or the only one.
fn pick_marker(texts: &[String], label: &str) -> Option<usize> {
    let hits: Vec<usize> = texts
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() == label)
        .map(|(i, _)| i)
        .collect();

    match hits.len() {
        0 => None,
        1 => Some(hits[0]),
        n => Some(hits[n - 2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.baseball-reference.com").unwrap()
    }

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn test_league_link_exact_match() {
        let markup = load_fixture("league_index.html");
        let url = resolve_league_link(&markup, &base(), "Japan Central League").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.baseball-reference.com/register/league.cgi?code=JPCL&class=Fgn"
        );
    }

    #[test]
    fn test_league_link_is_case_sensitive() {
        let markup = load_fixture("league_index.html");
        let err = resolve_league_link(&markup, &base(), "japan central league").unwrap_err();
        assert!(matches!(err, NpbStatsError::LeagueNotFound { .. }));
    }

    #[test]
    fn test_league_link_missing() {
        let markup = load_fixture("league_index.html");
        let err = resolve_league_link(&markup, &base(), "Japan Western League").unwrap_err();
        assert_eq!(
            err.to_string(),
            "league not found: no link with text 'Japan Western League'"
        );
    }

    #[test]
    fn test_team_links_between_markers() {
        let markup = r#"<html><body>
            <a href="/y/2022">2022</a>
            <a href="/t/a">TeamA</a>
            <a href="/t/b">TeamB</a>
            <a href="/y/2021">2021</a>
            <a href="/t/old">OldTeam</a>
        </body></html>"#;

        let teams = resolve_team_links(markup, &base(), 2022).unwrap();

        assert_eq!(teams.len(), 2);
        assert_eq!(
            teams.get("TeamA").unwrap().as_str(),
            "https://www.baseball-reference.com/t/a"
        );
        assert_eq!(
            teams.get("TeamB").unwrap().as_str(),
            "https://www.baseball-reference.com/t/b"
        );
        assert!(teams.get("OldTeam").is_none());
    }

    #[test]
    fn test_team_links_from_league_fixture() {
        let markup = load_fixture("league_central.html");
        let teams = resolve_team_links(&markup, &base(), 2022).unwrap();

        let names: Vec<_> = teams.names().collect();
        assert_eq!(
            names,
            vec![
                "Tokyo Yakult Swallows",
                "Yokohama DeNA BayStars",
                "Hanshin Tigers",
                "Yomiuri Giants",
                "Hiroshima Toyo Carp",
                "Chunichi Dragons",
            ]
        );
        assert_eq!(
            teams.get("Hanshin Tigers").unwrap().as_str(),
            "https://www.baseball-reference.com/register/team.cgi?id=5f0e6c4e"
        );
    }

    #[test]
    fn test_team_links_missing_end_marker_terminates() {
        let markup = r#"<a href="/y/2022">2022</a><a href="/t/a">TeamA</a>"#;
        let err = resolve_team_links(markup, &base(), 2022).unwrap_err();
        assert!(matches!(err, NpbStatsError::MarkerNotFound { .. }));
    }

    #[test]
    fn test_team_links_end_before_start() {
        let markup = r#"<a href="/y/2021">2021</a><a href="/t/a">TeamA</a><a href="/y/2022">2022</a>"#;
        let err = resolve_team_links(markup, &base(), 2022).unwrap_err();
        assert!(err.to_string().contains("does not follow"));
    }

    #[test]
    fn test_team_links_skip_anchors_without_href() {
        let markup = r#"<a href="/y/2022">2022</a><a name="x">Bookmark</a><a href="/t/a">TeamA</a><a href="/y/2021">2021</a>"#;
        let teams = resolve_team_links(markup, &base(), 2022).unwrap();
        assert_eq!(teams.names().collect::<Vec<_>>(), vec!["TeamA"]);
    }

    #[test]
    fn test_team_links_skip_anchors_without_text() {
        let markup = r#"<a href="/y/2022">2022</a><a href="/t/logo"> <img src="x.png"> </a><a href="/t/a">TeamA</a><a href="/y/2021">2021</a>"#;
        let teams = resolve_team_links(markup, &base(), 2022).unwrap();
        assert_eq!(teams.names().collect::<Vec<_>>(), vec!["TeamA"]);
    }

    #[test]
    fn test_pick_marker_prefers_second_to_last() {
        let texts: Vec<String> = ["2022", "x", "2022", "y", "2022"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_marker(&texts, "2022"), Some(2));
        assert_eq!(pick_marker(&texts, "x"), Some(1));
        assert_eq!(pick_marker(&texts, "2021"), None);
    }
}
