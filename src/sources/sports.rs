/*
 *  sources/sports.rs
 *
 *  MirrorS - on the wall
 *	(c) 2020-26 Stuart Hunter
 *
 *	TODO:
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! Scores from the public ESPN scoreboard feeds, one entry per configured
//! league with an optional team filter.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::httpclient::HttpClient;

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

fn scoreboard_url(league: &str) -> Option<&'static str> {
    match league.to_ascii_lowercase().as_str() {
        "nfl" => Some("http://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard"),
        "nba" => Some("http://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard"),
        "mlb" => Some("http://site.api.espn.com/apis/site/v2/sports/baseball/mlb/scoreboard"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LeagueConfig {
    pub league: String,
    pub teams: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SportsSettings {
    pub configs: Vec<LeagueConfig>,
    pub style: String,
    pub timezone: String,
}

impl Default for SportsSettings {
    fn default() -> Self {
        Self {
            configs: Vec::new(),
            style: "Normal".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize, Default)]
struct Event {
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize, Default)]
struct Competition {
    #[serde(default)]
    status: Status,
    #[serde(default)]
    competitors: Vec<Competitor>,
    #[serde(default)]
    date: String,
}

#[derive(Debug, Deserialize, Default)]
struct Status {
    #[serde(default, rename = "type")]
    kind: StatusType,
}

#[derive(Debug, Deserialize, Default)]
struct StatusType {
    #[serde(default)]
    name: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize, Default)]
struct Competitor {
    #[serde(default)]
    team: Team,
    #[serde(default)]
    score: String,
}

#[derive(Debug, Deserialize, Default)]
struct Team {
    #[serde(default)]
    abbreviation: String,
}

/// ESPN stamps events like "2026-08-22T00:10Z"; seconds only sometimes.
fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|n| Utc.from_utc_datetime(&n))
}

fn event_line(competition: &Competition, tz: &Tz) -> Option<String> {
    if competition.competitors.len() != 2 {
        return None;
    }
    let a = &competition.competitors[0];
    let b = &competition.competitors[1];
    let a_name = if a.team.abbreviation.is_empty() { "TBD" } else { &a.team.abbreviation };
    let b_name = if b.team.abbreviation.is_empty() { "TBD" } else { &b.team.abbreviation };

    match competition.status.kind.name.as_str() {
        "STATUS_FINAL" => Some(format!(
            "{} {} - {} {} (Final)",
            a_name, a.score, b_name, b.score
        )),
        "STATUS_IN_PROGRESS" => {
            let detail = if competition.status.kind.detail.is_empty() {
                "In Progress"
            } else {
                &competition.status.kind.detail
            };
            Some(format!(
                "{} {} - {} {} ({})",
                a_name, a.score, b_name, b.score, detail
            ))
        }
        "STATUS_SCHEDULED" => {
            let when = parse_event_time(&competition.date)?;
            let local = when.with_timezone(tz);
            Some(format!(
                "{} vs {} at {}",
                a_name,
                b_name,
                local.format("%I:%M %p %Z")
            ))
        }
        _ => None,
    }
}

fn competes(event: &Event, teams: &[String]) -> bool {
    if teams.is_empty() {
        return true;
    }
    event.competitions.iter().any(|c| {
        c.competitors
            .iter()
            .any(|p| teams.contains(&p.team.abbreviation.to_lowercase()))
    })
}

/// Lines for one league's scoreboard under a team filter.
pub(crate) fn league_lines(league: &str, board: &Scoreboard, teams: &[String], tz: &Tz) -> Vec<String> {
    let had_events = !board.events.is_empty();
    let selected: Vec<&Event> = board
        .events
        .iter()
        .filter(|e| competes(e, teams))
        .collect();

    if selected.is_empty() {
        let line = if had_events && !teams.is_empty() {
            format!("No {} games for selected teams.", league.to_uppercase())
        } else {
            format!("No {} games today.", league.to_uppercase())
        };
        return vec![line];
    }

    let lines: Vec<String> = selected
        .iter()
        .filter_map(|e| e.competitions.first())
        .filter_map(|c| event_line(c, tz))
        .collect();
    if lines.is_empty() {
        vec![format!("No {} games today.", league.to_uppercase())]
    } else {
        lines
    }
}

pub struct SportsSource {
    http: HttpClient,
}

impl SportsSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl DataSource for SportsSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: SportsSettings = parse_settings(settings)?;
            if s.configs.is_empty() {
                return Err(FetchError::Config("Set Sports League".to_string()));
            }
            let tz: Tz = s
                .timezone
                .parse()
                .map_err(|_| FetchError::Config(format!("Unknown timezone: {}", s.timezone)))?;
            // Bad league names fail before any network round trip.
            for entry in &s.configs {
                if scoreboard_url(&entry.league).is_none() {
                    return Err(FetchError::Config(format!(
                        "Unknown league: {}",
                        entry.league
                    )));
                }
            }

            let mut lines: Vec<String> = Vec::new();
            let mut failures = 0usize;
            let mut last_err: Option<FetchError> = None;

            for entry in &s.configs {
                let url = scoreboard_url(&entry.league).unwrap_or_default();
                let teams: Vec<String> =
                    entry.teams.iter().map(|t| t.to_lowercase()).collect();
                match self.http.get_json::<Scoreboard>(url).await {
                    Ok(board) => lines.extend(league_lines(&entry.league, &board, &teams, &tz)),
                    Err(e) => {
                        warn!("{} scoreboard failed: {e}", entry.league);
                        failures += 1;
                        last_err = Some(e);
                    }
                }
            }

            if failures == s.configs.len() {
                return Err(last_err
                    .unwrap_or_else(|| FetchError::Network("all scoreboards failed".to_string())));
            }
            if failures > 0 {
                Ok(Content::partial(lines))
            } else {
                Ok(Content::new(lines))
            }
        })
    }
}
