/*
 *  sources/ical.rs
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
//! Upcoming events from iCalendar feeds. The parser covers the slice of RFC
//! 5545 a mirror needs: unfolding, VEVENT blocks, DTSTART and SUMMARY.
//! TZID-parameterized starts are read as floating times in the widget's
//! configured zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::httpclient::HttpClient;

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

const UPCOMING_COUNT: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IcalSettings {
    pub urls: Vec<String>,
    pub timezone: String,
}

impl Default for IcalSettings {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timezone: "US/Central".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IcalEvent {
    pub start: NaiveDateTime,
    pub utc: bool,
    pub summary: String,
}

/// Rejoins folded lines: a line starting with space or tab continues the
/// previous one.
pub(crate) fn unfold_lines(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = line.strip_prefix(' ').or_else(|| line.strip_prefix('\t')) {
            if let Some(last) = out.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        out.push(line.to_string());
    }
    out
}

fn parse_dtstart(value: &str) -> Option<(NaiveDateTime, bool)> {
    let v = value.trim();
    if let Some(stripped) = v.strip_suffix('Z') {
        if let Ok(dt) = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S") {
            return Some((dt, true));
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(v, "%Y%m%dT%H%M%S") {
        return Some((dt, false));
    }
    if let Ok(d) = NaiveDate::parse_from_str(v, "%Y%m%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| (dt, false));
    }
    None
}

fn unescape_text(value: &str) -> String {
    value
        .replace("\\n", " ")
        .replace("\\N", " ")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}

pub(crate) fn parse_events(ics: &str) -> Vec<IcalEvent> {
    let mut events = Vec::new();
    let mut in_event = false;
    let mut start: Option<(NaiveDateTime, bool)> = None;
    let mut summary: Option<String> = None;

    for line in unfold_lines(ics) {
        let Some((name_and_params, value)) = line.split_once(':') else {
            continue;
        };
        let name = name_and_params
            .split(';')
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        match name.as_str() {
            "BEGIN" if value.eq_ignore_ascii_case("VEVENT") => {
                in_event = true;
                start = None;
                summary = None;
            }
            "END" if value.eq_ignore_ascii_case("VEVENT") => {
                if let (Some((start, utc)), Some(summary)) = (start.take(), summary.take()) {
                    events.push(IcalEvent {
                        start,
                        utc,
                        summary,
                    });
                }
                in_event = false;
            }
            "DTSTART" if in_event => start = parse_dtstart(value),
            "SUMMARY" if in_event => summary = Some(unescape_text(value.trim())),
            _ => {}
        }
    }
    events
}

/// The next few events at or after `now`, soonest first, as `MM/DD Summary`.
pub(crate) fn upcoming_lines(events: &[IcalEvent], tz: Tz, now: DateTime<Tz>) -> Vec<String> {
    let mut upcoming: Vec<(DateTime<Tz>, &str)> = events
        .iter()
        .filter_map(|e| {
            let when = if e.utc {
                Some(Utc.from_utc_datetime(&e.start).with_timezone(&tz))
            } else {
                tz.from_local_datetime(&e.start).earliest()
            };
            when.map(|w| (w, e.summary.as_str()))
        })
        .filter(|(when, _)| *when >= now)
        .collect();
    upcoming.sort_by_key(|(when, _)| *when);
    upcoming
        .into_iter()
        .take(UPCOMING_COUNT)
        .map(|(when, summary)| format!("{} {}", when.format("%m/%d"), summary))
        .collect()
}

pub struct IcalSource {
    http: HttpClient,
}

impl IcalSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl DataSource for IcalSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: IcalSettings = parse_settings(settings)?;
            let urls: Vec<&String> = s.urls.iter().filter(|u| !u.trim().is_empty()).collect();
            if urls.is_empty() {
                return Err(FetchError::Config("Set iCal URL".to_string()));
            }
            let tz: Tz = s
                .timezone
                .parse()
                .map_err(|_| FetchError::Config(format!("Unknown timezone: {}", s.timezone)))?;

            let mut events: Vec<IcalEvent> = Vec::new();
            let mut failures = 0usize;
            let mut last_err: Option<FetchError> = None;

            for url in &urls {
                match self.http.get_text(url).await {
                    Ok(body) => events.extend(parse_events(&body)),
                    Err(e) => {
                        warn!("ical feed {url} failed: {e}");
                        failures += 1;
                        last_err = Some(e);
                    }
                }
            }

            if failures == urls.len() {
                return Err(last_err
                    .unwrap_or_else(|| FetchError::Network("all feeds failed".to_string())));
            }

            let now = Utc::now().with_timezone(&tz);
            let mut lines = upcoming_lines(&events, tz, now);
            if lines.is_empty() {
                lines.push("No upcoming events.".to_string());
            }

            if failures > 0 {
                Ok(Content::partial(lines))
            } else {
                Ok(Content::new(lines))
            }
        })
    }
}
