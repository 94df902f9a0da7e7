/*
 *  sources/countdown.rs
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

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

// The web editor writes datetime-local values ("T" separator, no seconds);
// hand-edited configs tend to use a space. Accept both, with or without
// seconds.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    pub name: String,
    pub datetime: String,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            name: "New Event".to_string(),
            datetime: String::new(),
        }
    }
}

pub(crate) fn parse_target(raw: &str) -> Result<NaiveDateTime, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::Config("Set Countdown Date".to_string()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    Err(FetchError::Config("Invalid Date Format".to_string()))
}

pub(crate) fn remaining_line(target: NaiveDateTime, now: NaiveDateTime) -> String {
    let secs = (target - now).num_seconds();
    if secs <= 0 {
        return "Time's up!".to_string();
    }
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;
    format!("{days}d {hours}h {mins}m")
}

pub struct CountdownSource;

impl DataSource for CountdownSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: CountdownSettings = parse_settings(settings)?;
            let target = parse_target(&s.datetime)?;
            let line = remaining_line(target, Local::now().naive_local());
            Ok(Content::new(vec![s.name, line]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn under_an_hour_remaining() {
        let line = remaining_line(at("2024-12-31 23:59"), at("2024-12-31 23:00"));
        assert_eq!(line, "0d 0h 59m");
    }

    #[test]
    fn past_target_reports_times_up() {
        let line = remaining_line(at("2024-12-31 23:59"), at("2025-01-01 00:00"));
        assert_eq!(line, "Time's up!");
    }

    #[test]
    fn multi_day_remaining() {
        let line = remaining_line(at("2025-01-03 12:30"), at("2025-01-01 10:00"));
        assert_eq!(line, "2d 2h 30m");
    }

    #[test]
    fn both_separators_parse() {
        assert!(parse_target("2025-06-01T08:00").is_ok());
        assert!(parse_target("2025-06-01 08:00").is_ok());
        assert!(parse_target("2025-06-01 08:00:30").is_ok());
    }

    #[test]
    fn empty_and_garbage_are_config_errors() {
        assert_eq!(
            parse_target("").unwrap_err().headline(),
            "Set Countdown Date"
        );
        assert_eq!(
            parse_target("next tuesday").unwrap_err().headline(),
            "Invalid Date Format"
        );
    }
}
