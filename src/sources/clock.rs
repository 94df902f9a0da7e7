/*
 *  sources/clock.rs
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
//! The clock family: local time, formatted date, and world clocks in named
//! IANA zones. All three are pure local computation on a 1-second cadence.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_DATE_FORMAT: &str = "%A, %B %d, %Y";

/// Formats with a user-supplied strftime string, falling back to a known-good
/// format when the string contains an invalid specifier. chrono surfaces bad
/// specifiers as a formatting error, which would otherwise abort the render.
pub(crate) fn format_with_fallback<Tz>(now: &DateTime<Tz>, fmt: &str, fallback: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    use std::fmt::Write;
    let mut out = String::new();
    if write!(out, "{}", now.format(fmt)).is_ok() {
        return out;
    }
    now.format(fallback).to_string()
}

/// "America/New_York" reads as "New York" on the mirror.
pub(crate) fn zone_label(zone: &str) -> String {
    zone.rsplit('/')
        .next()
        .unwrap_or(zone)
        .replace('_', " ")
}

pub struct TimeSource;

impl DataSource for TimeSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            Ok(Content::single(
                Local::now().format(DEFAULT_TIME_FORMAT).to_string(),
            ))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    pub format: String,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

pub struct DateSource;

impl DataSource for DateSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: DateSettings = parse_settings(settings)?;
            Ok(Content::single(format_with_fallback(
                &Local::now(),
                &s.format,
                DEFAULT_DATE_FORMAT,
            )))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldClockSettings {
    pub timezone: String,
}

impl Default for WorldClockSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

pub struct WorldClockSource;

impl DataSource for WorldClockSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: WorldClockSettings = parse_settings(settings)?;
            let tz: Tz = s
                .timezone
                .parse()
                .map_err(|_| FetchError::Config(format!("Unknown timezone: {}", s.timezone)))?;
            let now = Utc::now().with_timezone(&tz);
            Ok(Content::new(vec![
                zone_label(&s.timezone),
                now.format(DEFAULT_TIME_FORMAT).to_string(),
            ]))
        })
    }
}
