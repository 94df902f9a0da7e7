/*
 *  registry.rs
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
//! The widget vocabulary: every type the mirror can display, its naming
//! scheme, per-type defaults, and the factory that wires a type to its
//! data source.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::constants::CLOCK_REFRESH_MS;
use crate::geoloc::Geocoder;
use crate::httpclient::HttpClient;
use crate::sources::calendar::CalendarSource;
use crate::sources::clock::{
    DateSettings, DateSource, TimeSource, WorldClockSettings, WorldClockSource,
};
use crate::sources::countdown::{CountdownSettings, CountdownSource};
use crate::sources::history::{HistorySettings, HistorySource};
use crate::sources::ical::{IcalSettings, IcalSource};
use crate::sources::ip::IpSource;
use crate::sources::moon::MoonSource;
use crate::sources::quotes::QuotesSource;
use crate::sources::rss::{RssSettings, RssSource};
use crate::sources::sports::{SportsSettings, SportsSource};
use crate::sources::stock::{StockSettings, StockSource};
use crate::sources::system::SystemSource;
use crate::sources::weather::{WeatherSettings, WeatherSource};
use crate::sources::{DataSource, Settings};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown widget type: {0}")]
pub struct UnknownWidgetType(pub String);

/// Everything the mirror knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetType {
    Time,
    Date,
    WorldClock,
    Calendar,
    WeatherForecast,
    Ical,
    Rss,
    Sports,
    Stock,
    History,
    Countdown,
    Quotes,
    System,
    Ip,
    MoonPhase,
}

impl WidgetType {
    pub const ALL: [WidgetType; 15] = [
        WidgetType::Time,
        WidgetType::Date,
        WidgetType::WorldClock,
        WidgetType::Calendar,
        WidgetType::WeatherForecast,
        WidgetType::Ical,
        WidgetType::Rss,
        WidgetType::Sports,
        WidgetType::Stock,
        WidgetType::History,
        WidgetType::Countdown,
        WidgetType::Quotes,
        WidgetType::System,
        WidgetType::Ip,
        WidgetType::MoonPhase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Time => "time",
            WidgetType::Date => "date",
            WidgetType::WorldClock => "worldclock",
            WidgetType::Calendar => "calendar",
            WidgetType::WeatherForecast => "weatherforecast",
            WidgetType::Ical => "ical",
            WidgetType::Rss => "rss",
            WidgetType::Sports => "sports",
            WidgetType::Stock => "stock",
            WidgetType::History => "history",
            WidgetType::Countdown => "countdown",
            WidgetType::Quotes => "quotes",
            WidgetType::System => "system",
            WidgetType::Ip => "ip",
            WidgetType::MoonPhase => "moonphase",
        }
    }

    /// Type-intrinsic size relative to the base font. The final scale also
    /// folds in the per-widget multiplier from config.
    pub fn base_scale(&self) -> f32 {
        match self {
            WidgetType::Time => 3.0,
            WidgetType::Date => 1.2,
            WidgetType::Calendar => 0.8,
            WidgetType::Rss => 0.8,
            WidgetType::History => 0.8,
            WidgetType::Stock => 0.9,
            _ => 1.0,
        }
    }

    /// Clock-like types redraw every second regardless of the feed
    /// interval; everything else follows the global refresh setting.
    pub fn fixed_interval_ms(&self) -> Option<u64> {
        match self {
            WidgetType::Time
            | WidgetType::Date
            | WidgetType::WorldClock
            | WidgetType::Countdown => Some(CLOCK_REFRESH_MS),
            _ => None,
        }
    }

    /// The settings block a freshly added widget starts with. Types whose
    /// source needs nothing get no block at all.
    pub fn default_settings(&self) -> Settings {
        fn value_of<T: Serialize>(settings: T) -> Settings {
            serde_yaml::to_value(settings).unwrap_or(Settings::Null)
        }
        match self {
            WidgetType::Date => value_of(DateSettings::default()),
            WidgetType::WorldClock => value_of(WorldClockSettings::default()),
            WidgetType::WeatherForecast => value_of(WeatherSettings::default()),
            WidgetType::Ical => value_of(IcalSettings::default()),
            WidgetType::Rss => value_of(RssSettings::default()),
            WidgetType::Sports => value_of(SportsSettings::default()),
            WidgetType::Stock => value_of(StockSettings::default()),
            WidgetType::History => value_of(HistorySettings::default()),
            WidgetType::Countdown => value_of(CountdownSettings::default()),
            WidgetType::Time
            | WidgetType::Calendar
            | WidgetType::Quotes
            | WidgetType::System
            | WidgetType::Ip
            | WidgetType::MoonPhase => Settings::Null,
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = UnknownWidgetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        WidgetType::ALL
            .iter()
            .find(|t| t.as_str() == needle)
            .copied()
            .ok_or_else(|| UnknownWidgetType(s.to_string()))
    }
}

/// A widget's identity in config: its type plus an ordinal, rendered as
/// "time_1", "rss_2" and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetName {
    pub kind: WidgetType,
    pub ordinal: u32,
}

impl WidgetName {
    pub fn new(kind: WidgetType, ordinal: u32) -> Self {
        Self { kind, ordinal }
    }

    /// The smallest ordinal not taken by `existing` names of the same type,
    /// starting at 1. Removing rss_1 and adding again refills the gap.
    pub fn next_free<'a, I>(kind: WidgetType, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: Vec<u32> = existing
            .into_iter()
            .filter_map(|name| name.parse::<WidgetName>().ok())
            .filter(|name| name.kind == kind)
            .map(|name| name.ordinal)
            .collect();
        let mut ordinal = 1;
        while taken.contains(&ordinal) {
            ordinal += 1;
        }
        Self::new(kind, ordinal)
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.ordinal)
    }
}

impl FromStr for WidgetName {
    type Err = UnknownWidgetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, ordinal) = s
            .rsplit_once('_')
            .ok_or_else(|| UnknownWidgetType(s.to_string()))?;
        let ordinal: u32 = ordinal
            .parse()
            .map_err(|_| UnknownWidgetType(s.to_string()))?;
        Ok(Self::new(kind.parse()?, ordinal))
    }
}

/// Builds data sources, sharing one HTTP client and one geocoder across
/// every widget so caches and connection settings are common.
pub struct SourceRegistry {
    http: HttpClient,
    geocoder: Geocoder,
}

impl SourceRegistry {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = HttpClient::new()?;
        let geocoder = Geocoder::new(http.clone());
        Ok(Self { http, geocoder })
    }

    pub fn create(&self, kind: WidgetType) -> Arc<dyn DataSource> {
        match kind {
            WidgetType::Time => Arc::new(TimeSource),
            WidgetType::Date => Arc::new(DateSource),
            WidgetType::WorldClock => Arc::new(WorldClockSource),
            WidgetType::Calendar => Arc::new(CalendarSource),
            WidgetType::WeatherForecast => Arc::new(WeatherSource::new(
                self.http.clone(),
                self.geocoder.clone(),
            )),
            WidgetType::Ical => Arc::new(IcalSource::new(self.http.clone())),
            WidgetType::Rss => Arc::new(RssSource::new(self.http.clone())),
            WidgetType::Sports => Arc::new(SportsSource::new(self.http.clone())),
            WidgetType::Stock => Arc::new(StockSource::new(self.http.clone())),
            WidgetType::History => Arc::new(HistorySource::new(self.http.clone())),
            WidgetType::Countdown => Arc::new(CountdownSource),
            WidgetType::Quotes => Arc::new(QuotesSource),
            WidgetType::System => Arc::new(SystemSource),
            WidgetType::Ip => Arc::new(IpSource),
            WidgetType::MoonPhase => Arc::new(MoonSource),
        }
    }
}
