/*
 *  sources/weather.rs
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
//! Current conditions plus a three day outlook from the keyless
//! Open-Meteo forecast API. Place names go through [`crate::geoloc`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geoloc::Geocoder;
use crate::httpclient::HttpClient;

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub location: String,
    pub style: String,
    pub units: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            location: "Salem, IL".to_string(),
            style: "Normal".to_string(),
            units: "imperial".to_string(),
        }
    }
}

/// Accepts the usual aliases; anything unrecognised falls back to imperial.
fn imperial_units(units: &str) -> bool {
    !matches!(
        units.trim().to_lowercase().as_str(),
        "c" | "celsius" | "metric"
    )
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Forecast {
    #[serde(default)]
    current: CurrentBlock,
    #[serde(default)]
    daily: DailyBlock,
}

#[derive(Debug, Deserialize, Default)]
struct CurrentBlock {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    weather_code: u32,
}

#[derive(Debug, Deserialize, Default)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

/// WMO weather interpretation codes, the subset Open-Meteo emits.
pub(crate) fn wmo_description(code: u32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mostly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing Drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing Rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow Grains",
        80 | 81 | 82 => "Rain Showers",
        85 | 86 => "Snow Showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with Hail",
        _ => "Unknown",
    }
}

fn weekday_abbrev(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Location header, current conditions, then tomorrow onward. The daily
/// arrays start at today, so the outlook skips index zero.
pub(crate) fn forecast_lines(location: &str, forecast: &Forecast, unit: char) -> Vec<String> {
    let mut lines = vec![
        location.to_string(),
        format!(
            "{}, {:.0}°{}",
            wmo_description(forecast.current.weather_code),
            forecast.current.temperature_2m,
            unit
        ),
    ];
    let daily = &forecast.daily;
    let days = daily
        .time
        .len()
        .min(daily.temperature_2m_max.len())
        .min(daily.temperature_2m_min.len());
    for i in 1..days.min(4) {
        lines.push(format!(
            "{} {:.0}°/{:.0}°",
            weekday_abbrev(&daily.time[i]),
            daily.temperature_2m_max[i],
            daily.temperature_2m_min[i],
        ));
    }
    lines
}

pub struct WeatherSource {
    http: HttpClient,
    geocoder: Geocoder,
}

impl WeatherSource {
    pub fn new(http: HttpClient, geocoder: Geocoder) -> Self {
        Self { http, geocoder }
    }
}

impl DataSource for WeatherSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: WeatherSettings = parse_settings(settings)?;
            let location = s.location.trim();
            if location.is_empty() {
                return Err(FetchError::Config("Set Weather Location".to_string()));
            }
            let point = self.geocoder.resolve(location).await?;
            let imperial = imperial_units(&s.units);
            let temperature_unit = if imperial { "fahrenheit" } else { "celsius" };
            let lat = point.latitude.to_string();
            let lon = point.longitude.to_string();
            let params: [(&str, &str); 7] = [
                ("latitude", &lat),
                ("longitude", &lon),
                ("current", "temperature_2m,weather_code"),
                ("daily", "temperature_2m_max,temperature_2m_min"),
                ("timezone", "auto"),
                ("forecast_days", "4"),
                ("temperature_unit", temperature_unit),
            ];
            let forecast: Forecast = self
                .http
                .get_json_with_query(FORECAST_URL, &params)
                .await?;
            let unit = if imperial { 'F' } else { 'C' };
            Ok(Content::new(forecast_lines(location, &forecast, unit)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "current": {"temperature_2m": 87.6, "weather_code": 2},
        "daily": {
            "time": ["2026-08-22", "2026-08-23", "2026-08-24", "2026-08-25"],
            "temperature_2m_max": [88.1, 79.3, 84.0, 90.2],
            "temperature_2m_min": [65.4, 60.2, 62.8, 68.9]
        }
    }"#;

    #[test]
    fn lines_cover_current_and_three_days() {
        let forecast: Forecast = serde_json::from_str(PAYLOAD).unwrap();
        let lines = forecast_lines("Salem, IL", &forecast, 'F');
        assert_eq!(
            lines,
            vec![
                "Salem, IL",
                "Partly Cloudy, 88°F",
                "Sun 79°/60°",
                "Mon 84°/63°",
                "Tue 90°/69°",
            ]
        );
    }

    #[test]
    fn short_daily_arrays_shrink_the_outlook() {
        let json = r#"{
            "current": {"temperature_2m": 20.0, "weather_code": 0},
            "daily": {
                "time": ["2026-08-22", "2026-08-23"],
                "temperature_2m_max": [21.0, 22.5],
                "temperature_2m_min": [11.0, 12.5]
            }
        }"#;
        let forecast: Forecast = serde_json::from_str(json).unwrap();
        let lines = forecast_lines("Oslo", &forecast, 'C');
        assert_eq!(lines, vec!["Oslo", "Clear, 20°C", "Sun 22°/12°"]);
    }

    #[test]
    fn unit_aliases_normalize() {
        assert!(imperial_units("imperial"));
        assert!(imperial_units("F"));
        assert!(imperial_units("Fahrenheit"));
        assert!(!imperial_units("metric"));
        assert!(!imperial_units("c"));
        assert!(!imperial_units(" Celsius "));
    }

    #[test]
    fn wmo_table_maps_known_codes() {
        assert_eq!(wmo_description(0), "Clear");
        assert_eq!(wmo_description(45), "Fog");
        assert_eq!(wmo_description(63), "Rain");
        assert_eq!(wmo_description(82), "Rain Showers");
        assert_eq!(wmo_description(95), "Thunderstorm");
        assert_eq!(wmo_description(42), "Unknown");
    }
}
