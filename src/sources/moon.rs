/*
 *  sources/moon.rs
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
//! Moon phase from the mean synodic month. Good to a few hours, which is
//! plenty for a phase name on a mirror.

use chrono::{DateTime, TimeZone, Utc};

use super::{Content, DataSource, FetchFuture, Settings};

const SYNODIC_DAYS: f64 = 29.53059;

const PHASE_NAMES: [&str; 8] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
];

fn reference_new_moon() -> DateTime<Utc> {
    // 2000-01-06 18:14 UTC.
    Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0).single()
        .unwrap_or_else(Utc::now)
}

/// Phase fraction in [0,1): 0 new, 0.5 full.
pub(crate) fn phase_fraction(now: DateTime<Utc>) -> f64 {
    let elapsed_days = (now - reference_new_moon()).num_seconds() as f64 / 86_400.0;
    (elapsed_days / SYNODIC_DAYS).rem_euclid(1.0)
}

pub(crate) fn phase_name(fraction: f64) -> &'static str {
    let index = ((fraction * 8.0 + 0.5).floor() as usize) % 8;
    PHASE_NAMES[index]
}

pub(crate) fn illumination_pct(fraction: f64) -> u32 {
    let illum = (1.0 - (std::f64::consts::TAU * fraction).cos()) / 2.0;
    (illum * 100.0).round() as u32
}

pub(crate) fn moon_lines(now: DateTime<Utc>) -> Vec<String> {
    let fraction = phase_fraction(now);
    vec![
        phase_name(fraction).to_string(),
        format!("{}% illuminated", illumination_pct(fraction)),
    ]
}

pub struct MoonSource;

impl DataSource for MoonSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move { Ok(Content::new(moon_lines(Utc::now()))) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_new_moon() {
        // 2024-01-11 11:57 UTC was a new moon.
        let now = Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap();
        let fraction = phase_fraction(now);
        assert_eq!(phase_name(fraction), "New Moon");
        assert!(illumination_pct(fraction) <= 2);
    }

    #[test]
    fn known_full_moon() {
        // 2024-01-25 17:54 UTC was a full moon.
        let now = Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap();
        let fraction = phase_fraction(now);
        assert_eq!(phase_name(fraction), "Full Moon");
        assert!(illumination_pct(fraction) >= 98);
    }

    #[test]
    fn quarters_sit_between() {
        assert_eq!(phase_name(0.25), "First Quarter");
        assert_eq!(phase_name(0.75), "Last Quarter");
        assert_eq!(illumination_pct(0.25), 50);
        assert_eq!(illumination_pct(0.75), 50);
    }

    #[test]
    fn lines_shape() {
        let lines = moon_lines(Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("% illuminated"));
    }
}
