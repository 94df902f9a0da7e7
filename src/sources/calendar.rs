/*
 *  sources/calendar.rs
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

use chrono::{Datelike, Local, NaiveDate};

use super::{Content, DataSource, FetchFuture, Settings};

// 7 two-char day cells joined by single spaces.
const GRID_WIDTH: usize = 20;

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// The classic monospace month grid: centered title, Monday-first weekday
/// header, right-aligned day numbers padded to full weeks.
pub(crate) fn month_lines(year: i32, month: u32) -> Vec<String> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let title = first.format("%B %Y").to_string();
    let mut lines = vec![format!("{title:^GRID_WIDTH$}")];
    lines.push("Mo Tu We Th Fr Sa Su".to_string());

    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["  ".to_string(); lead];
    cells.extend((1..=days_in_month(year, month)).map(|d| format!("{d:2}")));
    while cells.len() % 7 != 0 {
        cells.push("  ".to_string());
    }
    for week in cells.chunks(7) {
        lines.push(week.join(" "));
    }
    lines
}

pub struct CalendarSource;

impl DataSource for CalendarSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let today = Local::now().date_naive();
            Ok(Content::new(month_lines(today.year(), today.month())))
        })
    }
}
