/*
 *  sources/history.rs
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
//! "On This Day" events from the muffinlabs history feed.

use serde::{Deserialize, Serialize};

use crate::httpclient::HttpClient;

use super::{parse_settings, wrap_text, Content, DataSource, FetchFuture, Settings};

const HISTORY_URL: &str = "http://history.muffinlabs.com/date";
const EVENT_COUNT: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_width_chars: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_width_chars: 50,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    data: HistoryData,
}

#[derive(Debug, Deserialize, Default)]
struct HistoryData {
    #[serde(default, rename = "Events")]
    events: Vec<HistoryEvent>,
}

#[derive(Debug, Deserialize, Default)]
struct HistoryEvent {
    // The feed serialises years as strings ("1969", "44 BC").
    #[serde(default)]
    year: String,
    #[serde(default)]
    text: String,
}

pub(crate) fn event_lines(resp: &HistoryResponse, width: usize) -> Vec<String> {
    let mut lines = vec!["On This Day:".to_string()];
    for event in resp.data.events.iter().take(EVENT_COUNT) {
        lines.extend(wrap_text(
            &format!("{}: {}", event.year, event.text),
            width,
        ));
    }
    if lines.len() == 1 {
        return vec!["No historical events found for today.".to_string()];
    }
    lines
}

pub struct HistorySource {
    http: HttpClient,
}

impl HistorySource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl DataSource for HistorySource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: HistorySettings = parse_settings(settings)?;
            let width = s.max_width_chars.max(10);
            let resp: HistoryResponse = self.http.get_json(HISTORY_URL).await?;
            Ok(Content::new(event_lines(&resp, width)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "date": "August 22",
        "data": {
            "Events": [
                {"year": "1969", "text": "A short event."},
                {"year": "1864", "text": "Twelve nations sign the First Geneva Convention."},
                {"year": "1971", "text": "Third."},
                {"year": "1990", "text": "Never shown."}
            ]
        }
    }"#;

    #[test]
    fn keeps_three_events_under_header() {
        let resp: HistoryResponse = serde_json::from_str(PAYLOAD).unwrap();
        let lines = event_lines(&resp, 50);
        assert_eq!(lines[0], "On This Day:");
        assert_eq!(lines[1], "1969: A short event.");
        assert_eq!(lines[2], "1864: Twelve nations sign the First Geneva");
        assert_eq!(lines[3], "Convention.");
        assert_eq!(lines[4], "1971: Third.");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn empty_feed_reports_nothing_found() {
        let resp: HistoryResponse = serde_json::from_str(r#"{"data":{"Events":[]}}"#).unwrap();
        assert_eq!(
            event_lines(&resp, 50),
            vec!["No historical events found for today."]
        );
    }

    #[test]
    fn narrow_width_wraps_each_event() {
        let resp: HistoryResponse = serde_json::from_str(PAYLOAD).unwrap();
        let lines = event_lines(&resp, 12);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert!(lines.contains(&"1969: A".to_string()));
    }
}
