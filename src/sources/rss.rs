/*
 *  sources/rss.rs
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
//! RSS 2.0 headlines, aggregated across the configured feed URLs. A feed
//! that fails only costs its own items; the widget errors only when every
//! feed fails.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::deutils::deserialize_numeric_u32;
use crate::httpclient::HttpClient;

use super::{parse_settings, wrap_text, Content, DataSource, FetchError, FetchFuture, Settings};

#[derive(Debug, Deserialize)]
#[serde(rename = "rss")]
struct RssDoc {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RssSettings {
    pub urls: Vec<String>,
    pub style: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_numeric_u32")]
    pub article_count: u32,
    #[serde(deserialize_with = "deserialize_numeric_u32")]
    pub max_width_chars: u32,
}

impl Default for RssSettings {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            style: "Normal".to_string(),
            title: String::new(),
            article_count: 5,
            max_width_chars: 50,
        }
    }
}

pub(crate) fn parse_feed_titles(xml: &str) -> Result<Vec<String>, FetchError> {
    let doc: RssDoc =
        quick_xml::de::from_str(xml).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(doc
        .channel
        .items
        .into_iter()
        .map(|i| i.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// "• headline" with continuation lines indented under the bullet.
pub(crate) fn bullet_lines(title: &str, width: usize) -> Vec<String> {
    let body_width = width.saturating_sub(2).max(1);
    wrap_text(title, body_width)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("\u{2022} {line}")
            } else {
                format!("  {line}")
            }
        })
        .collect()
}

pub struct RssSource {
    http: HttpClient,
}

impl RssSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl DataSource for RssSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: RssSettings = parse_settings(settings)?;
            let urls: Vec<&String> = s.urls.iter().filter(|u| !u.trim().is_empty()).collect();
            if urls.is_empty() {
                return Err(FetchError::Config("Set RSS URL".to_string()));
            }

            let mut titles: Vec<String> = Vec::new();
            let mut failures = 0usize;
            let mut last_err: Option<FetchError> = None;

            for url in &urls {
                let result = match self.http.get_text(url).await {
                    Ok(body) => parse_feed_titles(&body),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(feed_titles) => titles.extend(feed_titles),
                    Err(e) => {
                        warn!("rss feed {url} failed: {e}");
                        failures += 1;
                        last_err = Some(e);
                    }
                }
            }

            if failures == urls.len() {
                return Err(last_err
                    .unwrap_or_else(|| FetchError::Network("all feeds failed".to_string())));
            }

            titles.truncate(s.article_count as usize);
            let mut lines: Vec<String> = Vec::new();
            if !s.title.is_empty() {
                lines.push(s.title.clone());
            }
            if titles.is_empty() {
                lines.push("No news available.".to_string());
            } else {
                for title in &titles {
                    lines.extend(bullet_lines(title, s.max_width_chars as usize));
                }
            }

            if failures > 0 {
                Ok(Content::partial(lines))
            } else {
                Ok(Content::new(lines))
            }
        })
    }
}
