/*
 *  sources/mod.rs
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
//! The data-source contract every widget type implements: take the widget's
//! settings, produce lines of text or a classified error. Sources never touch
//! layout and never know when or how often they run.

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod calendar;
pub mod clock;
pub mod countdown;
pub mod history;
pub mod ical;
pub mod ip;
pub mod moon;
pub mod quotes;
pub mod rss;
pub mod sports;
pub mod stock;
pub mod system;
pub mod weather;

/// Per-widget settings as stored in config, passed through untyped. Each
/// source deserializes the shape it understands via [`parse_settings`].
pub type Settings = serde_yaml::Value;

/// Why a fetch produced no content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("configuration: {0}")]
    Config(String),
    #[error("network: {0}")]
    Network(String),
    #[error("parse: {0}")]
    Parse(String),
}

impl FetchError {
    /// The short line shown in place of content. Config problems name the
    /// fix; transient problems all read the same so the mirror stays calm.
    pub fn headline(&self) -> String {
        match self {
            FetchError::Config(msg) => msg.clone(),
            FetchError::Network(_) | FetchError::Parse(_) => "No Connection".to_string(),
        }
    }

    /// The underlying message, without the taxonomy prefix.
    pub fn detail(&self) -> &str {
        match self {
            FetchError::Config(msg) | FetchError::Network(msg) | FetchError::Parse(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Whether every upstream feed contributed, or some dropped out and the
/// remainder was published anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentHint {
    #[default]
    Complete,
    Partial,
}

/// What a successful fetch hands back: display lines, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub lines: Vec<String>,
    pub hint: ContentHint,
}

impl Content {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            hint: ContentHint::Complete,
        }
    }

    pub fn single(line: impl Into<String>) -> Self {
        Self::new(vec![line.into()])
    }

    pub fn partial(lines: Vec<String>) -> Self {
        Self {
            lines,
            hint: ContentHint::Partial,
        }
    }
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Content, FetchError>> + Send + 'a>>;

/// One instance per widget. Implementations hold their own HTTP client or
/// caches; `fetch` borrows the settings for the duration of the call.
pub trait DataSource: Send + Sync {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a>;
}

/// Deserializes the typed settings a source expects, falling back to the
/// type's defaults when the widget has no settings block at all.
pub fn parse_settings<T>(settings: &Settings) -> Result<T, FetchError>
where
    T: DeserializeOwned + Default,
{
    if settings.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(settings.clone())
        .map_err(|e| FetchError::Config(format!("bad settings: {e}")))
}

/// Greedy word wrap used by the prose-style widgets. Words longer than the
/// width are hard-split rather than overflowing the column.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split_at);
            lines.push(head.to_string());
            word = tail;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
