/*
 *  widget.rs
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
//! A widget on the mirror: one name bound to one data source, with the
//! latest published lines behind a small async lock. The render pass reads
//! state; the scheduler writes it; neither waits on the other's I/O.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use tokio::sync::Mutex;

use crate::constants::{TEXT_SCALE_MAX, TEXT_SCALE_MIN};
use crate::registry::WidgetType;
use crate::sources::{ContentHint, DataSource, FetchError, Settings};
use crate::ticker::Ticker;

/// The text to publish given fetched content and the current error, if any.
/// An error replaces the content outright: a short failure line, then the
/// detail. Stale data never shows alongside an error banner.
pub fn decorate(content: &[String], last_error: Option<&FetchError>) -> Vec<String> {
    match last_error {
        None => content.to_vec(),
        Some(err) => vec![err.headline(), format!("Error: {}", err.detail())],
    }
}

/// Scroll state for a Ticker-style widget, kept with the text it was armed
/// for so a content change can re-arm the offset.
#[derive(Debug, Clone)]
pub struct TickerLine {
    pub text: String,
    pub anim: Ticker,
}

/// What the render pass sees. Replaced wholesale on every completed fetch.
#[derive(Debug, Default)]
pub struct WidgetState {
    pub lines: Vec<String>,
    pub last_error: Option<String>,
    pub last_updated: Option<Instant>,
    pub ticker: Option<TickerLine>,
}

impl WidgetState {
    pub fn publish(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.last_error = None;
        self.last_updated = Some(Instant::now());
    }

    pub fn publish_error(&mut self, err: &FetchError) {
        self.lines = decorate(&[], Some(err));
        self.last_error = Some(err.to_string());
        self.last_updated = Some(Instant::now());
    }
}

pub struct WidgetInstance {
    name: String,
    kind: WidgetType,
    settings: Settings,
    interval: Duration,
    source: Arc<dyn DataSource>,
    state: Arc<Mutex<WidgetState>>,
}

impl WidgetInstance {
    /// Clock-like types ignore the global interval and tick every second.
    pub fn new(
        name: String,
        kind: WidgetType,
        settings: Settings,
        global_interval_ms: u64,
        source: Arc<dyn DataSource>,
    ) -> Self {
        let interval_ms = kind.fixed_interval_ms().unwrap_or(global_interval_ms);
        Self {
            name,
            kind,
            settings,
            interval: Duration::from_millis(interval_ms),
            source,
            state: Arc::new(Mutex::new(WidgetState::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WidgetType {
        self.kind
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> Arc<Mutex<WidgetState>> {
        Arc::clone(&self.state)
    }

    /// Widgets whose settings say `style: Ticker` render as a scrolling
    /// strip instead of a static block.
    pub fn is_ticker(&self) -> bool {
        self.settings
            .get("style")
            .and_then(|v| v.as_str())
            .map(|s| s.eq_ignore_ascii_case("ticker"))
            .unwrap_or(false)
    }

    /// Optional per-widget multiplier on top of the type's base scale and
    /// the global multiplier, clamped like the global one.
    pub fn scale_multiplier(&self) -> f32 {
        self.settings
            .get("text_scale_multiplier")
            .and_then(|v| v.as_f64())
            .map(|m| (m as f32).clamp(TEXT_SCALE_MIN, TEXT_SCALE_MAX))
            .unwrap_or(1.0)
    }

    /// One fetch, one publish. Errors land in the published lines via the
    /// decorator; nothing here takes the process down.
    pub async fn refresh(&self) {
        let started = Instant::now();
        let result = self.source.fetch(&self.settings).await;
        let mut state = self.state.lock().await;
        match result {
            Ok(content) => {
                if content.hint == ContentHint::Partial {
                    warn!("{}: published with some feeds missing", self.name);
                }
                debug!(
                    "{} refreshed in {} ms",
                    self.name,
                    started.elapsed().as_millis()
                );
                state.publish(content.lines);
            }
            Err(err) => {
                error!("{} fetch failed: {err}", self.name);
                state.publish_error(&err);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sources::{Content, FetchFuture};

    pub(crate) struct FixedSource(pub Result<Vec<String>, fn() -> FetchError>);

    impl DataSource for FixedSource {
        fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
            let result = match &self.0 {
                Ok(lines) => Ok(Content::new(lines.clone())),
                Err(make) => Err(make()),
            };
            Box::pin(async move { result })
        }
    }

    fn instance(source: FixedSource, settings: Settings) -> WidgetInstance {
        WidgetInstance::new(
            "rss_1".to_string(),
            WidgetType::Rss,
            settings,
            3_600_000,
            Arc::new(source),
        )
    }

    #[test]
    fn decorate_passes_content_through_without_error() {
        let content = vec!["line one".to_string(), "line two".to_string()];
        assert_eq!(decorate(&content, None), content);
    }

    #[test]
    fn decorate_replaces_content_on_error() {
        let err = FetchError::Network("connect timeout".to_string());
        assert_eq!(
            decorate(&["old".to_string()], Some(&err)),
            vec!["No Connection", "Error: connect timeout"]
        );
    }

    #[test]
    fn config_error_decoration_names_the_fix() {
        let err = FetchError::Config("Set RSS URL".to_string());
        assert_eq!(
            decorate(&[], Some(&err)),
            vec!["Set RSS URL", "Error: Set RSS URL"]
        );
    }

    #[tokio::test]
    async fn refresh_publishes_lines_and_clears_error() {
        let widget = instance(
            FixedSource(Ok(vec!["hello".to_string()])),
            Settings::Null,
        );
        {
            let mut state = widget.state().lock_owned().await;
            state.last_error = Some("stale".to_string());
        }
        widget.refresh().await;
        let state = widget.state();
        let state = state.lock().await;
        assert_eq!(state.lines, vec!["hello"]);
        assert!(state.last_error.is_none());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn refresh_decorates_failures() {
        let widget = instance(
            FixedSource(Err(|| FetchError::Network("dns".to_string()))),
            Settings::Null,
        );
        widget.refresh().await;
        let state = widget.state();
        let state = state.lock().await;
        assert_eq!(state.lines, vec!["No Connection", "Error: dns"]);
        assert!(state.last_error.is_some());
    }

    #[test]
    fn ticker_style_is_case_insensitive() {
        let ticker: Settings = serde_yaml::from_str("style: Ticker").unwrap();
        let normal: Settings = serde_yaml::from_str("style: Normal").unwrap();
        assert!(instance(FixedSource(Ok(vec![])), ticker).is_ticker());
        assert!(!instance(FixedSource(Ok(vec![])), normal).is_ticker());
        assert!(!instance(FixedSource(Ok(vec![])), Settings::Null).is_ticker());
    }

    #[test]
    fn per_widget_scale_clamps() {
        let big: Settings = serde_yaml::from_str("text_scale_multiplier: 9.0").unwrap();
        assert_eq!(instance(FixedSource(Ok(vec![])), big).scale_multiplier(), 2.0);
        let unset = instance(FixedSource(Ok(vec![])), Settings::Null);
        assert_eq!(unset.scale_multiplier(), 1.0);
    }

    #[test]
    fn clock_types_override_the_global_interval() {
        let widget = WidgetInstance::new(
            "time_1".to_string(),
            WidgetType::Time,
            Settings::Null,
            3_600_000,
            Arc::new(FixedSource(Ok(vec![]))),
        );
        assert_eq!(widget.interval(), Duration::from_millis(1000));
    }
}
