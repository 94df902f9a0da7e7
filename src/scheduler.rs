/*
 *  scheduler.rs
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
//! Per-widget refresh tasks. Each active widget gets one tokio task that
//! fetches, publishes, then sleeps its interval; the interval runs from
//! fetch completion, so a slow feed can never overlap itself.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::registry::WidgetType;
use crate::sources::{DataSource, Settings};
use crate::widget::WidgetInstance;

struct Running {
    widget: Arc<WidgetInstance>,
    task: JoinHandle<()>,
}

/// Owns the active widget set. Stopping a task aborts it at its next await
/// point, which drops an in-flight fetch before it can publish and cancels
/// any pending interval timer.
#[derive(Default)]
pub struct Scheduler {
    entries: HashMap<String, Running>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the running set against `desired`: widgets no longer
    /// listed are stopped, new ones are started (fetching immediately),
    /// and ones already running are left untouched.
    pub fn load<F>(&mut self, desired: &[(String, WidgetType, Settings)], global_interval_ms: u64, factory: F)
    where
        F: Fn(WidgetType) -> Arc<dyn DataSource>,
    {
        let wanted: HashSet<&str> = desired.iter().map(|(name, _, _)| name.as_str()).collect();
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();
        for name in stale {
            self.stop(&name);
        }

        for (name, kind, settings) in desired {
            if self.entries.contains_key(name) {
                continue;
            }
            let widget = Arc::new(WidgetInstance::new(
                name.clone(),
                *kind,
                settings.clone(),
                global_interval_ms,
                factory(*kind),
            ));
            info!(
                "Started widget {}, refresh every {}ms.",
                name,
                widget.interval().as_millis()
            );
            let task = tokio::spawn(Self::run(Arc::clone(&widget)));
            self.entries.insert(
                name.clone(),
                Running {
                    widget,
                    task,
                },
            );
        }
    }

    /// Tears the whole set down and starts it fresh. Used when a config
    /// reload may have changed intervals or per-widget settings, which
    /// live inside the running instances.
    pub fn restart<F>(&mut self, desired: &[(String, WidgetType, Settings)], global_interval_ms: u64, factory: F)
    where
        F: Fn(WidgetType) -> Arc<dyn DataSource>,
    {
        info!("Restarting {} widget task(s).", self.entries.len());
        self.stop_all();
        self.load(desired, global_interval_ms, factory);
    }

    pub fn stop(&mut self, name: &str) -> bool {
        match self.entries.remove(name) {
            Some(running) => {
                running.task.abort();
                info!("Stopped widget {}.", name);
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        let names: Vec<String> = self.entries.keys().cloned().collect();
        for name in names {
            self.stop(&name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<WidgetInstance>> {
        self.entries.get(name).map(|running| Arc::clone(&running.widget))
    }

    /// The active widgets in name order, for the render pass.
    pub fn snapshot(&self) -> Vec<Arc<WidgetInstance>> {
        let mut widgets: Vec<Arc<WidgetInstance>> = self
            .entries
            .values()
            .map(|running| Arc::clone(&running.widget))
            .collect();
        widgets.sort_by(|a, b| a.name().cmp(b.name()));
        widgets
    }

    async fn run(widget: Arc<WidgetInstance>) {
        loop {
            widget.refresh().await;
            debug!(
                "{}: next refresh in {}ms",
                widget.name(),
                widget.interval().as_millis()
            );
            sleep(widget.interval()).await;
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for running in self.entries.values() {
            running.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{Content, FetchFuture};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts completed fetches; an aborted in-flight fetch never counts.
    struct CountingSource {
        hits: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl DataSource for CountingSource {
        fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
            Box::pin(async move {
                sleep(self.delay).await;
                self.hits.fetch_add(1, Ordering::SeqCst);
                Ok(Content::single("tick"))
            })
        }
    }

    fn counting_factory(
        hits: &Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl Fn(WidgetType) -> Arc<dyn DataSource> {
        let hits = Arc::clone(hits);
        move |_| {
            Arc::new(CountingSource {
                hits: Arc::clone(&hits),
                delay,
            }) as Arc<dyn DataSource>
        }
    }

    fn one(name: &str, kind: WidgetType) -> Vec<(String, WidgetType, Settings)> {
        vec![(name.to_string(), kind, Settings::Null)]
    }

    #[tokio::test(start_paused = true)]
    async fn load_starts_and_fetches_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("rss_1", WidgetType::Rss),
            60_000,
            counting_factory(&hits, Duration::ZERO),
        );
        sleep(Duration::from_millis(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(sched.contains("rss_1"));
        let names: Vec<String> = sched
            .snapshot()
            .iter()
            .map(|w| w.name().to_string())
            .collect();
        assert_eq!(names, vec!["rss_1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_runs_from_fetch_completion() {
        // 2s fetch + 10s interval: completions land at t=2s, 14s, 26s, ...
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("rss_1", WidgetType::Rss),
            10_000,
            counting_factory(&hits, Duration::from_secs(2)),
        );
        sleep(Duration::from_millis(2_100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // a start-to-start schedule would have completed a second fetch by 12.5s
        sleep(Duration::from_millis(10_400)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(1_600)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_refresh() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("rss_1", WidgetType::Rss),
            10_000,
            counting_factory(&hits, Duration::ZERO),
        );
        sleep(Duration::from_millis(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(sched.stop("rss_1"));
        assert!(!sched.contains("rss_1"));
        sleep(Duration::from_secs(30)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // second stop is a no-op
        assert!(!sched.stop("rss_1"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mid_fetch_discards_result() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("rss_1", WidgetType::Rss),
            10_000,
            counting_factory(&hits, Duration::from_secs(5)),
        );
        let widget = sched.get("rss_1").unwrap();
        sleep(Duration::from_secs(1)).await;
        sched.stop("rss_1");
        sleep(Duration::from_secs(30)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        let state = widget.state();
        let state = state.lock().await;
        assert!(state.lines.is_empty());
        assert!(state.last_updated.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reload_diff_stops_removed_keeps_existing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        let both = vec![
            ("rss_1".to_string(), WidgetType::Rss, Settings::Null),
            ("stock_1".to_string(), WidgetType::Stock, Settings::Null),
        ];
        sched.load(&both, 60_000, counting_factory(&hits, Duration::ZERO));
        sleep(Duration::from_millis(1)).await;
        let kept_before = sched.get("rss_1").unwrap();

        sched.load(
            &one("rss_1", WidgetType::Rss),
            60_000,
            counting_factory(&hits, Duration::ZERO),
        );
        assert!(!sched.contains("stock_1"));
        let kept_after = sched.get("rss_1").unwrap();
        assert!(Arc::ptr_eq(&kept_before, &kept_after));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_applies_new_interval() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("rss_1", WidgetType::Rss),
            3_600_000,
            counting_factory(&hits, Duration::ZERO),
        );
        sleep(Duration::from_millis(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let old = sched.get("rss_1").unwrap();

        sched.restart(
            &one("rss_1", WidgetType::Rss),
            900_000,
            counting_factory(&hits, Duration::ZERO),
        );
        let new = sched.get("rss_1").unwrap();
        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.interval(), Duration::from_millis(900_000));
        // fresh task fetches immediately, then on the new cadence
        sleep(Duration::from_millis(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        sleep(Duration::from_millis(900_100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_widgets_ignore_global_interval() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sched = Scheduler::new();
        sched.load(
            &one("time_1", WidgetType::Time),
            3_600_000,
            counting_factory(&hits, Duration::ZERO),
        );
        sleep(Duration::from_millis(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(3_100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }
}
