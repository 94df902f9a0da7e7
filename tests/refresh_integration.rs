/*
 *  refresh_integration.rs
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
//! Scheduler behavior through the public API, on paused virtual time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use mirrors::registry::WidgetType;
use mirrors::scheduler::Scheduler;
use mirrors::sources::{Content, DataSource, FetchFuture, Settings};

/// Tracks concurrent and completed fetches. An aborted fetch never counts
/// as completed.
#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

struct GaugedSource {
    gauge: Arc<Gauge>,
    delay: Duration,
}

impl DataSource for GaugedSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let now = self.gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.max_in_flight.fetch_max(now, Ordering::SeqCst);
            sleep(self.delay).await;
            self.gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.gauge.completed.fetch_add(1, Ordering::SeqCst);
            Ok(Content::single("tick"))
        })
    }
}

fn factory(gauge: &Arc<Gauge>, delay: Duration) -> impl Fn(WidgetType) -> Arc<dyn DataSource> {
    let gauge = Arc::clone(gauge);
    move |_| {
        Arc::new(GaugedSource {
            gauge: Arc::clone(&gauge),
            delay,
        }) as Arc<dyn DataSource>
    }
}

fn one_widget(name: &str, kind: WidgetType) -> Vec<(String, WidgetType, Settings)> {
    vec![(name.to_string(), kind, Settings::Null)]
}

#[tokio::test(start_paused = true)]
async fn a_slow_fetch_never_overlaps_itself() {
    // 5s fetch against a 1s interval: the cycle is 6s, never concurrent
    let gauge = Arc::new(Gauge::default());
    let mut sched = Scheduler::new();
    sched.load(
        &one_widget("rss_1", WidgetType::Rss),
        1_000,
        factory(&gauge, Duration::from_secs(5)),
    );

    sleep(Duration::from_secs(61)).await;
    assert_eq!(gauge.max_in_flight.load(Ordering::SeqCst), 1);
    // completions land at t = 5, 11, 17, ... 59
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 10);
}

#[tokio::test(start_paused = true)]
async fn restart_switches_to_the_new_cadence() {
    let gauge = Arc::new(Gauge::default());
    let mut sched = Scheduler::new();
    sched.load(
        &one_widget("stock_1", WidgetType::Stock),
        3_600_000,
        factory(&gauge, Duration::ZERO),
    );
    sleep(Duration::from_millis(1)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 1);

    // half an hour in, the hourly schedule has nothing more to do
    sleep(Duration::from_millis(1_800_000)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 1);

    sched.restart(
        &one_widget("stock_1", WidgetType::Stock),
        900_000,
        factory(&gauge, Duration::ZERO),
    );
    sleep(Duration::from_millis(1)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 2);

    sleep(Duration::from_millis(900_100)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 3);
    sleep(Duration::from_millis(900_000)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn stopping_mid_cycle_discards_the_inflight_fetch() {
    let gauge = Arc::new(Gauge::default());
    let mut sched = Scheduler::new();
    sched.load(
        &one_widget("rss_1", WidgetType::Rss),
        1_000,
        factory(&gauge, Duration::from_secs(5)),
    );
    let widget = sched.get("rss_1").unwrap();

    sleep(Duration::from_secs(2)).await;
    assert_eq!(gauge.in_flight.load(Ordering::SeqCst), 1);
    assert!(sched.stop("rss_1"));

    sleep(Duration::from_secs(60)).await;
    assert_eq!(gauge.completed.load(Ordering::SeqCst), 0);
    let state = widget.state();
    let state = state.lock().await;
    assert!(state.lines.is_empty());
    assert!(state.last_updated.is_none());
}
