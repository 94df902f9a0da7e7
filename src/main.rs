/*
 *  main.rs
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

use std::io;
use std::time::Duration;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use env_logger::Env;
use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind}; // specific Unix signals
use tokio::time::{interval, MissedTickBehavior};

use mirrors::config::{self, Config};
use mirrors::geometry::TextMetrics;
use mirrors::pacer::Pacer;
use mirrors::registry::{SourceRegistry, WidgetType};
use mirrors::render::{FrameComposer, Renderer, TermRenderer};
use mirrors::scheduler::Scheduler;
use mirrors::sources::Settings;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT or SIGTERM; SIGHUP is a reload, handled by the
/// application loop, not a shutdown.
async fn shutdown_signal() -> io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// The scheduler wants each widget's name, type, and settings block.
fn desired_set(config: &Config) -> Vec<(String, WidgetType, Settings)> {
    config
        .active_widgets()
        .into_iter()
        .map(|(name, kind)| {
            let settings = config.settings_for(&name);
            (name, kind, settings)
        })
        .collect()
}

async fn application_loop(mut config: Config, registry: &SourceRegistry) -> anyhow::Result<()> {
    let mut sighup = signal(SignalKind::hangup())?;

    let metrics = TextMetrics::from_font(&FONT_6X10);
    let mut scheduler = Scheduler::new();
    scheduler.load(
        &desired_set(&config),
        config.refresh_interval_ms(),
        |kind| registry.create(kind),
    );
    let mut composer = FrameComposer::new(config.viewport(), metrics, config.text_scale());
    let mut renderer = TermRenderer::new(io::stdout(), config.viewport(), metrics);
    let mut pacer = Pacer::new(config.fps());

    // Poll well below the frame time; the pacer decides when to flush.
    let mut poll = interval(Duration::from_millis(2));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = sighup.recv() => {
                info!("SIGHUP received. Reloading configuration.");
                match config::load() {
                    Ok(mut fresh) => {
                        for name in fresh.prune_unknown_widgets() {
                            warn!("Dropping unknown widget {} from config.", name);
                        }
                        if fresh.log_level() != config.log_level() {
                            info!("Log level change takes effect on next start.");
                        }
                        pacer.set_fps(fresh.fps());
                        composer = FrameComposer::new(fresh.viewport(), metrics, fresh.text_scale());
                        renderer = TermRenderer::new(io::stdout(), fresh.viewport(), metrics);
                        scheduler.restart(
                            &desired_set(&fresh),
                            fresh.refresh_interval_ms(),
                            |kind| registry.create(kind),
                        );
                        config = fresh;
                        info!("Configuration reloaded.");
                    }
                    Err(e) => {
                        error!("Config reload failed: {}. Keeping previous configuration.", e);
                    }
                }
            }

            _ = poll.tick() => {
                if pacer.should_flush() {
                    let frame = composer
                        .compose(&scheduler.snapshot(), &config.widget_positions)
                        .await;
                    renderer
                        .render(&frame)
                        .unwrap_or_else(|e| error!("Failed to render frame: {}", e));
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = config::load()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{}, {} on the wall", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    for name in config.prune_unknown_widgets() {
        warn!("Dropping unknown widget {} from config.", name);
    }
    info!("Active widgets: {}.", config.active_widgets().len());

    let registry = SourceRegistry::new()?;

    // Main application loop. Dropping out of the select tears down the
    // scheduler, which aborts every widget task.
    tokio::select! {
        res = shutdown_signal() => {
            res?;
        }
        res = application_loop(config, &registry) => {
            info!("Closed Application Loop.");
            res?;
        }
    }

    info!("Main application exiting. Widget tasks stopped.");
    Ok(())
}
