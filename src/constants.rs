//! This module contains global constants shared across the scheduler, layout,
//! and source modules.

/// Default polling interval for feed-style widgets (1 hour).
pub const DEFAULT_FEED_REFRESH_MS: u64 = 3_600_000;

/// Interval choices offered by the settings surfaces, in milliseconds
/// (15 min, 30 min, 1 h, 2 h, 6 h, 12 h, 24 h).
pub const REFRESH_PRESETS_MS: [u64; 7] = [
    900_000, 1_800_000, 3_600_000, 7_200_000, 21_600_000, 43_200_000, 86_400_000,
];

/// Clock-family widgets redraw every second no matter what the global
/// interval says.
pub const CLOCK_REFRESH_MS: u64 = 1_000;

/// Vertical spacing between lines of a multi-line widget block, unscaled.
pub const LINE_SPACING: u32 = 5;

/// Padding added to each dimension of a hit-test rectangle.
pub const BBOX_PAD: u32 = 2;

/// Gap between the end of ticker text and the start of its loop copy.
pub const TICKER_LOOP_GAP: i32 = 12;

/// Pixels a ticker advances per animation tick.
pub const TICKER_STEP_PER_TICK: f32 = 2.0;

/// Vertical padding inside the ticker strip, total (top + bottom).
pub const TICKER_STRIP_PAD: u32 = 4;

/// Separator used when multi-line content is flattened into a ticker line.
pub const TICKER_SEPARATOR: &str = " \u{2022} ";

/// Animation clock rate driving tickers and frame assembly.
pub const DEFAULT_FPS: u32 = 30;

/// Fallback viewport when the configuration does not name one.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Bounds for the global text scale multiplier.
pub const TEXT_SCALE_MIN: f32 = 0.5;
pub const TEXT_SCALE_MAX: f32 = 2.0;

/// Drop-shadow offset hint passed through to renderers, in pixels.
pub const SHADOW_OFFSET: i32 = 2;
