/*
 *  ticker.rs
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
//! Horizontal marquee state. Offsets are kept in float pixels so fractional
//! step rates stay smooth; the renderer rounds at draw time.

use crate::constants::{TICKER_LOOP_GAP, TICKER_SEPARATOR, TICKER_STEP_PER_TICK};

/// Joins multi-line content into the single ticker line.
pub fn compose_line(lines: &[String]) -> String {
    lines
        .iter()
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(TICKER_SEPARATOR)
}

/// Scroll position for one ticker widget. The offset is the x of the first
/// copy's left edge relative to the strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    offset: f32,
    text_width: f32,
}

impl Ticker {
    /// Primed so the text enters from the right edge on the first frame.
    pub fn new(strip_width: u32, text_width: u32) -> Self {
        Self {
            offset: strip_width as f32,
            text_width: text_width as f32,
        }
    }

    /// Re-arms after a content change. Fresh text restarts off-screen right
    /// rather than popping in mid-strip.
    pub fn rearm(&mut self, strip_width: u32, text_width: u32) {
        self.offset = strip_width as f32;
        self.text_width = text_width as f32;
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn text_width(&self) -> f32 {
        self.text_width
    }

    /// Where the trailing copy starts, one gap behind the first.
    pub fn loop_offset(&self) -> f32 {
        self.offset + self.text_width + TICKER_LOOP_GAP as f32
    }

    /// True when the trailing copy has scrolled into view and must be drawn.
    pub fn loop_visible(&self, strip_width: u32) -> bool {
        self.loop_offset() < strip_width as f32
    }

    /// Advances one animation tick. When the first copy has fully cleared the
    /// left edge the offset jumps forward by exactly one text-plus-gap period,
    /// which is what makes the loop seamless: the trailing copy that was being
    /// drawn at `loop_offset` becomes the first copy at the same position.
    pub fn tick(&mut self) {
        self.offset -= TICKER_STEP_PER_TICK;
        if self.offset + self.text_width < 0.0 {
            self.offset += self.text_width + TICKER_LOOP_GAP as f32;
        }
    }

    /// Advances `n` ticks. Drives catch-up after a stalled frame loop.
    pub fn tick_n(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }
}
