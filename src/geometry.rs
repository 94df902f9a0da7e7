/*
 *  geometry.rs
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
//! Anchor-based placement. One rule turns a fractional screen position plus
//! an anchor code into a pixel origin; drawing and hit-testing both call it,
//! so the two can never disagree.

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};

use crate::constants::{BBOX_PAD, LINE_SPACING, TICKER_STRIP_PAD};

/// Which point of a content box the configured position denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "n")]
    North,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "center", alias = "")]
    Center,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "se")]
    SouthEast,
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::NorthWest
    }
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::NorthWest,
        Anchor::North,
        Anchor::NorthEast,
        Anchor::West,
        Anchor::Center,
        Anchor::East,
        Anchor::SouthWest,
        Anchor::South,
        Anchor::SouthEast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::NorthWest => "nw",
            Anchor::North => "n",
            Anchor::NorthEast => "ne",
            Anchor::West => "w",
            Anchor::Center => "center",
            Anchor::East => "e",
            Anchor::SouthWest => "sw",
            Anchor::South => "s",
            Anchor::SouthEast => "se",
        }
    }

    pub fn has_north(&self) -> bool {
        matches!(self, Anchor::NorthWest | Anchor::North | Anchor::NorthEast)
    }

    pub fn has_south(&self) -> bool {
        matches!(self, Anchor::SouthWest | Anchor::South | Anchor::SouthEast)
    }

    pub fn has_east(&self) -> bool {
        matches!(self, Anchor::NorthEast | Anchor::East | Anchor::SouthEast)
    }

    pub fn has_west(&self) -> bool {
        matches!(self, Anchor::NorthWest | Anchor::West | Anchor::SouthWest)
    }

    /// Anchors with no horizontal letter center each line within the block.
    pub fn centers_lines(&self) -> bool {
        !self.has_east() && !self.has_west()
    }
}

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts a fractional position into the pixel anchor point.
    pub fn anchor_point(&self, x: f32, y: f32) -> Point {
        Point::new(
            (x * self.width as f32) as i32,
            (y * self.height as f32) as i32,
        )
    }
}

/// Top-left origin such that the box's denoted corner/edge/center sits at
/// `anchor_point`. East pins the right edge, no-west centers horizontally;
/// the vertical rule mirrors with south/north.
pub fn anchored_origin(anchor: Anchor, anchor_point: Point, size: Size) -> Point {
    let mut x = anchor_point.x;
    let mut y = anchor_point.y;

    if anchor.has_east() {
        x -= size.width as i32;
    } else if !anchor.has_west() {
        x -= size.width as i32 / 2;
    }

    if anchor.has_south() {
        y -= size.height as i32;
    } else if !anchor.has_north() {
        y -= size.height as i32 / 2;
    }

    Point::new(x, y)
}

/// The rectangle used for drag hit-testing: the anchored content box padded
/// by a couple of pixels so thin widgets stay grabbable.
pub fn bounding_box(anchor: Anchor, anchor_point: Point, size: Size) -> Rectangle {
    let origin = anchored_origin(anchor, anchor_point, size);
    Rectangle::new(
        origin,
        Size::new(size.width + BBOX_PAD, size.height + BBOX_PAD),
    )
}

/// Monospace text measurement. The renderer owns real font rendering; layout
/// only needs a consistent character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    char_width: u32,
    line_height: u32,
}

impl TextMetrics {
    pub const fn new(char_width: u32, line_height: u32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }

    pub fn from_font(font: &MonoFont<'_>) -> Self {
        Self {
            char_width: font.character_size.width + font.character_spacing,
            line_height: font.character_size.height,
        }
    }

    pub fn char_width(&self) -> u32 {
        self.char_width
    }

    pub fn line_width(&self, line: &str, scale: f32) -> u32 {
        (line.chars().count() as f32 * self.char_width as f32 * scale).round() as u32
    }

    pub fn line_height(&self, scale: f32) -> u32 {
        (self.line_height as f32 * scale).round() as u32
    }

    /// Content box for a static block: widest line by sum of line heights,
    /// with fixed spacing between lines.
    pub fn content_box(&self, lines: &[String], scale: f32) -> Size {
        if lines.is_empty() {
            return Size::zero();
        }
        let width = lines
            .iter()
            .map(|l| self.line_width(l, scale))
            .max()
            .unwrap_or(0);
        let height =
            lines.len() as u32 * self.line_height(scale) + (lines.len() as u32 - 1) * LINE_SPACING;
        Size::new(width, height)
    }

    /// The fixed-height strip a ticker widget occupies. Width comes from the
    /// viewport (scaled by the configured fraction), never from the text; the
    /// vertical anchor rule still applies, the horizontal one is ignored.
    pub fn ticker_strip(
        &self,
        anchor: Anchor,
        anchor_point_y: i32,
        viewport: Viewport,
        width_frac: f32,
        scale: f32,
    ) -> Rectangle {
        let height = self.line_height(scale) + TICKER_STRIP_PAD;
        let width = (viewport.width as f32 * width_frac.clamp(0.0, 1.0)) as u32;
        let mut y = anchor_point_y;
        if anchor.has_south() {
            y -= height as i32;
        } else if !anchor.has_north() {
            y -= height as i32 / 2;
        }
        Rectangle::new(Point::new(0, y), Size::new(width, height))
    }
}
