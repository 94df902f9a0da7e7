/*
 *  render.rs
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
//! Frame assembly. Once per frame the composer turns published widget state
//! plus configured positions into draw instructions; ticker animation
//! advances here, so the scroll rate is the frame rate.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::config::PositionSpec;
use crate::constants::{BBOX_PAD, LINE_SPACING, SHADOW_OFFSET, TICKER_STRIP_PAD};
use crate::geometry::{anchored_origin, bounding_box, TextMetrics, Viewport};
use crate::ticker::{compose_line, Ticker};
use crate::widget::{TickerLine, WidgetInstance, WidgetState};

/// One widget's draw order for one frame. The renderer owns font rendering,
/// color, and shadow styling; everything spatial is decided here.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub name: String,
    pub origin: Point,
    pub lines: Vec<String>,
    pub is_ticker: bool,
    pub font_scale: f32,
    /// Second text copy for the seamless ticker wrap, when in view.
    pub loop_origin: Option<Point>,
    /// Center each line within the block (anchors with no horizontal letter).
    pub center_lines: bool,
    pub shadow_offset: i32,
}

/// Anything that consumes frames implements this.
pub trait Renderer {
    fn render(&mut self, frame: &[DrawInstruction]) -> std::io::Result<()>;
}

pub struct FrameComposer {
    viewport: Viewport,
    metrics: TextMetrics,
    global_scale: f32,
}

impl FrameComposer {
    pub fn new(viewport: Viewport, metrics: TextMetrics, global_scale: f32) -> Self {
        Self {
            viewport,
            metrics,
            global_scale,
        }
    }

    /// Type base scale, then the global multiplier, then the per-widget one.
    fn scale_for(&self, widget: &WidgetInstance) -> f32 {
        widget.kind().base_scale() * self.global_scale * widget.scale_multiplier()
    }

    /// Builds the frame in the order the widgets were handed over. Widgets
    /// that have not published yet draw nothing.
    pub async fn compose(
        &self,
        widgets: &[Arc<WidgetInstance>],
        positions: &HashMap<String, PositionSpec>,
    ) -> Vec<DrawInstruction> {
        let mut frame = Vec::with_capacity(widgets.len());
        for widget in widgets {
            let Some(pos) = positions.get(widget.name()) else {
                debug!("{}: no position configured, skipping", widget.name());
                continue;
            };
            let state = widget.state();
            let mut state = state.lock().await;
            if state.lines.is_empty() {
                continue;
            }
            let scale = self.scale_for(widget);
            let anchor_point = self.viewport.anchor_point(pos.x, pos.y);
            let instruction = if widget.is_ticker() {
                self.ticker_instruction(widget, pos, anchor_point, scale, &mut state)
            } else {
                let size = self.metrics.content_box(&state.lines, scale);
                DrawInstruction {
                    name: widget.name().to_string(),
                    origin: anchored_origin(pos.anchor, anchor_point, size),
                    lines: state.lines.clone(),
                    is_ticker: false,
                    font_scale: scale,
                    loop_origin: None,
                    center_lines: pos.anchor.centers_lines(),
                    shadow_offset: SHADOW_OFFSET,
                }
            };
            frame.push(instruction);
        }
        frame
    }

    /// Joins the content to one line, advances (or re-arms) the scroll state
    /// stored with the widget, and places the copies within the strip.
    fn ticker_instruction(
        &self,
        widget: &WidgetInstance,
        pos: &PositionSpec,
        anchor_point: Point,
        scale: f32,
        state: &mut WidgetState,
    ) -> DrawInstruction {
        let strip =
            self.metrics
                .ticker_strip(pos.anchor, anchor_point.y, self.viewport, 1.0, scale);
        let joined = compose_line(&state.lines);
        let text_width = self.metrics.line_width(&joined, scale);

        let anim = match &mut state.ticker {
            Some(line) if line.text == joined => {
                line.anim.tick();
                line.anim
            }
            slot => {
                let anim = Ticker::new(strip.size.width, text_width);
                *slot = Some(TickerLine {
                    text: joined.clone(),
                    anim,
                });
                anim
            }
        };

        let y = strip.top_left.y + (TICKER_STRIP_PAD / 2) as i32;
        let origin = Point::new(strip.top_left.x + anim.offset().round() as i32, y);
        let loop_origin = anim.loop_visible(strip.size.width).then(|| {
            Point::new(strip.top_left.x + anim.loop_offset().round() as i32, y)
        });
        DrawInstruction {
            name: widget.name().to_string(),
            origin,
            lines: vec![joined],
            is_ticker: true,
            font_scale: scale,
            loop_origin,
            center_lines: false,
            shadow_offset: SHADOW_OFFSET,
        }
    }

    /// Hit-test rectangle via the same placement rule the draw path uses.
    /// `None` until the widget has published something to measure.
    pub async fn bounding_box(
        &self,
        widget: &WidgetInstance,
        pos: &PositionSpec,
    ) -> Option<Rectangle> {
        let state = widget.state();
        let state = state.lock().await;
        if state.lines.is_empty() {
            return None;
        }
        let scale = self.scale_for(widget);
        let anchor_point = self.viewport.anchor_point(pos.x, pos.y);
        if widget.is_ticker() {
            let strip =
                self.metrics
                    .ticker_strip(pos.anchor, anchor_point.y, self.viewport, 1.0, scale);
            Some(Rectangle::new(
                strip.top_left,
                Size::new(strip.size.width + BBOX_PAD, strip.size.height + BBOX_PAD),
            ))
        } else {
            let size = self.metrics.content_box(&state.lines, scale);
            Some(bounding_box(pos.anchor, anchor_point, size))
        }
    }
}

/// ANSI renderer mapping the pixel layout onto character cells. One text
/// character occupies one cell; pixel origins land on the cell grid by
/// flooring division, so a ticker slides one cell at a time.
pub struct TermRenderer<W: Write> {
    out: W,
    viewport: Viewport,
    cell_width: i32,
    cell_height: i32,
}

impl<W: Write> TermRenderer<W> {
    pub fn new(out: W, viewport: Viewport, metrics: TextMetrics) -> Self {
        Self {
            out,
            viewport,
            cell_width: metrics.char_width().max(1) as i32,
            cell_height: metrics.line_height(1.0).max(1) as i32,
        }
    }

    fn cols(&self) -> i32 {
        (self.viewport.width as i32 / self.cell_width).max(1)
    }

    fn rows(&self) -> i32 {
        (self.viewport.height as i32 / self.cell_height).max(1)
    }

    fn place(grid: &mut [Vec<char>], row: i32, col: i32, text: &str) {
        if row < 0 || row as usize >= grid.len() {
            return;
        }
        let cells = &mut grid[row as usize];
        for (i, ch) in text.chars().enumerate() {
            let c = col + i as i32;
            if c < 0 {
                continue;
            }
            let c = c as usize;
            if c >= cells.len() {
                break;
            }
            cells[c] = ch;
        }
    }
}

impl<W: Write> Renderer for TermRenderer<W> {
    fn render(&mut self, frame: &[DrawInstruction]) -> std::io::Result<()> {
        let mut grid = vec![vec![' '; self.cols() as usize]; self.rows() as usize];
        for ins in frame {
            let col = ins.origin.x.div_euclid(self.cell_width);
            let row = ins.origin.y.div_euclid(self.cell_height);
            if ins.is_ticker {
                if let Some(line) = ins.lines.first() {
                    Self::place(&mut grid, row, col, line);
                    if let Some(loop_origin) = ins.loop_origin {
                        let loop_col = loop_origin.x.div_euclid(self.cell_width);
                        Self::place(&mut grid, row, loop_col, line);
                    }
                }
                continue;
            }
            // per-line advance in rows, from the scaled pixel height
            let advance_px = self.cell_height as f32 * ins.font_scale + LINE_SPACING as f32;
            let advance = (advance_px / self.cell_height as f32).floor().max(1.0) as i32;
            let block_chars = ins
                .lines
                .iter()
                .map(|l| l.chars().count())
                .max()
                .unwrap_or(0);
            for (i, line) in ins.lines.iter().enumerate() {
                let mut line_col = col;
                if ins.center_lines {
                    line_col += ((block_chars - line.chars().count()) / 2) as i32;
                }
                Self::place(&mut grid, row + i as i32 * advance, line_col, line);
            }
        }

        write!(self.out, "\x1b[2J\x1b[H")?;
        for cells in grid {
            let line: String = cells.into_iter().collect();
            writeln!(self.out, "{}", line.trim_end())?;
        }
        self.out.flush()
    }
}
