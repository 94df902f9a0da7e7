/*
 *  sources/quotes.rs
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

use rand::Rng;

use super::{wrap_text, Content, DataSource, FetchFuture, Settings};

const QUOTE_WIDTH: usize = 40;

const QUOTES: &[(&str, &str)] = &[
    (
        "The best way to predict the future is to invent it.",
        "Alan Kay",
    ),
    (
        "Simplicity is the ultimate sophistication.",
        "Leonardo da Vinci",
    ),
    (
        "It always seems impossible until it is done.",
        "Nelson Mandela",
    ),
    (
        "Well done is better than well said.",
        "Benjamin Franklin",
    ),
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
    (
        "Whether you think you can or you think you can't, you're right.",
        "Henry Ford",
    ),
    (
        "What we think, we become.",
        "Buddha",
    ),
    (
        "Act as if what you do makes a difference. It does.",
        "William James",
    ),
    (
        "The journey of a thousand miles begins with a single step.",
        "Lao Tzu",
    ),
    (
        "Lost time is never found again.",
        "Benjamin Franklin",
    ),
    (
        "Everything should be made as simple as possible, but no simpler.",
        "Albert Einstein",
    ),
    (
        "Do what you can, with what you have, where you are.",
        "Theodore Roosevelt",
    ),
];

pub(crate) fn quote_lines(index: usize) -> Vec<String> {
    let (text, author) = QUOTES[index % QUOTES.len()];
    let mut lines = wrap_text(text, QUOTE_WIDTH);
    lines.push(format!("- {author}"));
    lines
}

pub struct QuotesSource;

impl DataSource for QuotesSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let index = rand::rng().random_range(0..QUOTES.len());
            Ok(Content::new(quote_lines(index)))
        })
    }
}
