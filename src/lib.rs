/*
 *  lib.rs
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
//! Widget engine for a smart-mirror display: per-widget data sources with
//! their refresh scheduling, anchored text layout, and ticker animation.
//! The binary drives it with a terminal renderer; any other surface
//! implements [`render::Renderer`] over the same frames.

pub mod cache;
pub mod config;
pub mod constants;
pub mod deutils;
pub mod geoloc;
pub mod geometry;
pub mod httpclient;
pub mod pacer;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod ticker;
pub mod widget;
