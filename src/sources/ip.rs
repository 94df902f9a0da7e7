/*
 *  sources/ip.rs
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

use std::net::IpAddr;

use super::{Content, DataSource, FetchError, FetchFuture, Settings};

pub(crate) fn ip_line(addr: IpAddr) -> String {
    format!("IP: {addr}")
}

/// Shows the machine's primary local address. Reads the routing table only,
/// nothing leaves the host.
pub struct IpSource;

impl DataSource for IpSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let addr = local_ip_address::local_ip()
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Content::single(ip_line(addr)))
        })
    }
}
