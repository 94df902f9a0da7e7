/*
 *  geoloc.rs
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
use serde::Deserialize;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::httpclient::HttpClient;
use crate::sources::FetchError;

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoResults {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
}

/// Resolves configured place names ("Salem, IL") to coordinates. Results are
/// cached for an hour, keyed by the configured string.
#[derive(Clone)]
pub struct Geocoder {
    http: HttpClient,
    cache: TtlCache<GeoPoint>,
}

impl Geocoder {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            cache: TtlCache::new(64, CACHE_TTL),
        }
    }

    pub async fn resolve(&self, place: &str) -> Result<GeoPoint, FetchError> {
        let key = place.trim().to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let mut point = self.lookup(place.trim()).await?;
        // "Salem, IL" style names often miss as a whole; fall back to the
        // city part alone.
        if point.is_none() {
            if let Some((city, _)) = place.split_once(',') {
                point = self.lookup(city.trim()).await?;
            }
        }

        let point =
            point.ok_or_else(|| FetchError::Config(format!("Unknown location: {place}")))?;
        self.cache.insert(&key, point);
        Ok(point)
    }

    async fn lookup(&self, name: &str) -> Result<Option<GeoPoint>, FetchError> {
        let params = [("name", name), ("count", "1")];
        let resp: GeoResults = self
            .http
            .get_json_with_query(GEOCODE_URL, &params)
            .await?;
        Ok(resp
            .results
            .and_then(|r| r.into_iter().next())
            .map(|r| GeoPoint {
                latitude: r.latitude,
                longitude: r.longitude,
            }))
    }
}
