/*
 *  httpclient.rs
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
//! One shared HTTP client for every feed. All sources go through here so
//! user-agent, timeouts and retry behavior stay uniform.

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::sources::FetchError;

pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

const MAX_HTTP_RETRIES: u8 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const NO_PARAMS: &[(&str, &str)] = &[];

/// Thin wrapper around one pooled `reqwest::Client`. Clones share the pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert(
            "Accept",
            header::HeaderValue::from_static(
                "application/json, application/xml, text/xml;q=0.9, text/calendar;q=0.9, */*;q=0.8",
            ),
        );
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        // Feeds cross the open internet; these are looser than LAN timeouts
        // but still short enough that a dead feed cannot stall its widget
        // for long.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }

    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.send_with_retries(url, NO_PARAMS, MAX_HTTP_RETRIES)
            .await
    }

    pub async fn get_text_with_query<T: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &T,
    ) -> Result<String, FetchError> {
        self.send_with_retries(url, params, MAX_HTTP_RETRIES).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    pub async fn get_json_with_query<P, T>(&self, url: &str, params: &P) -> Result<T, FetchError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.get_text_with_query(url, params).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Retries transport failures and 429/5xx responses with a short backoff.
    /// Other non-success statuses fail immediately, they will not improve on
    /// a retry.
    async fn send_with_retries<T: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &T,
        max_retries: u8,
    ) -> Result<String, FetchError> {
        let mut retries = 0;
        loop {
            match self.client.get(url).query(params).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        retries += 1;
                        if retries >= max_retries {
                            return Err(FetchError::Network(format!("{status} from {url}")));
                        }
                        tokio::time::sleep(RETRY_DELAY * u32::from(retries)).await;
                        continue;
                    }
                    if !status.is_success() {
                        return Err(FetchError::Network(format!("{status} from {url}")));
                    }
                    return response.text().await.map_err(FetchError::from);
                }
                Err(e) => {
                    retries += 1;
                    if retries >= max_retries {
                        return Err(e.into());
                    }
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}
