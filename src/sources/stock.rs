/*
 *  sources/stock.rs
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
//! Stock quotes from Financial Modeling Prep, one line per symbol.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::httpclient::HttpClient;

use super::{parse_settings, Content, DataSource, FetchError, FetchFuture, Settings};

const QUOTE_URL: &str = "https://financialmodelingprep.com/api/v3/quote";
const KEY_PLACEHOLDER: &str = "YOUR_FMP_API_KEY";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StockSettings {
    pub symbols: Vec<String>,
    pub api_key: String,
    pub style: String,
}

impl Default for StockSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string(), "GOOG".to_string()],
            api_key: String::new(),
            style: "Normal".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Quote {
    #[serde(default)]
    price: f64,
    #[serde(default, rename = "changesPercentage")]
    change_pct: f64,
}

/// "AAPL: $232.10 (+1.25%)", sign shown only on gains.
pub(crate) fn quote_line(symbol: &str, quote: &Quote) -> String {
    let sign = if quote.change_pct > 0.0 { "+" } else { "" };
    format!(
        "{}: ${:.2} ({}{:.2}%)",
        symbol, quote.price, sign, quote.change_pct
    )
}

pub struct StockSource {
    http: HttpClient,
}

impl StockSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl DataSource for StockSource {
    fn fetch<'a>(&'a self, settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move {
            let s: StockSettings = parse_settings(settings)?;
            let key = s.api_key.trim();
            if key.is_empty() || key == KEY_PLACEHOLDER {
                return Err(FetchError::Config("Set Stock API Key".to_string()));
            }
            let symbols: Vec<&str> = s
                .symbols
                .iter()
                .map(|sym| sym.trim())
                .filter(|sym| !sym.is_empty())
                .collect();
            if symbols.is_empty() {
                return Err(FetchError::Config("Set Stock Symbols".to_string()));
            }

            let mut lines: Vec<String> = Vec::new();
            let mut failures = 0usize;
            let mut last_err: Option<FetchError> = None;

            for symbol in &symbols {
                let url = format!("{}/{}", QUOTE_URL, symbol.to_uppercase());
                let quotes: Result<Vec<Quote>, FetchError> = self
                    .http
                    .get_json_with_query(&url, &[("apikey", key)])
                    .await;
                match quotes {
                    Ok(quotes) => {
                        if let Some(quote) = quotes.first() {
                            lines.push(quote_line(&symbol.to_uppercase(), quote));
                        }
                    }
                    Err(e) => {
                        warn!("quote fetch for {symbol} failed: {e}");
                        failures += 1;
                        last_err = Some(e);
                    }
                }
            }

            if failures == symbols.len() {
                return Err(
                    last_err.unwrap_or_else(|| FetchError::Network("all quotes failed".to_string()))
                );
            }
            if lines.is_empty() {
                lines.push("No stock data found.".to_string());
            }
            if failures > 0 {
                Ok(Content::partial(lines))
            } else {
                Ok(Content::new(lines))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_carries_plus_sign() {
        let quote = Quote {
            price: 232.104,
            change_pct: 1.247,
        };
        assert_eq!(quote_line("AAPL", &quote), "AAPL: $232.10 (+1.25%)");
    }

    #[test]
    fn loss_keeps_bare_minus() {
        let quote = Quote {
            price: 98.5,
            change_pct: -0.4,
        };
        assert_eq!(quote_line("GOOG", &quote), "GOOG: $98.50 (-0.40%)");
    }

    #[test]
    fn flat_day_has_no_sign() {
        let quote = Quote {
            price: 10.0,
            change_pct: 0.0,
        };
        assert_eq!(quote_line("T", &quote), "T: $10.00 (0.00%)");
    }

    #[test]
    fn quote_payload_decodes() {
        let json = r#"[{"symbol":"AAPL","price":232.104,"changesPercentage":1.247,"name":"Apple Inc."}]"#;
        let quotes: Vec<Quote> = serde_json::from_str(json).unwrap();
        assert_eq!(quote_line("AAPL", &quotes[0]), "AAPL: $232.10 (+1.25%)");
    }

    #[tokio::test]
    async fn placeholder_key_is_rejected() {
        let settings: crate::sources::Settings = serde_yaml::from_str(
            r#"
            symbols: [AAPL]
            api_key: YOUR_FMP_API_KEY
            "#,
        )
        .unwrap();
        let source = StockSource::new(HttpClient::new().unwrap());
        let err = source.fetch(&settings).await.unwrap_err();
        assert_eq!(err.headline(), "Set Stock API Key");
    }
}
