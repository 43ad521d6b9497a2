use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use tracing::info;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::Candle;
use crate::provider::{CandleRequest, MarketDataProvider};

const BINANCE_FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const KLINES_PATH: &str = "/fapi/v1/klines";
const MAX_CANDLES_PER_REQUEST: usize = 1500;
const PROVIDER: &str = "binance";

pub struct BinanceProvider {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| BINANCE_FUTURES_BASE_URL.to_owned()),
        }
    }
}

impl MarketDataProvider for BinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_candles(
        &self,
        request: &CandleRequest,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>> {
        let request = request.clone();
        Box::pin(async move {
            // Wait for rate limiter before making the request
            self.rate_limiter.until_ready().await;

            let url = format!("{}{}", self.base_url, KLINES_PATH);
            let symbol = request.symbol.pair();
            let limit = request.limit.min(MAX_CANDLES_PER_REQUEST).to_string();
            let params = [
                ("symbol", symbol.as_str()),
                ("interval", request.timeframe.binance_interval()),
                ("limit", limit.as_str()),
            ];

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: PROVIDER.into(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(error_from_body(&body).attach(format!("HTTP status: {status}")));
            }

            let raw: Vec<BinanceKlineRow> =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: PROVIDER.into(),
                    })?;

            info!(
                symbol = %symbol,
                timeframe = %request.timeframe,
                fetched = raw.len(),
                "binance candle fetch complete"
            );

            raw.into_iter()
                .map(BinanceKlineRow::into_candle)
                .collect::<Result<Vec<_>, _>>()
        })
    }
}

/// `{"code": -1121, "msg": "Invalid symbol."}`
#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

fn error_from_body(body: &str) -> Report<ProviderError> {
    match serde_json::from_str::<BinanceErrorBody>(body) {
        Ok(err) => Report::new(ProviderError::Api {
            provider: PROVIDER.into(),
            code: err.code.to_string(),
        })
        .attach(err.msg),
        Err(_) => Report::new(ProviderError::Request {
            provider: PROVIDER.into(),
        }),
    }
}

// ── REST response types ───────────────────────────────────────────────────────

/// Binance kline row: 12-element array
/// [open_time, open, high, low, close, volume, close_time, ...]
#[derive(Debug, Deserialize)]
struct BinanceKlineRow(
    i64,                        // 0: open_time (ms)
    String,                     // 1: open
    String,                     // 2: high
    String,                     // 3: low
    String,                     // 4: close
    #[allow(dead_code)] String, // 5: volume
    #[allow(dead_code)] i64,    // 6: close_time
    #[allow(dead_code)] String, // 7: quote asset volume
    #[allow(dead_code)] i64,    // 8: number of trades
    #[allow(dead_code)] String, // 9: taker buy base volume
    #[allow(dead_code)] String, // 10: taker buy quote volume
    #[allow(dead_code)] String, // 11: ignore
);

impl BinanceKlineRow {
    fn into_candle(self) -> Result<Candle, Report<ProviderError>> {
        let parse_f64 = |s: &str| -> Result<f64, Report<ProviderError>> {
            s.parse::<f64>()
                .change_context(ProviderError::ResponseParse {
                    provider: PROVIDER.into(),
                })
        };

        let open_time = DateTime::from_timestamp_millis(self.0).ok_or_else(|| {
            Report::new(ProviderError::ResponseParse {
                provider: PROVIDER.into(),
            })
            .attach(format!("timestamp: {}", self.0))
        })?;

        let candle = Candle {
            open_time,
            open: parse_f64(&self.1)?,
            high: parse_f64(&self.2)?,
            low: parse_f64(&self.3)?,
            close: parse_f64(&self.4)?,
        };

        if !candle.is_well_formed() {
            return Err(Report::new(ProviderError::ResponseParse {
                provider: PROVIDER.into(),
            })
            .attach(format!("malformed candle at {open_time}")));
        }
        Ok(candle)
    }
}
