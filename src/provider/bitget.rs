use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::Candle;
use crate::provider::{CandleRequest, MarketDataProvider};

const BITGET_BASE_URL: &str = "https://api.bitget.com";
const CANDLES_PATH: &str = "/api/v2/mix/market/candles";
/// Bitget returns at most 1000 candles per call.
const MAX_CANDLES_PER_REQUEST: usize = 1000;
const SUCCESS_CODE: &str = "00000";
const PROVIDER: &str = "bitget";

pub struct BitgetProvider {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
    product_type: String,
}

impl BitgetProvider {
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
                .unwrap_or_else(|| BITGET_BASE_URL.to_owned()),
            product_type: config.product_type.clone(),
        }
    }
}

impl MarketDataProvider for BitgetProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_candles(
        &self,
        request: &CandleRequest,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>> {
        let request = request.clone();
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let url = format!("{}{}", self.base_url, CANDLES_PATH);
            let symbol = request.symbol.pair();
            let limit = request.limit.min(MAX_CANDLES_PER_REQUEST).to_string();
            let params = [
                ("symbol", symbol.as_str()),
                ("productType", self.product_type.as_str()),
                ("granularity", request.timeframe.bitget_granularity()),
                ("limit", limit.as_str()),
            ];

            debug!(symbol = %symbol, url = %url, "requesting bitget candles");

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(request_error())?;

            let status = response.status();
            let body = response.text().await.change_context(request_error())?;

            let candles = parse_candles(&body).attach_with(|| format!("HTTP status: {status}"))?;

            info!(
                symbol = %symbol,
                timeframe = %request.timeframe,
                fetched = candles.len(),
                "bitget candle fetch complete"
            );

            Ok(candles)
        })
    }
}

fn request_error() -> ProviderError {
    ProviderError::Request {
        provider: PROVIDER.into(),
    }
}

fn parse_error() -> ProviderError {
    ProviderError::ResponseParse {
        provider: PROVIDER.into(),
    }
}

// ── REST response types ───────────────────────────────────────────────────────

/// `{ "code": "00000", "msg": "success", "data": [[...], ...] }`
#[derive(Debug, Deserialize)]
struct BitgetEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<Vec<Vec<String>>>,
}

/// Decode a candles response body, surfacing API-level error codes.
fn parse_candles(body: &str) -> Result<Vec<Candle>, Report<ProviderError>> {
    let envelope: BitgetEnvelope = serde_json::from_str(body).change_context(parse_error())?;

    if envelope.code != SUCCESS_CODE {
        return Err(Report::new(ProviderError::Api {
            provider: PROVIDER.into(),
            code: envelope.code,
        })
        .attach(envelope.msg));
    }

    envelope
        .data
        .unwrap_or_default()
        .iter()
        .map(|row| row_into_candle(row))
        .collect()
}

/// Row layout: `[ts_ms, open, high, low, close, base_volume, quote_volume]`
fn row_into_candle(row: &[String]) -> Result<Candle, Report<ProviderError>> {
    if row.len() < 5 {
        return Err(Report::new(parse_error()).attach(format!("short candle row: {row:?}")));
    }

    let parse_f64 = |s: &str| -> Result<f64, Report<ProviderError>> {
        s.parse::<f64>().change_context(parse_error())
    };

    let millis = row[0].parse::<i64>().change_context(parse_error())?;
    let open_time = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Report::new(parse_error()).attach(format!("timestamp: {millis}")))?;

    let candle = Candle {
        open_time,
        open: parse_f64(&row[1])?,
        high: parse_f64(&row[2])?,
        low: parse_f64(&row[3])?,
        close: parse_f64(&row[4])?,
    };

    if !candle.is_well_formed() {
        return Err(Report::new(parse_error()).attach(format!("malformed candle: {row:?}")));
    }
    Ok(candle)
}
