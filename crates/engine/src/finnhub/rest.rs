use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::{Error, Indicator, IndicatorSource, Result};

/// Candle resolution requested for every indicator: one minute.
const RESOLUTION: &str = "1";

/// REST client for the Finnhub technical indicator endpoint.
pub struct FinnhubClient {
    api_key: String,
    endpoint: Url,
    http: Client,
}

impl FinnhubClient {
    /// `base_url` is the API root, e.g. `https://finnhub.io/api/v1`.
    /// Every request is bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}/indicator", base_url.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("invalid Finnhub base URL '{base_url}': {e}")))?;
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint,
            http,
        })
    }

    /// Full request URL for one indicator series.
    pub fn indicator_url(&self, symbol: &str, indicator: Indicator) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("symbol", symbol)
                .append_pair("resolution", RESOLUTION)
                .append_pair("indicator", indicator.key());
            if let Some(period) = indicator.time_period() {
                query.append_pair("timeperiod", &period.to_string());
            }
            query.append_pair("token", &self.api_key);
        }
        url
    }
}

#[async_trait]
impl IndicatorSource for FinnhubClient {
    async fn series(&self, symbol: &str, indicator: Indicator) -> Result<Vec<f64>> {
        let url = self.indicator_url(symbol, indicator);
        debug!(symbol, %indicator, "Requesting indicator series from Finnhub");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Source(format!("HTTP {status}: {body}")));
        }
        parse_series(&body, indicator)
    }
}

/// Extract the indicator-named series from a response body.
///
/// A missing series (e.g. `{"s":"no_data"}`) is an empty series; an `error`
/// field or a non-numeric series is a failure.
pub fn parse_series(body: &str, indicator: Indicator) -> Result<Vec<f64>> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(err) = value.get("error").and_then(Value::as_str) {
        return Err(Error::Source(err.to_string()));
    }

    match value.get(indicator.key()) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(series) => serde_json::from_value(series.clone()).map_err(|e| {
            Error::Source(format!("malformed {indicator} series: {e}"))
        }),
    }
}
