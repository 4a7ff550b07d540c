//! OpenWeatherMap client.
//!
//! One outbound request per call. No caching and no retries; those belong to the
//! caller.

use reqwest::Client;
use serde::Deserialize;
use skycache_core::UpstreamConfig;
use tracing::instrument;

use crate::error::UpstreamError;
use crate::types::{
    Coord, CurrentConditions, Forecast, ForecastPoint, Reading, ResourceKind, WeatherPayload,
};

const UNITS: &str = "metric";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainReadings,
    #[serde(default)]
    sys: Option<SysInfo>,
    coord: Coord,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Reading,
    #[serde(default)]
    pressure: Option<Reading>,
    #[serde(default)]
    humidity: Option<Reading>,
}

#[derive(Debug, Deserialize)]
struct SysInfo {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    #[serde(default)]
    dt_txt: Option<String>,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<ConditionText>,
}

#[derive(Debug, Deserialize)]
struct ConditionText {
    #[serde(default)]
    description: String,
}

/// Error body OpenWeatherMap sends with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    weather_url: String,
    forecast_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            weather_url: config.weather_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }

    fn endpoint(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::CurrentWeather => &self.weather_url,
            ResourceKind::Forecast => &self.forecast_url,
        }
    }

    /// Fetch and decode one resource for `location`.
    #[instrument(skip(self), level = "info")]
    pub async fn request(
        &self,
        kind: ResourceKind,
        location: &str,
    ) -> Result<WeatherPayload, UpstreamError> {
        let response = self
            .client
            .get(self.endpoint(kind))
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ApiErrorBody>(&body)
                .map(|b| format!(": {}", b.message))
                .unwrap_or_default();
            return Err(UpstreamError::new(format!(
                "Upstream returned {}{}",
                status, detail
            )));
        }

        match kind {
            ResourceKind::CurrentWeather => decode_current(&body).map(WeatherPayload::Current),
            ResourceKind::Forecast => decode_forecast(&body).map(WeatherPayload::Forecast),
        }
    }
}

fn decode_current(body: &[u8]) -> Result<CurrentConditions, UpstreamError> {
    let resp: CurrentResponse = serde_json::from_slice(body)?;

    Ok(CurrentConditions {
        temperature: resp.main.temp,
        pressure: resp.main.pressure,
        humidity: resp.main.humidity,
        country: resp.sys.and_then(|s| s.country),
        coord: resp.coord,
    })
}

fn decode_forecast(body: &[u8]) -> Result<Forecast, UpstreamError> {
    let resp: ForecastResponse = serde_json::from_slice(body)?;

    let points = resp
        .list
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let entry = ForecastEntry::deserialize(&raw)?;
            Ok(ForecastPoint {
                index,
                timestamp: entry.dt_txt.unwrap_or_default(),
                temperature: entry.main.temp,
                description: entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.description)
                    .unwrap_or_default(),
                raw,
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    Ok(Forecast { points })
}
