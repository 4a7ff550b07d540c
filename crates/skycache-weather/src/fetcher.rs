//! Fetch orchestration: the single path every upstream call goes through.
//!
//! A fresh cache hit is returned as-is. Otherwise the upstream is called once and a
//! successful result is stored with the timestamp taken before the call. Failures are
//! never cached. Concurrent misses for the same key are not coalesced; each one calls
//! upstream, and the last write wins.

use chrono::Duration;
use std::sync::Arc;

use crate::cache::{CacheKey, WeatherCache};
use crate::client::OpenWeatherClient;
use crate::clock::Clock;
use crate::error::FetchError;
use crate::types::{CurrentConditions, Fetched, Forecast, ResourceKind, WeatherPayload};

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    client: OpenWeatherClient,
    cache: Arc<WeatherCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl WeatherFetcher {
    pub fn new(
        client: OpenWeatherClient,
        cache: Arc<WeatherCache>,
        clock: Arc<dyn Clock>,
        ttl: std::time::Duration,
    ) -> Self {
        // TTLs beyond chrono's range are effectively "never expire"
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        Self {
            client,
            cache,
            clock,
            ttl,
        }
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Return the payload for `(location, kind)`, from cache when fresh.
    pub async fn fetch(
        &self,
        location: &str,
        kind: ResourceKind,
    ) -> Result<Fetched<WeatherPayload>, FetchError> {
        let key = CacheKey::new(kind, location);
        let now = self.clock.now();

        if let Some(payload) = self.cache.get_fresh(&key, now, self.ttl) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(Fetched {
                payload,
                cached: true,
            });
        }

        tracing::debug!("Cache miss for {}, requesting upstream", key);
        let payload = self.client.request(kind, location).await.map_err(|e| {
            tracing::warn!("Upstream request for {} failed: {}", key, e);
            FetchError::from(e)
        })?;

        self.cache.put(key, now, payload.clone());
        Ok(Fetched {
            payload,
            cached: false,
        })
    }

    pub async fn current(&self, location: &str) -> Result<Fetched<CurrentConditions>, FetchError> {
        let fetched = self.fetch(location, ResourceKind::CurrentWeather).await?;
        match fetched.payload {
            WeatherPayload::Current(current) => Ok(Fetched {
                payload: current,
                cached: fetched.cached,
            }),
            other => Err(FetchError::UnexpectedPayload {
                expected: ResourceKind::CurrentWeather,
                actual: other.kind(),
            }),
        }
    }

    pub async fn forecast(&self, location: &str) -> Result<Fetched<Forecast>, FetchError> {
        let fetched = self.fetch(location, ResourceKind::Forecast).await?;
        match fetched.payload {
            WeatherPayload::Forecast(forecast) => Ok(Fetched {
                payload: forecast,
                cached: fetched.cached,
            }),
            other => Err(FetchError::UnexpectedPayload {
                expected: ResourceKind::Forecast,
                actual: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Utc;
    use skycache_core::UpstreamConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TTL: std::time::Duration = std::time::Duration::from_secs(300);

    fn london_body() -> serde_json::Value {
        serde_json::json!({
            "main": {"temp": 15},
            "sys": {"country": "GB"},
            "coord": {"lon": -0.1, "lat": 51.5}
        })
    }

    fn fetcher_for(server: &MockServer, clock: Arc<ManualClock>) -> WeatherFetcher {
        let config = UpstreamConfig {
            api_key: "test_key".to_string(),
            weather_url: format!("{}/weather", server.uri()),
            forecast_url: format!("{}/forecast", server.uri()),
            timeout_secs: 5,
        };
        let client = OpenWeatherClient::new(&config).unwrap();
        WeatherFetcher::new(client, Arc::new(WeatherCache::new()), clock, TTL)
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock.clone());

        let first = fetcher.current("London").await.unwrap();
        assert!(!first.cached);

        for _ in 0..3 {
            clock.advance(Duration::seconds(60));
            let again = fetcher.current("London").await.unwrap();
            assert!(again.cached);
            assert_eq!(again.payload, first.payload);
        }
    }

    #[tokio::test]
    async fn test_location_case_shares_entry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock);

        assert!(!fetcher.current("Mumbai").await.unwrap().cached);
        assert!(fetcher.current("MUMBAI").await.unwrap().cached);
        assert!(fetcher.current("mumbai").await.unwrap().cached);
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_caller_casing_is_sent_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock);
        fetcher.current("New York").await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_entry_refetches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(2)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock.clone());

        assert!(!fetcher.current("London").await.unwrap().cached);

        clock.advance(Duration::seconds(300));
        assert!(!fetcher.current("London").await.unwrap().cached);

        // The refetch reset the timer
        clock.advance(Duration::seconds(299));
        assert!(fetcher.current("London").await.unwrap().cached);
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_kinds_are_cached_separately() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{"dt_txt": "2024-01-01 00:00:00", "main": {"temp": 4.2}, "weather": [{"description": "mist"}]}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock);

        assert!(!fetcher.current("London").await.unwrap().cached);
        let forecast = fetcher.forecast("London").await.unwrap();
        assert!(!forecast.cached);
        assert_eq!(forecast.payload.points[0].description, "mist");
        assert!(fetcher.forecast("london").await.unwrap().cached);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock);

        let err = fetcher.current("London").await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));
        assert!(err.to_string().contains("500"));

        assert!(fetcher.current("London").await.is_err());
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_call_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(london_body())
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let fetcher = fetcher_for(&mock_server, clock);

        let (a, b) = tokio::join!(fetcher.current("London"), fetcher.current("London"));
        assert!(!a.unwrap().cached);
        assert!(!b.unwrap().cached);
        assert_eq!(fetcher.cache().len(), 1);
        assert!(fetcher.current("London").await.unwrap().cached);
    }
}
