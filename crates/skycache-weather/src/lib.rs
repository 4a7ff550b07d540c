//! Weather data for SkyCache
//!
//! Fetches current conditions and forecasts from OpenWeatherMap through a
//! time-bounded in-memory cache.

pub mod cache;
pub mod client;
pub mod clock;
pub mod error;
pub mod fetcher;
pub mod types;

pub use cache::{CacheKey, NormalizedLocation, WeatherCache};
pub use client::OpenWeatherClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FetchError, UpstreamError};
pub use fetcher::WeatherFetcher;
pub use types::*;
