use serde::{Deserialize, Serialize};

/// Which upstream dataset a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    CurrentWeather,
    Forecast,
}

impl ResourceKind {
    /// Short name used in cache keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentWeather => "weather",
            Self::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric reading kept exactly as the provider wrote it.
///
/// `15` stays `15` and `15.0` stays `15.0` when serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(serde_json::Number);

impl Reading {
    pub fn from_f64(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self)
    }

    /// The reading as a float, for comparisons
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }
}

impl From<i64> for Reading {
    fn from(value: i64) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Geographic coordinates as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: Reading,
    pub lat: Reading,
}

/// Current conditions for a location (metric units)
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: Reading,
    pub pressure: Option<Reading>,
    pub humidity: Option<Reading>,
    pub country: Option<String>,
    pub coord: Coord,
}

/// One step of a forecast sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Position in the upstream sequence
    pub index: usize,
    /// Provider timestamp text (`dt_txt`), empty when absent
    pub timestamp: String,
    pub temperature: Reading,
    pub description: String,
    /// The point exactly as the provider sent it
    pub raw: serde_json::Value,
}

/// Ordered forecast sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn point(&self, index: usize) -> Option<&ForecastPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Decoded upstream response, one variant per resource kind
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Current(CurrentConditions),
    Forecast(Forecast),
}

impl WeatherPayload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Current(_) => ResourceKind::CurrentWeather,
            Self::Forecast(_) => ResourceKind::Forecast,
        }
    }
}

/// A payload together with whether it was served from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub payload: T,
    pub cached: bool,
}
