//! Query parameter extraction and forecast list shaping.

use serde::Serialize;
use skycache_core::AppError;
use skycache_weather::{Forecast, ForecastPoint, Reading};
use std::collections::HashMap;
use std::str::FromStr;

pub type Query = HashMap<String, String>;

/// City used by the home page when none is submitted
pub const DEFAULT_CITY: &str = "Mumbai";

/// The `city` parameter, rejecting absent or blank values.
pub fn required_city(query: &Query) -> Result<String, AppError> {
    query
        .get("city")
        .filter(|c| !c.trim().is_empty())
        .cloned()
        .ok_or_else(|| AppError::validation("city required"))
}

/// The `city` form field, falling back to [`DEFAULT_CITY`].
pub fn city_or_default(form: &Query) -> String {
    form.get("city")
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CITY)
        .to_string()
}

fn optional<T: FromStr>(query: &Query, name: &str, expected: &str) -> Result<Option<T>, AppError> {
    match query.get(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation(format!("{} must be {}", name, expected))),
    }
}

/// Filters accepted by the forecast list endpoint.
///
/// A bound is active whenever its parameter is present, zero included.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastQuery {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub limit: Option<usize>,
}

impl ForecastQuery {
    pub fn from_query(query: &Query) -> Result<Self, AppError> {
        Ok(Self {
            min_temp: optional(query, "min_temp", "a number")?,
            max_temp: optional(query, "max_temp", "a number")?,
            limit: optional(query, "limit", "a non-negative integer")?,
        })
    }

    fn accepts(&self, temperature: &Reading) -> bool {
        let temperature = temperature.value();
        self.min_temp.map_or(true, |min| temperature >= min)
            && self.max_temp.map_or(true, |max| temperature <= max)
    }

    /// Points within the temperature bounds, in upstream order, truncated to `limit`.
    pub fn apply(&self, forecast: &Forecast) -> Vec<ForecastItem> {
        forecast
            .points
            .iter()
            .filter(|p| self.accepts(&p.temperature))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(ForecastItem::from)
            .collect()
    }
}

/// One entry of the forecast list response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastItem {
    pub id: usize,
    pub time: String,
    pub temp: Reading,
    pub desc: String,
}

impl From<&ForecastPoint> for ForecastItem {
    fn from(point: &ForecastPoint) -> Self {
        Self {
            id: point.index,
            time: point.timestamp.clone(),
            temp: point.temperature.clone(),
            desc: point.description.clone(),
        }
    }
}
